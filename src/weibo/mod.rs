//! Weibo API interaction module
//!
//! # Module Structure
//!
//! - [`client`] - Client owning the transport and handing out resources
//! - [`http`] - Transport trait, request/response types and the reqwest implementation
//!
//! # Example
//!
//! ```ignore
//! use weibo_api::weibo::client::WeiboClient;
//!
//! async fn example() -> weibo_api::Result<()> {
//!     let client = WeiboClient::new(Some("SUB=...; SUBP=..."))?;
//!     let mut status = client.status("Mx9abc");
//!     println!("{:?}", status.text().await?);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
