//! Resource abstraction layer
//!
//! Lazily fetched Weibo objects and listings built on the [`JsonView`]
//! facade.
//!
//! # Architecture
//!
//! - [`base`] - Identity, seed cache, fetch-on-demand, refresh and snapshots
//! - [`paginated`] - Page cursor and per-page fetches for listings
//! - [`fetcher`] - Executes requests, decodes replies, strips the `data` envelope
//! - [`kinds`] - URL rules per resource kind and typed convenience wrappers
//! - [`registry`] - Name to kind to constructor lookup
//!
//! # Example
//!
//! ```ignore
//! use weibo_api::WeiboClient;
//!
//! async fn show(client: &WeiboClient) -> weibo_api::Result<()> {
//!     let mut people = client.people(1815418641);
//!     println!("{:?}", people.name().await?);
//!
//!     let mut follows = people.follows();
//!     let first = follows.fetch_page(1).await?;
//!     println!("{} users on page 1", first.len());
//!     Ok(())
//! }
//! ```
//!
//! [`JsonView`]: crate::json::JsonView

pub mod base;
pub mod fetcher;
pub mod kinds;
pub mod paginated;
pub mod registry;

pub use base::{DataState, Resource, ResourceId, Snapshot, Source};
pub use kinds::{parse_count, Article, People, ResourceKind, Status};
pub use paginated::Paginated;
pub use registry::{instantiate, instantiate_from_payload, resolve, AnyResource};
