//! Client-side data access for Weibo.
//!
//! Every user, post, article and listing is a resource that fetches its JSON
//! lazily, keeps it until refreshed, and exposes it through a read-only
//! [`JsonView`]. Resources borrow a [`weibo::http::Transport`] owned by a
//! [`WeiboClient`].

pub mod config;
pub mod error;
pub mod json;
pub mod resource;
pub mod weibo;

pub use error::{Error, Result, UnexpectedResponse};
pub use json::{Field, JsonView};
pub use resource::{
    AnyResource, Article, DataState, Paginated, People, Resource, ResourceId, ResourceKind,
    Snapshot, Source, Status,
};
pub use weibo::client::WeiboClient;

/// Version injected at compile time via WEIBO_API_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("WEIBO_API_VERSION") {
    Some(v) => v,
    None => "dev",
};
