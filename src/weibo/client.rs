//! Weibo Client
//!
//! Owns the transport (and with it the session cookie and default headers)
//! and hands out resources that borrow it.

use super::http::{HttpTransport, Transport};
use crate::config::Config;
use crate::error::Result;
use crate::resource::{
    registry, AnyResource, Article, Paginated, People, ResourceId, ResourceKind, Status,
};

/// Main Weibo client
pub struct WeiboClient {
    transport: Box<dyn Transport>,
}

impl WeiboClient {
    /// Create a client, optionally with a browser session cookie
    /// (`"SUB=...; SUBP=..."`)
    pub fn new(cookie: Option<&str>) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(cookie)?))
    }

    /// Create a client from user configuration. An explicit cookie
    /// overrides the configured one.
    pub fn from_config(config: &Config, cookie: Option<&str>) -> Result<Self> {
        let cookie = cookie
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .or_else(|| config.effective_cookie());
        Ok(Self::with_transport(HttpTransport::from_config(config, cookie.as_deref())?))
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// User profile
    pub fn people(&self, uid: impl Into<ResourceId>) -> People<'_> {
        People::new(uid, None, self.transport())
    }

    /// Single post
    pub fn status(&self, id: impl Into<ResourceId>) -> Status<'_> {
        Status::new(id, None, self.transport())
    }

    /// All posts of a user
    pub fn statuses(&self, uid: impl Into<ResourceId>) -> Paginated<'_> {
        Paginated::new(ResourceKind::Statuses, uid, self.transport(), false)
    }

    /// Original (non-repost) posts of a user
    pub fn origin_statuses(&self, uid: impl Into<ResourceId>) -> Paginated<'_> {
        Paginated::new(ResourceKind::Statuses, uid, self.transport(), true)
    }

    /// Single article
    pub fn article(&self, id: impl Into<ResourceId>) -> Article<'_> {
        Article::new(id, None, self.transport())
    }

    /// Articles of a user
    pub fn articles(&self, uid: impl Into<ResourceId>) -> Paginated<'_> {
        Paginated::new(ResourceKind::Articles, uid, self.transport(), false)
    }

    /// Original (non-repost) articles of a user
    pub fn origin_articles(&self, uid: impl Into<ResourceId>) -> Paginated<'_> {
        Paginated::new(ResourceKind::Articles, uid, self.transport(), true)
    }

    /// Followers of a user
    pub fn followers(&self, uid: impl Into<ResourceId>) -> Paginated<'_> {
        Paginated::new(ResourceKind::Followers, uid, self.transport(), false)
    }

    /// Users a user follows
    pub fn follows(&self, uid: impl Into<ResourceId>) -> Paginated<'_> {
        Paginated::new(ResourceKind::Follows, uid, self.transport(), false)
    }

    /// Any resource by kind
    pub fn resource(&self, kind: ResourceKind, id: impl Into<ResourceId>) -> AnyResource<'_> {
        registry::instantiate(kind, id, self.transport())
    }
}
