//! Resource kinds
//!
//! URL rules per kind, plus thin typed wrappers ([`People`], [`Status`],
//! [`Article`]) that name the fields callers usually want.

use super::base::{Resource, ResourceId};
use super::paginated::Paginated;
use crate::error::Result;
use crate::json::{Field, JsonView};
use crate::weibo::http::{Endpoints, Request, Transport};
use serde_json::{Map, Value};
use std::ops::{Deref, DerefMut};

/// Every kind of object the client knows how to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    People,
    Status,
    Article,
    Statuses,
    Articles,
    Followers,
    Follows,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::People,
        ResourceKind::Status,
        ResourceKind::Article,
        ResourceKind::Statuses,
        ResourceKind::Articles,
        ResourceKind::Followers,
        ResourceKind::Follows,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::People => "people",
            ResourceKind::Status => "status",
            ResourceKind::Article => "article",
            ResourceKind::Statuses => "statuses",
            ResourceKind::Articles => "articles",
            ResourceKind::Followers => "followers",
            ResourceKind::Follows => "follows",
        }
    }

    pub fn is_paginated(self) -> bool {
        matches!(
            self,
            ResourceKind::Statuses
                | ResourceKind::Articles
                | ResourceKind::Followers
                | ResourceKind::Follows
        )
    }

    /// Member of each listing card holding the item
    pub(crate) fn item_key(self) -> &'static str {
        match self {
            ResourceKind::Followers | ResourceKind::Follows => "user",
            _ => "mblog",
        }
    }

    /// Build the request for one object or one listing page
    pub fn request(self, endpoints: &Endpoints, id: &ResourceId, page: u64, original: bool) -> Request {
        let container = format!("{}/api/container/getIndex", endpoints.mobile);
        match self {
            ResourceKind::People => Request::get(container).param("type", "uid").param("value", id),
            ResourceKind::Status => {
                Request::get(format!("{}/statuses/extend", endpoints.mobile)).param("id", id)
            }
            ResourceKind::Article => {
                Request::get(format!("{}/article/m/aj/detail", endpoints.card)).param("id", id)
            }
            ResourceKind::Statuses => {
                let container_id = if original {
                    format!("230413{}_-_WEIBO_SECOND_PROFILE_WEIBO_ORI", id)
                } else {
                    format!("107603{}", id)
                };
                Request::get(container)
                    .param("containerid", container_id)
                    .param("page", page)
            }
            ResourceKind::Articles => Request::get(container)
                .param("containerid", format!("230413{}_-_WEIBO_SECOND_PROFILE_WEIBO_ARTICAL", id))
                .param("page", page),
            ResourceKind::Followers => Request::get(container)
                .param("containerid", format!("231051_-_fans_-_{}", id))
                .param("page", page),
            ResourceKind::Follows => Request::get(container)
                .param("containerid", format!("231051_-_followers_-_{}", id))
                .param("page", page),
        }
    }
}

/// Parse a displayed counter such as `1234`, `"1.2万"` or `"3亿"`.
pub fn parse_count(field: &Field) -> Option<u64> {
    if let Some(n) = field.as_u64() {
        return Some(n);
    }
    let text = field.as_str()?.trim();
    let (number, scale) = if let Some(n) = text.strip_suffix('亿') {
        (n, 100_000_000.0)
    } else if let Some(n) = text.strip_suffix('万') {
        (n, 10_000.0)
    } else if let Some(n) = text.strip_suffix('千') {
        (n, 1_000.0)
    } else {
        (text, 1.0)
    };
    let value: f64 = number.trim().parse().ok()?;
    (value >= 0.0).then(|| (value * scale).round() as u64)
}

macro_rules! typed_resource {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name<'t>(Resource<'t>);

        impl<'t> $name<'t> {
            pub fn new(
                id: impl Into<ResourceId>,
                cache: Option<Map<String, Value>>,
                transport: &'t dyn Transport,
            ) -> Self {
                Self(Resource::new($kind, id, cache, transport))
            }

            pub(crate) fn from_resource(resource: Resource<'t>) -> Self {
                Self(resource)
            }

            pub fn into_inner(self) -> Resource<'t> {
                self.0
            }
        }

        impl<'t> Deref for $name<'t> {
            type Target = Resource<'t>;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl DerefMut for $name<'_> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }
    };
}

typed_resource!(
    /// A user profile
    People,
    ResourceKind::People
);
typed_resource!(
    /// A single post with its long text and counters
    Status,
    ResourceKind::Status
);
typed_resource!(
    /// A long-form article
    Article,
    ResourceKind::Article
);

impl<'t> People<'t> {
    /// The user object: `userInfo` of a fetched profile, or the cached
    /// listing entry itself
    pub async fn profile(&mut self) -> Result<JsonView> {
        let data = self.ensure_data().await?;
        if data.contains_key("userInfo") {
            data.get("userInfo")?.into_view()
        } else {
            Ok(data.clone())
        }
    }

    pub async fn name(&mut self) -> Result<Field> {
        self.profile().await?.get("screen_name")
    }

    pub async fn description(&mut self) -> Result<Field> {
        self.profile().await?.get("description")
    }

    pub async fn gender(&mut self) -> Result<Field> {
        self.profile().await?.get("gender")
    }

    pub async fn avatar(&mut self) -> Result<Field> {
        self.profile().await?.get("avatar_hd")
    }

    pub async fn followers_count(&mut self) -> Result<Field> {
        self.profile().await?.get("followers_count")
    }

    pub async fn follow_count(&mut self) -> Result<Field> {
        self.profile().await?.get("follow_count")
    }

    /// This user's followers, one page at a time
    pub fn followers(&self) -> Paginated<'t> {
        Paginated::new(ResourceKind::Followers, self.id().clone(), self.transport(), false)
    }

    /// Users this user follows, one page at a time
    pub fn follows(&self) -> Paginated<'t> {
        Paginated::new(ResourceKind::Follows, self.id().clone(), self.transport(), false)
    }

    /// This user's posts, one page at a time
    pub fn statuses(&self, original: bool) -> Paginated<'t> {
        Paginated::new(ResourceKind::Statuses, self.id().clone(), self.transport(), original)
    }
}

impl Status<'_> {
    /// Full text of the post
    pub async fn text(&mut self) -> Result<Field> {
        self.field("longTextContent").await
    }

    pub async fn attitudes_count(&mut self) -> Result<Field> {
        self.field("attitudes_count").await
    }

    pub async fn comments_count(&mut self) -> Result<Field> {
        self.field("comments_count").await
    }

    pub async fn reposts_count(&mut self) -> Result<Field> {
        self.field("reposts_count").await
    }
}

impl Article<'_> {
    pub async fn title(&mut self) -> Result<Field> {
        self.field("title").await
    }

    pub async fn content(&mut self) -> Result<Field> {
        self.field("content").await
    }
}
