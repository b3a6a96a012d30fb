//! Resource base
//!
//! A [`Resource`] is one Weibo object (a user, a post, an article, a listing)
//! identified by an id. Its JSON comes from one of two places:
//!
//! - `cache`: data the caller already had, for example a user embedded in a
//!   follower listing. Once seeded it is always preferred.
//! - `data`: the normalized payload of a fetch, populated by
//!   [`Resource::ensure_data`] only when there is no cache and nothing was
//!   fetched yet.
//!
//! [`Resource::refresh`] drops both, so the next read fetches again.

use super::fetcher;
use super::kinds::ResourceKind;
use crate::error::{Error, Result};
use crate::json::{Field, JsonView};
use crate::weibo::http::{Request, Transport};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Object id: numeric for users, string for posts and articles
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Str(String),
}

impl ResourceId {
    /// Read an id from a JSON field, rejecting anything but strings and integers
    pub fn from_field(field: &Field, kind: ResourceKind) -> Result<Self> {
        match field.as_scalar() {
            Some(Value::String(s)) => Ok(ResourceId::Str(s.clone())),
            Some(Value::Number(n)) if n.is_i64() => Ok(ResourceId::Int(n.as_i64().unwrap_or_default())),
            Some(Value::Number(n)) if n.is_u64() => i64::try_from(n.as_u64().unwrap_or_default())
                .map(ResourceId::Int)
                .map_err(|_| Error::InvalidId {
                    kind: kind.name(),
                    found: n.to_string(),
                }),
            Some(other) => Err(Error::InvalidId {
                kind: kind.name(),
                found: other.to_string(),
            }),
            None => Err(Error::InvalidId {
                kind: kind.name(),
                found: "a nested object or array".to_string(),
            }),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(id) => write!(f, "{}", id),
            ResourceId::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        ResourceId::Int(id)
    }
}

impl From<i32> for ResourceId {
    fn from(id: i32) -> Self {
        ResourceId::Int(i64::from(id))
    }
}

impl From<u32> for ResourceId {
    fn from(id: u32) -> Self {
        ResourceId::Int(i64::from(id))
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        ResourceId::Str(id.to_string())
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        ResourceId::Str(id)
    }
}

/// Where reads are currently served from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    /// Nothing known yet; the next read fetches
    Empty,
    /// Seeded by the caller; reads never fetch
    Cached,
    /// Populated by a previous fetch
    Fetched,
}

/// Provenance of a [`Snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Data,
}

/// Deep copy of a resource's JSON, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub source: Source,
    pub value: Value,
}

impl Snapshot {
    /// True if producing this snapshot needed no network round-trip
    pub fn is_cached(&self) -> bool {
        self.source == Source::Cache
    }
}

/// Lazily fetched Weibo object
pub struct Resource<'t> {
    kind: ResourceKind,
    id: ResourceId,
    cache: Option<JsonView>,
    data: Option<JsonView>,
    refresh_count: u32,
    transport: &'t dyn Transport,
}

impl<'t> Resource<'t> {
    pub fn new(
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        cache: Option<Map<String, Value>>,
        transport: &'t dyn Transport,
    ) -> Self {
        Self::from_parts(kind, id.into(), cache.map(JsonView::from_map), transport)
    }

    pub(crate) fn from_parts(
        kind: ResourceKind,
        id: ResourceId,
        cache: Option<JsonView>,
        transport: &'t dyn Transport,
    ) -> Self {
        Self {
            kind,
            id,
            cache,
            data: None,
            refresh_count: 0,
            transport,
        }
    }

    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn transport(&self) -> &'t dyn Transport {
        self.transport
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_count
    }

    pub fn cache(&self) -> Option<&JsonView> {
        self.cache.as_ref()
    }

    pub fn data(&self) -> Option<&JsonView> {
        self.data.as_ref()
    }

    pub fn state(&self) -> DataState {
        match (&self.cache, &self.data) {
            (Some(_), _) => DataState::Cached,
            (None, Some(_)) => DataState::Fetched,
            (None, None) => DataState::Empty,
        }
    }

    /// Request that [`ensure_data`](Self::ensure_data) would send
    pub fn request(&self) -> Request {
        self.request_at(1, false)
    }

    pub(crate) fn request_at(&self, page: u64, original: bool) -> Request {
        self.kind
            .request(self.transport.endpoints(), &self.id, page, original)
    }

    /// Cached data, else previously fetched data, else exactly one fetch.
    ///
    /// A failed fetch leaves `data` absent; nothing is retried.
    pub async fn ensure_data(&mut self) -> Result<&JsonView> {
        self.ensure_data_at(1, false).await
    }

    pub(crate) async fn ensure_data_at(&mut self, page: u64, original: bool) -> Result<&JsonView> {
        if let Some(cache) = &self.cache {
            return Ok(cache);
        }

        match self.data {
            Some(ref data) => Ok(data),
            None => {
                let request = self.request_at(page, original);
                tracing::debug!("fetching {} {}", self.kind.name(), self.id);
                let view = fetcher::fetch_object(self.transport, &request).await?;
                Ok(self.data.insert(view))
            }
        }
    }

    /// Read one top-level field, fetching first if needed
    pub async fn field(&mut self, name: &str) -> Result<Field> {
        self.ensure_data().await?.get(name)
    }

    /// Forget cache and fetched data. No request is made until the next read.
    pub fn refresh(&mut self) {
        self.cache = None;
        self.data = None;
        self.refresh_count += 1;
        tracing::info!(
            "refreshed {} {} ({} times)",
            self.kind.name(),
            self.id,
            self.refresh_count
        );
    }

    /// Deep copy of the current JSON and whether it came from cache or a fetch
    pub async fn snapshot_with_provenance(&mut self) -> Result<Snapshot> {
        self.snapshot_at(1, false).await
    }

    pub(crate) async fn snapshot_at(&mut self, page: u64, original: bool) -> Result<Snapshot> {
        self.ensure_data_at(page, original).await?;
        let (source, view) = match (&self.cache, &self.data) {
            (Some(cache), _) => (Source::Cache, cache),
            (None, Some(data)) => (Source::Data, data),
            (None, None) => {
                return Err(Error::MissingField {
                    path: "$".to_string(),
                    field: "data".to_string(),
                })
            }
        };
        Ok(Snapshot {
            source,
            value: view.snapshot(),
        })
    }
}

impl fmt::Debug for Resource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("state", &self.state())
            .field("refresh_count", &self.refresh_count)
            .finish()
    }
}
