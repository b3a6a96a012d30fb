//! Resource Registry
//!
//! Maps resource type names to [`ResourceKind`]s and kinds to constructors,
//! so objects embedded in one payload (a user inside a follower listing, a
//! post inside a timeline) can be turned into resources of their own.

use super::base::{Resource, ResourceId, Snapshot};
use super::kinds::{Article, People, ResourceKind, Status};
use super::paginated::Paginated;
use crate::error::{Error, Result};
use crate::json::JsonView;
use crate::weibo::http::Transport;

/// Builds a resource of one kind from an id and an optional seed cache
pub type Constructor = for<'t> fn(ResourceId, Option<JsonView>, &'t dyn Transport) -> AnyResource<'t>;

/// Registry entry
pub struct Entry {
    pub name: &'static str,
    pub kind: ResourceKind,
    pub construct: Constructor,
}

/// Every registered resource type, looked up case-insensitively by name
pub static REGISTRY: &[Entry] = &[
    Entry {
        name: "people",
        kind: ResourceKind::People,
        construct: construct_people,
    },
    Entry {
        name: "status",
        kind: ResourceKind::Status,
        construct: construct_status,
    },
    Entry {
        name: "article",
        kind: ResourceKind::Article,
        construct: construct_article,
    },
    Entry {
        name: "statuses",
        kind: ResourceKind::Statuses,
        construct: construct_statuses,
    },
    Entry {
        name: "articles",
        kind: ResourceKind::Articles,
        construct: construct_articles,
    },
    Entry {
        name: "followers",
        kind: ResourceKind::Followers,
        construct: construct_followers,
    },
    Entry {
        name: "follows",
        kind: ResourceKind::Follows,
        construct: construct_follows,
    },
];

fn construct_people<'t>(id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    AnyResource::People(People::from_resource(Resource::from_parts(ResourceKind::People, id, cache, transport)))
}

fn construct_status<'t>(id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    AnyResource::Status(Status::from_resource(Resource::from_parts(ResourceKind::Status, id, cache, transport)))
}

fn construct_article<'t>(id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    AnyResource::Article(Article::from_resource(Resource::from_parts(ResourceKind::Article, id, cache, transport)))
}

fn listing<'t>(kind: ResourceKind, id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    AnyResource::Listing(Paginated::from_resource(Resource::from_parts(kind, id, cache, transport), false))
}

fn construct_statuses<'t>(id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    listing(ResourceKind::Statuses, id, cache, transport)
}

fn construct_articles<'t>(id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    listing(ResourceKind::Articles, id, cache, transport)
}

fn construct_followers<'t>(id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    listing(ResourceKind::Followers, id, cache, transport)
}

fn construct_follows<'t>(id: ResourceId, cache: Option<JsonView>, transport: &'t dyn Transport) -> AnyResource<'t> {
    listing(ResourceKind::Follows, id, cache, transport)
}

/// A resource of any registered kind
#[derive(Debug)]
pub enum AnyResource<'t> {
    People(People<'t>),
    Status(Status<'t>),
    Article(Article<'t>),
    Listing(Paginated<'t>),
}

impl<'t> AnyResource<'t> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            AnyResource::People(r) => r.kind(),
            AnyResource::Status(r) => r.kind(),
            AnyResource::Article(r) => r.kind(),
            AnyResource::Listing(r) => r.kind(),
        }
    }

    pub fn id(&self) -> &ResourceId {
        match self {
            AnyResource::People(r) => r.id(),
            AnyResource::Status(r) => r.id(),
            AnyResource::Article(r) => r.id(),
            AnyResource::Listing(r) => r.id(),
        }
    }

    /// The underlying single-object resource (a listing's own resource for
    /// [`AnyResource::Listing`])
    pub fn resource(&self) -> &Resource<'t> {
        match self {
            AnyResource::People(r) => &**r,
            AnyResource::Status(r) => &**r,
            AnyResource::Article(r) => &**r,
            AnyResource::Listing(r) => r.resource(),
        }
    }

    pub async fn ensure_data(&mut self) -> Result<&JsonView> {
        match self {
            AnyResource::People(r) => r.ensure_data().await,
            AnyResource::Status(r) => r.ensure_data().await,
            AnyResource::Article(r) => r.ensure_data().await,
            AnyResource::Listing(r) => r.ensure_data().await,
        }
    }

    pub fn refresh(&mut self) {
        match self {
            AnyResource::People(r) => r.refresh(),
            AnyResource::Status(r) => r.refresh(),
            AnyResource::Article(r) => r.refresh(),
            AnyResource::Listing(r) => r.refresh(),
        }
    }

    pub async fn snapshot_with_provenance(&mut self) -> Result<Snapshot> {
        match self {
            AnyResource::People(r) => r.snapshot_with_provenance().await,
            AnyResource::Status(r) => r.snapshot_with_provenance().await,
            AnyResource::Article(r) => r.snapshot_with_provenance().await,
            AnyResource::Listing(r) => r.snapshot_with_provenance().await,
        }
    }

    pub fn into_listing(self) -> Option<Paginated<'t>> {
        match self {
            AnyResource::Listing(listing) => Some(listing),
            _ => None,
        }
    }
}

fn entry(kind: ResourceKind) -> &'static Entry {
    // Every kind has exactly one entry; the table is checked by the tests.
    REGISTRY
        .iter()
        .find(|entry| entry.kind == kind)
        .unwrap_or(&REGISTRY[0])
}

/// Look up a resource type by name, ignoring case
pub fn resolve(name: &str) -> Result<ResourceKind> {
    REGISTRY
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .map(|entry| entry.kind)
        .ok_or_else(|| Error::UnknownResourceType {
            name: name.to_string(),
        })
}

/// All registered names (for completion and help output)
pub fn registered_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|entry| entry.name).collect()
}

/// Build a bare resource of `kind`
pub fn instantiate<'t>(kind: ResourceKind, id: impl Into<ResourceId>, transport: &'t dyn Transport) -> AnyResource<'t> {
    (entry(kind).construct)(id.into(), None, transport)
}

/// Build a resource from an embedded payload exposing an `id` field.
///
/// With `use_cache` the payload seeds the cache and reads never fetch;
/// without it the resource starts empty and fetches on first read.
pub fn instantiate_from_payload<'t>(
    payload: &JsonView,
    kind: ResourceKind,
    transport: &'t dyn Transport,
    use_cache: bool,
) -> Result<AnyResource<'t>> {
    let id = ResourceId::from_field(&payload.get("id")?, kind)?;
    let cache = use_cache.then(|| payload.clone());
    Ok((entry(kind).construct)(id, cache, transport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::weibo::http::{RawResponse, Request};
    use async_trait::async_trait;
    use serde_json::json;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn execute(&self, _request: &Request) -> std::result::Result<RawResponse, TransportError> {
            Err("network disabled in tests".into())
        }
    }

    #[test]
    fn test_every_kind_registered_once() {
        for kind in ResourceKind::ALL {
            let entries = REGISTRY.iter().filter(|entry| entry.kind == kind).count();
            assert_eq!(entries, 1, "{:?} should have exactly one entry", kind);
            assert_eq!(entry(kind).name, kind.name());
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(resolve("people").unwrap(), ResourceKind::People);
        assert_eq!(resolve("People").unwrap(), ResourceKind::People);
        assert_eq!(resolve("PEOPLE").unwrap(), ResourceKind::People);
        assert_eq!(resolve("Status").unwrap(), ResourceKind::Status);
        assert_eq!(resolve("article").unwrap(), ResourceKind::Article);
    }

    #[test]
    fn test_resolve_unknown() {
        match resolve("comment") {
            Err(Error::UnknownResourceType { name }) => assert_eq!(name, "comment"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_registered_names() {
        let names = registered_names();
        assert!(names.contains(&"people"));
        assert!(names.contains(&"follows"));
    }

    #[test]
    fn test_instantiate_with_cache() {
        let payload = JsonView::wrap(json!({"id": 1815418641, "screen_name": "测试用户"})).unwrap();
        let resource = instantiate_from_payload(&payload, ResourceKind::People, &Unreachable, true).unwrap();
        assert!(matches!(resource, AnyResource::People(_)));
        assert_eq!(resource.id(), &ResourceId::Int(1815418641));
        assert_eq!(resource.resource().cache(), Some(&payload));
    }

    #[test]
    fn test_instantiate_without_cache() {
        let payload = JsonView::wrap(json!({"id": "Mx9", "text": "hi"})).unwrap();
        let resource = instantiate_from_payload(&payload, ResourceKind::Status, &Unreachable, false).unwrap();
        assert!(matches!(resource, AnyResource::Status(_)));
        assert!(resource.resource().cache().is_none());
    }

    #[test]
    fn test_instantiate_listing_kind() {
        let resource = instantiate(ResourceKind::Follows, 42, &Unreachable);
        let listing = resource.into_listing().unwrap();
        assert_eq!(listing.page_number(), 1);
        assert_eq!(listing.kind(), ResourceKind::Follows);
    }

    #[test]
    fn test_instantiate_requires_id() {
        let payload = JsonView::wrap(json!({"screen_name": "no id"})).unwrap();
        assert!(matches!(
            instantiate_from_payload(&payload, ResourceKind::People, &Unreachable, true),
            Err(Error::MissingField { .. })
        ));

        let payload = JsonView::wrap(json!({"id": {"nested": true}})).unwrap();
        assert!(matches!(
            instantiate_from_payload(&payload, ResourceKind::People, &Unreachable, true),
            Err(Error::InvalidId { .. })
        ));
    }
}
