//! Paginated resources
//!
//! Post, article and relationship listings are fetched one page at a time.
//! Each [`Paginated::fetch_page`] call issues its own request and returns a
//! fresh view over that page's items; nothing is accumulated across pages and
//! the listing's own cache/data are left alone.
//!
//! # Termination
//!
//! The upstream API has no reliable "last page" marker, so neither does this
//! type. Stop iterating when a page comes back empty, when the advertised
//! total ([`Paginated::total_items`]) is reached, or after a page limit of
//! your choosing. [`Paginated::next_page`] implements the first rule.
//!
//! ```ignore
//! let mut follows = client.follows(1815418641);
//! let mut pages = 0;
//! while let Some(page) = follows.next_page().await? {
//!     for user in page.values() {
//!         println!("{}", user.into_value());
//!     }
//!     pages += 1;
//!     if pages == 10 {
//!         break;
//!     }
//! }
//! ```

use super::base::{Resource, ResourceId, Snapshot};
use super::fetcher;
use super::kinds::ResourceKind;
use crate::error::{Error, Result};
use crate::json::{Field, JsonView};
use crate::weibo::http::{Request, Transport};
use serde_json::{Map, Value};

/// A listing with a page cursor
#[derive(Debug)]
pub struct Paginated<'t> {
    resource: Resource<'t>,
    page_number: u64,
    original: bool,
}

fn validate_page(page: i64) -> Result<u64> {
    u64::try_from(page)
        .ok()
        .filter(|page| *page >= 1)
        .ok_or(Error::InvalidPage { page })
}

impl<'t> Paginated<'t> {
    /// Listing starting at page 1. `original` keeps only original
    /// (non-repost) items and is fixed for the listing's lifetime.
    pub fn new(
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        transport: &'t dyn Transport,
        original: bool,
    ) -> Self {
        Self::from_resource(Resource::new(kind, id, None, transport), original)
    }

    pub fn with_cache(
        kind: ResourceKind,
        id: impl Into<ResourceId>,
        cache: Map<String, Value>,
        transport: &'t dyn Transport,
        original: bool,
    ) -> Self {
        Self::from_resource(Resource::new(kind, id, Some(cache), transport), original)
    }

    pub(crate) fn from_resource(resource: Resource<'t>, original: bool) -> Self {
        Self {
            resource,
            page_number: 1,
            original,
        }
    }

    pub fn resource(&self) -> &Resource<'t> {
        &self.resource
    }

    pub fn id(&self) -> &ResourceId {
        self.resource.id()
    }

    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }

    pub fn is_original(&self) -> bool {
        self.original
    }

    pub fn page_number(&self) -> u64 {
        self.page_number
    }

    /// Move the cursor; pages start at 1
    pub fn set_page_number(&mut self, page: i64) -> Result<()> {
        self.page_number = validate_page(page)?;
        Ok(())
    }

    /// Request for a given page of this listing
    pub fn request_for_page(&self, page: u64) -> Request {
        self.resource.request_at(page, self.original)
    }

    /// The listing's own data, fetched at the current cursor if needed
    pub async fn ensure_data(&mut self) -> Result<&JsonView> {
        self.resource
            .ensure_data_at(self.page_number, self.original)
            .await
    }

    pub async fn field(&mut self, name: &str) -> Result<Field> {
        self.ensure_data().await?.get(name)
    }

    pub fn refresh(&mut self) {
        self.resource.refresh();
    }

    pub async fn snapshot_with_provenance(&mut self) -> Result<Snapshot> {
        self.resource
            .snapshot_at(self.page_number, self.original)
            .await
    }

    async fn fetch_envelope(&mut self, page: u64) -> Result<Value> {
        self.page_number = page;
        let request = self.request_for_page(page);
        tracing::debug!(
            "fetching {} {} page {}",
            self.kind().name(),
            self.id(),
            page
        );
        fetcher::fetch_envelope(self.resource.transport(), &request).await
    }

    /// Normalized payload of page `page`, including listing metadata
    pub async fn fetch_page_payload(&mut self, page: i64) -> Result<JsonView> {
        let page = validate_page(page)?;
        JsonView::wrap(self.fetch_envelope(page).await?)
    }

    /// Items of page `page` as a new array view
    pub async fn fetch_page(&mut self, page: i64) -> Result<JsonView> {
        let page = validate_page(page)?;
        self.fetch_items(page).await
    }

    async fn fetch_items(&mut self, page: u64) -> Result<JsonView> {
        let payload = self.fetch_envelope(page).await?;
        let items = fetcher::extract_items(&payload, self.kind().item_key(), self.original);
        JsonView::wrap(Value::Array(items))
    }

    /// Fetch the page under the cursor. Returns `None` for an empty page,
    /// otherwise advances the cursor by one.
    pub async fn next_page(&mut self) -> Result<Option<JsonView>> {
        let page = self.page_number;
        let items = self.fetch_items(page).await?;
        if items.is_empty() {
            return Ok(None);
        }
        self.page_number = page.saturating_add(1);
        Ok(Some(items))
    }

    /// Total advertised in `cardlistInfo.total` of a page payload
    pub fn total_items(payload: &JsonView) -> Option<u64> {
        let total = payload.get_path("cardlistInfo.total").ok()?;
        total
            .as_u64()
            .or_else(|| total.as_str().and_then(|s| s.parse().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_total_items() {
        let page = JsonView::wrap(json!({"cardlistInfo": {"total": 100}, "cards": []})).unwrap();
        assert_eq!(Paginated::total_items(&page), Some(100));
        let page = JsonView::wrap(json!({"cardlistInfo": {"total": "42"}})).unwrap();
        assert_eq!(Paginated::total_items(&page), Some(42));
        let page = JsonView::wrap(json!({"cards": []})).unwrap();
        assert_eq!(Paginated::total_items(&page), None);
    }

    #[test]
    fn test_validate_page() {
        assert_eq!(validate_page(1).unwrap(), 1);
        assert_eq!(validate_page(7).unwrap(), 7);
        assert!(matches!(validate_page(0), Err(Error::InvalidPage { page: 0 })));
        assert!(matches!(validate_page(-1), Err(Error::InvalidPage { page: -1 })));
        assert_eq!(validate_page(5_000_000_000).unwrap(), 5_000_000_000);
        assert_eq!(validate_page(i64::MAX).unwrap(), i64::MAX as u64);
        assert!(matches!(
            validate_page(i64::MIN),
            Err(Error::InvalidPage { .. })
        ));
    }
}
