//! Catalog Search Client
//!
//! Free-text and subject search against a book catalog API, plus the
//! mapping from a catalog volume into a tray item. Catalog data is not
//! validated beyond defaulting missing fields.

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{color_for_key, DomainError, DomainResult, Item, ItemKind, Placement};

/// One candidate volume returned by the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub external_id: String,
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub page_count: Option<u32>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
}

impl Volume {
    /// Map this volume into an item bound for the tray.
    ///
    /// The color key is the catalog id so re-importing the same volume
    /// always yields the same tint; titleless volumes get a placeholder.
    pub fn to_item(&self) -> Item {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| "Untitled".to_string());
        let color_key = if self.external_id.is_empty() {
            title.clone()
        } else {
            self.external_id.clone()
        };
        Item {
            id: String::new(),
            kind: ItemKind::Book {
                thumbnail_url: self.thumbnail_url.clone(),
                page_count: self.page_count,
                authors: self.authors.clone(),
                external_id: Some(self.external_id.clone()),
            },
            label: title.clone(),
            title,
            color: color_for_key(&color_key),
            placement: Placement::Unplaced,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Catalog search interface
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Free-text query
    async fn search(&self, query: &str, max_results: u32) -> DomainResult<Vec<Volume>>;

    /// Subject keyword browse, offset into the result set
    async fn by_subject(
        &self,
        subject: &str,
        max_results: u32,
        start_index: u32,
    ) -> DomainResult<Vec<Volume>>;
}

const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// Google Books implementation of the catalog client
pub struct GoogleBooksCatalog {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleBooksCatalog {
    pub fn new() -> Self {
        Self::with_base_url(GOOGLE_BOOKS_BASE_URL)
    }

    /// Point at a different endpoint (tests, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, query: &[(&str, String)]) -> DomainResult<Vec<Volume>> {
        let url = format!("{}/volumes", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DomainError::Internal(format!("catalog request failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(DomainError::Internal(format!(
                "catalog request failed: HTTP {}",
                response.status()
            )));
        }
        let body: VolumesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Internal(format!("catalog response malformed: {}", e)))?;
        Ok(body.items.into_iter().map(ApiVolume::into_volume).collect())
    }
}

impl Default for GoogleBooksCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogClient for GoogleBooksCatalog {
    async fn search(&self, query: &str, max_results: u32) -> DomainResult<Vec<Volume>> {
        self.fetch(&[
            ("q", query.to_string()),
            ("maxResults", max_results.to_string()),
        ])
        .await
    }

    async fn by_subject(
        &self,
        subject: &str,
        max_results: u32,
        start_index: u32,
    ) -> DomainResult<Vec<Volume>> {
        self.fetch(&[
            ("q", format!("subject:{}", subject)),
            ("printType", "books".to_string()),
            ("maxResults", max_results.to_string()),
            ("startIndex", start_index.to_string()),
        ])
        .await
    }
}

// Wire shapes for the volumes endpoint

#[derive(Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<ApiVolume>,
}

#[derive(Deserialize)]
struct ApiVolume {
    id: String,
    #[serde(rename = "volumeInfo", default)]
    info: ApiVolumeInfo,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ApiVolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    page_count: Option<u32>,
    publisher: Option<String>,
    published_date: Option<String>,
    image_links: Option<ApiImageLinks>,
}

#[derive(Deserialize)]
struct ApiImageLinks {
    thumbnail: Option<String>,
}

impl ApiVolume {
    fn into_volume(self) -> Volume {
        Volume {
            external_id: self.id,
            title: self.info.title,
            authors: self.info.authors,
            thumbnail_url: self.info.image_links.and_then(|links| links.thumbnail),
            page_count: self.info.page_count,
            publisher: self.info.publisher,
            published_date: self.info.published_date,
        }
    }
}
