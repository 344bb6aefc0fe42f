//! Storefront REST backend client
//!
//! Thin wrapper over the paginated product list endpoints. The core treats
//! this as opaque I/O: every fetch produces a fresh immutable snapshot for
//! the store, never a mutation of existing state.

use crate::product::Product;
use adorn_common::events::Dataset;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "adorn/0.1.0 (storefront services)";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Hard ceiling on pages walked by `fetch_all`, guarding against a backend
/// that reports a bogus page count
const MAX_PAGES: u32 = 200;

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Dataset not found: {0}")]
    NotFound(String),
}

/// One page of the backend list envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    /// Products on this page, in backend relevance order
    pub items: Vec<Product>,
    /// Total products across all pages
    pub total: u64,
    /// 1-indexed page number
    pub page: u32,
    /// Total page count
    pub pages: u32,
}

/// REST client for the product catalog
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client for the given backend base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of a product collection
    pub async fn fetch_product_page(
        &self,
        dataset: Dataset,
        page: u32,
        limit: u32,
    ) -> Result<ProductPage, CatalogError> {
        let url = format!(
            "{}/products?tab={}&page={}&limit={}",
            self.base_url,
            dataset.tab(),
            page,
            limit
        );

        tracing::debug!(dataset = %dataset, page = page, url = %url, "Fetching product page");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(dataset.tab().to_string()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), error_text));
        }

        let mut product_page: ProductPage = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        // Clamp malformed records (e.g. negative prices) instead of
        // rejecting the page
        product_page.items = product_page
            .items
            .into_iter()
            .map(Product::normalize)
            .collect();

        tracing::info!(
            dataset = %dataset,
            page = product_page.page,
            pages = product_page.pages,
            items = product_page.items.len(),
            "Fetched product page"
        );

        Ok(product_page)
    }

    /// Fetch every page of a collection, concatenated in backend order
    ///
    /// Returns the products plus the backend-reported collection total,
    /// which can exceed the number of products fetched when the page walk
    /// hits the `MAX_PAGES` ceiling.
    pub async fn fetch_all(
        &self,
        dataset: Dataset,
        limit: u32,
    ) -> Result<(Vec<Product>, u64), CatalogError> {
        let first = self.fetch_product_page(dataset, 1, limit).await?;
        let pages = first.pages.min(MAX_PAGES);
        let total = first.total;
        let mut products = first.items;

        for page in 2..=pages {
            let next = self.fetch_product_page(dataset, page, limit).await?;
            if next.items.is_empty() {
                // Backend shrank mid-walk; stop rather than spin
                break;
            }
            products.extend(next.items);
        }

        Ok((products, total))
    }

    /// Backend base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
