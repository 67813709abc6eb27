use serde::Deserialize;
use shared::{Category, PaginatedResult};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::transport::{send_json, ApiRequest, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySource {
    Tree,
    Flat,
    Fallback,
}

impl CategorySource {
    pub fn is_backend(&self) -> bool {
        !matches!(self, CategorySource::Fallback)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySet {
    pub source: CategorySource,
    pub categories: Arc<Vec<Category>>,
}

impl CategorySet {
    pub fn new(source: CategorySource, categories: Vec<Category>) -> Self {
        Self {
            source,
            categories: Arc::new(categories),
        }
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Category> {
        Category::find_by_slug(&self.categories, slug)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Built-in set used when neither category endpoint answers.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(1, "Main Dishes", "main-dishes"),
        Category::new(2, "Appetizers", "appetizers"),
        Category::new(3, "Desserts", "desserts"),
        Category::new(4, "Beverages", "beverages"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEndpoints {
    pub tree: String,
    pub flat: String,
}

impl Default for CategoryEndpoints {
    fn default() -> Self {
        Self {
            tree: "/categories/tree/".to_string(),
            flat: "/categories/".to_string(),
        }
    }
}

/// The flat endpoint answers either with a bare array or a page envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryListing {
    Paged(PaginatedResult<Category>),
    Plain(Vec<Category>),
}

impl CategoryListing {
    fn into_categories(self) -> Vec<Category> {
        match self {
            CategoryListing::Paged(page) => page.results,
            CategoryListing::Plain(categories) => categories,
        }
    }
}

#[derive(Clone)]
pub struct CategoryService {
    transport: Arc<dyn HttpTransport>,
    endpoints: CategoryEndpoints,
    cache: Arc<RwLock<Option<CategorySet>>>,
}

impl CategoryService {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            endpoints: CategoryEndpoints::default(),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_endpoints(mut self, endpoints: CategoryEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Cached categories, or a fresh lookup on a cold cache. Never fails.
    pub async fn categories(&self) -> CategorySet {
        if let Some(cached) = self.cached().await {
            debug!("Serving {} categories from cache", cached.len());
            return cached;
        }
        self.refresh().await
    }

    /// Runs the lookup chain again. A fallback result leaves the previous cache in place.
    pub async fn refresh(&self) -> CategorySet {
        let set = self.fetch_with_fallback().await;

        if set.source.is_backend() {
            let mut cache = self.cache.write().await;
            *cache = Some(set.clone());
            info!(
                "Category cache refreshed with {} categories from {:?}",
                set.len(),
                set.source
            );
        }

        set
    }

    pub async fn cached(&self) -> Option<CategorySet> {
        self.cache.read().await.clone()
    }

    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }

    /// Tree endpoint, then the flat list, then [`default_categories`]. Each tier is tried once.
    pub async fn fetch_with_fallback(&self) -> CategorySet {
        match self.fetch_tree().await {
            Ok(categories) => return CategorySet::new(CategorySource::Tree, categories),
            Err(e) => warn!("Category tree unavailable, trying flat list: {}", e),
        }

        match self.fetch_flat().await {
            Ok(categories) => return CategorySet::new(CategorySource::Flat, categories),
            Err(e) => warn!("Category list unavailable, using built-in categories: {}", e),
        }

        CategorySet::new(CategorySource::Fallback, default_categories())
    }

    async fn fetch_tree(&self) -> Result<Vec<Category>> {
        let request = ApiRequest::get(self.endpoints.tree.clone());
        send_json(self.transport.as_ref(), &request).await
    }

    async fn fetch_flat(&self) -> Result<Vec<Category>> {
        let request = ApiRequest::get(self.endpoints.flat.clone());
        let listing: CategoryListing = send_json(self.transport.as_ref(), &request).await?;
        Ok(listing.into_categories())
    }
}
