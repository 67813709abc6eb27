use shared::{ClientConfig, KeyValueStore, SearchConfig, StoreFactory};
use std::sync::Arc;
use tracing::info;

use crate::categories::CategoryService;
use crate::error::Result;
use crate::favorites::FavoritesStore;
use crate::loading::LoadingState;
use crate::recipes::RecipeService;
use crate::router::SearchRouter;
use crate::search::RecipeSearch;
use crate::transport::{HttpTransport, ReqwestTransport};

/// Entry point that wires one transport into every service.
#[derive(Clone)]
pub struct CookbookClient {
    search: RecipeSearch,
    categories: CategoryService,
    recipes: RecipeService,
    favorites: FavoritesStore,
}

impl CookbookClient {
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::from_config(&config.api)?);
        let store = StoreFactory::from_config(&config.store)?;

        info!(
            "Cookbook client configured for {} ({:?} store)",
            config.api.base_url, config.store.backend
        );

        Ok(Self::with_parts(transport, store, &config.search))
    }

    pub fn with_parts(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn KeyValueStore>,
        search: &SearchConfig,
    ) -> Self {
        let router = SearchRouter::from_config(search);
        Self {
            search: RecipeSearch::new(transport.clone(), router),
            categories: CategoryService::new(transport.clone()),
            recipes: RecipeService::new(transport),
            favorites: FavoritesStore::new(store),
        }
    }

    pub fn search(&self) -> &RecipeSearch {
        &self.search
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn recipes(&self) -> &RecipeService {
        &self.recipes
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn loading(&self) -> &LoadingState {
        self.search.loading()
    }

    /// Drops the loading flag and the category cache.
    pub async fn clear(&self) {
        self.search.loading().reset();
        self.categories.clear().await;
    }
}
