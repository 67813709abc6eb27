use serde::Deserialize;
use shared::{PaginatedResult, RecipeListItem, SearchSuggestion};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::loading::LoadingState;
use crate::params::SearchParams;
use crate::router::{RoutedRequest, SearchRouter};
use crate::transport::{send_json, HttpTransport};

/// Queries shorter than this (after trimming) never reach the backend.
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuggestionListing {
    Plain(Vec<SearchSuggestion>),
    Wrapped { suggestions: Vec<SearchSuggestion> },
}

#[derive(Clone)]
pub struct RecipeSearch {
    transport: Arc<dyn HttpTransport>,
    router: SearchRouter,
    loading: LoadingState,
}

impl RecipeSearch {
    pub fn new(transport: Arc<dyn HttpTransport>, router: SearchRouter) -> Self {
        Self::with_loading(transport, router, LoadingState::new())
    }

    pub fn with_loading(
        transport: Arc<dyn HttpTransport>,
        router: SearchRouter,
        loading: LoadingState,
    ) -> Self {
        Self {
            transport,
            router,
            loading,
        }
    }

    pub fn router(&self) -> &SearchRouter {
        &self.router
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    /// Routes by ordering and issues exactly one request. Failures propagate unchanged.
    #[instrument(skip(self, params), fields(ordering = ?params.ordering))]
    pub async fn search(&self, params: &SearchParams) -> Result<PaginatedResult<RecipeListItem>> {
        let routed = self.router.route(params);
        self.execute(routed).await
    }

    pub async fn text_search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<PaginatedResult<RecipeListItem>> {
        let mut params = params.clone();
        params.q = Some(query.to_string());
        let routed = self.router.route_text_search(&params);
        self.execute(routed).await
    }

    pub async fn suggestions(&self, query: &str) -> Result<Vec<SearchSuggestion>> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_QUERY_LEN {
            return Ok(Vec::new());
        }

        let request = self.router.suggestions_request(query);
        let listing: SuggestionListing = send_json(self.transport.as_ref(), &request).await?;

        Ok(match listing {
            SuggestionListing::Plain(suggestions) => suggestions,
            SuggestionListing::Wrapped { suggestions } => suggestions,
        })
    }

    async fn execute(&self, routed: RoutedRequest) -> Result<PaginatedResult<RecipeListItem>> {
        let _guard = self.loading.begin();
        debug!(
            "Searching via {:?} surface: {} {}",
            routed.surface,
            routed.method(),
            routed.path()
        );

        let page: PaginatedResult<RecipeListItem> =
            send_json(self.transport.as_ref(), &routed.request).await?;

        debug!("Search returned {} of {} recipes", page.results.len(), page.count);
        Ok(page)
    }
}
