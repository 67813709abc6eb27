use serde_json::json;
use shared::{FavoriteStatus, NewRating, PaginatedResult, Rating, Recipe, RecipeId, RecipeListItem};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::draft::RecipeDraft;
use crate::error::{ClientError, Result};
use crate::transport::{send_json, ApiRequest, HttpTransport};

pub const MAX_REVIEW_LEN: usize = 2000;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Clone)]
pub struct RecipeService {
    transport: Arc<dyn HttpTransport>,
}

impl RecipeService {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub async fn get(&self, id: RecipeId) -> Result<Recipe> {
        let request = ApiRequest::get(format!("/recipes/{}/", id));
        send_json(self.transport.as_ref(), &request).await
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &RecipeDraft) -> Result<Recipe> {
        check_draft(draft)?;
        let request = ApiRequest::post("/recipes/", draft.to_payload());
        send_json(self.transport.as_ref(), &request).await
    }

    pub async fn update(&self, id: RecipeId, draft: &RecipeDraft) -> Result<Recipe> {
        check_draft(draft)?;
        let request = ApiRequest::put(format!("/recipes/{}/", id), draft.to_payload());
        send_json(self.transport.as_ref(), &request).await
    }

    pub async fn delete(&self, id: RecipeId) -> Result<()> {
        let request = ApiRequest::delete(format!("/recipes/{}/", id));
        self.transport.send(&request).await?;
        debug!("Deleted recipe {}", id);
        Ok(())
    }

    /// Toggles the server-side favorite flag. Failures are logged and reported as
    /// "not a favorite" instead of being returned.
    pub async fn toggle_favorite(&self, id: RecipeId) -> FavoriteStatus {
        let request = ApiRequest::post(format!("/recipes/{}/favorite/", id), json!({}));
        match send_json::<FavoriteStatus>(self.transport.as_ref(), &request).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Failed to toggle favorite for recipe {}: {}", id, e);
                FavoriteStatus::default()
            }
        }
    }

    pub async fn favorites(&self, page: Option<u32>) -> Result<PaginatedResult<RecipeListItem>> {
        let request = ApiRequest::get_with_query("/recipes/favorites/", page_query(page));
        send_json(self.transport.as_ref(), &request).await
    }

    pub async fn ratings(
        &self,
        id: RecipeId,
        page: Option<u32>,
    ) -> Result<PaginatedResult<Rating>> {
        let request =
            ApiRequest::get_with_query(format!("/recipes/{}/ratings/", id), page_query(page));
        send_json(self.transport.as_ref(), &request).await
    }

    pub async fn rate(&self, id: RecipeId, rating: &NewRating) -> Result<Rating> {
        check_rating(rating)?;
        let body = serde_json::to_value(rating)
            .map_err(|e| ClientError::Validation(format!("Unserializable rating: {}", e)))?;
        let request = ApiRequest::post(format!("/recipes/{}/ratings/", id), body);
        send_json(self.transport.as_ref(), &request).await
    }
}

fn page_query(page: Option<u32>) -> Vec<(String, String)> {
    page.map(|page| vec![("page".to_string(), page.to_string())])
        .unwrap_or_default()
}

fn check_draft(draft: &RecipeDraft) -> Result<()> {
    let issues = draft.validate();
    if issues.is_empty() {
        return Ok(());
    }
    let message = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(ClientError::Validation(message))
}

fn check_rating(rating: &NewRating) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating.rating) {
        return Err(ClientError::Validation(format!(
            "rating must be between {} and {}, got {}",
            MIN_RATING, MAX_RATING, rating.rating
        )));
    }
    if let Some(review) = &rating.review {
        let len = review.chars().count();
        if len > MAX_REVIEW_LEN {
            return Err(ClientError::Validation(format!(
                "review must be at most {} characters, got {}",
                MAX_REVIEW_LEN, len
            )));
        }
    }
    Ok(())
}
