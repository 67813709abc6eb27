//! Client SDK for the recipe-sharing API.
//!
//! [`SearchRouter`] decides which search endpoint serves a request, the
//! [`query`] module turns searches into shareable links and back, and
//! [`CookbookClient`] bundles the services behind one transport.

pub mod categories;
pub mod client;
pub mod draft;
pub mod error;
pub mod favorites;
pub mod loading;
pub mod params;
pub mod query;
pub mod recipes;
pub mod router;
pub mod search;
pub mod transport;

pub use categories::{default_categories, CategoryService, CategorySet, CategorySource};
pub use client::CookbookClient;
pub use draft::{DraftIssue, RecipeDraft};
pub use error::{ClientError, Result};
pub use favorites::{FavoritesStore, FAVORITES_KEY};
pub use loading::{LoadingGuard, LoadingState};
pub use params::{NormalizedParams, ParamValue, SearchParams};
pub use query::{build_shareable_query, parse_shareable_query};
pub use recipes::RecipeService;
pub use router::{
    ComplexOrderings, OrderingClass, RoutedRequest, SearchEndpoints, SearchRouter, SearchSurface,
};
pub use search::RecipeSearch;
pub use transport::{ApiRequest, HttpMethod, HttpTransport, Payload, ReqwestTransport};
