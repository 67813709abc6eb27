use shared::SearchConfig;
use std::collections::BTreeSet;

use crate::params::{ParamValue, SearchParams};
use crate::transport::{ApiRequest, HttpMethod, Payload};

pub const RELEVANCE_ORDERING: &str = "relevance";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSurface {
    /// Plain list-and-filter endpoint with database ordering.
    List,
    /// Ranked search that can aggregate (ratings, popularity).
    Advanced,
    /// Free-text relevance search.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingClass {
    Simple,
    Complex,
}

/// Orderings the list endpoint cannot serve. This is a backend capability, so it is
/// configured rather than inferred from the ordering name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexOrderings(BTreeSet<String>);

impl ComplexOrderings {
    pub fn new<I, S>(orderings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(orderings.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, ordering: &str) -> bool {
        self.0.contains(ordering)
    }

    pub fn classify(&self, ordering: Option<&str>) -> OrderingClass {
        match ordering {
            Some(ordering) if self.contains(ordering) => OrderingClass::Complex,
            _ => OrderingClass::Simple,
        }
    }
}

impl Default for ComplexOrderings {
    fn default() -> Self {
        Self::new(shared::config::DEFAULT_COMPLEX_ORDERINGS.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoints {
    pub list: String,
    pub advanced: String,
    pub text: String,
    pub suggestions: String,
}

impl Default for SearchEndpoints {
    fn default() -> Self {
        Self {
            list: "/recipes/".to_string(),
            advanced: "/recipes/search/advanced/".to_string(),
            text: "/recipes/search/".to_string(),
            suggestions: "/recipes/search/suggestions/".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutedRequest {
    pub surface: SearchSurface,
    pub request: ApiRequest,
}

impl RoutedRequest {
    pub fn method(&self) -> HttpMethod {
        self.request.method
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    pub fn payload(&self) -> &Payload {
        &self.request.payload
    }
}

/// Decides which search surface serves a set of parameters and shapes the call.
///
/// Exactly one request comes out of every routing decision. Parameters are
/// normalized first, so nothing absent, null or empty ever reaches the wire.
#[derive(Debug, Clone)]
pub struct SearchRouter {
    endpoints: SearchEndpoints,
    complex_orderings: ComplexOrderings,
    advanced_page_size: u32,
}

impl Default for SearchRouter {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl SearchRouter {
    pub fn new(
        endpoints: SearchEndpoints,
        complex_orderings: ComplexOrderings,
        advanced_page_size: u32,
    ) -> Self {
        Self {
            endpoints,
            complex_orderings,
            advanced_page_size,
        }
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(
            SearchEndpoints::default(),
            ComplexOrderings::new(config.complex_orderings.iter().cloned()),
            config.advanced_page_size,
        )
    }

    pub fn with_endpoints(mut self, endpoints: SearchEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &SearchEndpoints {
        &self.endpoints
    }

    pub fn complex_orderings(&self) -> &ComplexOrderings {
        &self.complex_orderings
    }

    pub fn route(&self, params: &SearchParams) -> RoutedRequest {
        let mut normalized = params.normalize();
        let ordering = normalized.get("ordering").and_then(ParamValue::as_str);

        match self.complex_orderings.classify(ordering) {
            OrderingClass::Complex => {
                // The ranked surface calls the same concept `order_by`.
                normalized.rename("ordering", "order_by");
                normalized.insert_default("page", ParamValue::from(1u32));
                normalized.insert_default("page_size", ParamValue::from(self.advanced_page_size));

                RoutedRequest {
                    surface: SearchSurface::Advanced,
                    request: ApiRequest::post(self.endpoints.advanced.clone(), normalized.to_json()),
                }
            }
            OrderingClass::Simple => RoutedRequest {
                surface: SearchSurface::List,
                request: ApiRequest::get_with_query(
                    self.endpoints.list.clone(),
                    normalized.to_query_pairs(),
                ),
            },
        }
    }

    /// Free-text search always goes to the relevance surface.
    pub fn route_text_search(&self, params: &SearchParams) -> RoutedRequest {
        let mut normalized = params.normalize();
        normalized.insert_default("ordering", ParamValue::from(RELEVANCE_ORDERING));

        RoutedRequest {
            surface: SearchSurface::Text,
            request: ApiRequest::get_with_query(
                self.endpoints.text.clone(),
                normalized.to_query_pairs(),
            ),
        }
    }

    pub fn suggestions_request(&self, query: &str) -> ApiRequest {
        ApiRequest::get_with_query(
            self.endpoints.suggestions.clone(),
            vec![("q".to_string(), query.to_string())],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_popularity_goes_to_advanced_surface_with_defaults() {
        let router = SearchRouter::default();
        let routed = router.route(&SearchParams::new().with_ordering("popularity").with_page_size(10));

        assert_eq!(routed.surface, SearchSurface::Advanced);
        assert_eq!(routed.method(), HttpMethod::Post);
        assert_eq!(routed.path(), "/recipes/search/advanced/");
        assert_eq!(
            routed.request.body(),
            Some(&json!({"order_by": "popularity", "page": 1, "page_size": 10}))
        );
    }

    #[test]
    fn test_rating_defaults_both_pagination_fields() {
        let router = SearchRouter::default();
        let params = SearchParams {
            ordering: Some("rating".into()),
            q: Some(String::new()),
            tags: vec!["vegan".into()],
            ..Default::default()
        };
        let routed = router.route(&params);
        let body = routed.request.body().unwrap();

        assert_eq!(routed.surface, SearchSurface::Advanced);
        assert!(body.get("ordering").is_none());
        assert!(body.get("q").is_none());
        assert_eq!(body["order_by"], json!("rating"));
        assert_eq!(body["page"], json!(1));
        assert_eq!(body["page_size"], json!(24));
        assert_eq!(body["tags"], json!(["vegan"]));
    }

    #[test]
    fn test_explicit_page_is_kept_on_advanced_surface() {
        let router = SearchRouter::default();
        let routed = router.route(&SearchParams::new().with_ordering("rating").with_page(3));
        assert_eq!(routed.request.body().unwrap()["page"], json!(3));
    }

    #[test]
    fn test_simple_ordering_goes_to_list_surface() {
        let router = SearchRouter::default();
        let params = SearchParams::new()
            .with_category_slug("italian")
            .with_ordering("newest");
        let routed = router.route(&params);

        assert_eq!(routed.surface, SearchSurface::List);
        assert_eq!(routed.method(), HttpMethod::Get);
        assert_eq!(routed.path(), "/recipes/");
        assert_eq!(
            routed.request.query_string(),
            "category_slugs=italian&ordering=newest"
        );
    }

    #[test]
    fn test_no_ordering_and_no_pagination_defaults_on_list() {
        let router = SearchRouter::default();
        let routed = router.route(&SearchParams::new().with_tag("quick"));

        assert_eq!(routed.surface, SearchSurface::List);
        assert_eq!(routed.request.query_string(), "tags=quick");
    }

    #[test]
    fn test_unknown_ordering_passes_through_unchanged() {
        let router = SearchRouter::default();
        let routed = router.route(&SearchParams::new().with_ordering("-spiciness"));

        assert_eq!(routed.surface, SearchSurface::List);
        assert_eq!(
            routed.request.query_pairs(),
            &[("ordering".to_string(), "-spiciness".to_string())]
        );
    }

    #[test]
    fn test_empty_ordering_is_simple() {
        let router = SearchRouter::default();
        let routed = router.route(&SearchParams::new().with_ordering(""));
        assert_eq!(routed.surface, SearchSurface::List);
        assert!(routed.request.query_pairs().is_empty());
    }

    #[test]
    fn test_complex_set_is_configuration() {
        let config = SearchConfig {
            complex_orderings: BTreeSet::from(["trending".to_string()]),
            advanced_page_size: 50,
        };
        let router = SearchRouter::from_config(&config);

        assert_eq!(
            router.route(&SearchParams::new().with_ordering("rating")).surface,
            SearchSurface::List
        );
        let routed = router.route(&SearchParams::new().with_ordering("trending"));
        assert_eq!(routed.surface, SearchSurface::Advanced);
        assert_eq!(routed.request.body().unwrap()["page_size"], json!(50));
    }

    #[test]
    fn test_text_search_defaults_to_relevance() {
        let router = SearchRouter::default();
        let routed = router.route_text_search(&SearchParams::new().with_query("risotto"));

        assert_eq!(routed.surface, SearchSurface::Text);
        assert_eq!(routed.method(), HttpMethod::Get);
        assert_eq!(routed.path(), "/recipes/search/");
        assert_eq!(routed.request.query_string(), "ordering=relevance&q=risotto");
    }

    #[test]
    fn test_text_search_keeps_caller_ordering_even_if_complex() {
        let router = SearchRouter::default();
        let routed = router.route_text_search(
            &SearchParams::new().with_query("risotto").with_ordering("rating"),
        );

        assert_eq!(routed.surface, SearchSurface::Text);
        assert_eq!(routed.request.query_string(), "ordering=rating&q=risotto");
    }
}
