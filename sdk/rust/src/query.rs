//! Shareable search links.
//!
//! A search is encoded as `application/x-www-form-urlencoded` with list fields as
//! repeated keys, so list order survives the round trip. Decoding is lenient: a
//! pair that cannot be coerced to its field's type is dropped on its own and the
//! rest of the link still applies.

use tracing::debug;
use url::form_urlencoded;

use crate::params::SearchParams;

pub fn build_shareable_query(params: &SearchParams) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.normalize().to_query_pairs())
        .finish()
}

pub fn parse_shareable_query(query: &str) -> SearchParams {
    let query = query.trim().trim_start_matches('?');
    let mut params = SearchParams::default();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if !params.apply_raw(&key, &value) {
            debug!("Dropping query parameter {}={:?}", key, value);
        }
    }

    params
}
