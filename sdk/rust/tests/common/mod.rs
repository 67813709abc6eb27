pub mod mock_transport;

use cookbook_sdk::CookbookClient;
use mock_transport::MockTransport;
use serde_json::{json, Value};
use shared::{MemoryStore, SearchConfig};
use std::sync::Arc;

pub struct TestFixture {
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
    pub client: CookbookClient,
}

impl TestFixture {
    pub fn new() -> Self {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryStore::new());
        let client =
            CookbookClient::with_parts(transport.clone(), store.clone(), &SearchConfig::default());
        transport.observe_loading(client.loading().clone());

        Self {
            transport,
            store,
            client,
        }
    }
}

pub fn recipe_json(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "average_rating": "4.20",
        "rating_count": 5,
        "tags": ["weeknight"],
        "is_favorited": false
    })
}

pub fn page_json(results: Vec<Value>) -> Value {
    json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results
    })
}
