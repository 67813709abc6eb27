mod common;

use common::TestFixture;
use cookbook_sdk::transport::HttpMethod;
use cookbook_sdk::CategorySource;
use serde_json::json;

#[tokio::test]
async fn test_tree_endpoint_is_used_first() {
    let fixture = TestFixture::new();
    fixture.transport.respond_json(
        HttpMethod::Get,
        "/categories/tree/",
        json!([{
            "id": 1,
            "name": "Main Dishes",
            "slug": "main-dishes",
            "children": [{"id": 5, "name": "Pasta", "slug": "pasta", "parent": 1}]
        }]),
    );

    let set = fixture.client.categories().categories().await;

    assert_eq!(set.source, CategorySource::Tree);
    assert_eq!(set.find_by_slug("pasta").map(|c| c.id), Some(5));
    assert!(fixture
        .transport
        .get_calls_for(HttpMethod::Get, "/categories/")
        .is_empty());
}

#[tokio::test]
async fn test_flat_list_when_tree_fails() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .fail(HttpMethod::Get, "/categories/tree/", 500)
        .respond_json(
            HttpMethod::Get,
            "/categories/",
            json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{"id": 9, "name": "Soups", "slug": "soups"}]
            }),
        );

    let set = fixture.client.categories().categories().await;

    assert_eq!(set.source, CategorySource::Flat);
    assert_eq!(set.categories[0].name, "Soups");
}

#[tokio::test]
async fn test_static_defaults_when_both_fail() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .fail(HttpMethod::Get, "/categories/tree/", 503)
        .fail(HttpMethod::Get, "/categories/", 503);

    let set = fixture.client.categories().categories().await;

    assert_eq!(set.source, CategorySource::Fallback);
    let names: Vec<&str> = set.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Main Dishes", "Appetizers", "Desserts", "Beverages"]);

    let paths: Vec<String> = fixture
        .transport
        .requests()
        .into_iter()
        .map(|r| r.path)
        .collect();
    assert_eq!(paths, ["/categories/tree/", "/categories/"]);
}

#[tokio::test]
async fn test_backend_result_is_cached_until_refresh() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .respond_json(
            HttpMethod::Get,
            "/categories/tree/",
            json!([{"id": 1, "name": "Old", "slug": "old"}]),
        )
        .respond_json(
            HttpMethod::Get,
            "/categories/tree/",
            json!([{"id": 2, "name": "New", "slug": "new"}]),
        );

    let categories = fixture.client.categories();
    assert_eq!(categories.categories().await.categories[0].slug, "old");
    assert_eq!(categories.categories().await.categories[0].slug, "old");
    assert_eq!(fixture.transport.calls().len(), 1);

    assert_eq!(categories.refresh().await.categories[0].slug, "new");
    assert_eq!(categories.categories().await.categories[0].slug, "new");
    assert_eq!(fixture.transport.calls().len(), 2);
}

#[tokio::test]
async fn test_fallback_is_not_cached() {
    let fixture = TestFixture::new();
    fixture
        .transport
        .fail(HttpMethod::Get, "/categories/tree/", 500)
        .respond_json(
            HttpMethod::Get,
            "/categories/tree/",
            json!([{"id": 3, "name": "Breads", "slug": "breads"}]),
        )
        .fail(HttpMethod::Get, "/categories/", 500);

    let categories = fixture.client.categories();
    assert_eq!(categories.categories().await.source, CategorySource::Fallback);
    assert!(categories.cached().await.is_none());

    let second = categories.categories().await;
    assert_eq!(second.source, CategorySource::Tree);
    assert_eq!(second.categories[0].slug, "breads");
}

#[tokio::test]
async fn test_client_clear_drops_category_cache() {
    let fixture = TestFixture::new();
    fixture.transport.respond_json(
        HttpMethod::Get,
        "/categories/tree/",
        json!([{"id": 1, "name": "Main Dishes", "slug": "main-dishes"}]),
    );

    fixture.client.categories().categories().await;
    assert!(fixture.client.categories().cached().await.is_some());

    fixture.client.clear().await;
    assert!(fixture.client.categories().cached().await.is_none());

    fixture.client.categories().categories().await;
    assert_eq!(fixture.transport.calls().len(), 2);
}
