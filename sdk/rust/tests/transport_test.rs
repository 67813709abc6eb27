use cookbook_sdk::transport::{send_json, ApiRequest, HttpTransport, ReqwestTransport};
use cookbook_sdk::ClientError;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_get_sends_query_and_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/recipes/"))
        .and(query_param("ordering", "newest"))
        .and(query_param("category_slugs", "italian"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 0,
            "next": null,
            "previous": null,
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(&format!("{}/api/v1/", server.uri()))
        .unwrap()
        .with_token("secret-token");
    let request = ApiRequest::get_with_query(
        "/recipes/",
        vec![
            ("category_slugs".to_string(), "italian".to_string()),
            ("ordering".to_string(), "newest".to_string()),
        ],
    );

    let body = transport.send(&request).await.unwrap();
    assert_eq!(body["count"], json!(0));
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recipes/search/advanced/"))
        .and(body_json(json!({"order_by": "rating", "page": 1, "page_size": 24})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(&server.uri()).unwrap();
    let request = ApiRequest::post(
        "/recipes/search/advanced/",
        json!({"order_by": "rating", "page": 1, "page_size": 24}),
    );

    #[derive(serde::Deserialize)]
    struct Count {
        count: u64,
    }
    let count: Count = send_json(&transport, &request).await.unwrap();
    assert_eq!(count.count, 3);
}

#[tokio::test]
async fn test_error_status_becomes_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recipes/1/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"detail\":\"Not found.\"}"))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(&server.uri()).unwrap();
    let err = transport
        .send(&ApiRequest::get("/recipes/1/"))
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("Not found."));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/recipes/1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(&server.uri()).unwrap();
    let body = transport
        .send(&ApiRequest::delete("/recipes/1/"))
        .await
        .unwrap();
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_unreachable_server_is_request_failed() {
    let transport = ReqwestTransport::new("http://127.0.0.1:1").unwrap();
    let err = transport
        .send(&ApiRequest::get("/recipes/"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::RequestFailed(_)));
}

#[tokio::test]
async fn test_default_transport_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/categories/"))
        .and(header("user-agent", shared::config::DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(&server.uri()).unwrap();
    let body = transport
        .send(&ApiRequest::get("/categories/"))
        .await
        .unwrap();
    assert_eq!(body, json!([]));
}
