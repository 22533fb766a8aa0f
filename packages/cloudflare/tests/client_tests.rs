//! Integration tests for the Cloudflare API client against a mock server

use edgecron_cloudflare::{ApiClient, ApiError};
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::with_base_url(server.uri(), "test-token").unwrap()
}

#[tokio::test]
async fn success_envelope_returns_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/tokens/verify"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "result": { "id": "token-id", "status": "active" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server).verify_token().await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn rejection_surfaces_first_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/tokens/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [
                { "code": 10000, "message": "Authentication error" },
                { "code": 1, "message": "second error is ignored" }
            ]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).verify_token().await.unwrap_err();
    match err {
        ApiError::Rejected(message) => assert_eq!(message, "10000 Authentication error"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn envelope_outcome_ignores_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": true,
            "result": { "email": "admin@example.com" }
        })))
        .mount(&server)
        .await;

    let email = client_for(&server).user_email().await.unwrap();
    assert_eq!(email, "admin@example.com");
}

#[tokio::test]
async fn non_json_body_is_an_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway timeout</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).user_email().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    // An un-pooled server: dropping it actually closes the port, unlike
    // MockServer::start(), whose pooled listener outlives the drop.
    let server = MockServer::builder().start().await;
    let uri = server.uri();
    drop(server);

    let client = ApiClient::with_base_url(uri, "test-token").unwrap();
    let err = client.verify_token().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn find_zone_queries_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("status", "active"))
        .and(query_param("name", "www.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": [{
                "id": "zone-1",
                "name": "www.example.com",
                "account": { "id": "acct-1" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let zone = client_for(&server)
        .find_zone("www.example.com")
        .await
        .unwrap()
        .expect("zone should be found");
    assert_eq!(zone.id, "zone-1");
    assert_eq!(zone.account.id, "acct-1");
    server.verify().await;
}

#[tokio::test]
async fn find_zone_with_empty_result_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": []
        })))
        .mount(&server)
        .await;

    let zone = client_for(&server).find_zone("absent.example").await.unwrap();
    assert!(zone.is_none());
}

#[tokio::test]
async fn null_result_lists_are_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone-1/workers/routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": null
        })))
        .mount(&server)
        .await;

    let routes = client_for(&server).list_routes("zone-1").await.unwrap();
    assert!(routes.is_empty());
}

#[tokio::test]
async fn put_secret_sends_secret_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/accounts/acct-1/workers/scripts/edgecron-site/secrets"))
        .and(body_json(json!({
            "name": "CRON_SECRET",
            "text": "s3cr3t",
            "type": "secret_text"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": { "name": "CRON_SECRET" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .put_secret("acct-1", "edgecron-site", "CRON_SECRET", "s3cr3t")
        .await
        .unwrap();
    server.verify().await;
}

#[tokio::test]
async fn upload_script_sends_module_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/accounts/acct-1/workers/scripts/edgecron-site"))
        .and(body_string_contains("main_module"))
        .and(body_string_contains("application/javascript+module"))
        .and(body_string_contains("export default"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": { "id": "edgecron-site" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .upload_script("acct-1", "edgecron-site", "export default { async fetch() {} };")
        .await
        .unwrap();
    server.verify().await;
}

#[tokio::test]
async fn generic_request_surfaces_rejection_without_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone-1/workers/routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .request(
            Method::POST,
            "/zones/zone-1/workers/routes",
            Some(&json!({ "pattern": "example.com/wp-cron.php*", "script": "edgecron-site" })),
        )
        .await
        .unwrap_err();
    match err {
        ApiError::Rejected(message) => assert_eq!(message, "Unknown Cloudflare API error"),
        other => panic!("expected rejection, got {other:?}"),
    }
}
