//! URL resolution, header construction and body encoding.

use super::harness::TestHarness;
use crate::{Method, RequestOptions};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::json;
use wiremock::matchers::{body_json, body_string, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn relative_paths_resolve_under_api_base() {
    let h = TestHarness::new().await;
    for input in ["content/topic/", "/content/topic/"] {
        assert_eq!(
            h.client.resolve_url(input).unwrap().as_str(),
            format!("{}/api/content/topic/", h.server.uri())
        );
    }
}

#[tokio::test]
async fn absolute_urls_pass_through() {
    let h = TestHarness::new().await;
    let absolute = "https://cdn.example.com/content/topic/?page=3";
    assert_eq!(h.client.resolve_url(absolute).unwrap().as_str(), absolute);
}

#[tokio::test]
async fn authenticated_request_sends_defaults_and_bearer() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/personal/"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 42 })))
        .expect(1)
        .mount(&h.server)
        .await;

    let response = h.client.get("users/personal/").await.unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], 42);
}

#[tokio::test]
async fn anonymous_request_omits_stored_token() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/content/public/"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/content/public/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    let response = h
        .client
        .request("content/public/", Method::GET, RequestOptions::new().anonymous())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn caller_headers_override_defaults() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/notes/"))
        .and(header("content-type", "text/plain"))
        .and(header("accept", "text/plain"))
        .and(body_string("hello"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&h.server)
        .await;

    let options = RequestOptions::new()
        .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
        .header(ACCEPT, HeaderValue::from_static("text/plain"))
        .text("hello");
    let response = h
        .client
        .request("notes/", Method::POST, options)
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn json_body_is_serialized() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("POST"))
        .and(path("/api/voting/vote/"))
        .and(body_json(json!({ "topic": 7, "vote": 1 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client
        .post("voting/vote/", &json!({ "topic": 7, "vote": 1 }))
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_access_token_still_sends_request() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/api/content/topic/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    assert!(h.client.get("content/topic/").await.is_ok());
}

#[tokio::test]
async fn redirect_range_statuses_are_returned() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/content/empty/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.server)
        .await;

    let response = h.client.get("content/empty/").await.unwrap();
    assert_eq!(response.status(), 204);
}
