//! Profile, contributions and topic summaries degrade to empty results.

use super::harness::TestHarness;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn personal_details_are_loaded() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/personal/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "joined": "2023-11-04T12:00:00Z",
            "username": "voter"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let details = h.client.personal_details().await.unwrap();
    assert_eq!(details.joined.as_deref(), Some("2023-11-04T12:00:00Z"));
    assert_eq!(details.extra["username"], "voter");
}

#[tokio::test]
async fn personal_details_missing_on_failure() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/personal/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    assert_eq!(h.client.personal_details().await, None);
}

#[tokio::test]
async fn contributions_query_the_window_in_utc() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/contribution/"))
        .and(query_param("start", "2024-02-01T05:00:00.000Z"))
        .and(query_param("end", "2024-03-02T05:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "2024-02-10T14:00:00Z",
            "2024-02-11T09:30:00Z"
        ])))
        .expect(1)
        .mount(&h.server)
        .await;

    let start = Utc.with_ymd_and_hms(2024, 2, 1, 5, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 3, 2, 5, 0, 0).unwrap();
    let votes = h.client.contributions(start, end).await;

    assert_eq!(
        votes,
        vec![
            Utc.with_ymd_and_hms(2024, 2, 10, 14, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 11, 9, 30, 0).unwrap(),
        ]
    );
}

#[tokio::test]
async fn contributions_empty_on_failure() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/contribution/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&h.server)
        .await;

    let now = Utc::now();
    assert!(h.client.contributions(now, now).await.is_empty());
}

#[tokio::test]
async fn day_contributions_send_local_midnight() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/contribution/day-detail/"))
        .and(query_param("date", "2024-02-10T00:00:00-05:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 7, "vote": 1, "title": "Water rights", "created": "2024-02-01T00:00:00Z" }
        ])))
        .expect(1)
        .mount(&h.server)
        .await;

    let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
    let day: DateTime<FixedOffset> = eastern.with_ymd_and_hms(2024, 2, 10, 0, 0, 0).unwrap();
    let topics = h.client.day_contributions(day).await;

    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0].id, 7);
    assert_eq!(topics[0].vote, Some(1));
    assert_eq!(topics[0].title, "Water rights");
}

#[tokio::test]
async fn day_contributions_empty_on_failure() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/users/contribution/day-detail/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    assert!(h.client.day_contributions(Utc::now()).await.is_empty());
}

#[tokio::test]
async fn topic_summary_requests_the_summary() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/content/topic/12/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "title": "Broadband",
            "content": "<p>Rural coverage</p>"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let summary = h.client.topic_summary(12).await.unwrap();
    assert_eq!(summary.title, "Broadband");
    assert_eq!(summary.content, "<p>Rural coverage</p>");

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("include_summary"));
}

#[tokio::test]
async fn topic_summary_missing_on_failure() {
    let h = TestHarness::logged_in().await;
    Mock::given(method("GET"))
        .and(path("/api/content/topic/99/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    assert_eq!(h.client.topic_summary(99).await, None);
}
