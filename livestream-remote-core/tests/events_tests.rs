//! Event listing, running-state merge and classification against a fake backend
//!
//! Run with: cargo test --test events_tests

mod common;

use chrono::{Duration, Utc};
use common::{event_json, signed_in_client, ORG};
use livestream_remote_core::config::EventsConfig;
use livestream_remote_core::models::{BroadcastState, OrganizationId};
use livestream_remote_core::service::classify;
use livestream_remote_core::Error;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_windowed(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/events/games"))
        .and(query_param("orgId", ORG))
        .and(header("Club-ID", ORG))
        .and(header("Authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_running(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/events/running-broadcasts"))
        .and(query_param("clubId", ORG))
        .and(header("Club-ID", ORG))
        .respond_with(template)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_running_feed_overrides_stale_window_state() {
    let server = MockServer::start().await;
    let now = Utc::now();
    let yesterday = now - Duration::days(1);

    mount_windowed(
        &server,
        serde_json::json!([
            event_json("a", yesterday - Duration::hours(2), yesterday, Some(("b1", "paused"))),
            event_json(
                "b",
                now + Duration::hours(2),
                now + Duration::hours(4),
                Some(("b2", "scheduled"))
            ),
        ]),
    )
    .await;
    mount_running(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!([event_json(
            "a",
            yesterday - Duration::hours(2),
            yesterday,
            Some(("b1", "running"))
        )])),
    )
    .await;

    let (client, _store) = signed_in_client(&server, "access-1");
    let org = OrganizationId::new(ORG);
    let classified = client
        .events()
        .list_around(&org, now, &EventsConfig::default())
        .await
        .unwrap();

    assert_eq!(classified.live.len(), 1);
    assert_eq!(classified.live[0].id.as_str(), "a");
    assert_eq!(classified.live[0].broadcast_state(), Some(BroadcastState::Running));
    assert_eq!(classified.upcoming.len(), 1);
    assert_eq!(classified.upcoming[0].id.as_str(), "b");
    assert!(classified.past.is_empty());
}

#[tokio::test]
async fn test_windowed_events_sorted_newest_first() {
    let server = MockServer::start().await;
    let now = Utc::now();

    mount_windowed(
        &server,
        serde_json::json!([
            event_json("early", now - Duration::hours(6), now - Duration::hours(4), None),
            event_json("late", now + Duration::hours(4), now + Duration::hours(6), None),
            event_json("mid", now - Duration::hours(1), now + Duration::hours(1), None),
        ]),
    )
    .await;
    mount_running(&server, ResponseTemplate::new(200).set_body_json(serde_json::json!([]))).await;

    let (client, _store) = signed_in_client(&server, "access-1");
    let events = client
        .events()
        .list_events(&OrganizationId::new(ORG), now - Duration::days(1), now + Duration::days(1))
        .await
        .unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["late", "mid", "early"]);

    let classified = classify(&events, now);
    assert_eq!(classified.past.len(), 1);
    assert_eq!(classified.upcoming.len(), 2);
    assert_eq!(classify(&events, now), classified);
}

#[tokio::test]
async fn test_running_feed_failure_fails_whole_listing() {
    let server = MockServer::start().await;
    let now = Utc::now();

    Mock::given(method("GET"))
        .and(path("/events/games"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([event_json(
            "a",
            now,
            now + Duration::hours(2),
            None
        )])))
        .mount(&server)
        .await;
    mount_running(
        &server,
        ResponseTemplate::new(502)
            .set_body_json(serde_json::json!({"message": "upstream unavailable"})),
    )
    .await;

    let (client, _store) = signed_in_client(&server, "access-1");
    let err = client
        .events()
        .list_around(&OrganizationId::new(ORG), now, &EventsConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Fetch(ref msg) if msg == "upstream unavailable"));
}

#[tokio::test]
async fn test_window_is_sent_as_utc_millis() {
    let server = MockServer::start().await;
    let now = Utc::now();
    let window = EventsConfig {
        days_before: 3,
        days_after: 2,
    };

    Mock::given(method("GET"))
        .and(path("/events/games"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    mount_running(&server, ResponseTemplate::new(200).set_body_json(serde_json::json!([]))).await;

    let (client, _store) = signed_in_client(&server, "access-1");
    let classified = client
        .events()
        .list_around(&OrganizationId::new(ORG), now, &window)
        .await
        .unwrap();
    assert!(classified.is_empty());

    let requests = server.received_requests().await.unwrap();
    let windowed = requests
        .iter()
        .find(|r| r.url.path() == "/events/games")
        .unwrap();
    let param = |name: &str| {
        windowed
            .url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
            .unwrap()
    };
    let start = param("startAfter");
    let end = param("endBefore");
    assert!(start.ends_with('Z'));
    assert_eq!(start.len(), "2026-10-18T12:00:00.000Z".len());
    assert_eq!(
        start,
        (now - Duration::days(3)).to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    );
    assert_eq!(
        end,
        (now + Duration::days(2)).to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    );
}
