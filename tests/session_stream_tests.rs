// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth state pushed over `/api/session/stream`.

use axum::body::{Body, BodyDataStream};
use axum::http::{header, Request, StatusCode};
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

mod common;
use common::{body_json, create_test_app, get_request, id_token, json_request};

/// Reads `auth_state` events off a streaming response body.
struct EventReader {
    body: BodyDataStream,
    buffer: String,
}

impl EventReader {
    async fn open(app: &axum::Router, session: &str) -> Self {
        let response = app
            .clone()
            .oneshot(get_request("/api/session/stream", Some(session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        Self {
            body: response.into_body().into_data_stream(),
            buffer: String::new(),
        }
    }

    /// Next snapshot, or `None` once the stream has ended.
    async fn next(&mut self) -> Option<Value> {
        loop {
            if let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let mut is_auth_state = false;
                let mut data = None;
                for line in frame.lines() {
                    if let Some(name) = line.strip_prefix("event:") {
                        is_auth_state = name.trim() == "auth_state";
                    } else if let Some(payload) = line.strip_prefix("data:") {
                        data = Some(payload.trim().to_string());
                    }
                }
                match data {
                    Some(data) if is_auth_state => return Some(serde_json::from_str(&data).unwrap()),
                    _ => continue,
                }
            }

            let chunk = tokio::time::timeout(Duration::from_secs(2), self.body.next())
                .await
                .expect("timed out waiting for an event")?;
            self.buffer
                .push_str(std::str::from_utf8(&chunk.unwrap()).unwrap());
        }
    }
}

async fn sign_in(app: &axum::Router, uid: &str) -> String {
    let email = format!("{uid}@example.com");
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/google",
            None,
            json!({ "id_token": id_token(uid, Some(email.as_str()), Some("Meera")) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string()
}

fn logout_request(session: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(header::COOKIE, format!("portal_session={session}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_stream_requires_session() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(get_request("/api/session/stream", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stream_sends_snapshot_then_profile_update() {
    let (app, state) = create_test_app();
    let session = sign_in(&app, "uid-meera").await;

    let mut events = EventReader::open(&app, &session).await;
    let first = events.next().await.unwrap();
    assert_eq!(first["view"], "profile_completion");
    assert_eq!(first["user"]["uid"], "uid-meera");
    assert_eq!(state.auth_state.session_count("uid-meera"), 1);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile",
            Some(session.as_str()),
            json!({ "phone": "9876543210", "institution": "COEP" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let update = events.next().await.unwrap();
    assert_eq!(update["view"], "dashboard");

    // Sign-out is the last event; the stream then ends and its channel goes.
    let response = app.clone().oneshot(logout_request(&session)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let last = events.next().await.unwrap();
    assert_eq!(last["view"], "login");
    assert!(last["user"].is_null());
    assert!(events.next().await.is_none());

    drop(events);
    assert_eq!(state.auth_state.session_count("uid-meera"), 0);
}

#[tokio::test]
async fn test_sign_out_on_one_device_leaves_others_signed_in() {
    let (app, _) = create_test_app();
    let phone = sign_in(&app, "uid-two-devices").await;
    let laptop = sign_in(&app, "uid-two-devices").await;

    let mut phone_events = EventReader::open(&app, &phone).await;
    assert_eq!(phone_events.next().await.unwrap()["view"], "profile_completion");
    let mut laptop_events = EventReader::open(&app, &laptop).await;
    assert_eq!(laptop_events.next().await.unwrap()["view"], "profile_completion");

    let response = app.clone().oneshot(logout_request(&phone)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(phone_events.next().await.unwrap()["view"], "login");

    // A fresh stream for the laptop starts from its own, still valid, session.
    let mut second_tab = EventReader::open(&app, &laptop).await;
    let first = second_tab.next().await.unwrap();
    assert_eq!(first["view"], "profile_completion");
    assert_eq!(first["user"]["uid"], "uid-two-devices");

    let response = app
        .clone()
        .oneshot(get_request("/api/session", Some(laptop.as_str())))
        .await
        .unwrap();
    assert_eq!(body_json(response).await, first);

    // The laptop's open stream never saw the phone's sign-out.
    let pending = tokio::time::timeout(Duration::from_millis(100), laptop_events.next()).await;
    assert!(pending.is_err());
}
