//! Integration tests for the HTTP endpoints.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use helpers::TestApp;
use rally_entity::UserRole;

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["realtime"]["connections"], 0);
    assert_eq!(response.body["data"]["realtime"]["messagesDropped"], 0);
}

#[tokio::test]
async fn test_guest_sign_in_sets_cookie() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/api/auth/guest", Some(json!({ "name": "Ada" })), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(response.body["data"]["user"]["role"], "guest");

    let cookie = response.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with(&format!("rally_session={token}")));

    let me = app
        .send(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, format!("rally_session={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["name"], "Ada");

    let empty = app
        .request("POST", "/api/auth/guest", Some(json!({ "name": "" })), None)
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_session_requires_token() {
    let app = TestApp::new().await;
    let body = json!({ "kind": "retro", "name": "Sprint 7" });

    let anonymous = app.request("POST", "/api/sessions", Some(body.clone()), None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let (ada, token) = app.guest("Ada");
    let created = app
        .request("POST", "/api/sessions", Some(body), Some(&token))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["phase"], "intro");
    assert_eq!(created.body["data"]["facilitators"], json!([ada.user_id]));

    let invalid = app
        .request(
            "POST",
            "/api/sessions",
            Some(json!({ "kind": "poker", "name": "" })),
            Some(&token),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_join_code_is_checked() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.guest("Ada");
    let (_, bob_token) = app.guest("Bob");

    let created = app
        .request(
            "POST",
            "/api/sessions",
            Some(json!({ "kind": "poker", "name": "Estimates", "joinCode": "tea" })),
            Some(&owner_token),
        )
        .await;
    let id = created.body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created.body["data"]["hasJoinCode"], true);

    let wrong = app
        .request(
            "POST",
            &format!("/api/sessions/{id}/join"),
            Some(json!({ "joinCode": "coffee" })),
            Some(&bob_token),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);
    assert_eq!(wrong.body["reason"], "INVALID_CODE");

    let joined = app
        .request(
            "POST",
            &format!("/api/sessions/{id}/join"),
            Some(json!({ "joinCode": "tea", "spectator": true })),
            Some(&bob_token),
        )
        .await;
    assert_eq!(joined.status, StatusCode::OK);
    let participants = joined.body["data"]["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 2);
    assert!(participants.iter().any(|p| p["spectator"] == true));
}

#[tokio::test]
async fn test_delete_session() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.guest("Ada");
    let (_, bob_token) = app.guest("Bob");

    let created = app
        .request(
            "POST",
            "/api/sessions",
            Some(json!({ "kind": "storyboard", "name": "Map" })),
            Some(&owner_token),
        )
        .await;
    let path = format!("/api/sessions/{}", created.body["data"]["id"].as_str().unwrap());

    let denied = app.request("DELETE", &path, None, Some(&bob_token)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let deleted = app.request("DELETE", &path, None, Some(&owner_token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let missing = app.request("GET", &path, None, Some(&owner_token)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_alert_lifecycle() {
    let app = TestApp::new().await;
    let (_, guest_token) = app.guest("Bob");
    let (_, admin_token) = app.user("Root", UserRole::Admin);
    let body = json!({ "name": "Maintenance", "content": "Down at 22:00", "level": "warning" });

    let denied = app
        .request("POST", "/api/admin/alerts", Some(body.clone()), Some(&guest_token))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let created = app
        .request("POST", "/api/admin/alerts", Some(body), Some(&admin_token))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let alert_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let listed = app.request("GET", "/api/alerts", None, None).await;
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 1);
    assert_eq!(listed.body["data"][0]["name"], "Maintenance");

    let removed = app
        .request(
            "DELETE",
            &format!("/api/admin/alerts/{alert_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let listed = app.request("GET", "/api/alerts", None, None).await;
    assert!(listed.body["data"].as_array().unwrap().is_empty());
}
