//! Integration tests for the session hub, driven over in-process channels.

mod helpers;

use serde_json::{Value, json};

use helpers::{Client, TestApp, payload};
use rally_auth::Identity;
use rally_entity::{Phase, Session, SessionKind, SessionSettings, UserRole};

/// Facilitator `ada` and participant `bob`, both connected.
async fn poker_room(app: &TestApp, settings: SessionSettings) -> (Session, Client, Client) {
    let (ada, _) = app.guest("Ada");
    let (bob, _) = app.guest("Bob");
    let session = app.create_session(&ada, SessionKind::Poker, settings).await;
    app.join(session.id, &bob).await;

    let mut ada_conn = app.connect(session.id, &ada).await;
    let bob_conn = app.connect(session.id, &bob).await;
    ada_conn.recv_kind("user_joined").await;
    (session, ada_conn, bob_conn)
}

async fn open_plan(ada: &mut Client, bob: &mut Client) -> String {
    ada.send("add_plan", json!({ "name": "Login page" }));
    let board = payload(&ada.recv_kind("plan_added").await);
    bob.recv_kind("plan_added").await;
    let plan_id = board["plans"][0]["id"].as_str().unwrap().to_string();

    ada.send("activate_plan", json!({ "planId": plan_id }));
    let phase = payload(&ada.recv_kind("phase_changed").await);
    assert_eq!(phase["phase"], "voting");
    ada.recv_kind("plan_activated").await;
    bob.recv_kind("plan_activated").await;
    plan_id
}

fn voters(activity: &Value) -> Vec<String> {
    activity["votes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["userId"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_tally_scenario() {
    let app = TestApp::new().await;
    let (_session, mut ada, mut bob) = poker_room(&app, SessionSettings::default()).await;
    let plan_id = open_plan(&mut ada, &mut bob).await;

    ada.send("vote", json!({ "planId": plan_id, "voteValue": "5" }));
    let activity = payload(&bob.recv_kind("vote_activity").await);
    assert_eq!(activity["allVoted"], false);
    ada.recv_kind("vote_activity").await;

    bob.send("vote", json!({ "planId": plan_id, "voteValue": "5" }));
    let activity = payload(&ada.recv_kind("vote_activity").await);
    assert_eq!(activity["allVoted"], true);
    assert_eq!(activity["votes"].as_array().unwrap().len(), 2);
    assert!(activity["votes"].as_array().unwrap().iter().all(|v| v["value"] == "5"));
    bob.recv_kind("vote_activity").await;
    ada.assert_quiet().await;

    ada.send("retract_vote", json!({ "planId": plan_id }));
    let retracted = payload(&bob.recv_kind("vote_retracted").await);
    assert_eq!(retracted["allVoted"], false);
    assert_eq!(voters(&retracted), vec![bob.user_id.to_string()]);
    ada.recv_kind("vote_retracted").await;

    // Retracting again is a success with the same vote set.
    ada.send("retract_vote", json!({ "planId": plan_id }));
    let again = payload(&ada.recv_kind("vote_retracted").await);
    assert_eq!(voters(&again), vec![bob.user_id.to_string()]);
}

#[tokio::test]
async fn test_hidden_votes_and_auto_finish() {
    let app = TestApp::new().await;
    let settings = SessionSettings {
        hide_voter_identity: true,
        auto_finish_voting: true,
        ..SessionSettings::default()
    };
    let (_session, mut ada, mut bob) = poker_room(&app, settings).await;
    let plan_id = open_plan(&mut ada, &mut bob).await;

    ada.send("vote", json!({ "planId": plan_id, "voteValue": "3" }));
    let activity = payload(&bob.recv_kind("vote_activity").await);
    assert_eq!(activity["votes"][0]["value"], Value::Null);

    bob.send("vote", json!({ "planId": plan_id, "voteValue": "8" }));
    bob.recv_kind("vote_activity").await;
    let ended = payload(&bob.recv_kind("voting_ended").await);
    assert_eq!(ended["votingLocked"], true);
    let values: Vec<_> = ended["plans"][0]["votes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["value"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(values.len(), 2);
    assert!(values.contains(&"3".to_string()) && values.contains(&"8".to_string()));

    bob.send("vote", json!({ "planId": plan_id, "voteValue": "1" }));
    let err = bob.recv_error().await;
    assert_eq!(err.code, "ECONFLICT");
    assert_eq!(err.reason.as_deref(), Some("VOTING_LOCKED"));
}

#[tokio::test]
async fn test_non_facilitator_advance_is_private() {
    let app = TestApp::new().await;
    let (session, mut ada, mut bob) = poker_room(&app, SessionSettings::default()).await;

    bob.send("advance_phase", Value::Null);
    let err = bob.recv_error().await;
    assert_eq!(err.code, "EUNAUTHORIZED");
    ada.assert_quiet().await;
    bob.assert_quiet().await;

    let stored = app.state.store.get_session(session.id).await.unwrap();
    assert_eq!(stored.phase, Phase::Lobby);
}

#[tokio::test]
async fn test_invalid_payload_is_private() {
    let app = TestApp::new().await;
    let (_session, mut ada, mut bob) = poker_room(&app, SessionSettings::default()).await;

    ada.send("add_plan", json!({ "name": "" }));
    assert_eq!(ada.recv_error().await.code, "EINVALID");
    bob.assert_quiet().await;

    bob.send_raw("not json");
    assert_eq!(bob.recv_error().await.code, "EINVALID");
    ada.assert_quiet().await;

    bob.send("sync", Value::Null);
    bob.recv_kind("init").await;
}

#[tokio::test]
async fn test_last_facilitator_cannot_step_down() {
    let app = TestApp::new().await;
    let (session, mut ada, mut bob) = poker_room(&app, SessionSettings::default()).await;
    let ada_id = session.created_by;

    ada.send("remove_facilitator", json!({ "userId": ada_id }));
    let err = ada.recv_error().await;
    assert_eq!(err.code, "ECONFLICT");
    assert_eq!(err.reason.as_deref(), Some("ONLY_FACILITATOR"));
    bob.assert_quiet().await;

    ada.send("add_facilitator", json!({ "userId": bob.user_id }));
    let facilitators = payload(&bob.recv_kind("facilitators_updated").await);
    assert_eq!(facilitators.as_array().unwrap().len(), 2);
    ada.recv_kind("facilitators_updated").await;

    bob.send("remove_facilitator", json!({ "userId": ada_id }));
    let facilitators = payload(&ada.recv_kind("facilitators_updated").await);
    assert_eq!(facilitators, json!([bob.user_id]));

    bob.send("remove_facilitator", json!({ "userId": bob.user_id }));
    assert_eq!(
        bob.recv_error().await.reason.as_deref(),
        Some("ONLY_FACILITATOR")
    );
}

#[tokio::test]
async fn test_completed_session_is_read_only() {
    let app = TestApp::new().await;
    let (ada, _) = app.guest("Ada");
    let session = app
        .create_session(&ada, SessionKind::Storyboard, SessionSettings::default())
        .await;
    let mut conn = app.connect(session.id, &ada).await;

    conn.send("add_goal", json!({ "name": "Checkout" }));
    conn.recv_kind("goals_updated").await;

    conn.send("advance_phase", Value::Null);
    let changed = payload(&conn.recv_kind("phase_changed").await);
    assert_eq!(changed["phase"], "completed");
    assert_eq!(changed["previous"], "mapping");

    conn.send("add_goal", json!({ "name": "Refunds" }));
    let err = conn.recv_error().await;
    assert_eq!(err.reason.as_deref(), Some("SESSION_COMPLETED"));

    conn.send("advance_phase", json!({ "phase": "completed" }));
    conn.assert_quiet().await;
    conn.send("advance_phase", Value::Null);
    conn.assert_quiet().await;

    conn.send("sync", Value::Null);
    conn.recv_kind("init").await;
}

#[tokio::test]
async fn test_duplicate_connection_rejected() {
    let app = TestApp::new().await;
    let (ada, _) = app.guest("Ada");
    let session = app
        .create_session(&ada, SessionKind::Retro, SessionSettings::default())
        .await;
    let mut first = app.connect(session.id, &ada).await;

    let mut second = app.open(session.id, &ada);
    let err = second.recv_error().await;
    assert_eq!(err.reason.as_deref(), Some("DUPLICATE_CONNECTION"));
    assert!(second.next().await.is_none());
    assert!(second.outcome().await.is_err());

    first.assert_quiet().await;
    first.send("sync", Value::Null);
    first.recv_kind("init").await;
    assert_eq!(app.engine().stats().metrics.connections_rejected, 1);
}

#[tokio::test]
async fn test_retro_phase_gates() {
    let app = TestApp::new().await;
    let (ada, _) = app.guest("Ada");
    let (bob, _) = app.guest("Bob");
    let session = app
        .create_session(&ada, SessionKind::Retro, SessionSettings::default())
        .await;
    app.join(session.id, &bob).await;
    let mut ada_conn = app.connect(session.id, &ada).await;
    let mut bob_conn = app.connect(session.id, &bob).await;

    bob_conn.send("create_item", json!({ "category": "worked", "content": "Pairing" }));
    let err = bob_conn.recv_error().await;
    assert_eq!(err.reason.as_deref(), Some("WRONG_PHASE"));

    bob_conn.send("user_marked_ready", Value::Null);
    let ready = payload(&ada_conn.recv_kind("ready_updated").await);
    assert_eq!(ready["readyUsers"], json!([bob.user_id]));

    ada_conn.send("advance_phase", Value::Null);
    bob_conn.recv_kind("phase_changed").await;

    bob_conn.send("create_item", json!({ "category": "worked", "content": "Pairing" }));
    let items = payload(&ada_conn.recv_kind("items_updated").await);
    assert_eq!(items["items"][0]["content"], "Pairing");
    bob_conn.recv_kind("items_updated").await;

    // Poker events are unknown on a retro connection.
    bob_conn.send("vote", json!({ "planId": session.id, "voteValue": "5" }));
    let err = bob_conn.recv_error().await;
    assert_eq!(err.code, "EINVALID");
    assert_eq!(err.reason.as_deref(), Some("UNKNOWN_EVENT"));
}

#[tokio::test]
async fn test_abandon_closes_only_the_sender() {
    let app = TestApp::new().await;
    let (session, mut ada, mut bob) = poker_room(&app, SessionSettings::default()).await;
    let bob_id = bob.user_id;

    bob.send("abandon_battle", Value::Null);
    bob.recv_kind("user_abandoned").await;
    let err = bob.recv_error().await;
    assert_eq!(err.reason.as_deref(), Some("ABANDONED"));
    bob.wait_closed().await;

    let roster = payload(&ada.recv_kind("user_abandoned").await);
    let entry = roster
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["userId"] == json!(bob_id))
        .unwrap()
        .clone();
    assert_eq!(entry["abandoned"], true);
    ada.recv_kind("user_left").await;
    assert!(!app.engine().is_connected(session.id, bob_id));

    let bob_identity = Identity {
        user_id: bob_id,
        name: "Bob".to_string(),
        role: UserRole::Guest,
    };
    let mut retry = app.open(session.id, &bob_identity);
    assert_eq!(retry.recv_error().await.reason.as_deref(), Some("ABANDONED"));
}

#[tokio::test]
async fn test_events_after_abandon_are_ignored() {
    let app = TestApp::new().await;
    let settings = SessionSettings {
        auto_finish_voting: true,
        ..SessionSettings::default()
    };
    let (session, mut ada, mut bob) = poker_room(&app, settings).await;
    let plan_id = open_plan(&mut ada, &mut bob).await;

    bob.send("abandon_battle", Value::Null);
    bob.send("vote", json!({ "planId": plan_id, "voteValue": "13" }));

    assert_eq!(ada.recv().await.kind, "user_abandoned");
    assert_eq!(ada.recv().await.kind, "user_left");
    ada.assert_quiet().await;

    let board = app.state.store.get_poker_board(session.id).await.unwrap();
    assert!(board.plans[0].votes.is_empty());

    // Bob no longer counts, so Ada's vote alone completes the plan.
    ada.send("vote", json!({ "planId": plan_id, "voteValue": "5" }));
    let activity = payload(&ada.recv_kind("vote_activity").await);
    assert_eq!(activity["allVoted"], true);
    assert_eq!(voters(&activity), vec![ada.user_id.to_string()]);
    ada.recv_kind("voting_ended").await;
}

#[tokio::test]
async fn test_simultaneous_votes_finish_once() {
    let app = TestApp::new().await;
    let settings = SessionSettings {
        auto_finish_voting: true,
        ..SessionSettings::default()
    };
    let (_session, mut ada, mut bob) = poker_room(&app, settings).await;
    let plan_id = open_plan(&mut ada, &mut bob).await;

    ada.send("vote", json!({ "planId": plan_id, "voteValue": "3" }));
    bob.send("vote", json!({ "planId": plan_id, "voteValue": "5" }));

    let first = payload(&ada.recv_kind("vote_activity").await);
    assert_eq!(first["allVoted"], false);
    let second = payload(&ada.recv_kind("vote_activity").await);
    assert_eq!(second["allVoted"], true);
    assert_eq!(second["votes"].as_array().unwrap().len(), 2);
    let ended = ada.recv().await;
    assert_eq!(ended.kind, "voting_ended");
    ada.assert_quiet().await;
}

#[tokio::test]
async fn test_disconnect_marks_inactive() {
    let app = TestApp::new().await;
    let (session, mut ada, bob) = poker_room(&app, SessionSettings::default()).await;
    let bob_id = bob.user_id;
    assert!(app.engine().is_connected(session.id, bob_id));

    bob.disconnect().await.unwrap();
    let roster = payload(&ada.recv_kind("user_left").await);
    let entry = roster
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["userId"] == json!(bob_id))
        .unwrap()
        .clone();
    assert_eq!(entry["active"], false);
    assert_eq!(entry["abandoned"], false);
    assert!(!app.engine().is_connected(session.id, bob_id));
}

#[tokio::test]
async fn test_session_deletion_and_concession() {
    let app = TestApp::new().await;
    let (session, mut ada, mut bob) = poker_room(&app, SessionSettings::default()).await;

    app.engine().shutdown_session(session.id).await;
    ada.recv_kind("session_deleted").await;
    ada.wait_closed().await;
    bob.wait_closed().await;
    assert_eq!(app.engine().stats().connections, 0);

    let (_session, mut ada, mut bob) = poker_room(&app, SessionSettings::default()).await;
    bob.send("concede_battle", Value::Null);
    assert_eq!(bob.recv_error().await.code, "EUNAUTHORIZED");

    ada.send("concede_battle", Value::Null);
    bob.recv_kind("session_conceded").await;
    bob.wait_closed().await;
    ada.wait_closed().await;
}
