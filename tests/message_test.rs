mod common;

use hexagon::models::{message, Message};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};

#[tokio::test]
async fn first_message_opens_the_conversation() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (bob_id, bob) = common::create_test_user(&app, "bob").await;

    let resp = app
        .post("/messages/bob", &alice, json!({ "body": "hi bob" }))
        .await;
    assert_eq!(resp.status(), 200);

    let rows = Message::find()
        .filter(message::Column::SenderId.eq(alice_id))
        .filter(message::Column::RecipientId.eq(bob_id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|m| m.is_system
        && m.body == "alice has started a conversation with bob"));

    app.post("/messages/bob", &alice, json!({ "body": "again" }))
        .await;
    let count = Message::find().all(&app.db).await.unwrap().len();
    assert_eq!(count, 3);

    let body: Value = app.get("/messages/alice", &bob).await.json().await.unwrap();
    let bodies: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert_eq!(
        bodies,
        vec!["alice has started a conversation with bob", "hi bob", "again"]
    );
}

#[tokio::test]
async fn viewing_marks_received_messages_read() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (bob_id, bob) = common::create_test_user(&app, "bob").await;

    app.post("/messages/bob", &alice, json!({ "body": "ping" }))
        .await;
    app.post("/messages/alice", &bob, json!({ "body": "pong" }))
        .await;

    // Bob opening the pair reads what Alice sent him.
    let resp = app.get("/messages/alice", &bob).await;
    assert_eq!(resp.status(), 200);

    let rows = Message::find().all(&app.db).await.unwrap();
    assert_eq!(rows.len(), 3);
    for row in rows {
        if row.sender_id == alice_id {
            assert_eq!(row.recipient_id, bob_id);
            assert!(row.is_read, "message {} to bob should be read", row.id);
        } else {
            assert_eq!(row.sender_id, bob_id);
            assert!(!row.is_read, "bob's own message {} should stay unread", row.id);
        }
    }

    // Alice opening it afterwards reads the reply.
    app.get("/messages/bob", &alice).await;
    let pong = Message::find()
        .filter(message::Column::SenderId.eq(bob_id))
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(pong.is_read);
}

#[tokio::test]
async fn notes_to_self_form_their_own_conversation() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    common::create_test_user(&app, "bob").await;

    app.post("/messages/bob", &alice, json!({ "body": "hi bob" }))
        .await;
    let resp = app
        .post("/messages/alice", &alice, json!({ "body": "note" }))
        .await;
    assert_eq!(resp.status(), 200);

    let body: Value = app.get("/messages/alice", &alice).await.json().await.unwrap();
    let messages = body["data"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    for m in messages {
        assert_eq!(m["sender_id"], alice_id);
        assert_eq!(m["recipient_id"], alice_id);
    }
    assert_eq!(
        messages[0]["body"],
        "alice has started a conversation with alice"
    );
    assert_eq!(messages[1]["body"], "note");

    // Notes to self stay out of the thread list.
    let body: Value = app.get("/messages", &alice).await.json().await.unwrap();
    let threads = body["data"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["counterpart"], "bob");
}

#[tokio::test]
async fn thread_list_has_one_entry_per_counterpart() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    common::create_test_user(&app, "bob").await;
    common::create_test_user(&app, "carol").await;

    app.post("/messages/carol", &alice, json!({ "body": "hey carol" }))
        .await;
    app.post("/messages/bob", &alice, json!({ "body": "hey bob" }))
        .await;
    app.post("/messages/bob", &alice, json!({ "body": "still there?" }))
        .await;

    let body: Value = app.get("/messages", &alice).await.json().await.unwrap();
    let threads = body["data"].as_array().unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0]["counterpart"], "bob");
    assert_eq!(threads[0]["last_message"]["body"], "still there?");
    assert_eq!(threads[1]["counterpart"], "carol");
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    common::create_test_user(&app, "bob").await;

    let resp = app
        .post("/messages/bob", &alice, json!({ "body": "   " }))
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn blocked_members_cannot_message() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;

    let resp = app.post("/users/alice/block", &bob, json!({})).await;
    assert_eq!(resp.status(), 200);

    let resp = app
        .post("/messages/bob", &alice, json!({ "body": "hello?" }))
        .await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/messages/bob");
}
