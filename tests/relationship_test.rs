mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn toggle_follow() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    common::create_test_user(&app, "bob").await;

    let body: Value = app
        .post("/users/bob/follow", &alice, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["following"], true);

    let resp = app
        .client
        .get(app.url("/users/bob/followers"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let followers = body["data"]["items"].as_array().unwrap();
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["username"], "alice");

    let body: Value = app
        .post("/users/bob/follow", &alice, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["following"], false);
}

#[tokio::test]
async fn self_follow_is_refused() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;

    let resp = app.post("/users/alice/follow", &alice, json!({})).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn blocked_viewer_is_sent_home() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    common::create_post(&app, &alice, "alice's post", "").await;

    app.post("/users/bob/block", &alice, json!({})).await;

    // Bob is blocked by alice: her page sends him to his own.
    let resp = app.get("/users/alice", &bob).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/users/bob");

    // Alice blocks bob: she still sees who he is, nothing more.
    let resp = app.get("/users/bob", &alice).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["member"]["username"], "bob");
    assert_eq!(body["data"]["show_content"], false);
    assert_eq!(body["data"]["viewer_blocks"], true);

    // Anonymous visitors see everything.
    let resp = app
        .client
        .get(app.url("/users/alice"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["show_content"], true);
    assert_eq!(body["data"]["posts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn block_toggle_posts_a_notice() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    common::create_test_user(&app, "bob").await;

    let body: Value = app
        .post("/users/bob/block", &alice, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["blocking"], true);

    let body: Value = app
        .post("/users/bob/block", &alice, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["blocking"], false);

    let body: Value = app.get("/messages/bob", &alice).await.json().await.unwrap();
    let bodies: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["body"].as_str().unwrap())
        .collect();
    assert!(bodies.contains(&"alice has blocked bob"));
    assert!(bodies.contains(&"alice has unblocked bob"));
}

#[tokio::test]
async fn directory_leaves_out_the_caller() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    common::create_test_user(&app, "bob").await;
    common::create_test_user(&app, "carol").await;

    let body: Value = app.get("/users", &alice).await.json().await.unwrap();
    let names: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["bob", "carol"]);
}

#[tokio::test]
async fn bio_longer_than_limit_is_refused() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;

    let resp = app
        .client
        .put(app.url("/auth/profile"))
        .bearer_auth(&alice)
        .json(&json!({ "bio": "x".repeat(101) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = app
        .client
        .put(app.url("/auth/profile"))
        .bearer_auth(&alice)
        .json(&json!({ "bio": "Rust and rowing" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["bio"], "Rust and rowing");
}
