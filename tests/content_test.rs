mod common;

use serde_json::{json, Value};

#[tokio::test]
async fn post_feed_hides_comments() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "alice").await;

    let post_id = common::create_post(&app, &token, "Hello **world**", "").await;
    let resp = app
        .post(
            &format!("/posts/{}/comments", post_id),
            &token,
            json!({ "content": "first!" }),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let resp = app.client.get(app.url("/posts")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap() as i32, post_id);
    assert!(items[0]["content_html"]
        .as_str()
        .unwrap()
        .contains("<strong>world</strong>"));

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let comments = body["data"]["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["content"], "first!");
}

#[tokio::test]
async fn topics_are_parsed_from_free_text() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app, "alice").await;
    common::create_post(&app, &token, "tagged", "Hello, World! foo_bar").await;

    let resp = app.client.get(app.url("/topics")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    let mut names: Vec<String> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Hello", "World", "foobar"]);

    let resp = app
        .client
        .get(app.url("/topics/foobar/posts"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_topic_redirects_to_feed() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/topics/nothing/posts"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/posts");
}

#[tokio::test]
async fn like_toggles() {
    let app = common::spawn_app().await;
    let (_, author) = common::create_test_user(&app, "alice").await;
    let (_, fan) = common::create_test_user(&app, "bob").await;
    let post_id = common::create_post(&app, &author, "likeable", "").await;

    let path = format!("/posts/{}/like", post_id);
    let body: Value = app.post(&path, &fan, json!({})).await.json().await.unwrap();
    assert_eq!(body["data"]["liked"], true);
    assert_eq!(body["data"]["likes"], 1);

    let body: Value = app.post(&path, &fan, json!({})).await.json().await.unwrap();
    assert_eq!(body["data"]["liked"], false);
    assert_eq!(body["data"]["likes"], 0);
}

#[tokio::test]
async fn struck_member_cannot_publish() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app, "alice").await;
    common::set_strikes(&app.db, user_id, 1).await;

    let resp = app
        .post("/posts", &token, json!({ "content": "still here" }))
        .await;
    assert_eq!(resp.status(), 403);

    let resp = app.client.get(app.url("/posts")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn heavily_struck_member_cannot_like() {
    let app = common::spawn_app().await;
    let (_, author) = common::create_test_user(&app, "alice").await;
    let (fan_id, fan) = common::create_test_user(&app, "bob").await;
    let post_id = common::create_post(&app, &author, "likeable", "").await;

    common::set_strikes(&app.db, fan_id, 2).await;
    let resp = app
        .post(&format!("/posts/{}/like", post_id), &fan, json!({}))
        .await;
    assert_eq!(resp.status(), 200);

    common::set_strikes(&app.db, fan_id, 3).await;
    let resp = app
        .post(&format!("/posts/{}/like", post_id), &fan, json!({}))
        .await;
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn only_the_owner_deletes_a_post() {
    let app = common::spawn_app().await;
    let (_, author) = common::create_test_user(&app, "alice").await;
    let (_, other) = common::create_test_user(&app, "bob").await;
    let post_id = common::create_post(&app, &author, "mine", "").await;

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);

    let resp = app
        .client
        .delete(app.url(&format!("/posts/{}", post_id)))
        .bearer_auth(&author)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/posts");
}

#[tokio::test]
async fn applying_to_an_offer_messages_the_owner() {
    let app = common::spawn_app().await;
    let (_, owner) = common::create_test_user(&app, "acme").await;
    let (_, applicant) = common::create_test_user(&app, "bob").await;
    let offer_id = common::create_offer(&app, &owner, "Rust intern").await;

    let resp = app
        .post(&format!("/offers/{}/apply", offer_id), &applicant, json!({}))
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["thread"], "/api/v1/messages/acme");

    let body: Value = app.get("/messages/bob", &owner).await.json().await.unwrap();
    let messages = body["data"].as_array().unwrap();
    let last = messages.last().unwrap();
    assert!(last["body"]
        .as_str()
        .unwrap()
        .ends_with(&format!("/api/v1/offers/{}", offer_id)));
}
