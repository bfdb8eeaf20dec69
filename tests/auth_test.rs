mod common;

use hexagon::models::{client_ban, ClientBan};
use sea_orm::{ActiveModelTrait, EntityTrait};
use serde_json::{json, Value};

async fn register(app: &common::TestApp, username: &str, email: &str) -> (u16, Value) {
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "test_password_123",
            "first_name": "Test",
        }))
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn register_under_client_domain_and_login() {
    let app = common::spawn_app().await;

    let (status, body) = register(&app, "alice", "alice@test.com").await;
    assert_eq!(status, 200);
    assert!(body["data"]["token"].is_string());

    let resp = app
        .client
        .post(app.url("/auth/login"))
        .json(&json!({ "username": "alice", "password": "test_password_123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let resp = app.get("/auth/me", &token).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn register_outside_known_domains_is_refused() {
    let app = common::spawn_app().await;

    let (status, body) = register(&app, "mallory", "mallory@elsewhere.org").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "You must register with a valid mail");
}

#[tokio::test]
async fn banned_address_is_refused_by_name() {
    let app = common::spawn_app().await;
    let client = hexagon::models::Client::find()
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    client_ban::ActiveModel {
        client_id: sea_orm::ActiveValue::Set(client.id),
        name: sea_orm::ActiveValue::Set("Law School".to_string()),
        mail: sea_orm::ActiveValue::Set("law.test.com".to_string()),
        ..Default::default()
    }
    .insert(&app.db)
    .await
    .unwrap();
    assert_eq!(ClientBan::find().all(&app.db).await.unwrap().len(), 1);

    let (status, body) = register(&app, "lawyer", "lawyer@law.test.com").await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Law School is not allowed to use Hexagon");

    let (status, _) = register(&app, "student", "student@test.com").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn duplicate_username_is_refused() {
    let app = common::spawn_app().await;
    common::create_test_user(&app, "alice").await;

    let (status, _) = register(&app, "alice", "other@test.com").await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn business_registration_files_a_request() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/register/business"))
        .json(&json!({
            "username": "acme",
            "email": "hr@test.com",
            "password": "test_password_123",
            "first_name": "Acme",
            "domain": "https://acme.example",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "You must register as a student");

    let resp = app
        .client
        .post(app.url("/auth/register/business"))
        .json(&json!({
            "username": "acme",
            "email": "hr@acme.example",
            "password": "test_password_123",
            "first_name": "Acme",
            "domain": "https://acme.example",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let acme_id = body["data"]["user_id"].as_i64().unwrap();

    let (staff_id, staff_token) = common::create_test_user(&app, "moderator").await;
    common::set_role(&app.db, staff_id, "staff").await;

    let resp = app.get("/staff/business-requests", &staff_token).await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let queue = body["data"].as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["username"], "acme");
    let request_id = queue[0]["id"].as_i64().unwrap();

    let resp = app
        .post(
            &format!("/staff/business-requests/{}/accept", request_id),
            &staff_token,
            json!({}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["user_id"].as_i64().unwrap(), acme_id);

    let resp = app
        .client
        .get(app.url("/users/acme"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["is_business"], true);
    assert_eq!(body["data"]["domain"], "https://acme.example");
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = common::spawn_app().await;
    assert_eq!(common::client_count(&app.db).await, 1);

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
