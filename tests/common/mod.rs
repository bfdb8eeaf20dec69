#![allow(dead_code)]

use chrono::{NaiveDateTime, Timelike, Utc};
use hexagon::{
    models::{client, profile, user, Client, Profile, User},
    services::{email::EmailService, upload::UploadConfig},
    utils::clock::FixedClock,
    websocket::hub::NotificationHub,
    AppState,
};
use reqwest::Client as HttpClient;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection,
    EntityTrait, QueryFilter,
};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Mail domain of the institution every test database knows about.
pub const CLIENT_DOMAIN: &str = "test.com";

fn init_env() {
    INIT.call_once(|| {
        std::env::set_var(
            "JWT_SECRET",
            "integration_test_secret_that_is_at_least_32_characters_long",
        );
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
        std::env::set_var("REQUIRE_EMAIL_VERIFICATION", "false");
        let config = hexagon::config::jwt::JwtConfig::from_env().unwrap();
        let _ = hexagon::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: HttpClient,
    pub clock: FixedClock,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

/// A fresh in-memory database per app; tests never share state.
pub async fn spawn_app() -> TestApp {
    init_env();

    // A second pooled connection would open a different in-memory database.
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opt)
        .await
        .expect("Failed to open in-memory database");

    hexagon::migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    client::ActiveModel {
        name: sea_orm::ActiveValue::Set("Test University".to_string()),
        domain: sea_orm::ActiveValue::Set(CLIENT_DOMAIN.to_string()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .expect("Failed to seed client");

    // Whole seconds so stored timestamps compare equal after a round trip.
    let clock = FixedClock::new(Utc::now().naive_utc().with_nanosecond(0).unwrap());
    let app = hexagon::build_app(AppState {
        db: db.clone(),
        hub: NotificationHub::new(),
        email: EmailService::disabled("http://localhost:3000".to_string()),
        upload: UploadConfig {
            upload_dir: std::env::temp_dir()
                .join("hexagon_test_uploads")
                .to_string_lossy()
                .into_owned(),
        },
        clock: Arc::new(clock.clone()),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let client = HttpClient::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client,
        clock,
    }
}

/// Register a personal account under the seeded client. Returns (user_id, token).
pub async fn create_test_user(app: &TestApp, username: &str) -> (i32, String) {
    let resp = app
        .client
        .post(app.url("/auth/register"))
        .json(&json!({
            "username": username,
            "email": format!("{}@{}", username, CLIENT_DOMAIN),
            "password": "test_password_123",
            "first_name": username,
        }))
        .send()
        .await
        .expect("Failed to register user");

    let status = resp.status();
    let body: Value = resp.json().await.unwrap();
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to register '{}': status={}, body={}", username, status, body);
    }

    let user_id = body["data"]["user_id"].as_i64().unwrap() as i32;
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (user_id, token)
}

pub async fn set_role(db: &DatabaseConnection, user_id: i32, role: &str) {
    User::update_many()
        .col_expr(user::Column::Role, Expr::value(role))
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await
        .expect("Failed to set role");
}

pub async fn set_strikes(db: &DatabaseConnection, user_id: i32, strikes: i32) {
    Profile::update_many()
        .col_expr(profile::Column::Strikes, Expr::value(strikes))
        .filter(profile::Column::UserId.eq(user_id))
        .exec(db)
        .await
        .expect("Failed to set strikes");
}

pub async fn strikes_of(db: &DatabaseConnection, user_id: i32) -> i32 {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .unwrap()
        .expect("profile exists")
        .strikes
}

pub async fn strike_date_of(db: &DatabaseConnection, user_id: i32) -> NaiveDateTime {
    Profile::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
        .unwrap()
        .expect("profile exists")
        .strike_date
}

pub async fn role_of(db: &DatabaseConnection, user_id: i32) -> String {
    User::find_by_id(user_id)
        .one(db)
        .await
        .unwrap()
        .expect("user exists")
        .role
}

pub async fn client_count(db: &DatabaseConnection) -> usize {
    Client::find().all(db).await.unwrap().len()
}

/// Create a post and return its id.
pub async fn create_post(app: &TestApp, token: &str, content: &str, topics: &str) -> i32 {
    let resp = app
        .post("/posts", token, json!({ "content": content, "topics": topics }))
        .await;
    assert_eq!(resp.status(), 200, "post creation failed");
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_i64().unwrap() as i32
}

/// Create an offer and return its id.
pub async fn create_offer(app: &TestApp, token: &str, head: &str) -> i32 {
    let resp = app
        .post(
            "/offers",
            token,
            json!({ "head": head, "content": "Join us", "topics": "jobs" }),
        )
        .await;
    assert_eq!(resp.status(), 200, "offer creation failed");
    let body: Value = resp.json().await.unwrap();
    body["data"]["id"].as_i64().unwrap() as i32
}
