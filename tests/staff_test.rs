mod common;

use chrono::Duration;
use hexagon::models::{offer, post, Follow, Offer, Post};
use hexagon::utils::clock::Clock;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::{json, Value};

async fn staff_member(app: &common::TestApp) -> String {
    let (id, token) = common::create_test_user(app, "moderator").await;
    common::set_role(&app.db, id, "staff").await;
    token
}

async fn report_user(app: &common::TestApp, reporter: &str, username: &str) -> i64 {
    let resp = app
        .post(&format!("/users/{}/report", username), reporter, json!({}))
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    body["data"]["report_id"].as_i64().unwrap()
}

async fn strike_via_report(
    app: &common::TestApp,
    staff: &str,
    reporter: &str,
    username: &str,
) -> Value {
    let report_id = report_user(app, reporter, username).await;
    let resp = app
        .post(
            &format!("/staff/user-reports/{}/strike", report_id),
            staff,
            json!({}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn console_redirects_members_home() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;

    let resp = app.get("/staff", &alice).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/");

    let staff = staff_member(&app).await;
    let resp = app.get("/staff", &staff).await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn removing_a_reported_post_strikes_its_author() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;
    let post_id = common::create_post(&app, &alice, "rude words", "").await;

    let resp = app
        .post(&format!("/posts/{}/report", post_id), &bob, json!({}))
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    let report_id = body["data"]["report_id"].as_i64().unwrap();

    // A second reporter joins the same report.
    let (_, carol) = common::create_test_user(&app, "carol").await;
    let body: Value = app
        .post(&format!("/posts/{}/report", post_id), &carol, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["report_id"].as_i64().unwrap(), report_id);

    let body: Value = app
        .get(&format!("/staff/post-reports/{}", report_id), &staff)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["reporters"], json!(["bob", "carol"]));

    let resp = app
        .post(
            &format!("/staff/post-reports/{}/remove", report_id),
            &staff,
            json!({}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["strikes"], 1);
    assert_eq!(body["data"]["tier"], "warned");

    assert_eq!(common::strikes_of(&app.db, alice_id).await, 1);
    let body: Value = app.get("/staff/post-reports", &staff).await.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    let resp = app
        .client
        .get(app.url(&format!("/posts/{}", post_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 303);
}

#[tokio::test]
async fn self_report_is_refused() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;

    let resp = app.post("/users/alice/report", &alice, json!({})).await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn third_strike_purges_content_and_follows() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;

    common::create_post(&app, &alice, "one", "").await;
    common::create_offer(&app, &alice, "Job").await;
    app.post("/users/bob/follow", &alice, json!({})).await;
    app.post("/users/alice/follow", &bob, json!({})).await;

    let first = strike_via_report(&app, &staff, &bob, "alice").await;
    assert_eq!(first["data"]["purged"], false);
    strike_via_report(&app, &staff, &bob, "alice").await;
    let third = strike_via_report(&app, &staff, &bob, "alice").await;
    assert_eq!(third["data"]["strikes"], 3);
    assert_eq!(third["data"]["tier"], "suspended");
    assert_eq!(third["data"]["purged"], true);

    let visible_posts = Post::find()
        .filter(post::Column::UserId.eq(alice_id))
        .filter(post::Column::IsDelete.eq(false))
        .all(&app.db)
        .await
        .unwrap();
    assert!(visible_posts.is_empty());
    let visible_offers = Offer::find()
        .filter(offer::Column::UserId.eq(alice_id))
        .filter(offer::Column::IsDelete.eq(false))
        .all(&app.db)
        .await
        .unwrap();
    assert!(visible_offers.is_empty());
    assert!(Follow::find().all(&app.db).await.unwrap().is_empty());
}

#[tokio::test]
async fn strike_date_moves_with_each_tier() {
    let app = common::spawn_app().await;
    let (alice_id, _) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;

    for (strikes, days) in [(1, 7), (2, 28), (3, 365)] {
        let outcome = strike_via_report(&app, &staff, &bob, "alice").await;
        assert_eq!(outcome["data"]["strikes"], strikes);
        assert_eq!(
            common::strike_date_of(&app.db, alice_id).await,
            app.clock.now() + Duration::days(days),
            "strike {} should expire after {} days",
            strikes,
            days
        );
    }
}

#[tokio::test]
async fn lifting_a_suspension_keeps_purged_content_hidden() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;

    common::create_post(&app, &alice, "one", "").await;
    common::create_offer(&app, &alice, "Job").await;
    for _ in 0..3 {
        strike_via_report(&app, &staff, &bob, "alice").await;
    }

    app.clock.advance(Duration::days(366));
    let body: Value = app.get("/staff", &staff).await.json().await.unwrap();
    assert_eq!(body["data"]["unstruck"], 1);
    assert_eq!(common::strikes_of(&app.db, alice_id).await, 0);

    let posts = Post::find()
        .filter(post::Column::UserId.eq(alice_id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts.iter().all(|p| p.is_delete));
    let offers = Offer::find()
        .filter(offer::Column::UserId.eq(alice_id))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(offers.len(), 1);
    assert!(offers.iter().all(|o| o.is_delete));
}

#[tokio::test]
async fn acting_twice_on_one_report_strikes_once() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;
    let post_id = common::create_post(&app, &alice, "rude words", "").await;

    let body: Value = app
        .post(&format!("/posts/{}/report", post_id), &bob, json!({}))
        .await
        .json()
        .await
        .unwrap();
    let report_id = body["data"]["report_id"].as_i64().unwrap();
    let remove = format!("/staff/post-reports/{}/remove", report_id);

    let resp = app.post(&remove, &staff, json!({})).await;
    assert_eq!(resp.status(), 200);
    let resp = app.post(&remove, &staff, json!({})).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/staff/post-reports");
    assert_eq!(common::strikes_of(&app.db, alice_id).await, 1);

    let report_id = report_user(&app, &bob, "alice").await;
    let strike = format!("/staff/user-reports/{}/strike", report_id);
    let resp = app.post(&strike, &staff, json!({})).await;
    assert_eq!(resp.status(), 200);
    let resp = app.post(&strike, &staff, json!({})).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/staff/user-reports");
    assert_eq!(common::strikes_of(&app.db, alice_id).await, 2);
}

#[tokio::test]
async fn chat_strike_counts_once_per_report() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;

    app.post("/messages/bob", &alice, json!({ "body": "nasty" }))
        .await;
    app.post("/messages/alice/report", &bob, json!({})).await;
    let body: Value = app.get("/staff/chat-reports", &staff).await.json().await.unwrap();
    let report_id = body["data"][0]["id"].as_i64().unwrap();
    let strike = format!("/staff/chat-reports/{}/strike", report_id);

    let resp = app.post(&strike, &staff, json!({})).await;
    assert_eq!(resp.status(), 200);
    let resp = app.post(&strike, &staff, json!({})).await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/staff/chat-reports");
    assert_eq!(common::strikes_of(&app.db, alice_id).await, 1);
}

#[tokio::test]
async fn first_strike_demotes_staff() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    let (helper_id, _) = common::create_test_user(&app, "helper").await;
    common::set_role(&app.db, helper_id, "staff").await;
    let staff = staff_member(&app).await;

    let outcome = strike_via_report(&app, &staff, &alice, "helper").await;
    assert_eq!(outcome["data"]["demoted"], true);
    assert_eq!(common::role_of(&app.db, helper_id).await, "user");
}

#[tokio::test]
async fn expired_strikes_are_lifted_once() {
    let app = common::spawn_app().await;
    let (alice_id, _) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;

    strike_via_report(&app, &staff, &bob, "alice").await;

    let body: Value = app.get("/staff", &staff).await.json().await.unwrap();
    assert_eq!(body["data"]["unstruck"], 0);
    assert_eq!(common::strikes_of(&app.db, alice_id).await, 1);

    app.clock.advance(chrono::Duration::days(8));

    let body: Value = app.get("/staff", &staff).await.json().await.unwrap();
    assert_eq!(body["data"]["unstruck"], 1);
    assert_eq!(common::strikes_of(&app.db, alice_id).await, 0);

    let body: Value = app.get("/staff", &staff).await.json().await.unwrap();
    assert_eq!(body["data"]["unstruck"], 0);
}

#[tokio::test]
async fn chat_review_leaves_messages_unread() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app, "alice").await;
    let (_, bob) = common::create_test_user(&app, "bob").await;
    let staff = staff_member(&app).await;

    app.post("/messages/bob", &alice, json!({ "body": "nasty" }))
        .await;
    let body: Value = app
        .post("/messages/alice/report", &bob, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["filed"], true);
    let body: Value = app
        .post("/messages/alice/report", &bob, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["filed"], false);

    let body: Value = app.get("/staff/chat-reports", &staff).await.json().await.unwrap();
    let reports = body["data"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["chat_user"], "alice");
    let report_id = reports[0]["id"].as_i64().unwrap();

    let body: Value = app
        .get(&format!("/staff/chat-reports/{}", report_id), &staff)
        .await
        .json()
        .await
        .unwrap();
    let messages = body["data"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m["is_read"] == false));

    let resp = app
        .post(
            &format!("/staff/chat-reports/{}/dismiss", report_id),
            &staff,
            json!({}),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let resp = app
        .get(&format!("/staff/chat-reports/{}", report_id), &staff)
        .await;
    assert_eq!(resp.status(), 303);
    assert_eq!(resp.headers()["location"], "/api/v1/staff/chat-reports");
}

#[tokio::test]
async fn staff_request_promotes_on_accept() {
    let app = common::spawn_app().await;
    let (alice_id, alice) = common::create_test_user(&app, "alice").await;
    let staff = staff_member(&app).await;

    let body: Value = app
        .post("/requests/staff", &alice, json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["filed"], true);

    let body: Value = app.get("/staff/staff-requests", &staff).await.json().await.unwrap();
    let request_id = body["data"][0]["id"].as_i64().unwrap();

    let resp = app
        .post(
            &format!("/staff/staff-requests/{}/accept", request_id),
            &staff,
            json!({}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(common::role_of(&app.db, alice_id).await, "staff");

    let body: Value = app.get("/staff/staff-requests", &staff).await.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());
}
