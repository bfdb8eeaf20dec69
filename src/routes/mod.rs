use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use crate::middleware::auth::{auth_middleware, staff_middleware};
use crate::websocket;
use axum::{middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // WebSocket route (auth handled inside the handler via query token)
        .route("/ws", routing::get(websocket::notification::ws_handler))
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let auth = auth_routes(&rate_limit_config);
    let public_read = public_read_routes(&rate_limit_config);
    let member = member_routes(&rate_limit_config)
        .merge(staff_routes())
        .layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(member)
}

/// Auth routes: register, login, verify-email.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route("/auth/register", routing::post(handlers::register))
        .route(
            "/auth/register/business",
            routing::post(handlers::register_business),
        )
        .route("/auth/login", routing::post(handlers::login))
        .route("/auth/verify-email", routing::post(handlers::verify_email));

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Public reads. A bearer token, when present, still drives block checks.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Users
        .route(
            "/users/{username}",
            routing::get(handlers::user::get_user_profile),
        )
        .route(
            "/users/{username}/followers",
            routing::get(handlers::relationship::list_followers),
        )
        .route(
            "/users/{username}/following",
            routing::get(handlers::relationship::list_following),
        )
        // Posts
        .route("/posts", routing::get(handlers::post::list_posts))
        .route("/posts/{id}", routing::get(handlers::post::get_post))
        // Offers
        .route("/offers", routing::get(handlers::offer::list_offers))
        .route("/offers/{id}", routing::get(handlers::offer::get_offer))
        // Topics
        .route("/topics", routing::get(handlers::topic::list_topics))
        .route(
            "/topics/{name}/posts",
            routing::get(handlers::topic::topic_posts),
        )
        .route(
            "/topics/{name}/offers",
            routing::get(handlers::topic::topic_offers),
        );

    with_optional_rate_limit(router, config.enabled, config.public)
}

/// Everything a signed-in member can do.
fn member_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Account
        .route("/auth/me", routing::get(handlers::get_current_user))
        .route(
            "/auth/profile",
            routing::put(handlers::user::update_profile),
        )
        .route(
            "/requests/business",
            routing::post(handlers::user::request_business),
        )
        .route(
            "/requests/staff",
            routing::post(handlers::user::request_staff),
        )
        // Directory and relationships
        .route("/users", routing::get(handlers::user::directory))
        .route(
            "/users/{username}/follow",
            routing::post(handlers::relationship::toggle_follow),
        )
        .route(
            "/users/{username}/block",
            routing::post(handlers::relationship::toggle_block),
        )
        .route(
            "/users/{username}/report",
            routing::post(handlers::report::report_user),
        )
        .route(
            "/blocked",
            routing::get(handlers::relationship::list_blocked),
        )
        // Posts
        .route("/posts", routing::post(handlers::post::create_post))
        .route("/posts/{id}", routing::delete(handlers::post::delete_post))
        .route(
            "/posts/{id}/comments",
            routing::post(handlers::post::create_comment),
        )
        .route("/posts/{id}/like", routing::post(handlers::post::like_post))
        .route(
            "/posts/{id}/report",
            routing::post(handlers::report::report_post),
        )
        // Offers
        .route("/offers", routing::post(handlers::offer::create_offer))
        .route(
            "/offers/{id}",
            routing::delete(handlers::offer::delete_offer),
        )
        .route(
            "/offers/{id}/like",
            routing::post(handlers::offer::like_offer),
        )
        .route(
            "/offers/{id}/apply",
            routing::post(handlers::offer::apply_to_offer),
        )
        .route(
            "/offers/{id}/report",
            routing::post(handlers::report::report_offer),
        )
        // Messages
        .route("/messages", routing::get(handlers::message::list_threads))
        .route(
            "/messages/{username}",
            routing::get(handlers::message::get_conversation)
                .post(handlers::message::send_message),
        )
        .route(
            "/messages/{username}/image",
            routing::post(handlers::message::send_image),
        )
        .route(
            "/messages/{username}/report",
            routing::post(handlers::report::report_chat),
        )
        // Notifications
        .route(
            "/notifications",
            routing::get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/strikes",
            routing::get(handlers::notification::strikes),
        )
        // Upload
        .route(
            "/upload/avatar",
            routing::post(handlers::upload::upload_avatar),
        )
        .route("/upload/cv", routing::post(handlers::upload::upload_cv))
        .route(
            "/upload/image",
            routing::post(handlers::upload::upload_image),
        );

    with_optional_rate_limit(router, config.enabled, config.member)
}

/// Staff console. Runs inside the auth layer; non-staff are sent to `/`.
fn staff_routes() -> Router {
    use handlers::staff;

    Router::new()
        .route("/staff", routing::get(staff::home))
        // Post reports
        .route("/staff/post-reports", routing::get(staff::post_reports))
        .route("/staff/post-reports/{id}", routing::get(staff::post_report))
        .route(
            "/staff/post-reports/{id}/remove",
            routing::post(staff::remove_post),
        )
        .route(
            "/staff/post-reports/{id}/dismiss",
            routing::post(staff::dismiss_post_report),
        )
        // Offer reports
        .route("/staff/offer-reports", routing::get(staff::offer_reports))
        .route(
            "/staff/offer-reports/{id}",
            routing::get(staff::offer_report),
        )
        .route(
            "/staff/offer-reports/{id}/remove",
            routing::post(staff::remove_offer),
        )
        .route(
            "/staff/offer-reports/{id}/dismiss",
            routing::post(staff::dismiss_offer_report),
        )
        // User reports
        .route("/staff/user-reports", routing::get(staff::user_reports))
        .route("/staff/user-reports/{id}", routing::get(staff::user_report))
        .route(
            "/staff/user-reports/{id}/strike",
            routing::post(staff::strike_reported_user),
        )
        .route(
            "/staff/user-reports/{id}/dismiss",
            routing::post(staff::dismiss_user_report),
        )
        // Chat reports
        .route("/staff/chat-reports", routing::get(staff::chat_reports))
        .route("/staff/chat-reports/{id}", routing::get(staff::chat_report))
        .route(
            "/staff/chat-reports/{id}/strike",
            routing::post(staff::strike_chat_user),
        )
        .route(
            "/staff/chat-reports/{id}/dismiss",
            routing::post(staff::dismiss_chat_report),
        )
        // Business and staff requests
        .route("/staff/{queue}", routing::get(staff::list_requests))
        .route("/staff/{queue}/{id}", routing::get(staff::get_request))
        .route(
            "/staff/{queue}/{id}/accept",
            routing::post(staff::accept_request),
        )
        .route(
            "/staff/{queue}/{id}/deny",
            routing::post(staff::deny_request),
        )
        .layer(middleware::from_fn(staff_middleware))
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    else {
        tracing::warn!(?rule, "Invalid rate limit configuration, limiter disabled");
        return router;
    };

    router.layer(GovernorLayer::new(governor_conf))
}
