use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use hexagon::{
    config::{self, moderation::ModerationConfig},
    migration, services,
    services::upload::UploadConfig,
    utils::{self, clock::system_clock},
    websocket::hub::NotificationHub,
    AppState,
};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Auth routes
        hexagon::handlers::register,
        hexagon::handlers::auth::register_business,
        hexagon::handlers::login,
        hexagon::handlers::verify_email,
        hexagon::handlers::get_current_user,
        // User routes
        hexagon::handlers::user::get_user_profile,
        hexagon::handlers::user::update_profile,
        hexagon::handlers::user::directory,
        hexagon::handlers::user::request_business,
        hexagon::handlers::user::request_staff,
        // Relationship routes
        hexagon::handlers::relationship::toggle_follow,
        hexagon::handlers::relationship::toggle_block,
        // Post routes
        hexagon::handlers::post::list_posts,
        hexagon::handlers::post::get_post,
        hexagon::handlers::post::create_post,
        hexagon::handlers::post::create_comment,
        hexagon::handlers::post::delete_post,
        hexagon::handlers::post::like_post,
        // Offer routes
        hexagon::handlers::offer::list_offers,
        hexagon::handlers::offer::get_offer,
        hexagon::handlers::offer::create_offer,
        hexagon::handlers::offer::delete_offer,
        hexagon::handlers::offer::like_offer,
        hexagon::handlers::offer::apply_to_offer,
        // Topic routes
        hexagon::handlers::topic::list_topics,
        hexagon::handlers::topic::topic_posts,
        hexagon::handlers::topic::topic_offers,
        // Message routes
        hexagon::handlers::message::list_threads,
        hexagon::handlers::message::get_conversation,
        hexagon::handlers::message::send_message,
        // Notification routes
        hexagon::handlers::notification::list_notifications,
        hexagon::handlers::notification::strikes,
        // Report routes
        hexagon::handlers::report::report_post,
        hexagon::handlers::report::report_offer,
        hexagon::handlers::report::report_user,
        hexagon::handlers::report::report_chat,
        // Staff routes
        hexagon::handlers::staff::home,
        hexagon::handlers::staff::post_reports,
        hexagon::handlers::staff::post_report,
        hexagon::handlers::staff::remove_post,
        hexagon::handlers::staff::offer_reports,
        hexagon::handlers::staff::offer_report,
        hexagon::handlers::staff::remove_offer,
        hexagon::handlers::staff::user_reports,
        hexagon::handlers::staff::user_report,
        hexagon::handlers::staff::strike_reported_user,
        hexagon::handlers::staff::chat_reports,
        hexagon::handlers::staff::chat_report,
        hexagon::handlers::staff::list_requests,
        hexagon::handlers::staff::get_request,
        hexagon::handlers::staff::accept_request,
    ),
    components(
        schemas(
            hexagon::response::ApiResponse<serde_json::Value>,
            hexagon::response::PaginatedResponse<serde_json::Value>,
            hexagon::response::PaginationQuery,
            hexagon::error::AppError,
            // Auth
            hexagon::handlers::auth::RegisterRequest,
            hexagon::handlers::auth::BusinessRegisterRequest,
            hexagon::handlers::auth::LoginRequest,
            hexagon::handlers::auth::VerifyEmailRequest,
            hexagon::handlers::auth::AuthResponse,
            hexagon::handlers::auth::UserResponse,
            // Users
            hexagon::handlers::user::UpdateProfileRequest,
            hexagon::handlers::user::ProfileResponse,
            hexagon::handlers::user::RequestFiledResponse,
            hexagon::services::user::MemberCard,
            hexagon::services::user::ProfilePage,
            hexagon::handlers::relationship::FollowToggleResponse,
            hexagon::handlers::relationship::BlockToggleResponse,
            // Content
            hexagon::handlers::post::CreatePostRequest,
            hexagon::handlers::post::LikeResponse,
            hexagon::services::post::PostView,
            hexagon::services::post::PostDetail,
            hexagon::handlers::offer::CreateOfferRequest,
            hexagon::handlers::offer::ApplyResponse,
            hexagon::services::offer::OfferView,
            hexagon::handlers::topic::TopicResponse,
            // Messages
            hexagon::handlers::message::SendMessageRequest,
            hexagon::services::message::ThreadSummary,
            // Notifications
            hexagon::handlers::notification::NotificationResponse,
            hexagon::handlers::notification::StrikesResponse,
            // Reports and staff
            hexagon::handlers::report::ReportResponse,
            hexagon::handlers::report::ChatReportResponse,
            hexagon::handlers::staff::AcceptedResponse,
            hexagon::services::staff::StaffHome,
            hexagon::services::staff::ReportEntry,
            hexagon::services::staff::ChatReportEntry,
            hexagon::services::staff::PostReportView,
            hexagon::services::staff::OfferReportView,
            hexagon::services::staff::UserReportView,
            hexagon::services::staff::ChatReportView,
            hexagon::services::request::PendingRequest,
            hexagon::services::moderation::StrikeOutcome,
            hexagon::services::moderation::StrikeTier,
        )
    ),
    tags(
        (name = "auth", description = "Registration and sign-in"),
        (name = "users", description = "Profiles, directory and promotion requests"),
        (name = "relationships", description = "Follow and block"),
        (name = "posts", description = "Posts, comments and likes"),
        (name = "offers", description = "Business offers"),
        (name = "topics", description = "Topic browsing"),
        (name = "messages", description = "Direct messages"),
        (name = "notifications", description = "Notifications and strike status"),
        (name = "reports", description = "Reporting content and members"),
        (name = "staff", description = "Moderation console"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hexagon=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    let jwt_config = validate_config()?;

    utils::jwt::init_jwt_config(jwt_config)?;

    tracing::info!("Starting Hexagon v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());

    let email_service = services::email::EmailService::from_env();
    if email_service.is_configured() {
        tracing::info!("SMTP email service configured");
    } else {
        tracing::warn!("SMTP not configured, emails will be skipped");
    }

    spawn_unstrike_task(db.clone(), ModerationConfig::from_env());

    let state = AppState {
        db: db.clone(),
        hub: NotificationHub::new(),
        email: email_service,
        upload: UploadConfig {
            upload_dir: upload_dir.clone(),
        },
        clock: system_clock(),
    };

    let app = create_app(state, &upload_dir).layer(Extension(db));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<config::jwt::JwtConfig> {
    let jwt_config = config::jwt::JwtConfig::from_env()?;

    // DATABASE_URL is checked here for an early error; the connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    std::fs::create_dir_all(&upload_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create upload directory '{}': {}", upload_dir, e)
    })?;

    Ok(jwt_config)
}

/// Periodically lifts strikes whose tier has expired.
fn spawn_unstrike_task(db: DatabaseConnection, config: ModerationConfig) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.unstrike_interval);
        loop {
            ticker.tick().await;
            let now = chrono::Utc::now().naive_utc();
            match services::moderation::unstrike_expired(&db, now).await {
                Ok(0) => {}
                Ok(count) => tracing::info!(count, "expired strikes lifted"),
                Err(e) => tracing::warn!("unstrike sweep failed: {}", e),
            }
        }
    });
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app(state: AppState, upload_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(hexagon::build_app(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(db): Extension<DatabaseConnection>) -> impl IntoResponse {
    let db_ok = db.ping().await.is_ok();
    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Hexagon",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
