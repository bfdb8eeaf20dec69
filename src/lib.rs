pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod utils;
pub mod websocket;

pub use error::{AppError, AppResult};
pub use middleware::auth::AuthUser;
pub use response::{ApiResponse, PaginatedResponse, PaginationQuery};

use axum::{extract::Extension, middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use services::{email::EmailService, notification::Notifier, upload::UploadConfig};
use utils::clock::SharedClock;
use websocket::hub::NotificationHub;

/// Shared state every request can reach through `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub hub: NotificationHub,
    pub email: EmailService,
    pub upload: UploadConfig,
    pub clock: SharedClock,
}

/// The API router with its extensions attached. The binary wraps this with
/// docs, static files, tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    let notifier = Notifier {
        hub: state.hub.clone(),
        email: state.email.clone(),
    };

    routes::create_routes()
        .layer(from_fn(middleware::security::security_headers_middleware))
        .layer(Extension(state.db))
        .layer(Extension(state.hub))
        .layer(Extension(state.email))
        .layer(Extension(notifier))
        .layer(Extension(state.upload))
        .layer(Extension(state.clock))
}
