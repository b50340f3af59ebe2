//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - The bearer-token gate
//! - Request extractors that answer in the JSON envelope
//! - Response types

pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use expensa_core::accounts::AccountService;
use expensa_core::auth::{AuthService, UserStore};
use expensa_core::expense::{ExpenseService, ExpenseStore};
use expensa_db::{ExpenseRepository, UserRepository};
use expensa_shared::{JwtService, Mailer, OcrClient};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted request body, sized for OCR uploads.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login, and password recovery.
    pub auth: AuthService,
    /// Admin sub-user management.
    pub accounts: AccountService,
    /// Expense entry and reporting.
    pub expenses: ExpenseService,
    /// JWT service for the bearer-token gate.
    pub jwt_service: Arc<JwtService>,
    /// OCR upstream client.
    pub ocr: Arc<OcrClient>,
}

impl AppState {
    /// Wires services over arbitrary store implementations.
    pub fn new(
        users: Arc<dyn UserStore>,
        expenses: Arc<dyn ExpenseStore>,
        mailer: Arc<dyn Mailer>,
        jwt_service: Arc<JwtService>,
        ocr: Arc<OcrClient>,
    ) -> Self {
        Self {
            auth: AuthService::new(users.clone(), mailer.clone(), jwt_service.clone()),
            accounts: AccountService::new(users, mailer),
            expenses: ExpenseService::new(expenses),
            jwt_service,
            ocr,
        }
    }

    /// Wires services over the PostgreSQL repositories.
    pub fn with_database(
        db: DatabaseConnection,
        mailer: Arc<dyn Mailer>,
        jwt_service: Arc<JwtService>,
        ocr: Arc<OcrClient>,
    ) -> Self {
        Self::new(
            Arc::new(UserRepository::new(db.clone())),
            Arc::new(ExpenseRepository::new(db)),
            mailer,
            jwt_service,
            ocr,
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(&state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
