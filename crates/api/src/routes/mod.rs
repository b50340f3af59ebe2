//! API route definitions.

use axum::{Router, middleware};
use expensa_shared::Role;

use crate::AppState;
use crate::middleware::auth::{ADMIN, ADMIN_OR_USER, AuthGate, auth_gate};

pub mod auth;
pub mod expenses;
pub mod health;
pub mod ocr;
pub mod users;

/// Wraps `router` in a gate admitting `allowed` roles.
fn gated(state: &AppState, allowed: &'static [Role], router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(
        AuthGate::new(state.jwt_service.clone(), allowed),
        auth_gate,
    ))
}

/// Creates the API router with public and gated routes.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(gated(state, ADMIN, users::admin_routes()))
        .merge(gated(state, ADMIN, expenses::admin_routes()))
        .merge(gated(state, ADMIN_OR_USER, expenses::member_routes()))
        .merge(gated(state, ADMIN_OR_USER, ocr::routes()))
}
