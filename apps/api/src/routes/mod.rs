pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth;
use crate::export::handlers as export_handlers;
use crate::report::handlers as report_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Report routes require a signed-in user; health and sign-out do not.
    let report_api = Router::new()
        .route(
            "/api/v1/reports",
            post(report_handlers::handle_generate_report),
        )
        .route(
            "/api/v1/reports/share",
            post(export_handlers::handle_share),
        )
        .route(
            "/api/v1/reports/export",
            post(export_handlers::handle_export),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/signout", post(auth::handle_sign_out))
        .merge(report_api)
        .with_state(state)
}
