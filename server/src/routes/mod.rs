use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::sheet::{sheet_status, sheet_submit};
use crate::handlers::submit::submit_registration;
use crate::handlers::webhook::registrant_created;
use crate::handlers::{health_check, method_not_allowed, preflight};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/submit",
            post(submit_registration)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/sheet/submit",
            post(sheet_submit)
                .get(sheet_status)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/hooks/registrant-created",
            post(registrant_created)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state);

    create_security_headers_layer()
        .apply(router)
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
}
