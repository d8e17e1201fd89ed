// Route table for the judge API

use axum::{
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            post(handlers::compile_code).options(handlers::preflight),
        )
        .route(
            "/compile-code",
            post(handlers::compile_code).options(handlers::preflight),
        )
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
}

pub fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Complete application: routes, CORS and state.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes())
        .layer(cors())
        .with_state(state)
}
