//! AgriBridge HTTP API.
//!
//! Everything under `/api/v1` except `/login` and `/line-webhook` requires
//! a bearer token; the tenant of every operation comes from that token.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use config::{AppConfig, ConfigError, ServerConfig};
pub use error::{ApiError, ServerError};
pub use state::{AppState, SharedState};

pub const API_PREFIX: &str = "/api/v1";

pub fn build_router(state: SharedState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest(API_PREFIX, api_routes())
        .layer(cors_layer(&server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<SharedState> {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::payments::router())
        .merge(routes::notifications::router())
        .nest("/farmers", routes::farmers::router())
        .nest("/products", routes::products::router())
        .nest("/orders", routes::orders::router())
        .nest("/blockchain", routes::blockchain::router())
        .nest("/iot", routes::iot::router())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
