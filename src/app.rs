use crate::{
    config::WhitelistConfig,
    handlers::*,
    middleware::{json_method_not_allowed, panic_response, whitelist_middleware},
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Builds the full router. Serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the whitelist
/// can see the peer address.
pub fn create_app(state: AppState, whitelist: WhitelistConfig) -> Router {
    Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/payments/:lnurlp_id", get(get_payments))
        .route("/vote", post(vote))
        .route("/votes", get(get_votes))
        .route("/health", get(health_check))
        .fallback(not_found)
        .with_state(state)
        .layer(axum_middleware::map_response(json_method_not_allowed))
        .layer(axum_middleware::from_fn_with_state(
            Arc::new(whitelist),
            whitelist_middleware,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(CorsLayer::permissive())
}
