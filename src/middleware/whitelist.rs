use crate::{config::WhitelistConfig, error::ApiError};
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

// Axum middleware function
pub async fn whitelist_middleware(
    State(whitelist): State<Arc<WhitelistConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !whitelist.enabled {
        return Ok(next.run(request).await);
    }

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_canonical());

    match client_ip {
        Some(ip) if whitelist.allows(ip) => Ok(next.run(request).await),
        Some(ip) => {
            tracing::warn!("Unauthorized access attempt from IP: {}", ip);
            Err(ApiError::Unauthorized)
        }
        None => {
            tracing::warn!("Unauthorized access attempt from unknown peer");
            Err(ApiError::Unauthorized)
        }
    }
}
