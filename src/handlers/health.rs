use crate::{handlers::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;
use std::path::Path;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let storage_writable = storage_writable(state.store.root()).await;

    let status = if storage_writable { "healthy" } else { "degraded" };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage_writable,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}

const WRITE_CHECK_FILE: &str = ".write_check";

// Permission bits say nothing about the current user, so actually write.
async fn storage_writable(root: &Path) -> bool {
    let path = root.join(WRITE_CHECK_FILE);
    match tokio::fs::write(&path, b"ok").await {
        Ok(()) => {
            // A concurrent check may already have removed it.
            tokio::fs::remove_file(&path).await.ok();
            true
        }
        Err(e) => {
            tracing::warn!("Storage root {} is not writable: {}", root.display(), e);
            false
        }
    }
}
