use crate::{
    error::ApiError,
    handlers::AppState,
    models::{is_valid_key, PaymentRecord},
};
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn get_payments(
    State(state): State<AppState>,
    Path(lnurlp_id): Path<String>,
) -> Result<Json<Vec<PaymentRecord>>, ApiError> {
    if !is_valid_key(&lnurlp_id) {
        return Err(ApiError::InvalidKey(lnurlp_id));
    }

    let payments = state.store.read_all(&lnurlp_id).await.map_err(|e| {
        tracing::error!("Error reading payment file for LNURLP {}: {}", lnurlp_id, e);
        e
    })?;

    tracing::info!("Returning {} payments for LNURLP {}", payments.len(), lnurlp_id);
    Ok(Json(payments))
}
