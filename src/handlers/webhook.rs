use crate::{error::ApiError, handlers::payload::IncomingPayment, handlers::AppState, models::StatusResponse};
use axum::{body::Bytes, extract::State, Json};

/// `POST /webhook`: a payment notification with `amount` in msat.
pub async fn receive_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StatusResponse>, ApiError> {
    let payment = IncomingPayment::parse(&body)?;
    let amount_msat = payment.amount_msat;
    let record = payment.into_record();

    tracing::info!(
        "Received payment for LNURLP {}: {} msat => {} sat, comment: '{}'",
        record.lnurlp_id,
        amount_msat,
        record.amount,
        record.comment
    );

    // Delivery is acknowledged even if the append failed; the store logs it.
    state.store.append(&record).await.ok();

    Ok(Json(StatusResponse::success()))
}
