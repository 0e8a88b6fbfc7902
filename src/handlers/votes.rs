use crate::{
    error::ApiError,
    handlers::{payload, AppState},
    models::{VoteResponse, VoteTally},
};
use axum::{body::Bytes, extract::State, Json};

/// `POST /vote`: upvotes `feature_id`, which may be a string or a number.
pub async fn vote(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<VoteResponse>, ApiError> {
    let fields = payload::parse_object(&body)?;
    let feature_id = payload::coerce_id(fields.get("feature_id")).ok_or(ApiError::MissingFeatureId)?;

    let upvotes = state.ledger.vote(&feature_id).await.map_err(|e| {
        tracing::error!("Error in voting: {}", e);
        e
    })?;

    Ok(Json(VoteResponse::success(upvotes)))
}

pub async fn get_votes(State(state): State<AppState>) -> Result<Json<VoteTally>, ApiError> {
    let votes = state.ledger.get_all().await?;
    Ok(Json(votes))
}
