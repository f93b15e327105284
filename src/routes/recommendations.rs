use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    services::recommendations::RecommendationSet,
};

use super::{optional_user_id, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub avatar: Option<String>,
    pub user_id: Option<Value>,
    /// Accepted from the front-end; not used for scoring
    pub preferences: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    #[serde(flatten)]
    pub set: RecommendationSet,
}

/// Handler for the hybrid recommendations endpoint
pub async fn recommend(
    State(state): State<AppState>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(request) = payload?;
    let avatar = request
        .avatar
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Avatar selection is required.".to_string()))?;
    let user_id = optional_user_id(request.user_id.as_ref())?;

    let set = state.recommender.recommend(&avatar, user_id.as_deref()).await;

    Ok(Json(RecommendationResponse { success: true, set }))
}
