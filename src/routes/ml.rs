use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::AppResult,
    services::{collaborative::TrainingError, trainer::TrainingOutcome},
};

use super::{required_user_id, AppState};

const DEFAULT_RECOMMENDATIONS: usize = 10;

/// Exports the interaction log and retrains the model
pub async fn export_ml_data(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let report = state.trainer.export_and_train().await?;

    let (model_trained, stats) = match report.outcome {
        TrainingOutcome::Trained { stats, .. } => (true, Some(stats)),
        TrainingOutcome::Skipped(_) => (false, None),
    };

    Ok(Json(json!({
        "success": true,
        "message": "ML data exported and model retrained successfully",
        "export": report.export,
        "modelTrained": model_trained,
        "stats": stats,
    })))
}

/// Trains the model on a fresh export
///
/// Missing or insufficient data is reported with `success: false`, not as an
/// HTTP error.
pub async fn train(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let report = state.trainer.export_and_train().await?;

    let body = match report.outcome {
        TrainingOutcome::Trained { stats, .. } => json!({
            "success": true,
            "message": "ML model trained successfully",
            "stats": stats,
        }),
        TrainingOutcome::Skipped(TrainingError::NoData) => json!({
            "success": false,
            "message": "No interaction data available for training. Users need to interact with cars first.",
        }),
        TrainingOutcome::Skipped(TrainingError::InsufficientData { .. }) => json!({
            "success": false,
            "message": "Insufficient data for training. Need at least 2 users and 2 cars with interactions.",
        }),
    };

    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlRecommendationRequest {
    pub user_id: Option<Value>,
    pub n_recommendations: Option<usize>,
}

/// Pure collaborative filtering recommendations for a user
pub async fn recommendations(
    State(state): State<AppState>,
    payload: Result<Json<MlRecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    let user_id = required_user_id(request.user_id.as_ref())?;
    let n = request.n_recommendations.unwrap_or(DEFAULT_RECOMMENDATIONS);

    let body = match state.recommender.collaborative(&user_id, n).await {
        Some(recommendations) => json!({
            "success": true,
            "totalFound": recommendations.len(),
            "recommendations": recommendations,
        }),
        None => json!({
            "success": false,
            "message": "ML model not trained yet. Please train the model first.",
            "recommendations": [],
        }),
    };

    Ok(Json(body))
}

/// Current model state
pub async fn status(State(state): State<AppState>) -> Json<Value> {
    let model = state.trainer.registry().current().await;
    Json(json!({
        "success": true,
        "isTrained": model.is_trained,
        "stats": model.stats(),
    }))
}
