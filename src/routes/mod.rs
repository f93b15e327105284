use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::{AppError, AppResult},
    middleware::{make_span_with_request_id, request_id_middleware},
    models::CarId,
};

pub mod catalog;
pub mod export;
pub mod feedback;
pub mod interactions;
pub mod ml;
pub mod recommendations;
pub mod state;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/cars", get(catalog::list_cars))
        .route("/interaction", post(interactions::track))
        .route("/feedback", post(feedback::submit))
        .route("/user/feedback/:user_id", get(feedback::for_user))
        .route("/recommend-cars", post(recommendations::recommend))
        .route("/export-interactions", get(export::interactions))
        .route("/export-feedback", get(export::feedback))
        .route("/export-ml-data", get(ml::export_ml_data))
        .route("/ml/train", post(ml::train))
        .route("/ml/recommendations", post(ml::recommendations))
        .route("/ml/status", get(ml::status))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Returns a non-blank text field or a validation error naming it
pub(crate) fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("{} is required", field)))
}

/// Reads a user id sent as a string or a JSON number
///
/// Missing, null and blank values read as `None`.
pub(crate) fn optional_user_id(value: Option<&Value>) -> AppResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(AppError::InvalidInput(format!(
            "userId must be a string or number, got {}",
            other
        ))),
    }
}

pub(crate) fn required_user_id(value: Option<&Value>) -> AppResult<String> {
    optional_user_id(value)?
        .ok_or_else(|| AppError::InvalidInput("userId is required".to_string()))
}

/// Reads a car id sent either as a JSON number or as a numeric string
pub(crate) fn required_car_id(value: Option<&Value>) -> AppResult<CarId> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::InvalidInput("carId is required".to_string()))?;

    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| CarId::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<CarId>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| AppError::InvalidInput(format!("carId must be a car number, got {}", value)))
}
