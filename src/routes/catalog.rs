use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::AppState;

/// Lists the full car catalog
pub async fn list_cars(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "success": true, "cars": state.catalog.cars() }))
}
