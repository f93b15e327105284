use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{error::AppResult, models::NewInteraction};

use super::{required_car_id, required_text, required_user_id, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub user_id: Option<Value>,
    pub car_id: Option<Value>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub details: Option<Value>,
}

impl InteractionRequest {
    fn validate(self) -> AppResult<NewInteraction> {
        let user_id = required_user_id(self.user_id.as_ref())?;
        let car_id = required_car_id(self.car_id.as_ref())?;
        let kind = required_text(self.kind, "type")?;

        let mut interaction = NewInteraction::new(user_id, car_id, kind);
        if let Some(details) = self.details.filter(|d| !d.is_null()) {
            interaction.details = details;
        }
        Ok(interaction)
    }
}

/// Logs a user/car interaction and queues a background retrain
pub async fn track(
    State(state): State<AppState>,
    payload: Result<Json<InteractionRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    let interaction = request.validate()?.into_interaction();
    state.interactions.append_interaction(&interaction).await?;

    tracing::info!(
        user_id = %interaction.user_id,
        car_id = interaction.car_id,
        kind = %interaction.kind,
        "Interaction tracked"
    );

    state.retrain.request();

    Ok(Json(json!({
        "success": true,
        "interactionId": interaction.id,
    })))
}
