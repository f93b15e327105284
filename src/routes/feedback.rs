use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{FeedbackKind, NewFeedback, Persona, UnknownPersona},
};

use super::{required_car_id, required_text, required_user_id, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub user_id: Option<Value>,
    pub car_id: Option<Value>,
    pub avatar: Option<String>,
    pub feedback: Option<String>,
}

impl FeedbackRequest {
    fn validate(self) -> AppResult<NewFeedback> {
        let user_id = required_user_id(self.user_id.as_ref())?;
        let car_id = required_car_id(self.car_id.as_ref())?;
        let persona: Persona = required_text(self.avatar, "avatar")?
            .parse()
            .map_err(|e: UnknownPersona| AppError::InvalidInput(e.to_string()))?;
        let feedback = required_text(self.feedback, "feedback")?;
        let kind = FeedbackKind::parse(&feedback).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "feedback must be 'like' or 'dislike', got '{}'",
                feedback
            ))
        })?;

        Ok(NewFeedback {
            user_id,
            car_id,
            persona,
            kind,
        })
    }
}

/// Records a like or dislike on a recommended car
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<FeedbackRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(request) = payload?;
    let feedback = request.validate()?.into_feedback();
    state.feedback.append_feedback(&feedback).await?;

    tracing::info!(
        user_id = %feedback.user_id,
        car_id = feedback.car_id,
        avatar = %feedback.persona,
        feedback = feedback.kind.as_str(),
        "Feedback recorded"
    );

    Ok(Json(json!({ "success": true })))
}

/// Lists a user's feedback, newest first
pub async fn for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    let feedback = state.feedback.feedback_for_user(&user_id).await?;
    Ok(Json(json!({ "success": true, "feedback": feedback })))
}
