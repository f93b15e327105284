use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{Feedback, Interaction},
};

use super::AppState;

const DEFAULT_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    format: Option<String>,
    limit: Option<usize>,
}

impl ExportQuery {
    fn wants_csv(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("csv"))
    }

    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

/// Most recent interactions as JSON or CSV, newest first
pub async fn interactions(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let interactions = state.interactions.recent_interactions(query.limit()).await?;

    if query.wants_csv() {
        let body = interactions_csv(&interactions)?;
        return Ok(csv_attachment("interactions.csv", body));
    }

    Ok(Json(json!({
        "success": true,
        "count": interactions.len(),
        "interactions": interactions,
    }))
    .into_response())
}

/// Most recent feedback as JSON or CSV, newest first
pub async fn feedback(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let feedback = state.feedback.recent_feedback(query.limit()).await?;

    if query.wants_csv() {
        let body = feedback_csv(&feedback)?;
        return Ok(csv_attachment("feedback.csv", body));
    }

    Ok(Json(json!({
        "success": true,
        "count": feedback.len(),
        "feedback": feedback,
    }))
    .into_response())
}

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> AppResult<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("Failed to flush CSV: {}", e)))
}

fn interactions_csv(interactions: &[Interaction]) -> AppResult<Vec<u8>> {
    let mut writer = csv_writer();
    writer.write_record(["userId", "carId", "type", "timestamp", "details"])?;
    for interaction in interactions {
        writer.write_record([
            interaction.user_id.clone(),
            interaction.car_id.to_string(),
            interaction.kind.to_string(),
            interaction.timestamp.to_rfc3339(),
            serde_json::to_string(&interaction.details)?,
        ])?;
    }
    finish(writer)
}

fn feedback_csv(feedback: &[Feedback]) -> AppResult<Vec<u8>> {
    let mut writer = csv_writer();
    writer.write_record(["userId", "carId", "avatar", "feedback", "timestamp"])?;
    for record in feedback {
        writer.write_record([
            record.user_id.clone(),
            record.car_id.to_string(),
            record.persona.to_string(),
            record.kind.as_str().to_string(),
            record.timestamp.to_rfc3339(),
        ])?;
    }
    finish(writer)
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewInteraction;

    #[test]
    fn test_interactions_csv_quotes_every_field() {
        let mut interaction = NewInteraction::new("u1", 2, "view");
        interaction.details = json!({"source": "home"});
        let body = interactions_csv(&[interaction.into_interaction()]).unwrap();
        let text = String::from_utf8(body).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("\"userId\",\"carId\",\"type\",\"timestamp\",\"details\"")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("\"u1\",\"2\",\"view\","));
        assert!(row.ends_with("\"{\"\"source\"\":\"\"home\"\"}\""));
    }

    #[test]
    fn test_query_defaults() {
        let query = ExportQuery {
            format: None,
            limit: None,
        };
        assert!(!query.wants_csv());
        assert_eq!(query.limit(), DEFAULT_LIMIT);

        let csv = ExportQuery {
            format: Some("CSV".to_string()),
            limit: Some(5),
        };
        assert!(csv.wants_csv());
        assert_eq!(csv.limit(), 5);
    }
}
