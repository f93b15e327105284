use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CarId, Persona};

/// Thumbs up or down on a recommended car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Like,
    Dislike,
}

impl FeedbackKind {
    /// Contribution to a car's net feedback count
    pub fn signal(&self) -> i64 {
        match self {
            FeedbackKind::Like => 1,
            FeedbackKind::Dislike => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::Like => "like",
            FeedbackKind::Dislike => "dislike",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(FeedbackKind::Like),
            "dislike" => Some(FeedbackKind::Dislike),
            _ => None,
        }
    }
}

/// Feedback a user left on a recommendation made for a persona
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: String,
    pub car_id: CarId,
    #[serde(rename = "avatar")]
    pub persona: Persona,
    #[serde(rename = "feedback")]
    pub kind: FeedbackKind,
    pub timestamp: DateTime<Utc>,
}

/// Validated feedback that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewFeedback {
    pub user_id: String,
    pub car_id: CarId,
    pub persona: Persona,
    pub kind: FeedbackKind,
}

impl NewFeedback {
    /// Stamps the feedback with a fresh id and the current time
    pub fn into_feedback(self) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            car_id: self.car_id,
            persona: self.persona,
            kind: self.kind,
            timestamp: Utc::now(),
        }
    }
}
