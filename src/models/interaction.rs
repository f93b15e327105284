use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CarId;

/// What a user did with a car
///
/// Unrecognized kinds are kept verbatim so the log never loses information;
/// they carry the lowest rating weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InteractionKind {
    Like,
    Dislike,
    View,
    WatchlistAdd,
    WatchlistRemove,
    DealView,
    Other(String),
}

impl InteractionKind {
    /// Kinds with a dedicated rating weight
    pub const KNOWN: [InteractionKind; 6] = [
        InteractionKind::Like,
        InteractionKind::Dislike,
        InteractionKind::WatchlistAdd,
        InteractionKind::WatchlistRemove,
        InteractionKind::DealView,
        InteractionKind::View,
    ];

    /// Rating weight in [1, 5] used when reducing interactions to a rating
    pub fn rating(&self) -> f64 {
        match self {
            InteractionKind::Like => 5.0,
            InteractionKind::Dislike => 1.0,
            InteractionKind::View => 2.0,
            InteractionKind::WatchlistAdd => 4.0,
            InteractionKind::WatchlistRemove => 2.0,
            InteractionKind::DealView => 3.0,
            InteractionKind::Other(_) => 1.0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            InteractionKind::Like => "like",
            InteractionKind::Dislike => "dislike",
            InteractionKind::View => "view",
            InteractionKind::WatchlistAdd => "watchlist_add",
            InteractionKind::WatchlistRemove => "watchlist_remove",
            InteractionKind::DealView => "deal_view",
            InteractionKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for InteractionKind {
    fn from(kind: &str) -> Self {
        match kind {
            "like" => InteractionKind::Like,
            "dislike" => InteractionKind::Dislike,
            "view" => InteractionKind::View,
            "watchlist_add" => InteractionKind::WatchlistAdd,
            "watchlist_remove" => InteractionKind::WatchlistRemove,
            "deal_view" => InteractionKind::DealView,
            other => InteractionKind::Other(other.to_string()),
        }
    }
}

impl From<String> for InteractionKind {
    fn from(kind: String) -> Self {
        InteractionKind::from(kind.as_str())
    }
}

impl From<InteractionKind> for String {
    fn from(kind: InteractionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single logged user/car event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: String,
    pub car_id: CarId,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    /// Free-form client context (source page, etc.)
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// A validated interaction that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewInteraction {
    pub user_id: String,
    pub car_id: CarId,
    pub kind: InteractionKind,
    pub details: serde_json::Value,
}

impl NewInteraction {
    pub fn new(user_id: impl Into<String>, car_id: CarId, kind: impl Into<InteractionKind>) -> Self {
        Self {
            user_id: user_id.into(),
            car_id,
            kind: kind.into(),
            details: serde_json::Value::Object(Default::default()),
        }
    }

    /// Stamps the interaction with a fresh id and the current time
    pub fn into_interaction(self) -> Interaction {
        Interaction {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            car_id: self.car_id,
            kind: self.kind,
            details: self.details,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_weights() {
        assert_eq!(InteractionKind::Like.rating(), 5.0);
        assert_eq!(InteractionKind::Dislike.rating(), 1.0);
        assert_eq!(InteractionKind::View.rating(), 2.0);
        assert_eq!(InteractionKind::WatchlistAdd.rating(), 4.0);
        assert_eq!(InteractionKind::WatchlistRemove.rating(), 2.0);
        assert_eq!(InteractionKind::DealView.rating(), 3.0);
    }

    #[test]
    fn test_unrecognized_kind_defaults_to_lowest_weight() {
        let kind = InteractionKind::from("skip");
        assert_eq!(kind, InteractionKind::Other("skip".to_string()));
        assert_eq!(kind.rating(), 1.0);
        assert_eq!(kind.as_str(), "skip");
    }

    #[test]
    fn test_known_kinds_round_trip_through_strings() {
        for kind in InteractionKind::KNOWN {
            assert_eq!(InteractionKind::from(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_kind_serializes_as_plain_string() {
        let json = serde_json::to_string(&InteractionKind::WatchlistAdd).unwrap();
        assert_eq!(json, "\"watchlist_add\"");
        let kind: InteractionKind = serde_json::from_str("\"deal_view\"").unwrap();
        assert_eq!(kind, InteractionKind::DealView);
    }

    #[test]
    fn test_into_interaction_keeps_fields() {
        let interaction = NewInteraction::new("user1", 7, "like").into_interaction();
        assert_eq!(interaction.user_id, "user1");
        assert_eq!(interaction.car_id, 7);
        assert_eq!(interaction.kind, InteractionKind::Like);
        assert!(interaction.details.is_object());
    }
}
