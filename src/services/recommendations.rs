use std::sync::Arc;

use serde::Serialize;

use crate::{
    db::FeedbackStore,
    models::{Car, CarId, Persona},
};

use super::{
    avatar::{AvatarScorer, FeedbackTally},
    catalog::Catalog,
    hybrid::{self, Recommendation, SOURCE_LIMIT},
    registry::ModelRegistry,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMetadata {
    pub total_cars: usize,
    pub ml_recommendations: usize,
    pub avatar_recommendations: usize,
    pub hybrid_mode: bool,
    pub model_trained: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    pub metadata: RecommendationMetadata,
}

/// A collaborative prediction decorated with its catalog entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCar {
    pub car_id: CarId,
    pub score: f64,
    pub method: &'static str,
    pub car: Option<Car>,
}

/// Produces hybrid and pure collaborative recommendations
#[derive(Clone)]
pub struct Recommender {
    registry: ModelRegistry,
    feedback: Arc<dyn FeedbackStore>,
    catalog: Arc<Catalog>,
}

impl Recommender {
    pub fn new(registry: ModelRegistry, feedback: Arc<dyn FeedbackStore>, catalog: Arc<Catalog>) -> Self {
        Self {
            registry,
            feedback,
            catalog,
        }
    }

    /// Recommends cars for a shopper browsing as `avatar`
    ///
    /// Collaborative predictions are only consulted for a known user once a
    /// model is trained. An avatar that names no persona contributes no
    /// avatar scores. Never fails; a feedback store outage only drops the
    /// feedback adjustment.
    pub async fn recommend(&self, avatar: &str, user_id: Option<&str>) -> RecommendationSet {
        let model = self.registry.current().await;
        let persona: Option<Persona> = avatar.parse().ok();

        let predictions = match user_id {
            Some(user_id) if model.is_trained => model.predict(user_id, SOURCE_LIMIT),
            _ => Vec::new(),
        };

        let avatar_scores = match persona {
            Some(persona) => {
                let tally = match user_id {
                    Some(_) => self.feedback_tally(persona).await,
                    None => FeedbackTally::default(),
                };
                AvatarScorer.score(persona, &self.catalog, &tally)
            }
            None => {
                tracing::info!(avatar = %avatar, "Unknown avatar, skipping avatar scoring");
                Vec::new()
            }
        };

        let result = hybrid::combine(&predictions, &avatar_scores, &self.catalog, avatar, persona);

        tracing::info!(
            avatar = %avatar,
            user_id = user_id.unwrap_or("-"),
            ml = result.ml_count,
            avatar_count = result.avatar_count,
            total = result.recommendations.len(),
            "Generated car recommendations"
        );

        let metadata = RecommendationMetadata {
            total_cars: result.recommendations.len(),
            ml_recommendations: result.ml_count,
            avatar_recommendations: result.avatar_count,
            hybrid_mode: result.hybrid_mode(),
            model_trained: model.is_trained,
        };

        RecommendationSet {
            recommendations: result.recommendations,
            metadata,
        }
    }

    /// Pure collaborative predictions, or `None` while no model is trained
    pub async fn collaborative(&self, user_id: &str, n: usize) -> Option<Vec<ScoredCar>> {
        let model = self.registry.current().await;
        if !model.is_trained {
            return None;
        }

        Some(
            model
                .predict(user_id, n)
                .into_iter()
                .map(|prediction| ScoredCar {
                    car_id: prediction.car_id,
                    score: prediction.score,
                    method: prediction.method,
                    car: self.catalog.get(prediction.car_id).cloned(),
                })
                .collect(),
        )
    }

    async fn feedback_tally(&self, persona: Persona) -> FeedbackTally {
        match self.feedback.feedback_for_persona(persona).await {
            Ok(feedback) => FeedbackTally::for_persona(persona, &feedback),
            Err(e) => {
                tracing::warn!(error = %e, persona = %persona, "Feedback unavailable, scoring without it");
                FeedbackTally::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryStore, MockFeedbackStore},
        error::AppError,
        models::{FeedbackKind, NewFeedback},
        services::{
            collaborative::{RatingMatrix, TrainedModel},
            hybrid::{RecommendationMethod, RESULT_LIMIT},
        },
    };

    fn scenario_a() -> TrainedModel {
        let mut ratings = RatingMatrix::new();
        ratings.record("u1", 1, 5.0);
        ratings.record("u2", 1, 5.0);
        ratings.record("u1", 2, 5.0);
        ratings.record("u2", 3, 5.0);
        TrainedModel::train(ratings).unwrap()
    }

    fn recommender(model: TrainedModel, feedback: Arc<dyn FeedbackStore>) -> Recommender {
        Recommender::new(ModelRegistry::new(model), feedback, Arc::new(Catalog::builtin()))
    }

    #[tokio::test]
    async fn test_budget_without_user_is_avatar_only() {
        let recommender = recommender(TrainedModel::untrained(), Arc::new(MemoryStore::new()));
        let set = recommender.recommend("budget", None).await;

        assert_eq!(set.recommendations.len(), RESULT_LIMIT);
        assert!(!set.metadata.hybrid_mode);
        assert_eq!(set.metadata.ml_recommendations, 0);
        assert!(!set.metadata.model_trained);

        for window in set.recommendations.windows(2) {
            assert!(window[0].score >= window[1].score);
            if window[0].score == window[1].score {
                assert!(window[0].car.price <= window[1].car.price);
            }
        }
        for recommendation in &set.recommendations {
            assert_eq!(recommendation.car.persona, Persona::Budget);
            assert_eq!(recommendation.recommendation_method, RecommendationMethod::Avatar);
        }
    }

    #[tokio::test]
    async fn test_known_user_gets_hybrid_list() {
        let recommender = recommender(scenario_a(), Arc::new(MemoryStore::new()));
        let set = recommender.recommend("eco", Some("u1")).await;

        assert!(set.metadata.hybrid_mode);
        assert_eq!(set.metadata.ml_recommendations, 1);
        assert!(set.metadata.model_trained);

        // 0.7 * 5.0 for car 3 beats any avatar-only score
        assert_eq!(set.recommendations[0].car.id, 3);
        assert_eq!(set.recommendations[0].ml_score, Some(5.0));
        assert_eq!(set.recommendations[0].confidence, 1.0);
    }

    #[tokio::test]
    async fn test_unknown_avatar_still_uses_collaborative_filtering() {
        let recommender = recommender(scenario_a(), Arc::new(MemoryStore::new()));

        let set = recommender.recommend("sporty", Some("u1")).await;
        assert_eq!(set.metadata.avatar_recommendations, 0);
        assert_eq!(set.recommendations.len(), 1);
        assert_eq!(
            set.recommendations[0].reason,
            "Recommended based on sporty preferences and user feedback"
        );

        let anonymous = recommender.recommend("sporty", None).await;
        assert!(anonymous.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_feedback_only_read_for_identified_users() {
        let store = MemoryStore::new();
        // Enough dislikes to push car 3 below every other eco car
        for _ in 0..5 {
            let feedback = NewFeedback {
                user_id: "someone".to_string(),
                car_id: 3,
                persona: Persona::Eco,
                kind: FeedbackKind::Dislike,
            }
            .into_feedback();
            store.append_feedback(&feedback).await.unwrap();
        }
        let recommender = recommender(TrainedModel::untrained(), Arc::new(store));

        let anonymous = recommender.recommend("eco", None).await;
        let identified = recommender.recommend("eco", Some("shopper")).await;

        assert!(anonymous.recommendations.iter().any(|r| r.car.id == 3));
        assert!(!identified.recommendations.iter().any(|r| r.car.id == 3));
    }

    #[tokio::test]
    async fn test_feedback_outage_falls_back_to_content_score() {
        let mut feedback = MockFeedbackStore::new();
        feedback
            .expect_feedback_for_persona()
            .returning(|_| Err(AppError::Internal("store offline".to_string())));
        let recommender = recommender(TrainedModel::untrained(), Arc::new(feedback));

        let set = recommender.recommend("luxury", Some("u9")).await;
        assert_eq!(set.recommendations.len(), RESULT_LIMIT);
        assert!((set.recommendations[0].score - 0.6).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_collaborative_requires_trained_model() {
        let untrained = recommender(TrainedModel::untrained(), Arc::new(MemoryStore::new()));
        assert!(untrained.collaborative("u1", 10).await.is_none());

        let trained = recommender(scenario_a(), Arc::new(MemoryStore::new()));
        let cars = trained.collaborative("u1", 10).await.unwrap();
        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].car_id, 3);
        assert_eq!(cars[0].car.as_ref().map(|c| c.id), Some(3));
    }
}
