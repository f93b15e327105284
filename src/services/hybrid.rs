use std::{cmp::Ordering, collections::HashMap};

use serde::Serialize;

use crate::models::{Car, CarId, Persona};

use super::{avatar::AvatarScore, catalog::Catalog, collaborative::Prediction};

/// Candidates taken from each source before blending
pub const SOURCE_LIMIT: usize = 15;
/// Final list length
pub const RESULT_LIMIT: usize = 10;

const ML_WEIGHT: f64 = 0.7;
const AVATAR_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMethod {
    Ml,
    Avatar,
    Hybrid,
}

/// A catalog car with the scores that put it on the list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub car: Car,
    pub rank: usize,
    pub score: f64,
    pub ml_score: Option<f64>,
    pub avatar_score: Option<f64>,
    pub ml_rank: Option<usize>,
    pub avatar_rank: Option<usize>,
    pub recommendation_method: RecommendationMethod,
    pub reason: String,
    pub confidence: f64,
}

/// Output of a blend, along with how many candidates each source offered
#[derive(Debug, Clone, PartialEq)]
pub struct HybridResult {
    pub recommendations: Vec<Recommendation>,
    pub ml_count: usize,
    pub avatar_count: usize,
}

impl HybridResult {
    pub fn hybrid_mode(&self) -> bool {
        self.ml_count > 0 && self.avatar_count > 0
    }
}

struct Candidate<'a> {
    car: &'a Car,
    score: f64,
    ml_score: Option<f64>,
    avatar_score: Option<f64>,
    ml_rank: Option<usize>,
    avatar_rank: Option<usize>,
}

impl Candidate<'_> {
    fn method(&self) -> RecommendationMethod {
        match (self.ml_score, self.avatar_score) {
            (Some(_), Some(_)) => RecommendationMethod::Hybrid,
            (Some(_), None) => RecommendationMethod::Ml,
            _ => RecommendationMethod::Avatar,
        }
    }

    fn confidence(&self) -> f64 {
        match self.ml_score {
            Some(ml) => (ml / 5.0).min(1.0),
            None => self.avatar_score.unwrap_or(0.0),
        }
    }
}

/// Blends collaborative predictions with avatar scores
///
/// `avatar` is the persona text as the caller sent it; `persona` is its
/// parsed form, if it named a known persona.
pub fn combine(
    predictions: &[Prediction],
    avatar_scores: &[AvatarScore],
    catalog: &Catalog,
    avatar: &str,
    persona: Option<Persona>,
) -> HybridResult {
    let ml: Vec<Candidate> = predictions
        .iter()
        .filter_map(|p| catalog.get(p.car_id).map(|car| (car, p.score)))
        .take(SOURCE_LIMIT)
        .enumerate()
        .map(|(i, (car, score))| Candidate {
            car,
            score,
            ml_score: Some(score),
            avatar_score: None,
            ml_rank: Some(i + 1),
            avatar_rank: None,
        })
        .collect();

    let avatar_candidates: Vec<Candidate> = avatar_scores
        .iter()
        .filter_map(|s| catalog.get(s.car_id).map(|car| (car, s.score)))
        .take(SOURCE_LIMIT)
        .enumerate()
        .map(|(i, (car, score))| Candidate {
            car,
            score,
            ml_score: None,
            avatar_score: Some(score),
            ml_rank: None,
            avatar_rank: Some(i + 1),
        })
        .collect();

    let ml_count = ml.len();
    let avatar_count = avatar_candidates.len();

    let mut selected = match (ml.is_empty(), avatar_candidates.is_empty()) {
        (false, false) => blend(ml, avatar_candidates),
        (false, true) => ml,
        _ => avatar_candidates,
    };
    selected.truncate(RESULT_LIMIT);

    tracing::debug!(
        ml = ml_count,
        avatar = avatar_count,
        selected = selected.len(),
        "Combined recommendation sources"
    );

    let recommendations = selected
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| Recommendation {
            car: candidate.car.clone(),
            rank: i + 1,
            score: candidate.score,
            ml_score: candidate.ml_score,
            avatar_score: candidate.avatar_score,
            ml_rank: candidate.ml_rank,
            avatar_rank: candidate.avatar_rank,
            recommendation_method: candidate.method(),
            reason: reason(candidate.car, persona, avatar),
            confidence: candidate.confidence(),
        })
        .collect();

    HybridResult {
        recommendations,
        ml_count,
        avatar_count,
    }
}

/// Weighted union keyed by car id, collaborative entries first
fn blend<'a>(ml: Vec<Candidate<'a>>, avatar: Vec<Candidate<'a>>) -> Vec<Candidate<'a>> {
    let mut union: Vec<Candidate<'a>> = Vec::with_capacity(ml.len() + avatar.len());
    let mut positions: HashMap<CarId, usize> = HashMap::new();

    for mut candidate in ml {
        candidate.score *= ML_WEIGHT;
        positions.insert(candidate.car.id, union.len());
        union.push(candidate);
    }

    for mut candidate in avatar {
        let weighted = candidate.score * AVATAR_WEIGHT;
        match positions.get(&candidate.car.id) {
            Some(&position) => {
                let existing = &mut union[position];
                existing.score += weighted;
                existing.avatar_score = candidate.avatar_score;
                existing.avatar_rank = candidate.avatar_rank;
            }
            None => {
                candidate.score = weighted;
                positions.insert(candidate.car.id, union.len());
                union.push(candidate);
            }
        }
    }

    union.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    union
}

/// Picks the first matching justification for showing `car` to the shopper
pub fn reason(car: &Car, persona: Option<Persona>, avatar: &str) -> String {
    let text = match persona {
        Some(Persona::Eco) if car.has_feature("electric") => {
            Some("Perfect for eco-conscious drivers with zero emissions")
        }
        Some(Persona::Eco) if car.has_feature("hybrid") => {
            Some("Great fuel efficiency with hybrid technology")
        }
        Some(Persona::Eco) if car.mpg > 50 => Some("Excellent fuel economy for environmental impact"),
        Some(Persona::Luxury) if car.has_feature("premium") => {
            Some("Premium features and sophisticated design")
        }
        Some(Persona::Luxury) if car.price > 50_000 => Some("Luxury positioning with premium pricing"),
        Some(Persona::Budget) if car.has_feature("affordable") => {
            Some("Great value for budget-conscious buyers")
        }
        Some(Persona::Budget) if car.has_feature("reliable") => {
            Some("Proven reliability for long-term ownership")
        }
        _ => None,
    };

    match text {
        Some(text) => text.to_string(),
        None => format!("Recommended based on {} preferences and user feedback", avatar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{
        avatar::{AvatarScorer, FeedbackTally},
        collaborative::METHOD,
    };

    fn prediction(car_id: CarId, score: f64) -> Prediction {
        Prediction {
            car_id,
            score,
            method: METHOD,
        }
    }

    fn car(id: CarId, persona: Persona, price: u32, mpg: u16, features: &[&str]) -> Car {
        Car {
            id,
            name: format!("Car {}", id),
            persona,
            category: "sedan".to_string(),
            price,
            year: 2024,
            mpg,
            features: features.iter().map(|f| f.to_string()).collect(),
            brand: "Test".to_string(),
            made_in: "USA".to_string(),
        }
    }

    #[test]
    fn test_avatar_only_equals_avatar_top_ten() {
        let catalog = Catalog::builtin();
        let scores = AvatarScorer.score(Persona::Budget, &catalog, &FeedbackTally::default());

        let result = combine(&[], &scores, &catalog, "budget", Some(Persona::Budget));

        assert!(!result.hybrid_mode());
        assert_eq!(result.ml_count, 0);
        assert_eq!(result.avatar_count, SOURCE_LIMIT);
        let ids: Vec<CarId> = result.recommendations.iter().map(|r| r.car.id).collect();
        let expected: Vec<CarId> = scores.iter().take(RESULT_LIMIT).map(|s| s.car_id).collect();
        assert_eq!(ids, expected);
        for (i, recommendation) in result.recommendations.iter().enumerate() {
            assert_eq!(recommendation.rank, i + 1);
            assert_eq!(recommendation.recommendation_method, RecommendationMethod::Avatar);
            assert_eq!(Some(recommendation.score), recommendation.avatar_score);
            assert_eq!(Some(recommendation.confidence), recommendation.avatar_score);
        }
    }

    #[test]
    fn test_ml_only_keeps_prediction_order() {
        let catalog = Catalog::builtin();
        let predictions = vec![prediction(5, 4.5), prediction(9, 3.0)];

        let result = combine(&predictions, &[], &catalog, "unknown", None);

        assert_eq!(result.recommendations.len(), 2);
        assert_eq!(result.recommendations[0].car.id, 5);
        assert_eq!(result.recommendations[0].score, 4.5);
        assert_eq!(result.recommendations[0].confidence, 0.9);
        assert_eq!(result.recommendations[0].recommendation_method, RecommendationMethod::Ml);
        assert_eq!(
            result.recommendations[0].reason,
            "Recommended based on unknown preferences and user feedback"
        );
    }

    #[test]
    fn test_nothing_from_either_source_is_empty() {
        let result = combine(&[], &[], &Catalog::builtin(), "eco", Some(Persona::Eco));
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_blend_sums_weighted_scores_for_shared_cars() {
        let catalog = Catalog::builtin();
        let predictions = vec![prediction(1, 5.0), prediction(2, 1.0)];
        let avatar = vec![
            AvatarScore { car_id: 2, score: 0.6 },
            AvatarScore { car_id: 3, score: 0.5 },
        ];

        let result = combine(&predictions, &avatar, &catalog, "eco", Some(Persona::Eco));
        assert!(result.hybrid_mode());

        let by_id: HashMap<CarId, &Recommendation> =
            result.recommendations.iter().map(|r| (r.car.id, r)).collect();

        assert!((by_id[&1].score - 3.5).abs() < 1e-12);
        assert!((by_id[&2].score - (0.7 + 0.18)).abs() < 1e-12);
        assert!((by_id[&3].score - 0.15).abs() < 1e-12);

        assert_eq!(by_id[&2].recommendation_method, RecommendationMethod::Hybrid);
        assert_eq!(by_id[&2].ml_rank, Some(2));
        assert_eq!(by_id[&2].avatar_rank, Some(1));
        assert_eq!(by_id[&3].recommendation_method, RecommendationMethod::Avatar);

        let order: Vec<CarId> = result.recommendations.iter().map(|r| r.car.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_result_is_capped() {
        let catalog = Catalog::builtin();
        let predictions: Vec<Prediction> = (1..=20).map(|id| prediction(id, 4.0)).collect();
        let scores = AvatarScorer.score(Persona::Eco, &catalog, &FeedbackTally::default());

        let result = combine(&predictions, &scores, &catalog, "eco", Some(Persona::Eco));
        assert_eq!(result.ml_count, SOURCE_LIMIT);
        assert_eq!(result.recommendations.len(), RESULT_LIMIT);
    }

    #[test]
    fn test_predictions_for_unknown_cars_are_dropped() {
        let catalog = Catalog::builtin();
        let result = combine(&[prediction(9999, 5.0)], &[], &catalog, "eco", Some(Persona::Eco));
        assert_eq!(result.ml_count, 0);
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_reason_rules_in_order() {
        let eco_electric = car(1, Persona::Eco, 30_000, 120, &["electric", "hybrid"]);
        assert_eq!(
            reason(&eco_electric, Some(Persona::Eco), "eco"),
            "Perfect for eco-conscious drivers with zero emissions"
        );

        let eco_hybrid = car(2, Persona::Eco, 30_000, 52, &["hybrid"]);
        assert_eq!(
            reason(&eco_hybrid, Some(Persona::Eco), "eco"),
            "Great fuel efficiency with hybrid technology"
        );

        let frugal = car(3, Persona::Eco, 30_000, 55, &[]);
        assert_eq!(
            reason(&frugal, Some(Persona::Eco), "eco"),
            "Excellent fuel economy for environmental impact"
        );

        let expensive = car(4, Persona::Luxury, 80_000, 20, &[]);
        assert_eq!(
            reason(&expensive, Some(Persona::Luxury), "luxury"),
            "Luxury positioning with premium pricing"
        );

        let premium = car(5, Persona::Luxury, 80_000, 20, &["premium"]);
        assert_eq!(
            reason(&premium, Some(Persona::Luxury), "luxury"),
            "Premium features and sophisticated design"
        );

        let cheap = car(6, Persona::Budget, 18_000, 35, &["reliable", "affordable"]);
        assert_eq!(
            reason(&cheap, Some(Persona::Budget), "budget"),
            "Great value for budget-conscious buyers"
        );

        let reliable = car(7, Persona::Budget, 18_000, 35, &["reliable"]);
        assert_eq!(
            reason(&reliable, Some(Persona::Budget), "budget"),
            "Proven reliability for long-term ownership"
        );

        // Rules only fire for the matching persona
        assert_eq!(
            reason(&eco_electric, Some(Persona::Budget), "budget"),
            "Recommended based on budget preferences and user feedback"
        );
    }
}
