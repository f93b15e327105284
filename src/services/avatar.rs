use std::{cmp::Ordering, collections::BTreeMap};

use serde::Serialize;

use crate::models::{CarId, Feedback, Persona};

use super::{catalog::Catalog, similarity::dense_cosine};

const CONTENT_WEIGHT: f64 = 0.6;
const FEEDBACK_WEIGHT: f64 = 0.4;
/// Net feedback count that maps to a full unit of adjustment
const FEEDBACK_SCALE: f64 = 5.0;

/// Net likes minus dislikes per car, for a single persona
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedbackTally(BTreeMap<CarId, i64>);

impl FeedbackTally {
    /// Tallies the feedback left for `persona`, ignoring everything else
    pub fn for_persona<'a>(persona: Persona, feedback: impl IntoIterator<Item = &'a Feedback>) -> Self {
        let mut tally = BTreeMap::new();
        for record in feedback.into_iter().filter(|f| f.persona == persona) {
            *tally.entry(record.car_id).or_insert(0) += record.kind.signal();
        }
        Self(tally)
    }

    pub fn net(&self, car_id: CarId) -> i64 {
        self.0.get(&car_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarScore {
    pub car_id: CarId,
    pub score: f64,
}

/// Content-based scorer ranking the catalog against a persona profile
#[derive(Debug, Clone, Copy, Default)]
pub struct AvatarScorer;

impl AvatarScorer {
    /// Scores every catalog car for `persona`, best first
    ///
    /// `0.6 * cosine(profile, car type) + 0.4 * net feedback / 5`. Equal
    /// scores put cheaper cars first for budget shoppers and pricier cars
    /// first otherwise.
    pub fn score(&self, persona: Persona, catalog: &Catalog, feedback: &FeedbackTally) -> Vec<AvatarScore> {
        let profile = persona.profile();

        let mut scored: Vec<(AvatarScore, u32)> = catalog
            .cars()
            .iter()
            .map(|car| {
                let content = dense_cosine(&profile, &car.persona.car_features());
                let adjustment = feedback.net(car.id) as f64 / FEEDBACK_SCALE;
                let score = CONTENT_WEIGHT * content + FEEDBACK_WEIGHT * adjustment;
                (AvatarScore { car_id: car.id, score }, car.price)
            })
            .collect();

        scored.sort_by(|(a, price_a), (b, price_b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| {
                    if persona.prefers_lower_price() {
                        price_a.cmp(price_b)
                    } else {
                        price_b.cmp(price_a)
                    }
                })
        });

        scored.into_iter().map(|(score, _)| score).collect()
    }
}
