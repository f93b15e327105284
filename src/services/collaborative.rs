use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::CarId;

use super::similarity::sparse_cosine;

/// Minimum number of distinct users needed to train
pub const MIN_TRAINING_USERS: usize = 2;
/// Minimum number of distinct rated cars needed to train
pub const MIN_TRAINING_CARS: usize = 2;
/// Upper bound on neighbours consulted per prediction
pub const MAX_NEIGHBOURS: usize = 10;
/// Method label attached to every prediction
pub const METHOD: &str = "collaborative_filtering";

/// Derived user → car → rating table
///
/// Backed by ordered maps so iteration order, and therefore everything
/// computed from it, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatingMatrix(BTreeMap<String, BTreeMap<CarId, f64>>);

impl RatingMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a rating, keeping the highest value seen for the pair
    pub fn record(&mut self, user_id: &str, car_id: CarId, rating: f64) {
        let entry = self
            .0
            .entry(user_id.to_string())
            .or_default()
            .entry(car_id)
            .or_insert(rating);
        if rating > *entry {
            *entry = rating;
        }
    }

    pub fn rating(&self, user_id: &str, car_id: CarId) -> Option<f64> {
        self.0.get(user_id).and_then(|ratings| ratings.get(&car_id)).copied()
    }

    pub fn user_ratings(&self, user_id: &str) -> Option<&BTreeMap<CarId, f64>> {
        self.0.get(user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn user_count(&self) -> usize {
        self.0.len()
    }

    /// Every car rated by at least one user
    pub fn cars(&self) -> BTreeSet<CarId> {
        self.0.values().flat_map(|ratings| ratings.keys().copied()).collect()
    }

    pub fn total_ratings(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_ratings() == 0
    }

    /// Iterates `(user, car, rating)` triples in user then car order
    pub fn iter(&self) -> impl Iterator<Item = (&str, CarId, f64)> {
        self.0.iter().flat_map(|(user, ratings)| {
            ratings
                .iter()
                .map(move |(car, rating)| (user.as_str(), *car, *rating))
        })
    }

    /// The item-major view: car → user → rating
    fn by_car(&self) -> BTreeMap<CarId, BTreeMap<String, f64>> {
        let mut columns: BTreeMap<CarId, BTreeMap<String, f64>> = BTreeMap::new();
        for (user, car, rating) in self.iter() {
            columns
                .entry(car)
                .or_default()
                .insert(user.to_string(), rating);
        }
        columns
    }
}

/// Square, symmetric table of cosine similarities with a unit diagonal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimilarityTable<K: Ord>(BTreeMap<K, BTreeMap<K, f64>>);

impl<K: Ord> Default for SimilarityTable<K> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: Ord + Clone> SimilarityTable<K> {
    /// Computes all-pairs similarity between the given sparse vectors
    ///
    /// Each unordered pair is computed once and mirrored, so the table is
    /// exactly symmetric.
    fn compute<V: Ord>(vectors: &BTreeMap<K, BTreeMap<V, f64>>) -> Self {
        let mut table: BTreeMap<K, BTreeMap<K, f64>> = BTreeMap::new();

        for (i, (a, vector_a)) in vectors.iter().enumerate() {
            table.entry(a.clone()).or_default().insert(a.clone(), 1.0);

            for (b, vector_b) in vectors.iter().skip(i + 1) {
                let similarity = sparse_cosine(vector_a, vector_b);
                table
                    .entry(a.clone())
                    .or_default()
                    .insert(b.clone(), similarity);
                table
                    .entry(b.clone())
                    .or_default()
                    .insert(a.clone(), similarity);
            }
        }

        Self(table)
    }

    pub fn get(&self, a: &K, b: &K) -> Option<f64> {
        self.0.get(a).and_then(|row| row.get(b)).copied()
    }

    pub fn row(&self, key: &K) -> Option<&BTreeMap<K, f64>> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrainingError {
    #[error("No interaction data available for training")]
    NoData,

    #[error(
        "Insufficient data for training: need at least {MIN_TRAINING_USERS} users and \
         {MIN_TRAINING_CARS} cars, found {users} users and {cars} cars"
    )]
    InsufficientData { users: usize, cars: usize },
}

/// A single predicted rating
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub car_id: CarId,
    pub score: f64,
    pub method: &'static str,
}

/// Summary figures for a model snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub total_users: usize,
    pub total_cars: usize,
    pub total_interactions: usize,
    pub is_trained: bool,
    pub average_interactions_per_user: f64,
}

/// Immutable snapshot of the collaborative filtering state
///
/// A training run always produces a whole new snapshot; nothing mutates one
/// after it is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainedModel {
    #[serde(rename = "userCarMatrix")]
    pub ratings: RatingMatrix,
    pub user_similarities: SimilarityTable<String>,
    pub car_similarities: SimilarityTable<CarId>,
    pub is_trained: bool,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

impl TrainedModel {
    /// An empty, untrained model
    pub fn untrained() -> Self {
        Self::default()
    }

    /// Trains user-user and car-car similarity tables from a rating matrix
    ///
    /// An empty matrix is reported as [`TrainingError::NoData`]; fewer than
    /// two users or two cars as [`TrainingError::InsufficientData`].
    pub fn train(ratings: RatingMatrix) -> Result<Self, TrainingError> {
        if ratings.is_empty() {
            return Err(TrainingError::NoData);
        }

        let users = ratings.user_count();
        let cars = ratings.cars().len();
        if users < MIN_TRAINING_USERS || cars < MIN_TRAINING_CARS {
            tracing::info!(users, cars, "Insufficient data for training");
            return Err(TrainingError::InsufficientData { users, cars });
        }

        let user_similarities = SimilarityTable::compute(&ratings.0);
        let car_similarities = SimilarityTable::compute(&ratings.by_car());

        tracing::info!(users, cars, "Collaborative filtering model trained");

        Ok(Self {
            ratings,
            user_similarities,
            car_similarities,
            is_trained: true,
            trained_at: Some(Utc::now()),
        })
    }

    /// Predicts ratings for cars the user has not rated yet
    ///
    /// Uses up to [`MAX_NEIGHBOURS`] positively similar users, ranked by
    /// similarity with ties going to the lower user id. A car no neighbour
    /// rated is left out. Results are sorted by score (ties by car id) and
    /// rounded to three decimals.
    pub fn predict(&self, user_id: &str, n: usize) -> Vec<Prediction> {
        if !self.is_trained {
            tracing::info!(user_id = %user_id, "Model not trained yet");
            return Vec::new();
        }

        let Some(user_ratings) = self.ratings.user_ratings(user_id) else {
            tracing::info!(user_id = %user_id, "User not found in training data");
            return Vec::new();
        };

        let candidates: Vec<CarId> = self
            .ratings
            .cars()
            .into_iter()
            .filter(|car| !user_ratings.contains_key(car))
            .collect();

        if candidates.is_empty() {
            tracing::info!(user_id = %user_id, "User has rated all available cars");
            return Vec::new();
        }

        let neighbours = self.neighbours(user_id);

        let mut predictions: Vec<Prediction> = candidates
            .into_iter()
            .filter_map(|car_id| {
                let (weighted_sum, similarity_sum) = neighbours
                    .iter()
                    .filter_map(|(neighbour, similarity)| {
                        self.ratings
                            .rating(neighbour, car_id)
                            .map(|rating| (similarity * rating, *similarity))
                    })
                    .fold((0.0, 0.0), |(ws, ss), (w, s)| (ws + w, ss + s));

                (similarity_sum > 0.0).then(|| Prediction {
                    car_id,
                    score: weighted_sum / similarity_sum,
                    method: METHOD,
                })
            })
            .collect();

        predictions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        predictions.truncate(n);
        for prediction in &mut predictions {
            prediction.score = round3(prediction.score);
        }

        tracing::debug!(
            user_id = %user_id,
            neighbours = neighbours.len(),
            predictions = predictions.len(),
            "Generated collaborative predictions"
        );

        predictions
    }

    /// Most similar other users with strictly positive similarity
    fn neighbours(&self, user_id: &str) -> Vec<(&str, f64)> {
        let Some(row) = self.user_similarities.row(&user_id.to_string()) else {
            return Vec::new();
        };

        let mut neighbours: Vec<(&str, f64)> = row
            .iter()
            .filter(|(other, similarity)| other.as_str() != user_id && **similarity > 0.0)
            .map(|(other, similarity)| (other.as_str(), *similarity))
            .collect();

        // Stable sort keeps the row's user-id order among equal similarities
        neighbours.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        neighbours.truncate(MAX_NEIGHBOURS);
        neighbours
    }

    pub fn stats(&self) -> ModelStats {
        let total_users = self.ratings.user_count();
        let total_interactions = self.ratings.total_ratings();
        let average_interactions_per_user = if total_users == 0 {
            0.0
        } else {
            total_interactions as f64 / total_users as f64
        };

        ModelStats {
            total_users,
            total_cars: self.ratings.cars().len(),
            total_interactions,
            is_trained: self.is_trained,
            average_interactions_per_user,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
