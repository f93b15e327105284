use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CarId, Interaction, InteractionKind, Persona},
};

use super::{catalog::Catalog, collaborative::RatingMatrix};

pub const INTERACTIONS_CSV: &str = "user_car_interactions.csv";
pub const METADATA_JSON: &str = "metadata.json";
pub const CAR_FEATURES_JSON: &str = "car_features.json";

const DATA_FORMAT: &str =
    "CSV with columns: userId, carId, rating, interaction_count, last_interaction";

/// Figures reported back to API callers after an export
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub output_dir: PathBuf,
    pub csv_path: PathBuf,
    /// Number of distinct (user, car) pairs written
    pub total_interactions: usize,
    pub unique_users: usize,
    pub unique_cars: usize,
}

/// Contents of `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub export_date: DateTime<Utc>,
    pub total_users: usize,
    pub total_cars: usize,
    pub total_interactions: usize,
    pub interaction_types: Vec<String>,
    pub rating_scale: BTreeMap<String, f64>,
    pub user_interaction_counts: BTreeMap<String, usize>,
    pub car_interaction_counts: BTreeMap<CarId, usize>,
    pub data_format: String,
}

/// Everything a single export run produced
#[derive(Debug, Clone)]
pub struct Export {
    pub summary: ExportSummary,
    pub ratings: RatingMatrix,
    pub metadata: ExportMetadata,
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "carId")]
    car_id: CarId,
    rating: u8,
    interaction_count: usize,
    last_interaction: String,
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(rename = "carId")]
    car_id: CarId,
    rating: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CarFeatureRow<'a> {
    car_id: CarId,
    name: &'a str,
    brand: &'a str,
    #[serde(rename = "type")]
    persona: Persona,
    price: u32,
    features: &'a [String],
    total_interactions: usize,
}

struct PairStats {
    count: usize,
    last: DateTime<Utc>,
}

/// Reduces the interaction log to a rating matrix and flat training files
#[derive(Debug, Clone)]
pub struct Exporter {
    data_dir: PathBuf,
}

impl Exporter {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(INTERACTIONS_CSV)
    }

    /// Exports the interaction log, given in log order
    ///
    /// Each (user, car) pair keeps the highest rating weight among its
    /// interactions. All three files are staged before any of them is
    /// renamed into place.
    pub async fn export(&self, interactions: &[Interaction], catalog: &Catalog) -> AppResult<Export> {
        tracing::info!(count = interactions.len(), "Starting interaction export");

        let mut ratings = RatingMatrix::new();
        let mut pairs: BTreeMap<(&str, CarId), PairStats> = BTreeMap::new();
        let mut kinds: BTreeSet<&str> = BTreeSet::new();
        let mut user_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut car_counts: BTreeMap<CarId, usize> = BTreeMap::new();

        for interaction in interactions {
            ratings.record(
                &interaction.user_id,
                interaction.car_id,
                interaction.kind.rating(),
            );

            pairs
                .entry((interaction.user_id.as_str(), interaction.car_id))
                .and_modify(|stats| {
                    stats.count += 1;
                    stats.last = interaction.timestamp;
                })
                .or_insert(PairStats {
                    count: 1,
                    last: interaction.timestamp,
                });

            kinds.insert(interaction.kind.as_str());
            *user_counts.entry(interaction.user_id.clone()).or_default() += 1;
            *car_counts.entry(interaction.car_id).or_default() += 1;
        }

        let csv = Self::render_csv(&ratings, &pairs)?;
        let metadata = ExportMetadata {
            export_date: Utc::now(),
            total_users: user_counts.len(),
            total_cars: catalog.len(),
            total_interactions: interactions.len(),
            interaction_types: kinds.iter().map(|kind| kind.to_string()).collect(),
            rating_scale: InteractionKind::KNOWN
                .iter()
                .map(|kind| (kind.as_str().to_string(), kind.rating()))
                .collect(),
            user_interaction_counts: user_counts,
            car_interaction_counts: car_counts,
            data_format: DATA_FORMAT.to_string(),
        };
        let car_features: Vec<CarFeatureRow> = catalog
            .cars()
            .iter()
            .map(|car| CarFeatureRow {
                car_id: car.id,
                name: &car.name,
                brand: &car.brand,
                persona: car.persona,
                price: car.price,
                features: &car.features,
                total_interactions: metadata
                    .car_interaction_counts
                    .get(&car.id)
                    .copied()
                    .unwrap_or(0),
            })
            .collect();

        tokio::fs::create_dir_all(&self.data_dir).await?;
        let csv_path = self.csv_path();
        write_all_atomically(&[
            (csv_path.clone(), csv),
            (
                self.data_dir.join(METADATA_JSON),
                serde_json::to_vec_pretty(&metadata)?,
            ),
            (
                self.data_dir.join(CAR_FEATURES_JSON),
                serde_json::to_vec_pretty(&car_features)?,
            ),
        ])
        .await?;

        let summary = ExportSummary {
            output_dir: self.data_dir.clone(),
            csv_path,
            total_interactions: ratings.total_ratings(),
            unique_users: ratings.user_count(),
            unique_cars: ratings.cars().len(),
        };

        tracing::info!(
            pairs = summary.total_interactions,
            users = summary.unique_users,
            cars = summary.unique_cars,
            dir = %self.data_dir.display(),
            "Interaction export completed"
        );

        Ok(Export {
            summary,
            ratings,
            metadata,
        })
    }

    fn render_csv(
        ratings: &RatingMatrix,
        pairs: &BTreeMap<(&str, CarId), PairStats>,
    ) -> AppResult<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        for (user_id, car_id, rating) in ratings.iter() {
            let Some(stats) = pairs.get(&(user_id, car_id)) else {
                continue;
            };
            writer.serialize(CsvRow {
                user_id,
                car_id,
                rating: rating.round() as u8,
                interaction_count: stats.count,
                last_interaction: stats.last.to_rfc3339(),
            })?;
        }

        // An empty export still carries the header row
        if ratings.is_empty() {
            writer.write_record([
                "userId",
                "carId",
                "rating",
                "interaction_count",
                "last_interaction",
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("Failed to flush CSV export: {}", e)))
    }

    /// Reads the last exported rating matrix back from disk
    ///
    /// Returns `None` when nothing has been exported yet or the export held
    /// no ratings.
    pub async fn load_ratings(&self) -> AppResult<Option<RatingMatrix>> {
        let path = self.csv_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No exported interaction data found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut ratings = RatingMatrix::new();
        for record in reader.deserialize::<CsvRecord>() {
            let record = record?;
            ratings.record(&record.user_id, record.car_id, record.rating);
        }

        if ratings.is_empty() {
            return Ok(None);
        }

        tracing::info!(
            users = ratings.user_count(),
            pairs = ratings.total_ratings(),
            "Loaded exported rating matrix"
        );
        Ok(Some(ratings))
    }
}

/// Writes `contents` to a uniquely named sibling file, then renames it over `path`
pub(crate) async fn write_atomically(path: &Path, contents: &[u8]) -> AppResult<()> {
    let tmp_path = stage(path, contents).await?;
    commit(&[(tmp_path, path)]).await
}

/// Stages every file before renaming any of them
///
/// A failed write leaves all targets untouched. Only a failing rename can
/// leave the set partially replaced.
pub(crate) async fn write_all_atomically(files: &[(PathBuf, Vec<u8>)]) -> AppResult<()> {
    let mut staged = Vec::with_capacity(files.len());
    for (path, contents) in files {
        match stage(path, contents).await {
            Ok(tmp_path) => staged.push((tmp_path, path.as_path())),
            Err(e) => {
                for (tmp_path, _) in &staged {
                    let _ = tokio::fs::remove_file(tmp_path).await;
                }
                return Err(e);
            }
        }
    }
    commit(&staged).await
}

async fn stage(path: &Path, contents: &[u8]) -> AppResult<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| AppError::Internal(format!("Invalid output path: {}", path.display())))?;
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    if let Err(e) = tokio::fs::write(&tmp_path, contents).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(tmp_path)
}

async fn commit(staged: &[(PathBuf, &Path)]) -> AppResult<()> {
    for (i, (tmp_path, path)) in staged.iter().enumerate() {
        if let Err(e) = tokio::fs::rename(tmp_path, path).await {
            for (pending, _) in &staged[i..] {
                let _ = tokio::fs::remove_file(pending).await;
            }
            return Err(e.into());
        }
    }
    Ok(())
}
