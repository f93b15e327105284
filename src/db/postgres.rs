use chrono::{DateTime, Utc};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CarId, Feedback, FeedbackKind, Interaction, InteractionKind, Persona},
};

use super::{FeedbackStore, InteractionStore};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Creates a PostgreSQL connection pool and applies pending migrations
pub async fn create_pool(database_url: &str, max_connections: u32) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    MIGRATOR.run(&pool).await?;
    tracing::info!(max_connections, "PostgreSQL pool ready");

    Ok(pool)
}

/// Interaction and feedback logs in PostgreSQL
///
/// Both tables carry a `seq` identity column; log order means `seq` order.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct InteractionRow {
    id: Uuid,
    user_id: String,
    car_id: i32,
    kind: String,
    details: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<InteractionRow> for Interaction {
    type Error = AppError;

    fn try_from(row: InteractionRow) -> AppResult<Self> {
        Ok(Interaction {
            id: row.id,
            user_id: row.user_id,
            car_id: car_id_from_column(row.car_id)?,
            kind: InteractionKind::from(row.kind),
            details: row.details,
            timestamp: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FeedbackRow {
    id: Uuid,
    user_id: String,
    car_id: i32,
    avatar: String,
    feedback: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<FeedbackRow> for Feedback {
    type Error = AppError;

    fn try_from(row: FeedbackRow) -> AppResult<Self> {
        let persona: Persona = row
            .avatar
            .parse()
            .map_err(|e| AppError::Internal(format!("Corrupt feedback row {}: {}", row.id, e)))?;
        let kind = FeedbackKind::parse(&row.feedback).ok_or_else(|| {
            AppError::Internal(format!(
                "Corrupt feedback row {}: unknown feedback '{}'",
                row.id, row.feedback
            ))
        })?;

        Ok(Feedback {
            id: row.id,
            user_id: row.user_id,
            car_id: car_id_from_column(row.car_id)?,
            persona,
            kind,
            timestamp: row.created_at,
        })
    }
}

fn car_id_from_column(value: i32) -> AppResult<CarId> {
    CarId::try_from(value).map_err(|_| AppError::Internal(format!("Invalid car id in store: {}", value)))
}

fn car_id_to_column(value: CarId) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::InvalidInput(format!("Car id out of range: {}", value)))
}

fn limit_to_column(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn collect<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait::async_trait]
impl InteractionStore for PgStore {
    async fn append_interaction(&self, interaction: &Interaction) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO interactions (id, user_id, car_id, kind, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(interaction.id)
        .bind(&interaction.user_id)
        .bind(car_id_to_column(interaction.car_id)?)
        .bind(interaction.kind.as_str())
        .bind(&interaction.details)
        .bind(interaction.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn all_interactions(&self) -> AppResult<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT id, user_id, car_id, kind, details, created_at
            FROM interactions
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn recent_interactions(&self, limit: usize) -> AppResult<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(
            r#"
            SELECT id, user_id, car_id, kind, details, created_at
            FROM interactions
            ORDER BY seq DESC
            LIMIT $1
            "#,
        )
        .bind(limit_to_column(limit))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }
}

#[async_trait::async_trait]
impl FeedbackStore for PgStore {
    async fn append_feedback(&self, feedback: &Feedback) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO feedback (id, user_id, car_id, avatar, feedback, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(feedback.id)
        .bind(&feedback.user_id)
        .bind(car_id_to_column(feedback.car_id)?)
        .bind(feedback.persona.as_str())
        .bind(feedback.kind.as_str())
        .bind(feedback.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn feedback_for_persona(&self, persona: Persona) -> AppResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, user_id, car_id, avatar, feedback, created_at
            FROM feedback
            WHERE avatar = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(persona.as_str())
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn feedback_for_user(&self, user_id: &str) -> AppResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, user_id, car_id, avatar, feedback, created_at
            FROM feedback
            WHERE user_id = $1
            ORDER BY seq DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn recent_feedback(&self, limit: usize) -> AppResult<Vec<Feedback>> {
        let rows = sqlx::query_as::<_, FeedbackRow>(
            r#"
            SELECT id, user_id, car_id, avatar, feedback, created_at
            FROM feedback
            ORDER BY seq DESC
            LIMIT $1
            "#,
        )
        .bind(limit_to_column(limit))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }
}
