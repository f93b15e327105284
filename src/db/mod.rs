//! Persistence for interactions, feedback and the trained model
//!
//! Interactions and feedback live either in PostgreSQL or in process memory.
//! The trained model is a single JSON blob kept in a file or under one Redis
//! key.

use crate::{
    error::AppResult,
    models::{Feedback, Interaction, Persona},
    services::collaborative::TrainedModel,
};

pub mod memory;
pub mod model_file;
pub mod postgres;
pub mod redis;

pub use memory::MemoryStore;
pub use model_file::FileModelStore;
pub use postgres::{create_pool, PgStore};
pub use self::redis::{create_redis_client, CacheKey, RedisModelStore};

/// Append-only interaction log
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    async fn append_interaction(&self, interaction: &Interaction) -> AppResult<()>;

    /// Every interaction, oldest first
    async fn all_interactions(&self) -> AppResult<Vec<Interaction>>;

    /// The `limit` most recent interactions, newest first
    async fn recent_interactions(&self, limit: usize) -> AppResult<Vec<Interaction>>;
}

/// Append-only feedback log
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn append_feedback(&self, feedback: &Feedback) -> AppResult<()>;

    /// Feedback left while browsing as `persona`
    async fn feedback_for_persona(&self, persona: Persona) -> AppResult<Vec<Feedback>>;

    /// Feedback left by one user, newest first
    async fn feedback_for_user(&self, user_id: &str) -> AppResult<Vec<Feedback>>;

    /// The `limit` most recent feedback records, newest first
    async fn recent_feedback(&self, limit: usize) -> AppResult<Vec<Feedback>>;
}

/// Durable home of the trained model snapshot
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ModelStore: Send + Sync {
    async fn save(&self, model: &TrainedModel) -> AppResult<()>;

    /// The last saved snapshot, if any
    async fn load(&self) -> AppResult<Option<TrainedModel>>;
}
