use std::fmt::Display;

use ::redis::{AsyncCommands, Client};

use crate::{error::AppResult, services::collaborative::TrainedModel};

use super::ModelStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    TrainedModel,
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::TrainedModel => write!(f, "model:trained"),
        }
    }
}

/// Creates a Redis client
///
/// Connections are opened lazily, one multiplexed connection per operation.
pub fn create_redis_client(redis_url: &str) -> AppResult<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Keeps the trained model as a JSON blob under a single Redis key
#[derive(Clone)]
pub struct RedisModelStore {
    redis_client: Client,
}

impl RedisModelStore {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }
}

#[async_trait::async_trait]
impl ModelStore for RedisModelStore {
    async fn save(&self, model: &TrainedModel) -> AppResult<()> {
        let json = serde_json::to_string(model)?;
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(CacheKey::TrainedModel.to_string(), json).await?;
        tracing::info!(key = %CacheKey::TrainedModel, "Trained model saved to Redis");
        Ok(())
    }

    async fn load(&self) -> AppResult<Option<TrainedModel>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(CacheKey::TrainedModel.to_string()).await?;

        match cached {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}
