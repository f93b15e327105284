use std::sync::Arc;

use crate::{
    config::Config,
    db::{
        self, FeedbackStore, FileModelStore, InteractionStore, MemoryStore, ModelStore, PgStore,
        RedisModelStore,
    },
    error::AppResult,
    services::{
        Catalog, Exporter, ModelRegistry, ModelTrainer, Recommender, RetrainQueue,
        RetrainWorkerHandle,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub interactions: Arc<dyn InteractionStore>,
    pub feedback: Arc<dyn FeedbackStore>,
    pub trainer: ModelTrainer,
    pub recommender: Recommender,
    pub retrain: RetrainQueue,
}

impl AppState {
    /// Wires the services together and starts the retrain worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        interactions: Arc<dyn InteractionStore>,
        feedback: Arc<dyn FeedbackStore>,
        model_store: Arc<dyn ModelStore>,
        exporter: Exporter,
    ) -> (Self, RetrainWorkerHandle) {
        let catalog = Arc::new(Catalog::builtin());
        let registry = ModelRegistry::default();

        let trainer = ModelTrainer::new(
            interactions.clone(),
            model_store,
            registry.clone(),
            exporter,
            catalog.clone(),
        );
        let recommender = Recommender::new(registry, feedback.clone(), catalog.clone());
        let (retrain, handle) = RetrainQueue::spawn(trainer.clone());

        let state = Self {
            catalog,
            interactions,
            feedback,
            trainer,
            recommender,
            retrain,
        };

        (state, handle)
    }

    /// In-memory logs with the model kept in a file
    pub fn in_memory(config: &Config) -> (Self, RetrainWorkerHandle) {
        let store = MemoryStore::new();
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(FileModelStore::new(&config.model_path)),
            Exporter::new(&config.ml_data_dir),
        )
    }

    /// Builds the state described by the configuration and restores the model
    ///
    /// PostgreSQL backs the logs when `DATABASE_URL` is set, Redis holds the
    /// model when `REDIS_URL` is set. A model that cannot be restored is not
    /// an error.
    pub async fn from_config(config: &Config) -> AppResult<(Self, RetrainWorkerHandle)> {
        let model_store: Arc<dyn ModelStore> = match &config.redis_url {
            Some(url) => {
                tracing::info!("Keeping trained model in Redis");
                Arc::new(RedisModelStore::new(db::create_redis_client(url)?))
            }
            None => Arc::new(FileModelStore::new(&config.model_path)),
        };
        let exporter = Exporter::new(&config.ml_data_dir);

        let (state, handle) = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url, config.database_max_connections).await?;
                let store = PgStore::new(pool);
                Self::new(Arc::new(store.clone()), Arc::new(store), model_store, exporter)
            }
            None => {
                tracing::warn!("DATABASE_URL not set, interactions and feedback are kept in memory");
                let store = MemoryStore::new();
                Self::new(Arc::new(store.clone()), Arc::new(store), model_store, exporter)
            }
        };

        if state.trainer.restore().await {
            tracing::info!("Model restored at startup");
        } else {
            tracing::info!("Starting with an untrained model");
        }

        Ok((state, handle))
    }
}
