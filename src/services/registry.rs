use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::RwLock;

use super::collaborative::TrainedModel;

/// Holds the currently published model snapshot
///
/// Readers clone the `Arc` and never see a partially built model. Each
/// training run reserves a generation up front; a finished run is only
/// published if nothing newer has been published in the meantime.
#[derive(Clone)]
pub struct ModelRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    next_generation: AtomicU64,
    current: RwLock<Published>,
}

struct Published {
    generation: u64,
    model: Arc<TrainedModel>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(TrainedModel::untrained())
    }
}

impl ModelRegistry {
    pub fn new(model: TrainedModel) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_generation: AtomicU64::new(1),
                current: RwLock::new(Published {
                    generation: 0,
                    model: Arc::new(model),
                }),
            }),
        }
    }

    /// The latest published snapshot
    pub async fn current(&self) -> Arc<TrainedModel> {
        self.inner.current.read().await.model.clone()
    }

    /// Reserves a generation number for a training run about to start
    pub fn begin_run(&self) -> u64 {
        self.inner.next_generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Publishes a snapshot built by the run holding `generation`
    ///
    /// Returns `false` and keeps the current snapshot when a later run has
    /// already published.
    pub async fn publish(&self, generation: u64, model: TrainedModel) -> bool {
        let mut current = self.inner.current.write().await;
        if generation <= current.generation {
            tracing::debug!(
                generation,
                published = current.generation,
                "Discarding model from an older training run"
            );
            return false;
        }

        current.generation = generation;
        current.model = Arc::new(model);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::collaborative::RatingMatrix;

    fn trained() -> TrainedModel {
        let mut ratings = RatingMatrix::new();
        ratings.record("u1", 1, 5.0);
        ratings.record("u2", 2, 4.0);
        TrainedModel::train(ratings).unwrap()
    }

    #[test]
    fn test_starts_untrained() {
        let registry = ModelRegistry::default();
        assert!(!tokio_test::block_on(registry.current()).is_trained);
    }

    #[tokio::test]
    async fn test_publish_swaps_snapshot() {
        let registry = ModelRegistry::default();
        let before = registry.current().await;

        let generation = registry.begin_run();
        assert!(registry.publish(generation, trained()).await);

        assert!(registry.current().await.is_trained);
        // Readers holding the old snapshot keep it
        assert!(!before.is_trained);
    }

    #[tokio::test]
    async fn test_older_run_cannot_overwrite_newer_one() {
        let registry = ModelRegistry::default();
        let older = registry.begin_run();
        let newer = registry.begin_run();

        assert!(registry.publish(newer, trained()).await);
        assert!(!registry.publish(older, TrainedModel::untrained()).await);
        assert!(registry.current().await.is_trained);
    }

    #[test]
    fn test_generations_increase() {
        let registry = ModelRegistry::default();
        let first = registry.begin_run();
        let second = registry.begin_run();
        assert!(second > first);
    }
}
