use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    db::{InteractionStore, ModelStore},
    error::AppResult,
};

use super::{
    catalog::Catalog,
    collaborative::{ModelStats, TrainedModel, TrainingError},
    exporter::{Export, ExportSummary, Exporter},
    registry::ModelRegistry,
};

/// What happened to the model during a training run
#[derive(Debug, Clone, PartialEq)]
pub enum TrainingOutcome {
    /// A new snapshot was trained and saved. `published` is false when a
    /// later run had already published.
    Trained { stats: ModelStats, published: bool },
    /// Not enough data; the previous snapshot stays in place
    Skipped(TrainingError),
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub export: ExportSummary,
    pub outcome: TrainingOutcome,
}

/// Runs export, training, persistence and publication of the model
#[derive(Clone)]
pub struct ModelTrainer {
    interactions: Arc<dyn InteractionStore>,
    model_store: Arc<dyn ModelStore>,
    registry: ModelRegistry,
    exporter: Exporter,
    catalog: Arc<Catalog>,
}

impl ModelTrainer {
    pub fn new(
        interactions: Arc<dyn InteractionStore>,
        model_store: Arc<dyn ModelStore>,
        registry: ModelRegistry,
        exporter: Exporter,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            interactions,
            model_store,
            registry,
            exporter,
            catalog,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Exports the full interaction log without training
    pub async fn export(&self) -> AppResult<Export> {
        let interactions = self.interactions.all_interactions().await?;
        self.exporter.export(&interactions, &self.catalog).await
    }

    /// Exports, trains, saves and publishes a new snapshot
    ///
    /// Store and I/O failures abort the run. Insufficient data is reported in
    /// the outcome, not as an error.
    pub async fn export_and_train(&self) -> AppResult<TrainingReport> {
        let generation = self.registry.begin_run();
        let export = self.export().await?;

        let outcome = match TrainedModel::train(export.ratings) {
            Ok(model) => {
                self.model_store.save(&model).await?;
                let stats = model.stats();
                let published = self.registry.publish(generation, model).await;
                TrainingOutcome::Trained { stats, published }
            }
            Err(e) => {
                tracing::info!(error = %e, "Skipping model training");
                TrainingOutcome::Skipped(e)
            }
        };

        Ok(TrainingReport {
            export: export.summary,
            outcome,
        })
    }

    /// Publishes the persisted model, or one trained from the last export
    ///
    /// Used at startup. Nothing here is fatal: any failure is logged and the
    /// service keeps running untrained.
    pub async fn restore(&self) -> bool {
        let generation = self.registry.begin_run();

        match self.model_store.load().await {
            Ok(Some(model)) => {
                tracing::info!(
                    users = model.ratings.user_count(),
                    trained = model.is_trained,
                    "Loaded persisted model"
                );
                return self.registry.publish(generation, model).await;
            }
            Ok(None) => tracing::info!("No persisted model found"),
            Err(e) => tracing::warn!(error = %e, "Failed to load persisted model, starting untrained"),
        }

        let ratings = match self.exporter.load_ratings().await {
            Ok(Some(ratings)) => ratings,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read last export");
                return false;
            }
        };

        match TrainedModel::train(ratings) {
            Ok(model) => {
                if let Err(e) = self.model_store.save(&model).await {
                    tracing::warn!(error = %e, "Failed to save model trained from last export");
                }
                self.registry.publish(generation, model).await
            }
            Err(e) => {
                tracing::info!(error = %e, "Last export is not enough to train on");
                false
            }
        }
    }
}

/// Fire-and-forget handle for requesting a background retrain
#[derive(Clone)]
pub struct RetrainQueue {
    request_tx: mpsc::UnboundedSender<()>,
}

/// Handle for stopping the retrain worker
pub struct RetrainWorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RetrainWorkerHandle {
    /// Signals the worker and waits for the run in flight to finish
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Retrain worker shutdown signal sent");
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Retrain worker task failed");
        }
    }
}

impl RetrainQueue {
    /// Spawns the background worker
    pub fn spawn(trainer: ModelTrainer) -> (Self, RetrainWorkerHandle) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            Self::retrain_worker_task(trainer, request_rx, shutdown_rx).await;
        });

        (Self { request_tx }, RetrainWorkerHandle { shutdown_tx, task })
    }

    /// Asks for a retrain without waiting for it
    pub fn request(&self) {
        if self.request_tx.send(()).is_err() {
            tracing::warn!("Retrain worker is not running, dropping request");
        }
    }

    /// Runs one training per batch of queued requests until shut down
    async fn retrain_worker_task(
        trainer: ModelTrainer,
        mut request_rx: mpsc::UnboundedReceiver<()>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Retrain worker started");

        loop {
            tokio::select! {
                biased;

                Some(()) = request_rx.recv() => {
                    let mut coalesced = 1;
                    while request_rx.try_recv().is_ok() {
                        coalesced += 1;
                    }

                    match trainer.export_and_train().await {
                        Ok(report) => match report.outcome {
                            TrainingOutcome::Trained { stats, published } => tracing::info!(
                                coalesced,
                                users = stats.total_users,
                                cars = stats.total_cars,
                                published,
                                "Background retrain completed"
                            ),
                            TrainingOutcome::Skipped(reason) => tracing::info!(
                                coalesced,
                                reason = %reason,
                                "Background retrain skipped"
                            ),
                        },
                        Err(e) => tracing::error!(coalesced, error = %e, "Background retrain failed"),
                    }
                }
                Some(()) = shutdown_rx.recv() => {
                    tracing::info!("Retrain worker stopped");
                    break;
                }
                else => {
                    tracing::info!("Retrain queue closed, worker exiting");
                    break;
                }
            }
        }
    }
}
