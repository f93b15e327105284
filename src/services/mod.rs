pub mod avatar;
pub mod catalog;
pub mod collaborative;
pub mod exporter;
pub mod hybrid;
pub mod recommendations;
pub mod registry;
pub mod similarity;
pub mod trainer;

pub use catalog::Catalog;
pub use collaborative::TrainedModel;
pub use exporter::Exporter;
pub use recommendations::Recommender;
pub use registry::ModelRegistry;
pub use trainer::{ModelTrainer, RetrainQueue, RetrainWorkerHandle};
