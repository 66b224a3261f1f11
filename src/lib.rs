pub mod checkpoint;
pub mod classifier;
pub mod config;
pub mod progress;
pub mod runner;
pub mod wordlist;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use classifier::{BatchClassifier, Classification, ClassifierError, LlmClient, OllamaClient};
pub use config::FilterConfig;
pub use runner::{FilterRunner, RunSummary, RunnerError};
