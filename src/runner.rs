//! FilterRunner drives a whole screening run.
//!
//! Walks the word list in fixed-size batches, folds each batch into the
//! three buckets, saves the checkpoint every N batches, and writes the
//! output files once the last word is classified. Strictly sequential:
//! one request in flight at a time.

use std::path::PathBuf;

use thiserror::Error;

use crate::checkpoint::{Checkpoint, CheckpointError, CheckpointStore};
use crate::classifier::{BatchClassifier, LlmClient};
use crate::config::{ConfigError, FilterConfig};
use crate::progress::{remaining_batches, EtaTracker, ProgressEvent};
use crate::wordlist;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Cannot read word list {}: {source}", .path.display())]
    InputRead { path: PathBuf, source: std::io::Error },

    #[error("Cannot write output {}: {source}", .path.display())]
    OutputWrite { path: PathBuf, source: std::io::Error },
}

/// What one processed batch changed.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// 1-based batch number within this process run.
    pub batch: u64,
    pub words_processed: usize,
    pub next_index: usize,
    pub checkpoint_saved: bool,
}

/// Counters for a completed run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunSummary {
    pub total_words: usize,
    pub excluded: usize,
    pub valid: usize,
    pub unknown: usize,
    pub batches_processed: u64,
    pub resumed_from: usize,
    pub duration_ms: u64,
}

/// Orchestrates one resumable screening run.
#[derive(Debug)]
pub struct FilterRunner {
    config: FilterConfig,
    words: Vec<String>,
    state: Checkpoint,
    store: CheckpointStore,
    classifier: BatchClassifier,
    tracker: EtaTracker,
    resumed_from: usize,
}

impl FilterRunner {
    /// Build a runner from config: load the word list, then any saved state.
    pub fn from_config(config: FilterConfig) -> Result<Self, RunnerError> {
        let words =
            wordlist::load_words(&config.input_path).map_err(|source| RunnerError::InputRead {
                path: config.input_path.clone(),
                source,
            })?;
        Self::new(config, words)
    }

    /// Build a runner over an already-loaded word list.
    ///
    /// Resumes from the checkpoint file if one exists; a corrupt or
    /// inconsistent checkpoint is fatal here rather than silently
    /// reclassifying from zero.
    pub fn new(config: FilterConfig, words: Vec<String>) -> Result<Self, RunnerError> {
        config.validate()?;

        let store = CheckpointStore::new(&config.checkpoint_path);
        let state = store.load()?.unwrap_or_default();
        let resumed_from = state.last_index;

        if resumed_from > 0 {
            tracing::info!(
                resumed_from,
                total_words = words.len(),
                "Resuming from checkpoint"
            );
        }

        let tracker = EtaTracker::new(remaining_batches(
            words.len(),
            state.last_index,
            config.batch_size,
        ));
        let classifier =
            BatchClassifier::new(&config.model, &config.prompt_template, config.temperature);

        Ok(Self {
            config,
            words,
            state,
            store,
            classifier,
            tracker,
            resumed_from,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.state.last_index >= self.words.len()
    }

    /// Index of the next unprocessed word.
    pub fn next_index(&self) -> usize {
        self.state.last_index
    }

    /// The in-progress buckets.
    pub fn state(&self) -> &Checkpoint {
        &self.state
    }

    /// Classify the next batch and fold it into the buckets.
    ///
    /// Advances by the number of words actually taken (the final batch
    /// may be short) and saves the checkpoint every `checkpoint_interval`
    /// batches, counting batches since process start. Returns None once
    /// every word is classified. The only errors are persistence errors;
    /// endpoint trouble has already been degraded to `Unknown` verdicts.
    pub fn process_next_batch(
        &mut self,
        client: &dyn LlmClient,
    ) -> Result<Option<BatchReport>, RunnerError> {
        let start = self.state.last_index;
        if start >= self.words.len() {
            return Ok(None);
        }

        let end = (start + self.config.batch_size).min(self.words.len());
        let batch = &self.words[start..end];
        let results = self.classifier.classify(client, batch);

        for (word, classification) in batch.iter().zip(results.iter()) {
            self.state.record(word.clone(), *classification);
        }
        self.state.last_index = end;
        self.tracker.record_batch();

        let mut checkpoint_saved = false;
        if self.tracker.batches_done() % self.config.checkpoint_interval == 0 {
            self.store.save(&self.state)?;
            checkpoint_saved = true;
            tracing::debug!(next_index = end, "Checkpoint saved");
        }

        Ok(Some(BatchReport {
            batch: self.tracker.batches_done(),
            words_processed: end - start,
            next_index: end,
            checkpoint_saved,
        }))
    }

    /// Write the bucket files. The unknown bucket is written only when
    /// non-empty. Rewriting the same buckets is byte-identical.
    pub fn write_outputs(&self) -> Result<(), RunnerError> {
        wordlist::write_words(&self.config.excluded_path, &self.state.excluded).map_err(
            |source| RunnerError::OutputWrite {
                path: self.config.excluded_path.clone(),
                source,
            },
        )?;
        wordlist::write_words(&self.config.valid_path, &self.state.valid).map_err(|source| {
            RunnerError::OutputWrite {
                path: self.config.valid_path.clone(),
                source,
            }
        })?;
        if !self.state.unknown.is_empty() {
            wordlist::write_words(&self.config.unknown_path, &self.state.unknown).map_err(
                |source| RunnerError::OutputWrite {
                    path: self.config.unknown_path.clone(),
                    source,
                },
            )?;
        }
        Ok(())
    }

    /// Write the outputs, drop the checkpoint, and summarize the run.
    ///
    /// The checkpoint file is removed only after every output write has
    /// succeeded; a failed write leaves the run resumable.
    pub fn finalize(&self) -> Result<RunSummary, RunnerError> {
        self.write_outputs()?;
        self.store.clear()?;
        Ok(self.summary())
    }

    /// Process every remaining batch, then finalize.
    pub fn run(
        &mut self,
        client: &dyn LlmClient,
        progress_fn: Option<&dyn Fn(ProgressEvent)>,
    ) -> Result<RunSummary, RunnerError> {
        self.preflight(client);

        if let Some(progress) = progress_fn {
            progress(ProgressEvent::Started {
                total_words: self.words.len(),
                resumed_from: self.resumed_from,
                total_batches: self.tracker.total_batches(),
            });
        }

        while let Some(report) = self.process_next_batch(client)? {
            if let Some(progress) = progress_fn {
                progress(ProgressEvent::BatchCompleted {
                    batch: report.batch,
                    total_batches: self.tracker.total_batches(),
                    next_index: report.next_index,
                    total_words: self.words.len(),
                });
                if report.checkpoint_saved {
                    progress(ProgressEvent::CheckpointSaved {
                        next_index: report.next_index,
                        batches_done: report.batch,
                        total_batches: self.tracker.total_batches(),
                        eta: self.tracker.eta(),
                    });
                }
            }
        }

        let summary = self.finalize()?;
        tracing::info!(
            excluded = summary.excluded,
            valid = summary.valid,
            unknown = summary.unknown,
            duration_ms = summary.duration_ms,
            "Run complete"
        );

        if let Some(progress) = progress_fn {
            progress(ProgressEvent::Completed {
                excluded: summary.excluded,
                valid: summary.valid,
                unknown: summary.unknown,
                duration_ms: summary.duration_ms,
            });
        }

        Ok(summary)
    }

    /// One availability check before the loop.
    ///
    /// Endpoint trouble is only warned about: batch failures degrade to
    /// `Unknown` instead of aborting, and the endpoint may come up mid-run.
    fn preflight(&self, client: &dyn LlmClient) {
        match client.is_model_available(&self.config.model) {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                model = %self.config.model,
                "Model not found on the endpoint; batches will come back unknown until it is pulled"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                "Inference endpoint unreachable; batches will come back unknown until it is up"
            ),
        }
    }

    fn summary(&self) -> RunSummary {
        RunSummary {
            total_words: self.words.len(),
            excluded: self.state.excluded.len(),
            valid: self.state.valid.len(),
            unknown: self.state.unknown.len(),
            batches_processed: self.tracker.batches_done(),
            resumed_from: self.resumed_from,
            duration_ms: self.tracker.elapsed().as_millis() as u64,
        }
    }
}
