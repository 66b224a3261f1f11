//! Progress reporting and finish-time estimation for long runs.
//!
//! The runner emits `ProgressEvent`s to an optional callback; the CLI
//! renders them. ETA math uses the batch rate observed since process
//! start, so a resumed run re-measures instead of trusting stale history.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════
// Events
// ═══════════════════════════════════════════

/// Event emitted while a run progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProgressEvent {
    Started {
        total_words: usize,
        resumed_from: usize,
        total_batches: u64,
    },
    BatchCompleted {
        batch: u64,
        total_batches: u64,
        next_index: usize,
        total_words: usize,
    },
    CheckpointSaved {
        next_index: usize,
        batches_done: u64,
        total_batches: u64,
        eta: Option<DateTime<Local>>,
    },
    Completed {
        excluded: usize,
        valid: usize,
        unknown: usize,
        duration_ms: u64,
    },
}

// ═══════════════════════════════════════════
// Estimation
// ═══════════════════════════════════════════

/// Number of batches needed to cover the words at `start_index..total_words`.
///
/// `batch_size` must be at least 1 (enforced by config validation).
pub fn remaining_batches(total_words: usize, start_index: usize, batch_size: usize) -> u64 {
    let remaining = total_words.saturating_sub(start_index);
    remaining.div_ceil(batch_size) as u64
}

/// Estimate seconds left from the observed batch rate.
///
/// Formula: `(total - done) / (done / elapsed)`. Returns None until at
/// least one batch has completed in measurable time.
pub fn estimate_remaining_secs(
    batches_done: u64,
    total_batches: u64,
    elapsed_secs: f64,
) -> Option<f64> {
    if batches_done == 0 || elapsed_secs <= 0.0 {
        return None;
    }
    let rate = batches_done as f64 / elapsed_secs;
    let remaining = total_batches.saturating_sub(batches_done) as f64;
    Some(remaining / rate)
}

/// Tracks batch completions since process start and projects a finish time.
#[derive(Debug)]
pub struct EtaTracker {
    started: Instant,
    batches_done: u64,
    total_batches: u64,
}

impl EtaTracker {
    pub fn new(total_batches: u64) -> Self {
        Self {
            started: Instant::now(),
            batches_done: 0,
            total_batches,
        }
    }

    pub fn record_batch(&mut self) {
        self.batches_done += 1;
    }

    pub fn batches_done(&self) -> u64 {
        self.batches_done
    }

    pub fn total_batches(&self) -> u64 {
        self.total_batches
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Projected local wall-clock finish time, if measurable yet.
    pub fn eta(&self) -> Option<DateTime<Local>> {
        let secs = estimate_remaining_secs(
            self.batches_done,
            self.total_batches,
            self.started.elapsed().as_secs_f64(),
        )?;
        Some(Local::now() + chrono::Duration::milliseconds((secs * 1000.0) as i64))
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_batches_rounds_up() {
        // 9340 words left in batches of 55 → 169.8 → 170
        assert_eq!(remaining_batches(10_000, 660, 55), 170);
        assert_eq!(remaining_batches(4, 0, 55), 1);
        assert_eq!(remaining_batches(5, 0, 1), 5);
        assert_eq!(remaining_batches(110, 0, 55), 2);
    }

    #[test]
    fn remaining_batches_when_done_is_zero() {
        assert_eq!(remaining_batches(100, 100, 55), 0);
        assert_eq!(remaining_batches(0, 0, 55), 0);
        // A checkpoint past the end of a shrunken word list counts as done.
        assert_eq!(remaining_batches(50, 80, 55), 0);
    }

    #[test]
    fn estimate_uses_observed_rate() {
        // 2 batches in 4s → 0.5 batch/s; 8 left → 16s
        assert_eq!(estimate_remaining_secs(2, 10, 4.0), Some(16.0));
    }

    #[test]
    fn estimate_is_none_before_first_batch() {
        assert_eq!(estimate_remaining_secs(0, 10, 4.0), None);
    }

    #[test]
    fn estimate_is_none_without_elapsed_time() {
        assert_eq!(estimate_remaining_secs(2, 10, 0.0), None);
    }

    #[test]
    fn estimate_is_zero_when_all_done() {
        assert_eq!(estimate_remaining_secs(10, 10, 5.0), Some(0.0));
    }

    #[test]
    fn tracker_eta_is_none_before_first_batch() {
        let tracker = EtaTracker::new(10);
        assert!(tracker.eta().is_none());
        assert_eq!(tracker.batches_done(), 0);
        assert_eq!(tracker.total_batches(), 10);
    }

    #[test]
    fn tracker_counts_batches() {
        let mut tracker = EtaTracker::new(3);
        tracker.record_batch();
        tracker.record_batch();
        assert_eq!(tracker.batches_done(), 2);
    }

    #[test]
    fn tracker_eta_near_now_when_finished() {
        let mut tracker = EtaTracker::new(2);
        tracker.record_batch();
        tracker.record_batch();

        let eta = tracker.eta().expect("eta after recorded batches");
        let gap = (eta - Local::now()).num_seconds().abs();
        assert!(gap <= 1, "finished run should project ETA ~now, gap was {gap}s");
    }

    #[test]
    fn progress_event_serde() {
        let event = ProgressEvent::BatchCompleted {
            batch: 3,
            total_batches: 170,
            next_index: 165,
            total_words: 9340,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"BatchCompleted\""));
        assert!(json.contains("\"batch\":3"));
    }

    #[test]
    fn checkpoint_event_serializes_missing_eta() {
        let event = ProgressEvent::CheckpointSaved {
            next_index: 110,
            batches_done: 2,
            total_batches: 170,
            eta: None,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"eta\":null"));
    }
}
