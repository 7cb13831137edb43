//! Chunk-size feedback controller.
//!
//! A two-threshold hysteresis rule: fast calls grow the target size,
//! slow calls shrink it, anything in between leaves it alone. The
//! target never leaves `[min_size, max_size]`.

use crate::core::config::ChunkingConfig;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Recent durations kept in `ChunkerState::observed_durations`
pub const DURATION_HISTORY: usize = 100;

/// Sizing state owned by one chunker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkerState {
    pub current_target_size: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub optimal_duration_ms: u64,
    /// The last `DURATION_HISTORY` durations, oldest first
    pub observed_durations: VecDeque<u64>,
    /// Lifetime totals, unaffected by the history cap
    pub observation_count: usize,
    pub total_duration_ms: u64,
    pub out_of_band_count: usize,
}

/// Thresholds and step factors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedbackPolicy {
    pub fast_threshold_ms: u64,
    pub slow_threshold_ms: u64,
    pub grow_factor: f64,
    pub shrink_factor: f64,
}

impl Default for FeedbackPolicy {
    fn default() -> Self {
        Self {
            fast_threshold_ms: 5_000,
            slow_threshold_ms: 15_000,
            grow_factor: 1.2,
            shrink_factor: 0.7,
        }
    }
}

/// What a single observation did to the target size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeAdjustment {
    Grew { from: usize, to: usize },
    Shrank { from: usize, to: usize },
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct SizeController {
    state: ChunkerState,
    policy: FeedbackPolicy,
}

impl SizeController {
    /// Create a controller with the default policy.
    ///
    /// `initial` is clamped into `[min_size, max_size]`; swapped bounds
    /// are reordered and a zero minimum is raised to 1.
    pub fn new(initial: usize, min_size: usize, max_size: usize, optimal_duration_ms: u64) -> Self {
        Self::with_policy(
            initial,
            min_size,
            max_size,
            optimal_duration_ms,
            FeedbackPolicy::default(),
        )
    }

    pub fn with_policy(
        initial: usize,
        min_size: usize,
        max_size: usize,
        optimal_duration_ms: u64,
        policy: FeedbackPolicy,
    ) -> Self {
        let (min_size, max_size) = if min_size <= max_size {
            (min_size.max(1), max_size.max(1))
        } else {
            (max_size.max(1), min_size)
        };

        Self {
            state: ChunkerState {
                current_target_size: initial.clamp(min_size, max_size),
                min_size,
                max_size,
                optimal_duration_ms,
                observed_durations: VecDeque::with_capacity(DURATION_HISTORY),
                observation_count: 0,
                total_duration_ms: 0,
                out_of_band_count: 0,
            },
            policy,
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::with_policy(
            config.initial_chunk_size,
            config.min_chunk_size,
            config.max_chunk_size,
            config.optimal_duration_ms,
            FeedbackPolicy {
                fast_threshold_ms: config.fast_threshold_ms,
                slow_threshold_ms: config.slow_threshold_ms,
                grow_factor: config.grow_factor,
                shrink_factor: config.shrink_factor,
            },
        )
    }

    /// Feed one chunk's processing time
    pub fn observe(&mut self, elapsed_ms: u64) -> SizeAdjustment {
        self.record(elapsed_ms);
        let from = self.state.current_target_size;

        let adjustment = if elapsed_ms < self.policy.fast_threshold_ms {
            let to = scale(from, self.policy.grow_factor).min(self.state.max_size);
            SizeAdjustment::Grew { from, to }
        } else if elapsed_ms > self.policy.slow_threshold_ms {
            let to = scale(from, self.policy.shrink_factor).max(self.state.min_size);
            SizeAdjustment::Shrank { from, to }
        } else {
            SizeAdjustment::Unchanged
        };

        match adjustment {
            SizeAdjustment::Grew { to, .. } | SizeAdjustment::Shrank { to, .. } => {
                self.state.current_target_size = to;
                tracing::debug!(elapsed_ms, from, to, "chunk target size adjusted");
            }
            SizeAdjustment::Unchanged => {}
        }

        adjustment
    }

    fn record(&mut self, elapsed_ms: u64) {
        let state = &mut self.state;
        if state.observed_durations.len() == DURATION_HISTORY {
            state.observed_durations.pop_front();
        }
        state.observed_durations.push_back(elapsed_ms);
        state.observation_count += 1;
        state.total_duration_ms = state.total_duration_ms.saturating_add(elapsed_ms);
        if elapsed_ms < self.policy.fast_threshold_ms || elapsed_ms > self.policy.slow_threshold_ms {
            state.out_of_band_count += 1;
        }
    }

    pub fn target_size(&self) -> usize {
        self.state.current_target_size
    }

    pub fn state(&self) -> &ChunkerState {
        &self.state
    }

    pub fn policy(&self) -> &FeedbackPolicy {
        &self.policy
    }

    /// Mean of all observed durations (0 before any observation)
    pub fn average_duration_ms(&self) -> f64 {
        match self.state.observation_count {
            0 => 0.0,
            n => self.state.total_duration_ms as f64 / n as f64,
        }
    }

    /// Observations that fell outside the steady band
    pub fn out_of_band_count(&self) -> usize {
        self.state.out_of_band_count
    }
}

fn scale(size: usize, factor: f64) -> usize {
    (size as f64 * factor) as usize
}
