//! Bounded record of past runs, used only to bias the resolution strategy for later runs.
//!
//! Nothing here affects correctness: a history with capacity zero records nothing and never
//! expresses a preference.

use crate::complexity::ComplexityCategory;
use crate::config::TuningConfig;
use crate::quality::QualityMetrics;
use crate::resolve::ResolutionStrategy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub category: ComplexityCategory,
    pub strategy: ResolutionStrategy,
    pub quality: QualityMetrics,
    /// Whether the primary strategy converged within its budget.
    pub converged: bool,
}

#[derive(Debug, Clone, Default)]
pub struct AdaptationHistory {
    capacity: usize,
    entries: VecDeque<HistoryEntry>,
}

impl AdaptationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// A history that never records anything.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Appends an entry, evicting the oldest once full.
    pub fn record(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Strategy with the best mean composite score for `category`, among strategies with at least
    /// `history_min_samples` runs. When the most recent run of the winner exhausted its budget,
    /// the next stronger strategy is suggested instead.
    pub fn preferred_strategy(
        &self,
        category: ComplexityCategory,
        tuning: &TuningConfig,
    ) -> Option<ResolutionStrategy> {
        let min_samples = tuning.history_min_samples.max(1);
        // Insertion-ordered so ties resolve to the strategy seen first.
        let mut stats: IndexMap<ResolutionStrategy, (f64, usize, bool)> = IndexMap::new();
        for e in self.entries.iter().filter(|e| e.category == category) {
            let slot = stats.entry(e.strategy).or_insert((0.0, 0, true));
            slot.0 += e.quality.composite_score;
            slot.1 += 1;
            slot.2 = e.converged;
        }

        let mut best: Option<(ResolutionStrategy, f64, bool)> = None;
        for (&strategy, &(sum, count, last_converged)) in &stats {
            if count < min_samples {
                continue;
            }
            let mean = sum / count as f64;
            if best.is_none_or(|(_, m, _)| mean > m) {
                best = Some((strategy, mean, last_converged));
            }
        }
        best.map(|(strategy, _, last_converged)| {
            if last_converged {
                strategy
            } else {
                strategy.escalate()
            }
        })
    }
}
