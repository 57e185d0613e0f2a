//! Progress tracking for multi-step sequences
//!
//! Each sequence id maps to a level: how many of its steps have matched so
//! far. A single deadline covers every in-progress sequence; it is re-armed
//! on each advance and, once it passes, every level drops back to zero.
//!
//! Direct bindings that were held back because a longer sequence advanced on
//! the same key are parked here as deferred callbacks until that sequence
//! either completes (they are dropped) or is abandoned (they fire).

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use super::binding::Callback;
use super::event::KeyboardEvent;
use super::types::ActionKind;

/// Default window between two steps of a sequence
pub const DEFAULT_SEQUENCE_TIMEOUT: Duration = Duration::from_millis(1000);

/// A direct binding waiting on longer sequences that share its prefix
#[derive(Debug, Clone)]
pub struct Deferred {
    pub pattern: String,
    pub callback: Callback,
    pub event: KeyboardEvent,
    /// Sequences that were advanced by the same keystroke
    pub held_by: Vec<String>,
}

#[derive(Debug)]
pub struct SequenceMatcher {
    levels: HashMap<String, usize>,
    timeout: Duration,
    reset_at: Option<Instant>,
    next_expected: Option<ActionKind>,
    deferred: Vec<Deferred>,
}

impl SequenceMatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            levels: HashMap::new(),
            timeout,
            reset_at: None,
            next_expected: None,
            deferred: Vec::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Register a sequence id, starting idle
    pub fn declare(&mut self, sequence: &str) {
        self.levels.insert(sequence.to_string(), 0);
    }

    pub fn level(&self, sequence: &str) -> usize {
        self.levels.get(sequence).copied().unwrap_or(0)
    }

    /// Action the next step of the most recent advance listens for
    pub fn next_expected(&self) -> Option<ActionKind> {
        self.next_expected
    }

    /// Whether any sequence has matched at least one step
    pub fn is_active(&self) -> bool {
        self.levels.values().any(|&level| level > 0)
    }

    /// When the pending reset fires, if one is armed
    pub fn next_deadline(&self) -> Option<Instant> {
        self.reset_at
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Move a sequence to its next level and re-arm the reset deadline
    pub fn advance(&mut self, sequence: &str, next_action: ActionKind, now: Instant) {
        let level = self.levels.entry(sequence.to_string()).or_insert(0);
        *level += 1;
        self.next_expected = Some(next_action);
        self.reset_at = Some(now + self.timeout);
        tracing::debug!(sequence, level = *level, next = %next_action, "sequence advanced");
    }

    /// Park a direct binding behind the sequences that just advanced
    pub fn defer(&mut self, deferred: Deferred) {
        tracing::debug!(
            pattern = %deferred.pattern,
            held_by = ?deferred.held_by,
            "deferring direct binding"
        );
        self.deferred.push(deferred);
    }

    /// Reset every sequence not listed in `keep`
    pub fn reset_except(&mut self, keep: &HashSet<String>) {
        for (sequence, level) in self.levels.iter_mut() {
            if !keep.contains(sequence) && *level > 0 {
                tracing::trace!(sequence = %sequence, level = *level, "sequence reset");
                *level = 0;
            }
        }
        self.settle_idle();
    }

    /// Finish sequences whose final step just fired
    ///
    /// A completion ends every pending sequence, not just the finished one,
    /// so no partial progress carries over into the next keystroke.
    pub fn complete(&mut self, completed: &HashSet<String>) {
        if completed.is_empty() {
            return;
        }
        tracing::trace!(completed = ?completed, "sequence finished, resetting all");
        self.reset_except(&HashSet::new());
    }

    /// Drop progress if the deadline has passed
    ///
    /// Returns true when a reset happened.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.reset_at {
            Some(deadline) if now >= deadline => {
                tracing::debug!("sequence timeout elapsed, resetting");
                self.reset_except(&HashSet::new());
                self.reset_at = None;
                true
            }
            _ => false,
        }
    }

    fn settle_idle(&mut self) {
        if !self.is_active() {
            self.next_expected = None;
            self.reset_at = None;
        }
    }

    /// Deferred callbacks whose sequences have all gone idle
    ///
    /// Entries held by a sequence in `completed` are dropped instead: the
    /// keystroke they were waiting on turned out to belong to that sequence.
    pub fn release(&mut self, completed: &HashSet<String>) -> Vec<Deferred> {
        let levels = &self.levels;
        let mut ready = Vec::new();
        self.deferred.retain(|deferred| {
            if deferred.held_by.iter().any(|s| completed.contains(s)) {
                tracing::trace!(pattern = %deferred.pattern, "deferred binding consumed by sequence");
                return false;
            }
            let idle = deferred
                .held_by
                .iter()
                .all(|s| levels.get(s).copied().unwrap_or(0) == 0);
            if idle {
                ready.push(deferred.clone());
                return false;
            }
            true
        });
        ready
    }

    /// Forget all progress, deadlines and deferred callbacks
    pub fn clear(&mut self) {
        self.levels.clear();
        self.reset_at = None;
        self.next_expected = None;
        self.deferred.clear();
    }
}

impl Default for SequenceMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SEQUENCE_TIMEOUT)
    }
}
