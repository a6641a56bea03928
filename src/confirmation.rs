//! Debounce of per-frame hand proximity readings
//!
//! Raw proximity readings flicker from frame to frame. A reading only becomes
//! the confirmed state of a hand after it has been observed a fixed number of
//! times in a row, each observation arriving within a maximum gap of the
//! previous one. A reading equal to the already-confirmed state is never
//! re-confirmed.
//!
//! ## Per-hand transition
//!
//! ```text
//!  obs == confirmed ──────────────► pending = none, count = 0
//!
//!  obs != confirmed ─┬─ obs == pending && gap <= max_gap ─► count += 1
//!                    └─ otherwise ───────────────────────► pending = obs, count = 1
//!                    last_seen = now
//!                    count >= required ─► confirmed = obs, emit StateChange,
//!                                         pending = none, count = 0
//! ```
//!
//! Memory per hand is constant. The fastest confirmation takes `required`
//! consecutive frames; a slower stream restarts its streak whenever a gap
//! exceeds `max_gap`.

use crate::config::ConfirmationConfig;
use crate::landmarks::{Hand, PerHand};
use crate::proximity::HandProximity;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// A confirmed change of a hand's proximity state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub hand: Hand,
    pub state: HandProximity,
}

/// In-progress streak toward a new state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmationTracker {
    /// Value currently being counted
    pub pending: Option<HandProximity>,
    /// Consecutive observations of `pending`
    pub count: u32,
    /// Time of the last counted observation
    pub last_seen: Option<Instant>,
}

impl ConfirmationTracker {
    fn clear_streak(&mut self) {
        self.pending = None;
        self.count = 0;
    }
}

/// Debounce state for a single hand
#[derive(Debug, Clone)]
pub struct HandDebouncer {
    confirmed: Option<HandProximity>,
    tracker: ConfirmationTracker,
    required_confirmations: u32,
    max_gap: Duration,
}

impl HandDebouncer {
    pub fn new(config: &ConfirmationConfig) -> Self {
        Self {
            confirmed: None,
            tracker: ConfirmationTracker::default(),
            required_confirmations: config.required_confirmations.max(1),
            max_gap: Duration::from_millis(config.max_gap_ms),
        }
    }

    /// Last confirmed state, `None` before the first confirmation
    pub fn confirmed(&self) -> Option<HandProximity> {
        self.confirmed
    }

    pub fn tracker(&self) -> &ConfirmationTracker {
        &self.tracker
    }

    /// Feed one observation
    ///
    /// Returns the newly confirmed state when this observation completes a
    /// streak.
    pub fn observe(&mut self, obs: HandProximity, now: Instant) -> Option<HandProximity> {
        if self.confirmed == Some(obs) {
            self.tracker.clear_streak();
            return None;
        }

        let within_gap = self
            .tracker
            .last_seen
            .is_some_and(|last| now.saturating_duration_since(last) <= self.max_gap);

        if self.tracker.pending == Some(obs) && within_gap {
            self.tracker.count += 1;
        } else {
            self.tracker.pending = Some(obs);
            self.tracker.count = 1;
        }
        self.tracker.last_seen = Some(now);

        if self.tracker.count >= self.required_confirmations {
            self.confirmed = Some(obs);
            self.tracker.clear_streak();
            return Some(obs);
        }

        None
    }
}

/// Debounce state for both hands
#[derive(Debug, Clone)]
pub struct ConfirmationMachine {
    right: HandDebouncer,
    left: HandDebouncer,
}

impl ConfirmationMachine {
    pub fn new(config: &ConfirmationConfig) -> Self {
        Self {
            right: HandDebouncer::new(config),
            left: HandDebouncer::new(config),
        }
    }

    pub fn hand(&self, hand: Hand) -> &HandDebouncer {
        match hand {
            Hand::Right => &self.right,
            Hand::Left => &self.left,
        }
    }

    fn hand_mut(&mut self, hand: Hand) -> &mut HandDebouncer {
        match hand {
            Hand::Right => &mut self.right,
            Hand::Left => &mut self.left,
        }
    }

    /// Confirmed state of both hands
    pub fn confirmed(&self) -> PerHand<HandProximity> {
        PerHand::new(self.right.confirmed(), self.left.confirmed())
    }

    /// Feed one frame's readings
    ///
    /// Hands without a reading are left untouched. Returns the state changes
    /// confirmed by this frame, right hand first.
    pub fn observe(&mut self, readings: &PerHand<HandProximity>, now: Instant) -> Vec<StateChange> {
        let mut changes = Vec::new();
        for (hand, &obs) in readings.iter() {
            if let Some(state) = self.hand_mut(hand).observe(obs, now) {
                tracing::info!("Hand {} confirmed {}", hand, state);
                changes.push(StateChange { hand, state });
            }
        }
        changes
    }
}

impl Default for ConfirmationMachine {
    fn default() -> Self {
        Self::new(&ConfirmationConfig::default())
    }
}
