//! Per-ability activation bookkeeping.
//!
//! The ledger records how many times each activated ability has been
//! activated, keyed by source object and original ability id so every copy of
//! an ability shares the same counters. Per-turn counts are derived from the
//! recorded turn number rather than reset at turn boundaries.

use std::collections::HashMap;

use crate::ids::{AbilityId, ObjectId};

/// Activation counters for one (source, ability) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationInfo {
    /// The turn the ability was last activated on.
    pub turn: u32,
    /// Activations during that turn.
    pub this_turn: u32,
    /// Activations over the whole game.
    pub total: u32,
}

/// Strongly typed activation history for one game.
#[derive(Debug, Clone, Default)]
pub struct ActivationLedger {
    entries: HashMap<(ObjectId, AbilityId), ActivationInfo>,
}

impl ActivationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one activation on `turn`.
    pub fn record(&mut self, source: ObjectId, ability: AbilityId, turn: u32) {
        let entry = self
            .entries
            .entry((source, ability))
            .or_insert(ActivationInfo {
                turn,
                this_turn: 0,
                total: 0,
            });
        if entry.turn != turn {
            entry.turn = turn;
            entry.this_turn = 0;
        }
        entry.this_turn += 1;
        entry.total += 1;
    }

    pub fn info(&self, source: ObjectId, ability: AbilityId) -> Option<ActivationInfo> {
        self.entries.get(&(source, ability)).copied()
    }

    /// Activations of this ability during `turn`. Zero when the last
    /// recorded activation was on an earlier turn.
    pub fn activations_this_turn(&self, source: ObjectId, ability: AbilityId, turn: u32) -> u32 {
        match self.entries.get(&(source, ability)) {
            Some(info) if info.turn == turn => info.this_turn,
            _ => 0,
        }
    }

    pub fn total_activations(&self, source: ObjectId, ability: AbilityId) -> u32 {
        self.entries
            .get(&(source, ability))
            .map_or(0, |info| info.total)
    }
}
