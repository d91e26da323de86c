//! Player decisions.
//!
//! The engine never guesses at a choice inline; every point where a player
//! decides something goes through a `DecisionMaker`. `AutoDecisionMaker`
//! answers deterministically (first option, lowest id, yes) and is the
//! default; `ScriptedDecisionMaker` replays queued answers and backs the
//! tests.

use std::collections::VecDeque;
use std::fmt::Debug;

use crate::ids::PlayerId;
use crate::replacement::ReplacementEffect;
use crate::target::Target;

/// Answers choices on behalf of a player.
pub trait DecisionMaker: Debug + Send + Sync {
    /// Order simultaneous triggered abilities controlled by `player`. Input
    /// is the pending triggers' display texts in detection order; the result
    /// is a permutation of indices, first element stacked first.
    fn order_triggers(&mut self, player: PlayerId, pending: &[String]) -> Vec<usize>;

    /// Pick which applicable replacement effect applies next. `options` is
    /// never empty; the result indexes into it.
    fn choose_replacement(&mut self, player: PlayerId, options: &[&ReplacementEffect]) -> usize;

    /// A yes/no choice ("you may...").
    fn choose_yes_no(&mut self, player: PlayerId, prompt: &str) -> bool;

    /// Choose `count` targets from the legal candidates.
    fn choose_targets(
        &mut self,
        player: PlayerId,
        candidates: &[Target],
        count: u32,
    ) -> Vec<Target>;

    fn clone_box(&self) -> Box<dyn DecisionMaker>;
}

impl Clone for Box<dyn DecisionMaker> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Deterministic default: detection order, lowest effect id, yes, first
/// candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecisionMaker;

impl DecisionMaker for AutoDecisionMaker {
    fn order_triggers(&mut self, _player: PlayerId, pending: &[String]) -> Vec<usize> {
        (0..pending.len()).collect()
    }

    fn choose_replacement(&mut self, _player: PlayerId, options: &[&ReplacementEffect]) -> usize {
        options
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.id)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn choose_yes_no(&mut self, _player: PlayerId, _prompt: &str) -> bool {
        true
    }

    fn choose_targets(
        &mut self,
        _player: PlayerId,
        candidates: &[Target],
        count: u32,
    ) -> Vec<Target> {
        candidates.iter().take(count as usize).copied().collect()
    }

    fn clone_box(&self) -> Box<dyn DecisionMaker> {
        Box::new(*self)
    }
}

/// Replays queued answers; falls back to the auto behavior when a queue runs
/// dry.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecisionMaker {
    trigger_orders: VecDeque<Vec<usize>>,
    replacement_choices: VecDeque<usize>,
    yes_no: VecDeque<bool>,
    targets: VecDeque<Vec<Target>>,
}

impl ScriptedDecisionMaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_trigger_order(&mut self, order: Vec<usize>) -> &mut Self {
        self.trigger_orders.push_back(order);
        self
    }

    pub fn queue_replacement_choice(&mut self, index: usize) -> &mut Self {
        self.replacement_choices.push_back(index);
        self
    }

    pub fn queue_yes_no(&mut self, answer: bool) -> &mut Self {
        self.yes_no.push_back(answer);
        self
    }

    pub fn queue_targets(&mut self, targets: Vec<Target>) -> &mut Self {
        self.targets.push_back(targets);
        self
    }
}

impl DecisionMaker for ScriptedDecisionMaker {
    fn order_triggers(&mut self, player: PlayerId, pending: &[String]) -> Vec<usize> {
        match self.trigger_orders.pop_front() {
            Some(order) if order.len() == pending.len() => order,
            _ => AutoDecisionMaker.order_triggers(player, pending),
        }
    }

    fn choose_replacement(&mut self, player: PlayerId, options: &[&ReplacementEffect]) -> usize {
        match self.replacement_choices.pop_front() {
            Some(index) if index < options.len() => index,
            _ => AutoDecisionMaker.choose_replacement(player, options),
        }
    }

    fn choose_yes_no(&mut self, player: PlayerId, prompt: &str) -> bool {
        self.yes_no
            .pop_front()
            .unwrap_or_else(|| AutoDecisionMaker.choose_yes_no(player, prompt))
    }

    fn choose_targets(
        &mut self,
        player: PlayerId,
        candidates: &[Target],
        count: u32,
    ) -> Vec<Target> {
        match self.targets.pop_front() {
            Some(targets) => targets,
            None => AutoDecisionMaker.choose_targets(player, candidates, count),
        }
    }

    fn clone_box(&self) -> Box<dyn DecisionMaker> {
        Box::new(self.clone())
    }
}
