//! Conditions: stateless predicates over game state.
//!
//! Conditions gate activated abilities ("Activate only if...") and triggered
//! abilities ("intervening if"). They read game state and never mutate it.

use std::fmt::Debug;

use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::types::CardType;

/// A predicate over game state, evaluated for an ability's source.
pub trait Condition: Debug + Send + Sync {
    /// Evaluate the condition. Must not mutate game state.
    fn check(&self, game: &GameState, source: ObjectId, controller: PlayerId) -> bool;

    /// Clone into a boxed trait object (`Clone` is not object-safe).
    fn clone_box(&self) -> Box<dyn Condition>;

    /// Human-readable text for the game log.
    fn display(&self) -> String;
}

impl Clone for Box<dyn Condition> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Always evaluates to a fixed value. Useful in tests and as a placeholder.
#[derive(Debug, Clone, Copy)]
pub struct FixedCondition(pub bool);

impl Condition for FixedCondition {
    fn check(&self, _game: &GameState, _source: ObjectId, _controller: PlayerId) -> bool {
        self.0
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        format!("always {}", self.0)
    }
}

/// The controller's life total compares against a threshold.
#[derive(Debug, Clone, Copy)]
pub struct LifeThresholdCondition {
    pub at_most: bool,
    pub threshold: i32,
}

impl LifeThresholdCondition {
    /// "if you have N or less life"
    pub fn at_most(threshold: i32) -> Self {
        Self {
            at_most: true,
            threshold,
        }
    }

    /// "if you have N or more life"
    pub fn at_least(threshold: i32) -> Self {
        Self {
            at_most: false,
            threshold,
        }
    }
}

impl Condition for LifeThresholdCondition {
    fn check(&self, game: &GameState, _source: ObjectId, controller: PlayerId) -> bool {
        let Some(player) = game.player(controller) else {
            return false;
        };
        if self.at_most {
            player.life <= self.threshold
        } else {
            player.life >= self.threshold
        }
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        if self.at_most {
            format!("you have {} or less life", self.threshold)
        } else {
            format!("you have {} or more life", self.threshold)
        }
    }
}

/// The controller controls a permanent of the given type.
#[derive(Debug, Clone, Copy)]
pub struct ControlsTypeCondition(pub CardType);

impl Condition for ControlsTypeCondition {
    fn check(&self, game: &GameState, _source: ObjectId, controller: PlayerId) -> bool {
        game.battlefield.iter().any(|&id| {
            game.object(id)
                .is_some_and(|o| o.controller == controller && o.has_type(self.0))
        })
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        format!("you control a {:?}", self.0)
    }
}

/// The source permanent is tapped.
#[derive(Debug, Clone, Copy)]
pub struct SourceTappedCondition;

impl Condition for SourceTappedCondition {
    fn check(&self, game: &GameState, source: ObjectId, _controller: PlayerId) -> bool {
        game.object(source).is_some_and(|o| o.tapped)
    }

    fn clone_box(&self) -> Box<dyn Condition> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        "this permanent is tapped".to_string()
    }
}
