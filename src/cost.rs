//! Costs: payable requirements with a two-phase contract.
//!
//! Every cost supports a non-mutating `can_pay` check and a mutating `pay`
//! that returns an undo receipt. The activation driver pays a `TotalCost`
//! component by component; if any component fails, the receipts for already
//! paid components are undone in reverse order, guaranteeing all-or-nothing
//! activation.

use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::mana::{ManaCost, ManaSymbol};
use crate::object::Object;
use crate::types::CardType;
use crate::zone::Zone;

/// Why a cost payment failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CostError {
    /// Not enough mana in the payer's pool.
    InsufficientMana,
    /// The source is already tapped (or not on the battlefield).
    CannotTap,
    /// Paying the life cost would require more life than is allowed.
    InsufficientLife,
    /// No permanent satisfies the sacrifice requirement.
    NothingToSacrifice,
    /// Referenced player does not exist.
    PlayerNotFound(PlayerId),
    /// Referenced object does not exist.
    ObjectNotFound(ObjectId),
}

impl std::fmt::Display for CostError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostError::InsufficientMana => write!(f, "not enough mana"),
            CostError::CannotTap => write!(f, "cannot tap this permanent"),
            CostError::InsufficientLife => write!(f, "not enough life"),
            CostError::NothingToSacrifice => write!(f, "nothing to sacrifice"),
            CostError::PlayerNotFound(id) => write!(f, "player {:?} not found", id),
            CostError::ObjectNotFound(id) => write!(f, "object {:?} not found", id),
        }
    }
}

impl std::error::Error for CostError {}

/// A single payable requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cost {
    /// Pay mana from the payer's pool.
    Mana(ManaCost),
    /// Tap the source permanent.
    Tap,
    /// Pay life.
    PayLife(u32),
    /// Sacrifice the source permanent.
    SacrificeSource,
    /// Sacrifice a permanent the payer controls with the given type. The
    /// oldest matching permanent is taken, keeping payment deterministic.
    Sacrifice(CardType),
}

/// Undo receipt for one paid cost component.
///
/// `undo` restores exactly what `pay` took; receipts are consumed in reverse
/// payment order during rollback.
#[derive(Debug)]
pub enum PaidCost {
    Mana {
        payer: PlayerId,
        spent: Vec<ManaSymbol>,
    },
    Tapped {
        object: ObjectId,
    },
    LifePaid {
        payer: PlayerId,
        amount: u32,
    },
    Sacrificed {
        /// The battlefield incarnation, as it was before the sacrifice.
        original: Object,
        /// The graveyard incarnation created by the sacrifice.
        replacement: ObjectId,
    },
}

impl PaidCost {
    /// Reverse this payment.
    pub fn undo(self, game: &mut GameState) {
        match self {
            PaidCost::Mana { payer, spent } => {
                if let Some(player) = game.player_mut(payer) {
                    player.mana_pool.refund(spent);
                }
            }
            PaidCost::Tapped { object } => {
                if let Some(object) = game.object_mut(object) {
                    object.tapped = false;
                }
            }
            PaidCost::LifePaid { payer, amount } => {
                if let Some(player) = game.player_mut(payer) {
                    player.life += amount as i32;
                }
            }
            PaidCost::Sacrificed {
                original,
                replacement,
            } => {
                game.remove_object(replacement);
                game.insert_object(original);
            }
        }
    }
}

impl Cost {
    /// Check whether this cost could be paid right now. Non-mutating.
    pub fn can_pay(&self, game: &GameState, source: ObjectId, payer: PlayerId) -> bool {
        match self {
            Cost::Mana(mana) => game
                .player(payer)
                .is_some_and(|p| p.mana_pool.can_pay(mana)),
            Cost::Tap => game
                .object(source)
                .is_some_and(|o| o.zone == Zone::Battlefield && !o.tapped),
            Cost::PayLife(amount) => game
                .player(payer)
                .is_some_and(|p| p.life >= *amount as i32),
            Cost::SacrificeSource => game
                .object(source)
                .is_some_and(|o| o.zone == Zone::Battlefield),
            Cost::Sacrifice(card_type) => game.battlefield.iter().any(|&id| {
                game.object(id)
                    .is_some_and(|o| o.controller == payer && o.has_type(*card_type))
            }),
        }
    }

    /// Pay this cost, returning an undo receipt.
    pub fn pay(
        &self,
        game: &mut GameState,
        source: ObjectId,
        payer: PlayerId,
    ) -> Result<PaidCost, CostError> {
        match self {
            Cost::Mana(mana) => {
                let player = game.player_mut(payer).ok_or(CostError::PlayerNotFound(payer))?;
                let spent = player.mana_pool.pay(mana).ok_or(CostError::InsufficientMana)?;
                Ok(PaidCost::Mana { payer, spent })
            }
            Cost::Tap => {
                let object = game.object_mut(source).ok_or(CostError::ObjectNotFound(source))?;
                if object.zone != Zone::Battlefield || object.tapped {
                    return Err(CostError::CannotTap);
                }
                object.tapped = true;
                Ok(PaidCost::Tapped { object: source })
            }
            Cost::PayLife(amount) => {
                let player = game.player_mut(payer).ok_or(CostError::PlayerNotFound(payer))?;
                if player.life < *amount as i32 {
                    return Err(CostError::InsufficientLife);
                }
                player.life -= *amount as i32;
                Ok(PaidCost::LifePaid {
                    payer,
                    amount: *amount,
                })
            }
            Cost::SacrificeSource => {
                let original = game
                    .object(source)
                    .filter(|o| o.zone == Zone::Battlefield)
                    .cloned()
                    .ok_or(CostError::NothingToSacrifice)?;
                let replacement = game
                    .move_object(source, Zone::Graveyard)
                    .ok_or(CostError::ObjectNotFound(source))?;
                Ok(PaidCost::Sacrificed {
                    original,
                    replacement,
                })
            }
            Cost::Sacrifice(card_type) => {
                let victim = game
                    .battlefield
                    .iter()
                    .copied()
                    .find(|&id| {
                        game.object(id)
                            .is_some_and(|o| o.controller == payer && o.has_type(*card_type))
                    })
                    .ok_or(CostError::NothingToSacrifice)?;
                let original = game
                    .object(victim)
                    .cloned()
                    .ok_or(CostError::ObjectNotFound(victim))?;
                let replacement = game
                    .move_object(victim, Zone::Graveyard)
                    .ok_or(CostError::ObjectNotFound(victim))?;
                Ok(PaidCost::Sacrificed {
                    original,
                    replacement,
                })
            }
        }
    }

    /// Human-readable display for the game log.
    pub fn display(&self) -> String {
        match self {
            Cost::Mana(mana) => format!("pay {} mana", mana.converted()),
            Cost::Tap => "tap".to_string(),
            Cost::PayLife(amount) => format!("pay {} life", amount),
            Cost::SacrificeSource => "sacrifice this permanent".to_string(),
            Cost::Sacrifice(card_type) => format!("sacrifice a {:?}", card_type),
        }
    }

    /// Whether this component requires a sacrifice of a permanent of the
    /// given type (used by restriction checks).
    pub fn sacrifices_type(&self, game: &GameState, source: ObjectId, card_type: CardType) -> bool {
        match self {
            Cost::SacrificeSource => {
                game.object(source).is_some_and(|o| o.has_type(card_type))
            }
            Cost::Sacrifice(sacrificed) => *sacrificed == card_type,
            _ => false,
        }
    }
}

/// A complete cost: a conjunction of components that must all be paid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TotalCost {
    costs: Vec<Cost>,
}

impl TotalCost {
    /// An empty (free) cost.
    pub fn free() -> Self {
        Self::default()
    }

    pub fn from_cost(cost: Cost) -> Self {
        Self { costs: vec![cost] }
    }

    pub fn from_costs(costs: Vec<Cost>) -> Self {
        Self { costs }
    }

    /// A mana-only cost.
    pub fn mana(mana: ManaCost) -> Self {
        Self::from_cost(Cost::Mana(mana))
    }

    pub fn costs(&self) -> &[Cost] {
        &self.costs
    }

    pub fn is_free(&self) -> bool {
        self.costs.is_empty()
    }

    /// Add a component.
    pub fn and(mut self, cost: Cost) -> Self {
        self.costs.push(cost);
        self
    }

    /// Dry-run payability of every component. Non-mutating. Components are
    /// checked independently, so a pool that covers each component alone but
    /// not their sum can pass here and still fail at `pay`; the rollback in
    /// `pay` keeps that harmless.
    pub fn can_pay(&self, game: &GameState, source: ObjectId, payer: PlayerId) -> bool {
        self.costs.iter().all(|c| c.can_pay(game, source, payer))
    }

    /// Pay every component in order. On any failure, already paid components
    /// are undone in reverse order and the error is returned.
    pub fn pay(
        &self,
        game: &mut GameState,
        source: ObjectId,
        payer: PlayerId,
    ) -> Result<Vec<PaidCost>, CostError> {
        let mut receipts = Vec::with_capacity(self.costs.len());
        for cost in &self.costs {
            match cost.pay(game, source, payer) {
                Ok(receipt) => receipts.push(receipt),
                Err(error) => {
                    while let Some(receipt) = receipts.pop() {
                        receipt.undo(game);
                    }
                    return Err(error);
                }
            }
        }
        Ok(receipts)
    }

    pub fn display(&self) -> String {
        if self.costs.is_empty() {
            return "free".to_string();
        }
        self.costs
            .iter()
            .map(|c| c.display())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl From<ManaCost> for TotalCost {
    fn from(value: ManaCost) -> Self {
        Self::mana(value)
    }
}
