//! Stock one-shot effects.
//!
//! Every mutation here goes through the event pipeline, so replacement
//! effects, watchers, and triggered abilities all see it. Effects read their
//! targets from the resolution context and report `false` when the target is
//! gone or nothing happened.

use crate::effect::{EffectContext, OneShotEffect};
use crate::event::{EventKind, EventTarget, GameEvent};
use crate::game_state::GameState;
use crate::mana::ManaSymbol;
use crate::object::CounterType;
use crate::target::Target;
use crate::zone::Zone;

/// Deal damage to the first target (player or object).
#[derive(Debug, Clone, Copy)]
pub struct DealDamageToTarget {
    pub amount: i32,
}

impl OneShotEffect for DealDamageToTarget {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(target) = ctx.targets.first().copied() else {
            return false;
        };
        let target = match target {
            Target::Player(id) => EventTarget::Player(id),
            Target::Object(id) => EventTarget::Object(id),
        };
        let event = GameEvent::damage(Some(ctx.source), target, self.amount, false);
        game.handle_event(event).committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        format!("deal {} damage to target", self.amount)
    }
}

/// The resolving controller gains life.
#[derive(Debug, Clone, Copy)]
pub struct GainLifeEffect {
    pub amount: i32,
}

impl OneShotEffect for GainLifeEffect {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        game.handle_event(GameEvent::gain_life(ctx.controller, self.amount))
            .committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        format!("gain {} life", self.amount)
    }
}

/// The first player target loses life.
#[derive(Debug, Clone, Copy)]
pub struct LoseLifeTarget {
    pub amount: i32,
}

impl OneShotEffect for LoseLifeTarget {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(player) = ctx.first_player_target() else {
            return false;
        };
        game.handle_event(GameEvent::lose_life(player, self.amount))
            .committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        format!("target player loses {} life", self.amount)
    }
}

/// The resolving controller draws cards, one event per card.
#[derive(Debug, Clone, Copy)]
pub struct DrawCardsEffect {
    pub count: u32,
}

impl OneShotEffect for DrawCardsEffect {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let mut drew = false;
        for _ in 0..self.count {
            if game
                .handle_event(GameEvent::draw(ctx.controller))
                .committed()
            {
                drew = true;
            }
        }
        drew
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        format!("draw {} cards", self.count)
    }
}

/// Put counters on the first object target.
#[derive(Debug, Clone, Copy)]
pub struct PutCountersOnTarget {
    pub counter_type: CounterType,
    pub count: u32,
}

impl OneShotEffect for PutCountersOnTarget {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(target) = ctx.first_object_target() else {
            return false;
        };
        let event = GameEvent::new(EventKind::PutCounters)
            .with_source(ctx.source)
            .with_object_target(target)
            .with_amount(self.count as i32)
            .with_data("counter", format!("{:?}", self.counter_type));
        game.handle_event(event).committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        format!("put {} {:?} counters on target", self.count, self.counter_type)
    }
}

/// Tap the first object target.
#[derive(Debug, Clone, Copy)]
pub struct TapTarget;

impl OneShotEffect for TapTarget {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(target) = ctx.first_object_target() else {
            return false;
        };
        if game.object(target).is_none_or(|o| o.tapped) {
            return false;
        }
        game.handle_event(GameEvent::tap(target)).committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        "tap target permanent".to_string()
    }
}

/// Untap the first object target.
#[derive(Debug, Clone, Copy)]
pub struct UntapTarget;

impl OneShotEffect for UntapTarget {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(target) = ctx.first_object_target() else {
            return false;
        };
        if game.object(target).is_none_or(|o| !o.tapped) {
            return false;
        }
        game.handle_event(GameEvent::untap(target)).committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        "untap target permanent".to_string()
    }
}

/// Destroy the first object target.
#[derive(Debug, Clone, Copy)]
pub struct DestroyTarget;

impl OneShotEffect for DestroyTarget {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(target) = ctx.first_object_target() else {
            return false;
        };
        if game
            .object(target)
            .is_none_or(|o| o.zone != Zone::Battlefield)
        {
            return false;
        }
        let event = GameEvent::new(EventKind::Destroy)
            .with_source(ctx.source)
            .with_object_target(target);
        game.handle_event(event).committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        "destroy target permanent".to_string()
    }
}

/// Return the first object target to its owner's hand.
#[derive(Debug, Clone, Copy)]
pub struct ReturnTargetToHand;

impl OneShotEffect for ReturnTargetToHand {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(target) = ctx.first_object_target() else {
            return false;
        };
        let Some(from) = game.object(target).map(|o| o.zone) else {
            return false;
        };
        game.handle_event(GameEvent::zone_change(target, from, Zone::Hand))
            .committed()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(*self)
    }

    fn display(&self) -> String {
        "return target to its owner's hand".to_string()
    }
}

/// Add mana to the resolving controller's pool. Mana abilities bypass the
/// stack and the event pipeline.
#[derive(Debug, Clone)]
pub struct AddManaEffect {
    pub symbols: Vec<ManaSymbol>,
}

impl OneShotEffect for AddManaEffect {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        let Some(player) = game.player_mut(ctx.controller) else {
            return false;
        };
        for &symbol in &self.symbols {
            player.mana_pool.add(symbol);
        }
        !self.symbols.is_empty()
    }

    fn clone_box(&self) -> Box<dyn OneShotEffect> {
        Box::new(self.clone())
    }

    fn display(&self) -> String {
        format!("add {} mana", self.symbols.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Effect;
    use crate::object::Object;
    use crate::types::CardType;

    #[test]
    fn test_deal_damage_requires_a_target() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let source = game.add_object(Object::permanent("Pinger", ada));
        let ctx = EffectContext::new(source, ada);
        assert!(!DealDamageToTarget { amount: 1 }.apply(&mut game, &ctx));
    }

    #[test]
    fn test_gain_life_goes_through_pipeline() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let source = game.add_object(Object::permanent("Fountain", ada));
        let ctx = EffectContext::new(source, ada);
        assert!(GainLifeEffect { amount: 3 }.apply(&mut game, &ctx));
        assert_eq!(game.player(ada).unwrap().life, 23);
    }

    #[test]
    fn test_pump_registers_until_end_of_turn() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bear = game.add_object(
            Object::permanent("Bear", ada)
                .with_types(&[CardType::Creature])
                .with_pt(2, 2),
        );
        let source = game.add_object(Object::permanent("Coach", ada));
        let ctx = EffectContext::new(source, ada).with_targets(vec![Target::Object(bear)]);
        assert!(Effect::pump_target(2, 2).apply(&mut game, &ctx));
        let c = game.calculated_characteristics(bear).unwrap();
        assert_eq!((c.power, c.toughness), (4, 4));
    }
}
