//! Replacement effects.
//!
//! A replacement effect intercepts a proposed event before it is committed
//! and prevents it, modifies it, or swaps it for a different event. The
//! pipeline consults the manager while chaining replacements; each effect
//! applies at most once per event, enforced through the event's
//! applied-effects ledger.

use std::collections::HashSet;
use std::fmt::Debug;

use crate::continuous::Duration;
use crate::event::{EventKind, EventTarget, GameEvent};
use crate::game_state::GameState;
use crate::ids::{EffectId, ObjectId, PlayerId};
use crate::zone::Zone;

/// Decides whether a replacement effect applies to a proposed event.
pub trait ReplacementMatcher: Debug + Send + Sync {
    fn matches(&self, event: &GameEvent, game: &GameState) -> bool;

    fn clone_box(&self) -> Box<dyn ReplacementMatcher>;
}

impl Clone for Box<dyn ReplacementMatcher> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// What happens instead.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplacementAction {
    /// The event does not happen at all.
    Prevent,
    /// The event happens with its amount changed.
    Modify(EventModification),
    /// A zone-change event proceeds to a different destination.
    ChangeDestination(Zone),
    /// The event happens to a different target.
    Redirect(EventTarget),
}

/// Amount rewrites for `ReplacementAction::Modify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventModification {
    Multiply(u32),
    Add(i32),
    Subtract(u32),
    SetTo(u32),
}

impl EventModification {
    pub fn apply(&self, amount: i32) -> i32 {
        match self {
            EventModification::Multiply(factor) => amount.saturating_mul(*factor as i32),
            EventModification::Add(delta) => amount.saturating_add(*delta),
            EventModification::Subtract(delta) => (amount - *delta as i32).max(0),
            EventModification::SetTo(value) => *value as i32,
        }
    }
}

/// One registered replacement effect.
#[derive(Debug, Clone)]
pub struct ReplacementEffect {
    pub id: EffectId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub matcher: Box<dyn ReplacementMatcher>,
    pub action: ReplacementAction,
    /// Self-replacements (the effect's own source modifying how its own
    /// event happens) apply before all others, without a player choice.
    pub self_replacement: bool,
    pub duration: Duration,
}

impl ReplacementEffect {
    pub fn new(
        source: ObjectId,
        controller: PlayerId,
        matcher: Box<dyn ReplacementMatcher>,
        action: ReplacementAction,
    ) -> Self {
        Self {
            id: EffectId::new(),
            source,
            controller,
            matcher,
            action,
            self_replacement: false,
            duration: Duration::WhileSourceOnBattlefield,
        }
    }

    pub fn self_replacing(mut self) -> Self {
        self.self_replacement = true;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Whether this effect applies to `event` right now. An effect never
    /// applies twice to the same event chain.
    pub fn applies_to(&self, event: &GameEvent, game: &GameState) -> bool {
        !event.was_replaced_by(self.id) && self.matcher.matches(event, game)
    }

    /// Produce the replacement event, or `None` if the event is prevented.
    /// The result carries the applied-effects ledger forward, extended with
    /// this effect's id.
    pub fn apply(&self, event: &GameEvent) -> Option<GameEvent> {
        let replacement = match &self.action {
            ReplacementAction::Prevent => return None,
            ReplacementAction::Modify(modification) => {
                let mut replaced = event.clone();
                replaced.amount = modification.apply(event.amount);
                replaced
            }
            ReplacementAction::ChangeDestination(zone) => {
                let mut replaced = event.clone();
                replaced.to_zone = Some(*zone);
                replaced
            }
            ReplacementAction::Redirect(target) => {
                let mut replaced = event.clone();
                replaced.target = Some(*target);
                replaced
            }
        };
        Some(event.replaced_with(replacement, self.id))
    }

    pub fn is_expired(&self, game: &GameState) -> bool {
        match self.duration {
            Duration::EndOfTurn { created_turn } => game.turn.turn_number > created_turn,
            Duration::WhileSourceOnBattlefield => !game
                .object(self.source)
                .is_some_and(|o| o.zone == Zone::Battlefield),
            Duration::EndOfGame => false,
        }
    }
}

/// All replacement effects registered for one game.
#[derive(Debug, Clone, Default)]
pub struct ReplacementEffectManager {
    effects: Vec<ReplacementEffect>,
    one_shot: HashSet<EffectId>,
}

impl ReplacementEffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, effect: ReplacementEffect) -> EffectId {
        let id = effect.id;
        self.effects.push(effect);
        id
    }

    /// Register an effect that is consumed by its first application.
    pub fn register_one_shot(&mut self, effect: ReplacementEffect) -> EffectId {
        let id = self.register(effect);
        self.one_shot.insert(id);
        id
    }

    pub fn effects(&self) -> &[ReplacementEffect] {
        &self.effects
    }

    pub fn remove(&mut self, id: EffectId) {
        self.effects.retain(|e| e.id != id);
        self.one_shot.remove(&id);
    }

    pub fn remove_from_source(&mut self, source: ObjectId) {
        let removed: Vec<EffectId> = self
            .effects
            .iter()
            .filter(|e| e.source == source)
            .map(|e| e.id)
            .collect();
        for id in removed {
            self.remove(id);
        }
    }

    /// Effects applicable to `event`, self-replacements first.
    pub fn applicable(&self, event: &GameEvent, game: &GameState) -> Vec<&ReplacementEffect> {
        let mut found: Vec<&ReplacementEffect> = self
            .effects
            .iter()
            .filter(|e| e.applies_to(event, game))
            .collect();
        found.sort_by_key(|e| !e.self_replacement);
        found
    }

    /// Consume a one-shot effect after it has been applied.
    pub fn mark_applied(&mut self, id: EffectId) {
        if self.one_shot.remove(&id) {
            self.effects.retain(|e| e.id != id);
        }
    }

    /// Ids of effects whose duration has run out.
    pub fn expired(&self, game: &GameState) -> Vec<EffectId> {
        self.effects
            .iter()
            .filter(|e| e.is_expired(game))
            .map(|e| e.id)
            .collect()
    }

    pub fn discard(&mut self, ids: &[EffectId]) {
        for &id in ids {
            self.remove(id);
        }
    }
}

/// Matches any proposed event of one kind.
#[derive(Debug, Clone, Copy)]
pub struct KindMatcher(pub EventKind);

impl ReplacementMatcher for KindMatcher {
    fn matches(&self, event: &GameEvent, _game: &GameState) -> bool {
        event.kind == self.0
    }

    fn clone_box(&self) -> Box<dyn ReplacementMatcher> {
        Box::new(*self)
    }
}

/// Matches damage that would be dealt to a specific player.
#[derive(Debug, Clone, Copy)]
pub struct DamageToPlayerMatcher(pub PlayerId);

impl ReplacementMatcher for DamageToPlayerMatcher {
    fn matches(&self, event: &GameEvent, _game: &GameState) -> bool {
        matches!(event.kind, EventKind::Damage)
            && event.target_player() == Some(self.0)
            && event.amount > 0
    }

    fn clone_box(&self) -> Box<dyn ReplacementMatcher> {
        Box::new(*self)
    }
}

/// Matches life gain by a specific player.
#[derive(Debug, Clone, Copy)]
pub struct WouldGainLifeMatcher(pub PlayerId);

impl ReplacementMatcher for WouldGainLifeMatcher {
    fn matches(&self, event: &GameEvent, _game: &GameState) -> bool {
        event.kind == EventKind::GainLife && event.player == Some(self.0) && event.amount > 0
    }

    fn clone_box(&self) -> Box<dyn ReplacementMatcher> {
        Box::new(*self)
    }
}

/// Matches a zone change that would put a specific object into a graveyard
/// from the battlefield.
#[derive(Debug, Clone, Copy)]
pub struct ThisWouldDieMatcher(pub ObjectId);

impl ReplacementMatcher for ThisWouldDieMatcher {
    fn matches(&self, event: &GameEvent, _game: &GameState) -> bool {
        event.kind == EventKind::ZoneChange
            && event.target_object() == Some(self.0)
            && event.from_zone == Some(Zone::Battlefield)
            && event.to_zone == Some(Zone::Graveyard)
    }

    fn clone_box(&self) -> Box<dyn ReplacementMatcher> {
        Box::new(*self)
    }
}

/// Matches a draw by a specific player.
#[derive(Debug, Clone, Copy)]
pub struct WouldDrawMatcher(pub PlayerId);

impl ReplacementMatcher for WouldDrawMatcher {
    fn matches(&self, event: &GameEvent, _game: &GameState) -> bool {
        event.kind == EventKind::Draw && event.player == Some(self.0)
    }

    fn clone_box(&self) -> Box<dyn ReplacementMatcher> {
        Box::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;
    use crate::types::CardType;

    #[test]
    fn test_effect_never_applies_twice_to_one_chain() {
        let mut game = GameState::two_players("Ada", "Bo");
        let bo = game.players[1].id;
        let shield = game.add_object(Object::permanent("Shield", bo));

        let effect = ReplacementEffect::new(
            shield,
            bo,
            Box::new(DamageToPlayerMatcher(bo)),
            ReplacementAction::Modify(EventModification::Subtract(1)),
        );

        let event = GameEvent::damage(None, EventTarget::Player(bo), 3, false);
        assert!(effect.applies_to(&event, &game));

        let replaced = effect.apply(&event).unwrap();
        assert_eq!(replaced.amount, 2);
        assert!(replaced.was_replaced_by(effect.id));
        assert!(!effect.applies_to(&replaced, &game));
    }

    #[test]
    fn test_prevent_drops_the_event() {
        let game = GameState::two_players("Ada", "Bo");
        let bo = game.players[1].id;
        let effect = ReplacementEffect::new(
            ObjectId::new(),
            bo,
            Box::new(WouldGainLifeMatcher(bo)),
            ReplacementAction::Prevent,
        );
        let event = GameEvent::gain_life(bo, 4);
        assert!(effect.applies_to(&event, &game));
        assert!(effect.apply(&event).is_none());
    }

    #[test]
    fn test_self_replacements_sort_first() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bear = game.add_object(
            Object::permanent("Bear", ada).with_types(&[CardType::Creature]),
        );

        let mut manager = ReplacementEffectManager::new();
        manager.register(ReplacementEffect::new(
            bear,
            ada,
            Box::new(ThisWouldDieMatcher(bear)),
            ReplacementAction::ChangeDestination(Zone::Exile),
        ));
        let self_id = manager.register(
            ReplacementEffect::new(
                bear,
                ada,
                Box::new(ThisWouldDieMatcher(bear)),
                ReplacementAction::ChangeDestination(Zone::Hand),
            )
            .self_replacing(),
        );

        let event = GameEvent::zone_change(bear, Zone::Battlefield, Zone::Graveyard);
        let applicable = manager.applicable(&event, &game);
        assert_eq!(applicable.len(), 2);
        assert_eq!(applicable[0].id, self_id);
    }

    #[test]
    fn test_one_shot_consumed_after_application() {
        let game = GameState::two_players("Ada", "Bo");
        let bo = game.players[1].id;
        let mut manager = ReplacementEffectManager::new();
        let id = manager.register_one_shot(ReplacementEffect::new(
            ObjectId::new(),
            bo,
            Box::new(DamageToPlayerMatcher(bo)),
            ReplacementAction::Prevent,
        ));

        let event = GameEvent::damage(None, EventTarget::Player(bo), 2, false);
        assert_eq!(manager.applicable(&event, &game).len(), 1);
        manager.mark_applied(id);
        assert!(manager.applicable(&event, &game).is_empty());
    }
}
