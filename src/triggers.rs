//! Triggered-ability detection and ordering.
//!
//! After the pipeline commits an event, every object whose watch zone covers
//! its current zone is scanned for triggered abilities matching the event.
//! Abilities present on battlefield objects are taken from the calculated
//! characteristics, so a granted or stripped trigger behaves correctly.
//! Detected triggers are ordered APNAP: the active player's triggers go on
//! the stack first, then each other player's in seating order, with every
//! player ordering their own simultaneous triggers through their decision
//! maker.
//!
//! "Dies" triggers match through last-known information: the event names the
//! battlefield incarnation that no longer exists, and matchers compare stable
//! ids against the snapshot taken when it left.

use std::fmt::Debug;

use crate::ability::{Ability, AbilityKind};
use crate::decision::DecisionMaker;
use crate::event::{EventKind, GameEvent};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::zone::Zone;

/// Who owns the trigger being tested.
#[derive(Debug, Clone, Copy)]
pub struct TriggerContext {
    pub source: ObjectId,
    pub controller: PlayerId,
}

/// Decides whether a triggered ability fires for a committed event.
pub trait TriggerMatcher: Debug + Send + Sync {
    fn matches(&self, event: &GameEvent, game: &GameState, ctx: &TriggerContext) -> bool;

    /// "Whenever a creature dies" style display text.
    fn display(&self) -> String;

    fn clone_box(&self) -> Box<dyn TriggerMatcher>;
}

impl Clone for Box<dyn TriggerMatcher> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl PartialEq for Box<dyn TriggerMatcher> {
    fn eq(&self, other: &Self) -> bool {
        self.display() == other.display()
    }
}

/// The trigger half of a triggered ability: the event kinds it listens for
/// and the matcher refining them.
#[derive(Debug, Clone)]
pub struct TriggerSpec {
    pub kinds: Vec<EventKind>,
    pub matcher: Box<dyn TriggerMatcher>,
}

impl TriggerSpec {
    pub fn new(kinds: Vec<EventKind>, matcher: impl TriggerMatcher + 'static) -> Self {
        Self {
            kinds,
            matcher: Box::new(matcher),
        }
    }

    /// Cheap kind filter, checked before the matcher runs.
    pub fn check_event_type(&self, event: &GameEvent) -> bool {
        self.kinds.contains(&event.kind)
    }

    pub fn check_trigger(&self, event: &GameEvent, game: &GameState, ctx: &TriggerContext) -> bool {
        self.check_event_type(event) && self.matcher.matches(event, game, ctx)
    }
}

/// A detected trigger waiting to be put on the stack.
#[derive(Debug, Clone)]
pub struct TriggeredEntry {
    pub ability: Ability,
    pub source: ObjectId,
    pub controller: PlayerId,
    /// The event that set it off, for effects that read it.
    pub event: GameEvent,
}

impl TriggeredEntry {
    pub fn display(&self) -> String {
        self.ability.text.clone()
    }
}

/// Scan the game for triggered abilities matching a committed event, in
/// object-id order. The result is unordered with respect to players; see
/// `order_apnap`.
pub fn check_triggers(game: &GameState, event: &GameEvent) -> Vec<TriggeredEntry> {
    let mut found = Vec::new();

    for object in game.objects_in_order() {
        // Battlefield objects use their calculated abilities so continuous
        // effects that add or strip triggers are honored.
        let abilities = if object.zone == Zone::Battlefield {
            game.calculated_characteristics(object.id)
                .map(|c| c.abilities)
                .unwrap_or_else(|| object.abilities.clone())
        } else {
            object.abilities.clone()
        };

        for ability in &abilities {
            let AbilityKind::Triggered(spec) = &ability.kind else {
                continue;
            };
            if !ability.watch_zone.matches(object.zone) {
                continue;
            }
            let ctx = TriggerContext {
                source: object.id,
                controller: object.controller,
            };
            if !spec.check_trigger(event, game, &ctx) {
                continue;
            }
            // Intervening "if" clause, checked at trigger time and again at
            // resolution.
            if let Some(condition) = &ability.condition
                && !condition.check(game, object.id, object.controller)
            {
                continue;
            }
            found.push(TriggeredEntry {
                ability: ability.clone(),
                source: object.id,
                controller: object.controller,
                event: event.clone(),
            });
        }
    }

    found
}

/// Order detected triggers APNAP: the active player's triggers are stacked
/// first, then each other player's in seating order. Each player orders their
/// own simultaneous triggers. The returned order is stacking order, so the
/// last entry resolves first.
pub fn order_apnap(
    game: &GameState,
    entries: Vec<TriggeredEntry>,
    decisions: &mut dyn DecisionMaker,
) -> Vec<TriggeredEntry> {
    if entries.len() <= 1 {
        return entries;
    }

    let mut ordered = Vec::with_capacity(entries.len());
    for player in game.players_apnap() {
        let mine: Vec<TriggeredEntry> = entries
            .iter()
            .filter(|e| e.controller == player)
            .cloned()
            .collect();
        if mine.is_empty() {
            continue;
        }
        let texts: Vec<String> = mine.iter().map(|e| e.display()).collect();
        let order = decisions.order_triggers(player, &texts);
        debug_assert_eq!(order.len(), mine.len());
        for index in order {
            ordered.push(mine[index].clone());
        }
    }
    ordered
}

/// Matches this object entering the battlefield.
#[derive(Debug, Clone, Copy)]
pub struct ThisEntersBattlefield;

impl TriggerMatcher for ThisEntersBattlefield {
    fn matches(&self, event: &GameEvent, _game: &GameState, ctx: &TriggerContext) -> bool {
        let entered = match event.kind {
            EventKind::EnterBattlefield => true,
            EventKind::ZoneChange => event.to_zone == Some(Zone::Battlefield),
            _ => false,
        };
        entered && event.target_object() == Some(ctx.source)
    }

    fn display(&self) -> String {
        "when this permanent enters the battlefield".to_string()
    }

    fn clone_box(&self) -> Box<dyn TriggerMatcher> {
        Box::new(*self)
    }
}

impl ThisEntersBattlefield {
    pub fn spec() -> TriggerSpec {
        TriggerSpec::new(
            vec![EventKind::EnterBattlefield, EventKind::ZoneChange],
            ThisEntersBattlefield,
        )
    }
}

/// Matches this object dying (battlefield to graveyard), through last-known
/// information. Pair with `WatchZone::Graveyard` so the graveyard incarnation
/// is scanned.
#[derive(Debug, Clone, Copy)]
pub struct ThisDies;

impl TriggerMatcher for ThisDies {
    fn matches(&self, event: &GameEvent, game: &GameState, ctx: &TriggerContext) -> bool {
        if event.kind != EventKind::ZoneChange
            || event.from_zone != Some(Zone::Battlefield)
            || event.to_zone != Some(Zone::Graveyard)
        {
            return false;
        }
        let Some(died) = event.target_object() else {
            return false;
        };
        // The event names the battlefield incarnation; compare stable ids.
        let Some(snapshot) = game.last_known(died) else {
            return false;
        };
        game.object(ctx.source)
            .is_some_and(|o| o.stable_id == snapshot.stable_id)
    }

    fn display(&self) -> String {
        "when this creature dies".to_string()
    }

    fn clone_box(&self) -> Box<dyn TriggerMatcher> {
        Box::new(*self)
    }
}

impl ThisDies {
    pub fn spec() -> TriggerSpec {
        TriggerSpec::new(vec![EventKind::ZoneChange], ThisDies)
    }
}

/// Matches any creature dying, judged from its last-known information.
#[derive(Debug, Clone, Copy)]
pub struct CreatureDies;

impl TriggerMatcher for CreatureDies {
    fn matches(&self, event: &GameEvent, game: &GameState, _ctx: &TriggerContext) -> bool {
        if event.kind != EventKind::ZoneChange
            || event.from_zone != Some(Zone::Battlefield)
            || event.to_zone != Some(Zone::Graveyard)
        {
            return false;
        }
        event
            .target_object()
            .and_then(|died| game.last_known(died))
            .is_some_and(|snapshot| snapshot.is_creature())
    }

    fn display(&self) -> String {
        "whenever a creature dies".to_string()
    }

    fn clone_box(&self) -> Box<dyn TriggerMatcher> {
        Box::new(*self)
    }
}

impl CreatureDies {
    pub fn spec() -> TriggerSpec {
        TriggerSpec::new(vec![EventKind::ZoneChange], CreatureDies)
    }
}

/// Matches damage dealt to the trigger's controller.
#[derive(Debug, Clone, Copy)]
pub struct ControllerDamaged;

impl TriggerMatcher for ControllerDamaged {
    fn matches(&self, event: &GameEvent, _game: &GameState, ctx: &TriggerContext) -> bool {
        event.kind == EventKind::Damage
            && event.amount > 0
            && event.target_player() == Some(ctx.controller)
    }

    fn display(&self) -> String {
        "whenever you are dealt damage".to_string()
    }

    fn clone_box(&self) -> Box<dyn TriggerMatcher> {
        Box::new(*self)
    }
}

impl ControllerDamaged {
    pub fn spec() -> TriggerSpec {
        TriggerSpec::new(vec![EventKind::Damage], ControllerDamaged)
    }
}

/// Matches the beginning of a turn; optionally only the controller's own.
#[derive(Debug, Clone, Copy)]
pub struct TurnBegins {
    pub only_yours: bool,
}

impl TriggerMatcher for TurnBegins {
    fn matches(&self, event: &GameEvent, _game: &GameState, ctx: &TriggerContext) -> bool {
        event.kind == EventKind::TurnBegan
            && (!self.only_yours || event.player == Some(ctx.controller))
    }

    fn display(&self) -> String {
        if self.only_yours {
            "at the beginning of your turn".to_string()
        } else {
            "at the beginning of each turn".to_string()
        }
    }

    fn clone_box(&self) -> Box<dyn TriggerMatcher> {
        Box::new(*self)
    }
}

impl TurnBegins {
    pub fn spec(only_yours: bool) -> TriggerSpec {
        TriggerSpec::new(vec![EventKind::TurnBegan], TurnBegins { only_yours })
    }
}

/// Matches the trigger's controller gaining life.
#[derive(Debug, Clone, Copy)]
pub struct ControllerGainsLife;

impl TriggerMatcher for ControllerGainsLife {
    fn matches(&self, event: &GameEvent, _game: &GameState, ctx: &TriggerContext) -> bool {
        event.kind == EventKind::GainLife
            && event.amount > 0
            && event.player == Some(ctx.controller)
    }

    fn display(&self) -> String {
        "whenever you gain life".to_string()
    }

    fn clone_box(&self) -> Box<dyn TriggerMatcher> {
        Box::new(*self)
    }
}

impl ControllerGainsLife {
    pub fn spec() -> TriggerSpec {
        TriggerSpec::new(vec![EventKind::GainLife], ControllerGainsLife)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::AutoDecisionMaker;
    use crate::effect::Effect;
    use crate::effects::GainLifeEffect;
    use crate::object::Object;
    use crate::types::CardType;
    use crate::zone::WatchZone;

    fn etb_gain_life() -> Ability {
        Ability::triggered(
            ThisEntersBattlefield::spec(),
            vec![Effect::one_shot(GainLifeEffect { amount: 1 })],
            "when this enters, you gain 1 life",
        )
    }

    #[test]
    fn test_etb_trigger_detected_for_its_own_entry() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let angel = game.add_object(
            Object::permanent("Angel", ada)
                .with_types(&[CardType::Creature])
                .with_ability(etb_gain_life()),
        );
        let other = game.add_object(Object::permanent("Bystander", ada));

        let event = GameEvent::zone_change(angel, Zone::Hand, Zone::Battlefield);
        let found = check_triggers(&game, &event);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, angel);

        let event = GameEvent::zone_change(other, Zone::Hand, Zone::Battlefield);
        assert!(check_triggers(&game, &event).is_empty());
    }

    #[test]
    fn test_granted_trigger_is_detected() {
        use crate::continuous::{Affected, ContinuousEffect, Duration, Modification};
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bear = game.add_object(
            Object::permanent("Bear", ada)
                .with_types(&[CardType::Creature])
                .with_pt(2, 2),
        );
        let trigger = Ability::triggered(
            TurnBegins::spec(false),
            vec![Effect::one_shot(GainLifeEffect { amount: 1 })],
            "at the beginning of each turn, you gain 1 life",
        )
        .bound_to(bear, ada);
        game.continuous_effects.register(ContinuousEffect::new(
            bear,
            ada,
            Affected::Object(bear),
            Modification::AddAbility(trigger),
            Duration::EndOfGame,
        ));

        let event = GameEvent::turn_began(ada, game.turn.turn_number);
        let found = check_triggers(&game, &event);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].source, bear);
    }

    #[test]
    fn test_apnap_puts_active_players_triggers_first() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bo = game.players[1].id;
        let ability = Ability::triggered(
            TurnBegins::spec(false),
            vec![Effect::one_shot(GainLifeEffect { amount: 1 })],
            "at the beginning of each turn, you gain 1 life",
        );
        game.add_object(
            Object::permanent("Ada's idol", ada).with_ability(ability.copy_instance()),
        );
        game.add_object(Object::permanent("Bo's idol", bo).with_ability(ability));

        // Bo is the active player: Bo's trigger stacks first.
        game.turn.active_player = bo;
        let event = GameEvent::turn_began(bo, game.turn.turn_number);
        let found = check_triggers(&game, &event);
        assert_eq!(found.len(), 2);

        let mut auto = AutoDecisionMaker;
        let ordered = order_apnap(&game, found, &mut auto);
        assert_eq!(ordered[0].controller, bo);
        assert_eq!(ordered[1].controller, ada);
    }

    #[test]
    fn test_dies_trigger_via_last_known_information() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let martyr = game.add_object(
            Object::permanent("Martyr", ada)
                .with_types(&[CardType::Creature])
                .with_pt(1, 1)
                .with_ability(
                    Ability::triggered(
                        ThisDies::spec(),
                        vec![Effect::one_shot(GainLifeEffect { amount: 2 })],
                        "when this creature dies, you gain 2 life",
                    )
                    .with_watch_zone(WatchZone::Graveyard),
                ),
        );

        // Committing the move records last-known information and reincarnates
        // the card in the graveyard.
        let outcome = game.handle_event(GameEvent::zone_change(
            martyr,
            Zone::Battlefield,
            Zone::Graveyard,
        ));
        assert!(outcome.committed());
        // The trigger resolved off the stack and gained the life.
        game.resolve_stack();
        assert_eq!(game.player(ada).unwrap().life, 22);
    }
}
