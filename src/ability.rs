//! Abilities: static, triggered, and activated.
//!
//! An `Ability` carries an original-ability id shared by every copy, and an
//! instance id unique to each copy. Activation legality and commitment are
//! split: `check_legality` is a pure query that never mutates game state, and
//! `commit_activation` performs the activation (pays costs, records the
//! ledger, puts the ability on the stack). `can_activate` is a thin wrapper
//! over `check_legality` for callers that only need a yes or no.

use crate::as_though::AsThoughKind;
use crate::condition::Condition;
use crate::cost::TotalCost;
use crate::effect::{Effect, EffectContext};
use crate::event::GameEvent;
use crate::game_state::GameState;
use crate::ids::{AbilityId, AbilityInstanceId, EffectId, ObjectId, PlayerId};
use crate::log::LogKind;
use crate::pipeline;
use crate::stack::StackEntry;
use crate::target::{Target, TargetSpec};
use crate::triggers::TriggerSpec;
use crate::zone::{WatchZone, Zone};

/// When an activated ability may legally be activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timing {
    /// Any time its activator could act.
    #[default]
    Instant,
    /// Only during the activator's turn with an empty stack.
    Sorcery,
}

/// Who may activate an activated ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MayActivate {
    /// Only the ability's controller (the normal case).
    #[default]
    You,
    /// Any player.
    Any,
    /// Only opponents of the controller.
    Opponent,
    /// Anyone except the controller.
    NotYou,
    /// Every player, each subject to the same limits and costs.
    EachPlayer,
    /// Only the active player.
    Active,
    /// Only the owner of the source object.
    Owner,
    /// Only the controller of the object the source is attached to.
    ControllerAttachedTo,
}

/// The activated-specific half of an ability.
#[derive(Debug, Clone)]
pub struct ActivatedSpec {
    pub cost: TotalCost,
    pub timing: Timing,
    pub may_activate: MayActivate,
    /// Activation cap per turn, if any.
    pub max_per_turn: Option<u32>,
    /// Activation cap per game, if any.
    pub max_per_game: Option<u32>,
    /// Mana abilities resolve immediately instead of using the stack.
    pub is_mana_ability: bool,
}

impl ActivatedSpec {
    pub fn new(cost: TotalCost) -> Self {
        Self {
            cost,
            timing: Timing::Instant,
            may_activate: MayActivate::You,
            max_per_turn: None,
            max_per_game: None,
            is_mana_ability: false,
        }
    }
}

/// What sort of ability this is.
#[derive(Debug, Clone)]
pub enum AbilityKind {
    /// Exists while its source is in the right zone; its effects register as
    /// lasting effects rather than resolving.
    Static,
    Triggered(TriggerSpec),
    Activated(ActivatedSpec),
    /// Player-initiated like an activated ability, but resolves immediately
    /// instead of going on the stack.
    SpecialAction(ActivatedSpec),
}

/// Why an activation is illegal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationError {
    /// The ability is not an activated ability.
    NotActivated,
    /// The source object no longer exists.
    SourceMissing,
    /// The source's calculated abilities no longer include this one.
    AbilityMissing,
    /// A per-turn or per-game activation cap is reached.
    LimitReached,
    /// The "activate only if" condition fails.
    ConditionFailed,
    /// This player may not activate the ability.
    NotAllowedToActivate,
    /// The source is outside the battlefield and no permission covers it.
    WrongZone,
    /// Sorcery-speed timing is not satisfied and nothing relaxes it.
    BadTiming,
    /// The cost cannot be paid.
    CannotPayCosts,
    /// A target requirement has too few legal candidates.
    NoLegalTargets,
    /// The chosen targets do not satisfy the requirements.
    BadTargets,
    /// A replacement effect prevents the activation.
    Vetoed,
}

impl std::fmt::Display for ActivationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ActivationError::NotActivated => "not an activated ability",
            ActivationError::SourceMissing => "source no longer exists",
            ActivationError::AbilityMissing => "ability no longer present on source",
            ActivationError::LimitReached => "activation limit reached",
            ActivationError::ConditionFailed => "activation condition not met",
            ActivationError::NotAllowedToActivate => "this player may not activate it",
            ActivationError::WrongZone => "cannot activate from this zone",
            ActivationError::BadTiming => "cannot activate at this time",
            ActivationError::CannotPayCosts => "cannot pay the cost",
            ActivationError::NoLegalTargets => "not enough legal targets",
            ActivationError::BadTargets => "chosen targets are illegal",
            ActivationError::Vetoed => "a replacement effect prevents it",
        };
        f.write_str(text)
    }
}

impl std::error::Error for ActivationError {}

/// The outcome of a legality check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationStatus {
    Allowed {
        /// As-though effects whose permission the activation relies on.
        approving_effects: Vec<EffectId>,
    },
    Illegal(ActivationError),
}

impl ActivationStatus {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ActivationStatus::Allowed { .. })
    }
}

/// One ability on an object.
#[derive(Debug, Clone)]
pub struct Ability {
    /// Shared by every copy of this ability.
    pub ability_id: AbilityId,
    /// Unique to this copy.
    pub instance_id: AbilityInstanceId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub kind: AbilityKind,
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
    /// "Activate only if" / intervening-if condition.
    pub condition: Option<Box<dyn Condition>>,
    /// For triggered abilities: the zone the source must be in to trigger.
    pub watch_zone: WatchZone,
    pub text: String,
}

/// Abilities compare by original id: every copy of an ability is equal.
impl PartialEq for Ability {
    fn eq(&self, other: &Self) -> bool {
        self.ability_id == other.ability_id
    }
}

impl Ability {
    fn new(kind: AbilityKind, text: &str) -> Self {
        Self {
            ability_id: AbilityId::new(),
            instance_id: AbilityInstanceId::new(),
            source: ObjectId::from_raw(0),
            controller: PlayerId::from_index(0),
            kind,
            targets: Vec::new(),
            effects: Vec::new(),
            condition: None,
            watch_zone: WatchZone::Battlefield,
            text: text.to_string(),
        }
    }

    /// A static ability that only serves as a marker (keyword-style).
    pub fn static_marker(text: &str) -> Self {
        Self::new(AbilityKind::Static, text)
    }

    /// A static ability whose effects register while the source is on the
    /// battlefield.
    pub fn static_ability(effects: Vec<Effect>, text: &str) -> Self {
        let mut ability = Self::new(AbilityKind::Static, text);
        ability.effects = effects;
        ability
    }

    pub fn activated(cost: TotalCost, effects: Vec<Effect>, text: &str) -> Self {
        let mut ability = Self::new(AbilityKind::Activated(ActivatedSpec::new(cost)), text);
        ability.effects = effects;
        ability
    }

    pub fn triggered(spec: TriggerSpec, effects: Vec<Effect>, text: &str) -> Self {
        let mut ability = Self::new(AbilityKind::Triggered(spec), text);
        ability.effects = effects;
        ability
    }

    pub fn special_action(cost: TotalCost, effects: Vec<Effect>, text: &str) -> Self {
        let mut ability = Self::new(AbilityKind::SpecialAction(ActivatedSpec::new(cost)), text);
        ability.effects = effects;
        ability
    }

    pub fn with_targets(mut self, targets: Vec<TargetSpec>) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_condition(mut self, condition: Box<dyn Condition>) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_watch_zone(mut self, zone: WatchZone) -> Self {
        self.watch_zone = zone;
        self
    }

    pub fn sorcery_speed(mut self) -> Self {
        self.activated_spec_mut("sorcery_speed").timing = Timing::Sorcery;
        self
    }

    pub fn mana_ability(mut self) -> Self {
        self.activated_spec_mut("mana_ability").is_mana_ability = true;
        self
    }

    pub fn activatable_by(mut self, who: MayActivate) -> Self {
        self.activated_spec_mut("activatable_by").may_activate = who;
        self
    }

    pub fn limit_per_turn(mut self, max: u32) -> Self {
        self.activated_spec_mut("limit_per_turn").max_per_turn = Some(max);
        self
    }

    pub fn limit_per_game(mut self, max: u32) -> Self {
        self.activated_spec_mut("limit_per_game").max_per_game = Some(max);
        self
    }

    /// Builder misuse is a card-definition bug; panic at construction so the
    /// card's own tests catch it.
    fn activated_spec_mut(&mut self, builder: &str) -> &mut ActivatedSpec {
        match &mut self.kind {
            AbilityKind::Activated(spec) | AbilityKind::SpecialAction(spec) => spec,
            _ => panic!("{builder} called on the non-activated ability {:?}", self.text),
        }
    }

    /// Rebind this ability to a source object and controller. Keeps the
    /// original ability id.
    pub fn bound_to(mut self, source: ObjectId, controller: PlayerId) -> Self {
        self.source = source;
        self.controller = controller;
        self
    }

    /// A fresh copy with its own instance id, sharing the original ability
    /// id. Used when putting a triggered ability on the stack, so later
    /// changes to the source never touch the stacked copy.
    pub fn copy_instance(&self) -> Self {
        let mut copy = self.clone();
        copy.instance_id = AbilityInstanceId::new();
        copy
    }

    pub fn is_activated(&self) -> bool {
        matches!(
            self.kind,
            AbilityKind::Activated(_) | AbilityKind::SpecialAction(_)
        )
    }

    pub fn is_triggered(&self) -> bool {
        matches!(self.kind, AbilityKind::Triggered(_))
    }

    pub fn is_mana_ability(&self) -> bool {
        matches!(&self.kind, AbilityKind::Activated(spec) if spec.is_mana_ability)
    }

    fn activated_spec(&self) -> Option<&ActivatedSpec> {
        match &self.kind {
            AbilityKind::Activated(spec) | AbilityKind::SpecialAction(spec) => Some(spec),
            _ => None,
        }
    }

    /// Pure legality check for activating this ability. Never mutates game
    /// state; replacement vetoes are evaluated in probe mode.
    pub fn check_legality(&self, game: &GameState, activator: PlayerId) -> ActivationStatus {
        let Some(spec) = self.activated_spec() else {
            return ActivationStatus::Illegal(ActivationError::NotActivated);
        };
        let Some(source) = game.object(self.source) else {
            return ActivationStatus::Illegal(ActivationError::SourceMissing);
        };

        // The source's visible abilities, after continuous effects, must
        // still include this one.
        let still_present = game
            .calculated_characteristics(self.source)
            .is_some_and(|c| c.abilities.iter().any(|a| a.ability_id == self.ability_id));
        if !still_present {
            return ActivationStatus::Illegal(ActivationError::AbilityMissing);
        }

        // Activated abilities work from the battlefield; activating from the
        // graveyard or exile needs an as-though permission.
        let mut approving_effects = Vec::new();
        if source.zone != Zone::Battlefield {
            let permission = match source.zone {
                Zone::Graveyard => Some(AsThoughKind::PlayFromGraveyard),
                Zone::Exile => Some(AsThoughKind::PlayFromExile),
                _ => None,
            };
            let approving = permission
                .map(|kind| game.as_though.approving(game, kind, self.source, activator))
                .unwrap_or_default();
            if approving.is_empty() {
                return ActivationStatus::Illegal(ActivationError::WrongZone);
            }
            approving_effects.extend(approving);
        }

        let turn = game.turn.turn_number;
        if let Some(max) = spec.max_per_turn
            && game
                .activations
                .activations_this_turn(self.source, self.ability_id, turn)
                >= max
        {
            return ActivationStatus::Illegal(ActivationError::LimitReached);
        }
        if let Some(max) = spec.max_per_game
            && game.activations.total_activations(self.source, self.ability_id) >= max
        {
            return ActivationStatus::Illegal(ActivationError::LimitReached);
        }

        if let Some(condition) = &self.condition
            && !condition.check(game, self.source, self.controller)
        {
            return ActivationStatus::Illegal(ActivationError::ConditionFailed);
        }

        let allowed_to_activate = match spec.may_activate {
            MayActivate::You => activator == self.controller,
            MayActivate::Any | MayActivate::EachPlayer => true,
            MayActivate::Opponent | MayActivate::NotYou => activator != self.controller,
            MayActivate::Active => activator == game.turn.active_player,
            MayActivate::Owner => activator == source.owner,
            MayActivate::ControllerAttachedTo => source
                .attached_to
                .and_then(|host| game.object(host))
                .is_some_and(|host| host.controller == activator),
        };
        if !allowed_to_activate {
            return ActivationStatus::Illegal(ActivationError::NotAllowedToActivate);
        }

        if spec.timing == Timing::Sorcery {
            let sorcery_window =
                activator == game.turn.active_player && game.stack.is_empty();
            if !sorcery_window {
                let approving = game.as_though.approving(
                    game,
                    AsThoughKind::ActivateAsInstant,
                    self.source,
                    activator,
                );
                if approving.is_empty() {
                    return ActivationStatus::Illegal(ActivationError::BadTiming);
                }
                approving_effects.extend(approving);
            }
        }

        if !spec.cost.can_pay(game, self.source, activator) {
            return ActivationStatus::Illegal(ActivationError::CannotPayCosts);
        }

        if !self
            .targets
            .iter()
            .all(|spec| spec.has_enough_candidates(game, self.controller))
        {
            return ActivationStatus::Illegal(ActivationError::NoLegalTargets);
        }

        // A replacement effect may veto the activation outright. Probe mode:
        // nothing is committed and no watcher or trigger sees the event.
        let probe = GameEvent::activate_ability(self.source, activator);
        if !pipeline::probe_event(game, probe) {
            return ActivationStatus::Illegal(ActivationError::Vetoed);
        }

        ActivationStatus::Allowed { approving_effects }
    }

    /// Thin wrapper for callers that only need yes or no.
    pub fn can_activate(&self, game: &GameState, activator: PlayerId) -> bool {
        self.check_legality(game, activator).is_allowed()
    }

    /// Perform a checked activation: pay the cost, record it in the ledger,
    /// fire the activation event, and put the ability on the stack (mana
    /// abilities resolve immediately). All-or-nothing: a cost failure undoes
    /// every component already paid.
    pub fn commit_activation(
        &self,
        game: &mut GameState,
        activator: PlayerId,
        targets: Vec<Target>,
    ) -> Result<(), ActivationError> {
        let status = self.check_legality(game, activator);
        if let ActivationStatus::Illegal(error) = status {
            game.log.push(
                game.turn.turn_number,
                LogKind::Illegal,
                &format!("cannot activate {}: {}", self.text, error),
            );
            return Err(error);
        }

        let expected: u32 = self.targets.iter().map(|t| t.count).sum();
        if targets.len() as u32 != expected {
            return Err(ActivationError::BadTargets);
        }
        // A spec asking for several targets owns that many consecutive
        // choices.
        let mut chosen = targets.iter();
        for spec in &self.targets {
            for _ in 0..spec.count {
                let Some(target) = chosen.next() else {
                    return Err(ActivationError::BadTargets);
                };
                if !spec.is_legal(game, self.controller, *target) {
                    return Err(ActivationError::BadTargets);
                }
            }
        }

        let spec = self.activated_spec().ok_or(ActivationError::NotActivated)?;
        let cost = spec.cost.clone();
        let bypasses_stack =
            spec.is_mana_ability || matches!(self.kind, AbilityKind::SpecialAction(_));
        cost.pay(game, self.source, activator)
            .map_err(|_| ActivationError::CannotPayCosts)?;

        game.activations
            .record(self.source, self.ability_id, game.turn.turn_number);

        let event = GameEvent::activate_ability(self.source, activator);
        game.handle_event(event);

        game.log.push(
            game.turn.turn_number,
            LogKind::Event,
            &format!("activated {}", self.text),
        );

        if bypasses_stack {
            // Mana abilities and special actions do not use the stack.
            let ctx = EffectContext::new(self.source, self.controller).with_targets(targets);
            for effect in &self.effects {
                if !effect.apply(game, &ctx) {
                    break;
                }
            }
        } else {
            game.stack.push(StackEntry::new(
                self.copy_instance(),
                self.controller,
                targets,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::FixedCondition;
    use crate::cost::Cost;
    use crate::effects::GainLifeEffect;
    use crate::object::Object;

    fn gain_life_ability(cost: TotalCost) -> Ability {
        Ability::activated(
            cost,
            vec![Effect::one_shot(GainLifeEffect { amount: 1 })],
            "{T}: You gain 1 life",
        )
    }

    fn setup_with(ability: Ability) -> (GameState, PlayerId, ObjectId) {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let relic = Object::permanent("Relic", ada).with_ability(ability);
        let relic_id = game.add_object(relic);
        (game, ada, relic_id)
    }

    fn the_ability(game: &GameState, source: ObjectId) -> Ability {
        game.object(source).unwrap().abilities[0].clone()
    }

    #[test]
    fn test_check_legality_is_pure() {
        let (game, ada, relic) = setup_with(gain_life_ability(TotalCost::from_cost(Cost::Tap)));
        let ability = the_ability(&game, relic);
        assert!(ability.check_legality(&game, ada).is_allowed());
        // The check changed nothing observable.
        assert!(!game.object(relic).unwrap().tapped);
        assert_eq!(game.stack.len(), 0);
        assert_eq!(
            game.activations.total_activations(relic, ability.ability_id),
            0
        );
    }

    #[test]
    fn test_only_controller_may_activate_by_default() {
        let (game, _, relic) = setup_with(gain_life_ability(TotalCost::free()));
        let bo = game.players[1].id;
        let ability = the_ability(&game, relic);
        assert_eq!(
            ability.check_legality(&game, bo),
            ActivationStatus::Illegal(ActivationError::NotAllowedToActivate)
        );
    }

    #[test]
    fn test_condition_gates_activation() {
        let ability = gain_life_ability(TotalCost::free())
            .with_condition(Box::new(FixedCondition(false)));
        let (game, ada, relic) = setup_with(ability);
        let ability = the_ability(&game, relic);
        assert_eq!(
            ability.check_legality(&game, ada),
            ActivationStatus::Illegal(ActivationError::ConditionFailed)
        );
    }

    #[test]
    fn test_per_turn_limit_blocks_then_resets() {
        let ability = gain_life_ability(TotalCost::free()).limit_per_turn(1);
        let (mut game, ada, relic) = setup_with(ability);
        let ability = the_ability(&game, relic);

        assert!(ability.commit_activation(&mut game, ada, vec![]).is_ok());
        assert_eq!(
            ability.check_legality(&game, ada),
            ActivationStatus::Illegal(ActivationError::LimitReached)
        );

        game.advance_turn();
        game.advance_turn();
        assert!(ability.check_legality(&game, ada).is_allowed());
    }

    #[test]
    fn test_commit_puts_ability_on_stack_and_taps() {
        let (mut game, ada, relic) =
            setup_with(gain_life_ability(TotalCost::from_cost(Cost::Tap)));
        let ability = the_ability(&game, relic);
        ability.commit_activation(&mut game, ada, vec![]).unwrap();
        assert!(game.object(relic).unwrap().tapped);
        assert_eq!(game.stack.len(), 1);
        assert_eq!(
            game.activations.total_activations(relic, ability.ability_id),
            1
        );
    }

    #[test]
    fn test_not_you_policy_blocks_the_controller() {
        let ability = gain_life_ability(TotalCost::free()).activatable_by(MayActivate::NotYou);
        let (game, ada, relic) = setup_with(ability);
        let bo = game.players[1].id;
        let ability = the_ability(&game, relic);
        assert_eq!(
            ability.check_legality(&game, ada),
            ActivationStatus::Illegal(ActivationError::NotAllowedToActivate)
        );
        assert!(ability.check_legality(&game, bo).is_allowed());
    }

    #[test]
    fn test_each_player_policy_allows_everyone() {
        let ability =
            gain_life_ability(TotalCost::free()).activatable_by(MayActivate::EachPlayer);
        let (game, ada, relic) = setup_with(ability);
        let bo = game.players[1].id;
        let ability = the_ability(&game, relic);
        assert!(ability.check_legality(&game, ada).is_allowed());
        assert!(ability.check_legality(&game, bo).is_allowed());
    }

    #[test]
    fn test_multi_target_spec_checks_every_choice() {
        use crate::target::{Target, TargetFilter, TargetSpec};
        use crate::types::CardType;

        let ability = gain_life_ability(TotalCost::free()).with_targets(vec![TargetSpec {
            filter: TargetFilter::PermanentOfType(CardType::Creature),
            count: 2,
        }]);
        let (mut game, ada, relic) = setup_with(ability);
        let bo = game.players[1].id;
        let bear = game.add_object(
            Object::permanent("Bear", ada).with_types(&[CardType::Creature]),
        );
        let ox = game.add_object(
            Object::permanent("Ox", ada).with_types(&[CardType::Creature]),
        );
        let ability = the_ability(&game, relic);

        // The second choice is validated against the same spec as the first.
        assert_eq!(
            ability.commit_activation(
                &mut game,
                ada,
                vec![Target::Object(bear), Target::Player(bo)],
            ),
            Err(ActivationError::BadTargets)
        );
        assert!(
            ability
                .commit_activation(&mut game, ada, vec![Target::Object(bear), Target::Object(ox)])
                .is_ok()
        );
    }

    #[test]
    fn test_ability_cannot_be_activated_from_graveyard() {
        let (mut game, ada, relic) = setup_with(gain_life_ability(TotalCost::free()));
        let grave = game.move_object(relic, Zone::Graveyard).unwrap();
        let ability = the_ability(&game, grave);
        assert_eq!(
            ability.check_legality(&game, ada),
            ActivationStatus::Illegal(ActivationError::WrongZone)
        );
    }

    #[test]
    fn test_graveyard_permission_allows_activation() {
        use crate::as_though::{AsThoughEffect, AsThoughScope};

        let (mut game, ada, relic) = setup_with(gain_life_ability(TotalCost::free()));
        let grave = game.move_object(relic, Zone::Graveyard).unwrap();
        let crypt = game.add_object(Object::permanent("Crypt", ada));
        game.as_though.register(AsThoughEffect::new(
            AsThoughKind::PlayFromGraveyard,
            AsThoughScope::Object(grave),
            crypt,
            ada,
        ));

        let ability = the_ability(&game, grave);
        assert!(ability.check_legality(&game, ada).is_allowed());
        ability.commit_activation(&mut game, ada, vec![]).unwrap();
        game.resolve_stack();
        assert_eq!(game.player(ada).unwrap().life, 21);
    }

    #[test]
    fn test_special_action_resolves_without_the_stack() {
        let ability = Ability::special_action(
            TotalCost::free(),
            vec![Effect::one_shot(GainLifeEffect { amount: 3 })],
            "gain 3 life as a special action",
        );
        let (mut game, ada, relic) = setup_with(ability);
        let ability = the_ability(&game, relic);
        ability.commit_activation(&mut game, ada, vec![]).unwrap();
        assert_eq!(game.stack.len(), 0);
        assert_eq!(game.player(ada).unwrap().life, 23);
    }

    #[test]
    #[should_panic(expected = "limit_per_turn")]
    fn test_limit_on_triggered_ability_panics_at_setup() {
        use crate::triggers::TurnBegins;
        let _ = Ability::triggered(
            TurnBegins::spec(false),
            vec![Effect::one_shot(GainLifeEffect { amount: 1 })],
            "misconfigured",
        )
        .limit_per_turn(1);
    }

    #[test]
    fn test_stripped_ability_cannot_be_activated() {
        use crate::continuous::{Affected, ContinuousEffect, Duration, Modification};
        let (mut game, ada, relic) = setup_with(gain_life_ability(TotalCost::free()));
        let ability = the_ability(&game, relic);
        game.continuous_effects.register(ContinuousEffect::new(
            relic,
            ada,
            Affected::Object(relic),
            Modification::RemoveAllAbilities,
            Duration::EndOfGame,
        ));
        assert_eq!(
            ability.check_legality(&game, ada),
            ActivationStatus::Illegal(ActivationError::AbilityMissing)
        );
    }
}
