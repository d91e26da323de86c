//! Continuous effects and the layer system.
//!
//! Characteristics are never stored mutated: an object keeps its printed
//! (base) values, and every query recomputes the visible characteristics by
//! applying all registered continuous effects in layer order. Within a layer
//! (and sublayer for power/toughness) effects apply in dependency order,
//! falling back to timestamp order; see the `dependency` module.
//!
//! Layer order: copy, control, text, type, color, ability, power/toughness.
//! Power/toughness sublayers: characteristic-defining, set, modify, counters,
//! switch. The counters sublayer is not represented by effects; it reads the
//! object's counter map directly.

use std::fmt::Debug;

use crate::ability::Ability;
use crate::color::ColorSet;
use crate::condition::Condition;
use crate::game_state::GameState;
use crate::ids::{EffectId, ObjectId, PlayerId};
use crate::object::{CounterType, Object};
use crate::types::CardType;
use crate::zone::Zone;

/// Layers in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Copy,
    Control,
    Text,
    Type,
    Color,
    Ability,
    PowerToughness,
}

impl Layer {
    /// All layers in application order.
    pub const ALL: [Layer; 7] = [
        Layer::Copy,
        Layer::Control,
        Layer::Text,
        Layer::Type,
        Layer::Color,
        Layer::Ability,
        Layer::PowerToughness,
    ];
}

/// Sublayers of the power/toughness layer, in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PtSublayer {
    /// Characteristic-defining set effects.
    Cda,
    /// Effects that set power and/or toughness.
    SetPt,
    /// Effects that add to or subtract from power and/or toughness.
    ModifyPt,
    /// +1/+1 and -1/-1 counters (read from the object, not from effects).
    Counters,
    /// Effects that switch power and toughness.
    SwitchPt,
}

/// What a continuous effect changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Modification {
    /// Copy another object's printed characteristics.
    CopyOf(ObjectId),
    /// Change the affected object's controller.
    ChangeController(PlayerId),
    /// Replace the affected object's name.
    SetName(String),
    /// Add a card type.
    AddCardType(CardType),
    /// Remove a card type.
    RemoveCardType(CardType),
    /// Replace the affected object's colors.
    SetColors(ColorSet),
    /// Add colors to the affected object.
    AddColors(ColorSet),
    /// Grant an ability.
    AddAbility(Ability),
    /// Strip all abilities.
    RemoveAllAbilities,
    /// Set base power and toughness.
    SetPt { power: i32, toughness: i32 },
    /// Add to power and toughness.
    ModifyPt { power: i32, toughness: i32 },
    /// Exchange power and toughness.
    SwitchPt,
}

impl Modification {
    pub fn layer(&self) -> Layer {
        match self {
            Modification::CopyOf(_) => Layer::Copy,
            Modification::ChangeController(_) => Layer::Control,
            Modification::SetName(_) => Layer::Text,
            Modification::AddCardType(_) | Modification::RemoveCardType(_) => Layer::Type,
            Modification::SetColors(_) | Modification::AddColors(_) => Layer::Color,
            Modification::AddAbility(_) | Modification::RemoveAllAbilities => Layer::Ability,
            Modification::SetPt { .. }
            | Modification::ModifyPt { .. }
            | Modification::SwitchPt => Layer::PowerToughness,
        }
    }

    /// Sublayer within the power/toughness layer, if any. Promotion of set
    /// effects to the characteristic-defining sublayer happens on the effect,
    /// which knows its source type.
    pub fn pt_sublayer(&self) -> Option<PtSublayer> {
        match self {
            Modification::SetPt { .. } => Some(PtSublayer::SetPt),
            Modification::ModifyPt { .. } => Some(PtSublayer::ModifyPt),
            Modification::SwitchPt => Some(PtSublayer::SwitchPt),
            _ => None,
        }
    }
}

/// How long a continuous effect lasts. Expired effects keep applying until
/// the state-based sweep discards them; expiry never takes effect mid-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duration {
    /// Until the end of the turn it was created on.
    EndOfTurn { created_turn: u32 },
    /// While the effect's source remains on the battlefield.
    WhileSourceOnBattlefield,
    /// For the rest of the game.
    EndOfGame,
}

/// Where a continuous effect comes from. Characteristic-defining effects sort
/// into the CDA sublayer and never participate in dependencies with
/// non-defining effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectSourceType {
    /// Created by a resolved spell or ability.
    Resolved,
    /// Generated by a static ability on a permanent.
    StaticAbility,
    /// A characteristic-defining ability.
    CharacteristicDefining,
}

/// Which objects a continuous effect applies to. Evaluated against the
/// in-progress characteristics at the effect's layer, so a type-changing
/// effect in an earlier layer can bring an object into (or out of) range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affected {
    /// A single object.
    Object(ObjectId),
    /// Every creature on the battlefield.
    AllCreatures,
    /// Every creature the given player controls.
    CreaturesControlledBy(PlayerId),
    /// Every battlefield permanent with the given card type.
    AllOfType(CardType),
}

/// One registered continuous effect.
#[derive(Debug, Clone)]
pub struct ContinuousEffect {
    pub id: EffectId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub affected: Affected,
    pub modification: Modification,
    /// Registration order; ties within a layer break by this.
    pub timestamp: u64,
    pub duration: Duration,
    /// Explicitly declared dependencies on other effects in the same layer.
    pub depends_on: Vec<EffectId>,
    pub source_type: EffectSourceType,
    /// Applies only while this condition holds.
    pub condition: Option<Box<dyn Condition>>,
}

impl ContinuousEffect {
    pub fn new(
        source: ObjectId,
        controller: PlayerId,
        affected: Affected,
        modification: Modification,
        duration: Duration,
    ) -> Self {
        Self {
            id: EffectId::new(),
            source,
            controller,
            affected,
            modification,
            timestamp: 0,
            duration,
            depends_on: Vec::new(),
            source_type: EffectSourceType::Resolved,
            condition: None,
        }
    }

    pub fn from_static_ability(mut self) -> Self {
        self.source_type = EffectSourceType::StaticAbility;
        self
    }

    pub fn characteristic_defining(mut self) -> Self {
        self.source_type = EffectSourceType::CharacteristicDefining;
        self
    }

    pub fn with_condition(mut self, condition: Box<dyn Condition>) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn depending_on(mut self, other: EffectId) -> Self {
        self.depends_on.push(other);
        self
    }

    pub fn layer(&self) -> Layer {
        self.modification.layer()
    }

    /// Sublayer within layer 7, with set effects from characteristic-defining
    /// abilities promoted to the CDA sublayer.
    pub fn pt_sublayer(&self) -> Option<PtSublayer> {
        match self.modification.pt_sublayer() {
            Some(PtSublayer::SetPt)
                if self.source_type == EffectSourceType::CharacteristicDefining =>
            {
                Some(PtSublayer::Cda)
            }
            other => other,
        }
    }

    /// Whether the duration has run out. Expired effects are discarded only
    /// by the state-based sweep.
    pub fn is_expired(&self, game: &GameState) -> bool {
        match self.duration {
            Duration::EndOfTurn { created_turn } => game.turn.turn_number > created_turn,
            Duration::WhileSourceOnBattlefield => !game
                .object(self.source)
                .is_some_and(|o| o.zone == Zone::Battlefield),
            Duration::EndOfGame => false,
        }
    }

    /// Whether this effect applies to `object` given the characteristics
    /// accumulated so far.
    fn affects(&self, object: &Object, partial: &Characteristics) -> bool {
        if object.zone != Zone::Battlefield {
            return matches!(self.affected, Affected::Object(id) if id == object.id);
        }
        match self.affected {
            Affected::Object(id) => id == object.id,
            Affected::AllCreatures => partial.card_types.contains(&CardType::Creature),
            Affected::CreaturesControlledBy(player) => {
                partial.controller == player && partial.card_types.contains(&CardType::Creature)
            }
            Affected::AllOfType(card_type) => partial.card_types.contains(&card_type),
        }
    }
}

/// The visible characteristics of an object after all continuous effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Characteristics {
    pub name: String,
    pub controller: PlayerId,
    pub card_types: Vec<CardType>,
    pub colors: ColorSet,
    pub abilities: Vec<Ability>,
    pub power: i32,
    pub toughness: i32,
}

impl Characteristics {
    fn base(object: &Object) -> Self {
        Self {
            name: object.name.clone(),
            controller: object.controller,
            card_types: object.card_types.clone(),
            colors: object.colors,
            abilities: object.abilities.clone(),
            power: object.base_power,
            toughness: object.base_toughness,
        }
    }

    pub fn is_creature(&self) -> bool {
        self.card_types.contains(&CardType::Creature)
    }
}

/// All continuous effects registered for one game.
#[derive(Debug, Clone, Default)]
pub struct ContinuousEffectManager {
    effects: Vec<ContinuousEffect>,
    next_timestamp: u64,
}

impl ContinuousEffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect, stamping it with the next timestamp.
    pub fn register(&mut self, mut effect: ContinuousEffect) -> EffectId {
        self.next_timestamp += 1;
        effect.timestamp = self.next_timestamp;
        let id = effect.id;
        self.effects.push(effect);
        id
    }

    pub fn effects(&self) -> &[ContinuousEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Ids of effects whose duration has run out.
    pub fn expired(&self, game: &GameState) -> Vec<EffectId> {
        self.effects
            .iter()
            .filter(|e| e.is_expired(game))
            .map(|e| e.id)
            .collect()
    }

    /// Discard the given effects. Called only from the state-based sweep.
    pub fn discard(&mut self, ids: &[EffectId]) {
        self.effects.retain(|e| !ids.contains(&e.id));
    }
}

/// Compute the visible characteristics of an object.
///
/// Guarded with `stacker::maybe_grow` because effect conditions may re-enter
/// characteristic calculation through game-state queries.
pub fn calculate_characteristics(game: &GameState, id: ObjectId) -> Option<Characteristics> {
    stacker::maybe_grow(64 * 1024, 1024 * 1024, || {
        calculate_characteristics_inner(game, id)
    })
}

fn calculate_characteristics_inner(game: &GameState, id: ObjectId) -> Option<Characteristics> {
    let object = game.object(id)?;
    let mut result = Characteristics::base(object);

    for layer in Layer::ALL {
        let in_layer: Vec<&ContinuousEffect> = game
            .continuous_effects
            .effects()
            .iter()
            .filter(|e| e.layer() == layer)
            .filter(|e| {
                e.condition
                    .as_ref()
                    .is_none_or(|c| c.check(game, e.source, e.controller))
            })
            .collect();
        let ordered = crate::dependency::sort_layer_effects(&in_layer);

        if layer == Layer::PowerToughness {
            apply_pt_layer(game, object, &ordered, &mut result);
        } else {
            for effect in ordered {
                if effect.affects(object, &result) {
                    apply_modification(game, &effect.modification, &mut result);
                }
            }
        }
    }

    Some(result)
}

fn apply_pt_layer(
    game: &GameState,
    object: &Object,
    ordered: &[&ContinuousEffect],
    result: &mut Characteristics,
) {
    let apply_sublayer = |sublayer: PtSublayer, result: &mut Characteristics| {
        for effect in ordered {
            if effect.pt_sublayer() == Some(sublayer) && effect.affects(object, result) {
                apply_modification(game, &effect.modification, result);
            }
        }
    };

    apply_sublayer(PtSublayer::Cda, result);
    apply_sublayer(PtSublayer::SetPt, result);
    apply_sublayer(PtSublayer::ModifyPt, result);

    // Sublayer 7d: counters on the object itself.
    let plus = object.counters(CounterType::PlusOnePlusOne) as i32;
    let minus = object.counters(CounterType::MinusOneMinusOne) as i32;
    result.power += plus - minus;
    result.toughness += plus - minus;

    apply_sublayer(PtSublayer::SwitchPt, result);
}

fn apply_modification(game: &GameState, modification: &Modification, result: &mut Characteristics) {
    match modification {
        Modification::CopyOf(other) => {
            if let Some(other) = game.object(*other) {
                result.name = other.name.clone();
                result.card_types = other.card_types.clone();
                result.colors = other.colors;
                result.abilities = other.abilities.clone();
                result.power = other.base_power;
                result.toughness = other.base_toughness;
            }
        }
        Modification::ChangeController(player) => result.controller = *player,
        Modification::SetName(name) => result.name = name.clone(),
        Modification::AddCardType(card_type) => {
            if !result.card_types.contains(card_type) {
                result.card_types.push(*card_type);
            }
        }
        Modification::RemoveCardType(card_type) => {
            result.card_types.retain(|t| t != card_type);
        }
        Modification::SetColors(colors) => result.colors = *colors,
        Modification::AddColors(colors) => result.colors = result.colors.union(*colors),
        Modification::AddAbility(ability) => result.abilities.push(ability.clone()),
        Modification::RemoveAllAbilities => result.abilities.clear(),
        Modification::SetPt { power, toughness } => {
            result.power = *power;
            result.toughness = *toughness;
        }
        Modification::ModifyPt { power, toughness } => {
            result.power += *power;
            result.toughness += *toughness;
        }
        Modification::SwitchPt => std::mem::swap(&mut result.power, &mut result.toughness),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (GameState, PlayerId, ObjectId) {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bear = Object::permanent("Bear", ada)
            .with_types(&[CardType::Creature])
            .with_pt(2, 2);
        let bear_id = game.add_object(bear);
        (game, ada, bear_id)
    }

    #[test]
    fn test_modify_applies_after_set() {
        let (mut game, ada, bear) = setup();
        // Registered after the set effect, but the set sublayer still applies
        // first.
        game.continuous_effects.register(ContinuousEffect::new(
            bear,
            ada,
            Affected::Object(bear),
            Modification::ModifyPt {
                power: 1,
                toughness: 1,
            },
            Duration::EndOfGame,
        ));
        game.continuous_effects.register(ContinuousEffect::new(
            bear,
            ada,
            Affected::Object(bear),
            Modification::SetPt {
                power: 0,
                toughness: 4,
            },
            Duration::EndOfGame,
        ));
        let c = game.calculated_characteristics(bear).unwrap();
        assert_eq!((c.power, c.toughness), (1, 5));
    }

    #[test]
    fn test_counters_apply_before_switch() {
        let (mut game, ada, bear) = setup();
        game.object_mut(bear)
            .unwrap()
            .add_counters(CounterType::PlusOnePlusOne, 2);
        game.continuous_effects.register(ContinuousEffect::new(
            bear,
            ada,
            Affected::Object(bear),
            Modification::ModifyPt {
                power: 3,
                toughness: 0,
            },
            Duration::EndOfGame,
        ));
        game.continuous_effects.register(ContinuousEffect::new(
            bear,
            ada,
            Affected::Object(bear),
            Modification::SwitchPt,
            Duration::EndOfGame,
        ));
        // 2/2 -> +3/+0 -> 5/2 -> counters -> 7/4 -> switch -> 4/7
        let c = game.calculated_characteristics(bear).unwrap();
        assert_eq!((c.power, c.toughness), (4, 7));
    }

    #[test]
    fn test_type_layer_feeds_pt_layer() {
        let (mut game, ada, _) = setup();
        let idol = game.add_object(
            Object::permanent("Idol", ada)
                .with_types(&[CardType::Artifact])
                .with_pt(0, 0),
        );
        // The animation effect runs in the type layer, so the anthem's
        // "all creatures" filter sees the idol as a creature.
        game.continuous_effects.register(ContinuousEffect::new(
            idol,
            ada,
            Affected::AllCreatures,
            Modification::ModifyPt {
                power: 1,
                toughness: 1,
            },
            Duration::EndOfGame,
        ));
        game.continuous_effects.register(ContinuousEffect::new(
            idol,
            ada,
            Affected::Object(idol),
            Modification::AddCardType(CardType::Creature),
            Duration::EndOfGame,
        ));
        let c = game.calculated_characteristics(idol).unwrap();
        assert!(c.is_creature());
        assert_eq!((c.power, c.toughness), (1, 1));
    }

    #[test]
    fn test_end_of_turn_duration_expires_next_turn() {
        let (mut game, ada, bear) = setup();
        let effect = ContinuousEffect::new(
            bear,
            ada,
            Affected::Object(bear),
            Modification::ModifyPt {
                power: 2,
                toughness: 2,
            },
            Duration::EndOfTurn {
                created_turn: game.turn.turn_number,
            },
        );
        game.continuous_effects.register(effect.clone());
        assert!(!effect.is_expired(&game));
        game.turn.turn_number += 1;
        assert!(effect.is_expired(&game));
    }
}
