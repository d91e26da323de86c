//! The stack.
//!
//! Stack entries hold an instance copy of their ability plus the chosen
//! targets, so later changes to the source never affect an entry already on
//! the stack. Resolution re-validates targets: if every chosen target has
//! become illegal the whole entry fizzles; if an individual effect reports
//! nothing happened, later effects of the same entry are skipped while
//! earlier ones stand.

use crate::ability::{Ability, AbilityKind};
use crate::effect::EffectContext;
use crate::game_state::GameState;
use crate::ids::PlayerId;
use crate::log::LogKind;
use crate::target::Target;

/// One ability waiting to resolve.
#[derive(Debug, Clone)]
pub struct StackEntry {
    pub ability: Ability,
    pub controller: PlayerId,
    pub targets: Vec<Target>,
}

impl StackEntry {
    pub fn new(ability: Ability, controller: PlayerId, targets: Vec<Target>) -> Self {
        Self {
            ability,
            controller,
            targets,
        }
    }
}

/// LIFO resolution order.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    entries: Vec<StackEntry>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: StackEntry) {
        self.entries.push(entry);
    }

    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    pub fn peek(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }
}

/// How resolving the top of the stack went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Resolved,
    /// Nothing happened: all targets illegal or the intervening-if failed.
    Fizzled,
}

/// Resolve the top entry of the stack. Returns `None` when the stack is
/// empty.
pub fn resolve_top(game: &mut GameState) -> Option<Resolution> {
    let entry = game.stack.pop()?;
    let turn = game.turn.turn_number;

    // Intervening-if triggers re-check their condition on resolution.
    if matches!(entry.ability.kind, AbilityKind::Triggered(_))
        && let Some(condition) = &entry.ability.condition
        && !condition.check(game, entry.ability.source, entry.controller)
    {
        game.log.push(
            turn,
            LogKind::Fizzle,
            &format!("{} did nothing: condition no longer holds", entry.ability.text),
        );
        return Some(Resolution::Fizzled);
    }

    // Re-validate targets. Each spec owns `count` consecutive choices. The
    // entry fizzles only when it had targets and none of them is still legal.
    let specs = entry
        .ability
        .targets
        .iter()
        .flat_map(|spec| std::iter::repeat(spec).take(spec.count as usize));
    let legal: Vec<Target> = entry
        .targets
        .iter()
        .zip(specs)
        .filter(|(target, spec)| spec.is_legal(game, entry.controller, **target))
        .map(|(target, _)| *target)
        .collect();
    if !entry.targets.is_empty() && legal.is_empty() {
        game.log.push(
            turn,
            LogKind::Fizzle,
            &format!("{} fizzled: no legal targets remain", entry.ability.text),
        );
        return Some(Resolution::Fizzled);
    }

    let ctx = EffectContext::new(entry.ability.source, entry.controller).with_targets(legal);
    for effect in &entry.ability.effects {
        if !effect.apply(game, &ctx) {
            game.log.push(
                turn,
                LogKind::Fizzle,
                &format!(
                    "{}: \"{}\" did nothing, skipping the rest",
                    entry.ability.text,
                    effect.display()
                ),
            );
            break;
        }
    }

    Some(Resolution::Resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::TotalCost;
    use crate::effect::Effect;
    use crate::effects::{DealDamageToTarget, GainLifeEffect};
    use crate::object::Object;
    use crate::target::{TargetFilter, TargetSpec};
    use crate::types::CardType;
    use crate::zone::Zone;

    #[test]
    fn test_resolution_applies_effects_in_order() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let source = game.add_object(Object::permanent("Fountain", ada));
        let ability = Ability::activated(
            TotalCost::free(),
            vec![
                Effect::one_shot(GainLifeEffect { amount: 2 }),
                Effect::one_shot(GainLifeEffect { amount: 3 }),
            ],
            "gain 2 then 3 life",
        )
        .bound_to(source, ada);

        game.stack.push(StackEntry::new(ability, ada, vec![]));
        assert_eq!(resolve_top(&mut game), Some(Resolution::Resolved));
        assert_eq!(game.player(ada).unwrap().life, 25);
        assert!(game.stack.is_empty());
    }

    #[test]
    fn test_entry_fizzles_when_target_leaves() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bo = game.players[1].id;
        let bear = game.add_object(
            Object::permanent("Bear", bo)
                .with_types(&[CardType::Creature])
                .with_pt(2, 2),
        );
        let source = game.add_object(Object::permanent("Pinger", ada));
        let ability = Ability::activated(
            TotalCost::free(),
            vec![Effect::one_shot(DealDamageToTarget { amount: 2 })],
            "deal 2 damage to target creature",
        )
        .with_targets(vec![TargetSpec::one(TargetFilter::PermanentOfType(
            CardType::Creature,
        ))])
        .bound_to(source, ada);

        game.stack
            .push(StackEntry::new(ability, ada, vec![Target::Object(bear)]));

        // The target leaves before resolution.
        game.move_object(bear, Zone::Graveyard);
        assert_eq!(resolve_top(&mut game), Some(Resolution::Fizzled));
        assert!(game
            .log
            .last_message()
            .unwrap_or_default()
            .contains("fizzled"));
        assert_eq!(game.player(bo).unwrap().life, 20);
    }

    #[test]
    fn test_surviving_target_of_multi_target_entry_resolves() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bo = game.players[1].id;
        let first = game.add_object(
            Object::permanent("Bear", bo)
                .with_types(&[CardType::Creature])
                .with_pt(2, 2),
        );
        let second = game.add_object(
            Object::permanent("Ox", bo)
                .with_types(&[CardType::Creature])
                .with_pt(2, 2),
        );
        let source = game.add_object(Object::permanent("Pinger", ada));
        let ability = Ability::activated(
            TotalCost::free(),
            vec![Effect::one_shot(DealDamageToTarget { amount: 1 })],
            "deal 1 damage to each of two target creatures",
        )
        .with_targets(vec![TargetSpec {
            filter: TargetFilter::PermanentOfType(CardType::Creature),
            count: 2,
        }])
        .bound_to(source, ada);

        game.stack.push(StackEntry::new(
            ability,
            ada,
            vec![Target::Object(first), Target::Object(second)],
        ));

        // One target leaves; the other keeps the entry alive.
        game.move_object(first, Zone::Graveyard);
        assert_eq!(resolve_top(&mut game), Some(Resolution::Resolved));
        assert_eq!(game.object(second).unwrap().damage, 1);
    }

    #[test]
    fn test_failed_effect_skips_later_ones() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let source = game.add_object(Object::permanent("Gadget", ada));
        // The damage effect has no target to hit, so the later life gain is
        // skipped.
        let ability = Ability::activated(
            TotalCost::free(),
            vec![
                Effect::one_shot(GainLifeEffect { amount: 1 }),
                Effect::one_shot(DealDamageToTarget { amount: 1 }),
                Effect::one_shot(GainLifeEffect { amount: 5 }),
            ],
            "gain 1, ping, gain 5",
        )
        .bound_to(source, ada);

        game.stack.push(StackEntry::new(ability, ada, vec![]));
        assert_eq!(resolve_top(&mut game), Some(Resolution::Resolved));
        // The first effect stood; the third never ran.
        assert_eq!(game.player(ada).unwrap().life, 21);
    }
}
