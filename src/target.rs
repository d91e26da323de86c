//! Targets and target requirements.

use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::types::CardType;
use crate::zone::Zone;

/// A chosen target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Player(PlayerId),
    Object(ObjectId),
}

/// What a target requirement accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetFilter {
    AnyPlayer,
    Opponent,
    /// A battlefield permanent with the given card type.
    PermanentOfType(CardType),
    /// Any battlefield permanent.
    AnyPermanent,
    /// A card in a graveyard.
    CardInGraveyard,
}

/// A target requirement on an ability: what may be chosen and how many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub filter: TargetFilter,
    pub count: u32,
}

impl TargetSpec {
    pub fn one(filter: TargetFilter) -> Self {
        Self { filter, count: 1 }
    }

    /// Whether `target` currently satisfies this requirement.
    pub fn is_legal(&self, game: &GameState, controller: PlayerId, target: Target) -> bool {
        match (&self.filter, target) {
            (TargetFilter::AnyPlayer, Target::Player(id)) => game.player(id).is_some(),
            (TargetFilter::Opponent, Target::Player(id)) => {
                id != controller && game.player(id).is_some()
            }
            (TargetFilter::PermanentOfType(card_type), Target::Object(id)) => game
                .object(id)
                .is_some_and(|o| o.zone == Zone::Battlefield && o.has_type(*card_type)),
            (TargetFilter::AnyPermanent, Target::Object(id)) => {
                game.object(id).is_some_and(|o| o.zone == Zone::Battlefield)
            }
            (TargetFilter::CardInGraveyard, Target::Object(id)) => {
                game.object(id).is_some_and(|o| o.zone == Zone::Graveyard)
            }
            _ => false,
        }
    }

    /// Enumerate all currently legal targets.
    pub fn candidates(&self, game: &GameState, controller: PlayerId) -> Vec<Target> {
        match &self.filter {
            TargetFilter::AnyPlayer => game
                .players
                .iter()
                .map(|p| Target::Player(p.id))
                .collect(),
            TargetFilter::Opponent => game
                .players
                .iter()
                .filter(|p| p.id != controller)
                .map(|p| Target::Player(p.id))
                .collect(),
            TargetFilter::PermanentOfType(card_type) => game
                .battlefield
                .iter()
                .filter(|&&id| game.object(id).is_some_and(|o| o.has_type(*card_type)))
                .map(|&id| Target::Object(id))
                .collect(),
            TargetFilter::AnyPermanent => game
                .battlefield
                .iter()
                .map(|&id| Target::Object(id))
                .collect(),
            TargetFilter::CardInGraveyard => game
                .players
                .iter()
                .flat_map(|p| p.graveyard.iter().copied())
                .map(Target::Object)
                .collect(),
        }
    }

    /// Whether enough legal targets exist to satisfy this requirement.
    pub fn has_enough_candidates(&self, game: &GameState, controller: PlayerId) -> bool {
        self.candidates(game, controller).len() as u32 >= self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::GameState;
    use crate::object::Object;

    #[test]
    fn test_opponent_filter_excludes_controller() {
        let game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bo = game.players[1].id;
        let spec = TargetSpec::one(TargetFilter::Opponent);
        assert_eq!(spec.candidates(&game, ada), vec![Target::Player(bo)]);
        assert!(!spec.is_legal(&game, ada, Target::Player(ada)));
        assert!(spec.is_legal(&game, ada, Target::Player(bo)));
    }

    #[test]
    fn test_permanent_filter_follows_zone() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bear = Object::permanent("Bear", ada).with_types(&[CardType::Creature]);
        let bear_id = game.add_object(bear);

        let spec = TargetSpec::one(TargetFilter::PermanentOfType(CardType::Creature));
        assert!(spec.is_legal(&game, ada, Target::Object(bear_id)));
        assert!(spec.has_enough_candidates(&game, ada));

        let dead = game.move_object(bear_id, Zone::Graveyard).unwrap();
        assert!(!spec.is_legal(&game, ada, Target::Object(dead)));
        assert!(!spec.has_enough_candidates(&game, ada));
    }
}
