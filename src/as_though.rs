//! "As though" effects: permissions that relax a timing or zone rule.
//!
//! An as-though effect never changes an event; it approves an action the
//! rules would otherwise forbid (activating a sorcery-speed ability at
//! instant speed, casting from exile). Legality checks ask the manager for
//! approving effects and record their ids in the activation status.

use crate::continuous::Duration;
use crate::game_state::GameState;
use crate::ids::{EffectId, ObjectId, PlayerId};
use crate::zone::Zone;

/// Which rule the permission relaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsThoughKind {
    /// Activate a sorcery-speed ability any time its controller could act.
    ActivateAsInstant,
    /// Cast or play the object from exile.
    PlayFromExile,
    /// Cast or play the object from the graveyard.
    PlayFromGraveyard,
}

/// Whom the permission covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsThoughScope {
    /// A single object.
    Object(ObjectId),
    /// Everything a player controls.
    Controller(PlayerId),
}

/// One registered permission.
#[derive(Debug, Clone)]
pub struct AsThoughEffect {
    pub id: EffectId,
    pub kind: AsThoughKind,
    pub scope: AsThoughScope,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub duration: Duration,
}

impl AsThoughEffect {
    pub fn new(kind: AsThoughKind, scope: AsThoughScope, source: ObjectId, controller: PlayerId) -> Self {
        Self {
            id: EffectId::new(),
            kind,
            scope,
            source,
            controller,
            duration: Duration::WhileSourceOnBattlefield,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    fn covers(&self, game: &GameState, object: ObjectId, player: PlayerId) -> bool {
        match self.scope {
            AsThoughScope::Object(id) => id == object,
            AsThoughScope::Controller(id) => {
                id == player && game.object(object).is_some_and(|o| o.controller == player)
            }
        }
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

/// All as-though permissions registered for one game.
#[derive(Debug, Clone, Default)]
pub struct AsThoughManager {
    effects: Vec<AsThoughEffect>,
}

impl AsThoughManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, effect: AsThoughEffect) -> EffectId {
        let id = effect.id;
        self.effects.push(effect);
        id
    }

    pub fn effects(&self) -> &[AsThoughEffect] {
        &self.effects
    }

    pub fn remove(&mut self, id: EffectId) {
        self.effects.retain(|e| e.id != id);
    }

    /// Ids of every effect granting `kind` to `object` for `player`. An empty
    /// result means no permission exists.
    pub fn approving(
        &self,
        game: &GameState,
        kind: AsThoughKind,
        object: ObjectId,
        player: PlayerId,
    ) -> Vec<EffectId> {
        self.effects
            .iter()
            .filter(|e| e.kind == kind && e.covers(game, object, player))
            .map(|e| e.id)
            .collect()
    }

    pub fn expired(&self, game: &GameState) -> Vec<EffectId> {
        self.effects
            .iter()
            .filter(|e| e.is_expired(game))
            .map(|e| e.id)
            .collect()
    }

    pub fn discard(&mut self, ids: &[EffectId]) {
        self.effects.retain(|e| !ids.contains(&e.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    #[test]
    fn test_controller_scope_only_covers_controlled_objects() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bo = game.players[1].id;
        let mine = game.add_object(Object::permanent("Mine", ada));
        let theirs = game.add_object(Object::permanent("Theirs", bo));
        let source = game.add_object(Object::permanent("Vedalken Orrery", ada));

        let mut manager = AsThoughManager::new();
        let id = manager.register(AsThoughEffect::new(
            AsThoughKind::ActivateAsInstant,
            AsThoughScope::Controller(ada),
            source,
            ada,
        ));

        assert_eq!(
            manager.approving(&game, AsThoughKind::ActivateAsInstant, mine, ada),
            vec![id]
        );
        assert!(manager
            .approving(&game, AsThoughKind::ActivateAsInstant, theirs, ada)
            .is_empty());
        assert!(manager
            .approving(&game, AsThoughKind::PlayFromExile, mine, ada)
            .is_empty());
    }

    #[test]
    fn test_permission_expires_with_its_source() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let source = game.add_object(Object::permanent("Orrery", ada));
        let effect = AsThoughEffect::new(
            AsThoughKind::ActivateAsInstant,
            AsThoughScope::Controller(ada),
            source,
            ada,
        );
        assert!(!effect.is_expired(&game));
        game.move_object(source, Zone::Graveyard);
        assert!(effect.is_expired(&game));
    }
}
