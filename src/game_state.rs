//! Central game state.
//!
//! `GameState` owns the players, the object store, the stack, and every
//! effect manager. Zone changes re-instantiate objects: the moved card gets a
//! fresh object id (its stable id survives) and a snapshot of the previous
//! incarnation is kept as last-known information for triggers and watchers
//! that fire after the move.

use std::collections::{BTreeMap, HashMap};

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::activation::ActivationLedger;
use crate::as_though::AsThoughManager;
use crate::continuous::{Characteristics, ContinuousEffectManager};
use crate::decision::{AutoDecisionMaker, DecisionMaker};
use crate::event::{EventKind, GameEvent};
use crate::ids::{ObjectId, PlayerId};
use crate::log::{GameLog, LogKind};
use crate::object::Object;
use crate::pipeline::{self, EventOutcome};
use crate::player::Player;
use crate::replacement::ReplacementEffectManager;
use crate::snapshot::ObjectSnapshot;
use crate::stack::{self, Stack};
use crate::state_based;
use crate::watcher::{
    LeftBattlefieldWatcher, ResetBoundary, StartedTurnUntappedWatcher, WatcherRegistry,
    WatcherScope,
};
use crate::zone::Zone;

/// Whose turn it is and which turn number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnState {
    pub turn_number: u32,
    pub active_player: PlayerId,
}

/// The full state of one game. `Clone` is a deep copy; simulation probes a
/// clone and throws it away.
#[derive(Debug, Clone)]
pub struct GameState {
    pub players: Vec<Player>,
    /// Every object in the game, keyed by id. BTreeMap keeps scans
    /// deterministic.
    pub objects: BTreeMap<ObjectId, Object>,
    pub battlefield: Vec<ObjectId>,
    pub stack: Stack,
    pub turn: TurnState,
    pub continuous_effects: ContinuousEffectManager,
    pub replacements: ReplacementEffectManager,
    pub as_though: AsThoughManager,
    pub activations: ActivationLedger,
    pub watchers: WatcherRegistry,
    pub decisions: Box<dyn DecisionMaker>,
    pub log: GameLog,
    pub rng: StdRng,
    /// Last-known information for objects that changed zones.
    last_known: HashMap<ObjectId, ObjectSnapshot>,
}

impl GameState {
    /// A fresh game for the given players, in seating order. The first
    /// player starts as the active player.
    pub fn new(names: &[&str]) -> Self {
        let players: Vec<Player> = names
            .iter()
            .enumerate()
            .map(|(i, name)| Player::new(PlayerId::from_index(i as u8), name))
            .collect();
        let active = players.first().map(|p| p.id).unwrap_or(PlayerId::from_index(0));

        let mut watchers = WatcherRegistry::new();
        watchers.register(WatcherScope::Game, Box::new(LeftBattlefieldWatcher::new()));
        watchers.register(
            WatcherScope::Game,
            Box::new(StartedTurnUntappedWatcher::new()),
        );

        Self {
            players,
            objects: BTreeMap::new(),
            battlefield: Vec::new(),
            stack: Stack::new(),
            turn: TurnState {
                turn_number: 1,
                active_player: active,
            },
            continuous_effects: ContinuousEffectManager::new(),
            replacements: ReplacementEffectManager::new(),
            as_though: AsThoughManager::new(),
            activations: ActivationLedger::new(),
            watchers,
            decisions: Box::new(AutoDecisionMaker),
            log: GameLog::new(),
            rng: StdRng::seed_from_u64(0x5EED),
            last_known: HashMap::new(),
        }
    }

    pub fn two_players(first: &str, second: &str) -> Self {
        Self::new(&[first, second])
    }

    pub fn set_decision_maker(&mut self, decisions: Box<dyn DecisionMaker>) {
        self.decisions = decisions;
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Players in APNAP order: the active player first, then seating order.
    pub fn players_apnap(&self) -> Vec<PlayerId> {
        let start = self
            .players
            .iter()
            .position(|p| p.id == self.turn.active_player)
            .unwrap_or(0);
        (0..self.players.len())
            .map(|offset| self.players[(start + offset) % self.players.len()].id)
            .collect()
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    /// Every object in the game, in id order.
    pub fn objects_in_order(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    /// Add a new object, filing it in its zone's list. Returns its id.
    pub fn add_object(&mut self, object: Object) -> ObjectId {
        let id = object.id;
        self.insert_object(object);
        id
    }

    /// Insert an already-built object (also used to undo a sacrifice).
    pub fn insert_object(&mut self, object: Object) {
        let id = object.id;
        let zone = object.zone;
        let owner = object.owner;
        self.objects.insert(id, object);
        match zone {
            Zone::Battlefield => self.battlefield.push(id),
            Zone::Hand => {
                if let Some(player) = self.player_mut(owner) {
                    player.hand.push(id);
                }
            }
            Zone::Library => {
                if let Some(player) = self.player_mut(owner) {
                    player.library.push(id);
                }
            }
            Zone::Graveyard => {
                if let Some(player) = self.player_mut(owner) {
                    player.graveyard.push(id);
                }
            }
            Zone::Stack | Zone::Exile | Zone::Command => {}
        }
    }

    /// Remove an object from the game entirely.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<Object> {
        let object = self.objects.remove(&id)?;
        self.unfile(id, object.zone, object.owner);
        Some(object)
    }

    fn unfile(&mut self, id: ObjectId, zone: Zone, owner: PlayerId) {
        match zone {
            Zone::Battlefield => self.battlefield.retain(|&o| o != id),
            Zone::Hand => {
                if let Some(player) = self.player_mut(owner) {
                    player.hand.retain(|&o| o != id);
                }
            }
            Zone::Library => {
                if let Some(player) = self.player_mut(owner) {
                    player.library.retain(|&o| o != id);
                }
            }
            Zone::Graveyard => {
                if let Some(player) = self.player_mut(owner) {
                    player.graveyard.retain(|&o| o != id);
                }
            }
            Zone::Stack | Zone::Exile | Zone::Command => {}
        }
    }

    /// Move an object to another zone. The object is re-instantiated: the
    /// returned id is the new incarnation's, and the old id resolves only
    /// through `last_known`. Moving to the current zone is a no-op.
    pub fn move_object(&mut self, id: ObjectId, to: Zone) -> Option<ObjectId> {
        let current = self.objects.get(&id)?;
        if current.zone == to {
            return Some(id);
        }
        let snapshot = ObjectSnapshot::capture(self, current);
        let old = self.remove_object(id)?;
        self.last_known.insert(id, snapshot);
        let reborn = old.reincarnate(to);
        let new_id = reborn.id;
        self.insert_object(reborn);
        Some(new_id)
    }

    /// Last-known information for an object that has left its zone.
    pub fn last_known(&self, id: ObjectId) -> Option<&ObjectSnapshot> {
        self.last_known.get(&id)
    }

    /// Record last-known information without moving the object.
    pub fn record_last_known(&mut self, id: ObjectId) {
        if let Some(object) = self.objects.get(&id) {
            let snapshot = ObjectSnapshot::capture(self, object);
            self.last_known.insert(id, snapshot);
        }
    }

    /// The object's visible characteristics after continuous effects.
    pub fn calculated_characteristics(&self, id: ObjectId) -> Option<Characteristics> {
        crate::continuous::calculate_characteristics(self, id)
    }

    /// Feed a proposed event through the replacement pipeline and, if it
    /// survives, commit it, notify watchers, and stack any triggers.
    pub fn handle_event(&mut self, event: GameEvent) -> EventOutcome {
        pipeline::process_event(self, event)
    }

    /// Resolve the whole stack, running the state-based sweep after every
    /// resolution.
    pub fn resolve_stack(&mut self) {
        while stack::resolve_top(self).is_some() {
            state_based::sweep(self);
        }
    }

    /// End the current turn and begin the next one: turn-ended event,
    /// per-turn watcher reset, untap, turn-began event, sweep.
    pub fn advance_turn(&mut self) {
        let ended = self.turn.turn_number;
        let mut event = GameEvent::new(EventKind::TurnEnded);
        event.player = Some(self.turn.active_player);
        event.amount = ended as i32;
        self.handle_event(event);

        self.watchers.reset_at(ResetBoundary::EndOfTurn);

        // Cleanup: marked damage wears off when the turn ends.
        for object in self.objects.values_mut() {
            object.damage = 0;
        }

        self.turn.turn_number += 1;
        let seat = self
            .players
            .iter()
            .position(|p| p.id == self.turn.active_player)
            .unwrap_or(0);
        self.turn.active_player = self.players[(seat + 1) % self.players.len()].id;

        // Untap step for the new active player.
        let to_untap: Vec<ObjectId> = self
            .battlefield
            .iter()
            .copied()
            .filter(|&id| {
                self.objects
                    .get(&id)
                    .is_some_and(|o| o.controller == self.turn.active_player && o.tapped)
            })
            .collect();
        for id in to_untap {
            self.handle_event(GameEvent::untap(id));
        }

        self.log.push(
            self.turn.turn_number,
            LogKind::System,
            &format!("turn {} begins", self.turn.turn_number),
        );
        self.handle_event(GameEvent::turn_began(
            self.turn.active_player,
            self.turn.turn_number,
        ));

        state_based::sweep(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CardType;

    #[test]
    fn test_move_object_reincarnates_and_keeps_lki() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bear = game.add_object(
            Object::permanent("Bear", ada)
                .with_types(&[CardType::Creature])
                .with_pt(2, 2),
        );
        let stable = game.object(bear).unwrap().stable_id;

        let dead = game.move_object(bear, Zone::Graveyard).unwrap();
        assert_ne!(dead, bear);
        assert!(game.object(bear).is_none());
        assert_eq!(game.object(dead).unwrap().stable_id, stable);
        assert_eq!(game.object(dead).unwrap().zone, Zone::Graveyard);
        assert!(game.player(ada).unwrap().graveyard.contains(&dead));
        assert!(!game.battlefield.contains(&bear));

        let snapshot = game.last_known(bear).unwrap();
        assert_eq!(snapshot.stable_id, stable);
        assert!(snapshot.is_creature());
    }

    #[test]
    fn test_advance_turn_rotates_and_untaps() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bo = game.players[1].id;
        let mine = game.add_object(Object::permanent("Mine", bo));
        game.object_mut(mine).unwrap().tapped = true;

        assert_eq!(game.turn.active_player, ada);
        game.advance_turn();
        assert_eq!(game.turn.turn_number, 2);
        assert_eq!(game.turn.active_player, bo);
        assert!(!game.object(mine).unwrap().tapped);
    }

    #[test]
    fn test_damage_wears_off_at_turn_end() {
        use crate::event::EventTarget;

        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bear = game.add_object(
            Object::permanent("Bear", ada)
                .with_types(&[CardType::Creature])
                .with_pt(2, 3),
        );

        game.handle_event(GameEvent::damage(None, EventTarget::Object(bear), 2, false));
        assert_eq!(game.object(bear).unwrap().damage, 2);

        game.advance_turn();
        game.advance_turn();
        assert_eq!(game.object(bear).unwrap().damage, 0);

        // Fresh sub-lethal damage on a later turn does not stack with the
        // damage from before.
        game.handle_event(GameEvent::damage(None, EventTarget::Object(bear), 1, false));
        state_based::sweep(&mut game);
        assert!(game.object(bear).is_some());
    }

    #[test]
    fn test_apnap_order_starts_at_active_player() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        let bo = game.players[1].id;
        assert_eq!(game.players_apnap(), vec![ada, bo]);
        game.turn.active_player = bo;
        assert_eq!(game.players_apnap(), vec![bo, ada]);
    }
}
