//! Object snapshots and exportable game snapshots.
//!
//! `ObjectSnapshot` captures an object's characteristics at a moment in time,
//! for "last known information" on zone-change events (the previous-zone
//! object no longer exists once it moves). `GameSnapshot` is a flat export of
//! public game state for replay and simulation tooling.

use crate::color::ColorSet;
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId, StableId};
use crate::object::Object;
use crate::types::CardType;
use crate::zone::Zone;

/// Last-known information about an object.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize))]
pub struct ObjectSnapshot {
    pub id: ObjectId,
    pub stable_id: StableId,
    pub name: String,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub zone: Zone,
    pub card_types: Vec<CardType>,
    pub colors: ColorSet,
    pub power: i32,
    pub toughness: i32,
    pub tapped: bool,
}

impl ObjectSnapshot {
    /// Capture an object's current calculated characteristics.
    pub fn capture(game: &GameState, object: &Object) -> Self {
        let characteristics = game.calculated_characteristics(object.id);
        let (power, toughness, card_types, colors, controller) = match characteristics {
            Some(c) => (c.power, c.toughness, c.card_types, c.colors, c.controller),
            None => (
                object.base_power,
                object.base_toughness,
                object.card_types.clone(),
                object.colors,
                object.controller,
            ),
        };
        Self {
            id: object.id,
            stable_id: object.stable_id,
            name: object.name.clone(),
            owner: object.owner,
            controller,
            zone: object.zone,
            card_types,
            colors,
            power,
            toughness,
            tapped: object.tapped,
        }
    }

    pub fn is_creature(&self) -> bool {
        self.card_types.contains(&CardType::Creature)
    }
}

/// Exportable view of one player.
#[cfg(feature = "serialization")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlayerSnapshot {
    pub name: String,
    pub life: i32,
    pub hand_size: usize,
    pub library_size: usize,
    pub graveyard_size: usize,
}

/// Exportable view of public game state.
#[cfg(feature = "serialization")]
#[derive(Debug, Clone, serde::Serialize)]
pub struct GameSnapshot {
    pub turn: u32,
    pub active_player: String,
    pub players: Vec<PlayerSnapshot>,
    pub battlefield: Vec<ObjectSnapshot>,
    pub stack_size: usize,
}

#[cfg(feature = "serialization")]
impl GameSnapshot {
    /// Capture the current public game state.
    pub fn capture(game: &GameState) -> Self {
        let active = game
            .player(game.turn.active_player)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        Self {
            turn: game.turn.turn_number,
            active_player: active,
            players: game
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    name: p.name.clone(),
                    life: p.life,
                    hand_size: p.hand.len(),
                    library_size: p.library.len(),
                    graveyard_size: p.graveyard.len(),
                })
                .collect(),
            battlefield: game
                .battlefield
                .iter()
                .filter_map(|&id| game.object(id))
                .map(|object| ObjectSnapshot::capture(game, object))
                .collect(),
            stack_size: game.stack.len(),
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(all(test, feature = "serialization"))]
mod tests {
    use super::*;
    use crate::object::Object;

    #[test]
    fn test_game_snapshot_exports_public_state() {
        let mut game = GameState::two_players("Ada", "Bo");
        let ada = game.players[0].id;
        game.add_object(
            Object::permanent("Bear", ada)
                .with_types(&[CardType::Creature])
                .with_pt(2, 2),
        );

        let json = GameSnapshot::capture(&game).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["turn"], 1);
        assert_eq!(value["active_player"], "Ada");
        assert_eq!(value["players"].as_array().unwrap().len(), 2);
        assert_eq!(value["players"][0]["life"], 20);
        assert_eq!(value["battlefield"][0]["name"], "Bear");
        assert_eq!(value["battlefield"][0]["power"], 2);
        assert_eq!(value["stack_size"], 0);
    }
}
