//! Players.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::ids::{ObjectId, PlayerId};
use crate::mana::ManaPool;

/// A player in the game.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub life: i32,
    pub mana_pool: ManaPool,
    /// Object ids of cards in this player's library, top of library last.
    pub library: Vec<ObjectId>,
    pub hand: Vec<ObjectId>,
    pub graveyard: Vec<ObjectId>,
    pub lost: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            life: 20,
            mana_pool: ManaPool::new(),
            library: Vec::new(),
            hand: Vec::new(),
            graveyard: Vec::new(),
            lost: false,
        }
    }

    /// Remove and return the top card of the library.
    pub fn draw_from_library(&mut self) -> Option<ObjectId> {
        self.library.pop()
    }

    pub fn shuffle_library<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.library.shuffle(rng);
    }

    /// Whether `other` is an opponent of this player. Two-or-more player
    /// free-for-all: everyone else is an opponent.
    pub fn has_opponent(&self, other: PlayerId) -> bool {
        self.id != other
    }
}
