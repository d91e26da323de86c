//! Game objects: cards, permanents, and tokens.
//!
//! A permanent is a distinct runtime entity from the card that spawned it.
//! Zone changes re-instantiate the object under a fresh `ObjectId`; the
//! `StableId` thread links the incarnations together.

use std::collections::BTreeMap;

use crate::ability::Ability;
use crate::color::ColorSet;
use crate::ids::{ObjectId, PlayerId, StableId};
use crate::types::CardType;
use crate::zone::Zone;

/// What kind of runtime entity this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// A card in a non-battlefield zone.
    Card,
    /// A card instantiated on the battlefield.
    Permanent,
    /// A token (ceases to exist outside the battlefield).
    Token,
}

/// A kind of counter a permanent can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterType {
    PlusOnePlusOne,
    MinusOneMinusOne,
    Charge,
    Loyalty,
}

impl CounterType {
    /// Parse the name produced by `Debug`, used in event data entries.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "PlusOnePlusOne" => Some(CounterType::PlusOnePlusOne),
            "MinusOneMinusOne" => Some(CounterType::MinusOneMinusOne),
            "Charge" => Some(CounterType::Charge),
            "Loyalty" => Some(CounterType::Loyalty),
            _ => None,
        }
    }
}

/// A game object resident in some zone.
#[derive(Debug, Clone)]
pub struct Object {
    pub id: ObjectId,
    /// Stable identity across zone changes.
    pub stable_id: StableId,
    pub kind: ObjectKind,
    pub name: String,
    /// Owner never changes for the object's whole life.
    pub owner: PlayerId,
    /// Controller can change independently of ownership on the battlefield.
    pub controller: PlayerId,
    pub zone: Zone,
    pub card_types: Vec<CardType>,
    pub colors: ColorSet,
    /// Printed power (creatures only; 0 otherwise).
    pub base_power: i32,
    /// Printed toughness (creatures only; 0 otherwise).
    pub base_toughness: i32,
    pub abilities: Vec<Ability>,
    pub counters: BTreeMap<CounterType, u32>,
    pub tapped: bool,
    /// Damage marked this turn.
    pub damage: i32,
    pub attached_to: Option<ObjectId>,
}

impl Object {
    /// Create a card object in a zone.
    pub fn card(name: &str, owner: PlayerId, zone: Zone) -> Self {
        let id = ObjectId::new();
        Self {
            id,
            stable_id: StableId::from_object_id(id),
            kind: ObjectKind::Card,
            name: name.to_string(),
            owner,
            controller: owner,
            zone,
            card_types: Vec::new(),
            colors: ColorSet::colorless(),
            base_power: 0,
            base_toughness: 0,
            abilities: Vec::new(),
            counters: BTreeMap::new(),
            tapped: false,
            damage: 0,
            attached_to: None,
        }
    }

    /// Create a permanent directly on the battlefield (tests, tokens).
    pub fn permanent(name: &str, owner: PlayerId) -> Self {
        let mut object = Self::card(name, owner, Zone::Battlefield);
        object.kind = ObjectKind::Permanent;
        object
    }

    pub fn with_types(mut self, types: &[CardType]) -> Self {
        self.card_types = types.to_vec();
        self
    }

    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_pt(mut self, power: i32, toughness: i32) -> Self {
        self.base_power = power;
        self.base_toughness = toughness;
        self
    }

    /// Attach an ability at construction time. The ability's source is bound
    /// to this object.
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability.bound_to(self.id, self.controller));
        self
    }

    pub fn is_creature(&self) -> bool {
        self.card_types.contains(&CardType::Creature)
    }

    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    pub fn counters(&self, kind: CounterType) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_counters(&mut self, kind: CounterType, count: u32) {
        *self.counters.entry(kind).or_insert(0) += count;
    }

    pub fn remove_counters(&mut self, kind: CounterType, count: u32) -> u32 {
        let entry = self.counters.entry(kind).or_insert(0);
        let removed = count.min(*entry);
        *entry -= removed;
        if *entry == 0 {
            self.counters.remove(&kind);
        }
        removed
    }

    /// Re-instantiate this object into a new zone.
    ///
    /// The new incarnation gets a fresh `ObjectId` and battlefield-only state
    /// (tap, damage, counters, control changes) is wiped; the `StableId` and
    /// ownership carry over.
    pub fn reincarnate(&self, to: Zone) -> Object {
        let mut next = self.clone();
        next.id = ObjectId::new();
        next.zone = to;
        next.kind = if to == Zone::Battlefield {
            ObjectKind::Permanent
        } else {
            ObjectKind::Card
        };
        next.controller = next.owner;
        next.tapped = false;
        next.damage = 0;
        next.counters.clear();
        next.attached_to = None;
        // Abilities follow the object: rebind their source to the new id.
        next.abilities = self
            .abilities
            .iter()
            .map(|a| a.clone().bound_to(next.id, next.controller))
            .collect();
        next
    }
}
