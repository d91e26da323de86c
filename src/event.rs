//! Game events.
//!
//! A `GameEvent` describes something that happened or is about to happen.
//! Events are value types: once dispatch begins they must be treated as
//! immutable, and replacement effects produce *new* events rather than
//! editing one in place. Every event carries the list of replacement-effect
//! ids that have already been consulted for it, which is how the engine
//! guarantees that a replacement effect never applies twice to the same
//! logical event, no matter how many times the event is rewritten.

use std::collections::BTreeMap;

use crate::ids::{EffectId, ObjectId, PlayerId};
use crate::zone::Zone;

/// The closed taxonomy of event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Damage dealt to a player or object.
    Damage,
    /// Several damage packets dealt at the same instant (batch).
    DamageBatch,
    /// An object moving between zones.
    ZoneChange,
    /// Several zone changes at the same instant (batch).
    ZoneChangeBatch,
    /// An object entering the battlefield (specialized zone change).
    EnterBattlefield,
    /// An object leaving the battlefield (specialized zone change).
    LeaveBattlefield,
    /// A permanent being destroyed.
    Destroy,
    /// A permanent being sacrificed.
    Sacrifice,
    /// A permanent becoming tapped.
    Tap,
    /// A permanent becoming untapped.
    Untap,
    /// A player drawing a card.
    Draw,
    /// A player discarding a card.
    Discard,
    /// A player gaining life.
    GainLife,
    /// A player losing life.
    LoseLife,
    /// Counters being placed on a permanent.
    PutCounters,
    /// Counters being removed from a permanent.
    RemoveCounters,
    /// A spell being cast.
    CastSpell,
    /// An ability being activated. Fired as a non-committing probe during
    /// legality checks so replacement effects can veto the activation.
    ActivateAbility,
    /// A triggered ability being put on the stack.
    TriggerStacked,
    /// A player shuffling their library.
    ShuffleLibrary,
    /// A turn began.
    TurnBegan,
    /// A turn ended.
    TurnEnded,
}

impl EventKind {
    /// Whether events of this kind aggregate sub-events.
    pub fn is_batch(self) -> bool {
        matches!(self, EventKind::DamageBatch | EventKind::ZoneChangeBatch)
    }
}

/// The target of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Player(PlayerId),
    Object(ObjectId),
}

/// Something that happened, or is proposed to happen, in the game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    pub kind: EventKind,
    /// The object that caused this event, if any.
    pub source: Option<ObjectId>,
    /// The primary target, if any.
    pub target: Option<EventTarget>,
    /// The player this event concerns (drawer, life gainer, controller...).
    pub player: Option<PlayerId>,
    /// Magnitude: damage amount, cards drawn, counters placed, life gained.
    pub amount: i32,
    /// Generic boolean qualifier (combat damage, tapped-on-entry, ...).
    pub flag: bool,
    /// Free-form data for card-specific consumers. BTreeMap keeps iteration
    /// deterministic for state hashing.
    pub data: BTreeMap<String, String>,
    /// Zone the object is moving from (zone-change kinds only).
    pub from_zone: Option<Zone>,
    /// Zone the object is moving to (zone-change kinds only).
    pub to_zone: Option<Zone>,
    /// Replacement effects already consulted for this logical event.
    ///
    /// Propagated onto every event produced by a replacement, across the
    /// whole chain, and never cleared for descendants of the same original
    /// event.
    pub applied_effects: Vec<EffectId>,
    /// Sub-events for batch kinds. They share this event's nominal instant.
    pub sub_events: Vec<GameEvent>,
}

impl GameEvent {
    /// Create a bare event of the given kind.
    pub fn new(kind: EventKind) -> Self {
        Self {
            kind,
            source: None,
            target: None,
            player: None,
            amount: 0,
            flag: false,
            data: BTreeMap::new(),
            from_zone: None,
            to_zone: None,
            applied_effects: Vec::new(),
            sub_events: Vec::new(),
        }
    }

    /// A batch event aggregating sub-events fired atomically.
    ///
    /// When a caller fires both the batch and its singular sub-events for
    /// compatibility, watchers must be written to process one form or the
    /// other without double-counting; the pipeline fires exactly what it is
    /// given.
    pub fn batch(kind: EventKind, sub_events: Vec<GameEvent>) -> Self {
        debug_assert!(kind.is_batch());
        let mut event = Self::new(kind);
        event.sub_events = sub_events;
        event
    }

    /// Damage from `source` to `target`.
    pub fn damage(source: Option<ObjectId>, target: EventTarget, amount: i32, combat: bool) -> Self {
        let mut event = Self::new(EventKind::Damage);
        event.source = source;
        event.target = Some(target);
        event.amount = amount;
        event.flag = combat;
        if let EventTarget::Player(player) = target {
            event.player = Some(player);
        }
        event
    }

    /// `object` moving from one zone to another.
    pub fn zone_change(object: ObjectId, from: Zone, to: Zone) -> Self {
        let mut event = Self::new(EventKind::ZoneChange);
        event.target = Some(EventTarget::Object(object));
        event.from_zone = Some(from);
        event.to_zone = Some(to);
        event
    }

    /// `player` gaining `amount` life.
    pub fn gain_life(player: PlayerId, amount: i32) -> Self {
        let mut event = Self::new(EventKind::GainLife);
        event.player = Some(player);
        event.amount = amount;
        event
    }

    /// `player` losing `amount` life.
    pub fn lose_life(player: PlayerId, amount: i32) -> Self {
        let mut event = Self::new(EventKind::LoseLife);
        event.player = Some(player);
        event.amount = amount;
        event
    }

    /// `player` drawing a card.
    pub fn draw(player: PlayerId) -> Self {
        let mut event = Self::new(EventKind::Draw);
        event.player = Some(player);
        event.amount = 1;
        event
    }

    /// `object` becoming tapped.
    pub fn tap(object: ObjectId) -> Self {
        let mut event = Self::new(EventKind::Tap);
        event.target = Some(EventTarget::Object(object));
        event
    }

    /// `object` becoming untapped.
    pub fn untap(object: ObjectId) -> Self {
        let mut event = Self::new(EventKind::Untap);
        event.target = Some(EventTarget::Object(object));
        event
    }

    /// The non-committing "about to activate" probe event.
    pub fn activate_ability(source: ObjectId, player: PlayerId) -> Self {
        let mut event = Self::new(EventKind::ActivateAbility);
        event.source = Some(source);
        event.player = Some(player);
        event
    }

    /// The turn-began phase boundary event.
    pub fn turn_began(active_player: PlayerId, turn: u32) -> Self {
        let mut event = Self::new(EventKind::TurnBegan);
        event.player = Some(active_player);
        event.amount = turn as i32;
        event
    }

    /// The object this event is about, if any.
    pub fn target_object(&self) -> Option<ObjectId> {
        match self.target {
            Some(EventTarget::Object(id)) => Some(id),
            _ => None,
        }
    }

    /// The player this event is about, falling back to a player target.
    pub fn target_player(&self) -> Option<PlayerId> {
        match self.target {
            Some(EventTarget::Player(id)) => Some(id),
            _ => self.player,
        }
    }

    /// Whether `effect` has already been consulted for this logical event.
    pub fn was_replaced_by(&self, effect: EffectId) -> bool {
        self.applied_effects.contains(&effect)
    }

    /// Derive a rewritten event from this one, recording the replacement
    /// effect that produced it. The applied-effects list carries over so the
    /// same effect is never offered the descendant event.
    pub fn replaced_with(&self, mut replacement: GameEvent, effect: EffectId) -> GameEvent {
        replacement
            .applied_effects
            .extend(self.applied_effects.iter().copied());
        if !replacement.applied_effects.contains(&effect) {
            replacement.applied_effects.push(effect);
        }
        for sub in &mut replacement.sub_events {
            for &applied in &replacement.applied_effects.clone() {
                if !sub.applied_effects.contains(&applied) {
                    sub.applied_effects.push(applied);
                }
            }
        }
        replacement
    }

    /// Attach a free-form data entry.
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    pub fn with_source(mut self, source: ObjectId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_object_target(mut self, object: ObjectId) -> Self {
        self.target = Some(EventTarget::Object(object));
        self
    }

    pub fn with_amount(mut self, amount: i32) -> Self {
        self.amount = amount;
        self
    }
}
