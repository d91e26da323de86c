use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

/// Global counter for auto-incrementing player IDs.
static PLAYER_ID_COUNTER: AtomicU8 = AtomicU8::new(0);
/// Global counter for auto-incrementing object IDs (starts at 1, 0 is reserved).
static OBJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
/// Global counter for auto-incrementing ability original IDs (starts at 1).
static ABILITY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
/// Global counter for auto-incrementing ability instance IDs (starts at 1).
static ABILITY_INSTANCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
/// Global counter for auto-incrementing effect IDs (starts at 1).
static EFFECT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Player identifier, index-based for efficiency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u8);

/// Unique object identifier, monotonically increasing.
/// Never reused - when an object changes zones, it becomes a new object with
/// a new ID. Use `StableId` to follow an object across zone changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub u64);

/// Stable object instance identifier used across zone changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct StableId(pub ObjectId);

/// Original identity of a printed ability.
///
/// Stable across `Ability::copy_instance()`: every instance stamped from the
/// same printed ability shares one `AbilityId`. Per-turn activation counters
/// are keyed by this, so re-instantiating an ability (stack copies,
/// simulation copies of the game state) cannot reset them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u64);

/// Identity of one ability instance. Fresh on every `Ability::copy_instance()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityInstanceId(pub u64);

/// Identity of a registered effect (continuous, replacement, or as-though).
///
/// Carried in `GameEvent::applied_effects` to enforce the replace-only-once
/// guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u64);

impl PlayerId {
    /// Create a new player ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(PLAYER_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create a player ID from a specific index (for when you need explicit control).
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectId {
    /// Create a new object ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(OBJECT_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create an object ID from a specific value (for when you need explicit control).
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl StableId {
    /// Create a stable ID from an object ID.
    pub fn from_object_id(id: ObjectId) -> Self {
        Self(id)
    }

    /// Access the inner object ID.
    pub fn object_id(self) -> ObjectId {
        self.0
    }
}

impl From<ObjectId> for StableId {
    fn from(value: ObjectId) -> Self {
        Self(value)
    }
}

impl AbilityId {
    /// Create a new ability original ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(ABILITY_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create an ability ID from a specific value.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl Default for AbilityId {
    fn default() -> Self {
        Self::new()
    }
}

impl AbilityInstanceId {
    /// Create a new ability instance ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(ABILITY_INSTANCE_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for AbilityInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectId {
    /// Create a new effect ID with auto-incrementing counter.
    pub fn new() -> Self {
        Self(EFFECT_ID_COUNTER.fetch_add(1, Ordering::SeqCst))
    }

    /// Create an effect ID from a specific value.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl Default for EffectId {
    fn default() -> Self {
        Self::new()
    }
}

/// Reset all ID counters to their initial state (for testing).
/// This should only be used in tests to ensure deterministic behavior.
#[cfg(test)]
pub fn reset_id_counters() {
    PLAYER_ID_COUNTER.store(0, Ordering::SeqCst);
    OBJECT_ID_COUNTER.store(1, Ordering::SeqCst);
    ABILITY_ID_COUNTER.store(1, Ordering::SeqCst);
    ABILITY_INSTANCE_ID_COUNTER.store(1, Ordering::SeqCst);
    EFFECT_ID_COUNTER.store(1, Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_from_index() {
        let p1 = PlayerId::from_index(5);
        let p2 = PlayerId::from_index(10);
        assert_eq!(p1.index(), 5);
        assert_eq!(p2.index(), 10);
    }

    #[test]
    fn test_object_id_auto_increment() {
        let o1 = ObjectId::new();
        let o2 = ObjectId::new();
        assert_ne!(o1, o2);
    }

    #[test]
    fn test_ability_instance_ids_are_fresh() {
        let instance_a = AbilityInstanceId::new();
        let instance_b = AbilityInstanceId::new();
        assert_ne!(instance_a, instance_b);
    }

    #[test]
    fn test_stable_id_round_trip() {
        let obj = ObjectId::from_raw(42);
        let stable = StableId::from_object_id(obj);
        assert_eq!(stable.object_id(), obj);
    }
}
