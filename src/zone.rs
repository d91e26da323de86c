//! Game zones.

/// A zone an object can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
    Command,
}

impl Zone {
    /// Whether objects in this zone are public knowledge.
    pub fn is_public(self) -> bool {
        !matches!(self, Zone::Library | Zone::Hand)
    }
}

/// The zone a triggered ability watches events from.
///
/// Most triggered abilities only function while their source is on the
/// battlefield, but some fire from the graveyard, exile, or hand, and a few
/// watch from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WatchZone {
    #[default]
    Battlefield,
    Graveyard,
    Exile,
    Hand,
    Stack,
    Command,
    All,
}

impl WatchZone {
    /// Check whether a source in `zone` is allowed to watch events.
    pub fn matches(self, zone: Zone) -> bool {
        match self {
            WatchZone::Battlefield => zone == Zone::Battlefield,
            WatchZone::Graveyard => zone == Zone::Graveyard,
            WatchZone::Exile => zone == Zone::Exile,
            WatchZone::Hand => zone == Zone::Hand,
            WatchZone::Stack => zone == Zone::Stack,
            WatchZone::Command => zone == Zone::Command,
            WatchZone::All => true,
        }
    }
}
