pub mod ability;
pub mod activation;
pub mod as_though;
pub mod color;
pub mod condition;
pub mod continuous;
pub mod cost;
pub mod decision;
pub mod dependency;
pub mod effect;
pub mod effects;
pub mod event;
pub mod game_state;
pub mod ids;
pub mod log;
pub mod mana;
pub mod object;
pub mod pipeline;
pub mod player;
pub mod replacement;
pub mod snapshot;
pub mod stack;
pub mod state_based;
pub mod target;
pub mod triggers;
pub mod types;
pub mod watcher;
pub mod zone;


pub use ability::{
    Ability, AbilityKind, ActivatedSpec, ActivationError, ActivationStatus, MayActivate, Timing,
};
pub use activation::{ActivationInfo, ActivationLedger};
pub use as_though::{AsThoughEffect, AsThoughKind, AsThoughManager, AsThoughScope};
pub use color::{Color, ColorSet};
pub use condition::Condition;
pub use continuous::{
    Affected, Characteristics, ContinuousEffect, ContinuousEffectManager, Duration,
    EffectSourceType, Layer, Modification, PtSublayer, calculate_characteristics,
};
pub use cost::{Cost, CostError, PaidCost, TotalCost};
pub use decision::{AutoDecisionMaker, DecisionMaker, ScriptedDecisionMaker};
pub use effect::{Effect, EffectContext, OneShotEffect};
pub use event::{EventKind, EventTarget, GameEvent};
pub use game_state::{GameState, TurnState};
pub use ids::{AbilityId, AbilityInstanceId, EffectId, ObjectId, PlayerId, StableId};
pub use log::{GameLog, LogEntry, LogKind};
pub use mana::{ManaCost, ManaPool, ManaSymbol};
pub use object::{CounterType, Object, ObjectKind};
pub use pipeline::EventOutcome;
pub use player::Player;
pub use replacement::{
    DamageToPlayerMatcher, EventModification, KindMatcher, ReplacementAction, ReplacementEffect,
    ReplacementEffectManager, ReplacementMatcher, ThisWouldDieMatcher, WouldDrawMatcher,
    WouldGainLifeMatcher,
};
pub use snapshot::ObjectSnapshot;
#[cfg(feature = "serialization")]
pub use snapshot::{GameSnapshot, PlayerSnapshot};
pub use stack::{Resolution, Stack, StackEntry};
pub use target::{Target, TargetFilter, TargetSpec};
pub use triggers::{TriggerMatcher, TriggerSpec, TriggeredEntry};
pub use watcher::{ResetBoundary, Watcher, WatcherRegistry, WatcherScope};
pub use zone::{WatchZone, Zone};
