//! Watchers: per-game accumulators over the event stream.
//!
//! A watcher subscribes to committed events and maintains derived state that
//! conditions and effects query ("did this permanent start the turn
//! untapped", "which players had a permanent leave the battlefield this
//! turn"). Watchers declare their own reset boundary; the framework's only
//! guarantee is that `reset()` is called at that boundary, from the single
//! turn-boundary dispatch in `GameState::advance_turn`.

use std::any::Any;
use std::collections::HashSet;
use std::fmt::Debug;

use crate::event::{EventKind, GameEvent};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId, StableId};
use crate::zone::Zone;

/// How a watcher's accumulated state is keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatcherScope {
    /// One instance for the whole game.
    Game,
    /// One instance per player.
    Player(PlayerId),
    /// One instance per card/object.
    Card(ObjectId),
}

/// When a watcher's `reset()` is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetBoundary {
    /// Reset at the end of every turn (per-turn facts).
    EndOfTurn,
    /// Never reset; persists for the whole game.
    Never,
}

/// An accumulator over the committed event stream.
///
/// `watch` observes every committed event; probe-mode events are never
/// offered to watchers. Batch events are delivered as given: a watcher that
/// handles both a batch kind and its singular sub-events must take care not
/// to double-count.
pub trait Watcher: Debug + Send + Sync {
    /// Stable key identifying this watcher type within the registry.
    fn key(&self) -> &'static str;

    /// Declared reset schedule.
    fn reset_boundary(&self) -> ResetBoundary {
        ResetBoundary::EndOfTurn
    }

    /// Observe a committed event.
    fn watch(&mut self, event: &GameEvent, game: &GameState);

    /// Clear per-boundary state.
    fn reset(&mut self);

    /// Clone into a boxed trait object.
    fn clone_box(&self) -> Box<dyn Watcher>;

    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn Watcher> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// All watchers registered for one game.
#[derive(Debug, Clone, Default)]
pub struct WatcherRegistry {
    watchers: Vec<(WatcherScope, Box<dyn Watcher>)>,
}

impl WatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a watcher. Re-registering the same `(key, scope)` pair is a
    /// no-op so that every copy of an ability can call this safely.
    pub fn register(&mut self, scope: WatcherScope, watcher: Box<dyn Watcher>) {
        let exists = self
            .watchers
            .iter()
            .any(|(s, w)| *s == scope && w.key() == watcher.key());
        if !exists {
            self.watchers.push((scope, watcher));
        }
    }

    /// Look up a watcher by concrete type and scope.
    pub fn get<W: Watcher + 'static>(&self, scope: WatcherScope) -> Option<&W> {
        self.watchers
            .iter()
            .filter(|(s, _)| *s == scope)
            .find_map(|(_, w)| w.as_any().downcast_ref::<W>())
    }

    /// Deliver a committed event to every watcher.
    pub fn dispatch(&mut self, event: &GameEvent, game: &GameState) {
        for (_, watcher) in &mut self.watchers {
            watcher.watch(event, game);
        }
    }

    /// Reset every watcher whose declared boundary matches.
    pub fn reset_at(&mut self, boundary: ResetBoundary) {
        for (_, watcher) in &mut self.watchers {
            if watcher.reset_boundary() == boundary {
                watcher.reset();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

/// Tracks which players had a permanent leave the battlefield this turn.
#[derive(Debug, Clone, Default)]
pub struct LeftBattlefieldWatcher {
    players: HashSet<PlayerId>,
}

impl LeftBattlefieldWatcher {
    pub const KEY: &'static str = "left-battlefield";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_had_permanent_leave(&self, player: PlayerId) -> bool {
        self.players.contains(&player)
    }
}

impl Watcher for LeftBattlefieldWatcher {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn watch(&mut self, event: &GameEvent, game: &GameState) {
        if event.kind != EventKind::ZoneChange && event.kind != EventKind::LeaveBattlefield {
            return;
        }
        if event.kind == EventKind::ZoneChange && event.from_zone != Some(Zone::Battlefield) {
            return;
        }
        if let Some(object) = event.target_object()
            && let Some(snapshot) = game.last_known(object)
        {
            self.players.insert(snapshot.controller);
        }
    }

    fn reset(&mut self) {
        self.players.clear();
    }

    fn clone_box(&self) -> Box<dyn Watcher> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Tracks which permanents were untapped when the turn began.
#[derive(Debug, Clone, Default)]
pub struct StartedTurnUntappedWatcher {
    untapped: HashSet<StableId>,
}

impl StartedTurnUntappedWatcher {
    pub const KEY: &'static str = "started-turn-untapped";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn started_untapped(&self, id: StableId) -> bool {
        self.untapped.contains(&id)
    }
}

impl Watcher for StartedTurnUntappedWatcher {
    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn watch(&mut self, event: &GameEvent, game: &GameState) {
        if event.kind != EventKind::TurnBegan {
            return;
        }
        // TurnBegan fires after the per-turn reset, so this records the
        // state of the battlefield as the new turn starts.
        for &id in &game.battlefield {
            if let Some(object) = game.object(id)
                && !object.tapped
            {
                self.untapped.insert(object.stable_id);
            }
        }
    }

    fn reset(&mut self) {
        self.untapped.clear();
    }

    fn clone_box(&self) -> Box<dyn Watcher> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
