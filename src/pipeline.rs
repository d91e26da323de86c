//! The event pipeline.
//!
//! Every proposed event runs the same course: the replacement chain rewrites
//! or prevents it, the survivor is committed (state mutates), watchers
//! observe the committed event, and matching triggered abilities are ordered
//! APNAP and put on the stack. Derived events (a destroy committing as a zone
//! change, a stacked trigger) go onto a worklist and run the full course
//! themselves, so the pipeline never recurses. Probe mode runs only the
//! replacement chain, mutating nothing; it answers "would this event be
//! prevented" for legality checks.

use std::collections::VecDeque;
use std::mem;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::decision::{AutoDecisionMaker, DecisionMaker};
use crate::event::{EventKind, EventTarget, GameEvent};
use crate::game_state::GameState;
use crate::log::LogKind;
use crate::object::CounterType;
use crate::replacement::ReplacementEffect;
use crate::stack::StackEntry;
use crate::triggers::{self, TriggeredEntry};
use crate::zone::Zone;

/// Cap on rewrites of a single event. A chain this long is a bug in effect
/// setup; the event commits as-is when the cap is hit.
const MAX_REPLACEMENT_ROUNDS: usize = 64;

/// Cap on derived events handled for one originating event.
const MAX_EVENTS_PER_DISPATCH: usize = 1024;

/// What happened to the event that was handed in.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The event (possibly rewritten) was committed.
    Committed(GameEvent),
    /// A replacement effect prevented it.
    Prevented,
}

impl EventOutcome {
    pub fn committed(&self) -> bool {
        matches!(self, EventOutcome::Committed(_))
    }

    /// The committed form of the event, if it survived.
    pub fn event(&self) -> Option<&GameEvent> {
        match self {
            EventOutcome::Committed(event) => Some(event),
            EventOutcome::Prevented => None,
        }
    }
}

/// Run one proposed event, and everything it sets off, to completion.
pub fn process_event(game: &mut GameState, event: GameEvent) -> EventOutcome {
    let mut worklist: VecDeque<GameEvent> = VecDeque::new();
    worklist.push_back(event);
    let mut outcome = None;
    let mut processed = 0usize;

    while let Some(event) = worklist.pop_front() {
        processed += 1;
        if processed > MAX_EVENTS_PER_DISPATCH {
            game.log.push(
                game.turn.turn_number,
                LogKind::System,
                "event cascade cap reached, dropping remaining events",
            );
            break;
        }
        let original = processed == 1;

        let Some(survivor) = run_replacements(game, event) else {
            if original {
                outcome = Some(EventOutcome::Prevented);
            }
            continue;
        };

        let follow_ups = apply_event(game, &survivor);

        // Watchers observe the committed event. The registry is taken out so
        // watchers can read the game they are observing.
        let mut watchers = mem::take(&mut game.watchers);
        watchers.dispatch(&survivor, game);
        game.watchers = watchers;

        let detected = triggers::check_triggers(game, &survivor);
        if !detected.is_empty() {
            let mut decisions: Box<dyn DecisionMaker> =
                mem::replace(&mut game.decisions, Box::new(AutoDecisionMaker));
            let ordered = triggers::order_apnap(game, detected, decisions.as_mut());
            for entry in ordered {
                stack_trigger(game, entry, decisions.as_mut(), &mut worklist);
            }
            game.decisions = decisions;
        }

        worklist.extend(follow_ups);

        if original {
            outcome = Some(EventOutcome::Committed(survivor));
        }
    }

    outcome.unwrap_or(EventOutcome::Prevented)
}

/// Replacement-only evaluation of a proposed event. Mutates nothing and
/// consumes no one-shot effects; choices fall to the deterministic default.
pub fn probe_event(game: &GameState, event: GameEvent) -> bool {
    let mut auto = AutoDecisionMaker;
    let mut event = event;
    for _ in 0..MAX_REPLACEMENT_ROUNDS {
        let applicable = game.replacements.applicable(&event, game);
        if applicable.is_empty() {
            return true;
        }
        let index = if applicable[0].self_replacement {
            0
        } else {
            let affected = affected_player(game, &event);
            auto.choose_replacement(affected, &applicable)
        };
        match applicable[index].apply(&event) {
            None => return false,
            Some(next) => event = next,
        }
    }
    true
}

/// The player on the receiving end of an event, who chooses among applicable
/// replacement effects.
fn affected_player(game: &GameState, event: &GameEvent) -> crate::ids::PlayerId {
    event
        .target_player()
        .or(event.player)
        .or_else(|| {
            event
                .target_object()
                .and_then(|id| game.object(id))
                .map(|o| o.controller)
        })
        .unwrap_or(game.turn.active_player)
}

/// Chain replacement effects over one event until none applies. Returns
/// `None` when a replacement prevents the event.
fn run_replacements(game: &mut GameState, mut event: GameEvent) -> Option<GameEvent> {
    for _ in 0..MAX_REPLACEMENT_ROUNDS {
        let applicable: Vec<ReplacementEffect> = game
            .replacements
            .applicable(&event, game)
            .into_iter()
            .cloned()
            .collect();
        if applicable.is_empty() {
            return Some(event);
        }

        // Self-replacements apply first; otherwise the affected player
        // chooses which of the remaining effects applies next.
        let index = if applicable[0].self_replacement {
            0
        } else {
            let affected = affected_player(game, &event);
            let mut decisions: Box<dyn DecisionMaker> =
                mem::replace(&mut game.decisions, Box::new(AutoDecisionMaker));
            let refs: Vec<&ReplacementEffect> = applicable.iter().collect();
            let chosen = decisions.choose_replacement(affected, &refs);
            game.decisions = decisions;
            chosen.min(applicable.len() - 1)
        };

        let effect = &applicable[index];
        game.replacements.mark_applied(effect.id);
        match effect.apply(&event) {
            None => {
                game.log.push(
                    game.turn.turn_number,
                    LogKind::Event,
                    &format!("{:?} event prevented", event.kind),
                );
                return None;
            }
            Some(next) => event = next,
        }
    }
    game.log.push(
        game.turn.turn_number,
        LogKind::System,
        "replacement chain cap reached, committing event as-is",
    );
    Some(event)
}

/// Commit a survived event: perform its mutation. Returns derived events
/// that must run the full pipeline themselves.
fn apply_event(game: &mut GameState, event: &GameEvent) -> Vec<GameEvent> {
    let mut follow_ups = Vec::new();
    match event.kind {
        EventKind::Damage => {
            if event.amount <= 0 {
                return follow_ups;
            }
            match event.target {
                Some(EventTarget::Player(id)) => {
                    if let Some(player) = game.player_mut(id) {
                        player.life -= event.amount;
                    }
                }
                Some(EventTarget::Object(id)) => {
                    if let Some(object) = game.object_mut(id) {
                        object.damage += event.amount;
                    }
                }
                None => {}
            }
        }
        EventKind::DamageBatch | EventKind::ZoneChangeBatch => {
            // Sub-events were replaced as part of the batch; commit them
            // directly without another trip through the chain.
            for sub in &event.sub_events {
                follow_ups.extend(apply_event(game, sub));
            }
        }
        EventKind::ZoneChange => {
            if let (Some(object), Some(to)) = (event.target_object(), event.to_zone) {
                game.move_object(object, to);
            }
        }
        EventKind::EnterBattlefield => {
            if let Some(object) = event.target_object() {
                game.move_object(object, Zone::Battlefield);
            }
        }
        EventKind::LeaveBattlefield => {
            if let Some(object) = event.target_object() {
                game.move_object(object, event.to_zone.unwrap_or(Zone::Graveyard));
            }
        }
        EventKind::Destroy | EventKind::Sacrifice => {
            // Commits as a zone change, which runs the pipeline itself so
            // death replacements still apply.
            if let Some(object) = event.target_object()
                && game
                    .object(object)
                    .is_some_and(|o| o.zone == Zone::Battlefield)
            {
                follow_ups.push(GameEvent::zone_change(
                    object,
                    Zone::Battlefield,
                    Zone::Graveyard,
                ));
            }
        }
        EventKind::Tap => {
            if let Some(object) = event.target_object()
                && let Some(object) = game.object_mut(object)
            {
                object.tapped = true;
            }
        }
        EventKind::Untap => {
            if let Some(object) = event.target_object()
                && let Some(object) = game.object_mut(object)
            {
                object.tapped = false;
            }
        }
        EventKind::Draw => {
            if let Some(player) = event.player {
                let top = game.player(player).and_then(|p| p.library.last().copied());
                match top {
                    Some(card) => {
                        game.move_object(card, Zone::Hand);
                    }
                    None => {
                        // Drawing from an empty library loses the game.
                        if let Some(player) = game.player_mut(player) {
                            player.lost = true;
                        }
                        game.log.push(
                            game.turn.turn_number,
                            LogKind::System,
                            "a player drew from an empty library and lost",
                        );
                    }
                }
            }
        }
        EventKind::Discard => {
            let card = event
                .target_object()
                .or_else(|| {
                    event
                        .player
                        .and_then(|p| game.player(p))
                        .and_then(|p| p.hand.first().copied())
                });
            if let Some(card) = card {
                game.move_object(card, Zone::Graveyard);
            }
        }
        EventKind::GainLife => {
            if let (Some(id), true) = (event.player, event.amount > 0)
                && let Some(player) = game.player_mut(id)
            {
                player.life += event.amount;
            }
        }
        EventKind::LoseLife => {
            if let (Some(id), true) = (event.player, event.amount > 0)
                && let Some(player) = game.player_mut(id)
            {
                player.life -= event.amount;
            }
        }
        EventKind::PutCounters => {
            if let (Some(object), Some(kind)) = (
                event.target_object(),
                event.data.get("counter").and_then(|s| CounterType::parse(s)),
            ) && let Some(object) = game.object_mut(object)
            {
                object.add_counters(kind, event.amount.max(0) as u32);
            }
        }
        EventKind::RemoveCounters => {
            if let (Some(object), Some(kind)) = (
                event.target_object(),
                event.data.get("counter").and_then(|s| CounterType::parse(s)),
            ) && let Some(object) = game.object_mut(object)
            {
                object.remove_counters(kind, event.amount.max(0) as u32);
            }
        }
        EventKind::ShuffleLibrary => {
            if let Some(id) = event.player {
                let mut rng = mem::replace(&mut game.rng, StdRng::seed_from_u64(0));
                if let Some(player) = game.player_mut(id) {
                    player.shuffle_library(&mut rng);
                }
                game.rng = rng;
            }
        }
        // Marker events: watchers and triggers see them, nothing mutates.
        EventKind::CastSpell
        | EventKind::ActivateAbility
        | EventKind::TriggerStacked
        | EventKind::TurnBegan
        | EventKind::TurnEnded => {}
    }
    follow_ups
}

/// Put one detected trigger on the stack: choose its targets, push an
/// instance copy, and derive the trigger-stacked event.
fn stack_trigger(
    game: &mut GameState,
    entry: TriggeredEntry,
    decisions: &mut dyn DecisionMaker,
    worklist: &mut VecDeque<GameEvent>,
) {
    let ability = entry.ability.copy_instance();
    let turn = game.turn.turn_number;

    let mut targets = Vec::new();
    for spec in &ability.targets {
        let candidates = spec.candidates(game, entry.controller);
        if (candidates.len() as u32) < spec.count {
            // A trigger with no legal target never goes on the stack.
            game.log.push(
                turn,
                LogKind::Fizzle,
                &format!("{} removed: not enough legal targets", ability.text),
            );
            return;
        }
        targets.extend(decisions.choose_targets(entry.controller, &candidates, spec.count));
    }

    game.log.push(turn, LogKind::Event, &format!("triggered: {}", ability.text));
    game.stack
        .push(StackEntry::new(ability, entry.controller, targets));

    let mut stacked = GameEvent::new(EventKind::TriggerStacked);
    stacked.source = Some(entry.source);
    stacked.player = Some(entry.controller);
    worklist.push_back(stacked);
}
