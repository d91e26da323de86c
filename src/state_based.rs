//! State-based sweep.
//!
//! Run between resolutions and at turn boundaries, never in the middle of an
//! event. The sweep repeats until a pass changes nothing: expired lasting
//! effects are discarded (this is the only place they are), creatures with
//! zero or negative toughness are put into their owner's graveyard, creatures
//! with lethal damage are destroyed, and players at zero or less life lose.

use crate::event::{EventKind, GameEvent};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::log::LogKind;
use crate::types::CardType;
use crate::zone::Zone;

/// Cap on sweep passes. A sweep that keeps finding work this long is a loop
/// between effects and deaths; stop and leave the log as evidence.
const MAX_PASSES: usize = 100;

/// Run state-based checks until nothing changes.
pub fn sweep(game: &mut GameState) {
    for _ in 0..MAX_PASSES {
        if !pass(game) {
            return;
        }
    }
    game.log.push(
        game.turn.turn_number,
        LogKind::System,
        "state-based sweep cap reached",
    );
}

/// One pass. Returns true when it changed anything.
fn pass(game: &mut GameState) -> bool {
    let mut acted = false;

    acted |= discard_expired(game);

    // Creatures with toughness zero or less go to the graveyard; this is not
    // destruction, so it skips destruction replacements. Whether something is
    // a creature comes from its calculated types, so animated permanents are
    // swept too.
    let zero_toughness: Vec<ObjectId> = game
        .battlefield
        .iter()
        .copied()
        .filter(|&id| {
            game.calculated_characteristics(id).is_some_and(|c| {
                c.card_types.contains(&CardType::Creature) && c.toughness <= 0
            })
        })
        .collect();
    for id in zero_toughness {
        let message = format!(
            "{} put into graveyard: toughness is 0 or less",
            object_name(game, id)
        );
        game.log.push(game.turn.turn_number, LogKind::System, message);
        game.handle_event(GameEvent::zone_change(id, Zone::Battlefield, Zone::Graveyard));
        acted = true;
    }

    // Lethal damage destroys.
    let lethal: Vec<ObjectId> = game
        .battlefield
        .iter()
        .copied()
        .filter(|&id| {
            let Some(object) = game.object(id) else {
                return false;
            };
            if object.damage <= 0 {
                return false;
            }
            game.calculated_characteristics(id).is_some_and(|c| {
                c.card_types.contains(&CardType::Creature)
                    && c.toughness > 0
                    && object.damage >= c.toughness
            })
        })
        .collect();
    for id in lethal {
        let message = format!("{} destroyed: lethal damage", object_name(game, id));
        game.log.push(game.turn.turn_number, LogKind::System, message);
        game.handle_event(GameEvent::new(EventKind::Destroy).with_object_target(id));
        acted = true;
    }

    let dead_players: Vec<PlayerId> = game
        .players
        .iter()
        .filter(|p| !p.lost && p.life <= 0)
        .map(|p| p.id)
        .collect();
    for id in dead_players {
        if let Some(player) = game.player_mut(id) {
            player.lost = true;
        }
        game.log.push(
            game.turn.turn_number,
            LogKind::System,
            "a player lost: life is 0 or less",
        );
        acted = true;
    }

    acted
}

fn object_name(game: &GameState, id: ObjectId) -> String {
    game.object(id)
        .map(|o| o.name.clone())
        .unwrap_or_else(|| format!("object {:?}", id))
}

/// Discard lasting effects whose duration has run out. Returns true when any
/// were discarded.
fn discard_expired(game: &mut GameState) -> bool {
    let expired_continuous = game.continuous_effects.expired(game);
    let expired_replacements = game.replacements.expired(game);
    let expired_as_though = game.as_though.expired(game);
    let any = !expired_continuous.is_empty()
        || !expired_replacements.is_empty()
        || !expired_as_though.is_empty();

    game.continuous_effects.discard(&expired_continuous);
    game.replacements.discard(&expired_replacements);
    game.as_though.discard(&expired_as_though);
    any
}
