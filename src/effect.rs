//! Effects: what an ability does when it resolves.
//!
//! An effect is either a one-shot mutation (dealt through the event pipeline
//! so replacements and triggers see it) or the registration of a lasting
//! effect: continuous, replacement, or as-though. Lasting effects are carried
//! as templates on the ability and instantiated at resolution, when the
//! resolving source, controller, and turn are known.

use std::fmt::Debug;

use crate::as_though::{AsThoughEffect, AsThoughKind, AsThoughScope};
use crate::continuous::{Affected, ContinuousEffect, Duration, Modification};
use crate::game_state::GameState;
use crate::ids::{ObjectId, PlayerId};
use crate::replacement::{ReplacementAction, ReplacementEffect, ReplacementMatcher};
use crate::target::Target;
use crate::types::CardType;

/// Resolution context: who is resolving, from what source, at what.
#[derive(Debug, Clone)]
pub struct EffectContext {
    pub source: ObjectId,
    pub controller: PlayerId,
    pub targets: Vec<Target>,
}

impl EffectContext {
    pub fn new(source: ObjectId, controller: PlayerId) -> Self {
        Self {
            source,
            controller,
            targets: Vec::new(),
        }
    }

    pub fn with_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets = targets;
        self
    }

    pub fn first_object_target(&self) -> Option<ObjectId> {
        self.targets.iter().find_map(|t| match t {
            Target::Object(id) => Some(*id),
            Target::Player(_) => None,
        })
    }

    pub fn first_player_target(&self) -> Option<PlayerId> {
        self.targets.iter().find_map(|t| match t {
            Target::Player(id) => Some(*id),
            Target::Object(_) => None,
        })
    }
}

/// A one-shot game mutation.
///
/// `apply` returns whether anything happened; `false` fizzles this effect and
/// stops any later effects of the same resolution, while earlier effects
/// stand.
pub trait OneShotEffect: Debug + Send + Sync {
    fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool;

    fn clone_box(&self) -> Box<dyn OneShotEffect>;

    fn display(&self) -> String;
}

impl Clone for Box<dyn OneShotEffect> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// How long an instantiated lasting effect endures. Resolved into a concrete
/// `Duration` when the effect registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationKind {
    UntilEndOfTurn,
    WhileSourceOnBattlefield,
    EndOfGame,
}

impl DurationKind {
    fn instantiate(self, game: &GameState) -> Duration {
        match self {
            DurationKind::UntilEndOfTurn => Duration::EndOfTurn {
                created_turn: game.turn.turn_number,
            },
            DurationKind::WhileSourceOnBattlefield => Duration::WhileSourceOnBattlefield,
            DurationKind::EndOfGame => Duration::EndOfGame,
        }
    }
}

/// Whom a continuous-effect template applies to, resolved at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffectedTemplate {
    /// The resolving source itself.
    Source,
    /// The resolution's first object target.
    Target,
    AllCreatures,
    /// Creatures the resolving controller controls.
    CreaturesYouControl,
    AllOfType(CardType),
}

impl AffectedTemplate {
    fn instantiate(self, ctx: &EffectContext) -> Option<Affected> {
        match self {
            AffectedTemplate::Source => Some(Affected::Object(ctx.source)),
            AffectedTemplate::Target => ctx.first_object_target().map(Affected::Object),
            AffectedTemplate::AllCreatures => Some(Affected::AllCreatures),
            AffectedTemplate::CreaturesYouControl => {
                Some(Affected::CreaturesControlledBy(ctx.controller))
            }
            AffectedTemplate::AllOfType(card_type) => Some(Affected::AllOfType(card_type)),
        }
    }
}

/// Template for a replacement effect registered at resolution.
#[derive(Debug, Clone)]
pub struct ReplacementTemplate {
    pub matcher: Box<dyn ReplacementMatcher>,
    pub action: ReplacementAction,
    pub self_replacement: bool,
    pub one_shot: bool,
    pub duration: DurationKind,
}

/// Template for an as-though permission registered at resolution.
#[derive(Debug, Clone)]
pub struct AsThoughTemplate {
    pub kind: AsThoughKind,
    /// Cover everything the resolving controller controls rather than only
    /// the first object target.
    pub controller_scope: bool,
    pub duration: DurationKind,
}

/// One effect of an ability.
#[derive(Debug, Clone)]
pub enum Effect {
    OneShot(Box<dyn OneShotEffect>),
    Continuous {
        affected: AffectedTemplate,
        modification: Modification,
        duration: DurationKind,
    },
    Replacement(ReplacementTemplate),
    AsThough(AsThoughTemplate),
}

impl Effect {
    pub fn one_shot(effect: impl OneShotEffect + 'static) -> Self {
        Effect::OneShot(Box::new(effect))
    }

    /// Convenience: a +X/+Y (or -X/-Y) until end of turn on the first target.
    pub fn pump_target(power: i32, toughness: i32) -> Self {
        Effect::Continuous {
            affected: AffectedTemplate::Target,
            modification: Modification::ModifyPt { power, toughness },
            duration: DurationKind::UntilEndOfTurn,
        }
    }

    /// Apply this effect during resolution. Returns whether anything
    /// happened.
    pub fn apply(&self, game: &mut GameState, ctx: &EffectContext) -> bool {
        match self {
            Effect::OneShot(effect) => effect.apply(game, ctx),
            Effect::Continuous {
                affected,
                modification,
                duration,
            } => {
                let Some(affected) = affected.instantiate(ctx) else {
                    return false;
                };
                let duration = duration.instantiate(game);
                game.continuous_effects.register(ContinuousEffect::new(
                    ctx.source,
                    ctx.controller,
                    affected,
                    modification.clone(),
                    duration,
                ));
                true
            }
            Effect::Replacement(template) => {
                let duration = template.duration.instantiate(game);
                let mut effect = ReplacementEffect::new(
                    ctx.source,
                    ctx.controller,
                    template.matcher.clone(),
                    template.action.clone(),
                )
                .with_duration(duration);
                if template.self_replacement {
                    effect = effect.self_replacing();
                }
                if template.one_shot {
                    game.replacements.register_one_shot(effect);
                } else {
                    game.replacements.register(effect);
                }
                true
            }
            Effect::AsThough(template) => {
                let scope = if template.controller_scope {
                    AsThoughScope::Controller(ctx.controller)
                } else {
                    match ctx.first_object_target() {
                        Some(id) => AsThoughScope::Object(id),
                        None => return false,
                    }
                };
                let duration = template.duration.instantiate(game);
                game.as_though.register(
                    AsThoughEffect::new(template.kind, scope, ctx.source, ctx.controller)
                        .with_duration(duration),
                );
                true
            }
        }
    }

    pub fn display(&self) -> String {
        match self {
            Effect::OneShot(effect) => effect.display(),
            Effect::Continuous { modification, .. } => format!("apply {:?}", modification),
            Effect::Replacement(_) => "register a replacement effect".to_string(),
            Effect::AsThough(template) => format!("grant {:?}", template.kind),
        }
    }
}
