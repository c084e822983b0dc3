//! Pickup effect application and the ledger of timed, reversible effects.

use sky_arena_core::{
    config::PickupConfig, ActorField, ActorId, EffectId, PickupKind, SubjectKind,
};
use thiserror::Error;

use crate::{fuel::FuelBar, kinematics::Actor, kinematics::Scaling};

/// Errors raised while applying pickup effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EffectError {
    /// The effect was handed a subject of the wrong category.
    #[error("{kind:?} pickup expects a {expected:?} subject but received {found:?}")]
    IncompatibleSubject {
        /// Pickup whose effect was applied.
        kind: PickupKind,
        /// Category the effect is bound to.
        expected: SubjectKind,
        /// Category that was supplied.
        found: SubjectKind,
    },
}

/// Effect bound to a pickup at construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickupEffect {
    /// Adds a fixed amount to a fuel bar.
    Refuel {
        /// Fuel added on collection.
        amount: f32,
    },
    /// Scales a numeric actor field, optionally for a limited time.
    Modifier {
        /// Variant tag reported to observers.
        kind: PickupKind,
        /// Field being scaled.
        field: ActorField,
        /// Scaling applied to the field.
        scaling: Scaling,
        /// Ticks before reverting, or `None` for a permanent change.
        duration: Option<u32>,
    },
}

impl PickupEffect {
    /// Resolves the configured effect for a pickup kind.
    #[must_use]
    pub fn for_kind(kind: PickupKind, config: &PickupConfig) -> Self {
        let (field, modifier) = match kind {
            PickupKind::Refuel => {
                return Self::Refuel {
                    amount: config.refuel_amount,
                }
            }
            PickupKind::TurnBoost => (ActorField::TurnStep, &config.turn_boost),
            PickupKind::SpeedBoost => (ActorField::SpeedStep, &config.speed_boost),
        };
        Self::Modifier {
            kind,
            field,
            scaling: Scaling::from(modifier),
            duration: modifier.timed_duration(),
        }
    }

    /// Variant tag of the effect.
    #[must_use]
    pub const fn kind(&self) -> PickupKind {
        match self {
            Self::Refuel { .. } => PickupKind::Refuel,
            Self::Modifier { kind, .. } => *kind,
        }
    }

    /// Category of subject the effect mutates.
    #[must_use]
    pub const fn subject(&self) -> SubjectKind {
        match self {
            Self::Refuel { .. } => SubjectKind::Fuel,
            Self::Modifier { .. } => SubjectKind::Actor,
        }
    }

    /// Ticks the effect lasts, or `None` when it is instantaneous or permanent.
    #[must_use]
    pub const fn duration_ticks(&self) -> Option<u32> {
        match self {
            Self::Refuel { .. } => None,
            Self::Modifier { duration, .. } => *duration,
        }
    }
}

/// Object a pickup effect mutates.
#[derive(Debug)]
pub enum EffectSubject<'a> {
    /// The collecting actor's fuel bar.
    Fuel(&'a mut FuelBar),
    /// The collecting actor.
    Actor(&'a mut Actor),
}

impl EffectSubject<'_> {
    /// Category of the subject.
    #[must_use]
    pub const fn kind(&self) -> SubjectKind {
        match self {
            Self::Fuel(_) => SubjectKind::Fuel,
            Self::Actor(_) => SubjectKind::Actor,
        }
    }
}

/// Applies a pickup effect to its subject.
///
/// Returns the [`ActiveEffect`] the caller must track when the effect is timed.
/// `effect_id` tags the modifier so that reverting it never disturbs others.
pub fn apply_pickup(
    effect: &PickupEffect,
    subject: EffectSubject<'_>,
    effect_id: EffectId,
) -> Result<Option<ActiveEffect>, EffectError> {
    match (effect, subject) {
        (PickupEffect::Refuel { amount }, EffectSubject::Fuel(bar)) => {
            let _ = bar.update(*amount);
            Ok(None)
        }
        (
            PickupEffect::Modifier {
                field,
                scaling,
                duration,
                ..
            },
            EffectSubject::Actor(actor),
        ) => {
            let tunable = actor.field_mut(*field);
            match duration {
                Some(ticks) => {
                    tunable.push_modifier(effect_id, *scaling);
                    Ok(Some(ActiveEffect {
                        id: effect_id,
                        actor: actor.id(),
                        field: *field,
                        remaining_ticks: *ticks,
                        fresh: true,
                    }))
                }
                None => {
                    tunable.rescale_base(*scaling);
                    Ok(None)
                }
            }
        }
        (effect, subject) => Err(EffectError::IncompatibleSubject {
            kind: effect.kind(),
            expected: effect.subject(),
            found: subject.kind(),
        }),
    }
}

/// Pending, time-limited modification of an actor field.
///
/// Holds the actor by identifier rather than by reference; the world resolves
/// it when the effect expires.
///
/// The tick an effect is collected in does not count toward its duration,
/// since the collecting actor has already moved by then.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveEffect {
    id: EffectId,
    actor: ActorId,
    field: ActorField,
    remaining_ticks: u32,
    fresh: bool,
}

impl ActiveEffect {
    /// Identifier tagging the effect's modifier.
    #[must_use]
    pub const fn id(&self) -> EffectId {
        self.id
    }

    /// Actor whose field is modified.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        self.actor
    }

    /// Field being modified.
    #[must_use]
    pub const fn field(&self) -> ActorField {
        self.field
    }

    /// Ticks left before the effect reverts.
    #[must_use]
    pub const fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks
    }

    /// Undoes the effect on `actor`.
    ///
    /// Returns `false` when there was nothing left to undo, so reverting twice
    /// leaves the field untouched.
    pub fn revert(&self, actor: &mut Actor) -> bool {
        actor.field_mut(self.field).remove_modifier(self.id)
    }
}

/// Tracks active effects and allocates their identifiers.
#[derive(Clone, Debug, Default)]
pub struct EffectLedger {
    active: Vec<ActiveEffect>,
    next_id: u32,
}

impl EffectLedger {
    /// Reserves a fresh effect identifier.
    pub fn allocate(&mut self) -> EffectId {
        let id = EffectId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Begins tracking a timed effect.
    pub fn track(&mut self, effect: ActiveEffect) {
        self.active.push(effect);
    }

    /// Effects that have not yet expired.
    #[must_use]
    pub fn active(&self) -> &[ActiveEffect] {
        &self.active
    }

    /// Ages every effect by one tick and returns the ones that expired.
    ///
    /// Effects tracked during the closing tick are not aged. Expired effects
    /// are removed from the ledger; the caller reverts them.
    pub fn advance(&mut self) -> Vec<ActiveEffect> {
        let mut expired = Vec::new();
        self.active.retain_mut(|effect| {
            if effect.fresh {
                effect.fresh = false;
                return true;
            }
            effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
            if effect.remaining_ticks == 0 {
                expired.push(*effect);
                false
            } else {
                true
            }
        });
        expired
    }

    /// Forgets every effect and restarts identifier allocation.
    pub fn clear(&mut self) {
        self.active.clear();
        self.next_id = 0;
    }
}
