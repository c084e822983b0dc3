#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Sky Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The orchestrator submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! read immutable snapshots, and respond with new command batches or
//! [`Maneuver`] decisions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{ArenaConfig, ConfigError};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Sky Arena.";

/// Normalisation constant applied to every distance exposed to policies.
pub const DISTANCE_NORMALISATION: f32 = 500.0;

/// Number of discrete actions a decision source may choose from.
pub const ACTION_COUNT: usize = 5;

/// Discrete actions shared by every control source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Leave speed and heading untouched.
    Idle,
    /// Increase speed by the actor's speed step.
    SpeedUp,
    /// Decrease speed by the actor's speed step.
    SpeedDown,
    /// Subtract the turn step from the heading.
    TurnLeft,
    /// Add the turn step to the heading.
    TurnRight,
}

impl Action {
    /// Every action ordered by its policy index.
    pub const ALL: [Action; ACTION_COUNT] = [
        Self::Idle,
        Self::SpeedUp,
        Self::SpeedDown,
        Self::TurnLeft,
        Self::TurnRight,
    ];

    /// Resolves a policy action index into an action.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Index used by policies to refer to the action.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::SpeedUp => 1,
            Self::SpeedDown => 2,
            Self::TurnLeft => 3,
            Self::TurnRight => 4,
        }
    }
}

/// Speed component of a per-tick maneuver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Throttle {
    /// Keep the current speed.
    #[default]
    Hold,
    /// Accelerate by one speed step.
    Up,
    /// Decelerate by one speed step.
    Down,
}

/// Heading component of a per-tick maneuver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Steer {
    /// Keep the current heading.
    #[default]
    Straight,
    /// Subtract one turn step from the heading.
    Left,
    /// Add one turn step to the heading.
    Right,
}

/// Combined speed and heading adjustment applied to an actor in one tick.
///
/// Every [`Action`] maps onto a maneuver with at most one active component.
/// Manual control may assert both a throttle and a steer component at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Maneuver {
    /// Requested speed change.
    pub throttle: Throttle,
    /// Requested heading change.
    pub steer: Steer,
}

impl Maneuver {
    /// Maneuver that leaves the actor's controls untouched.
    pub const IDLE: Self = Self::new(Throttle::Hold, Steer::Straight);

    /// Creates a maneuver from its two components.
    #[must_use]
    pub const fn new(throttle: Throttle, steer: Steer) -> Self {
        Self { throttle, steer }
    }
}

impl From<Action> for Maneuver {
    fn from(action: Action) -> Self {
        match action {
            Action::Idle => Self::IDLE,
            Action::SpeedUp => Self::new(Throttle::Up, Steer::Straight),
            Action::SpeedDown => Self::new(Throttle::Down, Steer::Straight),
            Action::TurnLeft => Self::new(Throttle::Hold, Steer::Left),
            Action::TurnRight => Self::new(Throttle::Hold, Steer::Right),
        }
    }
}

/// Unique identifier assigned to an actor. Doubles as its fuel bar index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Position of the actor within the world's actor list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier assigned to a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetId(u32);

impl TargetId {
    /// Creates a new target identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a pickup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PickupId(u32);

impl PickupId {
    /// Creates a new pickup identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a timed pickup effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(u32);

impl EffectId {
    /// Creates a new effect identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Variants of pickups that can appear in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Adds a fixed amount to the collecting actor's fuel bar.
    Refuel,
    /// Scales the collecting actor's turn step.
    TurnBoost,
    /// Scales the collecting actor's speed step.
    SpeedBoost,
}

impl PickupKind {
    /// Every pickup kind in weight-table order.
    pub const ALL: [PickupKind; 3] = [Self::Refuel, Self::TurnBoost, Self::SpeedBoost];

    /// Category of object the pickup's effect mutates.
    #[must_use]
    pub const fn subject(self) -> SubjectKind {
        match self {
            Self::Refuel => SubjectKind::Fuel,
            Self::TurnBoost | Self::SpeedBoost => SubjectKind::Actor,
        }
    }
}

/// Category of object a pickup effect is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    /// The actor's paired fuel bar.
    Fuel,
    /// The actor's control parameters.
    Actor,
}

/// Actor fields that pickup effects may scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorField {
    /// Degrees added or removed from the heading per turn action.
    TurnStep,
    /// Speed added or removed per speed action.
    SpeedStep,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Runs one actor's sub-step: movement, collection, effects and fuel.
    Steer {
        /// Actor performing the maneuver.
        actor: ActorId,
        /// Controls applied before the actor moves.
        maneuver: Maneuver,
    },
    /// Places a new target at the provided position.
    SpawnTarget {
        /// World-space centre of the new target.
        position: Vec2,
    },
    /// Places a new pickup at the provided position.
    SpawnPickup {
        /// World-space centre of the new pickup.
        position: Vec2,
        /// Effect variant bound to the pickup.
        kind: PickupKind,
    },
    /// Closes the current tick, ageing and reverting timed effects.
    Tick,
    /// Restores the configured initial layout and actor state.
    Reset,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the world returned to its initial layout.
    WorldReset,
    /// Confirms that an actor moved during its sub-step.
    ActorMoved {
        /// Actor that moved.
        actor: ActorId,
        /// Position before the move.
        from: Vec2,
        /// Position after the move and wrap.
        to: Vec2,
    },
    /// Reports that an actor collected a target.
    TargetCollected {
        /// Actor credited with the collection.
        actor: ActorId,
        /// Target that was removed.
        target: TargetId,
    },
    /// Reports that an actor collected a pickup.
    PickupCollected {
        /// Actor that received the effect.
        actor: ActorId,
        /// Pickup that was removed.
        pickup: PickupId,
        /// Effect variant that was applied.
        kind: PickupKind,
    },
    /// Announces that a timed effect began modifying an actor field.
    EffectStarted {
        /// Identifier allocated to the effect.
        effect: EffectId,
        /// Actor whose field is modified.
        actor: ActorId,
        /// Field being modified.
        field: ActorField,
        /// Number of ticks until the effect reverts.
        ticks: u32,
    },
    /// Announces that a timed effect expired and was reverted.
    EffectExpired {
        /// Identifier of the reverted effect.
        effect: EffectId,
        /// Actor whose field was restored.
        actor: ActorId,
        /// Field that was restored.
        field: ActorField,
    },
    /// Reports that an actor's fuel bar reached zero.
    FuelDepleted {
        /// Actor that ran out of fuel.
        actor: ActorId,
    },
    /// Confirms that a target entered the arena.
    TargetSpawned {
        /// Identifier assigned to the target.
        target: TargetId,
        /// World-space centre of the target.
        position: Vec2,
    },
    /// Confirms that a pickup entered the arena.
    PickupSpawned {
        /// Identifier assigned to the pickup.
        pickup: PickupId,
        /// Effect variant bound to the pickup.
        kind: PickupKind,
        /// World-space centre of the pickup.
        position: Vec2,
    },
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that just closed.
        tick: u64,
    },
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier of the actor.
    pub id: ActorId,
    /// Current world-space position.
    pub position: Vec2,
    /// Heading in degrees within `[0, 360)`.
    pub heading_degrees: f32,
    /// Current speed in world units per tick.
    pub speed: f32,
    /// Effective speed step after active modifiers.
    pub speed_step: f32,
    /// Effective turn step after active modifiers.
    pub turn_step: f32,
    /// Targets collected so far.
    pub score: u32,
    /// Current value of the paired fuel bar.
    pub fuel: f32,
    /// Capacity of the paired fuel bar.
    pub fuel_max: f32,
}

impl ActorSnapshot {
    /// Heading expressed in radians.
    #[must_use]
    pub fn heading_radians(&self) -> f32 {
        self.heading_degrees.to_radians()
    }
}

/// Immutable representation of a target used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    /// Identifier of the target.
    pub id: TargetId,
    /// World-space centre.
    pub position: Vec2,
    /// Visual edge length; the collection radius is half of it.
    pub size: f32,
}

impl TargetSnapshot {
    /// Distance from the centre within which the target is collected.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

/// Immutable representation of a pickup used for queries and rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickupSnapshot {
    /// Identifier of the pickup.
    pub id: PickupId,
    /// Effect variant bound to the pickup.
    pub kind: PickupKind,
    /// World-space centre.
    pub position: Vec2,
    /// Visual edge length; the collection radius is half of it.
    pub size: f32,
    /// Ticks the effect lasts, or `None` for permanent effects.
    pub duration_ticks: Option<u32>,
}

impl PickupSnapshot {
    /// Distance from the centre within which the pickup is collected.
    #[must_use]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }
}

/// Layouts understood by the observation encoders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Nearest target and nearest pickup, nine features.
    #[default]
    Nearest,
    /// Up to two targets and two pickups with padding, seventeen features.
    Multi,
}

impl Encoding {
    /// Number of features produced by the encoding.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Nearest => 9,
            Self::Multi => 17,
        }
    }
}

/// Fixed-size numeric feature vector handed to policy-driven actors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Observation {
    features: Vec<f32>,
}

impl Observation {
    /// Wraps the provided features.
    #[must_use]
    pub fn new(features: Vec<f32>) -> Self {
        Self { features }
    }

    /// Features in encoding order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.features
    }

    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Reports whether the observation holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Result of evaluating the termination conditions after a tick.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalStatus {
    /// No termination condition holds.
    Running,
    /// One or more actors drained their fuel bar.
    FuelDepleted {
        /// Actors whose fuel reached zero, in actor order.
        actors: Vec<ActorId>,
    },
    /// The externally tracked time budget elapsed.
    TimeBudgetExceeded,
}

impl TerminalStatus {
    /// Reports whether the episode is over.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, Maneuver, PickupKind, Steer, SubjectKind, Throttle, ACTION_COUNT};

    #[test]
    fn action_indices_cover_policy_range() {
        for index in 0..ACTION_COUNT {
            let action = Action::from_index(index).expect("index within range");
            assert_eq!(action.index(), index);
        }
        assert_eq!(Action::from_index(ACTION_COUNT), None);
    }

    #[test]
    fn actions_map_to_single_component_maneuvers() {
        assert_eq!(Maneuver::from(Action::Idle), Maneuver::IDLE);
        assert_eq!(
            Maneuver::from(Action::SpeedDown),
            Maneuver::new(Throttle::Down, Steer::Straight)
        );
        assert_eq!(
            Maneuver::from(Action::TurnLeft),
            Maneuver::new(Throttle::Hold, Steer::Left)
        );
    }

    #[test]
    fn refuel_binds_to_fuel_and_modifiers_bind_to_actor() {
        assert_eq!(PickupKind::Refuel.subject(), SubjectKind::Fuel);
        assert_eq!(PickupKind::TurnBoost.subject(), SubjectKind::Actor);
        assert_eq!(PickupKind::SpeedBoost.subject(), SubjectKind::Actor);
    }
}
