#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Control sources that decide how each actor maneuvers during a tick.
//!
//! Every source resolves to a [`Maneuver`]. Random and policy sources pick one
//! of the five discrete [`Action`]s; manual input may combine a throttle and a
//! steer component.

use std::fmt;

use rand::Rng;
use sky_arena_core::{
    Action, Encoding, Maneuver, Observation, Steer, Throttle, ACTION_COUNT,
};
use thiserror::Error;

/// Errors raised while resolving a control decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ControlError {
    /// A decision policy answered with an index outside the action set.
    #[error("decision policy returned action index {0}, expected one below {}", ACTION_COUNT)]
    InvalidActionIndex(usize),
}

/// Logical controls understood by manual input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    /// Accelerate.
    Up,
    /// Decelerate.
    Down,
    /// Turn left.
    Left,
    /// Turn right.
    Right,
}

/// Queryable input device state.
pub trait InputDevice {
    /// Reports whether the control is currently held.
    fn is_pressed(&self, control: Control) -> bool;
}

impl<F> InputDevice for F
where
    F: Fn(Control) -> bool,
{
    fn is_pressed(&self, control: Control) -> bool {
        self(control)
    }
}

/// Snapshot of the four logical controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl KeyState {
    /// Creates a snapshot with the provided controls held.
    #[must_use]
    pub fn pressed(controls: &[Control]) -> Self {
        let mut state = Self::default();
        for control in controls {
            state.set(*control, true);
        }
        state
    }

    /// Marks a control as held or released.
    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Up => self.up = held,
            Control::Down => self.down = held,
            Control::Left => self.left = held,
            Control::Right => self.right = held,
        }
    }
}

impl InputDevice for KeyState {
    fn is_pressed(&self, control: Control) -> bool {
        match control {
            Control::Up => self.up,
            Control::Down => self.down,
            Control::Left => self.left,
            Control::Right => self.right,
        }
    }
}

/// Opaque decision function mapping an observation to an action index.
pub trait DecisionPolicy {
    /// Chooses an action index for the provided features.
    fn decide(&mut self, observation: &[f32]) -> usize;
}

impl<F> DecisionPolicy for F
where
    F: FnMut(&[f32]) -> usize,
{
    fn decide(&mut self, observation: &[f32]) -> usize {
        self(observation)
    }
}

/// Decision source attached to an actor.
pub enum Controller {
    /// Reads held controls from an input device.
    Manual(Box<dyn InputDevice>),
    /// Draws a uniform action every tick.
    Random,
    /// Delegates to an external decision function.
    Policy {
        /// The decision function.
        policy: Box<dyn DecisionPolicy>,
        /// Layout of the observation handed to the policy.
        encoding: Encoding,
    },
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual(_) => f.write_str("Manual"),
            Self::Random => f.write_str("Random"),
            Self::Policy { encoding, .. } => f
                .debug_struct("Policy")
                .field("encoding", encoding)
                .finish_non_exhaustive(),
        }
    }
}

impl Controller {
    /// Creates a controller reading the provided device.
    #[must_use]
    pub fn manual(device: impl InputDevice + 'static) -> Self {
        Self::Manual(Box::new(device))
    }

    /// Creates a controller driven by the provided decision function.
    #[must_use]
    pub fn policy(policy: impl DecisionPolicy + 'static, encoding: Encoding) -> Self {
        Self::Policy {
            policy: Box::new(policy),
            encoding,
        }
    }

    /// Encoding the controller consumes, if it consumes observations at all.
    #[must_use]
    pub fn encoding(&self) -> Option<Encoding> {
        match self {
            Self::Policy { encoding, .. } => Some(*encoding),
            Self::Manual(_) | Self::Random => None,
        }
    }

    /// Resolves the maneuver for the current tick.
    ///
    /// `observe` is only invoked by policy controllers, so other sources never
    /// pay for encoding.
    pub fn decide<R, O>(&mut self, observe: O, rng: &mut R) -> Result<Maneuver, ControlError>
    where
        R: Rng + ?Sized,
        O: FnOnce(Encoding) -> Observation,
    {
        match self {
            Self::Manual(device) => Ok(manual_maneuver(device.as_ref())),
            Self::Random => Ok(random_action(rng).into()),
            Self::Policy { policy, encoding } => {
                let observation = observe(*encoding);
                resolve_policy(policy.as_mut(), &observation).map(Maneuver::from)
            }
        }
    }
}

/// Maps held controls to a maneuver.
///
/// Up and down held together cancel out. Left wins when both turns are held.
#[must_use]
pub fn manual_maneuver(device: &dyn InputDevice) -> Maneuver {
    let throttle = match (device.is_pressed(Control::Up), device.is_pressed(Control::Down)) {
        (true, false) => Throttle::Up,
        (false, true) => Throttle::Down,
        _ => Throttle::Hold,
    };
    let steer = if device.is_pressed(Control::Left) {
        Steer::Left
    } else if device.is_pressed(Control::Right) {
        Steer::Right
    } else {
        Steer::Straight
    };
    Maneuver::new(throttle, steer)
}

/// Draws a uniformly distributed action.
pub fn random_action<R: Rng + ?Sized>(rng: &mut R) -> Action {
    Action::ALL[rng.gen_range(0..ACTION_COUNT)]
}

/// Asks the policy for an action and validates its answer.
pub fn resolve_policy(
    policy: &mut dyn DecisionPolicy,
    observation: &Observation,
) -> Result<Action, ControlError> {
    let index = policy.decide(observation.as_slice());
    Action::from_index(index).ok_or(ControlError::InvalidActionIndex(index))
}
