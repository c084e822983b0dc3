use std::f32::consts::{PI, TAU};

use clap::ValueEnum;
use sky_arena_core::{Action, Encoding};
use sky_arena_system_control::Controller;

/// Heading error, in radians, tolerated before the chaser turns.
const ALIGNMENT_TOLERANCE: f32 = 0.1;
/// Normalised distance below which the chaser slows down.
const APPROACH_DISTANCE: f32 = 0.2;

/// Decision sources selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum PolicyKind {
    /// Uniformly random actions.
    Random,
    /// Never touches the controls.
    Idle,
    /// Steers toward the nearest target.
    Chase,
}

/// Builds a controller for the selected decision source.
pub(crate) fn controller(kind: PolicyKind) -> Controller {
    match kind {
        PolicyKind::Random => Controller::Random,
        PolicyKind::Idle => Controller::policy(|_: &[f32]| Action::Idle.index(), Encoding::Nearest),
        PolicyKind::Chase => Controller::policy(chase, Encoding::Nearest),
    }
}

/// Steers toward the nearest target using the nine-feature observation.
fn chase(features: &[f32]) -> usize {
    let action = match features {
        [heading, _, distance, angle, ..] if *distance >= 0.0 => {
            let error = wrap_angle(angle - heading);
            if error > ALIGNMENT_TOLERANCE {
                Action::TurnRight
            } else if error < -ALIGNMENT_TOLERANCE {
                Action::TurnLeft
            } else if *distance > APPROACH_DISTANCE {
                Action::SpeedUp
            } else {
                Action::SpeedDown
            }
        }
        _ => Action::Idle,
    };
    action.index()
}

/// Wraps an angle into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(heading: f32, distance: f32, angle: f32) -> [f32; 9] {
        [heading, 3.0, distance, angle, -1.0, -1.0, 0.0, -1.0, 100.0]
    }

    #[test]
    fn chaser_turns_toward_target() {
        assert_eq!(chase(&features(0.0, 0.5, 1.0)), Action::TurnRight.index());
        assert_eq!(chase(&features(0.0, 0.5, -1.0)), Action::TurnLeft.index());
        assert_eq!(chase(&features(0.1, 0.5, TAU - 0.1)), Action::TurnLeft.index());
    }

    #[test]
    fn chaser_accelerates_when_aligned() {
        assert_eq!(chase(&features(0.5, 0.8, 0.5)), Action::SpeedUp.index());
        assert_eq!(chase(&features(0.5, 0.1, 0.5)), Action::SpeedDown.index());
    }

    #[test]
    fn chaser_idles_without_targets() {
        assert_eq!(chase(&features(0.5, -1.0, -1.0)), Action::Idle.index());
        assert_eq!(chase(&[]), Action::Idle.index());
    }

    #[test]
    fn every_kind_builds_a_controller() {
        for kind in PolicyKind::value_variants() {
            let controller = controller(*kind);
            assert_eq!(controller.encoding().is_some(), *kind != PolicyKind::Random);
        }
    }
}
