//! Actor kinematics: speed, heading, displacement and boundary wrap.

use glam::Vec2;
use sky_arena_core::{
    config::{ActorConfig, FuelConfig, ModifierConfig},
    ActorField, ActorId, EffectId, Maneuver, Steer, Throttle,
};

const FULL_TURN_DEGREES: f32 = 360.0;

/// Monotone scaling applied by modifier pickups.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scaling {
    factor: f32,
    floor: f32,
    ceiling: f32,
}

impl Scaling {
    /// Creates a scaling that multiplies by `factor` and clamps to `[floor, ceiling]`.
    #[must_use]
    pub const fn new(factor: f32, floor: f32, ceiling: f32) -> Self {
        Self {
            factor,
            floor,
            ceiling,
        }
    }

    /// Applies the scaling to the provided value.
    #[must_use]
    pub fn apply(&self, value: f32) -> f32 {
        (value * self.factor).clamp(self.floor, self.ceiling)
    }
}

impl From<&ModifierConfig> for Scaling {
    fn from(config: &ModifierConfig) -> Self {
        Self::new(config.factor, config.floor, config.ceiling)
    }
}

/// Numeric actor parameter that timed effects may temporarily scale.
///
/// The effective value is the base with every active modifier applied in
/// insertion order. Without modifiers it is the base, bit for bit.
#[derive(Clone, Debug, PartialEq)]
pub struct Tunable {
    base: f32,
    modifiers: Vec<(EffectId, Scaling)>,
}

impl Tunable {
    /// Creates an unmodified parameter.
    #[must_use]
    pub const fn new(base: f32) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
        }
    }

    /// Effective value after active modifiers.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.modifiers
            .iter()
            .fold(self.base, |value, (_, scaling)| scaling.apply(value))
    }

    /// Value the parameter returns to once every modifier expired.
    #[must_use]
    pub const fn base(&self) -> f32 {
        self.base
    }

    /// Permanently rescales the base value.
    pub fn rescale_base(&mut self, scaling: Scaling) {
        self.base = scaling.apply(self.base);
    }

    /// Registers a timed modifier owned by the provided effect.
    pub fn push_modifier(&mut self, effect: EffectId, scaling: Scaling) {
        self.modifiers.push((effect, scaling));
    }

    /// Drops the modifier owned by the provided effect.
    ///
    /// Returns `false` when the effect holds no modifier, which makes repeated
    /// reversion a no-op.
    pub fn remove_modifier(&mut self, effect: EffectId) -> bool {
        let before = self.modifiers.len();
        self.modifiers.retain(|(owner, _)| *owner != effect);
        self.modifiers.len() != before
    }
}

/// Controllable entity moving across the wrapping arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    id: ActorId,
    position: Vec2,
    heading: f32,
    speed: f32,
    min_speed: f32,
    max_speed: f32,
    speed_step: Tunable,
    turn_step: Tunable,
    score: u32,
}

impl Actor {
    /// Creates an actor in its configured initial state.
    #[must_use]
    pub fn new(id: ActorId, config: &ActorConfig) -> Self {
        Self {
            id,
            position: config.position,
            heading: normalize_heading(config.heading_degrees),
            speed: config.speed.clamp(config.min_speed, config.max_speed),
            min_speed: config.min_speed,
            max_speed: config.max_speed,
            speed_step: Tunable::new(config.speed_step),
            turn_step: Tunable::new(config.turn_step),
            score: 0,
        }
    }

    /// Identifier of the actor.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Current position, wrapped into the arena.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Heading in degrees within `[0, 360)`.
    #[must_use]
    pub const fn heading(&self) -> f32 {
        self.heading
    }

    /// Current speed in world units per tick.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Targets collected so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Unit vector pointing along the heading.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        direction_from_heading(self.heading)
    }

    /// Read access to a modifiable field.
    #[must_use]
    pub const fn field(&self, field: ActorField) -> &Tunable {
        match field {
            ActorField::TurnStep => &self.turn_step,
            ActorField::SpeedStep => &self.speed_step,
        }
    }

    pub(crate) fn field_mut(&mut self, field: ActorField) -> &mut Tunable {
        match field {
            ActorField::TurnStep => &mut self.turn_step,
            ActorField::SpeedStep => &mut self.speed_step,
        }
    }

    pub(crate) fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

/// Applies the maneuver, then moves the actor one tick and wraps it into `extent`.
pub fn advance(actor: &mut Actor, maneuver: impl Into<Maneuver>, extent: Vec2) {
    let maneuver = maneuver.into();
    let speed_step = actor.speed_step.value();
    match maneuver.throttle {
        Throttle::Hold => {}
        Throttle::Up => actor.speed = (actor.speed + speed_step).min(actor.max_speed),
        Throttle::Down => actor.speed = (actor.speed - speed_step).max(actor.min_speed),
    }

    let turn_step = actor.turn_step.value();
    match maneuver.steer {
        Steer::Straight => {}
        Steer::Left => actor.heading = normalize_heading(actor.heading - turn_step),
        Steer::Right => actor.heading = normalize_heading(actor.heading + turn_step),
    }

    let displaced = actor.position + actor.direction() * actor.speed;
    actor.position = Vec2::new(wrap(displaced.x, extent.x), wrap(displaced.y, extent.y));
}

/// Fuel change for one tick at the actor's current speed. Always non-positive.
///
/// Interpolates linearly between the low-speed and the high-speed depletion
/// rate using the actor's normalised position within its speed interval.
#[must_use]
pub fn fuel_delta(actor: &Actor, economy: &FuelConfig) -> f32 {
    let span = actor.max_speed - actor.min_speed;
    let t = if span > 0.0 {
        ((actor.speed - actor.min_speed) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    -((1.0 - t) * economy.low_speed_rate + t * economy.high_speed_rate)
}

/// Wraps a coordinate into `[0, extent)`.
#[must_use]
pub fn wrap(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid rounds tiny negative inputs up to `extent` itself.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

/// Unit direction vector for a heading in degrees.
#[must_use]
pub fn direction_from_heading(heading_degrees: f32) -> Vec2 {
    let radians = heading_degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

fn normalize_heading(heading: f32) -> f32 {
    wrap(heading, FULL_TURN_DEGREES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sky_arena_core::Action;

    fn actor_at(position: Vec2, speed: f32, heading_degrees: f32) -> Actor {
        let config = ActorConfig {
            position,
            speed,
            heading_degrees,
            min_speed: 1.0,
            max_speed: 8.0,
            speed_step: 0.5,
            turn_step: 10.0,
        };
        Actor::new(ActorId::new(0), &config)
    }

    #[test]
    fn exiting_right_edge_reappears_on_left() {
        let mut actor = actor_at(Vec2::new(799.0, 50.0), 5.0, 0.0);
        advance(&mut actor, Action::Idle, Vec2::new(800.0, 800.0));
        assert_eq!(actor.position(), Vec2::new(4.0, 50.0));
    }

    #[test]
    fn exiting_top_edge_reappears_at_bottom() {
        let mut actor = actor_at(Vec2::new(10.0, 2.0), 4.0, 270.0);
        advance(&mut actor, Action::Idle, Vec2::new(800.0, 600.0));
        assert_abs_diff_eq!(actor.position().x, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(actor.position().y, 598.0, epsilon = 1e-3);
    }

    #[test]
    fn wrapped_coordinates_stay_within_extent() {
        let extent = Vec2::new(800.0, 600.0);
        let mut actor = actor_at(Vec2::new(400.0, 300.0), 8.0, 33.0);
        for step in 0..2_000 {
            let action = if step % 7 == 0 {
                Action::TurnRight
            } else {
                Action::Idle
            };
            advance(&mut actor, action, extent);
            let position = actor.position();
            assert!((0.0..extent.x).contains(&position.x), "x escaped: {position}");
            assert!((0.0..extent.y).contains(&position.y), "y escaped: {position}");
        }
    }

    #[test]
    fn wrap_never_returns_extent() {
        assert_eq!(wrap(-1e-9, 800.0), 0.0);
        assert_eq!(wrap(800.0, 800.0), 0.0);
        assert_eq!(wrap(-5.0, 800.0), 795.0);
    }

    #[test]
    fn speed_saturates_at_interval_bounds() {
        let extent = Vec2::new(800.0, 800.0);
        let mut actor = actor_at(Vec2::new(400.0, 400.0), 3.0, 0.0);
        for _ in 0..50 {
            advance(&mut actor, Action::SpeedUp, extent);
            assert!(actor.speed() <= 8.0);
        }
        assert_eq!(actor.speed(), 8.0);

        for _ in 0..50 {
            advance(&mut actor, Action::SpeedDown, extent);
            assert!(actor.speed() >= 1.0);
        }
        assert_eq!(actor.speed(), 1.0);
    }

    #[test]
    fn heading_is_taken_modulo_full_turn() {
        let extent = Vec2::new(800.0, 800.0);
        let mut actor = actor_at(Vec2::new(400.0, 400.0), 1.0, 5.0);
        advance(&mut actor, Action::TurnLeft, extent);
        assert_abs_diff_eq!(actor.heading(), 355.0, epsilon = 1e-4);
        advance(&mut actor, Action::TurnRight, extent);
        assert_abs_diff_eq!(actor.heading(), 5.0, epsilon = 1e-4);

        let wound = actor_at(Vec2::ZERO, 1.0, 725.0);
        assert_abs_diff_eq!(wound.heading(), 5.0, epsilon = 1e-4);
    }

    #[test]
    fn combined_maneuver_applies_both_components() {
        let mut actor = actor_at(Vec2::new(400.0, 400.0), 3.0, 0.0);
        advance(
            &mut actor,
            Maneuver::new(Throttle::Up, Steer::Right),
            Vec2::new(800.0, 800.0),
        );
        assert_eq!(actor.speed(), 3.5);
        assert_abs_diff_eq!(actor.heading(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn fuel_delta_interpolates_between_rates() {
        let economy = FuelConfig {
            max: 100.0,
            initial: 100.0,
            low_speed_rate: 0.01,
            high_speed_rate: 0.1,
        };
        let slow = actor_at(Vec2::ZERO, 1.0, 0.0);
        let fast = actor_at(Vec2::ZERO, 8.0, 0.0);
        let middle = actor_at(Vec2::ZERO, 4.5, 0.0);

        assert_abs_diff_eq!(fuel_delta(&slow, &economy), -0.01, epsilon = 1e-6);
        assert_abs_diff_eq!(fuel_delta(&fast, &economy), -0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(fuel_delta(&middle, &economy), -0.055, epsilon = 1e-6);
    }

    #[test]
    fn tunable_reverts_exactly_regardless_of_expiry_order() {
        let mut tunable = Tunable::new(5.0);
        let scaling = Scaling::new(1.2, 3.0, 8.0);
        tunable.push_modifier(EffectId::new(1), scaling);
        tunable.push_modifier(EffectId::new(2), scaling);
        assert_abs_diff_eq!(tunable.value(), 7.2, epsilon = 1e-4);

        assert!(tunable.remove_modifier(EffectId::new(1)));
        assert_abs_diff_eq!(tunable.value(), 6.0, epsilon = 1e-4);
        assert!(!tunable.remove_modifier(EffectId::new(1)));
        assert!(tunable.remove_modifier(EffectId::new(2)));
        assert_eq!(tunable.value(), 5.0);
    }
}
