//! Numeric parameters consumed by the simulation.
//!
//! The engine never reads configuration documents itself. Adapters
//! deserialize an [`ArenaConfig`] from whatever format they prefer and call
//! [`ArenaConfig::validate`] before handing it to the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::PickupKind;

/// Errors reported when a configuration violates a numeric invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A parameter holds a value outside its permitted range.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending parameter.
        field: &'static str,
        /// Constraint the value failed to satisfy.
        reason: &'static str,
    },
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

fn ensure(condition: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(invalid(field, reason))
    }
}

/// Complete set of parameters describing one arena.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArenaConfig {
    /// Extent of the wrapping play area.
    pub world: WorldConfig,
    /// Frame rate, time budget and random seed.
    pub game: GameConfig,
    /// Initial kinematic state shared by every actor.
    pub actor: ActorConfig,
    /// Fuel bar capacity and depletion rates.
    #[serde(default)]
    pub fuel: FuelConfig,
    /// Respawn policy and initial layout.
    #[serde(default)]
    pub spawn: SpawnConfig,
    /// Pickup effects and their spawn distribution.
    #[serde(default)]
    pub pickups: PickupConfig,
}

impl ArenaConfig {
    /// Checks every numeric invariant the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.game.validate()?;
        self.actor.validate()?;
        self.fuel.validate()?;
        self.spawn.validate()?;
        self.pickups.validate()
    }
}

/// Extent of the play area in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldConfig {
    /// Horizontal extent; x coordinates wrap into `[0, width)`.
    pub width: f32,
    /// Vertical extent; y coordinates wrap into `[0, height)`.
    pub height: f32,
}

impl WorldConfig {
    /// Extent packed as a vector.
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            self.width.is_finite() && self.width > 0.0,
            "world.width",
            "must be positive",
        )?;
        ensure(
            self.height.is_finite() && self.height > 0.0,
            "world.height",
            "must be positive",
        )
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
        }
    }
}

/// Timing parameters of an episode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameConfig {
    /// Ticks simulated per second of play.
    pub fps: u32,
    /// Episode length in seconds of play.
    pub time_limit_secs: f32,
    /// Seed of the random source shared by spawning and random actors.
    #[serde(default)]
    pub seed: u64,
}

impl GameConfig {
    /// Number of ticks that fit within the time limit, rounded up.
    #[must_use]
    pub fn tick_budget(&self) -> u64 {
        let ticks = (self.time_limit_secs * self.fps as f32).ceil();
        if ticks <= 0.0 {
            0
        } else {
            ticks as u64
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.fps > 0, "game.fps", "must be positive")?;
        ensure(
            self.time_limit_secs.is_finite() && self.time_limit_secs > 0.0,
            "game.time_limit_secs",
            "must be positive",
        )
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            time_limit_secs: 60.0,
            seed: 0,
        }
    }
}

/// Initial kinematic state and bounds of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorConfig {
    /// Starting position.
    pub position: Vec2,
    /// Starting speed in world units per tick.
    pub speed: f32,
    /// Starting heading in degrees.
    pub heading_degrees: f32,
    /// Lower speed bound.
    pub min_speed: f32,
    /// Upper speed bound.
    pub max_speed: f32,
    /// Speed change per speed action.
    pub speed_step: f32,
    /// Heading change in degrees per turn action.
    pub turn_step: f32,
}

impl ActorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            self.position.is_finite(),
            "actor.position",
            "must be finite",
        )?;
        ensure(
            self.heading_degrees.is_finite(),
            "actor.heading_degrees",
            "must be finite",
        )?;
        ensure(
            self.min_speed.is_finite() && self.min_speed >= 0.0,
            "actor.min_speed",
            "must be non-negative",
        )?;
        ensure(
            self.max_speed.is_finite() && self.max_speed > self.min_speed,
            "actor.max_speed",
            "must exceed min_speed",
        )?;
        ensure(
            self.speed >= self.min_speed && self.speed <= self.max_speed,
            "actor.speed",
            "must lie within [min_speed, max_speed]",
        )?;
        ensure(
            self.speed_step.is_finite() && self.speed_step > 0.0,
            "actor.speed_step",
            "must be positive",
        )?;
        ensure(
            self.turn_step.is_finite() && self.turn_step > 0.0,
            "actor.turn_step",
            "must be positive",
        )
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            position: Vec2::new(400.0, 400.0),
            speed: 3.0,
            heading_degrees: 0.0,
            min_speed: 1.0,
            max_speed: 8.0,
            speed_step: 0.2,
            turn_step: 5.0,
        }
    }
}

/// Fuel bar capacity and the speed-dependent depletion model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FuelConfig {
    /// Capacity of every fuel bar.
    pub max: f32,
    /// Value each fuel bar starts with.
    pub initial: f32,
    /// Fuel burned per tick at minimum speed.
    pub low_speed_rate: f32,
    /// Fuel burned per tick at maximum speed.
    pub high_speed_rate: f32,
}

impl FuelConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            self.max.is_finite() && self.max > 0.0,
            "fuel.max",
            "must be positive",
        )?;
        ensure(
            self.initial >= 0.0 && self.initial <= self.max,
            "fuel.initial",
            "must lie within [0, max]",
        )?;
        ensure(
            self.low_speed_rate.is_finite() && self.low_speed_rate >= 0.0,
            "fuel.low_speed_rate",
            "must be non-negative",
        )?;
        ensure(
            self.high_speed_rate.is_finite() && self.high_speed_rate >= 0.0,
            "fuel.high_speed_rate",
            "must be non-negative",
        )
    }
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            initial: 100.0,
            low_speed_rate: 0.01,
            high_speed_rate: 0.1,
        }
    }
}

/// Respawn policy, sampling constraints and the layout placed on reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpawnConfig {
    /// Inset from every edge within which spawn positions are drawn.
    pub margin: f32,
    /// Minimum distance between a new entity and every existing one.
    pub min_separation: f32,
    /// Visual size of targets; their collection radius is half of it.
    pub target_size: f32,
    /// Visual size of pickups; their collection radius is half of it.
    pub pickup_size: f32,
    /// Below this many entities a category trickles new spawns.
    pub trickle_threshold: usize,
    /// Per-sub-step probability of a trickle target spawn.
    pub target_probability: f64,
    /// Per-sub-step probability of a trickle pickup spawn.
    pub pickup_probability: f64,
    /// Rejection-sampling attempts before the last candidate is accepted.
    pub max_attempts: u32,
    /// Targets placed when the world resets.
    pub initial_targets: Vec<Vec2>,
    /// Pickups placed when the world resets; kinds are drawn on reset.
    pub initial_pickups: Vec<Vec2>,
}

impl SpawnConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            self.margin.is_finite() && self.margin >= 0.0,
            "spawn.margin",
            "must be non-negative",
        )?;
        ensure(
            self.min_separation.is_finite() && self.min_separation >= 0.0,
            "spawn.min_separation",
            "must be non-negative",
        )?;
        ensure(
            self.target_size.is_finite() && self.target_size > 0.0,
            "spawn.target_size",
            "must be positive",
        )?;
        ensure(
            self.pickup_size.is_finite() && self.pickup_size > 0.0,
            "spawn.pickup_size",
            "must be positive",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.target_probability),
            "spawn.target_probability",
            "must lie within [0, 1]",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.pickup_probability),
            "spawn.pickup_probability",
            "must lie within [0, 1]",
        )?;
        ensure(self.max_attempts > 0, "spawn.max_attempts", "must be positive")?;
        ensure(
            self.initial_targets.iter().all(|position| position.is_finite()),
            "spawn.initial_targets",
            "positions must be finite",
        )?;
        ensure(
            self.initial_pickups.iter().all(|position| position.is_finite()),
            "spawn.initial_pickups",
            "positions must be finite",
        )
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            margin: 100.0,
            min_separation: 80.0,
            target_size: 80.0,
            pickup_size: 80.0,
            trickle_threshold: 2,
            target_probability: 0.01,
            pickup_probability: 0.005,
            max_attempts: 64,
            initial_targets: vec![Vec2::new(100.0, 100.0)],
            initial_pickups: vec![Vec2::new(600.0, 600.0)],
        }
    }
}

/// Effect parameters and spawn weights of every pickup kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickupConfig {
    /// Fuel added by a refuel pickup.
    pub refuel_amount: f32,
    /// Scaling applied to the turn step by a turn boost.
    pub turn_boost: ModifierConfig,
    /// Scaling applied to the speed step by a speed boost.
    pub speed_boost: ModifierConfig,
    /// Relative spawn frequency of each kind.
    pub weights: PickupWeights,
}

impl PickupConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            self.refuel_amount.is_finite() && self.refuel_amount >= 0.0,
            "pickups.refuel_amount",
            "must be non-negative",
        )?;
        self.turn_boost.validate("pickups.turn_boost")?;
        self.speed_boost.validate("pickups.speed_boost")?;
        self.weights.validate()
    }
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            refuel_amount: 20.0,
            turn_boost: ModifierConfig {
                factor: 1.2,
                floor: 3.0,
                ceiling: 8.0,
                duration_ticks: None,
            },
            speed_boost: ModifierConfig {
                factor: 1.5,
                floor: 0.05,
                ceiling: 1.0,
                duration_ticks: Some(300),
            },
            weights: PickupWeights::default(),
        }
    }
}

/// Monotone scaling applied by a modifier pickup.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifierConfig {
    /// Multiplier applied to the field.
    pub factor: f32,
    /// Lowest value the scaled field may take.
    pub floor: f32,
    /// Highest value the scaled field may take.
    pub ceiling: f32,
    /// Ticks before the modifier reverts; `None` or zero makes it permanent.
    #[serde(default)]
    pub duration_ticks: Option<u32>,
}

impl ModifierConfig {
    /// Duration of the effect, or `None` when the change is permanent.
    #[must_use]
    pub fn timed_duration(&self) -> Option<u32> {
        self.duration_ticks.filter(|ticks| *ticks > 0)
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        ensure(
            self.factor.is_finite() && self.factor > 0.0,
            field,
            "factor must be positive",
        )?;
        ensure(
            self.floor.is_finite() && self.ceiling.is_finite() && self.floor <= self.ceiling,
            field,
            "floor must not exceed ceiling",
        )
    }
}

/// Relative spawn weights of the pickup kinds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickupWeights {
    /// Weight of [`PickupKind::Refuel`].
    pub refuel: f64,
    /// Weight of [`PickupKind::TurnBoost`].
    pub turn_boost: f64,
    /// Weight of [`PickupKind::SpeedBoost`].
    pub speed_boost: f64,
}

impl PickupWeights {
    /// Weight assigned to the provided kind.
    #[must_use]
    pub const fn weight(&self, kind: PickupKind) -> f64 {
        match kind {
            PickupKind::Refuel => self.refuel,
            PickupKind::TurnBoost => self.turn_boost,
            PickupKind::SpeedBoost => self.speed_boost,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let weights = PickupKind::ALL.map(|kind| self.weight(kind));
        ensure(
            weights
                .iter()
                .all(|weight| weight.is_finite() && *weight >= 0.0),
            "pickups.weights",
            "must be non-negative",
        )?;
        ensure(
            weights.iter().any(|weight| *weight > 0.0),
            "pickups.weights",
            "at least one kind must have positive weight",
        )
    }
}

impl Default for PickupWeights {
    fn default() -> Self {
        Self {
            refuel: 2.0,
            turn_boost: 1.0,
            speed_boost: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert_eq!(ArenaConfig::default().validate(), Ok(()));
    }

    #[test]
    fn tick_budget_rounds_up() {
        let game = GameConfig {
            fps: 60,
            time_limit_secs: 0.51,
            seed: 0,
        };
        assert_eq!(game.tick_budget(), 31);
    }

    #[test]
    fn speed_outside_interval_is_rejected() {
        let mut config = ArenaConfig::default();
        config.actor.speed = config.actor.max_speed + 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "actor.speed",
                reason: "must lie within [min_speed, max_speed]",
            })
        );
    }

    #[test]
    fn degenerate_speed_interval_is_rejected() {
        let mut config = ArenaConfig::default();
        config.actor.max_speed = config.actor.min_speed;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "actor.max_speed",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_initial_positions_name_their_list() {
        let mut config = ArenaConfig::default();
        config.spawn.initial_pickups = vec![Vec2::new(f32::NAN, 10.0)];
        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "spawn.initial_pickups",
                reason: "positions must be finite",
            })
        );

        let mut config = ArenaConfig::default();
        config.spawn.initial_targets = vec![Vec2::new(10.0, f32::INFINITY)];
        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "spawn.initial_targets",
                reason: "positions must be finite",
            })
        );
    }

    #[test]
    fn all_zero_pickup_weights_are_rejected() {
        let mut config = ArenaConfig::default();
        config.pickups.weights = PickupWeights {
            refuel: 0.0,
            turn_boost: 0.0,
            speed_boost: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_duration_modifier_is_permanent() {
        let modifier = ModifierConfig {
            factor: 1.2,
            floor: 1.0,
            ceiling: 2.0,
            duration_ticks: Some(0),
        };
        assert_eq!(modifier.timed_duration(), None);
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() {
        let document = r#"
            [world]
            width = 640.0
            height = 480.0

            [game]
            fps = 30
            time_limit_secs = 20.0

            [actor]
            position = [320.0, 240.0]
            speed = 2.0
            heading_degrees = 90.0
            min_speed = 1.0
            max_speed = 6.0
            speed_step = 0.5
            turn_step = 4.0
        "#;

        let config: ArenaConfig = toml::from_str(document).expect("document should parse");
        assert_eq!(config.fuel, FuelConfig::default());
        assert_eq!(config.spawn, SpawnConfig::default());
        assert_eq!(config.actor.position, Vec2::new(320.0, 240.0));
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn missing_required_section_fails_to_parse() {
        let document = r#"
            [world]
            width = 640.0
            height = 480.0
        "#;

        let parsed: Result<ArenaConfig, _> = toml::from_str(document);
        assert!(parsed.is_err(), "game and actor sections are required");
    }
}
