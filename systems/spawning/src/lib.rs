#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for keeping targets and pickups in the arena.
//!
//! The system never touches the world. It reads snapshots of the entities
//! currently present and emits [`Command::SpawnTarget`] and
//! [`Command::SpawnPickup`] requests. All randomness is drawn from the caller's
//! generator so that a seeded run replays exactly.

use glam::Vec2;
use rand::{
    distributions::{Distribution, WeightedError, WeightedIndex},
    Rng,
};
use sky_arena_core::{
    config::{PickupWeights, SpawnConfig},
    ArenaConfig, Command, ConfigError, PickupKind, PickupSnapshot, TargetSnapshot,
};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while constructing the spawning system.
#[derive(Debug, Error)]
pub enum SpawnError {
    /// The configuration violates a numeric invariant.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The pickup weight table cannot be sampled.
    #[error("invalid pickup weights: {0}")]
    Weights(#[from] WeightedError),
}

/// Pure system that decides when and where new entities appear.
#[derive(Clone, Debug)]
pub struct Spawning {
    config: SpawnConfig,
    extent: Vec2,
    kinds: WeightedIndex<f64>,
}

impl Spawning {
    /// Creates a spawning system for the provided arena configuration.
    pub fn new(config: &ArenaConfig) -> Result<Self, SpawnError> {
        config.validate()?;
        Ok(Self {
            config: config.spawn.clone(),
            extent: config.world.extent(),
            kinds: kind_distribution(&config.pickups.weights)?,
        })
    }

    /// Emits the pickups placed when the world resets.
    ///
    /// Positions come from the configuration; kinds are drawn from the weight
    /// table.
    pub fn initial_pickups<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut Vec<Command>) {
        for position in &self.config.initial_pickups {
            let kind = self.draw_kind(rng);
            out.push(Command::SpawnPickup {
                position: *position,
                kind,
            });
        }
    }

    /// Evaluates the respawn policy once for each category.
    ///
    /// A category with no entities left always receives one. A category below
    /// the trickle threshold receives one with the configured probability.
    /// Positions keep their distance from every present entity and from any
    /// entity requested earlier in the same call.
    pub fn handle<R: Rng + ?Sized>(
        &self,
        targets: &[TargetSnapshot],
        pickups: &[PickupSnapshot],
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        let mut occupied: Vec<Vec2> = targets
            .iter()
            .map(|target| target.position)
            .chain(pickups.iter().map(|pickup| pickup.position))
            .collect();

        if self.should_spawn(targets.len(), self.config.target_probability, rng) {
            let position = self.sample_position(&occupied, rng);
            debug!(x = position.x, y = position.y, "requesting target");
            occupied.push(position);
            out.push(Command::SpawnTarget { position });
        }

        if self.should_spawn(pickups.len(), self.config.pickup_probability, rng) {
            let position = self.sample_position(&occupied, rng);
            let kind = self.draw_kind(rng);
            debug!(?kind, x = position.x, y = position.y, "requesting pickup");
            out.push(Command::SpawnPickup { position, kind });
        }
    }

    /// Draws a position inside the spawn area away from every occupied point.
    ///
    /// Candidates closer than the minimum separation are rejected. Once the
    /// attempt budget is spent the last candidate is accepted regardless.
    pub fn sample_position<R: Rng + ?Sized>(&self, occupied: &[Vec2], rng: &mut R) -> Vec2 {
        let separation = self.config.min_separation;
        let mut candidate = self.sample_area(rng);
        for _ in 1..self.config.max_attempts {
            if is_clear(candidate, occupied, separation) {
                return candidate;
            }
            candidate = self.sample_area(rng);
        }

        if !is_clear(candidate, occupied, separation) {
            warn!(
                attempts = self.config.max_attempts,
                x = candidate.x,
                y = candidate.y,
                "spawn separation unsatisfied; accepting last candidate"
            );
        }
        candidate
    }

    /// Draws a pickup kind according to the configured weights.
    pub fn draw_kind<R: Rng + ?Sized>(&self, rng: &mut R) -> PickupKind {
        PickupKind::ALL[self.kinds.sample(rng)]
    }

    fn should_spawn<R: Rng + ?Sized>(&self, count: usize, probability: f64, rng: &mut R) -> bool {
        if count == 0 {
            return true;
        }
        count < self.config.trickle_threshold && rng.gen_bool(probability)
    }

    fn sample_area<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            sample_axis(self.extent.x, self.config.margin, rng),
            sample_axis(self.extent.y, self.config.margin, rng),
        )
    }
}

fn kind_distribution(weights: &PickupWeights) -> Result<WeightedIndex<f64>, WeightedError> {
    WeightedIndex::new(PickupKind::ALL.map(|kind| weights.weight(kind)))
}

/// Uniform coordinate in `[margin, extent - margin)`, or the whole axis when
/// the margin leaves no room.
fn sample_axis<R: Rng + ?Sized>(extent: f32, margin: f32, rng: &mut R) -> f32 {
    let low = margin;
    let high = extent - margin;
    if high > low {
        rng.gen_range(low..high)
    } else {
        rng.gen_range(0.0..extent)
    }
}

fn is_clear(candidate: Vec2, occupied: &[Vec2], separation: f32) -> bool {
    occupied
        .iter()
        .all(|position| candidate.distance(*position) >= separation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separation_boundary_is_inclusive() {
        let occupied = [Vec2::new(0.0, 0.0)];
        assert!(is_clear(Vec2::new(80.0, 0.0), &occupied, 80.0));
        assert!(!is_clear(Vec2::new(79.9, 0.0), &occupied, 80.0));
    }

    #[test]
    fn zero_weights_are_rejected() {
        let weights = PickupWeights {
            refuel: 0.0,
            turn_boost: 0.0,
            speed_boost: 0.0,
        };
        assert!(kind_distribution(&weights).is_err());
    }
}
