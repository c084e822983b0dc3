#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick orchestration for Sky Arena.
//!
//! [`Simulation`] owns the world, the systems, one controller per actor and
//! the single random source. Each tick it resolves every actor's maneuver in
//! actor order, submits the resulting commands to the world, lets the spawning
//! system react after each sub-step and finally closes the tick.

pub mod clock;
pub mod env;
pub mod summary;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sky_arena_core::{
    ActorId, ActorSnapshot, ArenaConfig, Command, Encoding, Event, Maneuver, Observation,
    TerminalStatus,
};
use sky_arena_system_control::{ControlError, Controller};
use sky_arena_system_spawning::{SpawnError, Spawning};
use sky_arena_world::{self as world, query, World, WorldError};
use thiserror::Error;
use tracing::info;

pub use clock::EpisodeClock;
pub use env::{ArenaEnv, RewardConfig, StepOutcome};
pub use summary::{EndReason, MatchSummary, Standing};

/// Errors surfaced while running an episode.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The world rejected a command or its configuration.
    #[error(transparent)]
    World(#[from] WorldError),
    /// A controller produced an unusable decision.
    #[error(transparent)]
    Control(#[from] ControlError),
    /// The spawning system could not be constructed.
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    /// The episode already ended; call `reset` before stepping again.
    #[error("the episode has finished; reset before stepping")]
    EpisodeFinished,
}

/// Deterministic orchestrator advancing the arena one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    spawning: Spawning,
    controllers: Vec<Controller>,
    rng: ChaCha8Rng,
    clock: EpisodeClock,
    status: TerminalStatus,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates a simulation with one actor per controller.
    ///
    /// The random source is seeded once from the configured seed and is not
    /// reseeded on reset, so consecutive episodes differ.
    pub fn new(config: ArenaConfig, controllers: Vec<Controller>) -> Result<Self, SimulationError> {
        let spawning = Spawning::new(&config)?;
        let clock = EpisodeClock::new(&config.game);
        let rng = ChaCha8Rng::seed_from_u64(config.game.seed);
        let world = World::new(config, controllers.len())?;

        let mut simulation = Self {
            world,
            spawning,
            controllers,
            rng,
            clock,
            status: TerminalStatus::Running,
            events: Vec::new(),
        };
        simulation.place_initial_pickups()?;
        Ok(simulation)
    }

    /// Restores the initial layout and rewinds the episode clock.
    pub fn reset(&mut self) -> Result<(), SimulationError> {
        self.events.clear();
        world::apply(&mut self.world, Command::Reset, &mut self.events)?;
        self.place_initial_pickups()?;
        self.clock.reset();
        self.status = TerminalStatus::Running;
        Ok(())
    }

    /// Advances one tick with every actor following its controller.
    pub fn tick(&mut self) -> Result<TerminalStatus, SimulationError> {
        self.tick_with(None)
    }

    /// Advances one tick, forcing `forced.0` to perform `forced.1`.
    ///
    /// The forced actor's controller is not consulted for this tick.
    pub fn tick_with(
        &mut self,
        forced: Option<(ActorId, Maneuver)>,
    ) -> Result<TerminalStatus, SimulationError> {
        if self.status.is_terminal() {
            return Err(SimulationError::EpisodeFinished);
        }

        self.events.clear();
        for actor in query::actor_ids(&self.world) {
            let maneuver = match forced {
                Some((id, maneuver)) if id == actor => maneuver,
                _ => self.decide(actor)?,
            };
            world::apply(
                &mut self.world,
                Command::Steer { actor, maneuver },
                &mut self.events,
            )?;
            self.respawn()?;
        }
        world::apply(&mut self.world, Command::Tick, &mut self.events)?;
        self.clock.advance();

        self.status = self.evaluate();
        if self.status.is_terminal() {
            info!(
                status = ?self.status,
                ticks = self.clock.elapsed_ticks(),
                "episode finished"
            );
        }
        Ok(self.status.clone())
    }

    /// Ticks until a termination condition holds.
    pub fn run_to_end(&mut self) -> Result<TerminalStatus, SimulationError> {
        loop {
            let status = self.tick()?;
            if status.is_terminal() {
                return Ok(status);
            }
        }
    }

    /// Provides read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Events broadcast during the most recent tick or reset.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Termination status after the most recent tick.
    #[must_use]
    pub fn status(&self) -> &TerminalStatus {
        &self.status
    }

    /// Episode clock.
    #[must_use]
    pub fn clock(&self) -> &EpisodeClock {
        &self.clock
    }

    /// Snapshots of every actor in processing order.
    #[must_use]
    pub fn actors(&self) -> Vec<ActorSnapshot> {
        query::actor_snapshots(&self.world)
    }

    /// Encodes an actor's view of the arena.
    #[must_use]
    pub fn observe(&self, actor: ActorId, encoding: Encoding) -> Option<Observation> {
        observe(&self.world, actor, encoding)
    }

    fn decide(&mut self, actor: ActorId) -> Result<Maneuver, SimulationError> {
        let world = &self.world;
        let controller = self
            .controllers
            .get_mut(actor.index())
            .ok_or(WorldError::UnknownActor(actor))?;
        let maneuver = controller.decide(
            |encoding| observe(world, actor, encoding).unwrap_or_default(),
            &mut self.rng,
        )?;
        Ok(maneuver)
    }

    fn respawn(&mut self) -> Result<(), SimulationError> {
        let mut commands = Vec::new();
        self.spawning.handle(
            &query::targets(&self.world),
            &query::pickups(&self.world),
            &mut self.rng,
            &mut commands,
        );
        self.submit(commands)
    }

    fn place_initial_pickups(&mut self) -> Result<(), SimulationError> {
        let mut commands = Vec::new();
        self.spawning.initial_pickups(&mut self.rng, &mut commands);
        self.submit(commands)
    }

    fn submit(&mut self, commands: Vec<Command>) -> Result<(), SimulationError> {
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events)?;
        }
        Ok(())
    }

    fn evaluate(&self) -> TerminalStatus {
        let depleted: Vec<ActorId> = query::actor_ids(&self.world)
            .into_iter()
            .filter(|actor| query::fuel(&self.world, *actor).is_some_and(|fuel| fuel <= 0.0))
            .collect();

        if !depleted.is_empty() {
            TerminalStatus::FuelDepleted { actors: depleted }
        } else if self.clock.is_exhausted() {
            TerminalStatus::TimeBudgetExceeded
        } else {
            TerminalStatus::Running
        }
    }
}

fn observe(world: &World, actor: ActorId, encoding: Encoding) -> Option<Observation> {
    let snapshot = query::actor_snapshot(world, actor)?;
    Some(sky_arena_system_observation::encode(
        encoding,
        &snapshot,
        &query::targets(world),
        &query::pickups(world),
    ))
}
