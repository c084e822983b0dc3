//! Reset/step interface for hosts and training harnesses.

use sky_arena_core::{Action, ActorId, Encoding, Event, Observation, TerminalStatus};
use sky_arena_system_observation::nearest_target_distance;
use sky_arena_world::{query, WorldError};

use crate::{Simulation, SimulationError};

/// Reward shaping applied to the agent every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RewardConfig {
    /// Reward earned per second survived.
    pub survival: f32,
    /// Penalty per second and per normalised unit of distance to the nearest target.
    pub distance_penalty: f32,
    /// Reward per target collected.
    pub target_bonus: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            survival: 1.0,
            distance_penalty: 0.01,
            target_bonus: 100.0,
        }
    }
}

/// Result of one environment step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Agent's view after the step.
    pub observation: Observation,
    /// Reward accumulated over the repeated ticks.
    pub reward: f32,
    /// Termination status after the last simulated tick.
    pub status: TerminalStatus,
}

/// Single-agent environment wrapping a [`Simulation`].
#[derive(Debug)]
pub struct ArenaEnv {
    simulation: Simulation,
    agent: ActorId,
    encoding: Encoding,
    action_repeat: u32,
    reward: RewardConfig,
}

impl ArenaEnv {
    /// Wraps `simulation`, designating `agent` as the controlled actor.
    pub fn new(
        simulation: Simulation,
        agent: ActorId,
        encoding: Encoding,
    ) -> Result<Self, SimulationError> {
        if query::actor(simulation.world(), agent).is_none() {
            return Err(WorldError::UnknownActor(agent).into());
        }
        Ok(Self {
            simulation,
            agent,
            encoding,
            action_repeat: 1,
            reward: RewardConfig::default(),
        })
    }

    /// Repeats every supplied action for `repeat` ticks; zero is treated as one.
    #[must_use]
    pub fn with_action_repeat(mut self, repeat: u32) -> Self {
        self.action_repeat = repeat.max(1);
        self
    }

    /// Replaces the reward shaping.
    #[must_use]
    pub fn with_reward(mut self, reward: RewardConfig) -> Self {
        self.reward = reward;
        self
    }

    /// Wrapped simulation.
    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Starts a new episode and returns the agent's first observation.
    pub fn reset(&mut self) -> Result<Observation, SimulationError> {
        self.simulation.reset()?;
        Ok(self.observe())
    }

    /// Advances the episode.
    ///
    /// `Some(action)` overrides the agent's controller; `None` lets the
    /// controller decide. The step ends early once the episode terminates.
    pub fn step(&mut self, action: Option<Action>) -> Result<StepOutcome, SimulationError> {
        let mut reward = 0.0;
        let mut status = TerminalStatus::Running;
        for _ in 0..self.action_repeat {
            status = match action {
                Some(action) => self
                    .simulation
                    .tick_with(Some((self.agent, action.into())))?,
                None => self.simulation.tick()?,
            };
            reward += self.tick_reward();
            if status.is_terminal() {
                break;
            }
        }

        Ok(StepOutcome {
            observation: self.observe(),
            reward,
            status,
        })
    }

    fn observe(&self) -> Observation {
        self.simulation
            .observe(self.agent, self.encoding)
            .unwrap_or_default()
    }

    fn tick_reward(&self) -> f32 {
        let world = self.simulation.world();
        let fps = query::config(world).game.fps as f32;
        let collected = self
            .simulation
            .events()
            .iter()
            .filter(|event| {
                matches!(event, Event::TargetCollected { actor, .. } if *actor == self.agent)
            })
            .count() as f32;
        let distance = query::actor_snapshot(world, self.agent)
            .and_then(|agent| nearest_target_distance(&agent, &query::targets(world)))
            .unwrap_or(0.0);

        self.reward.survival / fps - self.reward.distance_penalty * distance / fps
            + self.reward.target_bonus * collected
    }
}
