#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Sky Arena.

pub mod effects;
pub mod entities;
pub mod fuel;
pub mod kinematics;

use sky_arena_core::{
    ActorId, ArenaConfig, Command, ConfigError, Event, Maneuver, PickupId, PickupKind,
    SubjectKind, TargetId,
};
use thiserror::Error;
use tracing::debug;

use glam::Vec2;

use crate::{
    effects::{apply_pickup, EffectError, EffectLedger, EffectSubject, PickupEffect},
    entities::{Pickup, Target},
    fuel::FuelBar,
    kinematics::Actor,
};

/// Errors reported while constructing or mutating the world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The configuration violates a numeric invariant.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A world needs at least one actor.
    #[error("the world requires at least one actor")]
    NoActors,
    /// A command referenced an actor that does not exist.
    #[error("unknown actor {0:?}")]
    UnknownActor(ActorId),
    /// A pickup effect was wired to the wrong subject.
    #[error(transparent)]
    Effect(#[from] EffectError),
}

/// Represents the authoritative Sky Arena world state.
///
/// Actors and fuel bars live in parallel lists paired by [`ActorId`] index.
#[derive(Debug)]
pub struct World {
    config: ArenaConfig,
    actors: Vec<Actor>,
    fuel: Vec<FuelBar>,
    targets: Vec<Target>,
    pickups: Vec<Pickup>,
    effects: EffectLedger,
    next_target: u32,
    next_pickup: u32,
    tick_index: u64,
}

impl World {
    /// Creates a world holding `actor_count` actors in their initial state.
    ///
    /// Only the configured initial targets are placed; pickups require a
    /// random kind and arrive through [`Command::SpawnPickup`].
    pub fn new(config: ArenaConfig, actor_count: usize) -> Result<Self, WorldError> {
        config.validate()?;
        if actor_count == 0 {
            return Err(WorldError::NoActors);
        }

        let mut world = Self {
            actors: Vec::with_capacity(actor_count),
            fuel: Vec::with_capacity(actor_count),
            targets: Vec::new(),
            pickups: Vec::new(),
            effects: EffectLedger::default(),
            next_target: 0,
            next_pickup: 0,
            tick_index: 0,
            config,
        };
        world.reset(actor_count, &mut Vec::new());
        Ok(world)
    }

    fn reset(&mut self, actor_count: usize, out_events: &mut Vec<Event>) {
        self.actors = (0..actor_count)
            .map(|index| Actor::new(ActorId::new(index as u32), &self.config.actor))
            .collect();
        self.fuel = (0..actor_count)
            .map(|_| FuelBar::new(self.config.fuel.initial, self.config.fuel.max))
            .collect();
        self.targets.clear();
        self.pickups.clear();
        self.effects.clear();
        self.next_target = 0;
        self.next_pickup = 0;
        self.tick_index = 0;
        out_events.push(Event::WorldReset);

        let initial_targets = self.config.spawn.initial_targets.clone();
        for position in initial_targets {
            self.spawn_target(position, out_events);
        }
    }

    fn spawn_target(&mut self, position: Vec2, out_events: &mut Vec<Event>) {
        let id = TargetId::new(self.next_target);
        self.next_target = self.next_target.wrapping_add(1);
        self.targets
            .push(Target::new(id, position, self.config.spawn.target_size));
        debug!(target_id = id.get(), x = position.x, y = position.y, "target spawned");
        out_events.push(Event::TargetSpawned {
            target: id,
            position,
        });
    }

    fn spawn_pickup(&mut self, position: Vec2, kind: PickupKind, out_events: &mut Vec<Event>) {
        let id = PickupId::new(self.next_pickup);
        self.next_pickup = self.next_pickup.wrapping_add(1);
        let effect = PickupEffect::for_kind(kind, &self.config.pickups);
        self.pickups.push(Pickup::new(
            id,
            position,
            self.config.spawn.pickup_size,
            effect,
        ));
        debug!(pickup_id = id.get(), ?kind, x = position.x, y = position.y, "pickup spawned");
        out_events.push(Event::PickupSpawned {
            pickup: id,
            kind,
            position,
        });
    }

    fn steer(
        &mut self,
        actor_id: ActorId,
        maneuver: Maneuver,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let index = actor_id.index();
        let extent = self.config.world.extent();
        let actor = self
            .actors
            .get_mut(index)
            .ok_or(WorldError::UnknownActor(actor_id))?;

        let from = actor.position();
        kinematics::advance(actor, maneuver, extent);
        let position = actor.position();
        out_events.push(Event::ActorMoved {
            actor: actor_id,
            from,
            to: position,
        });

        // Detect every hit before mutating either entity list.
        let target_hits = entities::collect(position, &self.targets);
        let pickup_hits = entities::collect(position, &self.pickups);

        let collected_targets = entities::remove_indices(&mut self.targets, &target_hits);
        actor.add_score(collected_targets.len() as u32);
        for target in &collected_targets {
            debug!(actor = actor_id.get(), target_id = target.id().get(), "target collected");
            out_events.push(Event::TargetCollected {
                actor: actor_id,
                target: target.id(),
            });
        }

        let collected_pickups = entities::remove_indices(&mut self.pickups, &pickup_hits);
        for pickup in &collected_pickups {
            self.apply_pickup_effect(actor_id, pickup, out_events)?;
        }

        self.burn_fuel(actor_id, out_events)
    }

    fn apply_pickup_effect(
        &mut self,
        actor_id: ActorId,
        pickup: &Pickup,
        out_events: &mut Vec<Event>,
    ) -> Result<(), WorldError> {
        let index = actor_id.index();
        let subject = match pickup.effect().subject() {
            SubjectKind::Fuel => self.fuel.get_mut(index).map(EffectSubject::Fuel),
            SubjectKind::Actor => self.actors.get_mut(index).map(EffectSubject::Actor),
        }
        .ok_or(WorldError::UnknownActor(actor_id))?;

        let effect_id = self.effects.allocate();
        let active = apply_pickup(pickup.effect(), subject, effect_id)?;
        debug!(
            actor = actor_id.get(),
            pickup_id = pickup.id().get(),
            kind = ?pickup.kind(),
            "pickup collected"
        );
        out_events.push(Event::PickupCollected {
            actor: actor_id,
            pickup: pickup.id(),
            kind: pickup.kind(),
        });

        if let Some(active) = active {
            out_events.push(Event::EffectStarted {
                effect: active.id(),
                actor: active.actor(),
                field: active.field(),
                ticks: active.remaining_ticks(),
            });
            self.effects.track(active);
        }
        Ok(())
    }

    fn burn_fuel(&mut self, actor_id: ActorId, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        let index = actor_id.index();
        let actor = self
            .actors
            .get(index)
            .ok_or(WorldError::UnknownActor(actor_id))?;
        let delta = kinematics::fuel_delta(actor, &self.config.fuel);
        let bar = self
            .fuel
            .get_mut(index)
            .ok_or(WorldError::UnknownActor(actor_id))?;

        let was_empty = bar.is_empty();
        let _ = bar.update(delta);
        if bar.is_empty() && !was_empty {
            out_events.push(Event::FuelDepleted { actor: actor_id });
        }
        Ok(())
    }

    fn close_tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        for effect in self.effects.advance() {
            if let Some(actor) = self.actors.get_mut(effect.actor().index()) {
                let _ = effect.revert(actor);
            }
            debug!(
                effect = effect.id().get(),
                actor = effect.actor().get(),
                field = ?effect.field(),
                "effect expired"
            );
            out_events.push(Event::EffectExpired {
                effect: effect.id(),
                actor: effect.actor(),
                field: effect.field(),
            });
        }
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
    match command {
        Command::Steer { actor, maneuver } => world.steer(actor, maneuver, out_events)?,
        Command::SpawnTarget { position } => world.spawn_target(position, out_events),
        Command::SpawnPickup { position, kind } => world.spawn_pickup(position, kind, out_events),
        Command::Tick => world.close_tick(out_events),
        Command::Reset => {
            let actor_count = world.actors.len();
            world.reset(actor_count, out_events);
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use sky_arena_core::{
        ActorField, ActorId, ActorSnapshot, ArenaConfig, PickupSnapshot, TargetSnapshot,
    };

    use super::World;
    use crate::{effects::ActiveEffect, kinematics::Actor};

    /// Provides read-only access to the configuration the world runs with.
    #[must_use]
    pub fn config(world: &World) -> &ArenaConfig {
        &world.config
    }

    /// Number of ticks closed since the last reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of actors in the world.
    #[must_use]
    pub fn actor_count(world: &World) -> usize {
        world.actors.len()
    }

    /// Identifiers of every actor in processing order.
    #[must_use]
    pub fn actor_ids(world: &World) -> Vec<ActorId> {
        world.actors.iter().map(Actor::id).collect()
    }

    /// Provides read-only access to an actor's full state.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<&Actor> {
        world.actors.get(actor.index())
    }

    /// Captures a snapshot of an actor together with its fuel bar.
    #[must_use]
    pub fn actor_snapshot(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        let index = actor.index();
        let state = world.actors.get(index)?;
        let fuel = world.fuel.get(index)?;
        Some(ActorSnapshot {
            id: state.id(),
            position: state.position(),
            heading_degrees: state.heading(),
            speed: state.speed(),
            speed_step: state.field(ActorField::SpeedStep).value(),
            turn_step: state.field(ActorField::TurnStep).value(),
            score: state.score(),
            fuel: fuel.value(),
            fuel_max: fuel.max(),
        })
    }

    /// Captures snapshots of every actor in processing order.
    #[must_use]
    pub fn actor_snapshots(world: &World) -> Vec<ActorSnapshot> {
        world
            .actors
            .iter()
            .filter_map(|actor| actor_snapshot(world, actor.id()))
            .collect()
    }

    /// Current fuel value of an actor.
    #[must_use]
    pub fn fuel(world: &World, actor: ActorId) -> Option<f32> {
        world.fuel.get(actor.index()).map(|bar| bar.value())
    }

    /// Captures snapshots of the targets currently in the arena.
    #[must_use]
    pub fn targets(world: &World) -> Vec<TargetSnapshot> {
        world.targets.iter().map(|target| target.snapshot()).collect()
    }

    /// Captures snapshots of the pickups currently in the arena.
    #[must_use]
    pub fn pickups(world: &World) -> Vec<PickupSnapshot> {
        world.pickups.iter().map(|pickup| pickup.snapshot()).collect()
    }

    /// Timed effects that have not yet expired.
    #[must_use]
    pub fn active_effects(world: &World) -> &[ActiveEffect] {
        world.effects.active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sky_arena_core::{Action, ActorField};

    fn still_config() -> ArenaConfig {
        let mut config = ArenaConfig::default();
        config.actor.position = Vec2::new(100.0, 100.0);
        config.actor.speed = config.actor.min_speed;
        config.spawn.initial_targets = vec![Vec2::new(100.0, 100.0)];
        config.spawn.initial_pickups = Vec::new();
        config
    }

    fn steer_idle(world: &mut World, actor: u32, events: &mut Vec<Event>) {
        apply(
            world,
            Command::Steer {
                actor: ActorId::new(actor),
                maneuver: Action::Idle.into(),
            },
            events,
        )
        .expect("steer succeeds");
    }

    #[test]
    fn world_requires_an_actor() {
        assert!(matches!(
            World::new(ArenaConfig::default(), 0),
            Err(WorldError::NoActors)
        ));
    }

    #[test]
    fn invalid_configuration_is_fatal() {
        let mut config = ArenaConfig::default();
        config.world.width = 0.0;
        assert!(matches!(World::new(config, 1), Err(WorldError::Config(_))));
    }

    #[test]
    fn reset_places_initial_targets() {
        let world = World::new(still_config(), 2).expect("valid world");
        let targets = query::targets(&world);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].position, Vec2::new(100.0, 100.0));
        assert_eq!(query::actor_count(&world), 2);
        assert!(query::pickups(&world).is_empty());
    }

    #[test]
    fn steering_onto_a_target_scores_and_removes_it() {
        let mut world = World::new(still_config(), 1).expect("valid world");
        let mut events = Vec::new();
        steer_idle(&mut world, 0, &mut events);

        let snapshot = query::actor_snapshot(&world, ActorId::new(0)).expect("actor exists");
        assert_eq!(snapshot.score, 1);
        assert!(query::targets(&world).is_empty());
        assert!(events.contains(&Event::TargetCollected {
            actor: ActorId::new(0),
            target: TargetId::new(0),
        }));
    }

    #[test]
    fn unknown_actor_is_reported() {
        let mut world = World::new(still_config(), 1).expect("valid world");
        let result = apply(
            &mut world,
            Command::Steer {
                actor: ActorId::new(5),
                maneuver: Maneuver::IDLE,
            },
            &mut Vec::new(),
        );
        assert!(matches!(result, Err(WorldError::UnknownActor(_))));
    }

    #[test]
    fn fuel_saturates_at_zero_and_reports_depletion_once() {
        let mut config = still_config();
        config.spawn.initial_targets = Vec::new();
        config.fuel.initial = 5.0;
        config.fuel.low_speed_rate = 10.0;
        config.fuel.high_speed_rate = 10.0;
        let mut world = World::new(config, 1).expect("valid world");

        let mut events = Vec::new();
        steer_idle(&mut world, 0, &mut events);
        assert_eq!(query::fuel(&world, ActorId::new(0)), Some(0.0));
        steer_idle(&mut world, 0, &mut events);

        let depletions = events
            .iter()
            .filter(|event| matches!(event, Event::FuelDepleted { .. }))
            .count();
        assert_eq!(depletions, 1);
    }

    #[test]
    fn refuel_pickup_tops_up_collecting_actor_only() {
        let mut config = still_config();
        config.spawn.initial_targets = Vec::new();
        config.fuel.initial = 50.0;
        config.fuel.low_speed_rate = 0.0;
        config.fuel.high_speed_rate = 0.0;
        let mut world = World::new(config, 2).expect("valid world");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPickup {
                position: Vec2::new(101.0, 100.0),
                kind: PickupKind::Refuel,
            },
            &mut events,
        )
        .expect("spawn succeeds");

        steer_idle(&mut world, 0, &mut events);
        assert_eq!(query::fuel(&world, ActorId::new(0)), Some(70.0));
        assert_eq!(query::fuel(&world, ActorId::new(1)), Some(50.0));
        assert!(query::pickups(&world).is_empty());
    }

    #[test]
    fn timed_pickup_reverts_after_duration() {
        let mut config = still_config();
        config.spawn.initial_targets = Vec::new();
        config.pickups.speed_boost.duration_ticks = Some(3);
        let mut world = World::new(config, 1).expect("valid world");
        let actor = ActorId::new(0);
        let before = query::actor(&world, actor)
            .expect("actor exists")
            .field(ActorField::SpeedStep)
            .value();

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPickup {
                position: Vec2::new(100.0, 100.0),
                kind: PickupKind::SpeedBoost,
            },
            &mut events,
        )
        .expect("spawn succeeds");
        steer_idle(&mut world, 0, &mut events);
        assert_eq!(query::active_effects(&world).len(), 1);

        // The collection tick plus the three boosted ones.
        for _ in 0..3 {
            apply(&mut world, Command::Tick, &mut events).expect("tick succeeds");
            assert_eq!(query::active_effects(&world).len(), 1);
        }
        apply(&mut world, Command::Tick, &mut events).expect("tick succeeds");

        let after = query::actor(&world, actor)
            .expect("actor exists")
            .field(ActorField::SpeedStep)
            .value();
        assert!(query::active_effects(&world).is_empty());
        assert_eq!(after, before);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EffectExpired { .. })));
    }

    #[test]
    fn single_tick_boost_applies_to_the_next_move() {
        let mut config = still_config();
        config.spawn.initial_targets = Vec::new();
        config.pickups.speed_boost.duration_ticks = Some(1);
        let mut world = World::new(config, 1).expect("valid world");
        let actor = ActorId::new(0);
        let speed = |world: &World| query::actor(world, actor).expect("actor exists").speed();
        let speed_up = |world: &mut World, events: &mut Vec<Event>| {
            apply(
                world,
                Command::Steer {
                    actor,
                    maneuver: Action::SpeedUp.into(),
                },
                events,
            )
            .expect("steer succeeds");
        };

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPickup {
                position: Vec2::new(101.0, 100.0),
                kind: PickupKind::SpeedBoost,
            },
            &mut events,
        )
        .expect("spawn succeeds");
        steer_idle(&mut world, 0, &mut events);
        apply(&mut world, Command::Tick, &mut events).expect("tick succeeds");
        assert_eq!(query::active_effects(&world).len(), 1);

        let before = speed(&world);
        speed_up(&mut world, &mut events);
        assert_abs_diff_eq!(speed(&world) - before, 0.3, epsilon = 1e-5);
        apply(&mut world, Command::Tick, &mut events).expect("tick succeeds");
        assert!(query::active_effects(&world).is_empty());

        let before = speed(&world);
        speed_up(&mut world, &mut events);
        assert_abs_diff_eq!(speed(&world) - before, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut world = World::new(still_config(), 1).expect("valid world");
        let mut events = Vec::new();
        steer_idle(&mut world, 0, &mut events);
        apply(&mut world, Command::Tick, &mut events).expect("tick succeeds");

        events.clear();
        apply(&mut world, Command::Reset, &mut events).expect("reset succeeds");
        let snapshot = query::actor_snapshot(&world, ActorId::new(0)).expect("actor exists");
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.position, Vec2::new(100.0, 100.0));
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(query::targets(&world).len(), 1);
        assert_eq!(events.first(), Some(&Event::WorldReset));
    }
}
