#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateless encoders turning world snapshots into policy observations.
//!
//! Distances are Euclidean, measured without wrap, and divided by
//! [`DISTANCE_NORMALISATION`]. Angles are `atan2(dy, dx)` of the vector from
//! the actor to the entity. The relative bearing is the actor heading in
//! degrees minus that angle in radians; trained policies depend on this exact
//! mix of units.

use std::cmp::Ordering;

use glam::Vec2;
use sky_arena_core::{
    ActorSnapshot, Encoding, Observation, PickupSnapshot, TargetSnapshot,
    DISTANCE_NORMALISATION,
};

/// Value filling every field of an absent entity slot.
pub const PADDING: f32 = -1.0;

const SLOTS_PER_CATEGORY: usize = 2;

/// Distance, angle and relative bearing of one entity as seen by an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bearing {
    /// Normalised Euclidean distance.
    pub distance: f32,
    /// Angle of the actor-to-entity vector in radians.
    pub angle: f32,
    /// Heading in degrees minus `angle`.
    pub relative: f32,
}

impl Bearing {
    /// Measures the entity at `position` from the actor's point of view.
    #[must_use]
    pub fn measure(actor: &ActorSnapshot, position: Vec2) -> Self {
        let delta = position - actor.position;
        let angle = delta.y.atan2(delta.x);
        Self {
            distance: delta.length() / DISTANCE_NORMALISATION,
            angle,
            relative: actor.heading_degrees - angle,
        }
    }

    const PADDED: Self = Self {
        distance: PADDING,
        angle: PADDING,
        relative: PADDING,
    };

    fn features(self) -> [f32; 3] {
        [self.distance, self.angle, self.relative]
    }
}

/// Encodes the actor's view with the requested layout.
#[must_use]
pub fn encode(
    encoding: Encoding,
    actor: &ActorSnapshot,
    targets: &[TargetSnapshot],
    pickups: &[PickupSnapshot],
) -> Observation {
    match encoding {
        Encoding::Nearest => encode_nearest(actor, targets, pickups),
        Encoding::Multi => encode_multi(actor, targets, pickups),
    }
}

/// Nine features: heading, speed, then the nearest target and pickup.
///
/// Layout: `[heading_rad, speed, target_dist, target_angle, pickup_dist,
/// pickup_angle, target_relative, pickup_relative, fuel]`. A missing entity
/// reports [`PADDING`] in its three fields.
#[must_use]
pub fn encode_nearest(
    actor: &ActorSnapshot,
    targets: &[TargetSnapshot],
    pickups: &[PickupSnapshot],
) -> Observation {
    let target = nearest_bearings(actor, target_points(targets), 1)
        .first()
        .copied()
        .unwrap_or(Bearing::PADDED);
    let pickup = nearest_bearings(actor, pickup_points(pickups), 1)
        .first()
        .copied()
        .unwrap_or(Bearing::PADDED);

    Observation::new(vec![
        actor.heading_radians(),
        actor.speed,
        target.distance,
        target.angle,
        pickup.distance,
        pickup.angle,
        target.relative,
        pickup.relative,
        actor.fuel,
    ])
}

/// Seventeen features covering up to two targets and two pickups.
///
/// Layout: `[heading_rad, speed, target_count, t1 x3, t2 x3, pickup_count,
/// p1 x3, p2 x3, fuel]`. Counts are the number of filled slots; empty slots
/// hold [`PADDING`].
#[must_use]
pub fn encode_multi(
    actor: &ActorSnapshot,
    targets: &[TargetSnapshot],
    pickups: &[PickupSnapshot],
) -> Observation {
    let mut features = Vec::with_capacity(Encoding::Multi.width());
    features.push(actor.heading_radians());
    features.push(actor.speed);
    push_category(
        &mut features,
        &nearest_bearings(actor, target_points(targets), SLOTS_PER_CATEGORY),
    );
    push_category(
        &mut features,
        &nearest_bearings(actor, pickup_points(pickups), SLOTS_PER_CATEGORY),
    );
    features.push(actor.fuel);
    Observation::new(features)
}

/// Normalised distance from the actor to its nearest target.
#[must_use]
pub fn nearest_target_distance(actor: &ActorSnapshot, targets: &[TargetSnapshot]) -> Option<f32> {
    nearest_bearings(actor, target_points(targets), 1)
        .first()
        .map(|bearing| bearing.distance)
}

fn push_category(features: &mut Vec<f32>, bearings: &[Bearing]) {
    features.push(bearings.len() as f32);
    for slot in 0..SLOTS_PER_CATEGORY {
        let bearing = bearings.get(slot).copied().unwrap_or(Bearing::PADDED);
        features.extend_from_slice(&bearing.features());
    }
}

fn target_points(targets: &[TargetSnapshot]) -> impl Iterator<Item = (u32, Vec2)> + '_ {
    targets.iter().map(|target| (target.id.get(), target.position))
}

fn pickup_points(pickups: &[PickupSnapshot]) -> impl Iterator<Item = (u32, Vec2)> + '_ {
    pickups.iter().map(|pickup| (pickup.id.get(), pickup.position))
}

/// Bearings of the `limit` closest points, nearest first, ties by lower id.
fn nearest_bearings(
    actor: &ActorSnapshot,
    points: impl Iterator<Item = (u32, Vec2)>,
    limit: usize,
) -> Vec<Bearing> {
    let mut measured: Vec<(u32, Bearing)> = points
        .map(|(id, position)| (id, Bearing::measure(actor, position)))
        .collect();
    measured.sort_by(|(a_id, a), (b_id, b)| match a.distance.total_cmp(&b.distance) {
        Ordering::Equal => a_id.cmp(b_id),
        other => other,
    });
    measured
        .into_iter()
        .take(limit)
        .map(|(_, bearing)| bearing)
        .collect()
}
