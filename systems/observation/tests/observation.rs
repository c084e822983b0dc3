use approx::assert_abs_diff_eq;
use glam::Vec2;
use sky_arena_core::{
    ActorId, ActorSnapshot, Encoding, PickupId, PickupKind, PickupSnapshot, TargetId,
    TargetSnapshot,
};
use sky_arena_system_observation::{
    encode, encode_multi, encode_nearest, nearest_target_distance, PADDING,
};

fn actor() -> ActorSnapshot {
    ActorSnapshot {
        id: ActorId::new(0),
        position: Vec2::new(100.0, 100.0),
        heading_degrees: 0.0,
        speed: 2.5,
        speed_step: 0.2,
        turn_step: 5.0,
        score: 0,
        fuel: 80.0,
        fuel_max: 100.0,
    }
}

fn target(id: u32, x: f32, y: f32) -> TargetSnapshot {
    TargetSnapshot {
        id: TargetId::new(id),
        position: Vec2::new(x, y),
        size: 80.0,
    }
}

fn pickup(id: u32, x: f32, y: f32) -> PickupSnapshot {
    PickupSnapshot {
        id: PickupId::new(id),
        kind: PickupKind::Refuel,
        position: Vec2::new(x, y),
        size: 80.0,
        duration_ticks: None,
    }
}

#[test]
fn missing_pickup_slot_is_padded_in_multi_encoding() {
    let targets = [target(0, 600.0, 100.0), target(1, 100.0, 350.0)];
    let pickups = [pickup(0, 350.0, 100.0)];
    let observation = encode_multi(&actor(), &targets, &pickups);
    let features = observation.as_slice();

    assert_eq!(features.len(), Encoding::Multi.width());
    assert_eq!(features[2], 2.0, "two targets present");
    assert_eq!(features[9], 1.0, "one pickup present");
    assert_eq!(&features[13..16], &[PADDING, PADDING, PADDING]);
    assert_eq!(features[16], 80.0);

    // Closer target first.
    assert_abs_diff_eq!(features[3], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(features[6], 1.0, epsilon = 1e-6);
}

#[test]
fn legitimate_slots_never_look_like_padding() {
    let positions = [
        (100.0, 100.0),
        (99.0, 100.0),
        (0.0, 0.0),
        (799.0, 799.0),
        (100.0, 99.0),
    ];
    let targets: Vec<_> = positions
        .iter()
        .enumerate()
        .map(|(id, (x, y))| target(id as u32, *x, *y))
        .collect();
    for pair in targets.chunks(2) {
        let observation = encode_multi(&actor(), pair, &[]);
        let features = observation.as_slice();
        for slot in 0..pair.len() {
            let start = 3 + slot * 3;
            let triple = &features[start..start + 3];
            assert_ne!(triple, &[PADDING, PADDING, PADDING]);
            assert!(triple[0] >= 0.0, "distance is never negative");
        }
    }
}

#[test]
fn nearest_encoding_layout() {
    let targets = [target(0, 100.0, 600.0), target(1, 100.0, 350.0)];
    let pickups = [pickup(0, 600.0, 100.0)];
    let observation = encode_nearest(&actor(), &targets, &pickups);
    let features = observation.as_slice();

    assert_eq!(features.len(), Encoding::Nearest.width());
    assert_abs_diff_eq!(features[0], 0.0);
    assert_abs_diff_eq!(features[1], 2.5);
    assert_abs_diff_eq!(features[2], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(features[3], std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    assert_abs_diff_eq!(features[4], 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(features[5], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(features[6], -std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    assert_abs_diff_eq!(features[7], 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(features[8], 80.0);
}

#[test]
fn empty_category_is_padded_in_nearest_encoding() {
    let observation = encode(Encoding::Nearest, &actor(), &[target(0, 200.0, 100.0)], &[]);
    let features = observation.as_slice();
    assert_eq!(features[4], PADDING);
    assert_eq!(features[5], PADDING);
    assert_eq!(features[7], PADDING);
}

#[test]
fn nearest_target_distance_is_normalised() {
    let targets = [target(0, 100.0, 600.0), target(1, 350.0, 100.0)];
    let distance = nearest_target_distance(&actor(), &targets).expect("targets present");
    assert_abs_diff_eq!(distance, 0.5, epsilon = 1e-6);
    assert_eq!(nearest_target_distance(&actor(), &[]), None);
}
