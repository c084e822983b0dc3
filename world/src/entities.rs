//! Collectible point entities and proximity-based collection.

use glam::Vec2;
use sky_arena_core::{PickupId, PickupKind, PickupSnapshot, TargetId, TargetSnapshot};

use crate::effects::PickupEffect;

/// Point entity that can be collected by touching it.
pub trait Collectible {
    /// World-space centre.
    fn position(&self) -> Vec2;

    /// Visual edge length.
    fn size(&self) -> f32;

    /// Collection radius, always half of the visual size.
    fn radius(&self) -> f32 {
        self.size() / 2.0
    }
}

/// Scoring entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    id: TargetId,
    position: Vec2,
    size: f32,
}

impl Target {
    /// Creates a target centred at `position`.
    #[must_use]
    pub const fn new(id: TargetId, position: Vec2, size: f32) -> Self {
        Self { id, position, size }
    }

    /// Identifier of the target.
    #[must_use]
    pub const fn id(&self) -> TargetId {
        self.id
    }

    /// Read-only snapshot for queries and renderers.
    #[must_use]
    pub const fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot {
            id: self.id,
            position: self.position,
            size: self.size,
        }
    }
}

impl Collectible for Target {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// Entity that applies an effect to whoever collects it.
#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    id: PickupId,
    position: Vec2,
    size: f32,
    effect: PickupEffect,
}

impl Pickup {
    /// Creates a pickup bound to the provided effect.
    #[must_use]
    pub const fn new(id: PickupId, position: Vec2, size: f32, effect: PickupEffect) -> Self {
        Self {
            id,
            position,
            size,
            effect,
        }
    }

    /// Identifier of the pickup.
    #[must_use]
    pub const fn id(&self) -> PickupId {
        self.id
    }

    /// Variant tag of the bound effect.
    #[must_use]
    pub const fn kind(&self) -> PickupKind {
        self.effect.kind()
    }

    /// Effect applied on collection.
    #[must_use]
    pub const fn effect(&self) -> &PickupEffect {
        &self.effect
    }

    /// Read-only snapshot for queries and renderers.
    #[must_use]
    pub const fn snapshot(&self) -> PickupSnapshot {
        PickupSnapshot {
            id: self.id,
            kind: self.effect.kind(),
            position: self.position,
            size: self.size,
            duration_ticks: self.effect.duration_ticks(),
        }
    }
}

impl Collectible for Pickup {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn size(&self) -> f32 {
        self.size
    }
}

/// Indices of every entity whose collection radius contains `position`.
///
/// An entity exactly one radius away is collected. All simultaneous hits are
/// reported, in ascending index order.
#[must_use]
pub fn collect<T: Collectible>(position: Vec2, entities: &[T]) -> Vec<usize> {
    entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| position.distance(entity.position()) <= entity.radius())
        .map(|(index, _)| index)
        .collect()
}

/// Removes the entities at `indices` and returns them in their original order.
pub(crate) fn remove_indices<T>(entities: &mut Vec<T>, indices: &[usize]) -> Vec<T> {
    if indices.is_empty() {
        return Vec::new();
    }

    let mut removed = Vec::with_capacity(indices.len());
    let mut kept = Vec::with_capacity(entities.len().saturating_sub(indices.len()));
    for (index, entity) in entities.drain(..).enumerate() {
        if indices.contains(&index) {
            removed.push(entity);
        } else {
            kept.push(entity);
        }
    }
    *entities = kept;
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_at(id: u32, x: f32, y: f32) -> Target {
        Target::new(TargetId::new(id), Vec2::new(x, y), 80.0)
    }

    #[test]
    fn entity_exactly_one_radius_away_is_collected() {
        let targets = vec![target_at(0, 140.0, 100.0)];
        assert_eq!(collect(Vec2::new(100.0, 100.0), &targets), vec![0]);
    }

    #[test]
    fn entity_beyond_radius_is_not_collected() {
        let targets = vec![target_at(0, 140.01, 100.0)];
        assert!(collect(Vec2::new(100.0, 100.0), &targets).is_empty());
    }

    #[test]
    fn simultaneous_hits_are_all_reported() {
        let targets = vec![
            target_at(0, 110.0, 100.0),
            target_at(1, 500.0, 500.0),
            target_at(2, 100.0, 130.0),
        ];
        assert_eq!(collect(Vec2::new(100.0, 100.0), &targets), vec![0, 2]);
    }

    #[test]
    fn remove_indices_preserves_order_of_survivors() {
        let mut targets = vec![
            target_at(0, 0.0, 0.0),
            target_at(1, 1.0, 0.0),
            target_at(2, 2.0, 0.0),
            target_at(3, 3.0, 0.0),
        ];
        let removed = remove_indices(&mut targets, &[1, 3]);
        let removed_ids: Vec<_> = removed.iter().map(Target::id).collect();
        let kept_ids: Vec<_> = targets.iter().map(Target::id).collect();
        assert_eq!(removed_ids, vec![TargetId::new(1), TargetId::new(3)]);
        assert_eq!(kept_ids, vec![TargetId::new(0), TargetId::new(2)]);
    }
}
