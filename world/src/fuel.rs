//! Saturating fuel bar paired with each actor.

/// Scalar resource clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FuelBar {
    value: f32,
    max: f32,
}

impl FuelBar {
    /// Creates a bar holding `initial`, clamped into `[0, max]`.
    #[must_use]
    pub fn new(initial: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            value: initial.clamp(0.0, max),
            max,
        }
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Capacity of the bar.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Reports whether the bar is drained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value <= 0.0
    }

    /// Adds `delta`, saturating at both bounds, and returns the new value.
    pub fn update(&mut self, delta: f32) -> f32 {
        self.value = (self.value + delta).clamp(0.0, self.max);
        self.value
    }
}
