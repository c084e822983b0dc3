//! Externally tracked episode time budget.

use sky_arena_core::config::GameConfig;

/// Counts closed ticks against the configured time limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpisodeClock {
    fps: u32,
    budget: u64,
    elapsed: u64,
}

impl EpisodeClock {
    /// Creates a clock for the provided timing parameters.
    #[must_use]
    pub fn new(game: &GameConfig) -> Self {
        Self {
            fps: game.fps,
            budget: game.tick_budget(),
            elapsed: 0,
        }
    }

    /// Records one closed tick.
    pub fn advance(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    /// Rewinds the clock to the start of an episode.
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    /// Ticks closed since the last reset.
    #[must_use]
    pub const fn elapsed_ticks(&self) -> u64 {
        self.elapsed
    }

    /// Ticks the episode may last.
    #[must_use]
    pub const fn budget_ticks(&self) -> u64 {
        self.budget
    }

    /// Seconds of play elapsed.
    #[must_use]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed as f32 / self.fps as f32
    }

    /// Seconds of play left, never negative.
    #[must_use]
    pub fn remaining_secs(&self) -> f32 {
        self.budget.saturating_sub(self.elapsed) as f32 / self.fps as f32
    }

    /// Reports whether the time budget has elapsed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.elapsed >= self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_exhausts_after_budget() {
        let game = GameConfig {
            fps: 10,
            time_limit_secs: 0.25,
            seed: 0,
        };
        let mut clock = EpisodeClock::new(&game);
        assert_eq!(clock.budget_ticks(), 3);
        for _ in 0..2 {
            clock.advance();
            assert!(!clock.is_exhausted());
        }
        clock.advance();
        assert!(clock.is_exhausted());
        assert_eq!(clock.remaining_secs(), 0.0);

        clock.reset();
        assert_eq!(clock.elapsed_ticks(), 0);
    }
}
