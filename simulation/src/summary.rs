//! Match outcome reporting.

use std::fmt;

use serde::Serialize;
use sky_arena_core::{ActorId, ActorSnapshot, TerminalStatus};

/// Why a match ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum EndReason {
    /// The time budget elapsed.
    TimeUp,
    /// One or more actors drained their fuel.
    FuelDepleted {
        /// Actors that ran out, in actor order.
        actors: Vec<ActorId>,
    },
}

/// Ranking at the end of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Standing {
    /// A single actor holds the highest score.
    Leader {
        /// Winning actor.
        actor: ActorId,
        /// Winning score.
        score: u32,
    },
    /// Several actors share the highest score.
    Tie {
        /// Actors sharing the score.
        actors: Vec<ActorId>,
        /// Shared score.
        score: u32,
    },
}

/// Final tally for one actor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ActorScore {
    /// Actor the tally belongs to.
    pub actor: ActorId,
    /// Targets collected.
    pub score: u32,
    /// Fuel left.
    pub fuel: f32,
}

/// Outcome of a finished match.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchSummary {
    /// Why the match ended.
    pub reason: EndReason,
    /// Who leads.
    pub standing: Standing,
    /// Every actor's tally in actor order.
    pub scores: Vec<ActorScore>,
}

impl MatchSummary {
    /// Summarises a terminal status; returns `None` while the match is running.
    #[must_use]
    pub fn from_status(status: &TerminalStatus, actors: &[ActorSnapshot]) -> Option<Self> {
        let reason = match status {
            TerminalStatus::Running => return None,
            TerminalStatus::TimeBudgetExceeded => EndReason::TimeUp,
            TerminalStatus::FuelDepleted { actors } => EndReason::FuelDepleted {
                actors: actors.clone(),
            },
        };

        let best = actors.iter().map(|actor| actor.score).max().unwrap_or(0);
        let leaders: Vec<ActorId> = actors
            .iter()
            .filter(|actor| actor.score == best)
            .map(|actor| actor.id)
            .collect();
        let standing = match leaders.as_slice() {
            [actor] => Standing::Leader {
                actor: *actor,
                score: best,
            },
            _ => Standing::Tie {
                actors: leaders,
                score: best,
            },
        };

        Some(Self {
            reason,
            standing,
            scores: actors
                .iter()
                .map(|actor| ActorScore {
                    actor: actor.id,
                    score: actor.score,
                    fuel: actor.fuel,
                })
                .collect(),
        })
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            EndReason::TimeUp => writeln!(f, "Game over!")?,
            EndReason::FuelDepleted { actors } if actors.len() == 1 => {
                writeln!(f, "Actor {} ran out of fuel!", actors[0].get())?;
            }
            EndReason::FuelDepleted { actors } => {
                writeln!(f, "Actors {} ran out of fuel!", join_ids(actors))?;
            }
        }
        match &self.standing {
            Standing::Leader { actor, score } => {
                writeln!(f, "Actor {} won with {score} targets.", actor.get())?;
            }
            Standing::Tie { score, .. } => writeln!(f, "It's a tie at {score} targets.")?,
        }
        for tally in &self.scores {
            writeln!(
                f,
                "  actor {}: {} targets, {:.1} fuel",
                tally.actor.get(),
                tally.score,
                tally.fuel
            )?;
        }
        Ok(())
    }
}

fn join_ids(actors: &[ActorId]) -> String {
    actors
        .iter()
        .map(|actor| actor.get().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
