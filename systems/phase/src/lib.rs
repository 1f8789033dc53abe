#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Day and night cycle transitions.

use night_shift_core::{Command, Event, Phase, PlayerView, RoundOutcome};

/// Pure system that turns expired phase timers into transitions.
#[derive(Debug, Default)]
pub struct PhaseMachine;

impl PhaseMachine {
    /// Reacts to the first `PhaseTimerExpired` event in `events`.
    ///
    /// An expired calm phase starts the hostile phase. An expired hostile
    /// phase ends the round as lost. At most one transition is emitted per
    /// batch.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let expired = events.iter().find_map(|event| match event {
            Event::PhaseTimerExpired { phase } => Some(*phase),
            _ => None,
        });
        match expired {
            Some(Phase::Calm) => out.push(Command::BeginHostilePhase),
            Some(Phase::Hostile) => out.push(Command::ResetRound {
                outcome: RoundOutcome::Lost,
            }),
            None => {}
        }
    }
}

/// Ends the round as won once every connected player has reached the objective
/// during the hostile phase. An empty camp never wins.
pub fn resolve_objective(phase: Phase, players: &PlayerView, out: &mut Vec<Command>) {
    if phase != Phase::Hostile || players.is_empty() {
        return;
    }
    if players.iter().all(|player| player.objective_reached) {
        out.push(Command::ResetRound {
            outcome: RoundOutcome::Won,
        });
    }
}
