//! Fixed-rate headless host loop.

use std::fmt::Display;
use std::io::Write;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use night_shift_core::{Event, PlayerId, ProfileStore, RoundOutcome};
use night_shift_session::{Session, Snapshot};
use night_shift_world::query;
use serde::Serialize;

use crate::bots::ScriptedBot;

/// Simulation rate of the host loop.
pub(crate) const TICKS_PER_SECOND: u32 = 60;
/// Snapshot cadence.
pub(crate) const BROADCAST_INTERVAL: Duration = Duration::from_millis(100);

/// Knobs of one headless run.
#[derive(Clone, Debug)]
pub(crate) struct RunOptions {
    /// Simulated seconds to run for.
    pub(crate) seconds: f64,
    /// Skips pacing against the wall clock.
    pub(crate) fast: bool,
    /// Viewer whose filtered view is published; `None` publishes the spectator view.
    pub(crate) viewer: Option<PlayerId>,
}

/// Totals reported when a run finishes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub(crate) ticks: u64,
    pub(crate) snapshots: u64,
    pub(crate) rounds_won: u32,
    pub(crate) rounds_lost: u32,
}

#[derive(Serialize)]
struct Frame<'a> {
    tick: u64,
    clock: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    viewer: Option<PlayerId>,
    snapshot: &'a Snapshot,
}

/// Joins `bots`, then ticks the session at [`TICKS_PER_SECOND`] until the
/// requested simulated time has elapsed. Snapshots go to `sink` as JSON lines.
///
/// Profiles are flushed whenever a round ends and once more on the way out;
/// flush failures are logged and the loop carries on.
pub(crate) fn run<S, W>(
    session: &mut Session<S>,
    bots: &mut [ScriptedBot],
    options: &RunOptions,
    mut sink: Option<W>,
) -> Result<RunSummary>
where
    S: ProfileStore,
    S::Error: Display,
    W: Write,
{
    for bot in bots.iter() {
        session.join(bot.player(), bot.username());
    }

    let step = Duration::from_secs(1) / TICKS_PER_SECOND;
    let total_ticks = (options.seconds.max(0.0) * f64::from(TICKS_PER_SECOND)).round() as u64;
    let broadcast_every =
        ((BROADCAST_INTERVAL.as_secs_f64() * f64::from(TICKS_PER_SECOND)).round() as u64).max(1);
    let started = Instant::now();
    let mut summary = RunSummary::default();
    tracing::info!(ticks = total_ticks, bots = bots.len(), "headless run started");

    for tick in 0..total_ticks {
        drive_bots(session, bots, tick);
        let events = session.tick(step);
        summary.ticks += 1;

        let mut round_over = false;
        for event in &events {
            match event {
                Event::RoundEnded {
                    outcome: RoundOutcome::Won,
                } => {
                    summary.rounds_won += 1;
                    round_over = true;
                }
                Event::RoundEnded {
                    outcome: RoundOutcome::Lost,
                } => {
                    summary.rounds_lost += 1;
                    round_over = true;
                }
                Event::PhaseChanged { phase } => tracing::info!(%phase, tick, "phase changed"),
                _ => {}
            }
        }
        if round_over {
            flush(session);
        }

        if (tick + 1) % broadcast_every == 0 {
            if let Some(writer) = sink.as_mut() {
                publish(session, tick, options.viewer, writer)?;
                summary.snapshots += 1;
            }
        }

        if !options.fast {
            let deadline = step * u32::try_from(tick + 1).unwrap_or(u32::MAX);
            if let Some(wait) = deadline.checked_sub(started.elapsed()) {
                thread::sleep(wait);
            }
        }
    }

    flush(session);
    if let Some(writer) = sink.as_mut() {
        writer.flush().context("failed to flush snapshot output")?;
    }
    tracing::info!(
        ticks = summary.ticks,
        snapshots = summary.snapshots,
        won = summary.rounds_won,
        lost = summary.rounds_lost,
        "headless run finished"
    );
    Ok(summary)
}

fn drive_bots<S: ProfileStore>(session: &mut Session<S>, bots: &mut [ScriptedBot], tick: u64) {
    let world = session.world();
    let phase = query::phase(world);
    let objective = query::map(world).objective();
    let players = query::player_view(world);
    let inputs: Vec<_> = bots
        .iter_mut()
        .filter_map(|bot| {
            let me = players.get(bot.player())?;
            Some((bot.player(), bot.next_input(tick, me, phase, objective)))
        })
        .collect();
    for (player, payload) in inputs {
        session.input(player, payload);
    }
}

fn publish<S: ProfileStore, W: Write>(
    session: &Session<S>,
    tick: u64,
    viewer: Option<PlayerId>,
    writer: &mut W,
) -> Result<()> {
    let snapshot = session.snapshot_for(viewer);
    let frame = Frame {
        tick,
        clock: query::clock(session.world()),
        viewer,
        snapshot: &snapshot,
    };
    serde_json::to_writer(&mut *writer, &frame).context("failed to encode snapshot")?;
    writer
        .write_all(b"\n")
        .context("failed to write snapshot output")
}

fn flush<S>(session: &mut Session<S>)
where
    S: ProfileStore,
    S::Error: Display,
{
    if let Err(error) = session.flush_profiles() {
        tracing::warn!(%error, "profile flush failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use night_shift_core::Tuning;
    use night_shift_profile_store::MemoryProfileStore;

    fn bots(count: u32) -> Vec<ScriptedBot> {
        (0..count).map(|index| ScriptedBot::new(index, 11)).collect()
    }

    #[test]
    fn one_second_publishes_ten_frames() {
        let mut session = Session::new(Tuning::default(), 11, MemoryProfileStore::new());
        let mut bots = bots(2);
        let options = RunOptions {
            seconds: 1.0,
            fast: true,
            viewer: None,
        };
        let mut output = Vec::new();
        let summary = run(&mut session, &mut bots, &options, Some(&mut output))
            .expect("run succeeds");

        assert_eq!(summary.ticks, 60);
        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .expect("utf8 output")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(summary.snapshots, lines.len() as u64);
        assert_eq!(lines[0]["snapshot"]["phase"], "day");
        assert_eq!(lines[0]["snapshot"]["players"].as_array().map(Vec::len), Some(2));
        assert!(lines[0].get("viewer").is_none());
        assert_eq!(query::player_count(session.world()), 2);
    }

    #[test]
    fn short_days_roll_over_into_night() {
        let mut tuning = Tuning::default();
        tuning.phase.calm_seconds = 0.5;
        tuning.phase.hostile_seconds = 0.5;
        let mut session = Session::new(tuning, 4, MemoryProfileStore::new());
        let mut bots = bots(1);
        let options = RunOptions {
            seconds: 1.5,
            fast: true,
            viewer: Some(PlayerId::new(1)),
        };
        let summary = run(&mut session, &mut bots, &options, None::<Vec<u8>>)
            .expect("run succeeds");
        assert_eq!(summary.snapshots, 0);
        assert_eq!(summary.rounds_won + summary.rounds_lost, 1);
    }
}
