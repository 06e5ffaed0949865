use hoops_common::game_snapshot::ClockState;
use log::*;
use time::{Duration, OffsetDateTime};

/// A gap between ticks longer than this is reported as a catch-up after the host was inactive
pub const CATCH_UP_THRESHOLD: Duration = Duration::seconds(2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TickOutcome {
    /// The countdown is not running, or no time has passed
    Idle,
    /// There was no previous reconciliation point, one has now been set
    Anchored,
    Counted(f64),
    CaughtUp(f64),
}

/// Brings `remaining_secs` up to date with the wall clock.
///
/// Time only counts down while the timer runs in a phase whose clock runs, and
/// never goes below zero. The elapsed time is measured from `last_tick_at`, which
/// is moved to `now`, so a long gap is applied exactly once.
pub(crate) fn tick(clock: &mut ClockState, now: OffsetDateTime) -> TickOutcome {
    if !clock.timer_running || !clock.phase.clock_runs() {
        return TickOutcome::Idle;
    }

    let Some(last_tick_at) = clock.last_tick_at else {
        debug!("No previous tick, anchoring the clock at {now}");
        clock.last_tick_at = Some(now);
        return TickOutcome::Anchored;
    };

    let elapsed = now - last_tick_at;
    if elapsed.is_negative() {
        warn!("Wall clock moved backwards by {}, re-anchoring", -elapsed);
        clock.last_tick_at = Some(now);
        return TickOutcome::Idle;
    }
    if elapsed.is_zero() {
        return TickOutcome::Idle;
    }

    let elapsed_secs = elapsed.as_seconds_f64();
    clock.remaining_secs = (clock.remaining_secs - elapsed_secs).max(0.0);
    clock.last_tick_at = Some(now);
    trace!(
        "Ticked {elapsed_secs:.3}s, {:.3}s remaining",
        clock.remaining_secs
    );

    if elapsed > CATCH_UP_THRESHOLD {
        TickOutcome::CaughtUp(elapsed_secs)
    } else {
        TickOutcome::Counted(elapsed_secs)
    }
}
