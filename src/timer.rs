//! Countdown state machine.
//!
//! ```text
//!   setup --start--> active --pause--> paused
//!                     ^  |               |
//!                     |  +---<--resume---+
//!                     |
//!                     +--tick to 0--> expired
//!
//!   active | paused | expired --stop/reset--> setup
//! ```
//!
//! The countdown counts ticks rather than reading the wall clock, so it
//! drifts when the event loop stalls. Time since expiry is measured from the
//! wall clock.

use crate::alarm::{AlarmPolicy, AlarmScheduler};
use crate::chime::Chime;
use crate::config::TICK_MS;
use crate::schedule::{LoopKind, Slot, Ticket, Wakes};
use log::{debug, info};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Setup,
    Active,
    Paused,
    Expired,
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerState::Setup => "setup",
            TimerState::Active => "active",
            TimerState::Paused => "paused",
            TimerState::Expired => "expired",
        };
        f.write_str(name)
    }
}

/// Why a start request was refused. The timer is left untouched either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    ZeroDuration,
    AlreadyRunning(TimerState),
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::ZeroDuration => write!(f, "Duration must be greater than zero"),
            StartError::AlreadyRunning(state) => {
                write!(f, "Timer cannot start while {}", state)
            }
        }
    }
}

impl std::error::Error for StartError {}

/// Read-only view handed to the UI after every change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub remaining_secs: u32,
    pub elapsed_since_expiry_secs: u32,
    pub original_duration_secs: u32,
    pub policy: AlarmPolicy,
    pub chimes_fired: u32,
}

pub struct TimerCore<C: Chime> {
    state: TimerState,
    remaining: u32,
    original_duration: u32,
    policy: AlarmPolicy,
    expired_at_ms: Option<f64>,
    elapsed_since_expiry: u32,
    countdown: Slot,
    since_expiry: Slot,
    alarm: AlarmScheduler<C>,
}

impl<C: Chime> TimerCore<C> {
    pub fn new(chime: C) -> Self {
        Self {
            state: TimerState::Setup,
            remaining: 0,
            original_duration: 0,
            policy: AlarmPolicy::default(),
            expired_at_ms: None,
            elapsed_since_expiry: 0,
            countdown: Slot::new(LoopKind::Countdown),
            since_expiry: Slot::new(LoopKind::SinceExpiry),
            alarm: AlarmScheduler::new(chime),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed_since_expiry_secs(&self) -> u32 {
        self.elapsed_since_expiry
    }

    pub fn original_duration_secs(&self) -> u32 {
        self.original_duration
    }

    pub fn alarm(&self) -> &AlarmScheduler<C> {
        &self.alarm
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            remaining_secs: self.remaining,
            elapsed_since_expiry_secs: self.elapsed_since_expiry,
            original_duration_secs: self.original_duration,
            policy: self.policy,
            chimes_fired: self.alarm.chimes_fired(),
        }
    }

    /// Begin counting down `duration_secs` with the given alarm policy.
    pub fn start(&mut self, duration_secs: u32, policy: AlarmPolicy) -> Result<Wakes, StartError> {
        if self.state != TimerState::Setup {
            return Err(StartError::AlreadyRunning(self.state));
        }
        if duration_secs == 0 {
            return Err(StartError::ZeroDuration);
        }

        let mut out = Wakes::new();
        self.original_duration = duration_secs;
        self.remaining = duration_secs;
        self.policy = policy;
        self.state = TimerState::Active;
        self.alarm.prepare();
        self.countdown.arm(TICK_MS, &mut out);
        info!("Timer started: {}s, alarm {}", duration_secs, policy.label());
        Ok(out)
    }

    pub fn pause(&mut self) -> Wakes {
        let mut out = Wakes::new();
        if self.state == TimerState::Active {
            self.countdown.cancel(&mut out);
            self.state = TimerState::Paused;
            debug!("Timer paused at {}s", self.remaining);
        }
        out
    }

    pub fn resume(&mut self) -> Wakes {
        let mut out = Wakes::new();
        if self.state == TimerState::Paused {
            self.countdown.arm(TICK_MS, &mut out);
            self.state = TimerState::Active;
            debug!("Timer resumed at {}s", self.remaining);
        }
        out
    }

    pub fn stop(&mut self) -> Wakes {
        self.back_to_setup("stopped")
    }

    pub fn reset(&mut self) -> Wakes {
        self.back_to_setup("reset")
    }

    /// Handle one loop firing at wall-clock time `now_ms`.
    ///
    /// Tickets that are no longer live are ignored.
    pub fn fire(&mut self, ticket: Ticket, now_ms: f64) -> Wakes {
        match ticket.kind {
            LoopKind::Countdown => self.on_countdown_tick(ticket, now_ms),
            LoopKind::SinceExpiry => self.on_since_expiry_tick(ticket, now_ms),
            LoopKind::Alarm => self.alarm.fire(ticket),
        }
    }

    fn on_countdown_tick(&mut self, ticket: Ticket, now_ms: f64) -> Wakes {
        let mut out = Wakes::new();
        if self.state != TimerState::Active || !self.countdown.accepts(ticket) {
            debug!("Ignoring stale countdown ticket {:?}", ticket);
            return out;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.expire(now_ms, &mut out);
        }
        out
    }

    fn expire(&mut self, now_ms: f64, out: &mut Wakes) {
        self.countdown.cancel(out);
        self.remaining = 0;
        self.expired_at_ms = Some(now_ms);
        self.elapsed_since_expiry = 0;
        self.state = TimerState::Expired;
        info!("Timer expired after {}s", self.original_duration);

        self.since_expiry.arm(TICK_MS, out);
        out.extend(self.alarm.start(self.policy));
    }

    fn on_since_expiry_tick(&mut self, ticket: Ticket, now_ms: f64) -> Wakes {
        if self.state != TimerState::Expired || !self.since_expiry.accepts(ticket) {
            debug!("Ignoring stale since-expiry ticket {:?}", ticket);
            return Wakes::new();
        }
        if let Some(expired_at) = self.expired_at_ms {
            let elapsed_ms = (now_ms - expired_at).max(0.0);
            self.elapsed_since_expiry = (elapsed_ms / 1000.0).floor() as u32;
        }
        Wakes::new()
    }

    fn back_to_setup(&mut self, verb: &str) -> Wakes {
        let mut out = Wakes::new();
        self.countdown.cancel(&mut out);
        self.since_expiry.cancel(&mut out);
        out.extend(self.alarm.stop());

        if self.state != TimerState::Setup {
            info!("Timer {} from {}", verb, self.state);
        }
        self.state = TimerState::Setup;
        self.remaining = 0;
        self.expired_at_ms = None;
        self.elapsed_since_expiry = 0;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chime::ChimeError;
    use crate::schedule::Wake;

    struct SilentChime;

    impl Chime for SilentChime {
        fn tone(&mut self) -> Result<(), ChimeError> {
            Ok(())
        }

        fn pulse(&mut self) -> Result<(), ChimeError> {
            Ok(())
        }
    }

    fn armed(wakes: &Wakes, kind: LoopKind) -> Ticket {
        wakes
            .iter()
            .find_map(|w| match w {
                Wake::Arm { ticket, .. } if ticket.kind == kind => Some(*ticket),
                _ => None,
            })
            .expect("loop armed")
    }

    fn started(duration: u32, policy: AlarmPolicy) -> (TimerCore<SilentChime>, Ticket) {
        let mut core = TimerCore::new(SilentChime);
        let wakes = core.start(duration, policy).expect("start accepted");
        let ticket = armed(&wakes, LoopKind::Countdown);
        (core, ticket)
    }

    #[test]
    fn start_moves_to_active_with_full_remaining() {
        let (core, _) = started(90, AlarmPolicy::Times(10));
        assert_eq!(core.state(), TimerState::Active);
        assert_eq!(core.remaining_secs(), 90);
        assert_eq!(core.original_duration_secs(), 90);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let mut core = TimerCore::new(SilentChime);
        assert_eq!(
            core.start(0, AlarmPolicy::Times(10)),
            Err(StartError::ZeroDuration)
        );
        assert_eq!(core.snapshot(), TimerSnapshot::default());
    }

    #[test]
    fn start_while_running_is_rejected() {
        let (mut core, _) = started(10, AlarmPolicy::Times(5));
        assert_eq!(
            core.start(20, AlarmPolicy::UntilStopped),
            Err(StartError::AlreadyRunning(TimerState::Active))
        );
        assert_eq!(core.remaining_secs(), 10);
    }

    #[test]
    fn tick_decrements_by_one() {
        let (mut core, ticket) = started(3, AlarmPolicy::Times(5));
        assert!(core.fire(ticket, 1_000.0).is_empty());
        assert_eq!(core.remaining_secs(), 2);
    }

    #[test]
    fn pause_freezes_and_resume_rearms() {
        let (mut core, ticket) = started(5, AlarmPolicy::Times(5));
        core.fire(ticket, 1_000.0);

        assert_eq!(core.pause(), vec![Wake::Cancel(LoopKind::Countdown)]);
        assert_eq!(core.state(), TimerState::Paused);
        // Tick racing with the pause is dropped.
        core.fire(ticket, 2_000.0);
        assert_eq!(core.remaining_secs(), 4);
        assert!(core.pause().is_empty());

        let wakes = core.resume();
        let resumed = armed(&wakes, LoopKind::Countdown);
        assert_ne!(resumed, ticket);
        assert_eq!(core.state(), TimerState::Active);
        assert!(core.resume().is_empty());

        core.fire(resumed, 9_000.0);
        assert_eq!(core.remaining_secs(), 3);
    }

    #[test]
    fn last_tick_expires_and_starts_alarm() {
        let (mut core, ticket) = started(2, AlarmPolicy::Times(3));
        core.fire(ticket, 1_000.0);
        let wakes = core.fire(ticket, 2_000.0);

        assert_eq!(core.state(), TimerState::Expired);
        assert_eq!(core.remaining_secs(), 0);
        assert_eq!(core.elapsed_since_expiry_secs(), 0);
        assert_eq!(wakes[0], Wake::Cancel(LoopKind::Countdown));
        armed(&wakes, LoopKind::SinceExpiry);
        armed(&wakes, LoopKind::Alarm);
        assert_eq!(core.alarm().chimes_fired(), 1);

        // No second expiry from a late countdown tick.
        assert!(core.fire(ticket, 3_000.0).is_empty());
        assert_eq!(core.alarm().chimes_fired(), 1);
    }

    #[test]
    fn elapsed_since_expiry_follows_wall_clock() {
        let (mut core, ticket) = started(1, AlarmPolicy::Times(1));
        let wakes = core.fire(ticket, 10_000.0);
        let since = armed(&wakes, LoopKind::SinceExpiry);

        core.fire(since, 11_000.0);
        assert_eq!(core.elapsed_since_expiry_secs(), 1);
        core.fire(since, 12_999.0);
        assert_eq!(core.elapsed_since_expiry_secs(), 2);
        // A clock stepping backwards never underflows.
        core.fire(since, 5_000.0);
        assert_eq!(core.elapsed_since_expiry_secs(), 0);
    }

    #[test]
    fn stop_from_every_state_returns_to_setup() {
        let (mut active, _) = started(5, AlarmPolicy::Times(5));
        assert_eq!(active.stop(), vec![Wake::Cancel(LoopKind::Countdown)]);
        assert_eq!(active.state(), TimerState::Setup);
        assert_eq!(active.remaining_secs(), 0);

        let (mut paused, _) = started(5, AlarmPolicy::Times(5));
        paused.pause();
        assert!(paused.stop().is_empty());
        assert_eq!(paused.state(), TimerState::Setup);

        let (mut expired, ticket) = started(1, AlarmPolicy::UntilStopped);
        expired.fire(ticket, 1_000.0);
        let wakes = expired.reset();
        assert!(wakes.contains(&Wake::Cancel(LoopKind::SinceExpiry)));
        assert!(wakes.contains(&Wake::Cancel(LoopKind::Alarm)));
        assert_eq!(expired.state(), TimerState::Setup);
        assert_eq!(expired.elapsed_since_expiry_secs(), 0);
        assert!(!expired.alarm().is_ringing());
        // Last duration survives for display.
        assert_eq!(expired.original_duration_secs(), 1);
    }

    #[test]
    fn stop_in_setup_is_a_no_op() {
        let mut core = TimerCore::new(SilentChime);
        assert!(core.stop().is_empty());
        assert!(core.reset().is_empty());
        assert_eq!(core.state(), TimerState::Setup);
    }

    #[test]
    fn restart_after_stop_ignores_old_tickets() {
        let (mut core, old) = started(5, AlarmPolicy::Times(5));
        core.stop();
        let wakes = core.start(3, AlarmPolicy::Times(5)).expect("start accepted");
        let new = armed(&wakes, LoopKind::Countdown);

        core.fire(old, 1_000.0);
        assert_eq!(core.remaining_secs(), 3);
        core.fire(new, 1_000.0);
        assert_eq!(core.remaining_secs(), 2);
    }

    #[test]
    fn snapshot_serializes_state_in_lowercase() {
        let (core, _) = started(42, AlarmPolicy::UntilStopped);
        let json = serde_json::to_value(core.snapshot()).expect("serializable");
        assert_eq!(json["state"], "active");
        assert_eq!(json["remaining_secs"], 42);
        assert_eq!(json["policy"], "infinite");
    }
}
