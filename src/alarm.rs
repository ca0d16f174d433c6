//! Repeating alarm after expiry.
//!
//! The scheduler rings one chime as soon as it starts, then one more every
//! [`CHIME_INTERVAL_MS`] until the policy's bound is reached or it is stopped.
//!
//! Calling [`AlarmScheduler::start`] while a chain is running restarts it: the
//! old chain's ticket goes stale, the chime count resets and a new chime
//! rings immediately.

use crate::chime::Chime;
use crate::config::{ALARM_OPTIONS_JSON, CHIME_INTERVAL_MS};
use crate::schedule::{LoopKind, Slot, Ticket, Wakes};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const UNBOUNDED_VALUE: &str = "infinite";

/// How many chimes ring after expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AlarmPolicy {
    Times(u32),
    UntilStopped,
}

impl AlarmPolicy {
    /// Bound on the number of chimes, `None` when unbounded.
    pub fn bound(&self) -> Option<u32> {
        match self {
            AlarmPolicy::Times(n) => Some(*n),
            AlarmPolicy::UntilStopped => None,
        }
    }

    /// Menu label, e.g. "10 times" or "Until Stopped".
    pub fn label(&self) -> String {
        match self {
            AlarmPolicy::Times(1) => "Once".to_string(),
            AlarmPolicy::Times(n) => format!("{} times", n),
            AlarmPolicy::UntilStopped => "Until Stopped".to_string(),
        }
    }
}

impl Default for AlarmPolicy {
    fn default() -> Self {
        AlarmPolicy::Times(10)
    }
}

/// Option value form: the repeat count, or "infinite".
impl fmt::Display for AlarmPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmPolicy::Times(n) => write!(f, "{}", n),
            AlarmPolicy::UntilStopped => f.write_str(UNBOUNDED_VALUE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyParseError {
    Empty,
    Invalid(String),
}

impl fmt::Display for PolicyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyParseError::Empty => write!(f, "Alarm repeat cannot be empty"),
            PolicyParseError::Invalid(value) => write!(
                f,
                "Invalid alarm repeat '{}'. Use a count or '{}'",
                value, UNBOUNDED_VALUE
            ),
        }
    }
}

impl std::error::Error for PolicyParseError {}

impl FromStr for AlarmPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PolicyParseError::Empty);
        }
        if trimmed.eq_ignore_ascii_case(UNBOUNDED_VALUE) {
            return Ok(AlarmPolicy::UntilStopped);
        }
        trimmed
            .parse::<u32>()
            .map(AlarmPolicy::Times)
            .map_err(|_| PolicyParseError::Invalid(trimmed.to_string()))
    }
}

impl TryFrom<String> for AlarmPolicy {
    type Error = PolicyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AlarmPolicy> for String {
    fn from(policy: AlarmPolicy) -> Self {
        policy.to_string()
    }
}

/// One entry of the alarm repeat menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmOption {
    pub value: AlarmPolicy,
    pub label: String,
}

/// Parse the alarm menu from its JSON form.
pub fn load_alarm_options(json: &str) -> Result<Vec<AlarmOption>, serde_json::Error> {
    serde_json::from_str(json)
}

fn fallback_alarm_options() -> Vec<AlarmOption> {
    [AlarmPolicy::Times(10), AlarmPolicy::Times(20), AlarmPolicy::UntilStopped]
        .into_iter()
        .map(|value| AlarmOption {
            label: value.label(),
            value,
        })
        .collect()
}

/// Alarm menu shipped with the app, parsed once.
pub static ALARM_OPTIONS: Lazy<Vec<AlarmOption>> = Lazy::new(|| {
    match load_alarm_options(ALARM_OPTIONS_JSON) {
        Ok(options) if !options.is_empty() => options,
        Ok(_) => {
            warn!("Alarm options list is empty, using built-in options");
            fallback_alarm_options()
        }
        Err(e) => {
            warn!("Failed to parse alarm options: {}, using built-in options", e);
            fallback_alarm_options()
        }
    }
});

/// Drives the chime chain that follows expiry.
pub struct AlarmScheduler<C: Chime> {
    chime: C,
    slot: Slot,
    policy: AlarmPolicy,
    fired: u32,
}

impl<C: Chime> AlarmScheduler<C> {
    pub fn new(chime: C) -> Self {
        Self {
            chime,
            slot: Slot::new(LoopKind::Alarm),
            policy: AlarmPolicy::default(),
            fired: 0,
        }
    }

    /// Begin (or restart) the chime chain for `policy`.
    pub fn start(&mut self, policy: AlarmPolicy) -> Wakes {
        let mut out = Wakes::new();
        if self.slot.is_live() {
            debug!("Alarm restarted while {} chimes in", self.fired);
        }
        self.slot.cancel(&mut out);
        self.policy = policy;
        self.fired = 0;

        if self.exhausted() {
            debug!("Alarm policy {} rings nothing", policy);
            return out;
        }

        info!("Alarm started ({})", policy.label());
        self.ring();
        if !self.exhausted() {
            self.slot.arm(CHIME_INTERVAL_MS, &mut out);
        }
        out
    }

    /// Let the chime backend grab its output devices ahead of expiry.
    pub fn prepare(&mut self) {
        self.chime.prepare();
    }

    /// Cancel any pending chime. Safe when idle.
    pub fn stop(&mut self) -> Wakes {
        let mut out = Wakes::new();
        if self.slot.is_live() {
            info!("Alarm stopped after {} chimes", self.fired);
        }
        self.slot.cancel(&mut out);
        out
    }

    /// Handle one alarm loop firing.
    pub fn fire(&mut self, ticket: Ticket) -> Wakes {
        let mut out = Wakes::new();
        if !self.slot.accepts(ticket) {
            debug!("Ignoring stale alarm ticket {:?}", ticket);
            return out;
        }

        self.ring();
        if self.exhausted() {
            info!("Alarm finished after {} chimes", self.fired);
            self.slot.cancel(&mut out);
        }
        out
    }

    pub fn is_ringing(&self) -> bool {
        self.slot.is_live()
    }

    pub fn chimes_fired(&self) -> u32 {
        self.fired
    }

    pub fn policy(&self) -> AlarmPolicy {
        self.policy
    }

    pub fn chime(&self) -> &C {
        &self.chime
    }

    fn exhausted(&self) -> bool {
        self.policy.bound().is_some_and(|bound| self.fired >= bound)
    }

    fn ring(&mut self) {
        self.fired += 1;
        debug!("Chime {}", self.fired);
        if let Err(e) = self.chime.tone() {
            warn!("Chime {}: {}", self.fired, e);
        }
        if let Err(e) = self.chime.pulse() {
            warn!("Chime {}: {}", self.fired, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chime::ChimeError;
    use crate::schedule::Wake;

    #[derive(Default)]
    struct CountingChime {
        tones: u32,
        pulses: u32,
        fail_tone: bool,
        fail_pulse: bool,
    }

    impl Chime for CountingChime {
        fn tone(&mut self) -> Result<(), ChimeError> {
            self.tones += 1;
            if self.fail_tone {
                return Err(ChimeError::AudioUnavailable("test".to_string()));
            }
            Ok(())
        }

        fn pulse(&mut self) -> Result<(), ChimeError> {
            self.pulses += 1;
            if self.fail_pulse {
                return Err(ChimeError::HapticsUnavailable);
            }
            Ok(())
        }
    }

    fn armed_ticket(wakes: &Wakes) -> Ticket {
        wakes
            .iter()
            .find_map(|w| match w {
                Wake::Arm { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .expect("alarm loop armed")
    }

    #[test]
    fn bounded_policy_rings_exactly_n_times() {
        let mut alarm = AlarmScheduler::new(CountingChime::default());
        let wakes = alarm.start(AlarmPolicy::Times(3));
        let ticket = armed_ticket(&wakes);
        assert_eq!(alarm.chimes_fired(), 1);

        assert!(alarm.fire(ticket).is_empty());
        let last = alarm.fire(ticket);
        assert_eq!(last, vec![Wake::Cancel(LoopKind::Alarm)]);
        assert_eq!(alarm.chimes_fired(), 3);
        assert!(!alarm.is_ringing());

        // A late firing of the finished chain rings nothing.
        assert!(alarm.fire(ticket).is_empty());
        assert_eq!(alarm.chime().tones, 3);
        assert_eq!(alarm.chime().pulses, 3);
    }

    #[test]
    fn single_chime_never_arms_the_loop() {
        let mut alarm = AlarmScheduler::new(CountingChime::default());
        let wakes = alarm.start(AlarmPolicy::Times(1));
        assert!(wakes.is_empty());
        assert_eq!(alarm.chimes_fired(), 1);
        assert!(!alarm.is_ringing());
    }

    #[test]
    fn zero_bound_rings_nothing() {
        let mut alarm = AlarmScheduler::new(CountingChime::default());
        assert!(alarm.start(AlarmPolicy::Times(0)).is_empty());
        assert_eq!(alarm.chime().tones, 0);
    }

    #[test]
    fn unbounded_policy_rings_until_stopped() {
        let mut alarm = AlarmScheduler::new(CountingChime::default());
        let ticket = armed_ticket(&alarm.start(AlarmPolicy::UntilStopped));
        for _ in 0..50 {
            assert!(alarm.fire(ticket).is_empty());
        }
        assert_eq!(alarm.chimes_fired(), 51);

        assert_eq!(alarm.stop(), vec![Wake::Cancel(LoopKind::Alarm)]);
        assert!(alarm.fire(ticket).is_empty());
        assert_eq!(alarm.chimes_fired(), 51);
    }

    #[test]
    fn stop_when_idle_is_harmless() {
        let mut alarm = AlarmScheduler::new(CountingChime::default());
        assert!(alarm.stop().is_empty());
        assert!(alarm.stop().is_empty());
    }

    #[test]
    fn restart_cancels_previous_chain() {
        let mut alarm = AlarmScheduler::new(CountingChime::default());
        let old = armed_ticket(&alarm.start(AlarmPolicy::UntilStopped));
        alarm.fire(old);

        let wakes = alarm.start(AlarmPolicy::Times(2));
        assert_eq!(wakes[0], Wake::Cancel(LoopKind::Alarm));
        let new = armed_ticket(&wakes);
        assert_ne!(old, new);
        assert_eq!(alarm.chimes_fired(), 1);

        assert!(alarm.fire(old).is_empty());
        assert_eq!(alarm.chimes_fired(), 1);
        alarm.fire(new);
        assert_eq!(alarm.chimes_fired(), 2);
        assert!(!alarm.is_ringing());
    }

    #[test]
    fn failing_channels_do_not_break_the_schedule() {
        let chime = CountingChime {
            fail_tone: true,
            fail_pulse: true,
            ..Default::default()
        };
        let mut alarm = AlarmScheduler::new(chime);
        let ticket = armed_ticket(&alarm.start(AlarmPolicy::Times(3)));
        alarm.fire(ticket);
        alarm.fire(ticket);

        assert_eq!(alarm.chimes_fired(), 3);
        // Pulse still attempted after each failed tone.
        assert_eq!(alarm.chime().pulses, 3);
    }

    #[test]
    fn policy_parses_option_values() {
        assert_eq!("10".parse::<AlarmPolicy>(), Ok(AlarmPolicy::Times(10)));
        assert_eq!(" 5 ".parse::<AlarmPolicy>(), Ok(AlarmPolicy::Times(5)));
        assert_eq!("infinite".parse::<AlarmPolicy>(), Ok(AlarmPolicy::UntilStopped));
        assert_eq!("".parse::<AlarmPolicy>(), Err(PolicyParseError::Empty));
        assert!(matches!(
            "forever".parse::<AlarmPolicy>(),
            Err(PolicyParseError::Invalid(_))
        ));
        assert_eq!(AlarmPolicy::UntilStopped.to_string(), "infinite");
        assert_eq!(AlarmPolicy::Times(20).label(), "20 times");
    }

    #[test]
    fn bundled_alarm_options_load() {
        let options = load_alarm_options(ALARM_OPTIONS_JSON).expect("valid json");
        assert_eq!(options, *ALARM_OPTIONS);
        assert!(options.iter().any(|o| o.value == AlarmPolicy::UntilStopped));
        assert!(options
            .iter()
            .any(|o| o.value.to_string() == crate::config::DEFAULT_ALARM_OPTION));
    }

    #[test]
    fn invalid_alarm_option_is_rejected() {
        let json = r#"[{ "value": "sometimes", "label": "Sometimes" }]"#;
        assert!(load_alarm_options(json).is_err());
    }
}
