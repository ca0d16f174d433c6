//! Countdown timer core: the state machine, the repeating alarm and the
//! capabilities they drive. The Yew front end in `main.rs` renders snapshots
//! and forwards commands.

pub mod alarm;
pub mod chime;
pub mod config;
pub mod logging;
pub mod schedule;
pub mod timer;
pub mod utils;

pub use alarm::{AlarmOption, AlarmPolicy, AlarmScheduler, PolicyParseError, ALARM_OPTIONS};
pub use chime::{Chime, ChimeError, WebChime};
pub use schedule::{LoopKind, Ticket, Wake, Wakes};
pub use timer::{StartError, TimerCore, TimerSnapshot, TimerState};
