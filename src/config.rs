//! Application-level configuration constants.

// Loop cadence
pub const TICK_MS: u32 = 1_000;
pub const CHIME_INTERVAL_MS: u32 = 2_000;

// Alarm tone
pub const TONE_FREQUENCY_HZ: f32 = 800.0;
pub const TONE_GAIN: f32 = 0.3;
pub const TONE_DURATION_SEC: f64 = 0.5;
pub const VIBRATION_PATTERN_MS: [u32; 3] = [200, 100, 200];

// Alarm menu
pub const ALARM_OPTIONS_JSON: &str = include_str!("alarm_options.json");
pub const DEFAULT_ALARM_OPTION: &str = "10";

// Wheel picker
pub const HOURS_WHEEL_LEN: u32 = 24;
pub const MINUTES_WHEEL_LEN: u32 = 60;
pub const SECONDS_WHEEL_LEN: u32 = 60;
pub const PICKER_ITEM_HEIGHT_PX: i32 = 40;
pub const PICKER_PADDING_ITEMS: i32 = 5;

// Logging
pub const LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
