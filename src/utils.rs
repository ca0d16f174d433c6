use crate::config::{PICKER_ITEM_HEIGHT_PX, PICKER_PADDING_ITEMS};

/// Current wall-clock time in milliseconds.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Combine wheel values into a duration in seconds.
pub fn total_seconds(hours: u32, minutes: u32, seconds: u32) -> u32 {
    hours * 3600 + minutes * 60 + seconds
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

/// Short summary of the wheel selection shown above the picker.
///
/// # Examples
/// ```
/// use wheel_timer::utils::format_selection;
/// assert_eq!(format_selection(0), "0 sec");
/// assert_eq!(format_selection(125), "2 min 5 sec");
/// assert_eq!(format_selection(5400), "1 hr 30 min");
/// ```
pub fn format_selection(total: u32) -> String {
    if total < 60 {
        return format!("{} sec", total);
    }
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{} hr", hours));
    }
    if minutes > 0 {
        parts.push(format!("{} min", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{} sec", seconds));
    }
    parts.join(" ")
}

/// Countdown display, `M:SS` with unbounded minutes.
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// How long ago the timer ended, e.g. "1 hour, 2 minutes and 5 seconds ago".
pub fn format_elapsed_ago(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&plural(hours, "hour"));
        if minutes > 0 || seconds > 0 {
            out.push_str(", ");
        }
    }
    if minutes > 0 {
        out.push_str(&plural(minutes, "minute"));
        if seconds > 0 {
            out.push_str(" and ");
        }
    }
    if seconds > 0 || (hours == 0 && minutes == 0) {
        out.push_str(&plural(seconds, "second"));
    }
    out.push_str(" ago");
    out
}

/// Duration the finished timer was set for. Seconds are dropped once there
/// are whole minutes or hours.
pub fn format_original_duration(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        let mut out = plural(hours, "hour");
        if minutes > 0 {
            out.push(' ');
            out.push_str(&plural(minutes, "minute"));
        }
        out
    } else if minutes > 0 {
        plural(minutes, "minute")
    } else {
        plural(seconds, "second")
    }
}

/// Scroll offset that centres `value` in a wheel column.
pub fn scroll_offset_for(value: u32) -> i32 {
    (value as i32 + PICKER_PADDING_ITEMS) * PICKER_ITEM_HEIGHT_PX
}

/// Wheel value under the centre line for a given scroll offset, clamped to
/// `0..len`.
pub fn wheel_index_for(scroll_top: f64, len: u32) -> u32 {
    if len == 0 {
        return 0;
    }
    let index = (scroll_top / PICKER_ITEM_HEIGHT_PX as f64).round() as i64 - PICKER_PADDING_ITEMS as i64;
    index.clamp(0, len as i64 - 1) as u32
}
