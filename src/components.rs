//! Yew view components for the timer screens.
//!
//! The wheel column only maps scroll offsets to values; everything timing
//! related lives in the core.

use web_sys::Element;
use wheel_timer::config::{
    HOURS_WHEEL_LEN, MINUTES_WHEEL_LEN, PICKER_PADDING_ITEMS, SECONDS_WHEEL_LEN,
};
use wheel_timer::utils::{
    format_countdown, format_elapsed_ago, format_original_duration, scroll_offset_for,
    wheel_index_for,
};
use wheel_timer::{AlarmOption, AlarmPolicy, TimerSnapshot, TimerState};
use yew::prelude::*;

fn padding_items() -> Html {
    (0..PICKER_PADDING_ITEMS)
        .map(|_| html! { <div class="picker-item picker-padding"></div> })
        .collect::<Html>()
}

/// One scrollable wheel of the time picker.
#[derive(Properties, PartialEq)]
pub struct WheelColumnProps {
    pub value: u32,
    pub len: u32,
    pub on_change: Callback<u32>,
}

#[function_component(WheelColumn)]
pub fn wheel_column(props: &WheelColumnProps) -> Html {
    let node = use_node_ref();

    // Keep the scroll position in step with the value.
    {
        let node = node.clone();
        use_effect_with(props.value, move |&value| {
            if let Some(el) = node.cast::<Element>() {
                el.set_scroll_top(scroll_offset_for(value));
            }
            || ()
        });
    }

    let onscroll = {
        let node = node.clone();
        let len = props.len;
        let value = props.value;
        let on_change = props.on_change.clone();
        Callback::from(move |_: Event| {
            if let Some(el) = node.cast::<Element>() {
                let index = wheel_index_for(el.scroll_top() as f64, len);
                if index != value {
                    on_change.emit(index);
                }
            }
        })
    };

    html! {
        <div class="picker-column" ref={node} {onscroll}>
            { padding_items() }
            { (0..props.len).map(|v| {
                let class = if v == props.value { "picker-item selected" } else { "picker-item" };
                html! { <div {class} data-value={v.to_string()}>{ v }</div> }
            }).collect::<Html>() }
            { padding_items() }
        </div>
    }
}

/// Hours, minutes and seconds chosen on the wheels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WheelValue {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

#[derive(Properties, PartialEq)]
pub struct TimePickerProps {
    pub value: WheelValue,
    pub on_change: Callback<WheelValue>,
}

#[function_component(TimePicker)]
pub fn time_picker(props: &TimePickerProps) -> Html {
    let value = props.value;
    let on_hours = props.on_change.reform(move |hours| WheelValue { hours, ..value });
    let on_minutes = props.on_change.reform(move |minutes| WheelValue { minutes, ..value });
    let on_seconds = props.on_change.reform(move |seconds| WheelValue { seconds, ..value });

    html! {
        <div class="timer-picker">
            <div class="picker-headers">
                <div>{ "hours" }</div>
                <div>{ "min" }</div>
                <div>{ "sec" }</div>
            </div>
            <div class="picker-container">
                <div class="picker-overlay"></div>
                <WheelColumn value={value.hours} len={HOURS_WHEEL_LEN} on_change={on_hours} />
                <WheelColumn value={value.minutes} len={MINUTES_WHEEL_LEN} on_change={on_minutes} />
                <WheelColumn value={value.seconds} len={SECONDS_WHEEL_LEN} on_change={on_seconds} />
            </div>
        </div>
    }
}

/// Dropdown for the alarm repeat policy.
#[derive(Properties, PartialEq)]
pub struct AlarmMenuProps {
    pub options: Vec<AlarmOption>,
    pub selected: AlarmPolicy,
    pub on_select: Callback<AlarmPolicy>,
}

#[function_component(AlarmMenu)]
pub fn alarm_menu(props: &AlarmMenuProps) -> Html {
    let open = use_state(|| false);

    let selected_label = props
        .options
        .iter()
        .find(|o| o.value == props.selected)
        .map(|o| o.label.clone())
        .unwrap_or_else(|| props.selected.label());

    let toggle = {
        let open = open.clone();
        Callback::from(move |_: MouseEvent| open.set(!*open))
    };

    html! {
        <div class="alarm-container timer-picker">
            <button class="alarm-toggle" aria-expanded={(*open).to_string()} onclick={toggle}>
                <span class="alarm-title">{ "Alarm" }</span>
                <span class="alarm-value">{ selected_label }</span>
                <span class={if *open { "alarm-chevron open" } else { "alarm-chevron" }}></span>
            </button>
            if *open {
                <div class="alarm-dropdown">
                    { props.options.iter().map(|option| {
                        let value = option.value;
                        let open = open.clone();
                        let on_select = props.on_select.clone();
                        let onclick = Callback::from(move |_: MouseEvent| {
                            on_select.emit(value);
                            open.set(false);
                        });
                        html! {
                            <button class="alarm-option" {onclick}>{ option.label.clone() }</button>
                        }
                    }).collect::<Html>() }
                </div>
            }
        </div>
    }
}

/// Countdown display with pause/resume and stop.
#[derive(Properties, PartialEq)]
pub struct RunningScreenProps {
    pub snapshot: TimerSnapshot,
    pub on_pause: Callback<()>,
    pub on_resume: Callback<()>,
    pub on_stop: Callback<()>,
}

#[function_component(RunningScreen)]
pub fn running_screen(props: &RunningScreenProps) -> Html {
    let paused = props.snapshot.state == TimerState::Paused;
    let primary = if paused {
        html! {
            <button class="timer-button timer-button-green" onclick={props.on_resume.reform(|_: MouseEvent| ())}>
                { "Resume" }
            </button>
        }
    } else {
        html! {
            <button class="timer-button timer-button-gray" onclick={props.on_pause.reform(|_: MouseEvent| ())}>
                { "Pause" }
            </button>
        }
    };

    html! {
        <div class="timer-app running">
            <h1 class="screen-title">{ "Timer" }</h1>
            <div class={if paused { "timer-display paused" } else { "timer-display" }}>
                { format_countdown(props.snapshot.remaining_secs) }
            </div>
            <div class="timer-controls">
                { primary }
                <button class="timer-button timer-button-red" onclick={props.on_stop.reform(|_: MouseEvent| ())}>
                    { "Stop" }
                </button>
            </div>
        </div>
    }
}

/// Shown after expiry while the alarm rings.
#[derive(Properties, PartialEq)]
pub struct CompletedScreenProps {
    pub snapshot: TimerSnapshot,
    pub on_reset: Callback<()>,
}

#[function_component(CompletedScreen)]
pub fn completed_screen(props: &CompletedScreenProps) -> Html {
    html! {
        <div class="timer-app completed">
            <h1 class="screen-title">{ "Timer Completed" }</h1>
            <div class="elapsed-time">
                <div>
                    { format!("Your {} timer ended:", format_original_duration(props.snapshot.original_duration_secs)) }
                </div>
                <div class="elapsed-value">
                    { format_elapsed_ago(props.snapshot.elapsed_since_expiry_secs) }
                </div>
            </div>
            <button class="timer-button timer-button-green" onclick={props.on_reset.reform(|_: MouseEvent| ())}>
                { "Reset" }
            </button>
        </div>
    }
}
