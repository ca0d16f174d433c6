//! Main module for the wheel timer app using Yew.
//! Wires the setup wheel, the alarm menu and the timer screens to the
//! `use_timer` hook.

use wheel_timer::config::{DEFAULT_ALARM_OPTION, LOG_LEVEL};
use wheel_timer::utils::{format_selection, total_seconds};
use wheel_timer::{logging, AlarmPolicy, TimerState, ALARM_OPTIONS};
use yew::prelude::*;

mod components;
mod hooks;

use components::{AlarmMenu, CompletedScreen, RunningScreen, TimePicker, WheelValue};
use hooks::use_timer;

fn default_policy() -> AlarmPolicy {
    DEFAULT_ALARM_OPTION.parse().unwrap_or_default()
}

/// Primary application component switching between the timer screens.
#[function_component(Main)]
fn main_component() -> Html {
    let timer = use_timer();
    let wheel = use_state(WheelValue::default);
    let policy = use_state(default_policy);

    let total = total_seconds(wheel.hours, wheel.minutes, wheel.seconds);
    let can_start = total > 0;

    match timer.snapshot.state {
        TimerState::Setup => {
            let on_wheel_change = {
                let wheel = wheel.clone();
                Callback::from(move |value: WheelValue| wheel.set(value))
            };
            let on_policy_select = {
                let policy = policy.clone();
                Callback::from(move |value: AlarmPolicy| policy.set(value))
            };
            let on_start = {
                let start = timer.start.clone();
                let policy = *policy;
                Callback::from(move |_: MouseEvent| {
                    if can_start {
                        start.emit((total, policy));
                    }
                })
            };

            html! {
                <div class="timer-app setup">
                    <div class="selection-summary">{ format_selection(total) }</div>
                    <TimePicker value={*wheel} on_change={on_wheel_change} />
                    <button
                        class={if can_start { "timer-button timer-button-green" } else { "timer-button timer-button-disabled" }}
                        disabled={!can_start}
                        onclick={on_start}
                    >
                        { "Start" }
                    </button>
                    <AlarmMenu
                        options={ALARM_OPTIONS.clone()}
                        selected={*policy}
                        on_select={on_policy_select}
                    />
                </div>
            }
        }
        TimerState::Active | TimerState::Paused => html! {
            <RunningScreen
                snapshot={timer.snapshot.clone()}
                on_pause={timer.pause.clone()}
                on_resume={timer.resume.clone()}
                on_stop={timer.stop.clone()}
            />
        },
        TimerState::Expired => html! {
            <CompletedScreen snapshot={timer.snapshot.clone()} on_reset={timer.reset.clone()} />
        },
    }
}

/// Entry point: installs logging and the panic hook, then renders.
fn main() {
    console_error_panic_hook::set_once();
    logging::init(LOG_LEVEL);
    yew::Renderer::<Main>::new().render();
}
