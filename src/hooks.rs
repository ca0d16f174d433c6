use gloo_timers::callback::Interval;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wheel_timer::utils::now_ms;
use wheel_timer::{AlarmPolicy, LoopKind, Ticket, TimerCore, TimerSnapshot, Wake, Wakes, WebChime};
use yew::prelude::*;

/// Owns the timer core and the browser intervals it asks for.
///
/// Interval closures hold a `Weak` back to the driver, so dropping the
/// driver tears everything down. Cancelled closures are parked in `retired`
/// and dropped on the next entry, never from inside their own invocation.
struct Driver {
    core: RefCell<TimerCore<WebChime>>,
    loops: RefCell<HashMap<LoopKind, Interval>>,
    retired: RefCell<Vec<Closure<dyn FnMut()>>>,
    publish: UseStateSetter<TimerSnapshot>,
}

impl Driver {
    fn new(publish: UseStateSetter<TimerSnapshot>) -> Self {
        Self {
            core: RefCell::new(TimerCore::new(WebChime::new())),
            loops: RefCell::new(HashMap::new()),
            retired: RefCell::new(Vec::new()),
            publish,
        }
    }

    fn start(self: &Rc<Self>, duration_secs: u32, policy: AlarmPolicy) {
        self.retired.borrow_mut().clear();
        let result = self.core.borrow_mut().start(duration_secs, policy);
        match result {
            Ok(wakes) => self.apply(wakes),
            Err(e) => debug!("Start ignored: {}", e),
        }
        self.publish();
    }

    /// Run a command that cannot fail.
    fn command(self: &Rc<Self>, op: impl FnOnce(&mut TimerCore<WebChime>) -> Wakes) {
        self.retired.borrow_mut().clear();
        let wakes = op(&mut self.core.borrow_mut());
        self.apply(wakes);
        self.publish();
    }

    fn fire(self: &Rc<Self>, ticket: Ticket) {
        self.retired.borrow_mut().clear();
        let wakes = self.core.borrow_mut().fire(ticket, now_ms());
        self.apply(wakes);
        self.publish();
    }

    fn apply(self: &Rc<Self>, wakes: Wakes) {
        for wake in wakes {
            match wake {
                Wake::Arm { ticket, period_ms } => {
                    let driver: Weak<Self> = Rc::downgrade(self);
                    let interval = Interval::new(period_ms, move || {
                        if let Some(driver) = driver.upgrade() {
                            driver.fire(ticket);
                        }
                    });
                    let replaced = self.loops.borrow_mut().insert(ticket.kind, interval);
                    if let Some(old) = replaced {
                        self.retire(old);
                    }
                }
                Wake::Cancel(kind) => {
                    let removed = self.loops.borrow_mut().remove(&kind);
                    if let Some(old) = removed {
                        self.retire(old);
                    }
                }
            }
        }
    }

    fn retire(&self, interval: Interval) {
        self.retired.borrow_mut().push(interval.cancel());
    }

    fn publish(&self) {
        self.publish.set(self.core.borrow().snapshot());
    }

    fn shutdown(self: &Rc<Self>) {
        let wakes = self.core.borrow_mut().stop();
        self.apply(wakes);
        self.loops.borrow_mut().clear();
        self.retired.borrow_mut().clear();
    }
}

/// Timer snapshot plus the commands the screens can issue.
#[derive(Clone, PartialEq)]
pub struct UseTimerHandle {
    pub snapshot: TimerSnapshot,
    pub start: Callback<(u32, AlarmPolicy)>,
    pub pause: Callback<()>,
    pub resume: Callback<()>,
    pub stop: Callback<()>,
    pub reset: Callback<()>,
}

/// Drive a countdown timer with browser intervals.
#[hook]
pub fn use_timer() -> UseTimerHandle {
    let snapshot = use_state_eq(TimerSnapshot::default);
    let driver = {
        let publish = snapshot.setter();
        use_memo((), move |_| Driver::new(publish))
    };

    // Stop every loop when the component unmounts.
    {
        let driver = driver.clone();
        use_effect_with((), move |_| move || driver.shutdown());
    }

    let start = {
        let driver = driver.clone();
        Callback::from(move |(secs, policy): (u32, AlarmPolicy)| driver.start(secs, policy))
    };
    let pause = {
        let driver = driver.clone();
        Callback::from(move |_: ()| driver.command(|core| core.pause()))
    };
    let resume = {
        let driver = driver.clone();
        Callback::from(move |_: ()| driver.command(|core| core.resume()))
    };
    let stop = {
        let driver = driver.clone();
        Callback::from(move |_: ()| driver.command(|core| core.stop()))
    };
    let reset = {
        let driver = driver.clone();
        Callback::from(move |_: ()| driver.command(|core| core.reset()))
    };

    UseTimerHandle {
        snapshot: (*snapshot).clone(),
        start,
        pause,
        resume,
        stop,
        reset,
    }
}
