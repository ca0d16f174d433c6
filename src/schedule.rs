//! Loop scheduling seam between the timer core and whatever owns real timers.
//!
//! The core never holds a browser timer. It emits [`Wake`] requests and the
//! driver (the `use_timer` hook in the app, a virtual clock in tests) turns
//! them into repeating timers. Every firing is handed back with the
//! [`Ticket`] it was armed with, and a [`Slot`] decides whether that ticket is
//! still the authoritative instance for its loop.

/// The independent repeating loops the timer can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopKind {
    /// Per-second decrement while active.
    Countdown,
    /// Per-second elapsed recomputation while expired.
    SinceExpiry,
    /// Chime repeats after expiry.
    Alarm,
}

/// Identity of one armed loop instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub kind: LoopKind,
    pub epoch: u64,
}

/// A scheduling request for the driver.
///
/// `Arm` means: fire `ticket` every `period_ms`, first firing one period from
/// now, until a `Cancel` for the same kind or another `Arm` of that kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Arm { ticket: Ticket, period_ms: u32 },
    Cancel(LoopKind),
}

/// Wake requests produced by one core operation, in application order.
pub type Wakes = Vec<Wake>;

/// Authority over a single loop kind.
///
/// Holds the epoch of the live instance, if any. Arming bumps the epoch, so
/// every ticket handed out earlier turns stale.
#[derive(Debug, Clone)]
pub struct Slot {
    kind: LoopKind,
    epoch: u64,
    live: bool,
}

impl Slot {
    pub fn new(kind: LoopKind) -> Self {
        Self {
            kind,
            epoch: 0,
            live: false,
        }
    }

    pub fn kind(&self) -> LoopKind {
        self.kind
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Arm a fresh instance, cancelling the previous one first.
    pub fn arm(&mut self, period_ms: u32, out: &mut Wakes) -> Ticket {
        self.cancel(out);
        self.epoch += 1;
        self.live = true;
        let ticket = Ticket {
            kind: self.kind,
            epoch: self.epoch,
        };
        out.push(Wake::Arm { ticket, period_ms });
        ticket
    }

    /// Cancel the live instance. Emits nothing when idle.
    pub fn cancel(&mut self, out: &mut Wakes) {
        if self.live {
            self.live = false;
            out.push(Wake::Cancel(self.kind));
        }
    }

    /// Whether `ticket` belongs to the live instance of this slot.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.live && ticket.kind == self.kind && ticket.epoch == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_emits_cancel_before_rearm() {
        let mut slot = Slot::new(LoopKind::Countdown);
        let mut out = Wakes::new();
        let first = slot.arm(1_000, &mut out);
        let second = slot.arm(1_000, &mut out);

        assert_eq!(
            out,
            vec![
                Wake::Arm { ticket: first, period_ms: 1_000 },
                Wake::Cancel(LoopKind::Countdown),
                Wake::Arm { ticket: second, period_ms: 1_000 },
            ]
        );
        assert!(!slot.accepts(first));
        assert!(slot.accepts(second));
    }

    #[test]
    fn cancelled_slot_rejects_everything() {
        let mut slot = Slot::new(LoopKind::Alarm);
        let mut out = Wakes::new();
        let ticket = slot.arm(2_000, &mut out);
        slot.cancel(&mut out);
        slot.cancel(&mut out);

        assert_eq!(out.len(), 2);
        assert!(!slot.is_live());
        assert!(!slot.accepts(ticket));
    }

    #[test]
    fn ticket_of_another_kind_is_rejected() {
        let mut countdown = Slot::new(LoopKind::Countdown);
        let mut alarm = Slot::new(LoopKind::Alarm);
        let mut out = Wakes::new();
        countdown.arm(1_000, &mut out);
        let alarm_ticket = alarm.arm(2_000, &mut out);

        assert!(!countdown.accepts(alarm_ticket));
    }
}
