//! Wall-clock timers for the quiz countdown and its delayed transitions.
//!
//! The driver never touches the controller itself. It mirrors what the
//! controller asks for (one countdown, at most one delayed transition),
//! remembers when each is due, and hands back tagged events for the caller
//! to dispatch.

use crate::domain::{PendingTransition, QuizController, TimerTag};
use std::time::{Duration, Instant};
use tracing::trace;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(TimerTag),
    Delay(TimerTag),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    tag: TimerTag,
    next_tick: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Delay {
    tag: TimerTag,
    due: Instant,
}

#[derive(Debug, Default)]
pub struct TimerDriver {
    countdown: Option<Countdown>,
    delay: Option<Delay>,
}

impl TimerDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the armed timers in line with what the controller expects.
    ///
    /// A countdown or delay carrying a tag the controller no longer reports
    /// is cancelled before a replacement is armed, so at most one of each is
    /// ever live.
    pub fn sync(&mut self, controller: &QuizController, now: Instant) {
        self.sync_countdown(controller.countdown_tag(), now);
        self.sync_delay(controller.pending(), now);
    }

    fn sync_countdown(&mut self, wanted: Option<TimerTag>, now: Instant) {
        let current = self.countdown.map(|c| c.tag);
        if current == wanted {
            return;
        }
        if let Some(old) = current {
            trace!(?old, "countdown cancelled");
        }
        self.countdown = wanted.map(|tag| {
            trace!(?tag, "countdown armed");
            Countdown {
                tag,
                next_tick: now + TICK_INTERVAL,
            }
        });
    }

    fn sync_delay(&mut self, wanted: Option<PendingTransition>, now: Instant) {
        let current = self.delay.map(|d| d.tag);
        if current == wanted.map(|p| p.tag) {
            return;
        }
        if let Some(old) = current {
            trace!(?old, "delay cancelled");
        }
        self.delay = wanted.map(|pending| Delay {
            tag: pending.tag,
            due: now + pending.delay,
        });
    }

    /// Returns every event due at `now`, oldest first.
    ///
    /// A countdown that fell behind yields one tick per elapsed second.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut events = Vec::new();

        if let Some(countdown) = self.countdown.as_mut() {
            while countdown.next_tick <= now {
                events.push((countdown.next_tick, TimerEvent::Tick(countdown.tag)));
                countdown.next_tick += TICK_INTERVAL;
            }
        }

        if let Some(delay) = self.delay {
            if delay.due <= now {
                events.push((delay.due, TimerEvent::Delay(delay.tag)));
                self.delay = None;
            }
        }

        events.sort_by_key(|(at, _)| *at);
        events.into_iter().map(|(_, event)| event).collect()
    }

    /// How long the event loop may block before the next timer is due.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        let next_tick = self.countdown.map(|c| c.next_tick);
        let due = self.delay.map(|d| d.due);
        let next = match (next_tick, due) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }?;
        Some(next.saturating_duration_since(now))
    }

    pub fn cancel_all(&mut self) {
        self.countdown = None;
        self.delay = None;
    }

    pub fn countdown_tag(&self) -> Option<TimerTag> {
        self.countdown.map(|c| c.tag)
    }

    pub fn delay_tag(&self) -> Option<TimerTag> {
        self.delay.map(|d| d.tag)
    }
}
