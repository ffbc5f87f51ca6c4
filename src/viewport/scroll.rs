// chat_viewport - List virtualization engine for chat transcripts
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Scroll event throttling, direction and idle tracking.
//!
//! [`ScrollController`] is a clock-free state machine: every entry point takes
//! the current [`Instant`] from the caller. That keeps it deterministic under
//! test and lets the async driver own the actual timers.
//!
//! Throttling never drops the last event of a burst. An event arriving inside
//! the throttle window is parked as the pending tick and replaces any earlier
//! pending one; [`ScrollController::poll`] runs it once the window closes.

use serde::Serialize;
use std::time::{Duration, Instant};

/// Minimum spacing between two range recomputations (one frame).
pub const THROTTLE_INTERVAL: Duration = Duration::from_millis(16);

/// Quiet period after the last scroll event before `is_scrolling` clears.
pub const IDLE_TIMEOUT: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollPhase {
    #[default]
    Idle,
    Scrolling,
}

/// A raw scroll notification from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub scroll_top: f64,
}

impl From<f64> for ScrollEvent {
    fn from(scroll_top: f64) -> Self {
        Self { scroll_top }
    }
}

/// What the caller should do after feeding an event in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleDecision {
    /// Recompute now with this scroll offset.
    Run(f64),
    /// Inside the throttle window; call [`ScrollController::poll`] at `due_at`.
    Deferred { due_at: Instant },
}

/// Outcome of [`ScrollController::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PollOutcome {
    /// Pending scroll offset whose throttle window has closed.
    pub tick: Option<f64>,
    /// `true` if this poll moved the controller from scrolling to idle.
    pub became_idle: bool,
}

#[derive(Debug, Clone)]
pub struct ScrollController {
    throttle: Duration,
    idle_timeout: Duration,
    previous_scroll_top: f64,
    direction: Option<ScrollDirection>,
    phase: ScrollPhase,
    last_tick: Option<Instant>,
    /// Latest scroll offset still waiting for its throttle window.
    pending: Option<f64>,
    idle_deadline: Option<Instant>,
}

impl ScrollController {
    #[must_use]
    pub fn new(throttle: Duration, idle_timeout: Duration) -> Self {
        Self {
            throttle,
            idle_timeout,
            previous_scroll_top: 0.0,
            direction: None,
            phase: ScrollPhase::Idle,
            last_tick: None,
            pending: None,
            idle_deadline: None,
        }
    }

    /// Record a raw scroll event.
    ///
    /// Direction and the scrolling flag are updated on every call; only the
    /// range recomputation is throttled.
    pub fn on_event(&mut self, event: ScrollEvent, now: Instant) -> ThrottleDecision {
        let scroll_top = event.scroll_top;
        self.direction = Some(if scroll_top > self.previous_scroll_top {
            ScrollDirection::Down
        } else {
            ScrollDirection::Up
        });
        self.previous_scroll_top = scroll_top;

        self.phase = ScrollPhase::Scrolling;
        self.idle_deadline = Some(now + self.idle_timeout);

        match self.last_tick {
            Some(last) if now.saturating_duration_since(last) < self.throttle => {
                self.pending = Some(scroll_top);
                let due_at = last + self.throttle;
                tracing::trace!(scroll_top, ?due_at, "scroll tick deferred");
                ThrottleDecision::Deferred { due_at }
            }
            _ => {
                self.last_tick = Some(now);
                self.pending = None;
                ThrottleDecision::Run(scroll_top)
            }
        }
    }

    /// Fire whichever timers are due at `now`.
    pub fn poll(&mut self, now: Instant) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        if self.pending.is_some() && self.throttle_due().is_some_and(|due| due <= now) {
            self.last_tick = Some(now);
            outcome.tick = self.pending.take();
        }

        if self.phase == ScrollPhase::Scrolling
            && self.idle_deadline.is_some_and(|deadline| deadline <= now)
        {
            self.phase = ScrollPhase::Idle;
            self.idle_deadline = None;
            outcome.became_idle = true;
        }

        outcome
    }

    fn throttle_due(&self) -> Option<Instant> {
        self.pending?;
        self.last_tick.map(|last| last + self.throttle)
    }

    /// When the pending throttled tick should run, if there is one.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.throttle_due()
    }

    /// When `is_scrolling` will clear if no further events arrive.
    #[must_use]
    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle_deadline
    }

    /// Earliest instant at which [`Self::poll`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.throttle_due(), self.idle_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Drop the deferred tick and hand back its offset, if any.
    pub fn take_pending(&mut self) -> Option<f64> {
        self.pending.take()
    }

    /// Drop pending work and timers. Used on teardown.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.idle_deadline = None;
        self.phase = ScrollPhase::Idle;
    }

    /// Align the direction baseline with a programmatic scroll.
    pub fn sync_scroll_top(&mut self, scroll_top: f64) {
        self.previous_scroll_top = scroll_top;
    }

    #[must_use]
    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    #[must_use]
    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.phase == ScrollPhase::Scrolling
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(THROTTLE_INTERVAL, IDLE_TIMEOUT)
    }
}
