// SPDX-License-Identifier: MPL-2.0
//! Frame index state machine.
//!
//! The controller validates index transitions and serializes them: a
//! transition is *requested*, which reserves it as in flight, and only
//! becomes the current index once the host reports it *complete* (the frame
//! was found in the cache or decoded). While a transition is in flight every
//! other request is rejected, so frames can never be displayed out of order.

use super::input::Direction;
use std::fmt;
use std::time::{Duration, Instant};

/// Which gesture produced a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationSource {
    /// Mouse wheel; subject to throttling.
    Wheel,
    /// Vertical pointer drag.
    Drag,
    /// Keyboard.
    Key,
    /// Direct index selection (thumbnail, host call).
    Select,
}

/// Why a navigation request was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The manifest has at most one frame.
    SingleFrame,
    /// A wheel step arrived inside the throttle interval.
    Throttled,
    /// Another transition has not resolved yet.
    InFlight,
    /// The requested index does not exist.
    OutOfRange,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::SingleFrame => write!(f, "nothing to navigate"),
            Rejection::Throttled => write!(f, "wheel step throttled"),
            Rejection::InFlight => write!(f, "transition in flight"),
            Rejection::OutOfRange => write!(f, "index out of range"),
        }
    }
}

/// Owns the current frame index of one viewer session.
#[derive(Debug, Clone)]
pub struct NavigationController {
    current: usize,
    total: usize,
    throttle: Duration,
    last_accepted: Option<Instant>,
    in_flight: Option<usize>,
}

impl NavigationController {
    /// Creates a controller positioned on the first frame.
    #[must_use]
    pub fn new(total: usize, throttle: Duration) -> Self {
        Self {
            current: 0,
            total,
            throttle,
            last_accepted: None,
            in_flight: None,
        }
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Index of the transition awaiting completion, if any.
    #[must_use]
    pub fn in_flight(&self) -> Option<usize> {
        self.in_flight
    }

    /// Index one step away from the current one, wrapping at both ends.
    #[must_use]
    pub fn neighbor(&self, direction: Direction) -> usize {
        if self.total == 0 {
            return 0;
        }
        match direction {
            Direction::Forward => (self.current + 1) % self.total,
            Direction::Backward => (self.current + self.total - 1) % self.total,
        }
    }

    /// Requests a one-frame step.
    ///
    /// On success the target index is reserved as in flight and returned.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when the step is not allowed right now.
    pub fn request_step(
        &mut self,
        direction: Direction,
        source: NavigationSource,
        now: Instant,
    ) -> Result<usize, Rejection> {
        self.check_open()?;
        if source == NavigationSource::Wheel && self.is_throttled(now) {
            return Err(Rejection::Throttled);
        }
        let target = self.neighbor(direction);
        Ok(self.accept(target, now))
    }

    /// Requests a jump to `index`.
    ///
    /// Selecting the current index is accepted and repaints it.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] for out-of-range indices or when the
    /// controller is busy or has nothing to navigate.
    pub fn request_index(&mut self, index: usize, now: Instant) -> Result<usize, Rejection> {
        self.check_open()?;
        if index >= self.total {
            return Err(Rejection::OutOfRange);
        }
        Ok(self.accept(index, now))
    }

    /// Commits the in-flight transition to `index`.
    ///
    /// Returns `false` if `index` is not the transition in flight, in which
    /// case nothing changes.
    pub fn complete(&mut self, index: usize) -> bool {
        if self.in_flight != Some(index) {
            return false;
        }
        self.current = index;
        self.in_flight = None;
        true
    }

    /// Drops the in-flight transition without moving.
    pub fn abandon(&mut self) {
        self.in_flight = None;
    }

    fn check_open(&self) -> Result<(), Rejection> {
        if self.total <= 1 {
            return Err(Rejection::SingleFrame);
        }
        if self.in_flight.is_some() {
            return Err(Rejection::InFlight);
        }
        Ok(())
    }

    fn is_throttled(&self, now: Instant) -> bool {
        self.last_accepted
            .is_some_and(|last| now.saturating_duration_since(last) < self.throttle)
    }

    fn accept(&mut self, target: usize, now: Instant) -> usize {
        self.last_accepted = Some(now);
        self.in_flight = Some(target);
        target
    }
}
