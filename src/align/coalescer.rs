//! Trigger Coalescer - Throttled recomputation with force bypass
//!
//! Wraps a recompute callback that returns `true` when it did work and
//! `false` for a no-op. Unforced requests run at most once per cooldown
//! window; requests made during the window collapse into a single follow-up
//! that runs when the window ends.
//!
//! # Timeline (buffer = 100ms)
//!
//! ```text
//! t=0    request()   -> callback runs, cooldown until t=100
//! t=30   request()   -> coalesced, follow-up at t=130
//! t=60   request()   -> follow-up moved to t=160
//! t=160  follow-up   -> callback runs, cooldown until t=260
//! ```
//!
//! A no-op callback never starts a cooldown, so the next request is
//! evaluated fresh.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use tracing::trace;

use crate::state::timer::{self, TimerId};

struct Inner {
    callback: Box<dyn Fn() -> bool>,
    buffer_ms: Cell<u64>,
    /// Inside a cooldown window.
    called: Cell<bool>,
    /// Timer ending the window (and possibly running a follow-up).
    timeout: Cell<Option<TimerId>>,
    /// The pending timer runs a follow-up request.
    follow_up: Cell<bool>,
}

impl Inner {
    fn clear_timer(&self) {
        if let Some(id) = self.timeout.take() {
            timer::clear_timeout(id);
        }
        self.follow_up.set(false);
    }
}

/// Rate limiter for a recompute callback.
///
/// Timers hold a weak reference, so dropping the coalescer silently
/// abandons any pending follow-up.
pub struct TriggerCoalescer {
    inner: Rc<Inner>,
}

impl TriggerCoalescer {
    /// Create a coalescer around `callback` with a cooldown of `buffer_ms`.
    pub fn new<F>(buffer_ms: u64, callback: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Self {
            inner: Rc::new(Inner {
                callback: Box::new(callback),
                buffer_ms: Cell::new(buffer_ms),
                called: Cell::new(false),
                timeout: Cell::new(None),
                follow_up: Cell::new(false),
            }),
        }
    }

    /// Ask for a recomputation.
    ///
    /// Outside a cooldown, or when `force` is set, the callback runs now.
    /// Inside a cooldown the request is deferred to the end of a fresh
    /// window, replacing any earlier deferred request.
    pub fn request(&self, force: bool) {
        request(&self.inner, force);
    }

    /// Leave the cooldown and drop any pending follow-up without running the
    /// callback. Safe to call repeatedly.
    pub fn cancel(&self) {
        self.inner.called.set(false);
        self.inner.clear_timer();
    }

    /// Change the cooldown used from the next window on.
    pub fn set_buffer(&self, buffer_ms: u64) {
        self.inner.buffer_ms.set(buffer_ms);
    }

    pub fn buffer(&self) -> u64 {
        self.inner.buffer_ms.get()
    }

    /// Whether a cooldown window is open.
    pub fn is_cooling_down(&self) -> bool {
        self.inner.called.get()
    }

    /// Whether a coalesced follow-up request is waiting.
    pub fn has_pending(&self) -> bool {
        self.inner.follow_up.get() && self.inner.timeout.get().is_some_and(timer::is_pending)
    }
}

fn request(inner: &Rc<Inner>, force: bool) {
    if !inner.called.get() || force {
        if !(inner.callback)() {
            trace!(force, "recompute was a no-op, no cooldown");
            return;
        }

        inner.called.set(true);
        inner.clear_timer();

        let weak = Rc::downgrade(inner);
        let buffer = inner.buffer_ms.get();
        trace!(buffer, "cooldown started");
        inner.timeout.set(Some(timer::set_timeout(buffer, move || {
            if let Some(inner) = weak.upgrade() {
                inner.timeout.set(None);
                inner.called.set(false);
            }
        })));
    } else {
        inner.clear_timer();

        let weak: Weak<Inner> = Rc::downgrade(inner);
        let buffer = inner.buffer_ms.get();
        trace!(buffer, "request coalesced, follow-up rescheduled");
        inner.follow_up.set(true);
        inner.timeout.set(Some(timer::set_timeout(buffer, move || {
            if let Some(inner) = weak.upgrade() {
                inner.timeout.set(None);
                inner.follow_up.set(false);
                inner.called.set(false);
                request(&inner, false);
            }
        })));
    }
}

// =============================================================================
// TESTS
// =============================================================================
