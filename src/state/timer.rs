//! Timer Queue - Deferred continuations on a virtual clock
//!
//! Single-threaded `setTimeout` / `clearTimeout` for the page environment.
//! Time only moves when the host event loop (or a test) advances it, so every
//! deferred callback runs on the same thread that scheduled it.
//!
//! # Example
//!
//! ```ignore
//! use spark_align::state::timer;
//!
//! let id = timer::set_timeout(100, || println!("fired"));
//! timer::advance_timers_by_time(50);  // nothing yet
//! timer::clear_timeout(id);           // never fires
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;

use tracing::warn;

/// Upper bound on callbacks executed by [`run_all_timers`].
pub const MAX_TIMER_RUNS: usize = 100_000;

/// Handle returned by [`set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

type TimerCallback = Box<dyn FnOnce()>;

struct TimerQueue {
    now: u64,
    next_id: u64,
    /// Ordered by due time, then by scheduling order.
    entries: BTreeMap<(u64, TimerId), TimerCallback>,
    /// Due time of every live timer, for cancellation.
    due: BTreeMap<TimerId, u64>,
}

impl TimerQueue {
    fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            entries: BTreeMap::new(),
            due: BTreeMap::new(),
        }
    }

    /// Remove the earliest timer due at or before `deadline`.
    fn pop_due(&mut self, deadline: u64) -> Option<(u64, TimerCallback)> {
        let key = *self.entries.keys().next()?;
        if key.0 > deadline {
            return None;
        }
        let callback = self.entries.remove(&key)?;
        self.due.remove(&key.1);
        Some((key.0, callback))
    }
}

thread_local! {
    static TIMERS: RefCell<TimerQueue> = RefCell::new(TimerQueue::new());
}

// =============================================================================
// SCHEDULING
// =============================================================================

/// Run `callback` once, `delay_ms` after the current virtual time.
///
/// A zero delay still defers the callback until the clock is pumped; it never
/// runs re-entrantly from inside `set_timeout`.
pub fn set_timeout<F>(delay_ms: u64, callback: F) -> TimerId
where
    F: FnOnce() + 'static,
{
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        let id = TimerId(timers.next_id);
        timers.next_id += 1;
        let at = timers.now.saturating_add(delay_ms);
        timers.entries.insert((at, id), Box::new(callback));
        timers.due.insert(id, at);
        id
    })
}

/// Cancel a pending timer. Unknown or already-fired ids are ignored.
pub fn clear_timeout(id: TimerId) {
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        if let Some(at) = timers.due.remove(&id) {
            timers.entries.remove(&(at, id));
        }
    });
}

/// Whether a timer is still waiting to fire.
pub fn is_pending(id: TimerId) -> bool {
    TIMERS.with(|timers| timers.borrow().due.contains_key(&id))
}

/// Current virtual time in milliseconds.
pub fn now() -> u64 {
    TIMERS.with(|timers| timers.borrow().now)
}

/// Number of timers waiting to fire.
pub fn pending_timer_count() -> usize {
    TIMERS.with(|timers| timers.borrow().due.len())
}

// =============================================================================
// PUMPING
// =============================================================================

/// Run the earliest timer due at or before `deadline`, moving the clock to
/// its due time. The queue borrow is released before the callback runs, so
/// callbacks may schedule or cancel timers.
fn run_next(deadline: u64) -> bool {
    let next = TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        let next = timers.pop_due(deadline);
        if let Some((at, _)) = &next {
            timers.now = timers.now.max(*at);
        }
        next
    });

    match next {
        Some((_, callback)) => {
            callback();
            true
        }
        None => false,
    }
}

/// Move the clock forward by `ms`, firing every timer that comes due,
/// including timers scheduled by callbacks within the window.
///
/// Returns the number of callbacks run.
pub fn advance_timers_by_time(ms: u64) -> usize {
    let deadline = now().saturating_add(ms);
    let mut ran = 0;
    while run_next(deadline) {
        ran += 1;
    }
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        timers.now = timers.now.max(deadline);
    });
    ran
}

/// Fire only the timers pending right now, not ones they schedule.
pub fn run_only_pending_timers() -> usize {
    let snapshot: Vec<TimerId> =
        TIMERS.with(|timers| timers.borrow().entries.keys().map(|(_, id)| *id).collect());
    let mut ran = 0;
    for id in snapshot {
        let entry = TIMERS.with(|timers| {
            let mut timers = timers.borrow_mut();
            let at = timers.due.remove(&id)?;
            let callback = timers.entries.remove(&(at, id))?;
            timers.now = timers.now.max(at);
            Some(callback)
        });
        if let Some(callback) = entry {
            callback();
            ran += 1;
        }
    }
    ran
}

/// Drain the queue until no timers remain.
///
/// Stops after [`MAX_TIMER_RUNS`] callbacks and logs a warning, since a
/// callback that always reschedules itself would otherwise never finish.
pub fn run_all_timers() -> usize {
    let mut ran = 0;
    while run_next(u64::MAX) {
        ran += 1;
        if ran >= MAX_TIMER_RUNS {
            warn!(ran, "timer queue did not drain, assuming an infinite loop");
            break;
        }
    }
    ran
}

/// Drop all timers and rewind the clock (for testing).
pub fn reset_timers() {
    // Callbacks are dropped outside the borrow; their captures may touch timers.
    let old = TIMERS.with(|timers| std::mem::replace(&mut *timers.borrow_mut(), TimerQueue::new()));
    drop(old);
}

// =============================================================================
// TESTS
// =============================================================================
