//! Window - Viewport, scroll and resize events for the page environment
//!
//! Viewport size and scroll offset are signals. Resize listeners are global
//! and registered with `on_window_resize`, which returns a cleanup.
//!
//! ```ignore
//! let remove = window::on_window_resize(|| println!("resized"));
//! window::dispatch_window_resize(1280.0, 720.0);
//! remove();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::types::{Cleanup, Rect};

/// Viewport size before the host reports one.
pub const DEFAULT_VIEWPORT: (f64, f64) = (1024.0, 768.0);

type ResizeHandler = Rc<dyn Fn()>;

thread_local! {
    static VIEWPORT_WIDTH: Signal<f64> = signal(DEFAULT_VIEWPORT.0);
    static VIEWPORT_HEIGHT: Signal<f64> = signal(DEFAULT_VIEWPORT.1);
    static SCROLL_X: Signal<f64> = signal(0.0);
    static SCROLL_Y: Signal<f64> = signal(0.0);

    static LISTENERS: RefCell<Vec<(usize, ResizeHandler)>> = RefCell::new(Vec::new());
    static NEXT_LISTENER_ID: RefCell<usize> = const { RefCell::new(0) };
}

// =============================================================================
// VIEWPORT
// =============================================================================

pub fn viewport_width() -> f64 {
    VIEWPORT_WIDTH.with(|s| s.get())
}

pub fn viewport_height() -> f64 {
    VIEWPORT_HEIGHT.with(|s| s.get())
}

/// Scroll offset of the page `(x, y)`.
pub fn scroll() -> (f64, f64) {
    (SCROLL_X.with(|s| s.get()), SCROLL_Y.with(|s| s.get()))
}

pub fn scroll_to(x: f64, y: f64) {
    SCROLL_X.with(|s| s.set(x));
    SCROLL_Y.with(|s| s.set(y));
}

/// Visible part of the page, in page coordinates.
pub fn visible_rect() -> Rect {
    let (x, y) = scroll();
    Rect::new(x, y, viewport_width(), viewport_height())
}

// =============================================================================
// RESIZE EVENTS
// =============================================================================

/// Listen for window resizes. Returns cleanup to stop listening.
pub fn on_window_resize<F>(handler: F) -> Cleanup
where
    F: Fn() + 'static,
{
    let id = NEXT_LISTENER_ID.with(|next| {
        let mut next = next.borrow_mut();
        let id = *next;
        *next += 1;
        id
    });
    LISTENERS.with(|listeners| listeners.borrow_mut().push((id, Rc::new(handler))));

    Box::new(move || {
        LISTENERS.with(|listeners| {
            listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
        });
    })
}

/// Resize the viewport and notify every listener.
pub fn dispatch_window_resize(width: f64, height: f64) {
    VIEWPORT_WIDTH.with(|s| s.set(width));
    VIEWPORT_HEIGHT.with(|s| s.set(height));

    let handlers: Vec<ResizeHandler> =
        LISTENERS.with(|listeners| listeners.borrow().iter().map(|(_, h)| h.clone()).collect());
    for handler in handlers {
        handler();
    }
}

/// Number of registered resize listeners.
pub fn listener_count() -> usize {
    LISTENERS.with(|listeners| listeners.borrow().len())
}

/// Restore default viewport, scroll and listeners (for testing).
pub fn reset_window_state() {
    VIEWPORT_WIDTH.with(|s| s.set(DEFAULT_VIEWPORT.0));
    VIEWPORT_HEIGHT.with(|s| s.set(DEFAULT_VIEWPORT.1));
    scroll_to(0.0, 0.0);
    let old = LISTENERS.with(|listeners| std::mem::take(&mut *listeners.borrow_mut()));
    drop(old);
}

// =============================================================================
// TESTS
// =============================================================================
