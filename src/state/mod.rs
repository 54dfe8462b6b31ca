//! State Module - The page environment
//!
//! Single-threaded stand-ins for what a browser page provides to an
//! alignment engine:
//!
//! - **Document** - elements, boxes, attachment
//! - **Focus** - active element, focus restoration
//! - **Resize** - per-element resize observation
//! - **Window** - viewport, scroll, window resize events
//! - **Timer** - deferred callbacks on a virtual clock

pub mod document;
pub mod focus;
pub mod resize;
pub mod timer;
pub mod window;

/// Reset every environment registry (for testing).
pub fn reset_environment() {
    timer::reset_timers();
    resize::reset_resize_observers();
    window::reset_window_state();
    focus::reset_focus_state();
    document::reset_document();
}
