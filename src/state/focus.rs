//! Focus - Active element tracking for the page environment
//!
//! - `active_element()` - focused element, or the body when nothing is focused
//! - `focus(id)` / `blur()`
//! - `restore_focus(previous, source)` - undo focus stolen during alignment
//!
//! The focused element lives in a signal so reactive code can track it.

use spark_signals::{signal, Signal};
use tracing::trace;

use super::document;
use crate::types::ElementId;

thread_local! {
    static FOCUSED: Signal<Option<ElementId>> = signal(None);
}

/// The focused element, or the body when nothing is focused.
pub fn active_element() -> ElementId {
    FOCUSED.with(|s| s.get()).unwrap_or_else(document::body)
}

/// Whether a specific element has focus.
pub fn is_focused(id: ElementId) -> bool {
    FOCUSED.with(|s| s.get()) == Some(id)
}

/// Focus an element. Only attached elements can take focus; focusing the
/// body clears focus.
pub fn focus(id: ElementId) -> bool {
    if id == document::body() {
        blur();
        return true;
    }
    if !document::is_attached(id) {
        return false;
    }
    if !is_focused(id) {
        FOCUSED.with(|s| s.set(Some(id)));
    }
    true
}

/// Clear focus.
pub fn blur() {
    if FOCUSED.with(|s| s.get()).is_some() {
        FOCUSED.with(|s| s.set(None));
    }
}

/// Drop focus from an element leaving the page.
pub(crate) fn release(id: ElementId) {
    if is_focused(id) {
        blur();
    }
}

/// Restore focus after an alignment moved it.
///
/// Some platforms drop focus when a positioned element is moved. If the
/// active element is no longer `previous`, focus goes back to `previous`,
/// unless it is the body (nothing to restore) or it left the page.
///
/// Returns true when focus was restored.
pub fn restore_focus(previous: ElementId, source: ElementId) -> bool {
    if active_element() == previous {
        return false;
    }
    if previous == document::body() || !document::is_attached(previous) {
        return false;
    }
    trace!(%previous, %source, "restoring focus moved by alignment");
    focus(previous)
}

/// Clear focus state (for testing).
pub fn reset_focus_state() {
    FOCUSED.with(|s| s.set(None));
}

// =============================================================================
// TESTS
// =============================================================================
