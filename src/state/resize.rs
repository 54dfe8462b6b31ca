//! Resize Observation - Per-element resize callbacks
//!
//! `monitor_resize(element, callback)` watches one element and returns a
//! cleanup that stops watching. `None` is accepted and watches nothing, so
//! callers can swap observations without special-casing a missing element.
//!
//! Callbacks are cloned out of the registry before they run; a callback may
//! start or cancel observations.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::{Cleanup, ElementId};

type ResizeCallback = Rc<dyn Fn()>;

struct ObserverRegistry {
    observers: HashMap<ElementId, Vec<(usize, ResizeCallback)>>,
    next_id: usize,
}

impl ObserverRegistry {
    fn new() -> Self {
        Self {
            observers: HashMap::new(),
            next_id: 0,
        }
    }
}

thread_local! {
    static REGISTRY: RefCell<ObserverRegistry> = RefCell::new(ObserverRegistry::new());
}

/// Watch `element` for size changes. Returns cleanup to stop watching.
pub fn monitor_resize<F>(element: Option<ElementId>, callback: F) -> Cleanup
where
    F: Fn() + 'static,
{
    let Some(element) = element else {
        return Box::new(|| {});
    };

    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.observers
            .entry(element)
            .or_default()
            .push((id, Rc::new(callback)));
        id
    });

    Box::new(move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(list) = reg.observers.get_mut(&element) {
                list.retain(|(observer_id, _)| *observer_id != id);
                if list.is_empty() {
                    reg.observers.remove(&element);
                }
            }
        });
    })
}

/// Run every observer of `element`.
pub(crate) fn notify(element: ElementId) {
    let callbacks: Vec<ResizeCallback> = REGISTRY.with(|reg| {
        reg.borrow()
            .observers
            .get(&element)
            .map(|list| list.iter().map(|(_, cb)| cb.clone()).collect())
            .unwrap_or_default()
    });

    for callback in callbacks {
        callback();
    }
}

/// Number of active observations on `element`.
pub fn observer_count(element: ElementId) -> usize {
    REGISTRY.with(|reg| reg.borrow().observers.get(&element).map_or(0, Vec::len))
}

/// Drop all observations (for testing).
pub fn reset_resize_observers() {
    let old = REGISTRY.with(|reg| std::mem::replace(&mut *reg.borrow_mut(), ObserverRegistry::new()));
    drop(old);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{document, reset_environment};
    use crate::types::Rect;
    use std::cell::Cell;

    fn setup() {
        reset_environment();
    }

    #[test]
    fn test_none_is_noop() {
        setup();

        let cancel = monitor_resize(None, || panic!("should never fire"));
        cancel();
    }

    #[test]
    fn test_cancel_stops_callbacks() {
        setup();

        let el = document::create_element(Rect::new(0.0, 0.0, 10.0, 10.0));
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let cancel = monitor_resize(Some(el), move || count_clone.set(count_clone.get() + 1));
        assert_eq!(observer_count(el), 1);

        document::set_element_size(el, 20.0, 10.0);
        assert_eq!(count.get(), 1);

        cancel();
        assert_eq!(observer_count(el), 0);

        document::set_element_size(el, 30.0, 10.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_multiple_observers() {
        setup();

        let el = document::create_element(Rect::new(0.0, 0.0, 10.0, 10.0));
        let count = Rc::new(Cell::new(0));
        let c1 = count.clone();
        let c2 = count.clone();
        let cancel1 = monitor_resize(Some(el), move || c1.set(c1.get() + 1));
        let _cancel2 = monitor_resize(Some(el), move || c2.set(c2.get() + 10));

        document::set_element_size(el, 11.0, 10.0);
        assert_eq!(count.get(), 11);

        cancel1();
        document::set_element_size(el, 12.0, 10.0);
        assert_eq!(count.get(), 21);
    }

    #[test]
    fn test_callback_may_cancel_itself() {
        setup();

        let el = document::create_element(Rect::new(0.0, 0.0, 10.0, 10.0));
        let slot: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
        let slot_clone = slot.clone();
        let cancel = monitor_resize(Some(el), move || {
            if let Some(cancel) = slot_clone.borrow_mut().take() {
                cancel();
            }
        });
        *slot.borrow_mut() = Some(cancel);

        document::set_element_size(el, 20.0, 10.0);
        assert_eq!(observer_count(el), 0);
    }
}
