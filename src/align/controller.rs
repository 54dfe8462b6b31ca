//! Alignment Controller - Deciding when the source must be realigned
//!
//! The controller owns the host's latest configuration and turns every
//! relevant change into a request on its [`TriggerCoalescer`]:
//!
//! - target resolves to a different element or point
//! - disabled flips back to enabled
//! - the source or target element is resized
//! - the window is resized (when monitoring is on)
//!
//! # Host contract
//!
//! ```ignore
//! let controller = AlignController::new(config, Rc::new(DomAligner), on_align);
//!
//! // On every render/update:
//! controller.set_source(Some(popup));
//! controller.configure(spec, Some(Target::element(move || Some(button))), false);
//! controller.after_update();
//!
//! // Imperative realign:
//! controller.force_align();
//!
//! // Unmount:
//! controller.teardown();
//! ```
//!
//! `configure` only stores. Nothing is recomputed until `after_update` (the
//! post-render hook) or `force_align` runs.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::coalescer::TriggerCoalescer;
use super::geometry::Aligner;
use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::state::{document, focus, resize, window};
use crate::types::{AlignResult, AlignmentSpec, Cleanup, ElementId, ResolvedTarget, Target};

/// Callback receiving the source element and the result of each completed
/// alignment.
pub type OnAlign = Rc<dyn Fn(ElementId, &AlignResult)>;

/// Resize observation for one role (target or source).
#[derive(Default)]
struct ResizeMonitor {
    element: Option<ElementId>,
    cancel: Option<Cleanup>,
}

impl ResizeMonitor {
    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

struct ControllerState {
    spec: AlignmentSpec,
    target: Option<Target>,
    disabled: bool,
    monitor_window_resize: bool,
    source: Option<ElementId>,

    /// Disabled flag seen by the previous `after_update`.
    last_disabled: Option<bool>,
    /// Resolved target of the last completed alignment.
    cache: ResolvedTarget,

    target_monitor: ResizeMonitor,
    source_monitor: ResizeMonitor,
    window_listener: Option<Cleanup>,

    torn_down: bool,
}

struct Inner {
    state: RefCell<ControllerState>,
    coalescer: TriggerCoalescer,
    aligner: Rc<dyn Aligner>,
    on_align: OnAlign,
}

/// Keeps one source element aligned to its target.
///
/// Dropping the controller tears it down.
pub struct AlignController {
    inner: Rc<Inner>,
}

impl AlignController {
    /// Create a controller. Nothing is observed or aligned until the first
    /// `after_update`.
    pub fn new(config: AlignConfig, aligner: Rc<dyn Aligner>, on_align: OnAlign) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            Inner {
                state: RefCell::new(ControllerState {
                    spec: config.align,
                    target: None,
                    disabled: config.disabled,
                    monitor_window_resize: config.monitor_window_resize,
                    source: None,
                    last_disabled: None,
                    cache: ResolvedTarget::default(),
                    target_monitor: ResizeMonitor::default(),
                    source_monitor: ResizeMonitor::default(),
                    window_listener: None,
                    torn_down: false,
                }),
                coalescer: TriggerCoalescer::new(config.monitor_buffer_time, move || {
                    weak.upgrade().is_some_and(|inner| inner.recompute())
                }),
                aligner,
                on_align,
            }
        });

        Self { inner }
    }

    // =========================================================================
    // HOST INPUTS
    // =========================================================================

    /// Store the alignment spec, target and disabled flag. Last write wins;
    /// nothing is recomputed here.
    pub fn configure(&self, spec: AlignmentSpec, target: Option<Target>, disabled: bool) {
        let mut state = self.inner.state.borrow_mut();
        state.spec = spec;
        state.target = target;
        state.disabled = disabled;
    }

    /// Store the element being positioned.
    pub fn set_source(&self, source: Option<ElementId>) {
        self.inner.state.borrow_mut().source = source;
    }

    /// Turn the window resize listener on or off at the next `after_update`.
    pub fn set_monitor_window_resize(&self, enabled: bool) {
        self.inner.state.borrow_mut().monitor_window_resize = enabled;
    }

    /// Change the cooldown window.
    pub fn set_monitor_buffer_time(&self, buffer_ms: u64) {
        self.inner.coalescer.set_buffer(buffer_ms);
    }

    /// Apply a whole configuration (spec, disabled, window monitoring and
    /// buffer) while keeping the current target.
    pub fn apply_config(&self, config: AlignConfig) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.spec = config.align;
            state.disabled = config.disabled;
            state.monitor_window_resize = config.monitor_window_resize;
        }
        self.set_monitor_buffer_time(config.monitor_buffer_time);
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Post-render hook. Call after every update of the host, once the
    /// document reflects the latest render.
    ///
    /// Must not be called from inside `on_align`: the cached target is only
    /// updated once the callback returns, so a synchronous re-render there
    /// sees the old target and requests again.
    pub fn after_update(&self) {
        if self.inner.state.borrow().torn_down {
            return;
        }
        self.inner.sync_disabled();
        self.inner.sync_source_monitor();
        self.inner.detect_target_change();
        self.inner.sync_window_listener();
    }

    /// Realign now, even mid-cooldown and even if the target looks
    /// unchanged. Produces `on_align` before returning unless disabled, the
    /// target is missing or unresolvable, or the controller is torn down.
    pub fn force_align(&self) {
        self.inner.coalescer.request(true);
    }

    /// Stop observing and cancel pending work. No `on_align` follows.
    /// Safe to call more than once.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    /// Resolved target of the last completed alignment.
    pub fn cached_target(&self) -> ResolvedTarget {
        self.inner.state.borrow().cache
    }

    /// Element currently observed in the target role.
    pub fn observed_target(&self) -> Option<ElementId> {
        self.inner.state.borrow().target_monitor.element
    }

    /// Element currently observed in the source role.
    pub fn observed_source(&self) -> Option<ElementId> {
        self.inner.state.borrow().source_monitor.element
    }

    pub fn is_listening_window_resize(&self) -> bool {
        self.inner.state.borrow().window_listener.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.state.borrow().torn_down
    }

    pub fn coalescer(&self) -> &TriggerCoalescer {
        &self.inner.coalescer
    }
}

impl Drop for AlignController {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl Inner {
    /// Request for observers and listeners, which only hold a weak handle.
    fn requester(self: &Rc<Self>) -> impl Fn() + 'static {
        let weak = Rc::downgrade(self);
        move || {
            if let Some(inner) = weak.upgrade() {
                inner.coalescer.request(false);
            }
        }
    }

    /// One recompute attempt. Returns false for a no-op.
    fn recompute(&self) -> bool {
        // 1. Latest configuration
        let (target, source, spec) = {
            let state = self.state.borrow();
            if state.torn_down {
                return false;
            }
            if state.disabled {
                trace!("align skipped: disabled");
                return false;
            }
            let Some(target) = state.target.clone() else {
                trace!("align skipped: no target");
                return false;
            };
            let Some(source) = state.source else {
                debug!("align skipped: no source element");
                return false;
            };
            (target, source, state.spec.clone())
        };

        // 2. Resolve
        let resolved = match resolve(&target) {
            Ok(resolved) => resolved,
            Err(err) => {
                debug!(%err, "align skipped");
                return false;
            }
        };

        // 3. Focus before moving anything
        let active = focus::active_element();

        // 4. Geometry
        let result = match (resolved.element, resolved.point.as_ref()) {
            (Some(element), _) => self.aligner.align_element(source, element, &spec),
            (None, Some(point)) => self.aligner.align_point(source, point, &spec),
            (None, None) => return false,
        };

        // 5. Undo focus stolen by the move
        focus::restore_focus(active, source);

        // 6. Notify
        debug!(%source, ?resolved, "aligned");
        (self.on_align)(source, &result);

        // 7. Remember what was aligned against
        let mut state = self.state.borrow_mut();
        state.cache = resolved;

        // 8. A teardown from inside on_align must not leave a cooldown behind
        !state.torn_down
    }

    /// Enabling requests an alignment; disabling drops pending work.
    fn sync_disabled(&self) {
        let (disabled, previous) = {
            let state = &mut *self.state.borrow_mut();
            let previous = state.last_disabled.replace(state.disabled);
            (state.disabled, previous)
        };

        match previous {
            Some(true) if !disabled => {
                trace!("enabled, requesting align");
                self.coalescer.request(false);
            }
            Some(false) if disabled => {
                trace!("disabled, cancelling pending align");
                self.coalescer.cancel();
            }
            _ => {}
        }
    }

    /// Re-observe the source when it changed.
    fn sync_source_monitor(self: &Rc<Self>) {
        let mut state = self.state.borrow_mut();
        if state.source == state.source_monitor.element {
            return;
        }

        state.source_monitor.stop();
        let source = state.source;
        trace!(?source, "observing source resize");
        state.source_monitor.element = source;
        state.source_monitor.cancel = Some(resize::monitor_resize(source, self.requester()));
    }

    /// Request an alignment when the target resolves differently from the
    /// last alignment, and re-observe the target element when it changed.
    fn detect_target_change(self: &Rc<Self>) {
        let (target, cache) = {
            let state = self.state.borrow();
            (state.target.clone(), state.cache)
        };

        let resolved = target
            .as_ref()
            .and_then(|target| resolve(target).ok())
            .unwrap_or_default();

        if resolved.is_same_as(&cache) {
            return;
        }

        trace!(?resolved, ?cache, "target changed");
        self.coalescer.request(false);

        let mut state = self.state.borrow_mut();
        if state.torn_down || state.target_monitor.element == resolved.element {
            return;
        }
        state.target_monitor.stop();
        trace!(element = ?resolved.element, "observing target resize");
        state.target_monitor.element = resolved.element;
        state.target_monitor.cancel = Some(resize::monitor_resize(resolved.element, self.requester()));
    }

    /// Add or remove the window resize listener to match the flag.
    fn sync_window_listener(self: &Rc<Self>) {
        let mut state = self.state.borrow_mut();
        if state.monitor_window_resize {
            if state.window_listener.is_none() {
                trace!("listening for window resize");
                state.window_listener = Some(window::on_window_resize(self.requester()));
            }
        } else if let Some(remove) = state.window_listener.take() {
            trace!("stopped listening for window resize");
            remove();
        }
    }

    fn teardown(&self) {
        let (target_cancel, source_cancel, window_remove) = {
            let mut state = self.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            state.target_monitor.element = None;
            state.source_monitor.element = None;
            (
                state.target_monitor.cancel.take(),
                state.source_monitor.cancel.take(),
                state.window_listener.take(),
            )
        };

        for cancel in [target_cancel, source_cancel, window_remove].into_iter().flatten() {
            cancel();
        }
        self.coalescer.cancel();
        debug!("align controller torn down");
    }
}

/// Resolve a target to exactly one of element or point.
///
/// Elements must still be in the document; points must carry a complete
/// coordinate pair.
pub fn resolve(target: &Target) -> Result<ResolvedTarget, AlignError> {
    match target {
        Target::Element(resolver) => {
            let element = resolver().ok_or_else(|| AlignError::unresolvable("resolver returned no element"))?;
            if !document::contains(element) {
                return Err(AlignError::unresolvable(format!("element {element} is not in the document")));
            }
            Ok(ResolvedTarget {
                element: Some(element),
                point: None,
            })
        }
        Target::Point(point) => {
            point.validate()?;
            Ok(ResolvedTarget {
                element: None,
                point: Some(*point),
            })
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
