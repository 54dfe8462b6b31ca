//! Element target scenarios, driven the way a host adapter drives the
//! controller: configure, render, `after_update`, pump timers.
//!
//! Run with: cargo test --test element_align -- --nocapture

use std::cell::RefCell;
use std::rc::Rc;

use spark_align::{
    document, focus, reset_environment, resize, timer, window, AlignConfig, AlignController, AlignPoint,
    AlignResult, AlignmentSpec, DomAligner, ElementId, OnAlign, Rect, Target,
};

// =============================================================================
// FIXTURE
// =============================================================================

/// 50x50 target under 100px of padding, 50x80 absolutely positioned source.
struct Page {
    target: ElementId,
    source: ElementId,
    calls: Rc<RefCell<Vec<AlignResult>>>,
}

fn page() -> Page {
    reset_environment();
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    Page {
        target: document::create_element(Rect::new(0.0, 100.0, 50.0, 50.0)),
        source: document::create_element(Rect::new(0.0, 0.0, 50.0, 80.0)),
        calls: Rc::new(RefCell::new(Vec::new())),
    }
}

impl Page {
    fn mount(&self, config: AlignConfig) -> AlignController {
        let calls = self.calls.clone();
        let on_align: OnAlign = Rc::new(move |_: ElementId, result: &AlignResult| {
            calls.borrow_mut().push(result.clone());
        });

        let disabled = config.disabled;
        let controller = AlignController::new(config, Rc::new(DomAligner), on_align);
        controller.set_source(Some(self.source));
        self.render(&controller, disabled);
        controller
    }

    fn render(&self, controller: &AlignController, disabled: bool) {
        let target = self.target;
        controller.configure(spec(), Some(Target::element(move || Some(target))), disabled);
        controller.after_update();
    }

    fn count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn reset_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

fn spec() -> AlignmentSpec {
    AlignmentSpec::with_points(AlignPoint::parse("bc").unwrap(), AlignPoint::parse("tc").unwrap())
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn resize() {
    let page = page();
    let controller = page.mount(AlignConfig {
        monitor_window_resize: true,
        ..Default::default()
    });
    assert_eq!(page.count(), 1);

    // Window resize
    page.reset_calls();
    window::dispatch_window_resize(800.0, 600.0);
    timer::run_all_timers();
    assert_eq!(page.count(), 1);

    // Not listening any more
    page.reset_calls();
    controller.set_monitor_window_resize(false);
    page.render(&controller, false);
    window::dispatch_window_resize(900.0, 600.0);
    timer::run_all_timers();
    assert_eq!(page.count(), 0);

    // Unmount while listening should not crash
    controller.set_monitor_window_resize(true);
    page.render(&controller, false);
    drop(controller);
    assert_eq!(window::listener_count(), 0);
}

#[test]
fn disabled_should_trigger_align() {
    let page = page();
    let controller = page.mount(AlignConfig {
        monitor_window_resize: true,
        disabled: true,
        ..Default::default()
    });
    page.render(&controller, true);
    assert_eq!(page.count(), 0);

    page.render(&controller, false);
    timer::run_all_timers();
    assert_eq!(page.count(), 1);
}

#[test]
fn source_sits_above_target() {
    let page = page();
    let _controller = page.mount(AlignConfig::default());

    let result = page.calls.borrow()[0].clone();
    assert_eq!(result.rect, Rect::new(0.0, 20.0, 50.0, 80.0));
    assert_eq!(document::element_rect(page.source), Some(result.rect));
}

#[test]
fn target_resize_realigns() {
    let page = page();
    let _controller = page.mount(AlignConfig {
        monitor_buffer_time: 30,
        ..Default::default()
    });
    timer::run_all_timers();

    document::set_element_size(page.target, 100.0, 50.0);
    assert_eq!(page.count(), 2);
    assert_eq!(page.calls.borrow()[1].rect.x, 25.0);
}

#[test]
fn burst_of_triggers_within_one_window() {
    let page = page();
    let controller = page.mount(AlignConfig {
        monitor_buffer_time: 100,
        monitor_window_resize: true,
        ..Default::default()
    });

    for i in 0..10 {
        window::dispatch_window_resize(800.0 + i as f64, 600.0);
        document::set_element_size(page.source, 50.0 + i as f64, 80.0);
        timer::advance_timers_by_time(5);
    }
    assert_eq!(page.count(), 1);

    timer::advance_timers_by_time(100);
    assert_eq!(page.count(), 2);

    // A forced align never waits
    controller.force_align();
    assert_eq!(page.count(), 3);
}

#[test]
fn teardown_mid_cooldown() {
    let page = page();
    let controller = page.mount(AlignConfig {
        monitor_buffer_time: 100,
        ..Default::default()
    });
    document::set_element_size(page.target, 70.0, 50.0);
    assert!(controller.coalescer().has_pending());

    controller.teardown();
    timer::advance_timers_by_time(500);
    assert_eq!(page.count(), 1);
    assert_eq!(resize::observer_count(page.target), 0);
    assert_eq!(timer::pending_timer_count(), 0);
}

#[test]
fn focus_is_left_alone_when_not_moved() {
    let page = page();
    let input = document::create_element(Rect::default());
    focus::focus(input);

    let _controller = page.mount(AlignConfig::default());
    assert_eq!(focus::active_element(), input);
}
