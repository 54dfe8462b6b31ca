//! # spark-align
//!
//! Keeps a floating element aligned to a target element or point.
//!
//! The interesting part is not the geometry but the scheduling: deciding
//! *when* a realignment is needed, throttling bursts of triggers, and telling
//! real input changes apart from redundant re-renders.
//!
//! ## Architecture
//!
//! ```text
//! host adapter ── configure / after_update / force_align / teardown ──> AlignController
//!                                                                          │
//!                                          TriggerCoalescer <──────────────┤
//!                                                 │                        │
//!                                             recompute ──> Aligner ──> on_align
//! ```
//!
//! The [`state`] module is the page environment the engine runs against:
//! element boxes, focus, resize observation, window events and a timer queue
//! driven by the host's event loop.
//!
//! ## Modules
//!
//! - [`types`] - Core types (ElementId, Rect, AlignPoint, AlignmentSpec, Target, AlignResult)
//! - [`align`] - Coalescer, controller and aligners
//! - [`state`] - Page environment
//! - [`config`] - Controller configuration
//! - [`error`] - Error taxonomy

pub mod align;
pub mod config;
pub mod error;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use align::{resolve, AlignController, Aligner, DomAligner, OnAlign, TriggerCoalescer};
pub use config::AlignConfig;
pub use error::AlignError;

pub use state::{document, focus, resize, timer, window, reset_environment};
