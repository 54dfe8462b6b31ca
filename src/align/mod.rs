//! Align Module - The re-computation engine
//!
//! - [`TriggerCoalescer`] - throttles recompute requests, with force bypass
//! - [`AlignController`] - decides when a recompute is needed and runs it
//! - [`Aligner`] / [`DomAligner`] - computes the placement
//!
//! # Flow
//!
//! ```text
//! target/disabled change ─┐
//! source/target resize ───┼─> coalescer.request() ─> recompute ─> Aligner ─> on_align
//! window resize ──────────┘          ^
//!                         force_align() (bypasses cooldown)
//! ```

mod coalescer;
mod controller;
mod geometry;

pub use coalescer::TriggerCoalescer;
pub use controller::{resolve, AlignController, OnAlign};
pub use geometry::{Aligner, DomAligner};
