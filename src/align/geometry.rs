//! Geometry - Computing where the source goes
//!
//! The controller only decides *when* to align; the [`Aligner`] decides
//! *where*. [`DomAligner`] is the built-in implementation working on the
//! page environment's document boxes.
//!
//! # Placement
//!
//! The source anchor is moved onto the target anchor, then shifted:
//!
//! ```text
//! left = source.x - (source_anchor.x - target_anchor.x) + offset.x - target_offset.x
//! top  = source.y - (source_anchor.y - target_anchor.y) + offset.y - target_offset.y
//! ```
//!
//! With overflow adjustment enabled on an axis, a placement that leaves the
//! viewport on that axis is retried with both anchors mirrored and the
//! offsets negated; the mirrored placement wins if it fits.

use tracing::trace;

use crate::state::{document, window};
use crate::types::{AlignPoint, AlignResult, AlignmentSpec, ElementId, OverflowAdjust, Rect, TargetPoint};

/// Geometry collaborator used by the controller.
pub trait Aligner {
    /// Align `source` against an element.
    fn align_element(&self, source: ElementId, target: ElementId, spec: &AlignmentSpec) -> AlignResult;

    /// Align `source` against a fixed point.
    fn align_point(&self, source: ElementId, point: &TargetPoint, spec: &AlignmentSpec) -> AlignResult;
}

/// Built-in aligner: anchor points, offsets and flip-on-overflow, applied to
/// the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomAligner;

impl Aligner for DomAligner {
    fn align_element(&self, source: ElementId, target: ElementId, spec: &AlignmentSpec) -> AlignResult {
        let target_rect = document::element_rect(target).unwrap_or_default();
        self.place(source, &target_rect, spec)
    }

    fn align_point(&self, source: ElementId, point: &TargetPoint, spec: &AlignmentSpec) -> AlignResult {
        let (x, y) = point.page_position(window::scroll()).unwrap_or_default();
        self.place(source, &Rect::at(x, y), spec)
    }
}

impl DomAligner {
    fn place(&self, source: ElementId, target: &Rect, spec: &AlignmentSpec) -> AlignResult {
        let source_rect = document::element_rect(source).unwrap_or_default();
        let visible = window::visible_rect();

        let mut placement = Placement::new(spec);
        let mut rect = placement.compute(&source_rect, target);
        let mut overflow = OverflowAdjust::empty();

        if spec.overflow.adjust_x.is_enabled() && overflows_x(&rect, &visible) {
            let flipped = placement.flipped_x();
            let candidate = flipped.compute(&source_rect, target);
            if !overflows_x(&candidate, &visible) {
                placement = flipped;
                rect = candidate;
                overflow |= OverflowAdjust::ADJUST_X;
            }
        }

        if spec.overflow.adjust_y.is_enabled() && overflows_y(&rect, &visible) {
            let flipped = placement.flipped_y();
            let candidate = flipped.compute(&source_rect, target);
            if !overflows_y(&candidate, &visible) {
                placement = flipped;
                rect = candidate;
                overflow |= OverflowAdjust::ADJUST_Y;
            }
        }

        document::set_element_position(source, rect.x, rect.y);
        trace!(%source, x = rect.x, y = rect.y, ?overflow, "source placed");

        AlignResult {
            points: placement.points,
            offset: placement.offset,
            target_offset: placement.target_offset,
            overflow,
            anchor: placement.points[1].anchor_in(target),
            rect,
        }
    }
}

/// Anchors and offsets for one placement attempt.
#[derive(Debug, Clone, Copy)]
struct Placement {
    points: [AlignPoint; 2],
    offset: [f64; 2],
    target_offset: [f64; 2],
}

impl Placement {
    fn new(spec: &AlignmentSpec) -> Self {
        Self {
            points: spec.points,
            offset: spec.offset,
            target_offset: spec.target_offset,
        }
    }

    fn compute(&self, source: &Rect, target: &Rect) -> Rect {
        let (sx, sy) = self.points[0].anchor_in(source);
        let (tx, ty) = self.points[1].anchor_in(target);
        let x = source.x - (sx - tx) + self.offset[0] - self.target_offset[0];
        let y = source.y - (sy - ty) + self.offset[1] - self.target_offset[1];
        source.moved_to(x.round(), y.round())
    }

    fn flipped_x(&self) -> Self {
        Self {
            points: [self.points[0].flip_horizontal(), self.points[1].flip_horizontal()],
            offset: [-self.offset[0], self.offset[1]],
            target_offset: [-self.target_offset[0], self.target_offset[1]],
        }
    }

    fn flipped_y(&self) -> Self {
        Self {
            points: [self.points[0].flip_vertical(), self.points[1].flip_vertical()],
            offset: [self.offset[0], -self.offset[1]],
            target_offset: [self.target_offset[0], -self.target_offset[1]],
        }
    }
}

fn overflows_x(rect: &Rect, visible: &Rect) -> bool {
    rect.x < visible.x || rect.right() > visible.right()
}

fn overflows_y(rect: &Rect, visible: &Rect) -> bool {
    rect.y < visible.y || rect.bottom() > visible.bottom()
}

// =============================================================================
// TESTS
// =============================================================================
