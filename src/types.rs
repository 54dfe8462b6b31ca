//! Core types for spark-align.
//!
//! These types flow from the host adapter through the controller into the
//! aligner, and back out to the `on_align` callback.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AlignError;

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by subscriptions.
///
/// Call it to cancel the subscription and release its resources.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Element handle
// =============================================================================

/// Handle to an element in the page document.
///
/// Handles are compared by identity. A handle stays valid until the element
/// is removed from the document; ids are never recycled within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Rect
// =============================================================================

/// Axis-aligned box in page coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Zero-size rect at a point.
    pub const fn at(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Same size, moved to `(x, y)`.
    pub fn moved_to(&self, x: f64, y: f64) -> Self {
        Self::new(x, y, self.width, self.height)
    }
}

// =============================================================================
// Align points
// =============================================================================

/// Vertical part of an align point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Top,
    Center,
    Bottom,
}

/// Horizontal part of an align point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Center,
    Right,
}

/// Anchor on a box, written as two letters: vertical then horizontal.
///
/// `"tl"` is the top-left corner, `"bc"` the middle of the bottom edge,
/// `"cc"` the center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignPoint {
    pub vertical: Vertical,
    pub horizontal: Horizontal,
}

impl AlignPoint {
    pub const TOP_LEFT: Self = Self::new(Vertical::Top, Horizontal::Left);
    pub const BOTTOM_LEFT: Self = Self::new(Vertical::Bottom, Horizontal::Left);

    pub const fn new(vertical: Vertical, horizontal: Horizontal) -> Self {
        Self { vertical, horizontal }
    }

    /// Parse the two-letter form (`"tl"`, `"bc"`, ...).
    pub fn parse(s: &str) -> Result<Self, AlignError> {
        let mut chars = s.chars();
        let (Some(v), Some(h), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(AlignError::invalid_point(s));
        };

        let vertical = match v {
            't' => Vertical::Top,
            'c' => Vertical::Center,
            'b' => Vertical::Bottom,
            _ => return Err(AlignError::invalid_point(s)),
        };
        let horizontal = match h {
            'l' => Horizontal::Left,
            'c' => Horizontal::Center,
            'r' => Horizontal::Right,
            _ => return Err(AlignError::invalid_point(s)),
        };

        Ok(Self::new(vertical, horizontal))
    }

    /// Mirror left and right.
    pub fn flip_horizontal(self) -> Self {
        let horizontal = match self.horizontal {
            Horizontal::Left => Horizontal::Right,
            Horizontal::Right => Horizontal::Left,
            Horizontal::Center => Horizontal::Center,
        };
        Self { horizontal, ..self }
    }

    /// Mirror top and bottom.
    pub fn flip_vertical(self) -> Self {
        let vertical = match self.vertical {
            Vertical::Top => Vertical::Bottom,
            Vertical::Bottom => Vertical::Top,
            Vertical::Center => Vertical::Center,
        };
        Self { vertical, ..self }
    }

    /// Position of this anchor on `rect`.
    pub fn anchor_in(self, rect: &Rect) -> (f64, f64) {
        let x = match self.horizontal {
            Horizontal::Left => rect.x,
            Horizontal::Center => rect.x + rect.width / 2.0,
            Horizontal::Right => rect.right(),
        };
        let y = match self.vertical {
            Vertical::Top => rect.y,
            Vertical::Center => rect.y + rect.height / 2.0,
            Vertical::Bottom => rect.bottom(),
        };
        (x, y)
    }
}

impl FromStr for AlignPoint {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AlignPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = match self.vertical {
            Vertical::Top => 't',
            Vertical::Center => 'c',
            Vertical::Bottom => 'b',
        };
        let h = match self.horizontal {
            Horizontal::Left => 'l',
            Horizontal::Center => 'c',
            Horizontal::Right => 'r',
        };
        write!(f, "{v}{h}")
    }
}

impl Serialize for AlignPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AlignPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Alignment spec
// =============================================================================

/// Overflow adjustment policy for one axis.
///
/// Hosts pass either a boolean or a number; a non-zero number enables the
/// axis the same way `true` does.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Adjust {
    Flag(bool),
    Amount(f64),
}

impl Default for Adjust {
    fn default() -> Self {
        Adjust::Flag(false)
    }
}

impl Adjust {
    pub fn is_enabled(self) -> bool {
        match self {
            Adjust::Flag(enabled) => enabled,
            Adjust::Amount(amount) => amount != 0.0 && !amount.is_nan(),
        }
    }
}

/// Per-axis overflow adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Overflow {
    pub adjust_x: Adjust,
    pub adjust_y: Adjust,
}

/// Declarative description of where the source goes relative to the target.
///
/// `points[0]` is the anchor on the source, `points[1]` the anchor on the
/// target. Offsets are in pixels. The `use_css_*` flags pick how a renderer
/// expresses the final position; they are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlignmentSpec {
    pub points: [AlignPoint; 2],
    pub offset: [f64; 2],
    pub target_offset: [f64; 2],
    pub overflow: Overflow,
    pub use_css_right: bool,
    pub use_css_bottom: bool,
    pub use_css_transform: bool,
}

impl Default for AlignmentSpec {
    fn default() -> Self {
        Self {
            points: [AlignPoint::TOP_LEFT, AlignPoint::BOTTOM_LEFT],
            offset: [0.0, 0.0],
            target_offset: [0.0, 0.0],
            overflow: Overflow::default(),
            use_css_right: false,
            use_css_bottom: false,
            use_css_transform: false,
        }
    }
}

impl AlignmentSpec {
    /// Spec with the given source/target anchors and everything else default.
    pub fn with_points(source: AlignPoint, target: AlignPoint) -> Self {
        Self {
            points: [source, target],
            ..Default::default()
        }
    }
}

// =============================================================================
// Targets
// =============================================================================

/// Fixed point target, viewport-relative (`client_*`) and/or
/// document-relative (`page_*`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TargetPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_y: Option<f64>,
}

impl TargetPoint {
    /// Document-relative point.
    pub fn page(x: f64, y: f64) -> Self {
        Self {
            page_x: Some(x),
            page_y: Some(y),
            ..Default::default()
        }
    }

    /// Viewport-relative point.
    pub fn client(x: f64, y: f64) -> Self {
        Self {
            client_x: Some(x),
            client_y: Some(y),
            ..Default::default()
        }
    }

    /// Page coordinates, when both are present and finite.
    pub fn page_pair(&self) -> Option<(f64, f64)> {
        finite_pair(self.page_x, self.page_y)
    }

    /// Client coordinates, when both are present and finite.
    pub fn client_pair(&self) -> Option<(f64, f64)> {
        finite_pair(self.client_x, self.client_y)
    }

    /// A point is usable when it has at least one complete, finite
    /// coordinate pair.
    pub fn validate(&self) -> Result<(), AlignError> {
        if self.page_pair().is_some() || self.client_pair().is_some() {
            Ok(())
        } else {
            Err(AlignError::MalformedPoint(*self))
        }
    }

    /// Document position. The page pair wins; client coordinates are
    /// converted with the given scroll offset.
    pub fn page_position(&self, scroll: (f64, f64)) -> Option<(f64, f64)> {
        self.page_pair()
            .or_else(|| self.client_pair().map(|(x, y)| (x + scroll.0, y + scroll.1)))
    }
}

fn finite_pair(x: Option<f64>, y: Option<f64>) -> Option<(f64, f64)> {
    match (x, y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((x, y)),
        _ => None,
    }
}

/// Resolver returning the current target element, if any.
pub type ElementResolver = Rc<dyn Fn() -> Option<ElementId>>;

/// The anchor the source is aligned against.
#[derive(Clone)]
pub enum Target {
    /// Element looked up through a resolver at every recomputation.
    Element(ElementResolver),
    /// Fixed point.
    Point(TargetPoint),
}

impl Target {
    pub fn element<F>(resolver: F) -> Self
    where
        F: Fn() -> Option<ElementId> + 'static,
    {
        Target::Element(Rc::new(resolver))
    }

    pub fn point(point: TargetPoint) -> Self {
        Target::Point(point)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Element(_) => f.write_str("Target::Element(<resolver>)"),
            Target::Point(point) => f.debug_tuple("Target::Point").field(point).finish(),
        }
    }
}

/// Outcome of resolving a [`Target`]. At most one side is set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedTarget {
    pub element: Option<ElementId>,
    pub point: Option<TargetPoint>,
}

impl ResolvedTarget {
    pub fn is_empty(&self) -> bool {
        self.element.is_none() && self.point.is_none()
    }

    /// True when `other` would not require a new alignment.
    pub fn is_same_as(&self, other: &ResolvedTarget) -> bool {
        self.element == other.element && is_same_point(self.point.as_ref(), other.point.as_ref())
    }
}

/// Point equality used for change detection.
///
/// Two absent points are the same. A point appearing or disappearing is a
/// change. Two present points are compared on the pair that positions them:
/// the page pair when both have one, otherwise the client pair. Fields
/// outside that pair never count, so extra or non-finite leftovers do not
/// turn an unchanged point into a change.
pub fn is_same_point(prev: Option<&TargetPoint>, next: Option<&TargetPoint>) -> bool {
    match (prev, next) {
        (None, None) => true,
        (Some(prev), Some(next)) => match (prev.page_pair(), next.page_pair()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => prev.client_pair() == next.client_pair(),
            _ => false,
        },
        _ => false,
    }
}

// =============================================================================
// Results
// =============================================================================

bitflags::bitflags! {
    /// Overflow adjustments applied during one alignment.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OverflowAdjust: u8 {
        const ADJUST_X = 1 << 0;
        const ADJUST_Y = 1 << 1;
    }
}

/// Output of one recomputation, handed verbatim to `on_align`.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignResult {
    /// Anchors actually used (after any flips).
    pub points: [AlignPoint; 2],
    pub offset: [f64; 2],
    pub target_offset: [f64; 2],
    /// Which axes were flipped to stay inside the viewport.
    pub overflow: OverflowAdjust,
    /// Page position of the target anchor.
    pub anchor: (f64, f64),
    /// Final source box.
    pub rect: Rect,
}
