//! Document - Element registry for the page environment
//!
//! Elements are handles into a thread-local table holding their box and
//! whether they are attached to the page. The body (`ElementId(0)`) always
//! exists and is always attached.
//!
//! - `create_element(rect)` - new attached element
//! - `set_element_size` - resize, notifying resize observers
//! - `set_element_position` - move without resizing (what an aligner does)
//! - `detach_element` / `attach_element` / `remove_element`

use std::cell::RefCell;
use std::collections::HashMap;

use super::{focus, resize};
use crate::types::{ElementId, Rect};

/// The document body.
pub const BODY: ElementId = ElementId(0);

struct Node {
    rect: Rect,
    attached: bool,
}

struct Document {
    nodes: HashMap<ElementId, Node>,
    next_id: usize,
}

impl Document {
    fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            BODY,
            Node {
                rect: Rect::default(),
                attached: true,
            },
        );
        Self { nodes, next_id: 1 }
    }
}

thread_local! {
    static DOCUMENT: RefCell<Document> = RefCell::new(Document::new());
}

// =============================================================================
// ELEMENT LIFECYCLE
// =============================================================================

/// The document body.
pub fn body() -> ElementId {
    BODY
}

/// Create an attached element with the given box.
pub fn create_element(rect: Rect) -> ElementId {
    DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        let id = ElementId(doc.next_id);
        doc.next_id += 1;
        doc.nodes.insert(id, Node { rect, attached: true });
        id
    })
}

/// Remove an element from the document. Its handle stops resolving.
///
/// The body cannot be removed.
pub fn remove_element(id: ElementId) -> bool {
    if id == BODY {
        return false;
    }
    let removed = DOCUMENT.with(|doc| doc.borrow_mut().nodes.remove(&id).is_some());
    if removed {
        focus::release(id);
    }
    removed
}

/// Take an element off the page while keeping its handle valid.
pub fn detach_element(id: ElementId) {
    if id == BODY {
        return;
    }
    let detached = set_attached(id, false);
    if detached {
        focus::release(id);
    }
}

/// Put a detached element back on the page.
pub fn attach_element(id: ElementId) {
    set_attached(id, true);
}

fn set_attached(id: ElementId, attached: bool) -> bool {
    DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        match doc.nodes.get_mut(&id) {
            Some(node) => {
                node.attached = attached;
                true
            }
            None => false,
        }
    })
}

// =============================================================================
// QUERIES
// =============================================================================

/// Whether the handle still refers to an element of this document.
pub fn contains(id: ElementId) -> bool {
    DOCUMENT.with(|doc| doc.borrow().nodes.contains_key(&id))
}

/// Whether the element exists and is on the page.
pub fn is_attached(id: ElementId) -> bool {
    DOCUMENT.with(|doc| doc.borrow().nodes.get(&id).is_some_and(|node| node.attached))
}

/// Current box of an element.
pub fn element_rect(id: ElementId) -> Option<Rect> {
    DOCUMENT.with(|doc| doc.borrow().nodes.get(&id).map(|node| node.rect))
}

/// Number of elements, body included.
pub fn element_count() -> usize {
    DOCUMENT.with(|doc| doc.borrow().nodes.len())
}

// =============================================================================
// MUTATION
// =============================================================================

/// Resize an element.
///
/// Resize observers are notified when the whole-pixel size changes;
/// sub-pixel jitter is ignored.
pub fn set_element_size(id: ElementId, width: f64, height: f64) {
    let changed = DOCUMENT.with(|doc| {
        let mut doc = doc.borrow_mut();
        let Some(node) = doc.nodes.get_mut(&id) else {
            return false;
        };
        let before = (node.rect.width.floor(), node.rect.height.floor());
        node.rect.width = width;
        node.rect.height = height;
        before != (width.floor(), height.floor())
    });

    if changed {
        resize::notify(id);
    }
}

/// Move an element without resizing it.
pub fn set_element_position(id: ElementId, x: f64, y: f64) {
    DOCUMENT.with(|doc| {
        if let Some(node) = doc.borrow_mut().nodes.get_mut(&id) {
            node.rect.x = x;
            node.rect.y = y;
        }
    });
}

/// Drop every element except the body (for testing).
pub fn reset_document() {
    DOCUMENT.with(|doc| {
        *doc.borrow_mut() = Document::new();
    });
}

// =============================================================================
// TESTS
// =============================================================================
