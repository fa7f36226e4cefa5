//! Frame selection
//!
//! Per-document selection state: base/extent positions, the granularity the
//! user selected with, and the painted bounds used for drag feedback.

use crate::NodeId;
use crate::geometry::{IntPoint, IntRect};

/// A point in the tree: container node plus offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub const fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// Selection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionType {
    #[default]
    None,
    Caret,
    Range,
}

/// Granularity the selection was made with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Character,
    Word,
    Sentence,
    Line,
    Paragraph,
}

/// Ordered pair of positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: Position,
    pub end: Position,
}

impl SelectionRange {
    pub fn collapsed(at: Position) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Selection state of one frame
#[derive(Debug, Clone)]
pub struct FrameSelection {
    base: Option<Position>,
    extent: Option<Position>,
    granularity: Granularity,
    bounds: IntRect,
    available: bool,
}

impl Default for FrameSelection {
    fn default() -> Self {
        Self {
            base: None,
            extent: None,
            granularity: Granularity::Character,
            bounds: IntRect::default(),
            available: true,
        }
    }
}

impl FrameSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set selection to a single point (caret)
    pub fn set_caret(&mut self, at: Position) {
        self.base = Some(at);
        self.extent = Some(at);
        self.granularity = Granularity::Character;
        self.bounds = IntRect::default();
    }

    /// Set selection range
    pub fn set_range(&mut self, base: Position, extent: Position, granularity: Granularity) {
        self.base = Some(base);
        self.extent = Some(extent);
        self.granularity = granularity;
    }

    /// Replace with an ordered range, keeping the granularity
    pub fn set_selection(&mut self, range: SelectionRange) {
        self.base = Some(range.start);
        self.extent = Some(range.end);
    }

    /// Painted bounds of the selection in document coordinates
    pub fn set_bounds(&mut self, bounds: IntRect) {
        self.bounds = bounds;
    }

    pub fn bounds(&self) -> IntRect {
        self.bounds
    }

    /// Clear selection
    pub fn clear(&mut self) {
        self.base = None;
        self.extent = None;
        self.granularity = Granularity::Character;
        self.bounds = IntRect::default();
    }

    pub fn base(&self) -> Option<Position> {
        self.base
    }

    pub fn extent(&self) -> Option<Position> {
        self.extent
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn selection_type(&self) -> SelectionType {
        match (self.base, self.extent) {
            (Some(b), Some(e)) if b == e => SelectionType::Caret,
            (Some(_), Some(_)) => SelectionType::Range,
            _ => SelectionType::None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.selection_type() == SelectionType::None
    }

    pub fn is_caret(&self) -> bool {
        self.selection_type() == SelectionType::Caret
    }

    pub fn is_range(&self) -> bool {
        self.selection_type() == SelectionType::Range
    }

    /// Base and extent as a range (unordered: base is `start`)
    pub fn range(&self) -> Option<SelectionRange> {
        Some(SelectionRange {
            start: self.base?,
            end: self.extent?,
        })
    }

    /// Whether a document point lies in the painted selection
    pub fn contains_point(&self, point: IntPoint) -> bool {
        self.is_range() && self.bounds.contains(point)
    }

    /// False once the owning frame has been detached
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}
