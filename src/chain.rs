// Segment chain: the worm's body as an owned, head-first list of cells

use serde::Serialize;

use crate::types::{Direction, GridPosition};

/// Ordered body cells, head first. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentChain {
    segments: Vec<GridPosition>,
}

impl SegmentChain {
    /// Creates a chain holding only the head
    pub fn new(head: GridPosition) -> Self {
        SegmentChain {
            segments: vec![head],
        }
    }

    /// Builds a chain from explicit cells, head first. Returns `None` for an empty list.
    pub fn from_segments(segments: Vec<GridPosition>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(SegmentChain { segments })
        }
    }

    pub fn head(&self) -> GridPosition {
        self.segments[0]
    }

    pub fn tail(&self) -> GridPosition {
        self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    // A chain always has its head.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn segments(&self) -> &[GridPosition] {
        &self.segments
    }

    pub fn contains(&self, pos: &GridPosition) -> bool {
        self.segments.contains(pos)
    }

    /// Shifts every body segment onto its predecessor's cell, then moves the head
    /// one cell in `direction`.
    pub fn advance(&mut self, direction: Direction) {
        // Walk tail to head so each slot reads its predecessor before it is overwritten
        for i in (1..self.segments.len()).rev() {
            self.segments[i] = self.segments[i - 1];
        }
        self.segments[0] = direction.apply(&self.segments[0]);
    }

    /// Adds one tail segment. A single-cell chain grows one cell behind the head so the
    /// new segment does not sit on top of it; longer chains stack the new segment on the
    /// current tail, and it separates on the next advance.
    pub fn append(&mut self, direction: Direction) {
        let spawn = if self.segments.len() == 1 {
            direction.opposite().apply(&self.segments[0])
        } else {
            self.tail()
        };
        self.segments.push(spawn);
    }

    /// True if `pos` is covered by any segment behind the head.
    ///
    /// Meant to be called after `advance`: the cell the old tail sat on has already
    /// been vacated, so a head entering it is not a hit. Segments stacked by `append`
    /// keep that cell occupied, which is what growth should do.
    pub fn body_hits(&self, pos: &GridPosition) -> bool {
        self.segments[1..].contains(pos)
    }
}
