use std::cell::Cell;
use std::rc::Rc;
use crate::math::Vec3;

/// Current start/end of a branch, shared with the leaves hanging from it
#[derive(Debug, Default)]
pub struct BranchAnchor {
    start: Cell<Vec3>,
    end: Cell<Vec3>,
}

impl BranchAnchor {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            start: Cell::new(start),
            end: Cell::new(end),
        }
    }

    pub fn start(&self) -> Vec3 {
        self.start.get()
    }

    pub fn end(&self) -> Vec3 {
        self.end.get()
    }

    pub fn set(&self, start: Vec3, end: Vec3) {
        self.start.set(start);
        self.end.set(end);
    }
}

/// Owned start/end pair a detached leaf orients and moves by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallVector {
    pub start: Vec3,
    pub end: Vec3,
}

/// Where a leaf reads its start/end positions from
#[derive(Debug, Clone)]
pub enum LeafAnchor {
    /// Hanging: follows the branch as it grows
    Branch(Rc<BranchAnchor>),
    /// Falling: independent of the branch
    Fall(FallVector),
}

impl LeafAnchor {
    pub fn start(&self) -> Vec3 {
        match self {
            LeafAnchor::Branch(anchor) => anchor.start(),
            LeafAnchor::Fall(fall) => fall.start,
        }
    }

    pub fn end(&self) -> Vec3 {
        match self {
            LeafAnchor::Branch(anchor) => anchor.end(),
            LeafAnchor::Fall(fall) => fall.end,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, LeafAnchor::Fall(_))
    }
}
