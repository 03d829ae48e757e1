use crate::prelude::Direction;
use crate::records::VisitSequence;
use serde::Serialize;

/// Saturating index into a non-empty visit sequence.
///
/// Both ends are reflective: stepping past an end is a no-op and the
/// opposite step always moves back inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// Cursor at index 0, or `None` for an empty sequence.
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self { index: 0, len })
    }

    /// Cursor at the first visit of a sequence.
    pub fn at_start(sequence: &VisitSequence) -> Self {
        Self {
            index: 0,
            len: sequence.len(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }

    /// Moves one position; returns whether the index changed.
    pub fn step(&mut self, direction: Direction) -> bool {
        match direction {
            Direction::Previous if !self.is_first() => {
                self.index -= 1;
                true
            }
            Direction::Next if !self.is_last() => {
                self.index += 1;
                true
            }
            _ => false,
        }
    }
}
