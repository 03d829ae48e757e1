use crate::navigation::cursor::Cursor;
use crate::records::{VisitRecord, VisitSequence};

/// Split of a sequence around the cursor. All three parts keep sequence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partition<'a> {
    pub visited: &'a [VisitRecord],
    pub current: &'a VisitRecord,
    pub remaining: &'a [VisitRecord],
    travelled: &'a [VisitRecord],
}

impl<'a> Partition<'a> {
    /// Visits from the start up to and including the current one.
    pub fn travelled(&self) -> &'a [VisitRecord] {
        self.travelled
    }

    pub fn current_index(&self) -> usize {
        self.visited.len()
    }
}

/// Derives the visited/current/remaining split from the cursor.
pub fn partition<'a>(sequence: &'a VisitSequence, cursor: &Cursor) -> Partition<'a> {
    let records = sequence.records();
    let index = cursor.index().min(records.len() - 1);
    Partition {
        visited: &records[..index],
        current: &records[index],
        remaining: &records[index + 1..],
        travelled: &records[..=index],
    }
}
