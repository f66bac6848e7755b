//! `TimestampList`: the value-less sibling of `Series`, for callers that
//! only need an ordered set of timestamps.

use crate::error::Result;
use crate::sorted::SortedVec;
use crate::Timestamp;

#[derive(Debug, Clone, Default)]
pub struct TimestampList {
    items: SortedVec<Timestamp>,
}

impl TimestampList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn append(&mut self, ts: Timestamp) -> Result<usize> {
        self.items.append(ts)
    }

    pub fn insert(&mut self, ts: Timestamp, allow_existing: bool) -> Result<usize> {
        self.items.insert(ts, allow_existing)
    }

    pub fn get(&self, ts: Timestamp) -> Option<Timestamp> {
        self.items.index_of(ts).map(|_| ts)
    }

    pub fn get_next(&self, ts: Timestamp) -> Option<Timestamp> {
        self.items.index_of_next(ts).and_then(|i| self.items.get(i)).copied()
    }

    pub fn get_prev(&self, ts: Timestamp) -> Option<Timestamp> {
        self.items.index_of_prev(ts).and_then(|i| self.items.get(i)).copied()
    }

    pub fn item(&self, index: usize) -> Option<Timestamp> {
        self.items.get(index).copied()
    }

    pub fn delete_record(&mut self, ts: Timestamp) -> Option<usize> {
        let idx = self.items.index_of(ts)?;
        self.items.delete_index(idx).ok()?;
        Some(idx)
    }

    pub fn delete_item(&mut self, index: usize) -> Result<Timestamp> {
        self.items.delete_index(index)
    }

    pub fn delete_range(&mut self, r1: usize, r2: usize) -> Result<Option<usize>> {
        self.items.delete_range(r1, r2)
    }

    pub fn iter(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.items.as_slice().iter().copied()
    }
}
