//! Shared binary-search / shift-based insert-delete skeleton.
//!
//! `Series` and `TimestampList` expose the same positional API (get_next,
//! get_prev, get, insert, delete_item, delete_range) over different payload
//! types that both carry a `Timestamp` key. Rather than writing the binary
//! search and shifting logic twice, both build on this private container.

use crate::error::{Error, Result};
use crate::Timestamp;

pub(crate) trait Keyed {
    fn key(&self) -> Timestamp;
}

impl Keyed for Timestamp {
    fn key(&self) -> Timestamp {
        *self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SortedVec<T> {
    items: Vec<T>,
}

impl<T> Default for SortedVec<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Keyed> SortedVec<T> {
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

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    fn search(&self, ts: Timestamp) -> std::result::Result<usize, usize> {
        self.items.binary_search_by_key(&ts, |item| item.key())
    }

    /// First index whose key is `>= ts`, or `None` if `ts` is past the end.
    pub fn index_of_next(&self, ts: Timestamp) -> Option<usize> {
        match self.search(ts) {
            Ok(i) => Some(i),
            Err(i) if i < self.items.len() => Some(i),
            Err(_) => None,
        }
    }

    /// Last index whose key is `<= ts`, or `None` if `ts` precedes everything.
    pub fn index_of_prev(&self, ts: Timestamp) -> Option<usize> {
        match self.search(ts) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }

    pub fn index_of(&self, ts: Timestamp) -> Option<usize> {
        self.search(ts).ok()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Appends `item`, requiring its key to be strictly greater than the
    /// current last key.
    pub fn append(&mut self, item: T) -> Result<usize> {
        if let Some(last) = self.items.last() {
            if item.key() <= last.key() {
                return Err(Error::OutOfOrder {
                    timestamp: item.key(),
                    last: last.key(),
                });
            }
        }
        self.items.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Inserts `item` at its sorted position. If a record with the same key
    /// already exists, overwrites it when `allow_existing`, else fails.
    pub fn insert(&mut self, item: T, allow_existing: bool) -> Result<usize> {
        match self.search(item.key()) {
            Ok(i) => {
                if allow_existing {
                    self.items[i] = item;
                    Ok(i)
                } else {
                    Err(Error::AlreadyExists { timestamp: item.key() })
                }
            }
            Err(i) => {
                self.items.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
                self.items.insert(i, item);
                Ok(i)
            }
        }
    }

    pub fn delete_index(&mut self, index: usize) -> Result<T> {
        if index >= self.items.len() {
            return Err(Error::InvalidIndex { index, len: self.items.len() });
        }
        Ok(self.items.remove(index))
    }

    /// Deletes the inclusive range `[r1, r2]`, returning the index the
    /// record that used to be at `r2 + 1` now occupies, or `None` if the
    /// deletion consumed the tail of the container.
    pub fn delete_range(&mut self, r1: usize, r2: usize) -> Result<Option<usize>> {
        let len = self.items.len();
        if len == 0 || r1 > r2 || r2 >= len {
            return Err(Error::InvalidIndex { index: r2, len });
        }
        self.items.drain(r1..=r2);
        let new_len = self.items.len();
        Ok(if r1 < new_len { Some(r1) } else { None })
    }
}

impl<T: Keyed + Clone> SortedVec<T> {
    /// Splices a block of already-sorted, non-overlapping items in at `pos`.
    pub fn insert_block(&mut self, pos: usize, items: &[T]) -> Result<()> {
        self.items
            .try_reserve(items.len())
            .map_err(|_| Error::OutOfMemory)?;
        self.items.splice(pos..pos, items.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Keyed for (Timestamp, &'static str) {
        fn key(&self) -> Timestamp {
            self.0
        }
    }

    #[test]
    fn append_rejects_out_of_order() {
        let mut v: SortedVec<Timestamp> = SortedVec::new();
        v.append(10).unwrap();
        let err = v.append(10).unwrap_err();
        assert_eq!(err, Error::OutOfOrder { timestamp: 10, last: 10 });
        let err = v.append(5).unwrap_err();
        assert_eq!(err, Error::OutOfOrder { timestamp: 5, last: 10 });
    }

    #[test]
    fn index_of_next_prev_exact() {
        let mut v: SortedVec<Timestamp> = SortedVec::new();
        for ts in [10, 20, 30] {
            v.append(ts).unwrap();
        }
        assert_eq!(v.index_of_next(15), Some(1));
        assert_eq!(v.index_of_next(20), Some(1));
        assert_eq!(v.index_of_next(31), None);
        assert_eq!(v.index_of_prev(15), Some(0));
        assert_eq!(v.index_of_prev(20), Some(1));
        assert_eq!(v.index_of_prev(5), None);
        assert_eq!(v.index_of(20), Some(1));
        assert_eq!(v.index_of(21), None);
    }

    #[test]
    fn insert_shifts_and_overwrites() {
        let mut v: SortedVec<Timestamp> = SortedVec::new();
        v.insert(30, false).unwrap();
        v.insert(10, false).unwrap();
        v.insert(20, false).unwrap();
        assert_eq!(v.as_slice(), &[10, 20, 30]);
        assert!(v.insert(20, false).is_err());
        v.insert(20, true).unwrap();
        assert_eq!(v.as_slice(), &[10, 20, 30]);
    }

    #[test]
    fn delete_range_reports_next_index() {
        let mut v: SortedVec<Timestamp> = SortedVec::new();
        for ts in [10, 20, 30, 40] {
            v.append(ts).unwrap();
        }
        let next = v.delete_range(1, 2).unwrap();
        assert_eq!(next, Some(1));
        assert_eq!(v.as_slice(), &[10, 40]);
        let next = v.delete_range(1, 1).unwrap();
        assert_eq!(next, None);
        assert_eq!(v.as_slice(), &[10]);
    }
}
