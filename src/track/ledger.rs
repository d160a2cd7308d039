use std::{
    collections::{btree_map::Entry, BTreeMap},
    ops::Range,
};

/// Sample sizes keyed on absolute decode timestamp
/// (unscaled, in track time scale units).
///
/// The first size recorded for a timestamp is kept,
/// so that a fragment delivered twice is only counted once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleLedger(BTreeMap<u64, u32>);

impl SampleLedger {
    /// Records `size` at `timestamp` unless the timestamp
    /// is already present. Returns `true` if inserted.
    pub fn insert_if_absent(&mut self, timestamp: u64, size: u32) -> bool {
        match self.0.entry(timestamp) {
            Entry::Vacant(e) => {
                e.insert(size);
                true
            },
            Entry::Occupied(_) => false,
        }
    }

    /// Size recorded for `timestamp`.
    pub fn get(&self, timestamp: u64) -> Option<u32> {
        self.0.get(&timestamp).copied()
    }

    /// `(timestamp, size)` for all timestamps in `range`, ascending.
    /// A reversed range is empty.
    pub fn range(&self, range: Range<u64>) -> impl Iterator<Item = (u64, u32)> + '_ {
        let end = range.end.max(range.start);
        self.0.range(range.start .. end).map(|(t, s)| (*t, *s))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.0.iter().map(|(t, s)| (*t, *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
