use hashbrown::HashMap;
use itertools::Itertools;
use rust_lapper::{
    Interval,
    Lapper,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::annotation::AnnotTypeKey;
use crate::data_structs::coords::SeqRange;
use crate::data_structs::typedef::{
    ChunkId,
    ObjectIndex,
    PosType,
    SeqIdStr,
};

/// Value stored in a range index: either a materialized object or a stub
/// standing in for a chunk that has not been loaded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexEntry {
    Object(ObjectIndex),
    Stub(ChunkId),
}

pub type IndexKey = (SeqIdStr, AnnotTypeKey);

/// Interval index keyed by sequence id and annotation type.
#[derive(Clone, Debug, Default)]
pub struct RangeIndex {
    inner: HashMap<IndexKey, Lapper<PosType, IndexEntry>>,
}

impl RangeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. Empty ranges are indexed as one position so that they
    /// are still found by overlapping queries.
    pub fn insert(
        &mut self,
        id: SeqIdStr,
        key: AnnotTypeKey,
        range: SeqRange,
        entry: IndexEntry,
    ) {
        let lapper = self
            .inner
            .entry((id, key))
            .or_insert_with(|| Lapper::new(vec![]));
        for part in range.parts() {
            lapper.insert(Interval {
                start: part.from(),
                stop:  part.to().max(part.from().saturating_add(1)),
                val:   entry,
            });
        }
    }

    /// Entries overlapping `range` (which may wrap) under `(id, key)`. An
    /// entry indexed under several intervals may be reported more than once.
    pub fn find(
        &self,
        id: &SeqIdStr,
        key: AnnotTypeKey,
        range: &SeqRange,
    ) -> Vec<IndexEntry> {
        let Some(lapper) = self.inner.get(&(id.clone(), key)) else {
            return Vec::new();
        };
        range
            .parts()
            .iter()
            .flat_map(|part| {
                lapper
                    .find(part.from(), part.to().max(part.from().saturating_add(1)))
                    .map(|iv| iv.val)
            })
            .collect_vec()
    }

    /// Type keys indexed for `id`, in key order.
    pub fn keys_for(
        &self,
        id: &SeqIdStr,
    ) -> Vec<AnnotTypeKey> {
        self.inner
            .keys()
            .filter(|(seq, _)| seq == id)
            .map(|(_, key)| *key)
            .sorted()
            .collect_vec()
    }

    pub fn seq_ids(&self) -> Vec<SeqIdStr> {
        self.inner
            .keys()
            .map(|(id, _)| id.clone())
            .unique()
            .collect_vec()
    }

    /// Every object index stored, stubs excluded.
    pub fn objects(&self) -> Vec<ObjectIndex> {
        self.inner
            .values()
            .flat_map(|lapper| lapper.iter())
            .filter_map(|iv| {
                match iv.val {
                    IndexEntry::Object(idx) => Some(idx),
                    IndexEntry::Stub(_) => None,
                }
            })
            .unique()
            .collect_vec()
    }

    /// Distinct chunks still referenced by stubs.
    pub fn stubs(&self) -> Vec<ChunkId> {
        self.inner
            .values()
            .flat_map(|lapper| lapper.iter())
            .filter_map(|iv| {
                match iv.val {
                    IndexEntry::Stub(chunk) => Some(chunk),
                    IndexEntry::Object(_) => None,
                }
            })
            .unique()
            .sorted()
            .collect_vec()
    }

    /// Drops the stubs of `chunk`, rebuilding only the affected lappers.
    pub fn remove_stubs(
        &mut self,
        chunk: ChunkId,
    ) {
        let stub = IndexEntry::Stub(chunk);
        for lapper in self.inner.values_mut() {
            if lapper.intervals.iter().any(|iv| iv.val == stub) {
                let kept = lapper
                    .intervals
                    .iter()
                    .filter(|iv| iv.val != stub)
                    .cloned()
                    .collect_vec();
                *lapper = Lapper::new(kept);
            }
        }
        self.inner.retain(|_, lapper| !lapper.is_empty());
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
