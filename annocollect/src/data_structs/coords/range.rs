use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::typedef::PosType;

/// Half-open range `[from, to)` on a single sequence.
///
/// A range with `from > to` wraps over the origin of a circular sequence and
/// covers `[from, end-of-sequence)` followed by `[0, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqRange {
    from: PosType,
    to:   PosType,
}

impl SeqRange {
    /// Creates a new non-wrapping range.
    pub fn new(
        from: PosType,
        to: PosType,
    ) -> Self {
        assert!(
            from <= to,
            "Start position must be less than or equal to end position"
        );
        Self { from, to }
    }

    /// Creates a range that is allowed to wrap over the origin.
    pub fn wrapped(
        from: PosType,
        to: PosType,
    ) -> Self {
        Self { from, to }
    }

    /// The range covering every position of a sequence.
    pub fn whole() -> Self {
        Self {
            from: 0,
            to:   PosType::MAX,
        }
    }

    pub fn from(&self) -> PosType {
        self.from
    }

    pub fn to(&self) -> PosType {
        self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }

    pub fn is_circular(&self) -> bool {
        self.from > self.to
    }

    /// Length of a non-wrapping range. Wrapping ranges have no length
    /// without knowing the sequence length.
    pub fn length(&self) -> Option<PosType> {
        (!self.is_circular()).then(|| self.to - self.from)
    }

    /// Splits a wrapping range into its two linear parts.
    pub fn parts(&self) -> Vec<SeqRange> {
        if self.is_circular() {
            vec![
                SeqRange::new(self.from, PosType::MAX),
                SeqRange::new(0, self.to),
            ]
        }
        else {
            vec![*self]
        }
    }

    pub fn intersects(
        &self,
        other: &SeqRange,
    ) -> bool {
        self.parts().iter().any(|a| {
            other
                .parts()
                .iter()
                .any(|b| a.from < b.to && b.from < a.to)
        })
    }

    /// Intersection of two linear ranges.
    pub fn intersection(
        &self,
        other: &SeqRange,
    ) -> Option<SeqRange> {
        if self.is_circular() || other.is_circular() {
            return None;
        }
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (from < to).then(|| SeqRange::new(from, to))
    }

    /// Union of two linear ranges that overlap or touch. Wrapping or
    /// disjoint ranges have no single-range union.
    pub fn union(
        &self,
        other: &SeqRange,
    ) -> Option<SeqRange> {
        if self.is_circular() || other.is_circular() {
            return None;
        }
        (self.from <= other.to && other.from <= self.to)
            .then(|| SeqRange::new(self.from.min(other.from), self.to.max(other.to)))
    }

    /// Checks if `other` lies fully inside this linear range.
    pub fn contains(
        &self,
        other: &SeqRange,
    ) -> bool {
        !self.is_circular()
            && !other.is_circular()
            && self.from <= other.from
            && other.to <= self.to
    }
}

impl From<std::ops::Range<PosType>> for SeqRange {
    fn from(value: std::ops::Range<PosType>) -> Self {
        SeqRange::new(value.start, value.end)
    }
}

impl Display for SeqRange {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}
