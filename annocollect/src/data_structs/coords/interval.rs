use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use super::SeqRange;
use crate::data_structs::enums::Strand;
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};

/// Represents an interval with a sequence id, start position, end position,
/// and strand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqInterval {
    id:     SeqIdStr,
    from:   PosType,
    to:     PosType,
    #[serde(default)]
    strand: Strand,
}

impl SeqInterval {
    /// Creates a new `SeqInterval`.
    pub fn new(
        id: SeqIdStr,
        from: PosType,
        to: PosType,
        strand: Strand,
    ) -> Self {
        assert!(
            from <= to,
            "Start position must be less than or equal to end position"
        );
        Self {
            id,
            from,
            to,
            strand,
        }
    }

    /// Returns the start position.
    pub fn from(&self) -> PosType {
        self.from
    }

    /// Returns the end position.
    pub fn to(&self) -> PosType {
        self.to
    }

    /// Returns the strand of the interval.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Returns the sequence id of the interval.
    pub fn id(&self) -> &SeqIdStr {
        &self.id
    }

    pub fn range(&self) -> SeqRange {
        SeqRange::new(self.from, self.to)
    }

    /// Returns the length of the interval.
    pub fn length(&self) -> PosType {
        self.to - self.from
    }

}

impl Display for SeqInterval {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{} ({})",
            self.id.as_str(),
            self.from,
            self.to,
            self.strand
        )
    }
}
