use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::coords::SeqRange;
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};

/// Target of a segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SegmentKind {
    Gap,
    /// `[from, from + length)` of sequence `id`, optionally reverse
    /// complemented.
    Ref {
        id:       SeqIdStr,
        from:     PosType,
        #[serde(default)]
        reversed: bool,
    },
}

/// One piece of a sequence defined by composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    position: PosType,
    length:   PosType,
    #[serde(flatten)]
    kind:     SegmentKind,
}

impl Segment {
    pub fn gap(
        position: PosType,
        length: PosType,
    ) -> Self {
        Self {
            position,
            length,
            kind: SegmentKind::Gap,
        }
    }

    pub fn reference(
        position: PosType,
        length: PosType,
        id: &str,
        from: PosType,
        reversed: bool,
    ) -> Self {
        Self {
            position,
            length,
            kind: SegmentKind::Ref {
                id: id.into(),
                from,
                reversed,
            },
        }
    }

    pub fn position(&self) -> PosType {
        self.position
    }

    pub fn length(&self) -> PosType {
        self.length
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    /// Checks that both ends of the segment fit into a position.
    pub fn is_valid(&self) -> bool {
        let master = self.position.checked_add(self.length).is_some();
        match &self.kind {
            SegmentKind::Gap => master,
            SegmentKind::Ref { from, .. } => master && from.checked_add(self.length).is_some(),
        }
    }

    /// Range covered on the composed sequence.
    pub fn master_range(&self) -> SeqRange {
        SeqRange::new(self.position, self.position + self.length)
    }

    /// Referenced sequence and range, `None` for gaps.
    pub fn referenced(&self) -> Option<(&SeqIdStr, SeqRange, bool)> {
        match &self.kind {
            SegmentKind::Gap => None,
            SegmentKind::Ref { id, from, reversed } => {
                Some((id, SeqRange::new(*from, *from + self.length), *reversed))
            },
        }
    }
}

/// Description of a sequence as an ordered composition of segments.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentMap {
    segments: Vec<Segment>,
}

impl SegmentMap {
    pub fn new(segments: Vec<Segment>) -> Self {
        let segments = segments
            .into_iter()
            .sorted_by_key(|s| s.position)
            .collect_vec();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Length of the composed sequence.
    pub fn length(&self) -> PosType {
        self.segments
            .last()
            .map(|s| s.position + s.length)
            .unwrap_or(0)
    }

    /// Segments intersecting `range`, in position order. A wrapping range
    /// is walked from its start to the end of the sequence and then from the
    /// origin.
    pub fn overlapping(
        &self,
        range: &SeqRange,
    ) -> Vec<&Segment> {
        range
            .parts()
            .iter()
            .flat_map(|part| {
                self.segments
                    .iter()
                    .filter(move |s| s.length > 0 && s.master_range().intersects(part))
            })
            .collect_vec()
    }
}
