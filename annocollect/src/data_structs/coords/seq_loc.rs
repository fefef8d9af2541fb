use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use super::{
    SeqInterval,
    SeqRange,
};
use crate::data_structs::enums::Strand;
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocShapeError {
    #[error("packed interval location has no intervals")]
    EmptyPacked,
    #[error("mixed location has no parts")]
    EmptyMix,
    #[error("interval {id}:{from}-{to} ends before it starts")]
    ReversedInterval {
        id:   SeqIdStr,
        from: PosType,
        to:   PosType,
    },
}

/// Location of an annotation: a single interval or an ordered collection of
/// intervals, possibly on several sequences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SeqLoc {
    Empty { id: SeqIdStr },
    Int(SeqInterval),
    Packed { intervals: Vec<SeqInterval> },
    Mix { parts: Vec<SeqLoc> },
}

impl SeqLoc {
    /// Builds the simplest location holding the given intervals.
    pub fn from_intervals(mut intervals: Vec<SeqInterval>) -> Option<SeqLoc> {
        match intervals.len() {
            0 => None,
            1 => intervals.pop().map(SeqLoc::Int),
            _ => Some(SeqLoc::Packed { intervals }),
        }
    }

    /// Checks that packed and mixed locations are not degenerate and that
    /// no interval ends before it starts.
    pub fn validate(&self) -> Result<(), LocShapeError> {
        match self {
            SeqLoc::Empty { .. } => Ok(()),
            SeqLoc::Int(interval) => check_interval(interval),
            SeqLoc::Packed { intervals } if intervals.is_empty() => {
                Err(LocShapeError::EmptyPacked)
            },
            SeqLoc::Packed { intervals } => intervals.iter().try_for_each(check_interval),
            SeqLoc::Mix { parts } if parts.is_empty() => {
                Err(LocShapeError::EmptyMix)
            },
            SeqLoc::Mix { parts } => parts.iter().try_for_each(SeqLoc::validate),
        }
    }

    /// All intervals in location order.
    pub fn intervals(&self) -> Vec<&SeqInterval> {
        let mut out = Vec::new();
        self.collect_intervals(&mut out);
        out
    }

    fn collect_intervals<'a>(
        &'a self,
        out: &mut Vec<&'a SeqInterval>,
    ) {
        match self {
            SeqLoc::Empty { .. } => {},
            SeqLoc::Int(interval) => out.push(interval),
            SeqLoc::Packed { intervals } => out.extend(intervals.iter()),
            SeqLoc::Mix { parts } => {
                parts
                    .iter()
                    .for_each(|p| p.collect_intervals(out))
            },
        }
    }

    /// Distinct sequence ids in order of first appearance.
    pub fn seq_ids(&self) -> Vec<SeqIdStr> {
        let mut ids = self
            .intervals()
            .into_iter()
            .map(|i| i.id().clone())
            .unique()
            .collect_vec();
        if ids.is_empty() {
            if let SeqLoc::Empty { id } = self {
                ids.push(id.clone());
            }
        }
        ids
    }

    pub fn is_multi_id(&self) -> bool {
        self.seq_ids().len() > 1
    }

    pub fn strand(&self) -> Strand {
        self.intervals()
            .iter()
            .map(|i| i.strand())
            .reduce(Strand::merge)
            .unwrap_or_default()
    }

    /// Extent of the location on any sequence.
    pub fn total_range(&self) -> Option<(SeqRange, Strand)> {
        extent(&self.intervals())
    }

    /// Extent of the pieces lying on one of `ids`.
    pub fn total_range_on(
        &self,
        ids: &[SeqIdStr],
    ) -> Option<(SeqRange, Strand)> {
        let pieces = self
            .intervals()
            .into_iter()
            .filter(|i| ids.contains(i.id()))
            .collect_vec();
        extent(&pieces)
    }

    pub fn is_circular(&self) -> bool {
        self.total_range()
            .map(|(r, _)| r.is_circular())
            .unwrap_or(false)
    }
}

impl From<SeqInterval> for SeqLoc {
    fn from(value: SeqInterval) -> Self {
        SeqLoc::Int(value)
    }
}

/// Computes the covering range of consecutive pieces. Pieces that step back
/// against their strand direction wrap over the origin, producing a range
/// with `from > to`.
fn extent(pieces: &[&SeqInterval]) -> Option<(SeqRange, Strand)> {
    let first = pieces.first()?;
    let last = pieces.last()?;
    let strand = pieces
        .iter()
        .map(|i| i.strand())
        .reduce(Strand::merge)
        .unwrap_or_default();
    let reverse = strand.is_reverse();

    let wraps = pieces.windows(2).any(|w| {
        if reverse {
            w[1].from() > w[0].from()
        }
        else {
            w[1].from() < w[0].from()
        }
    });
    if wraps {
        let (head, tail) = if reverse { (last, first) } else { (first, last) };
        let range = SeqRange::wrapped(head.from(), tail.to());
        if range.is_circular() {
            return Some((range, strand));
        }
    }

    let from = pieces.iter().map(|i| i.from()).min()?;
    let to = pieces.iter().map(|i| i.to()).max()?;
    Some((SeqRange::new(from, to), strand))
}

fn check_interval(interval: &SeqInterval) -> Result<(), LocShapeError> {
    if interval.from() > interval.to() {
        return Err(LocShapeError::ReversedInterval {
            id:   interval.id().clone(),
            from: interval.from(),
            to:   interval.to(),
        });
    }
    Ok(())
}
