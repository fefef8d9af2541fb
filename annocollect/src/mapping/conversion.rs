use std::fmt::Display;

use itertools::Itertools;

use crate::data_structs::coords::{
    SeqInterval,
    SeqLoc,
    SeqRange,
};
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
    ShiftType,
};
use crate::source::Segment;

/// Range produced by a conversion together with the clipping it needed.
/// Flags are expressed in destination orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertedRange {
    pub range:        SeqRange,
    pub partial_from: bool,
    pub partial_to:   bool,
}

impl ConvertedRange {
    pub fn is_exact(&self) -> bool {
        !self.partial_from && !self.partial_to
    }
}

/// Affine coordinate transform from `src_range` on `src_id` to `dst_id`.
///
/// A forward conversion maps position `p` to `p + shift`; a reversing one
/// maps it to `shift - p`, so a half-open `[a, b)` lands on
/// `[shift - b + 1, shift - a + 1)`. Positions outside `src_range` are not
/// mapped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeqLocConversion {
    src_id:    SeqIdStr,
    src_range: SeqRange,
    dst_id:    SeqIdStr,
    shift:     ShiftType,
    reverse:   bool,
}

impl SeqLocConversion {
    pub fn new(
        src_id: SeqIdStr,
        src_range: SeqRange,
        dst_id: SeqIdStr,
        shift: ShiftType,
        reverse: bool,
    ) -> Self {
        assert!(
            !src_range.is_circular(),
            "Conversion source range must not wrap"
        );
        Self {
            src_id,
            src_range,
            dst_id,
            shift,
            reverse,
        }
    }

    /// Conversion of a sequence onto itself.
    pub fn identity(id: &SeqIdStr) -> Self {
        Self::new(id.clone(), SeqRange::whole(), id.clone(), 0, false)
    }

    /// Conversion from the referenced sequence of `segment` to the composed
    /// sequence `master`. `None` for gaps.
    pub fn from_segment(
        segment: &Segment,
        master: &SeqIdStr,
    ) -> Option<Self> {
        let (ref_id, ref_range, reversed) = segment.referenced()?;
        let m = segment.position() as ShiftType;
        let r = ref_range.from() as ShiftType;
        let shift = if reversed {
            m + r + segment.length() as ShiftType - 1
        }
        else {
            m - r
        };
        Some(Self::new(
            ref_id.clone(),
            ref_range,
            master.clone(),
            shift,
            reversed,
        ))
    }

    /// Conversion that maps `target` back onto `location`. Used for
    /// indirection objects; the shorter of the two lengths is mapped.
    pub fn between(
        target: &SeqInterval,
        location: &SeqInterval,
    ) -> Self {
        let length = target.length().min(location.length());
        let reverse = target.strand().is_reverse() != location.strand().is_reverse();
        let src_range = SeqRange::new(target.from(), target.from() + length);
        let a = location.from() as ShiftType;
        let c = target.from() as ShiftType;
        let shift = if reverse {
            a + c + length as ShiftType - 1
        }
        else {
            a - c
        };
        Self::new(
            target.id().clone(),
            src_range,
            location.id().clone(),
            shift,
            reverse,
        )
    }

    /// The same transform read from another spelling of the source id.
    pub fn for_source(
        &self,
        id: &SeqIdStr,
    ) -> Self {
        Self {
            src_id: id.clone(),
            ..self.clone()
        }
    }

    /// Conversion mapping the image back onto the source.
    pub fn inverse(&self) -> Option<Self> {
        let image = self.map_linear(self.src_range)?;
        let shift = if self.reverse { self.shift } else { -self.shift };
        Some(Self::new(
            self.dst_id.clone(),
            image,
            self.src_id.clone(),
            shift,
            self.reverse,
        ))
    }

    pub fn src_id(&self) -> &SeqIdStr {
        &self.src_id
    }

    pub fn dst_id(&self) -> &SeqIdStr {
        &self.dst_id
    }

    pub fn src_range(&self) -> SeqRange {
        self.src_range
    }

    pub fn shift(&self) -> ShiftType {
        self.shift
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn is_identity(&self) -> bool {
        self.src_id == self.dst_id && self.shift == 0 && !self.reverse
    }

    pub fn convert_pos(
        &self,
        pos: PosType,
    ) -> Option<PosType> {
        let r = self.src_range;
        if pos < r.from() || pos >= r.to() {
            return None;
        }
        let p = pos as ShiftType;
        let mapped = if self.reverse {
            self.shift - p
        }
        else {
            p + self.shift
        };
        PosType::try_from(mapped).ok()
    }

    /// Maps a linear range without clipping. The range must lie inside the
    /// source range.
    fn map_linear(
        &self,
        range: SeqRange,
    ) -> Option<SeqRange> {
        let a = range.from() as ShiftType;
        let b = range.to() as ShiftType;
        let (from, to) = if self.reverse {
            (self.shift - b + 1, self.shift - a + 1)
        }
        else {
            (a + self.shift, b + self.shift)
        };
        let from = PosType::try_from(from).ok()?;
        let to = PosType::try_from(to).ok()?;
        (from <= to).then(|| SeqRange::new(from, to))
    }

    /// Clips `range` to the source range and maps it. Wrapping ranges are
    /// mapped part by part and must hit a single part.
    pub fn convert_range(
        &self,
        range: &SeqRange,
    ) -> Option<ConvertedRange> {
        let src = self.src_range;
        let clipped = range.parts().into_iter().find_map(|part| {
            if part.is_empty() {
                // Empty ranges map when they sit inside the source range.
                (src.from() <= part.from() && part.from() < src.to())
                    .then_some((part, part))
            }
            else {
                part.intersection(&src).map(|c| (part, c))
            }
        });
        let (part, clipped) = clipped?;
        let (mut partial_from, mut partial_to) =
            (clipped.from() > part.from(), clipped.to() < part.to());
        if self.reverse {
            std::mem::swap(&mut partial_from, &mut partial_to);
        }
        Some(ConvertedRange {
            range: self.map_linear(clipped)?,
            partial_from,
            partial_to,
        })
    }

    /// Maps one interval. `None` if it is on another sequence or outside
    /// the source range.
    pub fn convert_interval(
        &self,
        interval: &SeqInterval,
    ) -> Option<(SeqInterval, ConvertedRange)> {
        if interval.id() != &self.src_id {
            return None;
        }
        let converted = self.convert_range(&interval.range())?;
        let mapped = SeqInterval::new(
            self.dst_id.clone(),
            converted.range.from(),
            converted.range.to(),
            interval.strand().flipped(self.reverse),
        );
        Some((mapped, converted))
    }

    /// Checks if every interval of `loc` is mapped without clipping.
    pub fn covers(
        &self,
        loc: &SeqLoc,
    ) -> bool {
        let intervals = loc.intervals();
        !intervals.is_empty()
            && intervals.iter().all(|iv| {
                iv.id() == &self.src_id && self.src_range.contains(&iv.range())
            })
    }

    /// Maps every piece of `loc` that lies on the source; other pieces are
    /// dropped. Piece order is kept.
    pub fn convert_loc(
        &self,
        loc: &SeqLoc,
    ) -> Option<(SeqLoc, bool, bool)> {
        let intervals = loc.intervals();
        let mapped = intervals
            .iter()
            .map(|iv| self.convert_interval(iv))
            .collect_vec();
        let first = mapped.iter().position(Option::is_some)?;
        let last = mapped.iter().rposition(Option::is_some)?;
        let partial_from = first > 0
            || mapped[first]
                .as_ref()
                .is_some_and(|(_, c)| c.partial_from || c.partial_to);
        let partial_to = last + 1 < mapped.len()
            || mapped[last]
                .as_ref()
                .is_some_and(|(_, c)| c.partial_from || c.partial_to);
        let pieces = mapped.into_iter().flatten().map(|(iv, _)| iv).collect_vec();
        let loc = SeqLoc::from_intervals(pieces)?;
        Some((loc, partial_from, partial_to))
    }

    /// Composes two conversions: the result maps like `self` followed by
    /// `next`. `None` when the image of `self` misses the source of `next`.
    pub fn combine(
        &self,
        next: &SeqLocConversion,
    ) -> Option<SeqLocConversion> {
        if self.dst_id != next.src_id {
            return None;
        }
        let image = self.map_linear(self.src_range)?;
        let overlap = image.intersection(&next.src_range)?;
        // Forward and reversing maps are both their own inverse shape.
        let preimage = {
            let a = overlap.from() as ShiftType;
            let b = overlap.to() as ShiftType;
            let (from, to) = if self.reverse {
                (self.shift - b + 1, self.shift - a + 1)
            }
            else {
                (a - self.shift, b - self.shift)
            };
            SeqRange::new(
                PosType::try_from(from).ok()?,
                PosType::try_from(to).ok()?,
            )
        };
        let (shift, reverse) = match (self.reverse, next.reverse) {
            (false, false) => (self.shift + next.shift, false),
            (false, true) => (next.shift - self.shift, true),
            (true, false) => (self.shift + next.shift, true),
            (true, true) => (next.shift - self.shift, false),
        };
        Some(SeqLocConversion::new(
            self.src_id.clone(),
            preimage,
            next.dst_id.clone(),
            shift,
            reverse,
        ))
    }
}

impl Display for SeqLocConversion {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {} ({}{})",
            self.src_id.as_str(),
            self.src_range,
            self.dst_id.as_str(),
            if self.reverse { "-" } else { "+" },
            self.shift
        )
    }
}
