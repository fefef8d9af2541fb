use indexmap::IndexMap;
use itertools::Itertools;
use log::trace;

use super::{
    AnnotMappingInfo,
    ConvertedRange,
    SeqLocConversion,
};
use crate::data_structs::annotation::{
    AnnotObject,
    SeqAlign,
};
use crate::data_structs::coords::{
    SeqInterval,
    SeqLoc,
};
use crate::data_structs::typedef::{
    ContainerId,
    ObjectIndex,
    SeqIdStr,
};
use crate::data_structs::MappedField;
use crate::error::{
    CollectError,
    CollectResult,
};

/// Identity of an object across containers.
pub type ObjectKey = (ContainerId, ObjectIndex);

/// Conversions collected per object during a pass and applied together at
/// the end of it. Several partial conversions of one object merge into one
/// mapped location instead of overwriting each other.
#[derive(Debug, Clone, Default)]
pub struct ConversionSet {
    entries: IndexMap<ObjectKey, Vec<SeqLocConversion>>,
}

impl ConversionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `conversion` for `key`. Returns `true` when the key is new.
    pub fn add(
        &mut self,
        key: ObjectKey,
        conversion: SeqLocConversion,
    ) -> bool {
        let is_new = !self.entries.contains_key(&key);
        let queued = self.entries.entry(key).or_default();
        if !queued.contains(&conversion) {
            queued.push(conversion);
        }
        is_new
    }

    pub fn conversions(
        &self,
        key: &ObjectKey,
    ) -> &[SeqLocConversion] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies every conversion queued for `key` to `object` and stores the
    /// result in `info`.
    pub fn resolve(
        &self,
        key: ObjectKey,
        object: &AnnotObject,
        field: MappedField,
        info: &mut AnnotMappingInfo,
    ) -> CollectResult<()> {
        let conversions = self.conversions(&key);
        let failure = |reason: String| {
            CollectError::ConversionFailure {
                container: key.0,
                index: key.1,
                reason,
            }
        };
        let empty = CollectError::EmptyMappingResult {
            container: key.0,
            index:     key.1,
        };
        if conversions.is_empty() {
            return Err(failure("no conversion queued".into()));
        }
        let loc = object
            .located_by(field)
            .ok_or_else(|| failure("object has no product".into()))?;
        loc.validate().map_err(|e| failure(e.to_string()))?;

        let dst_ids = conversions
            .iter()
            .map(|c| c.dst_id().clone())
            .unique()
            .collect_vec();

        if conversions.iter().all(SeqLocConversion::is_identity) {
            let (range, strand) = loc.total_range_on(&dst_ids).ok_or(empty)?;
            info.set_total_range(range, strand);
            trace!("Object {:?} kept on {:?}", key, dst_ids);
            return Ok(());
        }

        if let AnnotObject::Align(align) = object {
            return resolve_align(align, conversions, &dst_ids, info).ok_or(empty);
        }

        let (mapped, partial_from, partial_to) =
            map_location(&loc, conversions).ok_or(empty.clone())?;
        let (range, strand) = mapped.total_range_on(&dst_ids).ok_or(empty)?;
        info.set_mapped_location(mapped, range, strand);
        info.set_partial(partial_from, partial_to);
        trace!("Object {:?} mapped to {}", key, range);
        Ok(())
    }
}

/// Maps each interval through every conversion covering a part of it.
/// Sub-pieces of one interval are kept in its strand order.
fn map_location(
    loc: &SeqLoc,
    conversions: &[SeqLocConversion],
) -> Option<(SeqLoc, bool, bool)> {
    let intervals = loc.intervals();
    let per_interval = intervals
        .iter()
        .map(|iv| {
            conversions
                .iter()
                .filter_map(|c| {
                    c.convert_interval(iv)
                        .map(|(mapped, converted)| (c.is_reverse(), mapped, converted))
                })
                .sorted_by_key(|(_, mapped, _)| mapped.from())
                .collect_vec()
        })
        .collect_vec();

    let first = per_interval.iter().position(|p| !p.is_empty())?;
    let last = per_interval.iter().rposition(|p| !p.is_empty())?;
    let reverse = per_interval[first][0].0;
    let (lead_dropped, tail_dropped) = (first > 0, last + 1 < per_interval.len());
    let (mut partial_from, mut partial_to) = if reverse {
        (tail_dropped, lead_dropped)
    }
    else {
        (lead_dropped, tail_dropped)
    };

    let mut pieces: Vec<(SeqInterval, ConvertedRange)> = Vec::new();
    for (iv, mapped) in intervals.iter().zip(per_interval) {
        let ordered = mapped.into_iter().map(|(_, m, c)| (m, c));
        // Within a minus strand interval the biological order is descending.
        if iv.strand().is_reverse() {
            pieces.extend(ordered.rev());
        }
        else {
            pieces.extend(ordered);
        }
    }
    let lowest = pieces.iter().min_by_key(|(m, _)| m.from()).map(|(_, c)| *c)?;
    let highest = pieces.iter().max_by_key(|(m, _)| m.to()).map(|(_, c)| *c)?;
    partial_from |= lowest.partial_from;
    partial_to |= highest.partial_to;

    let loc = SeqLoc::from_intervals(pieces.into_iter().map(|(m, _)| m).collect_vec())?;
    Some((loc, partial_from, partial_to))
}

/// Rows on a conversion source are replaced by the extent of their mapped
/// pieces; other rows are left untouched.
fn resolve_align(
    align: &SeqAlign,
    conversions: &[SeqLocConversion],
    dst_ids: &[SeqIdStr],
    info: &mut AnnotMappingInfo,
) -> Option<()> {
    let mut any_mapped = false;
    let mut partial = (false, false);
    let rows = align
        .rows()
        .iter()
        .map(|row| {
            let pieces = conversions
                .iter()
                .filter_map(|c| c.convert_interval(row))
                .collect_vec();
            if pieces.is_empty() {
                return row.clone();
            }
            any_mapped = true;
            let from = pieces.iter().map(|(m, _)| m.from()).min().unwrap_or(0);
            let to = pieces.iter().map(|(m, _)| m.to()).max().unwrap_or(from);
            partial.0 |= pieces.iter().any(|(_, c)| c.partial_from);
            partial.1 |= pieces.iter().any(|(_, c)| c.partial_to);
            SeqInterval::new(pieces[0].0.id().clone(), from, to, pieces[0].0.strand())
        })
        .collect_vec();
    if !any_mapped {
        return None;
    }
    let mapped = align.remapped(rows);
    let (range, strand) = mapped.location().total_range_on(dst_ids)?;
    info.set_mapped_align(mapped, range, strand);
    info.set_partial(partial.0, partial.1);
    Some(())
}
