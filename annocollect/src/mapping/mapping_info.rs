use std::sync::Arc;

use crate::data_structs::annotation::SeqAlign;
use crate::data_structs::coords::{
    SeqLoc,
    SeqRange,
};
use crate::data_structs::Strand;

/// Payload produced by mapping an object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MappedObject {
    /// The object is reported in its own coordinates.
    #[default]
    None,
    Location(SeqLoc),
    /// Waiting for the conversion set to be resolved.
    ConversionPending,
    Align(Arc<SeqAlign>),
}

/// Mapped range, strand and payload of one found object.
///
/// Once the payload is a location or an alignment, the range and
/// strand describe exactly that payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotMappingInfo {
    total_range:  SeqRange,
    strand:       Strand,
    partial_from: bool,
    partial_to:   bool,
    mapped:       MappedObject,
}

impl AnnotMappingInfo {
    /// Info of an object reported where it is.
    pub fn unmapped(
        total_range: SeqRange,
        strand: Strand,
    ) -> Self {
        Self {
            total_range,
            strand,
            partial_from: false,
            partial_to: false,
            mapped: MappedObject::None,
        }
    }

    /// Info of an object whose mapping is deferred to a conversion set.
    pub fn pending(
        total_range: SeqRange,
        strand: Strand,
    ) -> Self {
        Self {
            mapped: MappedObject::ConversionPending,
            ..Self::unmapped(total_range, strand)
        }
    }

    pub fn total_range(&self) -> SeqRange {
        self.total_range
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn partial_from(&self) -> bool {
        self.partial_from
    }

    pub fn partial_to(&self) -> bool {
        self.partial_to
    }

    pub fn is_partial(&self) -> bool {
        self.partial_from || self.partial_to
    }

    pub fn mapped(&self) -> &MappedObject {
        &self.mapped
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.mapped, MappedObject::ConversionPending)
    }

    pub fn set_partial(
        &mut self,
        partial_from: bool,
        partial_to: bool,
    ) {
        self.partial_from |= partial_from;
        self.partial_to |= partial_to;
    }

    /// Replaces range and strand while keeping the object unmapped.
    pub fn set_total_range(
        &mut self,
        range: SeqRange,
        strand: Strand,
    ) {
        self.total_range = range;
        self.strand = strand;
        self.mapped = MappedObject::None;
    }

    /// Stores a mapped location; `range` and `strand` must describe it.
    pub fn set_mapped_location(
        &mut self,
        loc: SeqLoc,
        range: SeqRange,
        strand: Strand,
    ) {
        self.total_range = range;
        self.strand = strand;
        self.mapped = MappedObject::Location(loc);
    }

    pub fn set_mapped_align(
        &mut self,
        align: SeqAlign,
        range: SeqRange,
        strand: Strand,
    ) {
        self.total_range = range;
        self.strand = strand;
        self.mapped = MappedObject::Align(Arc::new(align));
    }

    /// Location carried by the payload, if any.
    pub fn mapped_location(&self) -> Option<&SeqLoc> {
        match &self.mapped {
            MappedObject::Location(loc) => Some(loc),
            _ => None,
        }
    }
}
