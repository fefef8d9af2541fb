//! This module contains the core data structures used throughout the
//! `annocollect` crate for describing sequences, locations and the annotation
//! objects that are stored in containers.
//!
//! Key components of this module include:
//!
//! - [`annotation`]: annotation payloads. [`SeqFeature`], [`SeqAlign`],
//!   [`SeqGraph`], the [`AnnotLocs`] indirection object and the compact
//!   [`SnpRecord`] table surrogate, all wrapped by the [`AnnotObject`] tagged
//!   variant. Feature types and the [`FeatTypeOrder`] sorting table live here
//!   too.
//! - [`coords`]: [`SeqRange`] (half-open, possibly wrapping),
//!   [`SeqInterval`] and [`SeqLoc`].
//! - Common enumerations used by the selector and the collector, such as
//!   [`Strand`], [`AnnotKind`] and [`SortOrder`].
//! - [`typedef`]: type aliases for positions, shifts, sequence ids and
//!   container/object/chunk identifiers.
//!
//! [`SeqFeature`]: annotation::SeqFeature
//! [`SeqAlign`]: annotation::SeqAlign
//! [`SeqGraph`]: annotation::SeqGraph
//! [`AnnotLocs`]: annotation::AnnotLocs
//! [`SnpRecord`]: annotation::SnpRecord
//! [`AnnotObject`]: annotation::AnnotObject
//! [`FeatTypeOrder`]: annotation::FeatTypeOrder
//! [`SeqRange`]: coords::SeqRange
//! [`SeqInterval`]: coords::SeqInterval
//! [`SeqLoc`]: coords::SeqLoc

pub mod annotation;
pub mod coords;
mod enums;
pub mod typedef;

pub use enums::{
    AnnotKind,
    MappedField,
    OverlapType,
    ResolveMethod,
    SortOrder,
    Strand,
    UnresolvedPolicy,
};
