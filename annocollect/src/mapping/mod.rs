//! Coordinate conversion between sequences.
//!
//! [`SeqLocConversion`] maps positions, ranges and locations from a segment
//! of one sequence onto another and composes with further conversions when
//! sequences are nested. [`ConversionSet`] collects the conversions that
//! apply to an object during a pass and resolves them into one
//! [`AnnotMappingInfo`].

mod conversion;
mod conversion_set;
mod mapping_info;

pub use conversion::{
    ConvertedRange,
    SeqLocConversion,
};
pub use conversion_set::{
    ConversionSet,
    ObjectKey,
};
pub use mapping_info::{
    AnnotMappingInfo,
    MappedObject,
};

#[cfg(test)]
mod tests;
