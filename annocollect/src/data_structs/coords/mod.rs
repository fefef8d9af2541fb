//! This module defines data structures for representing genomic coordinates.
//!
//! - [`SeqRange`]: a half-open range on one sequence, allowed to wrap over the
//!   origin of circular sequences.
//! - [`SeqInterval`]: a range bound to a sequence id and a strand.
//! - [`SeqLoc`]: the location of an annotation, built from one or more
//!   intervals possibly on different sequences.

mod interval;
mod range;
mod seq_loc;

pub use interval::SeqInterval;
pub use range::SeqRange;
pub use seq_loc::{
    LocShapeError,
    SeqLoc,
};
