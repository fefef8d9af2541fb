//! # annocollect
//!
//! `annocollect` finds annotation objects (features, alignments, graphs and
//! compact variation records) overlapping a region of a biological sequence.
//! Annotations may live on the sequence itself, on the sequences it is
//! assembled from, or behind indirection objects; every hit is mapped back
//! into the coordinates of the sequence the caller asked about, then sorted
//! and deduplicated.
//!
//! ## Key Features
//!
//! * **Interval indexes**: every container keeps one interval index per
//!   annotation name ([`AnnotIndex`]), with chunk stubs standing in for data
//!   that is loaded on first use.
//! * **Segment recursion**: sequences built from segments of other
//!   sequences ([`SegmentMap`]) are searched down to a configurable depth,
//!   composing coordinate conversions ([`SeqLocConversion`]) on the way.
//! * **Merged mapping**: an object crossing several segments is mapped once
//!   through all of them and reported as a single location
//!   ([`ConversionSet`]).
//! * **Stable ordering**: results are sorted by a deterministic comparator
//!   ([`ObjectRefOrder`]) and can be capped.
//! * **Lazy materialization**: compact table records are expanded into full
//!   features only when a caller asks for them ([`AnnotResultSet`]).
//!
//! ## Structure
//!
//! * [`data_structs`]: coordinates ([`SeqRange`], [`SeqInterval`],
//!   [`SeqLoc`]), annotation objects and the feature type table.
//! * [`source`]: containers, segment maps and the [`DataSource`] trait with
//!   the in-memory [`Scope`].
//! * [`mapping`]: coordinate conversions and per-object mapping results.
//! * [`collector`]: the selector, the collection engine and result handles.
//! * [`error`]: the [`CollectError`] type.
//!
//! ## Usage
//!
//! ```
//! use annocollect::prelude::*;
//!
//! let mut scope = Scope::new();
//! scope.add_sequence(&["chr1"], None, None);
//! let gene = SeqFeature::new(
//!     FeatSubtype::Gene,
//!     SeqInterval::new("chr1".into(), 1000, 2000, Strand::Forward).into(),
//! );
//! scope.add_container(
//!     Container::builder(1)
//!         .owns("chr1")
//!         .with_objects(AnnotName::Unnamed, [AnnotObject::from(gene)])
//!         .build(),
//! );
//!
//! let selector = AnnotSelector::default();
//! let result = AnnotCollector::new(&scope, &selector)
//!     .collect_by_single_sequence(
//!         &"chr1".into(),
//!         SeqRange::new(1500, 1600),
//!         Strand::None,
//!     )
//!     .unwrap();
//! assert_eq!(result.len(), 1);
//! assert_eq!(result.get(0).unwrap().mapped_range(), SeqRange::new(1000, 2000));
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod collector;
pub mod data_structs;
pub mod error;
pub mod mapping;
pub mod prelude;
pub mod source;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
