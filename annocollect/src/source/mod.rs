//! Data source layer consumed by the collector.
//!
//! - [`Container`]: a load-once bundle of annotation objects with an interval
//!   index per annotation name, chunk stubs for data that has not been loaded
//!   yet, an annotation read lock and a user lock counter.
//! - [`SegmentMap`]: composition of a sequence from segments of other
//!   sequences.
//! - [`DataSource`]: synonym lookup, container resolution, segment maps and
//!   chunk loading. [`Scope`] is the in-memory implementation, loadable from
//!   a JSON [`ScopeDescription`].

mod container;
mod index;
mod scope;
mod segment;

pub use container::{
    AnnotIndex,
    AnnotState,
    Container,
    ContainerBuilder,
    ContainerLock,
};
pub use index::{
    IndexEntry,
    IndexKey,
    RangeIndex,
};
pub use scope::{
    AnnotDescription,
    ContainerDescription,
    ContainerScope,
    DataSource,
    Scope,
    ScopeDescription,
    SequenceDescription,
    SynonymSet,
};
pub use segment::{
    Segment,
    SegmentKind,
    SegmentMap,
};
