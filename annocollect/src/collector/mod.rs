//! Region-based annotation collection.
//!
//! [`AnnotCollector`] walks the containers of a [`DataSource`] for a region,
//! follows indirection objects and segments down to the configured depth,
//! maps every hit back into the caller's coordinates and returns an
//! [`AnnotResultSet`] ordered by [`ObjectRefOrder`].
//!
//! What is searched and how is configured by an [`AnnotSelector`].
//!
//! [`DataSource`]: crate::source::DataSource

mod compare;
mod engine;
mod object_ref;
mod result;
mod selector;

pub use compare::{
    compare_identity,
    ObjectRefOrder,
};
pub use engine::{
    location_map,
    AnnotCollector,
    LocationMap,
};
pub use object_ref::AnnotObjectRef;
pub use result::{
    AnnotItem,
    AnnotResultSet,
};
pub use selector::{
    AnnotSelector,
    SearchLimit,
};

#[cfg(test)]
mod tests;
