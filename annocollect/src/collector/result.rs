use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::AnnotObjectRef;
use crate::data_structs::annotation::{
    AnnotTypeKey,
    SeqAlign,
    SeqFeature,
    SeqGraph,
};
use crate::data_structs::coords::{
    SeqLoc,
    SeqRange,
};
use crate::data_structs::{
    AnnotKind,
    Strand,
};
use crate::error::CollectResult;

/// Ordered result of a collection pass.
///
/// Features are materialized on first access and cached for the lifetime
/// of the set.
#[derive(Debug, Default)]
pub struct AnnotResultSet {
    refs:     Vec<AnnotObjectRef>,
    features: Vec<OnceCell<Option<Arc<SeqFeature>>>>,
    types:    BTreeSet<AnnotTypeKey>,
}

impl AnnotResultSet {
    pub(crate) fn new(
        refs: Vec<AnnotObjectRef>,
        types: BTreeSet<AnnotTypeKey>,
    ) -> Self {
        let features = refs.iter().map(|_| OnceCell::new()).collect();
        Self {
            refs,
            features,
            types,
        }
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn refs(&self) -> &[AnnotObjectRef] {
        &self.refs
    }

    /// Type keys seen by a types-only pass.
    pub fn annot_types(&self) -> &BTreeSet<AnnotTypeKey> {
        &self.types
    }

    pub fn get(
        &self,
        pos: usize,
    ) -> Option<AnnotItem<'_>> {
        Some(AnnotItem {
            reference: self.refs.get(pos)?,
            feature:   self.features.get(pos)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = AnnotItem<'_>> {
        self.refs
            .iter()
            .zip(self.features.iter())
            .map(|(reference, feature)| AnnotItem { reference, feature })
    }
}

/// View of one result.
#[derive(Debug, Clone, Copy)]
pub struct AnnotItem<'a> {
    reference: &'a AnnotObjectRef,
    feature:   &'a OnceCell<Option<Arc<SeqFeature>>>,
}

impl<'a> AnnotItem<'a> {
    pub fn reference(&self) -> &'a AnnotObjectRef {
        self.reference
    }

    pub fn kind(&self) -> AnnotKind {
        self.reference.kind()
    }

    pub fn is_feat(&self) -> bool {
        self.reference.is_feat()
    }

    pub fn is_align(&self) -> bool {
        self.reference.is_align()
    }

    pub fn is_graph(&self) -> bool {
        self.reference.is_graph()
    }

    pub fn mapped_range(&self) -> SeqRange {
        self.reference.mapped_range()
    }

    pub fn mapped_strand(&self) -> Strand {
        self.reference.mapped_strand()
    }

    pub fn is_partial(&self) -> bool {
        self.reference.is_partial()
    }

    pub fn mapped_location(&self) -> CollectResult<Cow<'a, SeqLoc>> {
        self.reference.mapped_location()
    }

    /// Mapped feature, built once per result set.
    pub fn feature(&self) -> CollectResult<Option<Arc<SeqFeature>>> {
        self.feature
            .get_or_try_init(|| {
                self.reference
                    .materialize_feature()
                    .map(|f| f.map(Arc::new))
            })
            .cloned()
    }

    pub fn align(&self) -> Option<&'a SeqAlign> {
        self.reference.align()
    }

    pub fn graph(&self) -> Option<&'a SeqGraph> {
        self.reference.graph()
    }
}
