use std::borrow::Cow;
use std::hash::{
    Hash,
    Hasher,
};
use std::sync::Arc;

use crate::data_structs::annotation::{
    AnnotObject,
    FeatSubtype,
    SeqAlign,
    SeqFeature,
    SeqGraph,
};
use crate::data_structs::coords::{
    SeqLoc,
    SeqRange,
};
use crate::data_structs::typedef::{
    ContainerId,
    ObjectIndex,
};
use crate::data_structs::{
    AnnotKind,
    Strand,
};
use crate::error::{
    CollectError,
    CollectResult,
};
use crate::mapping::{
    AnnotMappingInfo,
    MappedObject,
    ObjectKey,
};
use crate::source::Container;

/// Handle to one object of a container plus its mapping.
///
/// Equality and hashing only look at the container and the object index.
#[derive(Debug, Clone)]
pub struct AnnotObjectRef {
    container: Arc<Container>,
    index:     ObjectIndex,
    object:    Arc<AnnotObject>,
    mapping:   AnnotMappingInfo,
}

impl AnnotObjectRef {
    pub fn new(
        container: Arc<Container>,
        index: ObjectIndex,
        object: Arc<AnnotObject>,
        mapping: AnnotMappingInfo,
    ) -> Self {
        Self {
            container,
            index,
            object,
            mapping,
        }
    }

    pub fn key(&self) -> ObjectKey {
        (self.container.id(), self.index)
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn container_id(&self) -> ContainerId {
        self.container.id()
    }

    pub fn index(&self) -> ObjectIndex {
        self.index
    }

    pub fn object(&self) -> &AnnotObject {
        &self.object
    }

    pub fn object_arc(&self) -> &Arc<AnnotObject> {
        &self.object
    }

    pub fn mapping(&self) -> &AnnotMappingInfo {
        &self.mapping
    }

    pub(crate) fn mapping_mut(&mut self) -> &mut AnnotMappingInfo {
        &mut self.mapping
    }

    pub fn kind(&self) -> AnnotKind {
        self.object.kind()
    }

    pub fn subtype(&self) -> Option<FeatSubtype> {
        self.object.subtype()
    }

    pub fn is_feat(&self) -> bool {
        self.kind() == AnnotKind::Feat
    }

    pub fn is_align(&self) -> bool {
        self.kind() == AnnotKind::Align
    }

    pub fn is_graph(&self) -> bool {
        self.kind() == AnnotKind::Graph
    }

    /// Index-table surrogate rather than a full feature.
    pub fn is_table(&self) -> bool {
        self.object.is_table()
    }

    pub fn mapped_range(&self) -> SeqRange {
        self.mapping.total_range()
    }

    pub fn mapped_strand(&self) -> Strand {
        self.mapping.strand()
    }

    pub fn is_circular(&self) -> bool {
        self.mapping.total_range().is_circular()
    }

    pub fn is_partial(&self) -> bool {
        self.mapping.is_partial() || self.object.is_partial()
    }

    fn unmapped_access(&self) -> CollectError {
        CollectError::UnmappedAccess {
            container: self.container.id(),
            index:     self.index,
        }
    }

    /// Location in the caller's coordinates. Fails while the mapping is
    /// still pending.
    pub fn mapped_location(&self) -> CollectResult<Cow<'_, SeqLoc>> {
        if self.mapping.is_pending() {
            return Err(self.unmapped_access());
        }
        match self.mapping.mapped() {
            MappedObject::Align(align) => Ok(Cow::Owned(align.location())),
            _ => {
                Ok(self
                    .mapping
                    .mapped_location()
                    .map(Cow::Borrowed)
                    .unwrap_or_else(|| self.object.location()))
            },
        }
    }

    /// Builds a feature carrying the mapped location. Table surrogates are
    /// expanded from their compact record.
    pub fn materialize_feature(&self) -> CollectResult<Option<SeqFeature>> {
        if self.mapping.is_pending() {
            return Err(self.unmapped_access());
        }
        let base = match self.object.as_ref() {
            AnnotObject::Feat(feat) => feat.clone(),
            AnnotObject::Snp(snp) => snp.to_feature(),
            _ => return Ok(None),
        };
        let feature = match self.mapping.mapped_location() {
            Some(loc) => base.with_location(loc.clone()),
            None => base,
        };
        let partial = feature.is_partial() || self.mapping.is_partial();
        Ok(Some(feature.with_partial(partial)))
    }

    pub fn align(&self) -> Option<&SeqAlign> {
        match (self.mapping.mapped(), self.object.as_ref()) {
            (MappedObject::Align(align), _) => Some(align.as_ref()),
            (_, AnnotObject::Align(align)) => Some(align),
            _ => None,
        }
    }

    pub fn graph(&self) -> Option<&SeqGraph> {
        match self.object.as_ref() {
            AnnotObject::Graph(graph) => Some(graph),
            _ => None,
        }
    }
}

impl PartialEq for AnnotObjectRef {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.key() == other.key()
    }
}

impl Eq for AnnotObjectRef {}

impl Hash for AnnotObjectRef {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        self.key().hash(state)
    }
}
