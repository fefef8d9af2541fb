use std::collections::BTreeSet;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::annotation::{
    AnnotName,
    AnnotTypeKey,
    FeatSubtype,
    FeatType,
    FeatTypeOrder,
};
use crate::data_structs::typedef::ContainerId;
use crate::data_structs::{
    AnnotKind,
    MappedField,
    OverlapType,
    ResolveMethod,
    SortOrder,
    UnresolvedPolicy,
};
use crate::error::{
    CollectError,
    CollectResult,
};
use crate::with_field_fn;

/// Restricts which objects a search may return.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchLimit {
    #[default]
    None,
    /// Only objects of one container.
    Container { id: ContainerId },
    /// Only objects of one named annotation of a container.
    Annot {
        container: ContainerId,
        name:      AnnotName,
    },
}

impl SearchLimit {
    pub fn container(&self) -> Option<ContainerId> {
        match self {
            SearchLimit::None => None,
            SearchLimit::Container { id } => Some(*id),
            SearchLimit::Annot { container, .. } => Some(*container),
        }
    }

    pub fn accepts_name(
        &self,
        name: &AnnotName,
    ) -> bool {
        match self {
            SearchLimit::Annot { name: limit, .. } => limit == name,
            _ => true,
        }
    }
}

/// Read-only configuration of a collection pass.
///
/// Every field has a default, so a selector can be read from a partial JSON
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotSelector {
    annot_kinds:       BTreeSet<AnnotKind>,
    feat_types:        Option<BTreeSet<FeatType>>,
    feat_subtypes:     Option<BTreeSet<FeatSubtype>>,
    annot_names:       Option<Vec<AnnotName>>,
    resolve_method:    ResolveMethod,
    resolve_depth:     usize,
    exact_depth:       bool,
    adaptive_depth:    bool,
    adaptive_triggers: Vec<FeatSubtype>,
    overlap:           OverlapType,
    sort_order:        SortOrder,
    max_size:          Option<usize>,
    unresolved:        UnresolvedPolicy,
    exclude_external:  bool,
    gi_only_mismatch:  bool,
    limit:             SearchLimit,
    field:             MappedField,
    merge_conversions: bool,
    collect_types:     bool,
    type_order:        FeatTypeOrder,
}

impl Default for AnnotSelector {
    fn default() -> Self {
        Self {
            annot_kinds:       BTreeSet::from([
                AnnotKind::Feat,
                AnnotKind::Align,
                AnnotKind::Graph,
            ]),
            feat_types:        None,
            feat_subtypes:     None,
            annot_names:       None,
            resolve_method:    ResolveMethod::All,
            resolve_depth:     0,
            exact_depth:       false,
            adaptive_depth:    false,
            adaptive_triggers: vec![
                FeatSubtype::Gene,
                FeatSubtype::Cdregion,
                FeatSubtype::MRna,
            ],
            overlap:           OverlapType::TotalRange,
            sort_order:        SortOrder::Normal,
            max_size:          None,
            unresolved:        UnresolvedPolicy::Ignore,
            exclude_external:  false,
            gi_only_mismatch:  false,
            limit:             SearchLimit::None,
            field:             MappedField::Location,
            merge_conversions: true,
            collect_types:     false,
            type_order:        FeatTypeOrder::default(),
        }
    }
}

impl AnnotSelector {
    with_field_fn!(annot_kinds, BTreeSet<AnnotKind>);
    with_field_fn!(feat_types, Option<BTreeSet<FeatType>>);
    with_field_fn!(feat_subtypes, Option<BTreeSet<FeatSubtype>>);
    with_field_fn!(annot_names, Option<Vec<AnnotName>>);
    with_field_fn!(resolve_method, ResolveMethod);
    with_field_fn!(resolve_depth, usize);
    with_field_fn!(exact_depth, bool);
    with_field_fn!(adaptive_depth, bool);
    with_field_fn!(adaptive_triggers, Vec<FeatSubtype>);
    with_field_fn!(overlap, OverlapType);
    with_field_fn!(sort_order, SortOrder);
    with_field_fn!(max_size, Option<usize>);
    with_field_fn!(unresolved, UnresolvedPolicy);
    with_field_fn!(exclude_external, bool);
    with_field_fn!(gi_only_mismatch, bool);
    with_field_fn!(limit, SearchLimit);
    with_field_fn!(field, MappedField);
    with_field_fn!(merge_conversions, bool);
    with_field_fn!(collect_types, bool);
    with_field_fn!(type_order, FeatTypeOrder);

    /// Restricts the search to features of the given subtypes.
    pub fn only_subtypes<I>(
        self,
        subtypes: I,
    ) -> Self
    where
        I: IntoIterator<Item = FeatSubtype>, {
        self.with_annot_kinds(BTreeSet::from([AnnotKind::Feat]))
            .with_feat_subtypes(Some(subtypes.into_iter().collect()))
    }

    pub fn resolve_method(&self) -> ResolveMethod {
        self.resolve_method
    }

    pub fn resolve_depth(&self) -> usize {
        self.resolve_depth
    }

    pub fn exact_depth(&self) -> bool {
        self.exact_depth
    }

    pub fn adaptive_depth(&self) -> bool {
        self.adaptive_depth
    }

    pub fn adaptive_triggers(&self) -> &[FeatSubtype] {
        &self.adaptive_triggers
    }

    pub fn overlap(&self) -> OverlapType {
        self.overlap
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn unresolved(&self) -> UnresolvedPolicy {
        self.unresolved
    }

    pub fn exclude_external(&self) -> bool {
        self.exclude_external
    }

    pub fn gi_only_mismatch(&self) -> bool {
        self.gi_only_mismatch
    }

    pub fn limit(&self) -> &SearchLimit {
        &self.limit
    }

    pub fn field(&self) -> MappedField {
        self.field
    }

    pub fn merge_conversions(&self) -> bool {
        self.merge_conversions
    }

    pub fn collect_types(&self) -> bool {
        self.collect_types
    }

    pub fn type_order(&self) -> &FeatTypeOrder {
        &self.type_order
    }

    /// Checks if objects indexed under `key` are wanted. Indirection
    /// objects are never returned.
    pub fn accepts_key(
        &self,
        key: AnnotTypeKey,
    ) -> bool {
        if !self.annot_kinds.contains(&key.kind()) {
            return false;
        }
        match key {
            AnnotTypeKey::Feat(subtype) => {
                self.feat_subtypes
                    .as_ref()
                    .map_or(true, |s| s.contains(&subtype))
                    && self
                        .feat_types
                        .as_ref()
                        .map_or(true, |t| t.contains(&subtype.feat_type()))
            },
            AnnotTypeKey::Locs => false,
            _ => true,
        }
    }

    pub fn accepts_name(
        &self,
        name: &AnnotName,
    ) -> bool {
        self.limit.accepts_name(name)
            && self
                .annot_names
                .as_ref()
                .map_or(true, |names| names.contains(name))
    }

    /// Rejects combinations no search mode can honor.
    pub fn validate(&self) -> CollectResult<()> {
        if self.resolve_method == ResolveMethod::None && self.limit == SearchLimit::None {
            return Err(CollectError::LimitConfiguration(
                "resolve method 'none' needs a container search limit".into(),
            ));
        }
        if self.max_size == Some(0) {
            return Err(CollectError::LimitConfiguration(
                "result cap must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
