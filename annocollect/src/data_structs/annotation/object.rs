use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Display;

use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use super::{
    AnnotTypeKey,
    FeatSubtype,
    FeatType,
};
use crate::data_structs::coords::{
    LocShapeError,
    SeqInterval,
    SeqLoc,
    SeqRange,
};
use crate::data_structs::enums::{
    AnnotKind,
    MappedField,
    Strand,
};
use crate::data_structs::typedef::{
    PosType,
    SeqIdStr,
};
use crate::{
    getter_fn,
    with_field_fn,
};

/// Name of an annotation subset inside a container.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnnotName {
    #[default]
    Unnamed,
    Named(String),
}

impl From<&str> for AnnotName {
    fn from(value: &str) -> Self {
        AnnotName::Named(value.to_owned())
    }
}

impl Display for AnnotName {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            AnnotName::Unnamed => write!(f, "<unnamed>"),
            AnnotName::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Type-specific payload of a feature.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatData {
    #[default]
    Empty,
    Gene {
        locus: Option<String>,
    },
    Cdregion {
        frame: u8,
    },
    Rna {
        name: Option<String>,
    },
    Imp {
        key: String,
    },
    Region {
        name: String,
    },
    Variation {
        alleles: Vec<String>,
    },
    /// Payload kept as raw bytes; it has no defined ordering.
    Opaque {
        bytes: Vec<u8>,
    },
}

impl FeatData {
    fn rank(&self) -> u8 {
        match self {
            FeatData::Empty => 0,
            FeatData::Gene { .. } => 1,
            FeatData::Cdregion { .. } => 2,
            FeatData::Rna { .. } => 3,
            FeatData::Imp { .. } => 4,
            FeatData::Region { .. } => 5,
            FeatData::Variation { .. } => 6,
            FeatData::Opaque { .. } => 7,
        }
    }

    /// Structural ordering of two payloads. Raw payloads sort after every
    /// structured one and cannot be ordered among themselves.
    pub fn compare(
        &self,
        other: &FeatData,
    ) -> Option<Ordering> {
        use FeatData::*;
        match (self, other) {
            (Opaque { .. }, Opaque { .. }) => None,
            (Gene { locus: a }, Gene { locus: b }) => Some(a.cmp(b)),
            (Cdregion { frame: a }, Cdregion { frame: b }) => Some(a.cmp(b)),
            (Rna { name: a }, Rna { name: b }) => Some(a.cmp(b)),
            (Imp { key: a }, Imp { key: b }) => Some(a.cmp(b)),
            (Region { name: a }, Region { name: b }) => Some(a.cmp(b)),
            (Variation { alleles: a }, Variation { alleles: b }) => Some(a.cmp(b)),
            (a, b) => Some(a.rank().cmp(&b.rank())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqFeature {
    subtype:    FeatSubtype,
    location:   SeqLoc,
    #[serde(default)]
    product:    Option<SeqLoc>,
    #[serde(default)]
    partial:    bool,
    #[serde(default)]
    data:       FeatData,
    #[serde(default)]
    qualifiers: Vec<(String, String)>,
    #[serde(default)]
    comment:    Option<String>,
}

impl SeqFeature {
    pub fn new(
        subtype: FeatSubtype,
        location: SeqLoc,
    ) -> Self {
        Self {
            subtype,
            location,
            product: None,
            partial: false,
            data: FeatData::Empty,
            qualifiers: Vec::new(),
            comment: None,
        }
    }

    getter_fn!(location, SeqLoc);
    getter_fn!(product, Option<SeqLoc>);
    getter_fn!(data, FeatData);
    getter_fn!(qualifiers, Vec<(String, String)>);
    getter_fn!(comment, Option<String>);

    with_field_fn!(product, Option<SeqLoc>);
    with_field_fn!(partial, bool);
    with_field_fn!(data, FeatData);
    with_field_fn!(qualifiers, Vec<(String, String)>);
    with_field_fn!(comment, Option<String>);
    with_field_fn!(location, SeqLoc);

    pub fn subtype(&self) -> FeatSubtype {
        self.subtype
    }

    pub fn feat_type(&self) -> FeatType {
        self.subtype.feat_type()
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    /// Compares everything except the location. Returns `None` when both
    /// payloads are raw bytes.
    pub fn compare_content(
        &self,
        other: &SeqFeature,
    ) -> Option<Ordering> {
        let ord = self
            .data
            .compare(&other.data)?
            .then_with(|| self.qualifiers.cmp(&other.qualifiers))
            .then_with(|| self.comment.cmp(&other.comment))
            .then_with(|| self.partial.cmp(&other.partial))
            .then_with(|| {
                let ids = |p: &Option<SeqLoc>| {
                    p.as_ref().map(|l| l.seq_ids()).unwrap_or_default()
                };
                ids(&self.product).cmp(&ids(&other.product))
            });
        Some(ord)
    }
}

/// Pairwise or multiple alignment; one interval per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqAlign {
    rows:  Vec<SeqInterval>,
    #[serde(default)]
    score: Option<i64>,
}

impl SeqAlign {
    pub fn new(rows: Vec<SeqInterval>) -> Self {
        Self { rows, score: None }
    }

    getter_fn!(rows, Vec<SeqInterval>);
    getter_fn!(score, Option<i64>);
    with_field_fn!(score, Option<i64>);

    /// Copy of the alignment with its rows replaced.
    pub fn remapped(
        &self,
        rows: Vec<SeqInterval>,
    ) -> Self {
        Self {
            rows,
            score: self.score,
        }
    }

    pub fn location(&self) -> SeqLoc {
        SeqLoc::Mix {
            parts: self
                .rows
                .iter()
                .cloned()
                .map(SeqLoc::Int)
                .collect_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqGraph {
    location: SeqInterval,
    #[serde(default)]
    title:    Option<String>,
    #[serde(default)]
    values:   Vec<i32>,
}

impl SeqGraph {
    pub fn new(
        location: SeqInterval,
        values: Vec<i32>,
    ) -> Self {
        Self {
            location,
            title: None,
            values,
        }
    }

    getter_fn!(location, SeqInterval);
    getter_fn!(title, Option<String>);
    getter_fn!(values, Vec<i32>);
    with_field_fn!(title, Option<String>);
}

/// Indirection object: annotations for `location` are found on `target`.
/// `target` is expected to be a single interval of the same length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotLocs {
    location: SeqInterval,
    target:   SeqLoc,
}

impl AnnotLocs {
    pub fn new(
        location: SeqInterval,
        target: SeqLoc,
    ) -> Self {
        Self { location, target }
    }

    getter_fn!(location, SeqInterval);
    getter_fn!(target, SeqLoc);
}

/// Compact variation record from a pre-indexed table. Expanded into a full
/// [`SeqFeature`] only on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnpRecord {
    id:       SeqIdStr,
    position: PosType,
    #[serde(default = "default_snp_length")]
    length:   PosType,
    #[serde(default)]
    strand:   Strand,
    #[serde(default)]
    alleles:  Vec<String>,
    #[serde(default)]
    rs_id:    Option<u64>,
}

fn default_snp_length() -> PosType {
    1
}

impl SnpRecord {
    pub fn new(
        id: SeqIdStr,
        position: PosType,
        alleles: Vec<String>,
    ) -> Self {
        Self {
            id,
            position,
            length: 1,
            strand: Strand::None,
            alleles,
            rs_id: None,
        }
    }

    with_field_fn!(rs_id, Option<u64>);
    with_field_fn!(length, PosType);
    with_field_fn!(strand, Strand);

    pub fn interval(&self) -> SeqInterval {
        SeqInterval::new(
            self.id.clone(),
            self.position,
            self.position + self.length.max(1),
            self.strand,
        )
    }

    pub fn to_feature(&self) -> SeqFeature {
        let qualifiers = self
            .rs_id
            .map(|rs| vec![("db_xref".to_owned(), format!("dbSNP:rs{}", rs))])
            .unwrap_or_default();
        SeqFeature::new(FeatSubtype::Variation, SeqLoc::Int(self.interval()))
            .with_data(FeatData::Variation {
                alleles: self.alleles.clone(),
            })
            .with_qualifiers(qualifiers)
    }
}

/// Annotation object stored in a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "snake_case")]
pub enum AnnotObject {
    Feat(SeqFeature),
    Align(SeqAlign),
    Graph(SeqGraph),
    Locs(AnnotLocs),
    Snp(SnpRecord),
}

impl AnnotObject {
    pub fn kind(&self) -> AnnotKind {
        match self {
            AnnotObject::Feat(_) | AnnotObject::Snp(_) => AnnotKind::Feat,
            AnnotObject::Align(_) => AnnotKind::Align,
            AnnotObject::Graph(_) => AnnotKind::Graph,
            AnnotObject::Locs(_) => AnnotKind::Locs,
        }
    }

    /// Table surrogates are not regular complex features.
    pub fn is_table(&self) -> bool {
        matches!(self, AnnotObject::Snp(_))
    }

    pub fn subtype(&self) -> Option<FeatSubtype> {
        match self {
            AnnotObject::Feat(f) => Some(f.subtype()),
            AnnotObject::Snp(_) => Some(FeatSubtype::Variation),
            _ => None,
        }
    }

    pub fn type_key(&self) -> AnnotTypeKey {
        match self.subtype() {
            Some(subtype) => AnnotTypeKey::Feat(subtype),
            None => {
                match self {
                    AnnotObject::Align(_) => AnnotTypeKey::Align,
                    AnnotObject::Graph(_) => AnnotTypeKey::Graph,
                    _ => AnnotTypeKey::Locs,
                }
            },
        }
    }

    pub fn location(&self) -> Cow<'_, SeqLoc> {
        match self {
            AnnotObject::Feat(f) => Cow::Borrowed(f.location()),
            AnnotObject::Align(a) => Cow::Owned(a.location()),
            AnnotObject::Graph(g) => Cow::Owned(SeqLoc::Int(g.location().clone())),
            AnnotObject::Locs(l) => Cow::Owned(SeqLoc::Int(l.location().clone())),
            AnnotObject::Snp(s) => Cow::Owned(SeqLoc::Int(s.interval())),
        }
    }

    pub fn is_partial(&self) -> bool {
        match self {
            AnnotObject::Feat(f) => f.is_partial(),
            _ => false,
        }
    }

    /// Location selected by `field`. Only features carry a product.
    pub fn located_by(
        &self,
        field: MappedField,
    ) -> Option<Cow<'_, SeqLoc>> {
        match field {
            MappedField::Location => Some(self.location()),
            MappedField::Product => {
                self.as_feat()
                    .and_then(|f| f.product().as_ref())
                    .map(Cow::Borrowed)
            },
        }
    }

    /// Checks every location the object carries.
    pub fn validate(&self) -> Result<(), LocShapeError> {
        self.location().validate()?;
        if let Some(product) = self.as_feat().and_then(|f| f.product().as_ref()) {
            product.validate()?;
        }
        if let AnnotObject::Locs(locs) = self {
            locs.target().validate()?;
        }
        Ok(())
    }

    /// Extents under which the object is placed in a range index, one per
    /// sequence id of the selected location.
    pub fn index_extents(
        &self,
        field: MappedField,
    ) -> Vec<(SeqIdStr, SeqRange)> {
        let Some(loc) = self.located_by(field) else {
            return Vec::new();
        };
        loc.seq_ids()
            .into_iter()
            .filter_map(|id| {
                let (range, _) = loc.total_range_on(std::slice::from_ref(&id))?;
                Some((id, range))
            })
            .collect_vec()
    }

    pub fn as_feat(&self) -> Option<&SeqFeature> {
        match self {
            AnnotObject::Feat(f) => Some(f),
            _ => None,
        }
    }
}

impl From<SeqFeature> for AnnotObject {
    fn from(value: SeqFeature) -> Self {
        AnnotObject::Feat(value)
    }
}

impl From<SeqAlign> for AnnotObject {
    fn from(value: SeqAlign) -> Self {
        AnnotObject::Align(value)
    }
}

impl From<SeqGraph> for AnnotObject {
    fn from(value: SeqGraph) -> Self {
        AnnotObject::Graph(value)
    }
}

impl From<AnnotLocs> for AnnotObject {
    fn from(value: AnnotLocs) -> Self {
        AnnotObject::Locs(value)
    }
}

impl From<SnpRecord> for AnnotObject {
    fn from(value: SnpRecord) -> Self {
        AnnotObject::Snp(value)
    }
}
