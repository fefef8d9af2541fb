use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{
    Deserialize,
    Serialize,
};

use crate::data_structs::enums::AnnotKind;

/// Coarse feature type.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatType {
    Gene,
    Org,
    Cdregion,
    Prot,
    Rna,
    Pub,
    Seq,
    Imp,
    Region,
    Comment,
    Bond,
    Site,
    Rsite,
    User,
    Biosrc,
    Variation,
}

/// Fine-grained feature subtype. Discriminants are the stable numeric codes
/// used by the tie-break comparator.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum FeatSubtype {
    Gene        = 1,
    Org         = 2,
    Cdregion    = 3,
    Prot        = 4,
    MatPeptide  = 6,
    PreRna      = 9,
    #[serde(rename = "mrna")]
    MRna        = 10,
    #[serde(rename = "trna")]
    TRna        = 11,
    #[serde(rename = "rrna")]
    RRna        = 12,
    OtherRna    = 15,
    Pub         = 16,
    Seq         = 17,
    Imp         = 18,
    Exon        = 33,
    Intron      = 40,
    MiscFeature = 45,
    Region      = 96,
    Comment     = 97,
    Bond        = 98,
    Site        = 99,
    Rsite       = 100,
    User        = 101,
    Biosrc      = 104,
    Variation   = 106,
}

impl FeatSubtype {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn feat_type(&self) -> FeatType {
        use FeatSubtype::*;
        match self {
            Gene => FeatType::Gene,
            Org => FeatType::Org,
            Cdregion => FeatType::Cdregion,
            Prot | MatPeptide => FeatType::Prot,
            PreRna | MRna | TRna | RRna | OtherRna => FeatType::Rna,
            Pub => FeatType::Pub,
            Seq => FeatType::Seq,
            Imp | Exon | Intron | MiscFeature => FeatType::Imp,
            Region => FeatType::Region,
            Comment => FeatType::Comment,
            Bond => FeatType::Bond,
            Site => FeatType::Site,
            Rsite => FeatType::Rsite,
            User => FeatType::User,
            Biosrc => FeatType::Biosrc,
            Variation => FeatType::Variation,
        }
    }
}

impl Display for FeatSubtype {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_owned))
            .unwrap_or_else(|| format!("{:?}", self));
        write!(f, "{}", name)
    }
}

/// Index key of an annotation: objects are bucketed per sequence id and per
/// key inside a container.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnnotTypeKey {
    Feat(FeatSubtype),
    Align,
    Graph,
    Locs,
}

impl AnnotTypeKey {
    pub fn kind(&self) -> AnnotKind {
        match self {
            AnnotTypeKey::Feat(_) => AnnotKind::Feat,
            AnnotTypeKey::Align => AnnotKind::Align,
            AnnotTypeKey::Graph => AnnotKind::Graph,
            AnnotTypeKey::Locs => AnnotKind::Locs,
        }
    }
}

impl Display for AnnotTypeKey {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            AnnotTypeKey::Feat(subtype) => write!(f, "feat:{}", subtype),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Presentation priority of feature types used when two features share the
/// same extent. Lower sorts first; types missing from the table sort last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatTypeOrder {
    priorities: BTreeMap<FeatType, u8>,
}

impl FeatTypeOrder {
    pub fn new(priorities: BTreeMap<FeatType, u8>) -> Self {
        Self { priorities }
    }

    pub fn priority(
        &self,
        feat_type: FeatType,
    ) -> u8 {
        self.priorities
            .get(&feat_type)
            .copied()
            .unwrap_or(u8::MAX)
    }
}

impl Default for FeatTypeOrder {
    fn default() -> Self {
        use FeatType::*;
        let table = [
            Gene, Rna, Cdregion, Prot, Imp, Region, Site, Bond, Rsite, Variation,
            Seq, Comment, Pub, Biosrc, Org, User,
        ];
        Self {
            priorities: table
                .into_iter()
                .enumerate()
                .map(|(i, t)| (t, i as u8))
                .collect(),
        }
    }
}
