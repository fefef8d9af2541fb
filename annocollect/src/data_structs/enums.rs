use std::convert::Infallible;
use std::fmt::Display;
use std::str::FromStr;

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Default)]
pub enum Strand {
    /// Forward strand.
    Forward,
    /// Reverse strand.
    Reverse,
    /// No strand.
    #[default]
    None,
}

impl Strand {
    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }

    /// Strand after passing through a conversion that may reverse
    /// orientation. Unstranded stays unstranded.
    pub fn flipped(
        self,
        reverse: bool,
    ) -> Self {
        match (self, reverse) {
            (Strand::Forward, true) => Strand::Reverse,
            (Strand::Reverse, true) => Strand::Forward,
            (s, _) => s,
        }
    }

    /// Coarse strand overlap: an unstranded side matches anything.
    pub fn compatible(
        &self,
        other: &Strand,
    ) -> bool {
        match (self, other) {
            (Strand::None, _) | (_, Strand::None) => true,
            (a, b) => a == b,
        }
    }

    /// Strand of a location built from pieces with the given strands.
    pub fn merge(
        self,
        other: Strand,
    ) -> Strand {
        if self == other {
            self
        }
        else {
            Strand::None
        }
    }
}

impl FromStr for Strand {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Ok(Strand::None),
        }
    }
}

impl From<Strand> for char {
    fn from(value: Strand) -> Self {
        match value {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::None => '.',
        }
    }
}

impl Display for Strand {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", char::from(*self))
    }
}

impl Serialize for Strand {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer, {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>, {
        let s = String::deserialize(deserializer)?;
        std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Coarse annotation kind. The declaration order is the presentation order
/// used by the tie-break comparator.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AnnotKind {
    Feat,
    Align,
    Graph,
    Locs,
}

impl Display for AnnotKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            AnnotKind::Feat => write!(f, "feat"),
            AnnotKind::Align => write!(f, "align"),
            AnnotKind::Graph => write!(f, "graph"),
            AnnotKind::Locs => write!(f, "locs"),
        }
    }
}

#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Keep the order in which objects were found.
    None,
    /// Ascending start, longer extent first.
    #[default]
    Normal,
    /// Descending end, shorter start first.
    Reverse,
}

#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OverlapType {
    /// Any hit whose indexed extent intersects the query.
    #[default]
    TotalRange,
    /// At least one interval of the object location must intersect the
    /// query.
    Intervals,
}

#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMethod {
    /// No container resolution; only the container named by the search
    /// limit is searched.
    None,
    /// Only the top-level container owning the sequence.
    TseOnly,
    /// Every container in scope touching the sequence.
    #[default]
    All,
}

#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedPolicy {
    #[default]
    Ignore,
    /// Use the raw id as a search key in every container.
    Search,
    Fail,
}

/// Which location of an annotation is indexed, searched and mapped.
#[derive(
    Eq, Hash, PartialEq, Copy, Clone, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MappedField {
    #[default]
    Location,
    /// The product location of a feature (e.g. the protein of a coding
    /// region).
    Product,
}
