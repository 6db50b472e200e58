use core::fmt;
use core::fmt::Debug;
use core::str::FromStr;

use enum_iterator::{all, cardinality, Sequence};

/// A classification target drawn from a closed enumeration.
///
/// Every `Copy` enum deriving [`Sequence`](enum_iterator::Sequence) gets this
/// for free. Ordinals follow declaration order and stay stable as long as the
/// declaration does, which is what ties persisted models to label sets.
pub trait Label: Sequence + Copy + Eq + Debug {
    /// Position of this label in declaration order.
    fn ordinal(&self) -> usize {
        all::<Self>().take_while(|l| l != self).count()
    }

    /// The label at `ordinal` in declaration order, if any.
    fn from_ordinal(ordinal: usize) -> Option<Self> {
        all::<Self>().nth(ordinal)
    }

    /// Number of labels in the enumeration.
    fn count() -> usize {
        cardinality::<Self>()
    }
}

impl<T> Label for T where T: Sequence + Copy + Eq + Debug {}

/// Top-level reading of a page region.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Sequence)]
pub enum ZoneCategory {
    Metadata,
    Body,
    References,
    Other,
}

impl fmt::Display for ZoneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metadata => "metadata",
            Self::Body => "body",
            Self::References => "references",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

impl FromStr for ZoneCategory {
    type Err = &'static str;
    fn from_str(category: &str) -> Result<Self, Self::Err> {
        match category {
            "metadata" => Ok(Self::Metadata),
            "body" => Ok(Self::Body),
            "references" => Ok(Self::References),
            "other" => Ok(Self::Other),
            _ => Err("unsupported zone category"),
        }
    }
}

/// Fine-grained reading of a metadata region.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Sequence)]
pub enum MetadataPart {
    Title,
    Author,
    Affiliation,
    Abstract,
    Keywords,
    BibInfo,
    Dates,
    Other,
}

impl fmt::Display for MetadataPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Affiliation => "affiliation",
            Self::Abstract => "abstract",
            Self::Keywords => "keywords",
            Self::BibInfo => "bib_info",
            Self::Dates => "dates",
            Self::Other => "other",
        };
        write!(f, "{name}")
    }
}

impl FromStr for MetadataPart {
    type Err = &'static str;
    fn from_str(part: &str) -> Result<Self, Self::Err> {
        match part {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "affiliation" => Ok(Self::Affiliation),
            "abstract" => Ok(Self::Abstract),
            "keywords" => Ok(Self::Keywords),
            "bib_info" => Ok(Self::BibInfo),
            "dates" => Ok(Self::Dates),
            "other" => Ok(Self::Other),
            _ => Err("unsupported metadata part"),
        }
    }
}
