//! Endpoint marks and edge properties.

use serde::{Deserialize, Serialize};

/// The mark at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

impl Endpoint {
    /// Glyph drawn next to the left node of an edge (`<` for an arrowhead).
    pub fn left_glyph(&self) -> char {
        match self {
            Self::Tail => '-',
            Self::Arrow => '<',
            Self::Circle => 'o',
        }
    }

    /// Glyph drawn next to the right node of an edge (`>` for an arrowhead).
    pub fn right_glyph(&self) -> char {
        match self {
            Self::Tail => '-',
            Self::Arrow => '>',
            Self::Circle => 'o',
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Tail => "tail",
            Self::Arrow => "arrow",
            Self::Circle => "circle",
        })
    }
}

/// Annotations carried by an edge for display and ensemble reporting.
/// Orientation never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeProperty {
    /// Definitely direct.
    Dd,
    /// No latent confounder (definitely non-latent).
    Nl,
    /// Possibly direct.
    Pd,
    /// Possibly latent-confounded.
    Pl,
}

impl EdgeProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dd => "dd",
            Self::Nl => "nl",
            Self::Pd => "pd",
            Self::Pl => "pl",
        }
    }
}

impl std::fmt::Display for EdgeProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
