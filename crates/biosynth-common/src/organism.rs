//! Host organisms supported by the pipeline.
//!
//! The set is closed: every organism-specific table in [`crate::tables`] is
//! resolved through an exhaustive `match`, so a new variant will not compile
//! until each table has an entry for it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BiosynthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Organism {
    #[serde(rename = "homo_sapiens", alias = "human")]
    Human,
    #[serde(rename = "mus_musculus", alias = "mouse")]
    Mouse,
    #[serde(rename = "rattus_norvegicus", alias = "rat")]
    Rat,
    #[serde(rename = "danio_rerio", alias = "zebrafish")]
    Zebrafish,
    #[serde(rename = "drosophila_melanogaster", alias = "fruitfly")]
    Fruitfly,
    #[serde(rename = "escherichia_coli", alias = "e_coli", alias = "e-coli")]
    EColi,
}

impl Organism {
    pub const ALL: [Organism; 6] = [
        Organism::Human,
        Organism::Mouse,
        Organism::Rat,
        Organism::Zebrafish,
        Organism::Fruitfly,
        Organism::EColi,
    ];

    /// Wire identifier, e.g. `homo_sapiens`.
    pub fn as_str(self) -> &'static str {
        match self {
            Organism::Human => "homo_sapiens",
            Organism::Mouse => "mus_musculus",
            Organism::Rat => "rattus_norvegicus",
            Organism::Zebrafish => "danio_rerio",
            Organism::Fruitfly => "drosophila_melanogaster",
            Organism::EColi => "escherichia_coli",
        }
    }

    pub fn common_name(self) -> &'static str {
        match self {
            Organism::Human => "human",
            Organism::Mouse => "mouse",
            Organism::Rat => "rat",
            Organism::Zebrafish => "zebrafish",
            Organism::Fruitfly => "fruitfly",
            Organism::EColi => "e-coli",
        }
    }
}

impl fmt::Display for Organism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Organism {
    type Err = BiosynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Organism::ALL
            .into_iter()
            .find(|o| o.as_str() == needle || o.common_name() == needle || (needle == "e_coli" && *o == Organism::EColi))
            .ok_or(BiosynthError::UnknownOrganism(s.to_string()))
    }
}
