use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Extraction categories the query layer understands.
///
/// Each category maps to the tag the NLU workspace emits for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Date,
    Time,
    Company,
}

impl Entity {
    pub const ALL: [Self; 3] = [Self::Date, Self::Time, Self::Company];

    /// Tag used by the NLU service for this category.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Date => "sys-date",
            Self::Time => "sys-time",
            Self::Company => "company",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|entity| entity.tag() == tag)
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
