use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Terran,
    Zerg,
    Protoss,
    Hybrid,
}

impl Faction {
    /// Capitalized name, also the id of the faction's section anchor
    pub fn name(self) -> &'static str {
        match self {
            Faction::Terran => "Terran",
            Faction::Zerg => "Zerg",
            Faction::Protoss => "Protoss",
            Faction::Hybrid => "Hybrid",
        }
    }

    pub fn file_stem(self) -> String {
        self.name().to_lowercase()
    }

    /// File name for this faction's output, e.g. `1-terran.json`
    pub fn file_name(self, order: u32) -> String {
        format!("{}-{}.json", order, self.file_stem())
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A quote as found in the source markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub value: String,
    pub faction: String,
    pub unit: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_melee: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hero: Option<bool>,
}

/// A normalized quote with its content-derived id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanQuote {
    pub value: String,
    pub faction: String,
    pub unit: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hero: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_melee: Option<bool>,
    pub id: Uuid,
}
