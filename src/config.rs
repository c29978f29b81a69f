use crate::models::Faction;

/// Wiki page listing every StarCraft II unit quotation
pub const SOURCE_URL: &str = "https://starcraft.fandom.com/wiki/StarCraft_II_unit_quotations";

/// Directory receiving one raw quote file per faction
pub const EXTRACT_DIR: &str = "quotes/extract";

/// Directory receiving one clean quote file per faction
pub const TRANSFORM_DIR: &str = "quotes/transform";

/// Combined dataset of every clean quote
pub const DATASET_FILE: &str = "quotes/starcraft-2-quotes.json";

/// Factions to extract, with the order prefix used in their file names
pub const FACTIONS: [(u32, Faction); 4] = [
    (1, Faction::Terran),
    (2, Faction::Zerg),
    (3, Faction::Protoss),
    (4, Faction::Hybrid),
];

pub const USER_AGENT: &str = concat!("sc2-quotes/", env!("CARGO_PKG_VERSION"));
