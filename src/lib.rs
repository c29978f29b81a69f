//! sc2-quotes: StarCraft II unit quotation scraper and dataset builder
//!
//! The pipeline runs in two stages that hand off through the filesystem:
//!
//! 1. **Extraction** -- Fetch the wiki's unit quotation page once per faction and
//!    walk the flat run of headings and tables that follows the faction's section
//!    anchor. Heading levels stand in for nesting: group headings set the unit
//!    category, unit headings set the current unit, and every table pairs its
//!    header rows with the data rows beneath them. One raw JSON file per faction.
//! 2. **Transform** -- Normalize every field of every raw quote, drop quotes whose
//!    text cleans to nothing, assign a UUID v5 derived from the normalized content,
//!    and write one clean file per faction plus the combined dataset.
//!
//! Ids are content-addressed, so re-running against an unchanged page yields
//! byte-identical ids and datasets can be diffed by id.
//!
//! # Key Modules
//!
//! - [`extract`] -- Sibling-stream traversal and per-faction output
//! - [`category`] -- Melee/hero classification for grouped factions
//! - [`clean`] -- String normalization and unit/action lexicons
//! - [`transform`] -- Normalization, id assignment and dataset aggregation
//! - [`models`] -- Faction, RawQuote, CleanQuote
//! - [`fetch`] -- HTTP client
//! - [`json`] -- Pretty JSON file helpers
//! - [`stats`] -- Atomic counters for both stages
//! - [`config`] -- Source URL, output paths and faction order
//!
//! # Example Usage
//!
//! ```bash
//! # Extract and transform with the default paths
//! sc2-quotes -v
//!
//! # Re-run only the transform stage
//! sc2-quotes transform --extract-dir quotes/extract
//! ```

pub mod category;
pub mod clean;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod json;
pub mod models;
pub mod stats;
pub mod transform;
