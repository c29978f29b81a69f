use crate::clean::{clean_action, clean_faction, clean_unit, clean_value};
use crate::json::{read_json, write_json};
use crate::models::{CleanQuote, RawQuote};
use crate::stats::TransformStats;
use anyhow::{Context, Result};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Content-derived id: UUID v5 in the URL namespace over the normalized fields.
pub fn quote_id(value: &str, faction: &str, unit: &str, action: &str) -> Uuid {
    let name = format!("{} {} {} {}", value, faction, unit, action);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
}

/// Normalizes every field, returning `None` when the quote text cleans to nothing.
pub fn normalize(quote: &RawQuote) -> Option<CleanQuote> {
    let value = clean_value(&quote.value);
    if value.is_empty() {
        return None;
    }
    let faction = clean_faction(&quote.faction);
    let unit = clean_unit(&quote.unit);
    let action = clean_action(&quote.action);
    let id = quote_id(&value, &faction, &unit, &action);

    Some(CleanQuote {
        value,
        faction,
        unit,
        action,
        is_hero: quote.is_hero,
        is_melee: quote.is_melee,
        id,
    })
}

/// Normalizes one raw faction file into `output`, returning the kept quotes.
pub fn transform_file(
    input: &Path,
    output: &Path,
    stats: &TransformStats,
) -> Result<Vec<CleanQuote>> {
    info!(input = %input.display(), "Transforming");
    let raw: Vec<RawQuote> = read_json(input)?;
    stats.add_read(raw.len() as u64);

    let mut clean = Vec::with_capacity(raw.len());
    for quote in &raw {
        match normalize(quote) {
            Some(q) => clean.push(q),
            None => {
                debug!(unit = %quote.unit, action = %quote.action, "Dropping empty quote");
                stats.inc_dropped();
            }
        }
    }

    write_json(output, &clean)?;
    stats.inc_files();
    info!(
        output = %output.display(),
        kept = clean.len(),
        dropped = raw.len() - clean.len(),
        "Wrote clean quotes"
    );
    Ok(clean)
}

/// Numeric prefix of an `<order>-<faction>.json` name.
fn order_prefix(name: &str) -> Option<u32> {
    name.split_once('-').and_then(|(order, _)| order.parse().ok())
}

/// Raw quote files in `input_dir`, ordered by their numeric prefix.
///
/// Names without a prefix sort after every prefixed name, by name.
pub fn list_raw_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(input_dir)
        .with_context(|| format!("Failed to read extract directory: {}", input_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in: {}", input_dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort_by_cached_key(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        (order_prefix(&name).unwrap_or(u32::MAX), name)
    });
    Ok(files)
}

/// Transforms every raw file and writes the combined dataset.
pub fn run_transform(
    input_dir: &Path,
    output_dir: &Path,
    dataset: &Path,
) -> Result<TransformStats> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create transform directory: {}",
            output_dir.display()
        )
    })?;
    if let Some(parent) = dataset.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create dataset directory: {}", parent.display()))?;
    }

    let stats = TransformStats::new();
    let mut combined: Vec<CleanQuote> = Vec::new();

    for input in list_raw_files(input_dir)? {
        let Some(name) = input.file_name() else {
            continue;
        };
        let output = output_dir.join(name);
        combined.extend(transform_file(&input, &output, &stats)?);
    }

    let mut seen = FxHashSet::default();
    let duplicates = combined.iter().filter(|q| !seen.insert(q.id)).count();
    if duplicates > 0 {
        warn!(duplicates, "Identical quotes share an id in the dataset");
        stats.add_duplicates(duplicates as u64);
    }

    write_json(dataset, &combined)?;
    stats.add_written(combined.len() as u64);
    info!(
        output = %dataset.display(),
        quotes = combined.len(),
        "Wrote dataset"
    );
    Ok(stats)
}
