use crate::category::{Category, FactionProfile};
use crate::fetch::{build_client, fetch_document};
use crate::json::write_json;
use crate::models::{Faction, RawQuote};
use crate::stats::ExtractionStats;
use anyhow::{anyhow, bail, Context, Result};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());

/// Faction sections are `h2`; the next `h2` ends the section.
const BOUNDARY_LEVEL: u8 = 2;
const GROUP_LEVEL: u8 = 3;
const UNIT_LEVEL: u8 = 4;
const SWITCH_LEVEL: u8 = 5;

/// A sibling element of the faction heading, as the walk sees it.
enum SectionElement<'a> {
    Boundary,
    GroupHeading(ElementRef<'a>),
    UnitHeading(ElementRef<'a>),
    SwitchHeading(ElementRef<'a>),
    Table(ElementRef<'a>),
    Other,
}

fn heading_level(element: ElementRef<'_>) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn classify(element: ElementRef<'_>) -> SectionElement<'_> {
    match heading_level(element) {
        Some(level) if level <= BOUNDARY_LEVEL => SectionElement::Boundary,
        Some(GROUP_LEVEL) => SectionElement::GroupHeading(element),
        Some(UNIT_LEVEL) => SectionElement::UnitHeading(element),
        Some(SWITCH_LEVEL) => SectionElement::SwitchHeading(element),
        Some(_) => SectionElement::Other,
        None if element.value().name() == "table" => SectionElement::Table(element),
        None => SectionElement::Other,
    }
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Unit id of a heading.
///
/// Every child element is searched, not just the first: the first child that
/// carries an `id` wins, and a heading whose children carry none falls back to
/// its own `id`.
fn unit_id(heading: ElementRef<'_>) -> Option<String> {
    child_elements(heading)
        .find_map(|child| child.value().attr("id"))
        .or_else(|| heading.value().attr("id"))
        .map(str::to_string)
}

/// Traversal state carried across the sibling stream of one faction section.
struct SectionState<'p> {
    profile: &'p FactionProfile,
    unit: Option<String>,
    category: Option<Category>,
    reset_pending: bool,
}

impl<'p> SectionState<'p> {
    fn new(profile: &'p FactionProfile) -> Self {
        Self {
            profile,
            unit: None,
            category: profile.default_category(),
            reset_pending: profile.reset_after_unit.is_some(),
        }
    }

    fn enter_group(&mut self, text: &str) {
        if self.profile.is_grouped() {
            self.category = self
                .profile
                .match_category(text)
                .or_else(|| self.profile.default_category());
        }
    }

    fn enter_unit(&mut self, heading: ElementRef<'_>) {
        match unit_id(heading) {
            Some(id) => self.unit = Some(id),
            None => debug!(faction = %self.profile.faction, "Unit heading without id"),
        }
        if let Some(category) = self.profile.match_category(&text_of(heading)) {
            self.category = Some(category);
        }
    }

    fn enter_switch(&mut self, text: &str) {
        if let Some(category) = self.profile.match_category(text) {
            self.category = Some(category);
        }
    }

    fn finish_table(&mut self, unit: &str) {
        if self.reset_pending && self.profile.reset_after_unit == Some(unit) {
            debug!(unit, "Resetting category after table");
            self.category = self.profile.default_category();
            self.reset_pending = false;
        }
    }
}

/// Rows alternate header/data. Each header cell's text labels the data cell
/// at the same position in the following row.
fn process_table(
    table: ElementRef<'_>,
    state: &mut SectionState<'_>,
    quotes: &mut Vec<RawQuote>,
    stats: &ExtractionStats,
) {
    let Some(unit) = state.unit.clone() else {
        warn!(
            faction = %state.profile.faction,
            "Table before any unit heading, skipping"
        );
        stats.inc_skipped_tables();
        return;
    };

    let faction = state.profile.faction.name();
    let category = state.category;
    let mut pending_actions: VecDeque<String> = VecDeque::new();

    let rows = child_elements(table).flat_map(|section| child_elements(section));
    for (i, row) in rows.enumerate() {
        if i % 2 == 0 {
            pending_actions.extend(child_elements(row).map(text_of));
            continue;
        }
        for cell in child_elements(row) {
            let action = pending_actions.pop_front().unwrap_or_default();
            for item in cell.select(&LIST_ITEM) {
                quotes.push(RawQuote {
                    value: text_of(item),
                    faction: faction.to_string(),
                    unit: unit.clone(),
                    action: action.clone(),
                    is_melee: category.map(|c| c.is_melee),
                    is_hero: category.map(|c| c.is_hero),
                });
            }
        }
    }

    stats.inc_tables();
    state.finish_table(&unit);
}

fn find_section_heading(document: &Html, faction: Faction) -> Result<ElementRef<'_>> {
    let css = format!("[id=\"{}\"]", faction.name());
    let selector = Selector::parse(&css)
        .map_err(|e| anyhow!("Invalid anchor selector {}: {:?}", css, e))?;

    let anchor = document
        .select(&selector)
        .next()
        .ok_or_else(|| anyhow!("No section anchor for {}", faction))?;

    if heading_level(anchor).is_some() {
        return Ok(anchor);
    }
    match anchor.parent().and_then(ElementRef::wrap) {
        Some(heading) => Ok(heading),
        None => bail!("Section anchor for {} has no parent element", faction),
    }
}

/// Walks one faction section of `html`, appending every quote to `quotes`.
///
/// Quotes found before an error stay in `quotes`.
pub fn extract_quotes(
    html: &str,
    profile: &FactionProfile,
    quotes: &mut Vec<RawQuote>,
    stats: &ExtractionStats,
) -> Result<()> {
    let document = Html::parse_document(html);
    let heading = find_section_heading(&document, profile.faction)?;
    let mut state = SectionState::new(profile);

    for element in heading.next_siblings().filter_map(ElementRef::wrap) {
        match classify(element) {
            SectionElement::Boundary => break,
            SectionElement::GroupHeading(h) => state.enter_group(&text_of(h)),
            SectionElement::UnitHeading(h) => state.enter_unit(h),
            SectionElement::SwitchHeading(h) => state.enter_switch(&text_of(h)),
            SectionElement::Table(table) => process_table(table, &mut state, quotes, stats),
            SectionElement::Other => {}
        }
    }

    Ok(())
}

/// Fetches the page and writes `<order>-<faction>.json` into `output_dir`.
///
/// Fetch and traversal errors are logged and the quotes gathered so far are
/// written anyway; only the file write itself can fail.
pub async fn extract_faction(
    client: &reqwest::Client,
    url: &str,
    order: u32,
    faction: Faction,
    output_dir: &Path,
    stats: &ExtractionStats,
) -> Result<PathBuf> {
    info!(faction = %faction, "Extracting quotes");
    let profile = FactionProfile::for_faction(faction);
    let mut quotes = Vec::new();

    let outcome = match fetch_document(client, url).await {
        Ok(html) => extract_quotes(&html, &profile, &mut quotes, stats),
        Err(e) => Err(e),
    };
    if let Err(e) = outcome {
        stats.inc_failed_factions();
        error!(
            faction = %faction,
            kept = quotes.len(),
            "Extraction failed: {:#}", e
        );
    }

    stats.add_quotes(quotes.len() as u64);
    let path = output_dir.join(faction.file_name(order));
    write_json(&path, &quotes)?;
    info!(
        faction = %faction,
        quotes = quotes.len(),
        path = %path.display(),
        "Wrote raw quotes"
    );
    Ok(path)
}

/// Extracts every faction concurrently on the current task.
///
/// Faction files may complete in any order. A failed fetch only affects its
/// own faction; a failed write is reported once all factions are done.
pub async fn run_extraction(
    url: &str,
    output_dir: &Path,
    factions: &[(u32, Faction)],
    timeout: Option<Duration>,
) -> Result<ExtractionStats> {
    fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create extract directory: {}",
            output_dir.display()
        )
    })?;

    let client = build_client(timeout)?;
    let stats = ExtractionStats::new();

    let pb = ProgressBar::new(factions.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("    {spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} factions {msg}")?
            .progress_chars("=> "),
    );

    let tasks = factions.iter().map(|&(order, faction)| {
        let client = &client;
        let stats = &stats;
        let pb = &pb;
        async move {
            let result = extract_faction(client, url, order, faction, output_dir, stats).await;
            pb.inc(1);
            pb.set_message(faction.name());
            (faction, result)
        }
    });
    let results = join_all(tasks).await;
    pb.finish_and_clear();

    let mut failed_writes = 0usize;
    for (faction, result) in results {
        if let Err(e) = result {
            error!(faction = %faction, "Failed to write raw quotes: {:#}", e);
            failed_writes += 1;
        }
    }
    if failed_writes > 0 {
        bail!("Failed to write raw quotes for {} faction(s)", failed_writes);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(section: &str) -> String {
        format!(
            r#"<html><body>
            <h2><span class="mw-headline" id="Intro">Intro</span></h2>
            <p>Lead text.</p>
            {section}
            <h2><span class="mw-headline" id="References">References</span></h2>
            <h4><span id="Trailing">Trailing</span></h4>
            <table><tr><th>Attack order</th></tr><tr><td><ul><li>Outside</li></ul></td></tr></table>
            </body></html>"#
        )
    }

    fn extract(html: &str, faction: Faction) -> (Vec<RawQuote>, ExtractionStats) {
        let profile = FactionProfile::for_faction(faction);
        let stats = ExtractionStats::new();
        let mut quotes = Vec::new();
        extract_quotes(html, &profile, &mut quotes, &stats).unwrap();
        (quotes, stats)
    }

    #[test]
    fn pairs_header_cells_with_data_cells_by_position() {
        let html = page(
            r#"<h2><span id="Terran">Terran</span></h2>
            <h4><span id="Marine">Marine</span></h4>
            <table>
              <tr><th>A</th><th>B</th></tr>
              <tr><td><ul><li>X quote</li></ul></td><td><ul><li>Y quote</li></ul></td></tr>
            </table>"#,
        );
        let (quotes, stats) = extract(&html, Faction::Terran);
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].value, "X quote");
        assert_eq!(quotes[0].action, "A");
        assert_eq!(quotes[1].value, "Y quote");
        assert_eq!(quotes[1].action, "B");
        assert_eq!(quotes[0].unit, "Marine");
        assert_eq!(quotes[0].faction, "Terran");
        assert_eq!(stats.tables(), 1);
    }

    #[test]
    fn every_list_item_in_a_cell_becomes_a_quote() {
        let html = page(
            r#"<h2><span id="Zerg">Zerg</span></h2>
            <h4><span id="Zergling">Zergling</span></h4>
            <table>
              <tr><th>Birth</th></tr>
              <tr><td><ul><li>One</li><li>Two</li><li>Three</li></ul></td></tr>
              <tr><th>Move order</th></tr>
              <tr><td><ul><li>Four</li></ul></td></tr>
            </table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Zerg);
        let actions: Vec<_> = quotes.iter().map(|q| q.action.as_str()).collect();
        assert_eq!(actions, vec!["Birth", "Birth", "Birth", "Move order"]);
        assert_eq!(quotes[3].value, "Four");
    }

    #[test]
    fn stops_at_next_top_level_heading() {
        let html = page(
            r#"<h2><span id="Protoss">Protoss</span></h2>
            <h4><span id="Zealot">Zealot</span></h4>
            <table><tr><th>Attack order</th></tr><tr><td><ul><li>En Taro Adun!</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Protoss);
        assert_eq!(quotes.len(), 1);
        assert!(quotes.iter().all(|q| q.value != "Outside"));
    }

    #[test]
    fn unit_changes_only_on_unit_headings() {
        let html = page(
            r#"<h2><span id="Terran">Terran</span></h2>
            <h4><span id="SCV">SCV</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>SCV good to go, sir.</li></ul></td></tr></table>
            <h4>Untitled</h4>
            <h3><span id="Other_units">Other units</span></h3>
            <table><tr><th>Other lines</th></tr><tr><td><ul><li>I can't build there.</li></ul></td></tr></table>
            <h4><span id="Siege_Tank">Siege Tank</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>Ready to roll out!</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Terran);
        let units: Vec<_> = quotes.iter().map(|q| q.unit.as_str()).collect();
        assert_eq!(units, vec!["SCV", "SCV", "Siege_Tank"]);
    }

    #[test]
    fn table_before_any_unit_is_skipped() {
        let html = page(
            r#"<h2><span id="Zerg">Zerg</span></h2>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>Orphan</li></ul></td></tr></table>
            <h4><span id="Drone">Drone</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>Drone born</li></ul></td></tr></table>"#,
        );
        let (quotes, stats) = extract(&html, Faction::Zerg);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].value, "Drone born");
        assert_eq!(stats.skipped_tables(), 1);
        assert_eq!(stats.tables(), 1);
    }

    #[test]
    fn action_queue_is_reset_for_each_table() {
        let html = page(
            r#"<h2><span id="Terran">Terran</span></h2>
            <h4><span id="Marine">Marine</span></h4>
            <table>
              <tr><th>A</th><th>B</th><th>Leftover</th></tr>
              <tr><td><ul><li>x</li></ul></td><td><ul><li>y</li></ul></td></tr>
            </table>
            <table>
              <tr><th>C</th></tr>
              <tr><td><ul><li>z</li></ul></td></tr>
            </table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Terran);
        assert_eq!(quotes[2].value, "z");
        assert_eq!(quotes[2].action, "C");
    }

    #[test]
    fn data_cell_without_header_gets_empty_action() {
        let html = page(
            r#"<h2><span id="Terran">Terran</span></h2>
            <h4><span id="Marine">Marine</span></h4>
            <table>
              <tr><th>A</th></tr>
              <tr><td><ul><li>x</li></ul></td><td><ul><li>y</li></ul></td></tr>
            </table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Terran);
        assert_eq!(quotes[1].value, "y");
        assert_eq!(quotes[1].action, "");
    }

    #[test]
    fn ungrouped_factions_carry_no_flags() {
        let html = page(
            r#"<h2><span id="Terran">Terran</span></h2>
            <h3><span id="Heroes">Heroes</span></h3>
            <h4><span id="Raynor">Raynor</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>Jim Raynor here.</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Terran);
        assert_eq!(quotes[0].is_hero, None);
        assert_eq!(quotes[0].is_melee, None);
    }

    #[test]
    fn grouped_faction_tracks_categories() {
        let html = page(
            r#"<h2><span id="Hybrid">Hybrid</span></h2>
            <h3><span id="Campaign">Campaign</span></h3>
            <h4><span id="Hybrid_Destroyer">Hybrid Destroyer</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>campaign line</li></ul></td></tr></table>
            <h3><span id="Versus">Versus</span></h3>
            <h4><span id="Hybrid_Dominator">Hybrid Dominator</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>versus line</li></ul></td></tr></table>
            <h5>Heroes</h5>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>hero line</li></ul></td></tr></table>
            <h3><span id="Trivia">Trivia</span></h3>
            <h4><span id="Hybrid_Behemoth">Hybrid Behemoth</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>default line</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Hybrid);
        let flags: Vec<_> = quotes.iter().map(|q| (q.is_melee, q.is_hero)).collect();
        assert_eq!(
            flags,
            vec![
                (Some(false), Some(false)),
                (Some(true), Some(false)),
                (Some(false), Some(true)),
                (Some(false), Some(false)),
            ]
        );
    }

    #[test]
    fn matching_unit_heading_refines_category() {
        let html = page(
            r#"<h2><span id="Hybrid">Hybrid</span></h2>
            <h3><span id="Campaign">Campaign</span></h3>
            <h4><span id="Maar">Hero Maar</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>maar line</li></ul></td></tr></table>
            <h4><span id="Hybrid_Destroyer">Hybrid Destroyer</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>destroyer line</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Hybrid);
        assert_eq!(quotes[0].unit, "Maar");
        assert_eq!(quotes[0].is_hero, Some(true));
        assert_eq!(quotes[0].is_melee, Some(false));
        assert_eq!(quotes[1].unit, "Hybrid_Destroyer");
        assert_eq!(quotes[1].is_hero, Some(true));
    }

    #[test]
    fn unit_id_searches_past_first_child() {
        let html = page(
            r#"<h2><span id="Terran">Terran</span></h2>
            <h4><b>Ghost</b><span id="Ghost">Ghost</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>Somebody call for an exterminator?</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Terran);
        assert_eq!(quotes[0].unit, "Ghost");
    }

    #[test]
    fn special_unit_resets_category_once() {
        let html = page(
            r#"<h2><span id="Hybrid">Hybrid</span></h2>
            <h3><span id="Versus">Versus</span></h3>
            <h4><span id="Hybrid_Reaver">Hybrid Reaver</span></h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>first</li></ul></td></tr></table>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>second</li></ul></td></tr></table>
            <h3><span id="Versus_2">Versus</span></h3>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>third</li></ul></td></tr></table>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>fourth</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Hybrid);
        let melee: Vec<_> = quotes.iter().map(|q| q.is_melee).collect();
        assert_eq!(melee, vec![Some(true), Some(false), Some(true), Some(true)]);
    }

    #[test]
    fn anchor_on_heading_itself_is_supported() {
        let html = page(
            r#"<h2 id="Zerg">Zerg</h2>
            <h4 id="Roach">Roach</h4>
            <table><tr><th>Birth</th></tr><tr><td><ul><li>Roach ready.</li></ul></td></tr></table>"#,
        );
        let (quotes, _) = extract(&html, Faction::Zerg);
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].unit, "Roach");
    }

    #[test]
    fn missing_anchor_is_an_error() {
        let html = page("<p>No factions here.</p>");
        let profile = FactionProfile::for_faction(Faction::Protoss);
        let stats = ExtractionStats::new();
        let mut quotes = Vec::new();
        let err = extract_quotes(&html, &profile, &mut quotes, &stats).unwrap_err();
        assert!(err.to_string().contains("Protoss"));
        assert!(quotes.is_empty());
    }
}
