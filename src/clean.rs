use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n|\r").unwrap());

static PARENTHETICAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*[^*]*\*").unwrap());

/// Greedy: runs from the first `<` to the last `>` not separated by a `*`.
static ANGLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^*]*>").unwrap());

static QUESTION_LETTER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\?)([A-Za-z])").unwrap());

/// Ordered `(substring, replacement)` rules, first match wins.
pub type Lexicon = &'static [(&'static str, &'static str)];

pub const UNIT_LEXICON: Lexicon = &[
    ("Fenix", "Talandar"),
    ("Mothership_Core", "Mothership"),
    ("Dominion_Laborer", "Dominion Trooper"),
];

pub const ACTION_LEXICON: Lexicon = &[
    ("Repeatedly selected", "Pissed"),
    ("Other lines", "Other"),
    ("Attack order", "Attack"),
    ("Move order", "Move"),
    ("When attacked", "Attacked"),
    ("Confirming order", "Confirming"),
];

/// Anchor-id escapes left by the wiki in unit identifiers.
const UNIT_ESCAPES: &[(&str, &str)] = &[(".2F", " "), (".27", "'"), ("_", " ")];

pub fn lookup(lexicon: Lexicon, raw: &str) -> Option<&'static str> {
    lexicon
        .iter()
        .find(|(needle, _)| raw.contains(needle))
        .map(|(_, replacement)| *replacement)
}

/// Strips markup noise from a free-text field.
///
/// Double spaces are collapsed in a single pass, so runs of three or more
/// spaces are only halved.
pub fn clean_string(value: &str) -> String {
    let s = LINE_BREAK_REGEX.replace_all(value, " ");
    let s = s.replace('"', "");
    let s = PARENTHETICAL_REGEX.replace_all(&s, "");
    let s = EMPHASIS_REGEX.replace_all(&s, "");
    let s = ANGLE_REGEX.replace_all(&s, "");
    let s = s.replace("  ", " ");
    let s = QUESTION_LETTER_REGEX.replace_all(&s, "$1 $2");
    s.trim().to_string()
}

pub fn clean_unit(unit: &str) -> String {
    if let Some(fixed) = lookup(UNIT_LEXICON, unit) {
        return fixed.to_string();
    }
    UNIT_ESCAPES
        .iter()
        .fold(clean_string(unit), |s, &(escape, replacement)| {
            s.replace(escape, replacement)
        })
}

pub fn clean_action(action: &str) -> String {
    match lookup(ACTION_LEXICON, action) {
        Some(fixed) => fixed.to_string(),
        None => clean_string(action),
    }
}

pub fn clean_faction(faction: &str) -> String {
    clean_string(faction)
}

pub fn clean_value(value: &str) -> String {
    clean_string(value)
}
