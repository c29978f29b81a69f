//! Unit categories for factions whose section groups units into
//! campaign, versus and hero subsections.

use crate::models::Faction;

/// The melee/hero classification attached to every quote of a grouped faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Category {
    pub is_melee: bool,
    pub is_hero: bool,
}

/// Ordered phrase rules, first match wins.
pub type CategoryRules = &'static [(&'static str, Category)];

const GROUPED_RULES: CategoryRules = &[
    (
        "Hero",
        Category {
            is_melee: false,
            is_hero: true,
        },
    ),
    (
        "Versus",
        Category {
            is_melee: true,
            is_hero: false,
        },
    ),
    (
        "Melee",
        Category {
            is_melee: true,
            is_hero: false,
        },
    ),
    (
        "Campaign",
        Category {
            is_melee: false,
            is_hero: false,
        },
    ),
];

/// How one faction's section is laid out in the source page.
#[derive(Debug, Clone, Copy)]
pub struct FactionProfile {
    pub faction: Faction,
    /// Category lexicon; `None` for factions that carry no melee/hero flags
    pub rules: Option<CategoryRules>,
    /// Unit whose first table is followed by a category reset
    pub reset_after_unit: Option<&'static str>,
}

impl FactionProfile {
    pub fn for_faction(faction: Faction) -> Self {
        match faction {
            Faction::Hybrid => Self {
                faction,
                rules: Some(GROUPED_RULES),
                // The page lists this unit's versus table right after its
                // campaign table without a new group heading.
                reset_after_unit: Some("Hybrid_Reaver"),
            },
            _ => Self {
                faction,
                rules: None,
                reset_after_unit: None,
            },
        }
    }

    pub fn is_grouped(&self) -> bool {
        self.rules.is_some()
    }

    /// Category this faction starts with and falls back to on reset.
    pub fn default_category(&self) -> Option<Category> {
        self.rules.map(|_| Category::default())
    }

    /// First rule whose phrase occurs in `text`.
    pub fn match_category(&self, text: &str) -> Option<Category> {
        self.rules?
            .iter()
            .find(|(phrase, _)| text.contains(phrase))
            .map(|(_, category)| *category)
    }
}
