//! Prompt categorization using an ordered keyword table.
//!
//! Pure and total: every text lands in exactly one category, `general`
//! being the catch-all. Rules are evaluated in table order and the first
//! match wins, since keyword sets overlap ("teach the business team").

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Bumped whenever keywords, order or hints change.
pub const CATEGORY_TABLE_VERSION: u32 = 2;

/// Coarse domain of a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Marketing,
    Business,
    Code,
    Design,
    Education,
    Presentation,
    General,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Marketing => "marketing",
            Category::Business => "business",
            Category::Code => "code",
            Category::Design => "design",
            Category::Education => "education",
            Category::Presentation => "presentation",
            Category::General => "general",
        }
    }

    /// Instruction hint handed to the model alongside the user's text.
    pub fn hint(&self) -> &'static str {
        match self {
            Category::Marketing => {
                "Marketing or communication prompt. Focus on tone, conversion, and measurable outcomes."
            }
            Category::Business => {
                "Business or strategy prompt. Focus on clarity, structure, and actionable insights."
            }
            Category::Code => {
                "Technical prompt. Focus on precision, inputs, and implementation clarity."
            }
            Category::Design => "Design or creative prompt. Focus on visual clarity and intent.",
            Category::Education => "Educational prompt. Focus on clarity, examples, and depth.",
            Category::Presentation => {
                "Presentation prompt. Focus on narrative flow, slide structure, and audience takeaways."
            }
            Category::General => "General prompt. Focus on purpose, structure, and readability.",
        }
    }
}

/// Keyword rules in evaluation order. `general` has no rule; it is what remains.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (
        Category::Marketing,
        &["marketing", "campaign", "brand", "advert", "newsletter", "seo"],
    ),
    (
        Category::Business,
        &["strategy", "business", "revenue", "stakeholder", "investor"],
    ),
    (
        Category::Code,
        &["code", "api", "function", "script", "debug", "program"],
    ),
    (
        Category::Design,
        &["design", "visual", "logo", "layout", "mockup"],
    ),
    (
        Category::Education,
        &["teach", "learn", "lesson", "course", "student", "tutorial"],
    ),
    (
        Category::Presentation,
        &["presentation", "slide", "deck", "keynote", "pitch"],
    ),
];

struct CategoryRule {
    category: Category,
    pattern: Regex,
}

// Keywords match at a word start, so "learn" covers "learning" while "api" skips "rapid".
// NOTE: expect() is acceptable here, the patterns are built from the static table above.
static COMPILED_RULES: LazyLock<Vec<CategoryRule>> = LazyLock::new(|| {
    CATEGORY_RULES
        .iter()
        .map(|(category, keywords)| {
            let alternation = keywords
                .iter()
                .map(|k| regex::escape(k))
                .collect::<Vec<_>>()
                .join("|");
            CategoryRule {
                category: *category,
                pattern: Regex::new(&format!(r"\b(?:{})", alternation))
                    .expect("Invalid regex: category keyword table"),
            }
        })
        .collect()
});

/// Result of categorization: the category and its hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Categorization {
    pub category: Category,
    pub hint: &'static str,
}

/// Maps raw text to its category and hint.
pub fn categorize(text: &str) -> Categorization {
    let lowered = text.to_lowercase();
    let category = COMPILED_RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&lowered))
        .map(|rule| rule.category)
        .unwrap_or(Category::General);

    Categorization {
        category,
        hint: category.hint(),
    }
}
