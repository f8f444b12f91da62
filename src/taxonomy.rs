// 🏷️ Taxonomies - Categories as Data
// Ordered keyword tables with a mandatory trailing catch-all.
//
// Precedence is position in the list. The classifier never reorders,
// scores or merges categories.

use crate::error::TaxonomyError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Human-readable identifier (e.g., "Food & Dining", "Timeout")
    pub name: String,

    /// Lowercase substrings; empty only for the catch-all
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Optional icon for UI (e.g., "🍽️")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Optional color for UI (e.g., "#FF5733")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Category {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Category {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            icon: None,
            color: None,
        }
    }

    /// Create category with icon and color
    pub fn with_display(name: &str, keywords: &[&str], icon: &str, color: &str) -> Self {
        let mut category = Self::new(name, keywords);
        category.icon = Some(icon.to_string());
        category.color = Some(color.to_string());
        category
    }

    /// Catch-all categories carry no keywords
    pub fn is_catch_all(&self) -> bool {
        self.keywords.is_empty()
    }

    /// First keyword contained in `lowered`, which must already be lowercase
    pub fn first_match(&self, lowered: &str) -> Option<&str> {
        self.keywords
            .iter()
            .find(|keyword| lowered.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

// ============================================================================
// BUILT-IN TABLES
// ============================================================================

type TableRow = (&'static str, &'static [&'static str], &'static str, &'static str);

const MESSAGE_TOPICS: &[TableRow] = &[
    (
        "Payments & Purchases",
        &["pay", "purchase", "buy", "bought", "shopping", "order", "invoice", "bill", "rent"],
        "💳",
        "#2196F3",
    ),
    (
        "Gifts & Tips",
        &["gift", "tip", "present", "birthday", "thanks", "thank you", "donation"],
        "🎁",
        "#E91E63",
    ),
    (
        "Business & Work",
        &["business", "work", "contract", "salary", "freelance", "project", "client", "service"],
        "💼",
        "#3F51B5",
    ),
    (
        "Family & Friends",
        &["family", "mom", "dad", "friend", "brother", "sister", "kids"],
        "👨‍👩‍👧",
        "#FF9800",
    ),
    (
        "Food & Dining",
        &["food", "dinner", "lunch", "breakfast", "coffee", "restaurant", "pizza", "meal"],
        "🍽️",
        "#FF5733",
    ),
    (
        "Testing & Development",
        &["test", "dev", "demo", "debug", "trial"],
        "🧪",
        "#9C27B0",
    ),
    ("Other Messages", &[], "💬", "#9E9E9E"),
];

const FAILURE_REASONS: &[TableRow] = &[
    (
        "Insufficient Funds",
        &["insufficient", "not enough", "balance", "funds", "utxo"],
        "💸",
        "#F44336",
    ),
    (
        "User Cancelled",
        &["cancel", "declined", "rejected", "denied", "user abort"],
        "🚫",
        "#FF9800",
    ),
    (
        "Network Issues",
        &["network", "connection", "fetch", "offline", "disconnected"],
        "🌐",
        "#03A9F4",
    ),
    (
        "Invalid Address",
        &["invalid address", "address", "bech32", "malformed"],
        "📭",
        "#795548",
    ),
    ("Timeout", &["timeout", "timed out", "expired"], "⏱️", "#FFC107"),
    ("Other Errors", &[], "❓", "#9E9E9E"),
];

// ============================================================================
// TAXONOMY
// ============================================================================

/// Ordered categories ending in exactly one catch-all.
///
/// Fields are private so every value in circulation has passed
/// [`Taxonomy::new`] or comes from a built-in table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyDef")]
pub struct Taxonomy {
    name: String,
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct TaxonomyDef {
    name: String,
    categories: Vec<Category>,
}

impl TryFrom<TaxonomyDef> for Taxonomy {
    type Error = TaxonomyError;

    fn try_from(def: TaxonomyDef) -> Result<Self, Self::Error> {
        Taxonomy::new(def.name, def.categories)
    }
}

impl Taxonomy {
    /// Validate and build a taxonomy
    pub fn new(name: impl Into<String>, categories: Vec<Category>) -> Result<Self, TaxonomyError> {
        let name = name.into();
        validate(&name, &categories)?;
        Ok(Taxonomy { name, categories })
    }

    /// Transaction note topics, "Other Messages" last
    pub fn message_topics() -> Self {
        Self::from_table("messages", MESSAGE_TOPICS)
    }

    /// Failed-transaction reasons, "Other Errors" last
    pub fn failure_reasons() -> Self {
        Self::from_table("failures", FAILURE_REASONS)
    }

    fn from_table(name: &str, rows: &[TableRow]) -> Self {
        let categories = rows
            .iter()
            .map(|(category, keywords, icon, color)| {
                Category::with_display(category, keywords, icon, color)
            })
            .collect();

        Taxonomy {
            name: name.to_string(),
            categories,
        }
    }

    /// Parse a taxonomy from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse taxonomy JSON")
    }

    /// Load a taxonomy from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read taxonomy file: {:?}", path.as_ref()))?;

        let taxonomy = Self::from_json_str(&content)
            .with_context(|| format!("Invalid taxonomy in {:?}", path.as_ref()))?;

        tracing::info!(
            taxonomy = %taxonomy.name,
            categories = taxonomy.len(),
            "loaded taxonomy from file"
        );

        Ok(taxonomy)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Categories in precedence order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// The trailing keyword-less category
    pub fn catch_all(&self) -> &Category {
        &self.categories[self.categories.len() - 1]
    }

    /// Find category by name (case-insensitive, trimmed)
    pub fn get(&self, name: &str) -> Option<&Category> {
        let wanted = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|category| category.name.to_lowercase() == wanted)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always false for a constructed taxonomy
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn validate(taxonomy: &str, categories: &[Category]) -> Result<(), TaxonomyError> {
    let Some(last) = categories.last() else {
        return Err(TaxonomyError::Empty {
            taxonomy: taxonomy.to_string(),
        });
    };

    if !last.is_catch_all() {
        return Err(TaxonomyError::MissingCatchAll {
            taxonomy: taxonomy.to_string(),
            last: last.name.clone(),
        });
    }

    let mut seen = HashSet::new();

    for (position, category) in categories.iter().enumerate() {
        if !seen.insert(category.name.trim().to_lowercase()) {
            return Err(TaxonomyError::DuplicateCategory {
                taxonomy: taxonomy.to_string(),
                category: category.name.clone(),
            });
        }

        if category.is_catch_all() && position + 1 < categories.len() {
            return Err(TaxonomyError::CatchAllNotLast {
                taxonomy: taxonomy.to_string(),
                category: category.name.clone(),
            });
        }

        for keyword in &category.keywords {
            if keyword.trim().is_empty() {
                return Err(TaxonomyError::EmptyKeyword {
                    taxonomy: taxonomy.to_string(),
                    category: category.name.clone(),
                });
            }

            if *keyword != keyword.to_lowercase() {
                return Err(TaxonomyError::KeywordNotLowercase {
                    taxonomy: taxonomy.to_string(),
                    category: category.name.clone(),
                    keyword: keyword.clone(),
                });
            }
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
