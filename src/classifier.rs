// 🔎 Keyword Classifier
// Ordered rule list + first-match-wins + catch-all fallback.
//
// Matching is plain substring search on the lowercased text, so "testing"
// hits "test" and "payroll" hits "pay". Callers rely on that behavior.

use crate::taxonomy::{Category, Taxonomy};

/// Outcome of classifying one piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'t> {
    pub category: &'t Category,

    /// Keyword that fired; `None` means the catch-all was used
    pub keyword: Option<&'t str>,
}

impl<'t> Classification<'t> {
    pub fn name(&self) -> &'t str {
        &self.category.name
    }

    pub fn is_fallback(&self) -> bool {
        self.keyword.is_none()
    }
}

/// Classify `text` against `taxonomy`, reporting the keyword that fired
pub fn classify_with_match<'t>(taxonomy: &'t Taxonomy, text: &str) -> Classification<'t> {
    let lowered = text.to_lowercase();

    for category in taxonomy.categories() {
        if let Some(keyword) = category.first_match(&lowered) {
            return Classification {
                category,
                keyword: Some(keyword),
            };
        }
    }

    Classification {
        category: taxonomy.catch_all(),
        keyword: None,
    }
}

/// Name of the first category in `taxonomy` whose keywords occur in `text`
pub fn classify<'t>(taxonomy: &'t Taxonomy, text: &str) -> &'t str {
    classify_with_match(taxonomy, text).name()
}

/// Prefer an externally suggested category, falling back to keywords.
///
/// A suggestion only counts if it names a category of `taxonomy`; anything
/// else (absent, blank, unknown) is ignored.
pub fn resolve_suggestion<'t>(
    taxonomy: &'t Taxonomy,
    suggestion: Option<&str>,
    text: &str,
) -> Classification<'t> {
    if let Some(suggested) = suggestion.map(str::trim).filter(|s| !s.is_empty()) {
        match taxonomy.get(suggested) {
            Some(category) => {
                return Classification {
                    category,
                    keyword: None,
                }
            }
            None => tracing::debug!(
                taxonomy = taxonomy.name(),
                suggested,
                "ignoring suggestion outside taxonomy"
            ),
        }
    }

    classify_with_match(taxonomy, text)
}

impl Taxonomy {
    pub fn classify(&self, text: &str) -> &str {
        classify(self, text)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn messages() -> Taxonomy {
        Taxonomy::message_topics()
    }

    fn failures() -> Taxonomy {
        Taxonomy::failure_reasons()
    }

    #[test]
    fn test_blank_text_is_catch_all() {
        let taxonomy = messages();

        assert_eq!(classify(&taxonomy, ""), "Other Messages");
        assert_eq!(classify(&taxonomy, "   \t\n"), "Other Messages");
        assert!(classify_with_match(&taxonomy, "").is_fallback());
    }

    #[test]
    fn test_case_insensitive() {
        let taxonomy = messages();

        assert_eq!(classify(&taxonomy, "GIFT for mom"), "Gifts & Tips");
        assert_eq!(
            classify(&taxonomy, "GIFT for mom"),
            classify(&taxonomy, "gift for mom")
        );
    }

    #[test]
    fn test_earlier_category_wins() {
        let taxonomy = messages();

        assert_eq!(classify(&taxonomy, "test payment"), "Payments & Purchases");
        assert_eq!(
            classify(&taxonomy, "test payment for shopping"),
            "Payments & Purchases"
        );
    }

    #[test]
    fn test_food_keyword() {
        let taxonomy = messages();
        let result = classify_with_match(&taxonomy, "Let's grab dinner");

        assert_eq!(result.name(), "Food & Dining");
        assert_eq!(result.keyword, Some("dinner"));
    }

    #[test]
    fn test_business_before_food() {
        let taxonomy = messages();

        assert_eq!(
            classify(&taxonomy, "I have a business proposal for dinner contract"),
            "Business & Work"
        );
    }

    #[test]
    fn test_substring_not_word_match() {
        let taxonomy = messages();

        assert_eq!(classify(&taxonomy, "testing the escrow"), "Testing & Development");
        assert_eq!(classify(&taxonomy, "payroll run"), "Payments & Purchases");
        assert_eq!(classify(&taxonomy, "cheapay"), "Payments & Purchases");
    }

    #[test]
    fn test_unmatched_text_is_catch_all() {
        let taxonomy = messages();
        let result = classify_with_match(&taxonomy, "hello there");

        assert_eq!(result.name(), "Other Messages");
        assert_eq!(result.keyword, None);
    }

    #[test]
    fn test_result_is_always_a_member() {
        let taxonomy = messages();
        let samples = [
            "",
            " ",
            "rent for june",
            "COFFEE",
            "dev build",
            "ümlaut ünïcödé",
            "🎉🎉🎉",
            "a very long message that mentions nothing in particular at all",
        ];

        for sample in samples {
            assert!(taxonomy.contains(classify(&taxonomy, sample)), "{sample:?}");
        }
    }

    #[test]
    fn test_failure_reasons() {
        let taxonomy = failures();

        assert_eq!(classify(&taxonomy, "Insufficient funds in wallet"), "Insufficient Funds");
        assert_eq!(classify(&taxonomy, "User declined the transaction"), "User Cancelled");
        assert_eq!(classify(&taxonomy, "Request timed out"), "Timeout");
        assert_eq!(classify(&taxonomy, "Invalid address format"), "Invalid Address");
        assert_eq!(classify(&taxonomy, "Script evaluation failed"), "Other Errors");
    }

    #[test]
    fn test_network_precedes_timeout() {
        let taxonomy = failures();
        let result = classify_with_match(&taxonomy, "Network timeout occurred");

        assert_eq!(result.name(), "Network Issues");
        assert_eq!(result.keyword, Some("network"));
    }

    #[test]
    fn test_custom_taxonomy() {
        let taxonomy = Taxonomy::new(
            "custom",
            vec![
                Category::new("Second", &["b"]),
                Category::new("First", &["a"]),
                Category::new("Rest", &[]),
            ],
        )
        .unwrap();

        assert_eq!(taxonomy.classify("ab"), "Second");
        assert_eq!(taxonomy.classify("a"), "First");
        assert_eq!(taxonomy.classify("z"), "Rest");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let taxonomy = messages();
        let first = classify_with_match(&taxonomy, "Pizza night with family");
        let second = classify_with_match(&taxonomy, "Pizza night with family");

        assert_eq!(first, second);
        assert_eq!(first.name(), "Family & Friends");
    }

    #[test]
    fn test_suggestion_accepted() {
        let taxonomy = messages();
        let result = resolve_suggestion(&taxonomy, Some(" gifts & tips "), "test payment");

        assert_eq!(result.name(), "Gifts & Tips");
        assert!(result.is_fallback());
    }

    #[test]
    fn test_suggestion_unknown_falls_back() {
        let taxonomy = messages();

        let unknown = resolve_suggestion(&taxonomy, Some("Groceries"), "test payment");
        assert_eq!(unknown.name(), "Payments & Purchases");

        let blank = resolve_suggestion(&taxonomy, Some("  "), "lunch money");
        assert_eq!(blank.name(), "Food & Dining");

        let absent = resolve_suggestion(&taxonomy, None, "");
        assert_eq!(absent.name(), "Other Messages");
    }
}
