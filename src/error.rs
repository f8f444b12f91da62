// Taxonomy configuration errors
// A taxonomy that breaks the catch-all invariant is rejected at construction,
// never at classification time.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    /// No categories at all
    #[error("taxonomy `{taxonomy}` has no categories")]
    Empty { taxonomy: String },

    /// Last category has keywords, so nothing catches unmatched text
    #[error("taxonomy `{taxonomy}` has no catch-all: last category `{last}` has keywords")]
    MissingCatchAll { taxonomy: String, last: String },

    /// A keyword-less category sits before the end of the list
    #[error("taxonomy `{taxonomy}`: category `{category}` has no keywords but is not last")]
    CatchAllNotLast { taxonomy: String, category: String },

    #[error("taxonomy `{taxonomy}`: duplicate category name `{category}`")]
    DuplicateCategory { taxonomy: String, category: String },

    /// An empty keyword would substring-match every input
    #[error("taxonomy `{taxonomy}`: category `{category}` contains an empty keyword")]
    EmptyKeyword { taxonomy: String, category: String },

    #[error("taxonomy `{taxonomy}`: keyword `{keyword}` in `{category}` is not lowercase")]
    KeywordNotLowercase {
        taxonomy: String,
        category: String,
        keyword: String,
    },
}
