// Escrow Insights - Core Library
// Keyword classification and grouping for escrow transaction history.
// Exposes all modules for use in CLI, API server, and tests

pub mod classifier;
pub mod config;
pub mod error;
pub mod grouping;
pub mod logging;
pub mod stats;
pub mod taxonomy;
pub mod transaction;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use classifier::{classify, classify_with_match, resolve_suggestion, Classification};
pub use config::Config;
pub use error::TaxonomyError;
pub use grouping::{
    group_by_first_seen, group_by_taxonomy, group_failures, group_messages, CategoryGroup,
};
pub use logging::init_logging;
pub use stats::{summarize, CategorySummary, DashboardStats};
pub use taxonomy::{Category, Taxonomy};
pub use transaction::{
    format_ada, load_csv, load_history, load_json, lovelace_to_ada, EscrowTransaction, TxStatus,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
