// Escrow transaction history
// Records as the front-end stores them after submission or explorer fetch.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const LOVELACE_PER_ADA: u64 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Failed,
    Pending,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Success => "success",
            TxStatus::Failed => "failed",
            TxStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowTransaction {
    /// Local identity, generated when the source has none
    #[serde(default = "default_id")]
    pub id: String,

    /// On-chain hash; absent for transactions that never reached the chain
    #[serde(default)]
    pub tx_hash: Option<String>,

    /// Recipient bech32 address
    pub recipient: String,

    pub amount_lovelace: u64,

    /// Free-text note attached by the sender
    #[serde(default)]
    pub message: Option<String>,

    pub status: TxStatus,

    /// Failure reason reported by the wallet or explorer
    #[serde(default)]
    pub error_message: Option<String>,

    pub timestamp: DateTime<Utc>,
}

fn default_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// An empty `id` column counts as absent
fn fill_missing_ids(transactions: &mut [EscrowTransaction]) {
    for transaction in transactions.iter_mut().filter(|tx| tx.id.trim().is_empty()) {
        transaction.id = default_id();
    }
}

impl EscrowTransaction {
    pub fn is_failed(&self) -> bool {
        self.status == TxStatus::Failed
    }

    /// Note text, if present and not blank
    pub fn message_text(&self) -> Option<&str> {
        non_blank(self.message.as_deref())
    }

    /// Error text, if present and not blank
    pub fn error_text(&self) -> Option<&str> {
        non_blank(self.error_message.as_deref())
    }

    pub fn amount_ada(&self) -> f64 {
        lovelace_to_ada(self.amount_lovelace)
    }
}

pub(crate) fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

pub fn lovelace_to_ada(lovelace: u64) -> f64 {
    lovelace as f64 / LOVELACE_PER_ADA as f64
}

/// Render lovelace as ADA with six decimals, e.g. `1.500000 ADA`
pub fn format_ada(lovelace: u64) -> String {
    format!(
        "{}.{:06} ADA",
        lovelace / LOVELACE_PER_ADA,
        lovelace % LOVELACE_PER_ADA
    )
}

// ============================================================================
// LOADERS
// ============================================================================

pub fn load_json(path: &Path) -> Result<Vec<EscrowTransaction>> {
    let file = File::open(path).with_context(|| format!("Failed to open history file: {:?}", path))?;

    let mut transactions: Vec<EscrowTransaction> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse transaction history: {:?}", path))?;
    fill_missing_ids(&mut transactions);

    Ok(transactions)
}

pub fn load_csv(path: &Path) -> Result<Vec<EscrowTransaction>> {
    let mut rdr = csv::Reader::from_path(path).context("Failed to open CSV file")?;

    let mut transactions = Vec::new();

    for result in rdr.deserialize() {
        let transaction: EscrowTransaction = result.context("Failed to deserialize transaction")?;
        transactions.push(transaction);
    }
    fill_missing_ids(&mut transactions);

    Ok(transactions)
}

/// Load history by file extension (`.json` or `.csv`)
pub fn load_history(path: &Path) -> Result<Vec<EscrowTransaction>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    let transactions = match extension.as_deref() {
        Some("json") => load_json(path)?,
        Some("csv") => load_csv(path)?,
        _ => bail!("Unsupported history format: {:?} (expected .json or .csv)", path),
    };

    tracing::info!(path = %path.display(), count = transactions.len(), "loaded transaction history");

    Ok(transactions)
}

// ============================================================================
// TESTS
// ============================================================================
