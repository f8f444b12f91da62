// Dashboard statistics over transaction history

use crate::grouping::CategoryGroup;
use crate::transaction::{EscrowTransaction, TxStatus};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
    /// Lovelace moved by successful transactions only
    pub total_sent_lovelace: u64,
    /// Share of settled (non-pending) transactions that succeeded, 0.0 - 1.0
    pub success_rate: f64,
}

impl DashboardStats {
    pub fn from_transactions(transactions: &[EscrowTransaction]) -> Self {
        let mut stats = DashboardStats {
            total: transactions.len(),
            ..Default::default()
        };

        for tx in transactions {
            match tx.status {
                TxStatus::Success => {
                    stats.succeeded += 1;
                    stats.total_sent_lovelace += tx.amount_lovelace;
                }
                TxStatus::Failed => stats.failed += 1,
                TxStatus::Pending => stats.pending += 1,
            }
        }

        let settled = stats.succeeded + stats.failed;
        if settled > 0 {
            stats.success_rate = stats.succeeded as f64 / settled as f64;
        }

        stats
    }
}

/// Count and lovelace total for one grouping bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub count: usize,
    pub total_lovelace: u64,
}

impl From<&CategoryGroup<'_, EscrowTransaction>> for CategorySummary {
    fn from(group: &CategoryGroup<'_, EscrowTransaction>) -> Self {
        CategorySummary {
            category: group.name().to_string(),
            icon: group.category.icon.clone(),
            count: group.len(),
            total_lovelace: group.items.iter().map(|tx| tx.amount_lovelace).sum(),
        }
    }
}

pub fn summarize(groups: &[CategoryGroup<'_, EscrowTransaction>]) -> Vec<CategorySummary> {
    groups.iter().map(CategorySummary::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_messages;
    use crate::taxonomy::Taxonomy;
    use chrono::Utc;

    fn tx(amount: u64, status: TxStatus, message: &str) -> EscrowTransaction {
        EscrowTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            tx_hash: None,
            recipient: "addr_test1qz".to_string(),
            amount_lovelace: amount,
            message: Some(message.to_string()),
            status,
            error_message: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_empty_history() {
        let stats = DashboardStats::from_transactions(&[]);
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_counts_and_totals() {
        let transactions = vec![
            tx(2_000_000, TxStatus::Success, "lunch"),
            tx(3_000_000, TxStatus::Success, "rent"),
            tx(9_000_000, TxStatus::Failed, "gift"),
            tx(1_000_000, TxStatus::Pending, "gift"),
        ];

        let stats = DashboardStats::from_transactions(&transactions);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.succeeded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_sent_lovelace, 5_000_000);
        assert!((stats.success_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_groups() {
        let taxonomy = Taxonomy::message_topics();
        let transactions = vec![
            tx(2_000_000, TxStatus::Success, "lunch"),
            tx(500_000, TxStatus::Success, "coffee"),
            tx(3_000_000, TxStatus::Success, "rent"),
        ];

        let groups = group_messages(&transactions, &taxonomy);
        let summaries = summarize(&groups);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].category, "Payments & Purchases");
        assert_eq!(summaries[0].total_lovelace, 3_000_000);
        assert_eq!(summaries[1].category, "Food & Dining");
        assert_eq!(summaries[1].count, 2);
        assert_eq!(summaries[1].total_lovelace, 2_500_000);
        assert_eq!(summaries[1].icon.as_deref(), Some("🍽️"));
    }
}
