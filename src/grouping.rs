// 📂 Grouping - bucket items by classifier output
//
// Two materialization strategies exist and both are kept:
// - taxonomy order with empty buckets dropped (message topics)
// - first-seen order, buckets created lazily (failure reasons)

use crate::classifier::classify_with_match;
use crate::taxonomy::{Category, Taxonomy};
use crate::transaction::{non_blank, EscrowTransaction};

/// One non-empty bucket of a grouping result
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a, T> {
    pub category: &'a Category,
    pub items: Vec<&'a T>,
}

impl<'a, T> CategoryGroup<'a, T> {
    pub fn name(&self) -> &'a str {
        &self.category.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Group items in taxonomy order, dropping categories nobody landed in.
///
/// Items whose text is absent or blank are skipped entirely.
pub fn group_by_taxonomy<'a, T, F>(
    items: &'a [T],
    taxonomy: &'a Taxonomy,
    text: F,
) -> Vec<CategoryGroup<'a, T>>
where
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut buckets: Vec<CategoryGroup<'a, T>> = taxonomy
        .categories()
        .iter()
        .map(|category| CategoryGroup {
            category,
            items: Vec::new(),
        })
        .collect();

    for item in items {
        let Some(body) = non_blank(text(item)) else {
            continue;
        };

        let classification = classify_with_match(taxonomy, body);
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|bucket| std::ptr::eq(bucket.category, classification.category))
        {
            bucket.items.push(item);
        }
    }

    buckets.retain(|bucket| !bucket.is_empty());
    buckets
}

/// Group items in order of first appearance of each category.
///
/// Items whose text is absent or blank are skipped entirely.
pub fn group_by_first_seen<'a, T, I, F>(
    items: I,
    taxonomy: &'a Taxonomy,
    text: F,
) -> Vec<CategoryGroup<'a, T>>
where
    I: IntoIterator<Item = &'a T>,
    T: 'a,
    F: Fn(&'a T) -> Option<&'a str>,
{
    let mut groups: Vec<CategoryGroup<'a, T>> = Vec::new();

    for item in items {
        let Some(body) = non_blank(text(item)) else {
            continue;
        };

        let category = classify_with_match(taxonomy, body).category;
        match groups
            .iter_mut()
            .find(|group| std::ptr::eq(group.category, category))
        {
            Some(group) => group.items.push(item),
            None => groups.push(CategoryGroup {
                category,
                items: vec![item],
            }),
        }
    }

    groups
}

/// Transaction notes by message topic
pub fn group_messages<'a>(
    transactions: &'a [EscrowTransaction],
    taxonomy: &'a Taxonomy,
) -> Vec<CategoryGroup<'a, EscrowTransaction>> {
    let groups = group_by_taxonomy(transactions, taxonomy, EscrowTransaction::message_text);

    tracing::debug!(
        taxonomy = taxonomy.name(),
        transactions = transactions.len(),
        groups = groups.len(),
        "grouped transactions by message"
    );

    groups
}

/// Failed transactions by failure reason
pub fn group_failures<'a>(
    transactions: &'a [EscrowTransaction],
    taxonomy: &'a Taxonomy,
) -> Vec<CategoryGroup<'a, EscrowTransaction>> {
    let failed = transactions.iter().filter(|tx| tx.is_failed());
    let groups = group_by_first_seen(failed, taxonomy, EscrowTransaction::error_text);

    tracing::debug!(
        taxonomy = taxonomy.name(),
        transactions = transactions.len(),
        groups = groups.len(),
        "grouped failed transactions by reason"
    );

    groups
}

// ============================================================================
// TESTS
// ============================================================================
