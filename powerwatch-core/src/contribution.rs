// Contribution totals per entity

use crate::model::{Amount, Edge};
use crate::normalize::CONTRIBUTION;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionSummary {
    pub entity: String,
    /// Sum of the known amounts.
    pub total: Decimal,
    /// Contribution edges selected.
    pub edges: usize,
    /// Sum of the parsed contribution counts.
    pub contribution_count: i64,
    /// Edges with empty metadata.
    pub no_data: usize,
    /// Edges whose metadata could not be read as an amount.
    pub unknown: usize,
}

fn selects(edge: &Edge, entity: &str, both: bool) -> bool {
    if edge.relationship != CONTRIBUTION {
        return false;
    }
    edge.from_node == entity || (both && edge.to_node == entity)
}

/// Total contributed by `entity` across normalized `edges`.
///
/// With `both` the entity may also be the recipient, which mixes money in
/// and money out into one figure. Unknown amounts do not count towards the
/// total.
pub fn total_for_entity(entity: &str, edges: &[Edge], both: bool) -> Decimal {
    edges
        .iter()
        .filter(|e| selects(e, entity, both))
        .filter_map(|e| e.amount.and_then(|a| a.known()))
        .sum()
}

/// Total plus a breakdown of what went into it.
pub fn summarize_entity(entity: &str, edges: &[Edge], both: bool) -> ContributionSummary {
    let mut summary = ContributionSummary {
        entity: entity.to_string(),
        total: Decimal::ZERO,
        edges: 0,
        contribution_count: 0,
        no_data: 0,
        unknown: 0,
    };

    for edge in edges.iter().filter(|e| selects(e, entity, both)) {
        summary.edges += 1;
        summary.contribution_count += edge.contribution_count;
        match edge.amount {
            Some(Amount::Known(value)) => summary.total += value,
            Some(Amount::NoData) => summary.no_data += 1,
            Some(Amount::Unknown) => summary.unknown += 1,
            None => {}
        }
    }

    debug!(
        "Contributions for {}: {} edges, total {}",
        entity, summary.edges, summary.total
    );
    summary
}

/// Contributors ranked by known total, largest first, ties by name.
pub fn top_contributors(edges: &[Edge], limit: usize) -> Vec<(String, Decimal)> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for edge in edges.iter().filter(|e| e.relationship == CONTRIBUTION) {
        let entry = totals.entry(edge.from_node.as_str()).or_insert(Decimal::ZERO);
        if let Some(value) = edge.amount.and_then(|a| a.known()) {
            *entry += value;
        }
    }

    let mut ranked: Vec<(String, Decimal)> = totals
        .into_iter()
        .map(|(name, total)| (name.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}
