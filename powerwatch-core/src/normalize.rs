// Relationship and metadata normalization

use crate::model::{Amount, Edge};
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

/// Marker (and canonical category) for monetary contribution edges.
pub const CONTRIBUTION: &str = "contribution";

/// Classify a raw `relationship_type` string.
///
/// Anything mentioning [`CONTRIBUTION`] becomes that category, with the count
/// taken from the text before the marker ("5 contribution to campaign" is 5).
/// A missing or non-numeric prefix counts as a single contribution. Every
/// other string is its own category with a count of 0.
pub fn classify_relationship(raw: &str) -> (String, i64) {
    if !raw.contains(CONTRIBUTION) {
        return (raw.to_string(), 0);
    }

    let count = raw
        .split(CONTRIBUTION)
        .next()
        .map(str::trim)
        .and_then(|prefix| prefix.parse::<i64>().ok())
        .unwrap_or(1);

    (CONTRIBUTION.to_string(), count)
}

/// Parse a currency string such as `$1,200.50` into an exact decimal.
///
/// Everything but ASCII digits and '.' is dropped first. Returns zero when
/// nothing parseable remains.
pub fn parse_currency(text: &str) -> Decimal {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) || cleaned.matches('.').count() > 1 {
        return Decimal::ZERO;
    }

    let mut literal = cleaned.trim_end_matches('.').to_string();
    if literal.starts_with('.') {
        literal.insert(0, '0');
    }

    Decimal::from_str(&literal).unwrap_or(Decimal::ZERO)
}

/// Amount for a contribution edge's `metadata`, read from its first
/// whitespace-delimited token.
pub fn contribution_amount(metadata: &str) -> Amount {
    if metadata.is_empty() {
        return Amount::NoData;
    }
    match metadata.split_whitespace().next() {
        Some(token) => Amount::Known(parse_currency(token)),
        None => Amount::Unknown,
    }
}

/// Compute the derived columns of a single edge in place.
pub fn normalize_edge(edge: &mut Edge) {
    let (relationship, count) = classify_relationship(&edge.relationship_type);
    edge.amount = if relationship == CONTRIBUTION {
        Some(contribution_amount(&edge.metadata))
    } else {
        None
    };
    edge.relationship = relationship;
    edge.contribution_count = count;
}

/// Normalize a whole edge table, returning the annotated copy.
pub fn normalize(edges: &[Edge]) -> Vec<Edge> {
    let mut normalized = edges.to_vec();
    for edge in normalized.iter_mut() {
        normalize_edge(edge);
    }

    let contributions = normalized
        .iter()
        .filter(|e| e.relationship == CONTRIBUTION)
        .count();
    debug!(
        "Normalized {} edges ({} contributions)",
        normalized.len(),
        contributions
    );

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_counted_contribution() {
        assert_eq!(
            classify_relationship("5 contribution to campaign"),
            ("contribution".to_string(), 5)
        );
    }

    #[test]
    fn test_classify_bare_contribution() {
        assert_eq!(
            classify_relationship("contribution"),
            ("contribution".to_string(), 1)
        );
    }

    #[test]
    fn test_classify_non_numeric_prefix_defaults_to_one() {
        assert_eq!(
            classify_relationship("several contributions"),
            ("contribution".to_string(), 1)
        );
    }

    #[test]
    fn test_classify_other_relationship() {
        assert_eq!(
            classify_relationship("board-member"),
            ("board-member".to_string(), 0)
        );
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("$1,200.50"), Decimal::new(120050, 2));
        assert_eq!(parse_currency(""), Decimal::ZERO);
        assert_eq!(parse_currency("n/a"), Decimal::ZERO);
        assert_eq!(parse_currency("1.2.3"), Decimal::ZERO);
        assert_eq!(parse_currency("."), Decimal::ZERO);
        assert_eq!(parse_currency(".5"), Decimal::new(5, 1));
        assert_eq!(parse_currency("250."), Decimal::new(250, 0));
    }

    #[test]
    fn test_contribution_amount_states() {
        assert_eq!(contribution_amount(""), Amount::NoData);
        assert_eq!(contribution_amount("   "), Amount::Unknown);
        assert_eq!(
            contribution_amount("$2,500 (2016 cycle)"),
            Amount::Known(Decimal::new(2500, 0))
        );
        assert_eq!(contribution_amount("unknown"), Amount::Known(Decimal::ZERO));
    }

    #[test]
    fn test_normalize_attaches_amount_to_contributions_only() {
        let edges = vec![
            Edge::new("Alice", "PAC", "3 contribution", "$300"),
            Edge::new("Alice", "Acme", "board-member", "$300"),
        ];

        let normalized = normalize(&edges);

        assert_eq!(normalized[0].relationship, CONTRIBUTION);
        assert_eq!(normalized[0].contribution_count, 3);
        assert_eq!(normalized[0].amount, Some(Amount::Known(Decimal::new(300, 0))));

        assert_eq!(normalized[1].relationship, "board-member");
        assert_eq!(normalized[1].contribution_count, 0);
        assert_eq!(normalized[1].amount, None);

        // source table untouched
        assert_eq!(edges[0].amount, None);
    }
}
