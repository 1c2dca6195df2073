// Subgraph selection over the node and edge tables

use crate::model::{Edge, EdgeBindings, Node, NodeField, Subgraph, endpoint_names};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Fields searched by the text strategy.
pub const TEXT_SEARCH_FIELDS: [NodeField; 2] = [NodeField::Summary, NodeField::Blurb];

/// Outcome of a free-text node filter.
#[derive(Debug, Clone, PartialEq)]
pub enum TextMatch {
    /// At least one node matched.
    Matched(Vec<Node>),
    /// The filter ran and nothing matched.
    NoMatch,
    /// The request could not be applied; carries the unfiltered table.
    Fallback { nodes: Vec<Node>, reason: String },
}

impl TextMatch {
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            TextMatch::Matched(nodes) => nodes,
            TextMatch::NoMatch => Vec::new(),
            TextMatch::Fallback { nodes, .. } => nodes,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, TextMatch::Fallback { .. })
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Case-insensitive substring match of `term` against any of `fields`.
///
/// Selecting a field that is not free text cannot be matched; the table is
/// returned unfiltered as [`TextMatch::Fallback`].
pub fn filter_by_text(term: &str, fields: &[NodeField], nodes: &[Node]) -> TextMatch {
    if fields.is_empty() {
        let reason = "no node fields selected for text search".to_string();
        error!("{}", reason);
        return TextMatch::Fallback {
            nodes: nodes.to_vec(),
            reason,
        };
    }

    if let Some(field) = fields.iter().find(|f| !f.is_text()) {
        let reason = format!("cannot match text against non-text column '{}'", field.column());
        error!("{}", reason);
        return TextMatch::Fallback {
            nodes: nodes.to_vec(),
            reason,
        };
    }

    let needle = term.to_lowercase();
    let matched: Vec<Node> = nodes
        .iter()
        .filter(|node| {
            fields
                .iter()
                .filter_map(|field| node.text(*field))
                .any(|value| contains_ignore_case(value, &needle))
        })
        .cloned()
        .collect();

    if matched.is_empty() {
        TextMatch::NoMatch
    } else {
        TextMatch::Matched(matched)
    }
}

/// Rows of `nodes` whose name appears as an endpoint of `edges`.
pub fn nodes_for_edges(edges: &[Edge], nodes: &[Node]) -> Vec<Node> {
    let names = endpoint_names(edges);
    nodes
        .iter()
        .filter(|node| names.contains(node.name.as_str()))
        .cloned()
        .collect()
}

/// The three search strategies, parameterized by how edge endpoints are read.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphFilter {
    bindings: EdgeBindings,
}

impl GraphFilter {
    pub fn new(bindings: EdgeBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> EdgeBindings {
        self.bindings
    }

    /// Edges whose source contains `term`, followed by edges whose
    /// destination contains it. An edge matching on both sides appears twice.
    pub fn nearest(&self, term: &str, edges: &[Edge]) -> Vec<Edge> {
        info!(
            "Finding {} in both {} and {} columns",
            term,
            self.bindings.source.column(),
            self.bindings.destination.column()
        );
        let needle = term.to_lowercase();

        let by_source = edges
            .iter()
            .filter(|e| contains_ignore_case(self.bindings.source_of(e), &needle));
        let by_destination = edges
            .iter()
            .filter(|e| contains_ignore_case(self.bindings.destination_of(e), &needle));

        by_source.chain(by_destination).cloned().collect()
    }

    /// Direct (1-hop) edges around `term` and the nodes they reference.
    pub fn search_nearest(&self, term: &str, edges: &[Edge], nodes: &[Node]) -> Subgraph {
        let tdf = self.nearest(term, edges);
        let ntdf = nodes_for_edges(&tdf, nodes);
        debug!("Nearest search: {} edges, {} nodes", tdf.len(), ntdf.len());
        Subgraph::new(tdf, ntdf)
    }

    /// Edges of the full table reachable from the direct neighborhood of
    /// `term`.
    ///
    /// With `both = false` only edges leaving the destinations of the direct
    /// edges (or leaving `term` itself) are followed. With `both = true` any
    /// edge touching either endpoint of a direct edge is included.
    pub fn milieu_edges(&self, term: &str, edges: &[Edge], both: bool) -> Vec<Edge> {
        let tdf = self.nearest(term, edges);

        if both {
            let frontier: HashSet<&str> = tdf
                .iter()
                .flat_map(|e| [self.bindings.destination_of(e), self.bindings.source_of(e)])
                .collect();
            info!(
                "Then finding all edges from {} in {} and {} columns of full edge table",
                term,
                self.bindings.source.column(),
                self.bindings.destination.column()
            );
            edges
                .iter()
                .filter(|e| {
                    frontier.contains(self.bindings.source_of(e))
                        || frontier.contains(self.bindings.destination_of(e))
                })
                .cloned()
                .collect()
        } else {
            let mut frontier: HashSet<&str> = tdf
                .iter()
                .map(|e| self.bindings.destination_of(e))
                .collect();
            frontier.insert(term);
            info!(
                "Then finding {} columns with edges from {} in {} column of full edge table",
                self.bindings.source.column(),
                term,
                self.bindings.destination.column()
            );
            edges
                .iter()
                .filter(|e| frontier.contains(self.bindings.source_of(e)))
                .cloned()
                .collect()
        }
    }

    /// Two-hop "milieu" neighborhood of `term` and the nodes it references.
    pub fn search_milieu(&self, term: &str, edges: &[Edge], nodes: &[Node], both: bool) -> Subgraph {
        let tdf = self.milieu_edges(term, edges, both);
        let ntdf = nodes_for_edges(&tdf, nodes);
        debug!(
            "Milieu search (both={}): {} edges, {} nodes",
            both,
            tdf.len(),
            ntdf.len()
        );
        Subgraph::new(tdf, ntdf)
    }

    /// Nodes whose summary or blurb mentions `term`, with the edges pointing
    /// into them.
    ///
    /// Only the destination column is checked when selecting edges.
    pub fn search_text(&self, term: &str, edges: &[Edge], nodes: &[Node]) -> Subgraph {
        info!("Searching Summary and Blurb for {}", term);
        let ntdf = filter_by_text(term, &TEXT_SEARCH_FIELDS, nodes).into_nodes();
        let names: HashSet<&str> = ntdf.iter().map(|n| n.name.as_str()).collect();

        let tdf: Vec<Edge> = edges
            .iter()
            .filter(|e| names.contains(self.bindings.destination_of(e)))
            .cloned()
            .collect();

        debug!("Text search: {} edges, {} nodes", tdf.len(), ntdf.len());
        Subgraph::new(tdf, ntdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes() -> Vec<Node> {
        vec![
            Node::new("BlackRock").with_summary("Asset manager").with_blurb("Investment firm"),
            Node::new("Larry Fink").with_blurb("Chairman of BlackRock"),
            Node::new("Vanguard").with_summary("Index funds"),
        ]
    }

    #[test]
    fn test_filter_by_text_matches_any_field() {
        let result = filter_by_text("BLACKROCK", &TEXT_SEARCH_FIELDS, &nodes());
        match result {
            TextMatch::Matched(found) => {
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].name, "Larry Fink");
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_by_text_no_match() {
        let result = filter_by_text("pension", &TEXT_SEARCH_FIELDS, &nodes());
        assert_eq!(result, TextMatch::NoMatch);
        assert!(result.into_nodes().is_empty());
    }

    #[test]
    fn test_filter_by_text_non_text_field_falls_back() {
        let all = nodes();
        let result = filter_by_text("0.5", &[NodeField::Pagerank], &all);
        assert!(result.is_fallback());
        assert_eq!(result.into_nodes(), all);
    }

    #[test]
    fn test_nearest_keeps_duplicates() {
        let edges = vec![Edge::new("BlackRock Fund", "BlackRock", "subsidiary", "")];
        let filter = GraphFilter::default();
        assert_eq!(filter.nearest("blackrock", &edges).len(), 2);
    }
}
