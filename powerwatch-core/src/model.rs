use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An entity in the network, keyed by its unique `name`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "Node")]
    pub name: String,
    pub link: String,
    #[serde(rename = "Blurb")]
    pub blurb: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Website")]
    pub website: String,
    #[serde(rename = "Types")]
    pub types: String,
    #[serde(rename = "Revenue")]
    pub revenue: String,
    #[serde(rename = "Aliases")]
    pub aliases: String,
    pub pagerank: f64,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_blurb(mut self, blurb: impl Into<String>) -> Self {
        self.blurb = blurb.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_pagerank(mut self, pagerank: f64) -> Self {
        self.pagerank = pagerank;
        self
    }

    /// Text value of a field, or `None` when the field is not free text.
    pub fn text(&self, field: NodeField) -> Option<&str> {
        match field {
            NodeField::Name => Some(&self.name),
            NodeField::Link => Some(&self.link),
            NodeField::Blurb => Some(&self.blurb),
            NodeField::Summary => Some(&self.summary),
            NodeField::Website => Some(&self.website),
            NodeField::Types => Some(&self.types),
            NodeField::Revenue => Some(&self.revenue),
            NodeField::Aliases => Some(&self.aliases),
            NodeField::Pagerank => None,
        }
    }
}

/// Columns of the node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeField {
    Name,
    Link,
    Blurb,
    Summary,
    Website,
    Types,
    Revenue,
    Aliases,
    Pagerank,
}

impl NodeField {
    pub fn column(&self) -> &'static str {
        match self {
            NodeField::Name => "Node",
            NodeField::Link => "link",
            NodeField::Blurb => "Blurb",
            NodeField::Summary => "Summary",
            NodeField::Website => "Website",
            NodeField::Types => "Types",
            NodeField::Revenue => "Revenue",
            NodeField::Aliases => "Aliases",
            NodeField::Pagerank => "pagerank",
        }
    }

    pub fn is_text(&self) -> bool {
        !matches!(self, NodeField::Pagerank)
    }

    pub const ALL: [NodeField; 9] = [
        NodeField::Name,
        NodeField::Link,
        NodeField::Blurb,
        NodeField::Summary,
        NodeField::Website,
        NodeField::Types,
        NodeField::Revenue,
        NodeField::Aliases,
        NodeField::Pagerank,
    ];
}

/// Contribution amount carried by a contribution edge.
///
/// `NoData` and `Unknown` are kept apart so aggregation can report them
/// separately instead of folding them into the numeric total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Amount {
    /// A leading metadata token was present and parsed.
    Known(Decimal),
    /// Metadata was empty.
    NoData,
    /// Metadata was present but held no tokens.
    Unknown,
}

impl Amount {
    /// Numeric encoding used by the flat tables: the value, 0 or -1.
    pub fn as_sentinel(&self) -> Decimal {
        match self {
            Amount::Known(value) => *value,
            Amount::NoData => Decimal::ZERO,
            Amount::Unknown => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn known(&self) -> Option<Decimal> {
        match self {
            Amount::Known(value) => Some(*value),
            _ => None,
        }
    }
}

/// A directed relationship `from_node -> to_node`.
///
/// `relationship`, `contribution_count` and `amount` are derived columns;
/// `Edge::new` fills them with the unnormalized defaults and
/// [`crate::normalize::normalize`] computes the real values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from_node: String,
    pub to_node: String,
    pub relationship_type: String,
    pub metadata: String,
    pub relationship: String,
    pub contribution_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
}

impl Edge {
    pub fn new(
        from_node: impl Into<String>,
        to_node: impl Into<String>,
        relationship_type: impl Into<String>,
        metadata: impl Into<String>,
    ) -> Self {
        let relationship_type = relationship_type.into();
        Self {
            from_node: from_node.into(),
            to_node: to_node.into(),
            relationship: relationship_type.clone(),
            relationship_type,
            metadata: metadata.into(),
            contribution_count: 0,
            amount: None,
        }
    }

    pub fn endpoint(&self, end: Endpoint) -> &str {
        match end {
            Endpoint::From => &self.from_node,
            Endpoint::To => &self.to_node,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    From,
    To,
}

impl Endpoint {
    pub fn column(&self) -> &'static str {
        match self {
            Endpoint::From => "from_node",
            Endpoint::To => "to_node",
        }
    }
}

/// Which edge endpoint the filters read as the source and which as the
/// destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeBindings {
    pub source: Endpoint,
    pub destination: Endpoint,
}

impl EdgeBindings {
    /// `from_node` as source, `to_node` as destination.
    pub fn natural() -> Self {
        Self {
            source: Endpoint::From,
            destination: Endpoint::To,
        }
    }

    /// `to_node` as source, `from_node` as destination.
    pub fn reversed() -> Self {
        Self {
            source: Endpoint::To,
            destination: Endpoint::From,
        }
    }

    pub fn source_of<'a>(&self, edge: &'a Edge) -> &'a str {
        edge.endpoint(self.source)
    }

    pub fn destination_of<'a>(&self, edge: &'a Edge) -> &'a str {
        edge.endpoint(self.destination)
    }
}

impl Default for EdgeBindings {
    // The web front end bound `to_node` as the graph source.
    fn default() -> Self {
        Self::reversed()
    }
}

/// A filtered pair of tables handed to rendering collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subgraph {
    pub edges: Vec<Edge>,
    pub nodes: Vec<Node>,
}

impl Subgraph {
    pub fn new(edges: Vec<Edge>, nodes: Vec<Node>) -> Self {
        Self { edges, nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Names appearing in either endpoint column of the edge subset.
    pub fn endpoint_names(&self) -> HashSet<&str> {
        endpoint_names(&self.edges)
    }
}

pub fn endpoint_names(edges: &[Edge]) -> HashSet<&str> {
    let mut names = HashSet::with_capacity(edges.len() * 2);
    for edge in edges {
        names.insert(edge.from_node.as_str());
        names.insert(edge.to_node.as_str());
    }
    names
}
