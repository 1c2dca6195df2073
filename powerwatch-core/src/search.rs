// Memoized search sessions over a loaded dataset

use crate::contribution::{self, ContributionSummary};
use crate::data::{Dataset, DatasetStats};
use crate::error::DataError;
use crate::filter::GraphFilter;
use crate::model::{Edge, EdgeBindings, Node, Subgraph};
use lru::LruCache;
use rand::Rng;
use rust_decimal::Decimal;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use tracing::{debug, info};

pub const DEFAULT_CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Match the term against node summaries and blurbs.
    TextSearch,
    /// Edges touching the term directly.
    Nearest,
    /// Two-hop neighborhood of the term.
    Milieu,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::TextSearch => "text",
            Strategy::Nearest => "nearest",
            Strategy::Milieu => "milieu",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::TextSearch => "Search Text",
            Strategy::Nearest => "Nearest",
            Strategy::Milieu => "Milieu",
        }
    }
}

impl FromStr for Strategy {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "search-text" | "search text" => Ok(Strategy::TextSearch),
            "nearest" => Ok(Strategy::Nearest),
            "milieu" => Ok(Strategy::Milieu),
            _ => Err(DataError::InvalidStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key for one search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    pub strategy: Strategy,
    pub term: String,
    pub both: bool,
}

impl SearchKey {
    /// `both` only affects Milieu searches and is cleared for the others.
    pub fn new(strategy: Strategy, term: impl Into<String>, both: bool) -> Self {
        Self {
            strategy,
            term: term.into(),
            both: both && strategy == Strategy::Milieu,
        }
    }
}

/// Options for building a [`SearchSession`]
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Exclude contribution edges from graph searches.
    pub drop_contributors: bool,
    pub bindings: EdgeBindings,
    pub cache_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            drop_contributors: true,
            bindings: EdgeBindings::default(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Owns the normalized tables for one session and memoizes search results.
pub struct SearchSession {
    id: String,
    dataset: Dataset,
    search_edges: Vec<Edge>,
    filter: GraphFilter,
    cache: LruCache<SearchKey, Subgraph>,
    hits: usize,
    misses: usize,
}

impl SearchSession {
    pub fn new(dataset: Dataset, options: SessionOptions) -> Self {
        let dataset = dataset.normalized();
        let search_edges = if options.drop_contributors {
            dataset.without_contributions()
        } else {
            dataset.edges.clone()
        };
        let capacity = NonZeroUsize::new(options.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        let id = uuid::Uuid::new_v4().to_string();

        info!(
            "Session {}: {} entities, {} searchable relationships",
            id,
            dataset.nodes.len(),
            search_edges.len()
        );

        Self {
            id,
            dataset,
            search_edges,
            filter: GraphFilter::new(options.bindings),
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.dataset.nodes
    }

    /// The edges graph searches run against.
    pub fn search_edges(&self) -> &[Edge] {
        &self.search_edges
    }

    /// All normalized edges, contributions included.
    pub fn all_edges(&self) -> &[Edge] {
        &self.dataset.edges
    }

    pub fn filter(&self) -> &GraphFilter {
        &self.filter
    }

    /// Run (or recall) a search.
    pub fn search(&mut self, key: SearchKey) -> &Subgraph {
        let Self {
            cache,
            filter,
            dataset,
            search_edges,
            hits,
            misses,
            ..
        } = self;

        if cache.contains(&key) {
            *hits += 1;
            debug!("Cache hit for {} '{}'", key.strategy, key.term);
        } else {
            *misses += 1;
        }

        let filter: &GraphFilter = filter;
        let edges = search_edges.as_slice();
        let nodes = dataset.nodes.as_slice();
        cache.get_or_insert(key.clone(), || run_strategy(filter, &key, edges, nodes))
    }

    /// (hits, misses) of the search cache.
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn contributions(&self, entity: &str, both: bool) -> ContributionSummary {
        contribution::summarize_entity(entity, &self.dataset.edges, both)
    }

    pub fn top_contributors(&self, limit: usize) -> Vec<(String, Decimal)> {
        contribution::top_contributors(&self.dataset.edges, limit)
    }

    pub fn random_entity<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        if self.dataset.nodes.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..self.dataset.nodes.len());
        Some(self.dataset.nodes[idx].name.as_str())
    }

    pub fn stats(&self) -> DatasetStats {
        self.dataset.stats()
    }
}

/// Dispatch a search key to its strategy without caching.
pub fn run_strategy(filter: &GraphFilter, key: &SearchKey, edges: &[Edge], nodes: &[Node]) -> Subgraph {
    match key.strategy {
        Strategy::TextSearch => filter.search_text(&key.term, edges, nodes),
        Strategy::Nearest => filter.search_nearest(&key.term, edges, nodes),
        Strategy::Milieu => filter.search_milieu(&key.term, edges, nodes, key.both),
    }
}
