use serde::{Deserialize, Serialize};

/// An uploaded subgraph and where to view it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotResult {
    pub dataset_id: String,
    pub url: String,
    pub edges: usize,
    pub nodes: usize,
}

impl PlotResult {
    pub fn new(dataset_id: String, url: String) -> Self {
        Self {
            dataset_id,
            url,
            edges: 0,
            nodes: 0,
        }
    }
}
