use crate::config::VizConfig;
use crate::error::{Result, VizError};
use crate::result::PlotResult;
use powerwatch_core::model::{Edge, EdgeBindings, Subgraph};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const NODE_COLUMN: &str = "Node";
const DATASET_NAME: &str = "powerwatch";

/// Viewer options appended to the plot URL.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSettings {
    pub strong_gravity: bool,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            strong_gravity: true,
        }
    }
}

impl PlotSettings {
    pub fn url_params(&self) -> Vec<(String, String)> {
        vec![("strongGravity".to_string(), self.strong_gravity.to_string())]
    }
}

/// Uploads subgraphs to a Graphistry-compatible server.
pub struct GraphistryClient {
    client: Client,
    config: VizConfig,
    base_url: Url,
    bindings: EdgeBindings,
    settings: PlotSettings,
}

impl GraphistryClient {
    pub fn new(config: VizConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("Powerwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs((config.timeout_secs / 2).max(1)))
            .build()?;
        let base_url = config.base_url()?;

        Ok(Self {
            client,
            config,
            base_url,
            bindings: EdgeBindings::default(),
            settings: PlotSettings::default(),
        })
    }

    pub fn with_bindings(mut self, bindings: EdgeBindings) -> Self {
        self.bindings = bindings;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| VizError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> Result<T> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let mut request = self.client.post(url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VizError::UnexpectedResponse {
                endpoint: path.to_string(),
                message: format!("{}: {}", status, message),
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// Exchange the configured credentials for an API token.
    pub async fn authenticate(&self) -> Result<String> {
        let path = "api/v2/auth/token/generate";
        let body = json!({
            "username": self.config.username,
            "password": self.config.password,
        });
        let response: Value = self.post_json(path, None, &body).await?;

        response["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| VizError::UnexpectedResponse {
                endpoint: path.to_string(),
                message: "no token in response".to_string(),
            })
    }

    /// Create an empty dataset with the node and edge column bindings.
    pub async fn create_dataset(&self, token: &str) -> Result<String> {
        let path = "api/v2/upload/datasets/";
        let body = json!({
            "name": DATASET_NAME,
            "node_encodings": { "bindings": { "node": NODE_COLUMN } },
            "edge_encodings": {
                "bindings": {
                    "source": self.bindings.source.column(),
                    "destination": self.bindings.destination.column(),
                }
            },
            "metadata": {},
        });
        let response: Value = self.post_json(path, Some(token), &body).await?;

        response["data"]["dataset_id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| VizError::UnexpectedResponse {
                endpoint: path.to_string(),
                message: "no dataset_id in response".to_string(),
            })
    }

    pub async fn upload_edges(&self, token: &str, dataset_id: &str, edges: &[Edge]) -> Result<()> {
        let path = format!("api/v2/upload/datasets/{}/edges/json?orient=records", dataset_id);
        let records: Vec<Value> = edges.iter().map(edge_record).collect();
        let _: Value = self.post_json(&path, Some(token), &Value::Array(records)).await?;
        Ok(())
    }

    pub async fn upload_nodes(&self, token: &str, dataset_id: &str, subgraph: &Subgraph) -> Result<()> {
        let path = format!("api/v2/upload/datasets/{}/nodes/json?orient=records", dataset_id);
        let records = serde_json::to_value(&subgraph.nodes)?;
        let _: Value = self.post_json(&path, Some(token), &records).await?;
        Ok(())
    }

    pub fn viewer_url(&self, dataset_id: &str) -> Result<String> {
        let mut url = self.endpoint("graph/graph.html")?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("dataset", dataset_id);
            for (key, value) in self.settings.url_params() {
                query.append_pair(&key, &value);
            }
        }
        Ok(url.to_string())
    }

    /// Upload a subgraph and return its viewer URL.
    pub async fn plot(&self, subgraph: &Subgraph) -> Result<PlotResult> {
        if subgraph.is_empty() {
            return Err(VizError::EmptyGraph);
        }

        info!(
            "Plotting {} edges and {} nodes on {}",
            subgraph.edges.len(),
            subgraph.nodes.len(),
            self.config.server
        );

        let token = self.authenticate().await?;
        let dataset_id = self.create_dataset(&token).await?;
        self.upload_edges(&token, &dataset_id, &subgraph.edges).await?;
        self.upload_nodes(&token, &dataset_id, subgraph).await?;

        let url = self.viewer_url(&dataset_id)?;
        let mut result = PlotResult::new(dataset_id, url);
        result.edges = subgraph.edges.len();
        result.nodes = subgraph.nodes.len();
        Ok(result)
    }
}

/// Flat record for one edge; amounts use the legacy sentinel view.
fn edge_record(edge: &Edge) -> Value {
    json!({
        "from_node": edge.from_node,
        "to_node": edge.to_node,
        "relationship_type": edge.relationship_type,
        "metadata": edge.metadata,
        "relationship": edge.relationship,
        "contribution_count": edge.contribution_count,
        "amount": edge.amount.map(|a| a.as_sentinel().to_string()),
    })
}
