// Connection settings for the visualization service

use crate::error::{Result, VizError};
use url::Url;

pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_SERVER: &str = "hub.graphistry.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const USERNAME_VAR: &str = "USERNAME";
pub const PASSWORD_VAR: &str = "GRAPHISTRY_PASSWORD";
pub const SERVER_VAR: &str = "GRAPHISTRY_SERVER";
pub const PROTOCOL_VAR: &str = "GRAPHISTRY_PROTOCOL";

#[derive(Clone, PartialEq)]
pub struct VizConfig {
    pub protocol: String,
    /// Host, with an optional `:port`.
    pub server: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for VizConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VizConfig")
            .field("protocol", &self.protocol)
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl VizConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            protocol: DEFAULT_PROTOCOL.to_string(),
            server: DEFAULT_SERVER.to_string(),
            username: username.into(),
            password: password.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Credentials from `USERNAME` and `GRAPHISTRY_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`VizConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let username = var(USERNAME_VAR)
            .ok_or_else(|| VizError::MissingCredential(USERNAME_VAR.to_string()))?;
        let password = var(PASSWORD_VAR)
            .ok_or_else(|| VizError::MissingCredential(PASSWORD_VAR.to_string()))?;

        let mut config = Self::new(username, password);
        if let Some(server) = var(SERVER_VAR) {
            config.server = server;
        }
        if let Some(protocol) = var(PROTOCOL_VAR) {
            config.protocol = protocol;
        }
        Ok(config)
    }

    /// Point at a full base URL such as `http://127.0.0.1:8080`.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        let url = Url::parse(endpoint)
            .map_err(|e| VizError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| VizError::InvalidUrl(format!("{}: no host", endpoint)))?;

        self.protocol = url.scheme().to_string();
        self.server = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Ok(self)
    }

    pub fn base_url(&self) -> Result<Url> {
        let raw = format!("{}://{}/", self.protocol, self.server);
        Url::parse(&raw).map_err(|e| VizError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}
