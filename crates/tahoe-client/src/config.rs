//! Connection parameters for a Tahoe-LAFS node

use crate::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default web API port of a Tahoe-LAFS node
pub const DEFAULT_PORT: u16 = 3456;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Node host, optionally prefixed with `http://` or `https://`
    pub host: String,
    /// Node web API port
    pub port: u16,
    /// Full node address, overrides host and port
    pub base_url: Option<String>,
    /// Credentials sent with every request
    pub auth: Option<Credentials>,
    /// Whole-request timeout handed to the transport
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            base_url: None,
            auth: None,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Credentials {
    Basic {
        username: String,
        #[serde(default)]
        password: Option<String>,
    },
    Bearer {
        token: String,
    },
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Configuration pointing at a full node address
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            base_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// `~/.config/lafs/config.yaml` or platform equivalent
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lafs").join("config.yaml"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Resolved node root, e.g. `http://127.0.0.1:3456`
    pub fn node_url(&self) -> Result<Url> {
        let raw = match &self.base_url {
            Some(url) => url.clone(),
            None => {
                let host = self.host.trim().trim_end_matches('/');
                if host.is_empty() || host == "http://" || host == "https://" {
                    return Err(Error::InvalidConfig("empty node host".into()));
                }
                if self.port == 0 {
                    return Err(Error::InvalidConfig("invalid node port 0".into()));
                }
                if host.starts_with("http://") || host.starts_with("https://") {
                    format!("{}:{}", host, self.port)
                } else {
                    format!("http://{}:{}", host, self.port)
                }
            }
        };

        let url = Url::parse(&raw)
            .map_err(|e| Error::InvalidConfig(format!("invalid node address '{}': {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "unsupported scheme '{}' in node address",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(Error::InvalidConfig(format!("node address '{}' has no host", raw)));
        }
        if url.port() == Some(0) {
            return Err(Error::InvalidConfig("invalid node port 0".into()));
        }

        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        self.node_url().map(|_| ())
    }
}
