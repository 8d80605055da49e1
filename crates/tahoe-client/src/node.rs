//! Node descriptors exchanged with the web API
//!
//! Every `?t=json` answer is a 2-element array `[tag, descriptor]`:
//!
//! ```text
//! ["filenode", {"ro_uri": "URI:CHK:..", "size": 13, "mutable": false, ..}]
//! ["dirnode",  {"rw_uri": "URI:DIR2:..", "children": {..}, ..}]
//! ["unknown",  {}]
//! ```
//!
//! The same shape is used for directory children when creating directories.

use crate::Format;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Children of a directory, keyed by name
pub type Children = BTreeMap<String, Node>;

/// Link timestamps kept by the node, seconds since the epoch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapabilityMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tahoe: Option<LinkTimes>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkTimes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkcrtime: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkmotime: Option<f64>,
}

impl CapabilityMetadata {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.tahoe
            .as_ref()
            .and_then(|t| t.linkcrtime)
            .or(self.ctime)
            .and_then(to_datetime)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.tahoe
            .as_ref()
            .and_then(|t| t.linkmotime)
            .or(self.mtime)
            .and_then(to_datetime)
    }
}

fn to_datetime(secs: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis((secs * 1000.0) as i64)
}

/// Descriptor of a file node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilecapInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rw_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ro_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,
    /// Raw format name; nodes also report formats like `LIT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CapabilityMetadata>,
}

/// Descriptor of a directory node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DircapInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rw_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ro_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Children>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CapabilityMetadata>,
}

impl FilecapInfo {
    /// Format as a request format, when it is one
    pub fn request_format(&self) -> Option<Format> {
        self.format.as_deref().and_then(|f| f.parse().ok())
    }
}

impl DircapInfo {
    pub fn request_format(&self) -> Option<Format> {
        self.format.as_deref().and_then(|f| f.parse().ok())
    }
}

/// What a capability (or a named child) turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Filenode(FilecapInfo),
    Dirnode(DircapInfo),
    /// The node did not recognise the capability. Not an error.
    Unknown,
}

impl Node {
    /// Link an existing file by its read capability
    pub fn file(ro_uri: impl Into<String>) -> Self {
        Node::Filenode(FilecapInfo {
            ro_uri: Some(ro_uri.into()),
            ..Default::default()
        })
    }

    /// Link an existing directory by its read capability
    pub fn dir(ro_uri: impl Into<String>) -> Self {
        Node::Dirnode(DircapInfo {
            ro_uri: Some(ro_uri.into()),
            ..Default::default()
        })
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Node::Filenode(_) => "filenode",
            Node::Dirnode(_) => "dirnode",
            Node::Unknown => "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Node::Unknown)
    }

    pub fn ro_uri(&self) -> Option<&str> {
        match self {
            Node::Filenode(info) => info.ro_uri.as_deref(),
            Node::Dirnode(info) => info.ro_uri.as_deref(),
            Node::Unknown => None,
        }
    }

    pub fn rw_uri(&self) -> Option<&str> {
        match self {
            Node::Filenode(info) => info.rw_uri.as_deref(),
            Node::Dirnode(info) => info.rw_uri.as_deref(),
            Node::Unknown => None,
        }
    }

    pub fn is_mutable(&self) -> bool {
        match self {
            Node::Filenode(info) => info.mutable.unwrap_or(false),
            Node::Dirnode(info) => info.mutable.unwrap_or(false),
            Node::Unknown => false,
        }
    }

    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Dirnode(info) => info.children.as_ref(),
            _ => None,
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(self.tag())?;
        match self {
            Node::Filenode(info) => pair.serialize_element(info)?,
            Node::Dirnode(info) => pair.serialize_element(info)?,
            Node::Unknown => pair.serialize_element(&serde_json::Map::new())?,
        }
        pair.end()
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let (tag, descriptor): (String, serde_json::Value) = Deserialize::deserialize(deserializer)?;

        match tag.as_str() {
            "filenode" => serde_json::from_value(descriptor)
                .map(Node::Filenode)
                .map_err(D::Error::custom),
            "dirnode" => serde_json::from_value(descriptor)
                .map(Node::Dirnode)
                .map_err(D::Error::custom),
            _ => Ok(Node::Unknown),
        }
    }
}

/// Result of `?t=check&output=JSON`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub results: CheckResults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckResults {
    #[serde(default)]
    pub healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recoverable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_shares_good: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_shares_needed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_shares_expected: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count_corrupt_shares: Option<u32>,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.results.healthy
    }
}
