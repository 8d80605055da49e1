//! Tahoe-LAFS web API client
//!
//! Capabilities in, bytes out.
//! The grid does the storing, encoding and verifying; this crate only
//! addresses it over HTTP.
//!
//! ```text
//!   dircap ─┐
//!   subdirs ├─► escaped segments ─► /uri/{dircap}/../{name}?format=.. ─► reqwest ─► grid
//!   name ───┘
//! ```

pub mod client;
pub mod config;
pub mod format;
pub mod node;
pub mod path;

pub use client::TahoeClient;
pub use config::{ClientConfig, Credentials};
pub use format::Format;
pub use node::{CapabilityMetadata, CheckReport, Children, DircapInfo, FilecapInfo, Node};
pub use path::build_path;

pub use reqwest::StatusCode;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("Request failed with status code {}", .status.as_u16())]
    Request { status: StatusCode, body: String },

    #[error("Path segment {0:?} cannot be addressed")]
    InvalidSegment(String),

    #[error("Format {0} cannot back a mutable directory")]
    ImmutableFormat(Format),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Status code of a rejected request, if this is one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Request { status, .. } => Some(*status),
            Error::Http(e) => e.status(),
            _ => None,
        }
    }

    /// The node answered 404 (missing child name)
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
