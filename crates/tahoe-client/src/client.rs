//! Tahoe-LAFS web API client
//!
//! One method per web API operation. Each call is exactly one HTTP request:
//! nothing is retried, cached or queued, and failures come back to the caller
//! with the node's status code attached.

use crate::config::{ClientConfig, Credentials};
use crate::node::{CheckReport, Children, Node};
use crate::{Error, Format, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

/// Handle on a Tahoe-LAFS node.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct TahoeClient {
    http: reqwest::Client,
    base: Url,
    auth: Option<Credentials>,
}

impl TahoeClient {
    /// Create a client, failing right away on a bad node address
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Self::with_http_client(config, builder.build()?)
    }

    /// Create a client for a node address such as `http://127.0.0.1:3456`
    pub fn from_url(url: &str) -> Result<Self> {
        Self::new(ClientConfig::from_url(url))
    }

    /// Create a client over a caller-supplied transport
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Result<Self> {
        let base = config.node_url()?;

        Ok(Self {
            http,
            base,
            auth: config.auth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of `/uri/{target}`
    pub fn uri_url(&self, target: &str) -> Result<Url> {
        self.endpoint(&[target], &[])
    }

    // ===== READ =====

    /// Content of a file capability
    pub async fn read_filecap(&self, filecap: &str) -> Result<Vec<u8>> {
        let url = self.endpoint(&[filecap], &[])?;
        self.bytes(self.http.get(url)).await
    }

    /// Describe a capability. Unrecognised capabilities yield [`Node::Unknown`].
    pub async fn read_capability_info(&self, capability: &str) -> Result<Node> {
        let url = self.endpoint(&[capability], &[("t", "json")])?;
        self.json(self.http.get(url)).await
    }

    /// Content of the file `name`, found under `dircap` through `subdirs`
    pub async fn read_filename(&self, dircap: &str, name: &str, subdirs: &[&str]) -> Result<Vec<u8>> {
        let url = self.endpoint(&child_segments(dircap, subdirs, name), &[])?;
        self.bytes(self.http.get(url)).await
    }

    /// Describe the child `name`, found under `dircap` through `subdirs`
    pub async fn read_name_info(&self, dircap: &str, name: &str, subdirs: &[&str]) -> Result<Node> {
        let url = self.endpoint(&child_segments(dircap, subdirs, name), &[("t", "json")])?;
        self.json(self.http.get(url)).await
    }

    // ===== UPLOAD =====

    /// Upload content unattached to any directory; returns its new filecap
    pub async fn upload_file(&self, content: impl Into<Vec<u8>>, format: Format) -> Result<String> {
        let url = self.endpoint(&[], &[("format", format.as_str())])?;
        self.text(self.http.put(url).multipart(file_form(content))).await
    }

    /// Replace the content behind a mutable filecap.
    ///
    /// The node refuses this for immutable (CHK) capabilities.
    pub async fn upload_filecap(
        &self,
        filecap: &str,
        content: impl Into<Vec<u8>>,
        format: Format,
    ) -> Result<String> {
        let url = self.endpoint(&[filecap], &[("format", format.as_str())])?;
        self.text(self.http.put(url).multipart(file_form(content))).await
    }

    /// Upload or replace the child `name`; returns the child's filecap.
    ///
    /// The node refuses this when the parent directory is immutable.
    pub async fn upload_filename(
        &self,
        dircap: &str,
        name: &str,
        content: impl Into<Vec<u8>>,
        format: Format,
        subdirs: &[&str],
    ) -> Result<String> {
        let url = self.endpoint(
            &child_segments(dircap, subdirs, name),
            &[("format", format.as_str())],
        )?;
        self.text(self.http.put(url).multipart(file_form(content))).await
    }

    // ===== DIRECTORIES =====

    /// Create a mutable directory, optionally pre-populated with `children`
    pub async fn create_directory(&self, format: Format, children: &Children) -> Result<String> {
        if !format.is_mutable() {
            return Err(Error::ImmutableFormat(format));
        }

        let url = self.endpoint(
            &[],
            &[("t", "mkdir-with-children"), ("format", format.as_str())],
        )?;
        self.text(self.http.post(url).json(children)).await
    }

    /// Create an immutable directory holding exactly `children`
    pub async fn create_immutable_directory(&self, children: &Children) -> Result<String> {
        let url = self.endpoint(&[], &[("t", "mkdir-immutable")])?;
        self.text(self.http.post(url).json(children)).await
    }

    /// Create an empty mutable directory named `name` under `dircap`
    pub async fn create_subdirectory(
        &self,
        dircap: &str,
        name: &str,
        format: Format,
        subdirs: &[&str],
    ) -> Result<String> {
        if !format.is_mutable() {
            return Err(Error::ImmutableFormat(format));
        }

        let url = self.endpoint(
            &child_segments(dircap, subdirs, name),
            &[("t", "mkdir"), ("format", format.as_str())],
        )?;
        self.text(self.http.put(url)).await
    }

    /// Attach an existing capability as the child `name`.
    ///
    /// With `replace == false` the node rejects the link if `name` exists.
    pub async fn add_link(
        &self,
        dircap: &str,
        name: &str,
        target: &str,
        subdirs: &[&str],
        replace: bool,
    ) -> Result<String> {
        let replace = if replace { "true" } else { "false" };
        let url = self.endpoint(
            &child_segments(dircap, subdirs, name),
            &[("t", "uri"), ("replace", replace)],
        )?;
        self.text(self.http.put(url).body(target.to_string())).await
    }

    /// Remove the child `name` from its parent directory
    pub async fn unlink_name(&self, dircap: &str, name: &str, subdirs: &[&str]) -> Result<String> {
        let url = self.endpoint(&child_segments(dircap, subdirs, name), &[])?;
        self.text(self.http.delete(url)).await
    }

    // ===== MAINTENANCE =====

    /// Ask the node to check share health of a file or directory
    pub async fn check_health(&self, capability: &str) -> Result<CheckReport> {
        let url = self.endpoint(&[capability], &[("t", "check"), ("output", "JSON")])?;
        self.json(self.http.post(url)).await
    }

    // ===== TRANSPORT =====

    /// `/uri` followed by `segments`, each escaped as a single path segment
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(Error::InvalidSegment(bad.to_string()));
        }

        let mut url = self.base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| Error::InvalidConfig(format!("{} cannot carry a path", self.base)))?
            .pop_if_empty()
            .push("uri")
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, password.as_ref())
            }
            Some(Credentials::Bearer { token }) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let request = self.authorize(request).build()?;
        tracing::debug!(method = %request.method(), url = %request.url(), "tahoe request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "tahoe response");

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "unreadable error body");
                    String::new()
                }
            };
            return Err(Error::Request { status, body });
        }

        Ok(response)
    }

    async fn bytes(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = self.execute(request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn text(&self, request: RequestBuilder) -> Result<String> {
        let response = self.execute(request).await?;
        Ok(response.text().await?.trim().to_string())
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.bytes(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Root dircap, then each subdirectory, then the child name
fn child_segments<'a>(dircap: &'a str, subdirs: &[&'a str], name: &'a str) -> Vec<&'a str> {
    let mut segments = Vec::with_capacity(subdirs.len() + 2);
    segments.push(dircap);
    segments.extend_from_slice(subdirs);
    segments.push(name);
    segments
}

fn file_form(content: impl Into<Vec<u8>>) -> Form {
    Form::new().part("file", Part::bytes(content.into()).file_name("file"))
}
