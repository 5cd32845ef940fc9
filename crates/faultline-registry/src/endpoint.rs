//! Registered endpoints

use crate::target::{Target, TargetClient};
use faultline_core::{Body, EndpointKey, Error, ResponseBuilder, Result, VERSION_HEADER};
use futures::future::join_all;
use http::{header::HeaderName, Response, StatusCode};
use serde::Serialize;

/// What a registered endpoint does when invoked.
#[derive(Debug, Clone)]
pub enum EndpointKind {
    /// Respond with a canned status and body, verbatim.
    Static {
        /// Response status
        status: StatusCode,
        /// Response body
        body: String,
    },
    /// Fan out to downstream targets and aggregate their outcomes.
    Chain {
        /// Targets, in declaration order
        targets: Vec<Target>,
    },
}

/// A registered (method, route) pair with its response behavior.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Registry key
    pub key: EndpointKey,
    kind: EndpointKind,
}

/// Catalog entry for one endpoint, served from `GET /`.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointInfo {
    /// HTTP method
    pub method: String,
    /// Route path
    pub route: String,
    /// Static response status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<u16>,
    /// Static response body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    /// Chaining targets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetInfo>>,
}

/// Catalog entry for one chaining target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetInfo {
    /// HTTP method for the outbound call
    pub method: String,
    /// Target URL
    pub url: String,
}

impl Endpoint {
    /// Create a static endpoint. The status must be wire-representable.
    pub fn fixed(key: EndpointKey, status: u16, body: impl Into<String>) -> Result<Self> {
        if !(100..=599).contains(&status) {
            return Err(Error::Config(format!(
                "endpoint {key}: invalid response status code: {status}"
            )));
        }

        let status = StatusCode::from_u16(status)
            .map_err(|_| Error::Config(format!("endpoint {key}: invalid response status code")))?;

        Ok(Self {
            key,
            kind: EndpointKind::Static {
                status,
                body: body.into(),
            },
        })
    }

    /// Create a chaining endpoint. Any configured status is ignored in
    /// this mode; the aggregate status is derived from the target
    /// outcomes.
    pub fn chaining(key: EndpointKey, targets: Vec<Target>) -> Result<Self> {
        if targets.is_empty() {
            return Err(Error::Config(format!(
                "endpoint {key}: chain must have at least one target"
            )));
        }

        Ok(Self {
            key,
            kind: EndpointKind::Chain { targets },
        })
    }

    /// The endpoint's behavior.
    pub fn kind(&self) -> &EndpointKind {
        &self.kind
    }

    /// Serve one request to this endpoint.
    ///
    /// Chaining endpoints fan out to all targets concurrently; the
    /// response array keeps declaration order regardless of completion
    /// order, and a single failing target degrades the aggregate status
    /// to 500 without hiding the other targets' lines.
    pub async fn respond(&self, client: &TargetClient) -> Result<Response<Body>> {
        let version_header = HeaderName::from_static(VERSION_HEADER);

        match &self.kind {
            EndpointKind::Static { status, body } => Ok(ResponseBuilder::new(*status)
                .header(version_header, env!("CARGO_PKG_VERSION"))
                .text(body.clone())?),

            EndpointKind::Chain { targets } => {
                let outcomes = join_all(targets.iter().map(|t| client.call(t))).await;

                let status = if outcomes.iter().all(|o| o.ok) {
                    StatusCode::OK
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };

                let lines: Vec<&str> = outcomes.iter().map(|o| o.line.as_str()).collect();

                ResponseBuilder::new(status)
                    .header(version_header, env!("CARGO_PKG_VERSION"))
                    .json(&lines)
            }
        }
    }

    /// Catalog description of this endpoint.
    pub fn describe(&self) -> EndpointInfo {
        let (response_status, response_body, targets) = match &self.kind {
            EndpointKind::Static { status, body } => {
                (Some(status.as_u16()), Some(body.clone()), None)
            }
            EndpointKind::Chain { targets } => (
                None,
                None,
                Some(
                    targets
                        .iter()
                        .map(|t| TargetInfo {
                            method: t.method.to_string(),
                            url: t.url.to_string(),
                        })
                        .collect(),
                ),
            ),
        };

        EndpointInfo {
            method: self.key.method.to_string(),
            route: self.key.route.clone(),
            response_status,
            response_body,
            targets,
        }
    }
}
