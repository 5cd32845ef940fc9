//! Endpoint identity

use crate::{Error, Result};
use http::Method;
use std::fmt;

/// Identity of a registered endpoint: an HTTP method plus a route.
///
/// The pair is the registry key; registering the same pair twice
/// overwrites the earlier entry (last-write-wins). The same key addresses
/// the per-endpoint delay and error specs in the fault stores.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    /// HTTP method
    pub method: Method,
    /// Route path, as declared in configuration (no API prefix)
    pub route: String,
}

impl EndpointKey {
    /// Create a key from a method and route.
    pub fn new(method: Method, route: impl Into<String>) -> Self {
        Self {
            method,
            route: route.into(),
        }
    }

    /// Parse a key from string parts, as received on the control API.
    pub fn parse(method: &str, route: &str) -> Result<Self> {
        let method = method
            .parse::<Method>()
            .map_err(|_| Error::InvalidParameter(format!("invalid HTTP method: {method}")))?;

        if route.is_empty() {
            return Err(Error::InvalidParameter("route must not be empty".to_string()));
        }

        Ok(Self::new(method, route))
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.route)
    }
}
