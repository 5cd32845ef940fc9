//! Configuration validation
//!
//! Validation failures are fatal at startup; each error names the
//! offending endpoint and field.

use crate::Config;
use faultline_core::{Error, Result};
use http::Method;
use std::collections::HashSet;
use url::Url;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_endpoints(config)?;
    validate_metrics(config)?;

    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    if !config.server.api_prefix.starts_with('/') {
        return Err(Error::Config(
            "server.api_prefix must start with '/'".to_string(),
        ));
    }

    if config.server.target_timeout.as_millis() == 0 {
        return Err(Error::Config(
            "server.target_timeout must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoints(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();

    for (i, e) in config.endpoints.iter().enumerate() {
        let at = |field: &str| format!("endpoint {i}: {field}");

        if e.method.is_empty() {
            return Err(Error::Config(at("method not specified")));
        }

        if e.method.parse::<Method>().is_err() {
            return Err(Error::Config(at(&format!(
                "invalid method: {}",
                e.method
            ))));
        }

        if e.route.is_empty() {
            return Err(Error::Config(at("route not specified")));
        }

        if !e.route.starts_with('/') {
            return Err(Error::Config(at("route must start with '/'")));
        }

        match &e.targets {
            // Static endpoint: status must be wire-representable.
            None => {
                let status = e.response_status.unwrap_or(0);
                if !(100..=599).contains(&status) {
                    return Err(Error::Config(at(&format!(
                        "invalid response_status: {status}"
                    ))));
                }
            }
            // Chaining endpoint: status is ignored, targets must be complete.
            Some(targets) => {
                if targets.is_empty() {
                    return Err(Error::Config(at("targets must not be empty")));
                }

                for (j, t) in targets.iter().enumerate() {
                    let at = |field: &str| format!("endpoint {i}, target {j}: {field}");

                    if t.method.is_empty() {
                        return Err(Error::Config(at("method not specified")));
                    }

                    if t.method.parse::<Method>().is_err() {
                        return Err(Error::Config(at(&format!(
                            "invalid method: {}",
                            t.method
                        ))));
                    }

                    if t.url.is_empty() {
                        return Err(Error::Config(at("url not specified")));
                    }

                    match Url::parse(&t.url) {
                        Ok(url) if url.has_host() => {}
                        Ok(_) => {
                            return Err(Error::Config(at(&format!(
                                "url is not absolute: {}",
                                t.url
                            ))));
                        }
                        Err(err) => {
                            return Err(Error::Config(at(&format!("invalid url: {err}"))));
                        }
                    }
                }
            }
        }

        // Last-write-wins is accepted at registration time, but flag the
        // duplicate here so a typo doesn't silently shadow an endpoint.
        if !seen.insert((e.method.to_uppercase(), e.route.clone())) {
            tracing::warn!(
                method = %e.method,
                route = %e.route,
                "Duplicate endpoint declaration overwrites the earlier one"
            );
        }
    }

    Ok(())
}

fn validate_metrics(config: &Config) -> Result<()> {
    let buckets = &config.metrics.latency_histogram_buckets;

    if buckets.is_empty() {
        return Err(Error::Config(
            "metrics.latency_histogram_buckets must not be empty".to_string(),
        ));
    }

    if buckets.windows(2).any(|w| w[0] >= w[1]) {
        return Err(Error::Config(
            "metrics.latency_histogram_buckets must be strictly increasing".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EndpointConfig, TargetConfig};

    fn static_endpoint(method: &str, route: &str, status: u16) -> EndpointConfig {
        EndpointConfig {
            method: method.to_string(),
            route: route.to_string(),
            response_status: Some(status),
            response_body: Some("ok".to_string()),
            targets: None,
        }
    }

    #[test]
    fn test_valid_config() {
        let mut config = Config::default();
        config.endpoints.push(static_endpoint("GET", "/a", 200));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_method() {
        let mut config = Config::default();
        config.endpoints.push(static_endpoint("", "/a", 200));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("method not specified"));
    }

    #[test]
    fn test_missing_route() {
        let mut config = Config::default();
        config.endpoints.push(static_endpoint("GET", "", 200));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("route not specified"));
    }

    #[test]
    fn test_static_status_out_of_range() {
        let mut config = Config::default();
        config.endpoints.push(static_endpoint("GET", "/a", 600));
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("invalid response_status"));
    }

    #[test]
    fn test_targets_ignore_status() {
        // An out-of-range status is fine when targets are present.
        let mut config = Config::default();
        config.endpoints.push(EndpointConfig {
            method: "GET".to_string(),
            route: "/chain".to_string(),
            response_status: Some(999),
            response_body: None,
            targets: Some(vec![TargetConfig {
                method: "GET".to_string(),
                url: "http://localhost:9001/a".to_string(),
            }]),
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_target_missing_url() {
        let mut config = Config::default();
        config.endpoints.push(EndpointConfig {
            method: "GET".to_string(),
            route: "/chain".to_string(),
            response_status: None,
            response_body: None,
            targets: Some(vec![TargetConfig {
                method: "GET".to_string(),
                url: String::new(),
            }]),
        });
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("url not specified"));
    }

    #[test]
    fn test_target_relative_url() {
        let mut config = Config::default();
        config.endpoints.push(EndpointConfig {
            method: "GET".to_string(),
            route: "/chain".to_string(),
            response_status: None,
            response_body: None,
            targets: Some(vec![TargetConfig {
                method: "GET".to_string(),
                url: "/relative/path".to_string(),
            }]),
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_unsorted_buckets() {
        let mut config = Config::default();
        config.metrics.latency_histogram_buckets = vec![0.5, 0.1, 1.0];
        assert!(validate_config(&config).is_err());
    }
}
