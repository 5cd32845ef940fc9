//! Control API for live fault adjustment
//!
//! Two independent state machines per endpoint key, the delay spec and
//! the error spec, each moving `absent -> configured -> reconfigured ->
//! absent`. GET reads the current state (404 when absent), PUT validates
//! and installs or overwrites, DELETE removes (404 when nothing was
//! present). Validation failures surface as HTTP 400 with a plain-text
//! reason and never touch the stores.

use faultline_core::response::responses;
use faultline_core::{Body, EndpointKey, Error, Response, Result};
use faultline_fault::{
    DelaySpec, DelayStore, ErrorSpec, ErrorStore, DEFAULT_ERROR_STATUS, DEFAULT_PROBABILITY,
};
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Handlers for the `/delay` and `/error` control endpoints.
#[derive(Debug, Clone)]
pub struct ControlApi {
    delay: Arc<DelayStore>,
    errors: Arc<ErrorStore>,
}

impl ControlApi {
    /// Create the control API over the shared fault stores.
    pub fn new(delay: Arc<DelayStore>, errors: Arc<ErrorStore>) -> Self {
        Self { delay, errors }
    }

    /// Handle a request under `/delay`.
    pub fn handle_delay(
        &self,
        method: &Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<Response<Body>> {
        let params = parse_query(query);

        match path.strip_prefix("/delay/") {
            Some("base") => self.handle_delay_base(method, &params),
            Some("endpoint") => self.handle_delay_endpoint(method, &params),
            _ => Err(Error::EndpointNotFound(format!("no such delay target: {path}"))),
        }
    }

    fn handle_delay_base(
        &self,
        method: &Method,
        params: &HashMap<String, String>,
    ) -> Result<Response<Body>> {
        match *method {
            Method::GET => responses::ok().text(format!(
                "{}\n",
                humantime::format_duration(self.delay.base())
            )),
            Method::PUT => {
                let duration = parse_duration_ms(params)?;
                self.delay.set_base(duration);

                tracing::info!(
                    base_ms = duration.as_millis() as u64,
                    "Base jitter adjusted"
                );

                responses::no_content()
            }
            _ => responses::method_not_allowed(),
        }
    }

    fn handle_delay_endpoint(
        &self,
        method: &Method,
        params: &HashMap<String, String>,
    ) -> Result<Response<Body>> {
        let key = endpoint_key(params)?;

        match *method {
            Method::GET => match self.delay.get(&key) {
                Some(spec) => responses::ok().text(format!("{spec}\n")),
                None => Err(Error::SpecNotFound(key.to_string())),
            },
            Method::PUT => {
                let duration = parse_duration_ms(params)?;
                let probability = parse_probability(params)?;
                let spec = DelaySpec::new(duration, probability)?;

                tracing::info!(
                    key = %key,
                    duration_ms = spec.duration.as_millis() as u64,
                    probability = spec.probability,
                    "Delay spec adjusted"
                );

                self.delay.set(key, spec);

                responses::no_content()
            }
            Method::DELETE => {
                if self.delay.remove(&key) {
                    tracing::info!(key = %key, "Delay spec removed");
                    responses::no_content()
                } else {
                    Err(Error::SpecNotFound(key.to_string()))
                }
            }
            _ => responses::method_not_allowed(),
        }
    }

    /// Handle a request on `/error`.
    pub fn handle_error(
        &self,
        method: &Method,
        query: Option<&str>,
    ) -> Result<Response<Body>> {
        let params = parse_query(query);
        let key = endpoint_key(&params)?;

        match *method {
            Method::GET => match self.errors.get(&key) {
                Some(spec) => responses::ok().text(format!("{spec}\n")),
                None => Err(Error::SpecNotFound(key.to_string())),
            },
            Method::PUT => {
                let status = match params.get("status_code") {
                    Some(raw) => raw.parse::<u16>().map_err(|_| {
                        Error::InvalidParameter(
                            "Invalid value for status_code parameter".to_string(),
                        )
                    })?,
                    None => DEFAULT_ERROR_STATUS,
                };

                let message = params.get("message").cloned().unwrap_or_default();
                let probability = parse_probability(&params)?;

                let spec = ErrorSpec::new(status, message, probability)?;

                tracing::info!(
                    key = %key,
                    status = spec.status,
                    probability = spec.probability,
                    "Error spec adjusted"
                );

                self.errors.set(key, spec);

                responses::no_content()
            }
            Method::DELETE => {
                if self.errors.remove(&key) {
                    tracing::info!(key = %key, "Error spec removed");
                    responses::no_content()
                } else {
                    Err(Error::SpecNotFound(key.to_string()))
                }
            }
            _ => responses::method_not_allowed(),
        }
    }
}

/// Decode query parameters. Later duplicates win.
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    match query {
        Some(q) => url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect(),
        None => HashMap::new(),
    }
}

fn endpoint_key(params: &HashMap<String, String>) -> Result<EndpointKey> {
    let method = params.get("method").ok_or_else(|| {
        Error::InvalidParameter("Missing value for method parameter".to_string())
    })?;

    let route = params.get("route").ok_or_else(|| {
        Error::InvalidParameter("Missing value for route parameter".to_string())
    })?;

    EndpointKey::parse(method, route)
}

fn parse_duration_ms(params: &HashMap<String, String>) -> Result<Duration> {
    let raw = params.get("duration").ok_or_else(|| {
        Error::InvalidParameter("Missing value for duration parameter".to_string())
    })?;

    let ms: f64 = raw.parse().map_err(|_| {
        Error::InvalidParameter("Invalid value for duration parameter".to_string())
    })?;

    if !ms.is_finite() || ms < 0.0 {
        return Err(Error::InvalidParameter(
            "Duration must be a non-negative number of milliseconds".to_string(),
        ));
    }

    Ok(Duration::from_secs_f64(ms / 1000.0))
}

fn parse_probability(params: &HashMap<String, String>) -> Result<f64> {
    match params.get("probability") {
        Some(raw) => raw.parse().map_err(|_| {
            Error::InvalidParameter("Invalid value for probability parameter".to_string())
        }),
        None => Ok(DEFAULT_PROBABILITY),
    }
}
