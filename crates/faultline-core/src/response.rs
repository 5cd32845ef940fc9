//! Response construction helpers

use crate::{Body, Result};
use bytes::Bytes;
use http::{header, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

/// Builder for pipeline responses.
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(header::HeaderName, String)>,
}

impl ResponseBuilder {
    /// Create a builder for the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Add a header.
    pub fn header(mut self, name: header::HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Build with an empty body.
    pub fn build(self) -> Result<Response<Body>> {
        let mut response = Response::builder().status(self.status);

        for (name, value) in self.headers {
            response = response.header(name, value);
        }

        Ok(response.body(Full::new(Bytes::new()))?)
    }

    /// Build with a plain-text body.
    pub fn text(self, body: impl Into<String>) -> Result<Response<Body>> {
        let mut response = Response::builder()
            .status(self.status)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8");

        for (name, value) in self.headers {
            response = response.header(name, value);
        }

        Ok(response.body(Full::new(Bytes::from(body.into())))?)
    }

    /// Build with a JSON body.
    pub fn json<T: Serialize>(self, body: &T) -> Result<Response<Body>> {
        let json = serde_json::to_string(body)?;

        let mut response = Response::builder()
            .status(self.status)
            .header(header::CONTENT_TYPE, "application/json");

        for (name, value) in self.headers {
            response = response.header(name, value);
        }

        Ok(response.body(Full::new(Bytes::from(json)))?)
    }
}

/// Canned responses used by the control API and dispatcher.
pub mod responses {
    use super::*;

    /// 200 OK
    pub fn ok() -> ResponseBuilder {
        ResponseBuilder::new(StatusCode::OK)
    }

    /// 204 No Content
    pub fn no_content() -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::NO_CONTENT).build()
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::BAD_REQUEST).text(message)
    }

    /// 404 Not Found
    pub fn not_found(message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::NOT_FOUND).text(message)
    }

    /// 405 Method Not Allowed
    pub fn method_not_allowed() -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::METHOD_NOT_ALLOWED).text("Method not allowed")
    }

    /// 500 Internal Server Error
    pub fn internal_error(message: impl Into<String>) -> Result<Response<Body>> {
        ResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR).text(message)
    }
}
