//! Middleware trait and chain
//!
//! The request pipeline is an ordered list of a single polymorphic
//! interface, composed once at startup. Each element may act before
//! calling [`Next::run`], act on the response after it returns, do both,
//! or short-circuit and never call it at all.

use crate::{Body, Result};
use async_trait::async_trait;
use http::{Request, Response};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A single element of the request pipeline.
#[async_trait]
pub trait Middleware: Send + Sync + fmt::Debug {
    /// Process a request.
    ///
    /// `next` continues the chain; not calling it short-circuits the
    /// request and the returned response is written directly.
    async fn handle(&self, req: Request<Body>, next: Next) -> Result<Response<Body>>;
}

/// Boxed future returned by the terminal handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response<Body>>> + Send>>;

/// The terminal handler running after the last pipeline element.
pub type Handler = Arc<dyn Fn(Request<Body>) -> HandlerFuture + Send + Sync>;

/// Continuation of the pipeline: the remaining elements plus the
/// terminal handler.
pub struct Next {
    stack: Arc<[Arc<dyn Middleware>]>,
    index: usize,
    handler: Handler,
}

impl Next {
    /// Create a continuation at the head of a pipeline.
    pub fn new(stack: Arc<[Arc<dyn Middleware>]>, handler: Handler) -> Self {
        Self {
            stack,
            index: 0,
            handler,
        }
    }

    /// Run the next element, or the terminal handler once the stack is
    /// exhausted.
    pub async fn run(self, req: Request<Body>) -> Result<Response<Body>> {
        let Next {
            stack,
            index,
            handler,
        } = self;

        if let Some(element) = stack.get(index).cloned() {
            let next = Self {
                stack,
                index: index + 1,
                handler,
            };
            element.handle(req, next).await
        } else {
            handler(req).await
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &(self.stack.len() - self.index))
            .finish()
    }
}
