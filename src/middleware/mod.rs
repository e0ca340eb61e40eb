//! The two middleware layers wrapped around every dispatch.
//!
//! Global middleware forms an onion: the first-registered middleware is the
//! outermost layer, and each layer decides whether to call through to the
//! next via its [`Next`] continuation. A layer that returns without calling
//! `next.run(..)` short-circuits everything downstream, terminal handler
//! included, and its return value becomes the dispatch result.
//!
//! Named middleware is a flat table of predicates referenced by identifier
//! from individual routes. The router runs a route's named checks inside the
//! innermost continuation, immediately before the handler.

use crate::types::RequestContext;
use bytes::Bytes;
use http::{Method, Response};

/// A global middleware layer.
///
/// `route_id` identifies the matched route: the literal path for an exact
/// match, the registered pattern for a templated match, or the request path
/// when nothing matched.
pub trait Middleware: Send + Sync + 'static {
    fn handle(&self, route_id: &str, cx: &RequestContext, next: Next<'_>) -> Response<Bytes>;
}

/// A named middleware predicate, registered under an identifier and
/// referenced by name from route registrations. Returning `false` halts the
/// chain before the handler; any other outcome continues it.
pub type NamedMiddleware = Box<dyn Fn(&str, &Method) -> bool + Send + Sync + 'static>;

/// The continuation handed to each global middleware layer. Consuming it via
/// [`Next::run`] invokes the rest of the chain and, at the innermost layer,
/// the terminal operation for this dispatch.
pub struct Next<'a> {
    chain: &'a [Box<dyn Middleware>],
    route_id: &'a str,
    terminal: &'a dyn Fn(&RequestContext) -> Response<Bytes>,
}

impl<'a> Next<'a> {
    pub fn run(self, cx: &RequestContext) -> Response<Bytes> {
        match self.chain.split_first() {
            Some((layer, rest)) => layer.handle(
                self.route_id,
                cx,
                Next {
                    chain: rest,
                    route_id: self.route_id,
                    terminal: self.terminal,
                },
            ),
            None => (self.terminal)(cx),
        }
    }
}

/// Runs `terminal` wrapped in the full global chain.
pub(crate) fn run_pipeline(
    chain: &[Box<dyn Middleware>],
    route_id: &str,
    cx: &RequestContext,
    terminal: &dyn Fn(&RequestContext) -> Response<Bytes>,
) -> Response<Bytes> {
    Next {
        chain,
        route_id,
        terminal,
    }
    .run(cx)
}
