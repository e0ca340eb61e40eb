//! `signpost` is a lightweight, synchronous request router for server-side
//! web frameworks: it maps a request path and method to a handler, runs a
//! configurable chain of cross-cutting checks around that handler, and can
//! regenerate URLs from symbolic route names.
//!
//! Core features:
//!
//! - Exact routes and templated routes with `{name}` / `{name:type}`
//!   placeholder segments
//! - Prefix-indexed matching: candidates are grouped by their first segment
//!   so a request only walks the routes sharing its prefix
//! - Per-placeholder regex constraints, validated anchored against the
//!   captured segment
//! - Typed captures: declared `int`, `float` and `bool` placeholders are
//!   cast after matching
//! - Named-route URL generation (`Router::url_for`)
//! - Two-tier middleware: a global onion pipeline built from explicit
//!   continuations, plus per-route named predicates run just before the
//!   handler
//!
//! The router defines no threads, tasks or suspension points; matching,
//! middleware execution and handler invocation are a single synchronous
//! call chain driven by whatever server loop owns the process. Registration
//! happens once on a [`RouterBuilder`]; the built [`Router`] is read-only.
//!
//! ## Basic example
//!
//! ```
//! use bytes::Bytes;
//! use http::{Method, Response};
//! use signpost::{RequestContext, Router};
//!
//! fn show_user(cx: &RequestContext) -> Response<Bytes> {
//!     let id = cx.param("id").and_then(|v| v.as_int()).unwrap();
//!     Response::new(Bytes::from(format!("user {}", id)))
//! }
//!
//! # fn run() -> signpost::Result<()> {
//! let router = Router::builder()
//!     .route("/", |_: &RequestContext| Response::new(Bytes::from("home")))
//!     .param_route("/users/{id:int}", show_user)
//!     .constraint("id", "[0-9]+")
//!     .name("user.show")
//!     .build()?;
//!
//! let res = router.dispatch("/users/42", Method::GET, None);
//! assert_eq!(res.into_body(), Bytes::from("user 42"));
//!
//! // Reverse routing from the symbolic name.
//! assert_eq!(router.url_for("user.show", &[("id", "7")])?, "/users/7");
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! ## Middleware
//!
//! Global middleware wraps every dispatch in registration order, the first
//! layer outermost. Each layer receives the matched route identifier, the
//! request context and a [`Next`] continuation; returning without running
//! the continuation short-circuits everything downstream.
//!
//! ```
//! use bytes::Bytes;
//! use http::{Method, Response};
//! use signpost::{Middleware, Next, RequestContext, Router};
//!
//! struct Logger;
//!
//! impl Middleware for Logger {
//!     fn handle(&self, route_id: &str, cx: &RequestContext, next: Next<'_>) -> Response<Bytes> {
//!         let res = next.run(cx);
//!         println!("{} {} -> {} ({})", cx.method(), cx.path(), res.status(), route_id);
//!         res
//!     }
//! }
//!
//! # fn run() -> signpost::Result<()> {
//! let router = Router::builder()
//!     .middleware(Logger)
//!     .route("/", |_: &RequestContext| Response::new(Bytes::from("home")))
//!     .build()?;
//! # let _ = router.dispatch("/", Method::GET, None);
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
//!
//! Named middleware is registered independently under an identifier and
//! referenced by name from individual routes. A predicate returning `false`
//! stops that route's chain before the handler, while the global pipeline
//! still completes normally:
//!
//! ```
//! use bytes::Bytes;
//! use http::{Method, Response};
//! use signpost::{RequestContext, Router};
//!
//! # fn run() -> signpost::Result<()> {
//! let router = Router::builder()
//!     .named_middleware("auth", |_path: &str, method: &Method| *method != Method::DELETE)
//!     .route_with("/admin", |_: &RequestContext| Response::new(Bytes::from("admin")), &["auth"])
//!     .build()?;
//!
//! let allowed = router.dispatch("/admin", Method::GET, None);
//! assert_eq!(allowed.into_body(), Bytes::from("admin"));
//!
//! let vetoed = router.dispatch("/admin", Method::DELETE, None);
//! assert!(vetoed.into_body().is_empty());
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```

pub use self::error::{Error, RouteError};
pub use self::middleware::{Middleware, NamedMiddleware, Next};
pub use self::route::Handler;
pub use self::router::{Router, RouterBuilder};
pub use self::types::{ParamType, ParamValue, RequestContext, RouteParams};

mod error;
mod matcher;
mod middleware;
mod pattern;
mod route;
mod router;
mod types;

/// A Result type often returned from methods that can have router errors.
pub type Result<T> = std::result::Result<T, RouteError>;
