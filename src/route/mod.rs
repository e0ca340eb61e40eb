use crate::pattern::Segment;
use crate::types::{ParamType, RequestContext};
use bytes::Bytes;
use http::Response;
use regex::Regex;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

/// A request handler: the single-method seam through which the router
/// invokes application code. It is implemented for every
/// `Fn(&RequestContext) -> Response<Bytes>` closure or function, so plain
/// functions and closures register directly; implement it by hand when a
/// handler carries owned state of its own type.
pub trait Handler: Send + Sync + 'static {
    fn invoke(&self, cx: &RequestContext) -> Response<Bytes>;
}

impl<F> Handler for F
where
    F: Fn(&RequestContext) -> Response<Bytes> + Send + Sync + 'static,
{
    fn invoke(&self, cx: &RequestContext) -> Response<Bytes> {
        self(cx)
    }
}

pub(crate) type BoxedHandler = Box<dyn Handler>;

/// A route keyed by a literal, fully-specified path string. Stored in a map
/// keyed by that path; re-registering the same path overwrites the entry.
pub(crate) struct ExactRoute {
    pub(crate) handler: BoxedHandler,
    pub(crate) middleware: Vec<String>,
}

impl Debug for ExactRoute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{ middleware: {:?} }}", self.middleware)
    }
}

/// A templated route: a pattern with placeholder segments, immutable once
/// the router is built.
pub(crate) struct ParamRoute {
    pub(crate) pattern: String,
    pub(crate) segments: Vec<Segment>,
    pub(crate) param_names: Vec<String>,
    pub(crate) param_types: HashMap<String, ParamType>,
    pub(crate) constraints: HashMap<String, Regex>,
    pub(crate) first_segment: String,
    pub(crate) handler: BoxedHandler,
    pub(crate) middleware: Vec<String>,
    pub(crate) name: Option<String>,
}

impl Debug for ParamRoute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ pattern: {:?}, params: {:?}, name: {:?}, middleware: {:?} }}",
            self.pattern, self.param_names, self.name, self.middleware
        )
    }
}
