use http::Method;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::time::SystemTime;

/// The declared type of a path placeholder, parsed from the `{name:type}`
/// form at registration time. An unrecognized type word behaves as `Str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
}

impl ParamType {
    pub(crate) fn from_declared(word: &str) -> ParamType {
        match word {
            "int" | "integer" => ParamType::Int,
            "float" | "double" => ParamType::Float,
            "bool" | "boolean" => ParamType::Bool,
            _ => ParamType::Str,
        }
    }
}

/// A captured path parameter value, cast according to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Float(n) => write!(f, "{}", n),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// Casts a raw captured segment to its declared type. Casting happens after
/// matching, so a failed numeric parse keeps the raw string value instead of
/// rejecting the route; only explicit constraints reject candidates.
pub(crate) fn cast_param(ty: ParamType, raw: &str) -> ParamValue {
    match ty {
        ParamType::Str => ParamValue::Str(raw.to_string()),
        ParamType::Int => match raw.parse::<i64>() {
            Ok(n) => ParamValue::Int(n),
            Err(_) => ParamValue::Str(raw.to_string()),
        },
        ParamType::Float => match raw.parse::<f64>() {
            Ok(n) => ParamValue::Float(n),
            Err(_) => ParamValue::Str(raw.to_string()),
        },
        ParamType::Bool => {
            let truthy = matches!(
                raw.to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "on"
            );
            ParamValue::Bool(truthy)
        }
    }
}

/// The collection of parameters carried by a request: values captured from
/// placeholder segments, plus any values the caller seeded the dispatch
/// with. Seeded values always take precedence over captured ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteParams(HashMap<String, ParamValue>);

impl RouteParams {
    pub fn new() -> RouteParams {
        RouteParams(HashMap::new())
    }

    pub fn with_capacity(capacity: usize) -> RouteParams {
        RouteParams(HashMap::with_capacity(capacity))
    }

    pub fn set<N: Into<String>>(&mut self, name: N, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }
}

/// Ephemeral per-dispatch state handed to middleware and handlers. One
/// context is created per `dispatch` call and dropped when it returns.
#[derive(Debug)]
pub struct RequestContext {
    path: String,
    method: Method,
    original_uri: String,
    received_at: SystemTime,
    params: RouteParams,
}

impl RequestContext {
    pub(crate) fn new(path: String, method: Method, original_uri: String, params: RouteParams) -> RequestContext {
        RequestContext {
            path,
            method,
            original_uri,
            received_at: SystemTime::now(),
            params,
        }
    }

    /// The percent-decoded request path that matching ran against.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The original request URI as received, kept for logging and
    /// diagnostics only.
    pub fn original_uri(&self) -> &str {
        &self.original_uri
    }

    pub fn received_at(&self) -> SystemTime {
        self.received_at
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Shorthand for `params().get(name)`.
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }
}
