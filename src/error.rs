use std::fmt::{self, Debug, Display, Formatter};

/// A boxed error type to allow arbitrary error values to cross the router
/// boundary. Only configuration failures (invalid constraint patterns at
/// build time, URL generation against an unknown or under-supplied named
/// route) are surfaced this way; routing outcomes are never errors.
pub type RouteError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type used by the router itself.
pub struct Error {
    msg: String,
}

impl Error {
    /// Creates a new error with the given message. Collaborating layers
    /// (handler resolution, not-found rendering) may use this to surface
    /// their own configuration failures through the same type.
    pub fn new<M: Into<String>>(msg: M) -> Error {
        Error { msg: msg.into() }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "signpost: {}", self.msg)
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for Error {}
