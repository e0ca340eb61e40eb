use crate::matcher;
use crate::middleware::{self, Middleware, NamedMiddleware};
use crate::pattern::{self, INLINE_PLACEHOLDER_RE, LEFTOVER_PLACEHOLDER_RE};
use crate::route::{BoxedHandler, ExactRoute, Handler, ParamRoute};
use crate::types::{cast_param, ParamType, RequestContext, RouteParams};
use crate::Error;
use bytes::Bytes;
use http::{Method, Response, StatusCode};
use log::debug;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

/// A templated route pending `build()`: constraints are kept as raw text
/// and compiled when the router is frozen.
struct PendingParamRoute {
    pattern: String,
    segments: Vec<pattern::Segment>,
    param_names: Vec<String>,
    param_types: HashMap<String, ParamType>,
    constraints: Vec<(String, String)>,
    handler: BoxedHandler,
    middleware: Vec<String>,
    name: Option<String>,
}

/// Builder for a [`Router`]. All registration happens here; `build()`
/// freezes the tables, after which the router is read-only.
///
/// Create it with [`Router::builder`].
#[derive(Default)]
pub struct RouterBuilder {
    exact_routes: HashMap<String, ExactRoute>,
    param_routes: Vec<PendingParamRoute>,
    // (symbolic name, templated-route index) assignments in call order. The
    // same route may receive several names; reusing a name re-points it.
    named: Vec<(String, usize)>,
    named_middleware: HashMap<String, NamedMiddleware>,
    middleware: Vec<Box<dyn Middleware>>,
    not_found: Option<BoxedHandler>,
}

impl RouterBuilder {
    /// Registers an exact route. The path is taken verbatim as the lookup
    /// key; re-registering the same path overwrites the earlier entry.
    pub fn route<P: Into<String>>(self, path: P, handler: impl Handler) -> Self {
        self.route_with(path, handler, &[])
    }

    /// Like [`route`](Self::route), with named-middleware identifiers to run
    /// before the handler.
    pub fn route_with<P: Into<String>>(
        mut self,
        path: P,
        handler: impl Handler,
        middleware_names: &[&str],
    ) -> Self {
        self.exact_routes.insert(
            path.into(),
            ExactRoute {
                handler: Box::new(handler),
                middleware: middleware_names.iter().map(|s| s.to_string()).collect(),
            },
        );
        self
    }

    /// Registers a templated route. Segments of the form `{name}` or
    /// `{name:type}` become placeholders; everything else is literal text.
    /// Follow up with [`constraint`](Self::constraint) and
    /// [`name`](Self::name) to refine the route just added.
    pub fn param_route<P: Into<String>>(self, pattern: P, handler: impl Handler) -> Self {
        self.param_route_with(pattern, handler, &[])
    }

    /// Like [`param_route`](Self::param_route), with named-middleware
    /// identifiers to run before the handler.
    pub fn param_route_with<P: Into<String>>(
        mut self,
        pattern: P,
        handler: impl Handler,
        middleware_names: &[&str],
    ) -> Self {
        let pattern = pattern.into();
        let parsed = pattern::parse(&pattern);
        let param_types = parsed
            .segments
            .iter()
            .filter_map(|segment| match segment {
                pattern::Segment::Param { name, ty } => Some((name.clone(), *ty)),
                pattern::Segment::Literal(_) => None,
            })
            .collect();

        self.param_routes.push(PendingParamRoute {
            pattern,
            segments: parsed.segments,
            param_names: parsed.param_names,
            param_types,
            constraints: Vec::new(),
            handler: Box::new(handler),
            middleware: middleware_names.iter().map(|s| s.to_string()).collect(),
            name: None,
        });
        self
    }

    /// Attaches a validation pattern to a placeholder of the most recently
    /// added templated route. The pattern is compiled anchored (the captured
    /// segment must match it fully) at `build()`. A no-op when no templated
    /// route has been added yet.
    pub fn constraint<N: Into<String>, C: Into<String>>(mut self, param_name: N, constraint: C) -> Self {
        if let Some(pending) = self.param_routes.last_mut() {
            pending.constraints.push((param_name.into(), constraint.into()));
        }
        self
    }

    /// Attaches a symbolic name to the most recently added templated route,
    /// making it addressable by [`Router::url_for`]. Assigning a name twice
    /// re-points the lookup entry (last write wins). A no-op when no
    /// templated route has been added yet.
    pub fn name<N: Into<String>>(mut self, symbolic_name: N) -> Self {
        if self.param_routes.is_empty() {
            return self;
        }
        let index = self.param_routes.len() - 1;
        let symbolic_name = symbolic_name.into();
        self.param_routes[index].name = Some(symbolic_name.clone());
        self.named.push((symbolic_name, index));
        self
    }

    /// Inserts a named-middleware predicate under `identifier`, overwriting
    /// any earlier registration. The predicate receives the request path and
    /// method; returning `false` halts the route's named chain.
    pub fn named_middleware<I, F>(mut self, identifier: I, predicate: F) -> Self
    where
        I: Into<String>,
        F: Fn(&str, &Method) -> bool + Send + Sync + 'static,
    {
        self.named_middleware.insert(identifier.into(), Box::new(predicate));
        self
    }

    /// Appends a global middleware layer. The first layer registered becomes
    /// the outermost wrapper around every dispatch.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Box::new(middleware));
        self
    }

    /// Overrides the not-found rendering used when neither an exact nor a
    /// templated route matches.
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.not_found = Some(Box::new(handler));
        self
    }

    /// Freezes the registry: compiles constraint patterns, builds the prefix
    /// index and the named-route table, and installs the default not-found
    /// rendering if none was set. Fails when a constraint pattern does not
    /// compile.
    pub fn build(self) -> crate::Result<Router> {
        let mut param_routes = Vec::with_capacity(self.param_routes.len());

        for pending in self.param_routes {
            let mut constraints = HashMap::with_capacity(pending.constraints.len());
            for (param_name, text) in pending.constraints {
                let regex = Regex::new(&format!("^(?:{})$", text)).map_err(|e| {
                    Error::new(format!(
                        "invalid constraint {:?} for parameter {:?} in pattern {:?}: {}",
                        text, param_name, pending.pattern, e
                    ))
                })?;
                constraints.insert(param_name, regex);
            }

            let parsed_first = pattern::parse(&pending.pattern).first_segment;
            param_routes.push(ParamRoute {
                pattern: pending.pattern,
                segments: pending.segments,
                param_names: pending.param_names,
                param_types: pending.param_types,
                constraints,
                first_segment: parsed_first,
                handler: pending.handler,
                middleware: pending.middleware,
                name: pending.name,
            });
        }

        let mut prefix_index: HashMap<String, Vec<usize>> = HashMap::new();
        for (index, route) in param_routes.iter().enumerate() {
            prefix_index
                .entry(route.first_segment.clone())
                .or_default()
                .push(index);
        }

        let mut named_routes = HashMap::new();
        for (symbolic_name, index) in self.named {
            named_routes.insert(symbolic_name, index);
        }

        Ok(Router {
            exact_routes: self.exact_routes,
            param_routes,
            prefix_index,
            named_routes,
            named_middleware: self.named_middleware,
            middleware: self.middleware,
            not_found: self.not_found.unwrap_or_else(|| Box::new(default_not_found)),
        })
    }
}

impl Debug for RouterBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ exact: {}, templated: {}, named middleware: {}, global middleware: {} }}",
            self.exact_routes.len(),
            self.param_routes.len(),
            self.named_middleware.len(),
            self.middleware.len()
        )
    }
}

fn default_not_found(_cx: &RequestContext) -> Response<Bytes> {
    let mut res = Response::new(Bytes::from_static(b"Not Found"));
    *res.status_mut() = StatusCode::NOT_FOUND;
    res
}

/// The router: exact and templated route tables, the prefix index over the
/// templated routes, the named-route lookup for URL generation, and both
/// middleware layers. Built once via [`Router::builder`] and read-only
/// thereafter; one dispatch per incoming request.
pub struct Router {
    exact_routes: HashMap<String, ExactRoute>,
    param_routes: Vec<ParamRoute>,
    prefix_index: HashMap<String, Vec<usize>>,
    named_routes: HashMap<String, usize>,
    named_middleware: HashMap<String, NamedMiddleware>,
    middleware: Vec<Box<dyn Middleware>>,
    not_found: BoxedHandler,
}

impl Router {
    /// Returns an empty builder to register routes and middleware on.
    pub fn builder() -> RouterBuilder {
        RouterBuilder::default()
    }

    /// Generates a concrete path from a named templated route by replacing
    /// each `{name}` / `{name:type}` placeholder with the matching entry in
    /// `params`. Pure string substitution: declared types and constraints
    /// are not consulted. Fails when the name is unknown or any placeholder
    /// is left unresolved.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> crate::Result<String> {
        let index = self
            .named_routes
            .get(name)
            .ok_or_else(|| Error::new(format!("no route registered under the name {:?}", name)))?;
        let route = &self.param_routes[*index];

        let substituted = INLINE_PLACEHOLDER_RE.replace_all(&route.pattern, |caps: &regex::Captures| {
            let param_name = &caps[1];
            match params.iter().find(|(key, _)| *key == param_name) {
                Some((_, value)) => (*value).to_string(),
                None => caps[0].to_string(),
            }
        });

        if let Some(leftover) = LEFTOVER_PLACEHOLDER_RE.find(&substituted) {
            return Err(Error::new(format!(
                "missing parameter {} generating a URL for route {:?}",
                leftover.as_str(),
                name
            ))
            .into());
        }

        Ok(substituted.into_owned())
    }

    /// Dispatches one request through the router: exact match first, then
    /// templated match, then the not-found rendering, each wrapped in the
    /// global middleware pipeline. Routing outcomes are never errors, so
    /// this always produces a response.
    pub fn dispatch(&self, path: &str, method: Method, original_uri: Option<&str>) -> Response<Bytes> {
        self.dispatch_with_params(path, method, original_uri, RouteParams::new())
    }

    /// Like [`dispatch`](Self::dispatch), with caller-supplied parameters
    /// seeded into the request context. Seeded values are never overwritten
    /// by captured ones.
    pub fn dispatch_with_params(
        &self,
        path: &str,
        method: Method,
        original_uri: Option<&str>,
        params: RouteParams,
    ) -> Response<Bytes> {
        let decoded = decode_request_path(path);
        let original_uri = original_uri.unwrap_or(path).to_string();
        debug!("dispatching {} {}", method, decoded);

        if let Some(route) = self.exact_routes.get(decoded.as_ref()) {
            debug!("exact route matched: {}", decoded);
            let cx = RequestContext::new(decoded.into_owned(), method, original_uri, params);
            let terminal =
                |cx: &RequestContext| self.run_terminal(&route.middleware, &route.handler, cx);
            return middleware::run_pipeline(&self.middleware, cx.path(), &cx, &terminal);
        }

        match matcher::match_param_route(&self.param_routes, &self.prefix_index, decoded.as_ref()) {
            Some((route, captured)) => {
                debug!("templated route matched: {}", route.pattern);
                let mut params = params;
                for (name, raw) in captured {
                    if !params.contains(&name) {
                        let ty = route.param_types.get(&name).copied().unwrap_or(ParamType::Str);
                        params.set(name, cast_param(ty, &raw));
                    }
                }
                let cx = RequestContext::new(decoded.into_owned(), method, original_uri, params);
                let terminal =
                    |cx: &RequestContext| self.run_terminal(&route.middleware, &route.handler, cx);
                middleware::run_pipeline(&self.middleware, &route.pattern, &cx, &terminal)
            }
            None => {
                debug!("no route matched: {}", decoded);
                let cx = RequestContext::new(decoded.into_owned(), method, original_uri, params);
                let terminal = |cx: &RequestContext| self.not_found.invoke(cx);
                middleware::run_pipeline(&self.middleware, cx.path(), &cx, &terminal)
            }
        }
    }

    /// The terminal continuation for a matched route: the route's named
    /// middleware chain, then the handler. A vetoed chain yields an empty
    /// response and the global pipeline unwinds normally around it.
    fn run_terminal(
        &self,
        middleware_names: &[String],
        handler: &BoxedHandler,
        cx: &RequestContext,
    ) -> Response<Bytes> {
        if self.run_named_middleware(middleware_names, cx) {
            handler.invoke(cx)
        } else {
            Response::new(Bytes::new())
        }
    }

    /// Runs the route's named middleware in order. Identifiers that were
    /// never registered are skipped; an explicit `false` halts the chain.
    fn run_named_middleware(&self, middleware_names: &[String], cx: &RequestContext) -> bool {
        for name in middleware_names {
            match self.named_middleware.get(name) {
                Some(predicate) => {
                    if !predicate(cx.path(), cx.method()) {
                        debug!("named middleware {:?} halted {} {}", name, cx.method(), cx.path());
                        return false;
                    }
                }
                None => {
                    log::trace!("named middleware {:?} is not registered, skipping", name);
                }
            }
        }
        true
    }
}

impl Debug for Router {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ exact: {:?}, templated: {:?}, named: {:?} }}",
            self.exact_routes.keys().collect::<Vec<_>>(),
            self.param_routes,
            self.named_routes.keys().collect::<Vec<_>>()
        )
    }
}

fn decode_request_path(path: &str) -> Cow<'_, str> {
    match percent_decode_str(path).decode_utf8() {
        Ok(decoded) => decoded,
        Err(e) => {
            debug!("could not percent-decode {:?}, matching it raw: {}", path, e);
            Cow::Borrowed(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(body: &'static str) -> impl Fn(&RequestContext) -> Response<Bytes> {
        move |_| Response::new(Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn should_generate_url_from_named_route() {
        let router = Router::builder()
            .param_route("/users/{id}", text("user"))
            .name("user.show")
            .build()
            .unwrap();

        assert_eq!(router.url_for("user.show", &[("id", "7")]).unwrap(), "/users/7");
    }

    #[test]
    fn should_substitute_typed_placeholders() {
        let router = Router::builder()
            .param_route("/users/{id:int}/posts/{slug}", text("post"))
            .name("user.post")
            .build()
            .unwrap();

        assert_eq!(
            router.url_for("user.post", &[("id", "3"), ("slug", "hello")]).unwrap(),
            "/users/3/posts/hello"
        );
    }

    #[test]
    fn should_fail_url_generation_for_unknown_name() {
        let router = Router::builder().build().unwrap();
        let err = router.url_for("no.such.name", &[]).unwrap_err();
        assert!(err.to_string().contains("no.such.name"));
    }

    #[test]
    fn should_fail_url_generation_on_unresolved_placeholder() {
        let router = Router::builder()
            .param_route("/users/{id}", text("user"))
            .name("user.show")
            .build()
            .unwrap();

        let err = router.url_for("user.show", &[]).unwrap_err();
        assert!(err.to_string().contains("{id}"));
    }

    #[test]
    fn should_fail_url_generation_on_pseudo_placeholder_literal() {
        // "{id:INT}" fails the placeholder grammar (type must be lowercase)
        // and parses as a literal segment, but the leftover check runs over
        // the substituted text and still trips on it.
        let router = Router::builder()
            .param_route("/files/{name}/{id:INT}", text("file"))
            .name("file.show")
            .build()
            .unwrap();

        let err = router.url_for("file.show", &[("name", "a"), ("id", "9")]).unwrap_err();
        assert!(err.to_string().contains("{id:INT}"));
    }

    #[test]
    fn should_keep_url_generation_idempotent() {
        let router = Router::builder()
            .param_route("/users/{id}", text("user"))
            .name("user.show")
            .build()
            .unwrap();

        let first = router.url_for("user.show", &[("id", "9")]).unwrap();
        let second = router.url_for("user.show", &[("id", "9")]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn should_ignore_name_without_a_templated_route() {
        // `name` before any `param_route` is a no-op, not an error.
        let router = Router::builder().name("orphan").build().unwrap();
        assert!(router.url_for("orphan", &[]).is_err());
    }

    #[test]
    fn should_repoint_duplicate_names_to_the_latest_route() {
        let router = Router::builder()
            .param_route("/old/{id}", text("old"))
            .name("thing.show")
            .param_route("/new/{id}", text("new"))
            .name("thing.show")
            .build()
            .unwrap();

        assert_eq!(router.url_for("thing.show", &[("id", "1")]).unwrap(), "/new/1");
    }

    #[test]
    fn should_allow_multiple_names_for_one_route() {
        let router = Router::builder()
            .param_route("/users/{id}", text("user"))
            .name("user.show")
            .name("user.detail")
            .build()
            .unwrap();

        assert_eq!(router.url_for("user.show", &[("id", "2")]).unwrap(), "/users/2");
        assert_eq!(router.url_for("user.detail", &[("id", "2")]).unwrap(), "/users/2");
    }

    #[test]
    fn should_surface_invalid_constraints_at_build() {
        let result = Router::builder()
            .param_route("/users/{id}", text("user"))
            .constraint("id", "[unclosed")
            .build();

        assert!(result.is_err());
    }

    #[test]
    fn should_overwrite_duplicate_exact_routes() {
        let router = Router::builder()
            .route("/about", text("first"))
            .route("/about", text("second"))
            .build()
            .unwrap();

        let res = router.dispatch("/about", Method::GET, None);
        assert_eq!(res.into_body(), Bytes::from_static(b"second"));
    }

    #[test]
    fn should_percent_decode_the_request_path() {
        let router = Router::builder()
            .param_route("/users/{name}", text("user"))
            .build()
            .unwrap();

        let res = router.dispatch("/users/a%20b", Method::GET, None);
        assert_eq!(res.status(), StatusCode::OK);
    }
}
