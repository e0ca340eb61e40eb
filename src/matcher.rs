//! Segment-wise matching of request paths against templated routes.
//!
//! Candidates come from the prefix index bucket keyed by the request's first
//! segment; when no bucket exists (or it is empty) the matcher falls back to
//! scanning the full templated-route list. Within the candidate list the
//! first registered route that matches every segment wins; no scoring or
//! specificity ranking is applied.

use crate::pattern::{self, Segment};
use crate::route::ParamRoute;
use log::trace;
use std::collections::HashMap;

/// Finds the best templated route for `request_path`, returning the route
/// and the raw captured text per placeholder name. Returns `None` when no
/// candidate matches; that is an expected outcome, not an error.
pub(crate) fn match_param_route<'r>(
    routes: &'r [ParamRoute],
    prefix_index: &HashMap<String, Vec<usize>>,
    request_path: &str,
) -> Option<(&'r ParamRoute, Vec<(String, String)>)> {
    let request_segments = pattern::split(request_path);
    let first_segment = request_segments.first().copied().unwrap_or("");

    match prefix_index.get(first_segment) {
        Some(bucket) if !bucket.is_empty() => {
            trace!(
                "matching {:?} against {} candidate(s) in bucket {:?}",
                request_path,
                bucket.len(),
                first_segment
            );
            bucket.iter().find_map(|&i| {
                try_candidate(&routes[i], &request_segments).map(|captured| (&routes[i], captured))
            })
        }
        _ => {
            trace!(
                "no prefix bucket for {:?}, scanning all {} templated route(s)",
                first_segment,
                routes.len()
            );
            routes
                .iter()
                .find_map(|route| try_candidate(route, &request_segments).map(|captured| (route, captured)))
        }
    }
}

/// Walks one candidate pairwise against the request segments. Literals must
/// match exactly (case-sensitive); placeholders capture any non-empty
/// segment, subject to their anchored constraint when one is registered.
fn try_candidate(route: &ParamRoute, request_segments: &[&str]) -> Option<Vec<(String, String)>> {
    if route.segments.len() != request_segments.len() {
        return None;
    }

    let mut captured = Vec::with_capacity(route.param_names.len());

    for (segment, &text) in route.segments.iter().zip(request_segments) {
        match segment {
            Segment::Literal(literal) => {
                if literal != text {
                    return None;
                }
            }
            Segment::Param { name, .. } => {
                if text.is_empty() {
                    return None;
                }
                if let Some(constraint) = route.constraints.get(name) {
                    if !constraint.is_match(text) {
                        trace!(
                            "constraint on {:?} rejected {:?} for pattern {:?}",
                            name,
                            text,
                            route.pattern
                        );
                        return None;
                    }
                }
                captured.push((name.clone(), text.to_string()));
            }
        }
    }

    Some(captured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse;
    use crate::route::BoxedHandler;
    use crate::types::{ParamType, RequestContext};
    use bytes::Bytes;
    use http::Response;
    use regex::Regex;

    fn noop_handler() -> BoxedHandler {
        Box::new(|_: &RequestContext| Response::new(Bytes::new()))
    }

    fn param_route(pattern: &str, constraints: &[(&str, &str)]) -> ParamRoute {
        let parsed = parse(pattern);
        let param_types = parsed
            .segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Param { name, ty } => Some((name.clone(), *ty)),
                Segment::Literal(_) => None,
            })
            .collect();
        let constraints = constraints
            .iter()
            .map(|(name, text)| {
                (
                    name.to_string(),
                    Regex::new(&format!("^(?:{})$", text)).unwrap(),
                )
            })
            .collect();

        ParamRoute {
            pattern: pattern.to_string(),
            segments: parsed.segments,
            param_names: parsed.param_names,
            param_types,
            constraints,
            first_segment: parsed.first_segment,
            handler: noop_handler(),
            middleware: Vec::new(),
            name: None,
        }
    }

    fn index_of(routes: &[ParamRoute]) -> HashMap<String, Vec<usize>> {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, route) in routes.iter().enumerate() {
            index.entry(route.first_segment.clone()).or_default().push(i);
        }
        index
    }

    #[test]
    fn should_capture_placeholder_segments() {
        let routes = vec![param_route("/users/{id}/books/{book}", &[])];
        let index = index_of(&routes);

        let (route, captured) = match_param_route(&routes, &index, "/users/alice/books/dune").unwrap();
        assert_eq!(route.pattern, "/users/{id}/books/{book}");
        assert_eq!(
            captured,
            vec![("id".to_string(), "alice".to_string()), ("book".to_string(), "dune".to_string())]
        );
    }

    #[test]
    fn should_skip_candidates_with_different_segment_count() {
        let routes = vec![param_route("/users/{id}", &[])];
        let index = index_of(&routes);

        assert!(match_param_route(&routes, &index, "/users").is_none());
        assert!(match_param_route(&routes, &index, "/users/1/extra").is_none());
    }

    #[test]
    fn should_reject_constraint_violations_and_try_next_candidate() {
        let routes = vec![
            param_route("/users/{id}", &[("id", "[0-9]+")]),
            param_route("/users/{slug}", &[]),
        ];
        let index = index_of(&routes);

        let (route, captured) = match_param_route(&routes, &index, "/users/abc").unwrap();
        assert_eq!(route.pattern, "/users/{slug}");
        assert_eq!(captured, vec![("slug".to_string(), "abc".to_string())]);

        let (route, _) = match_param_route(&routes, &index, "/users/42").unwrap();
        assert_eq!(route.pattern, "/users/{id}");
    }

    #[test]
    fn should_anchor_constraints() {
        let routes = vec![param_route("/users/{id}", &[("id", "[0-9]+")])];
        let index = index_of(&routes);

        // A partial match ("9" inside "9a") must not satisfy the constraint.
        assert!(match_param_route(&routes, &index, "/users/9a").is_none());
    }

    #[test]
    fn should_prefer_earliest_registered_candidate() {
        let routes = vec![
            param_route("/posts/{any}", &[]),
            param_route("/posts/{id}", &[("id", "[0-9]+")]),
        ];
        let index = index_of(&routes);

        // Both match "/posts/7"; registration order decides.
        let (route, _) = match_param_route(&routes, &index, "/posts/7").unwrap();
        assert_eq!(route.pattern, "/posts/{any}");
    }

    #[test]
    fn should_match_case_sensitively_on_literals() {
        let routes = vec![param_route("/Users/{id}", &[])];
        let index = index_of(&routes);

        assert!(match_param_route(&routes, &index, "/users/1").is_none());
        assert!(match_param_route(&routes, &index, "/Users/1").is_some());
    }

    #[test]
    fn should_reject_empty_segment_for_placeholder() {
        let routes = vec![param_route("/a/{x}/b", &[])];
        let index = index_of(&routes);

        assert!(match_param_route(&routes, &index, "/a//b").is_none());
    }

    #[test]
    fn should_match_empty_literal_from_doubled_separator() {
        // A doubled separator in the pattern yields an empty literal
        // segment, which matches the equally empty request segment.
        let routes = vec![param_route("/a//b", &[])];
        let index = index_of(&routes);

        let (route, captured) = match_param_route(&routes, &index, "/a//b").unwrap();
        assert_eq!(route.pattern, "/a//b");
        assert!(captured.is_empty());

        assert!(match_param_route(&routes, &index, "/a/x/b").is_none());
    }

    #[test]
    fn should_fall_back_to_full_scan_without_a_bucket() {
        let routes = vec![param_route("/{section}/{id}", &[])];
        let index = index_of(&routes);

        // First request segment "docs" has no bucket; the full scan still
        // finds the placeholder-first route.
        let (route, captured) = match_param_route(&routes, &index, "/docs/3").unwrap();
        assert_eq!(route.pattern, "/{section}/{id}");
        assert_eq!(
            captured,
            vec![("section".to_string(), "docs".to_string()), ("id".to_string(), "3".to_string())]
        );
    }

    #[test]
    fn should_scan_only_the_matching_bucket() {
        let routes = vec![
            param_route("/users/{id}", &[]),
            param_route("/products/{id}", &[]),
        ];
        let index = index_of(&routes);

        // Disjoint bucket: same observable outcome as a full scan.
        let (route, _) = match_param_route(&routes, &index, "/products/9").unwrap();
        assert_eq!(route.pattern, "/products/{id}");
        assert!(match_param_route(&routes, &index, "/orders/9").is_none());
    }

    #[test]
    fn should_match_zero_segment_pattern_via_empty_bucket() {
        let routes = vec![param_route("/", &[])];
        let index = index_of(&routes);

        let (route, captured) = match_param_route(&routes, &index, "/").unwrap();
        assert_eq!(route.pattern, "/");
        assert!(captured.is_empty());
    }

    #[test]
    fn should_record_declared_types_per_param() {
        let route = param_route("/users/{id:int}", &[]);
        assert_eq!(route.param_types.get("id"), Some(&ParamType::Int));
    }
}
