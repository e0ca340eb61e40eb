use crate::types::ParamType;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // A whole segment of the form `{ident}` or `{ident:type}`.
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"^\{([A-Za-z_][A-Za-z0-9_]*)(?::([a-z]+))?\}$").unwrap();
    // The same grammar, matched anywhere inside a pattern string. Used for
    // URL generation, where substitution runs over the original text.
    pub(crate) static ref INLINE_PLACEHOLDER_RE: Regex =
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(?::[a-z]+)?\}").unwrap();
    // Anything brace-delimited that survived substitution, valid grammar or
    // not. Its presence makes URL generation fail.
    pub(crate) static ref LEFTOVER_PLACEHOLDER_RE: Regex =
        Regex::new(r"\{[^/{}]*\}").unwrap();
}

/// One parsed segment of a templated route pattern.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Segment {
    Literal(String),
    Param { name: String, ty: ParamType },
}

/// The result of parsing a route pattern: its segments in order, the
/// placeholder names in appearance order, and the raw text of the first
/// segment (empty for a zero-segment pattern), which keys the prefix index.
#[derive(Debug)]
pub(crate) struct ParsedPattern {
    pub(crate) segments: Vec<Segment>,
    pub(crate) param_names: Vec<String>,
    pub(crate) first_segment: String,
}

/// Trims leading/trailing separators and splits the remainder into
/// segments. A path of only separators has zero segments; interior doubled
/// separators yield empty literal segments.
pub(crate) fn split(path: &str) -> Vec<&str> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

/// Parses a route pattern. A segment matching the placeholder grammar
/// becomes a `Param` with its declared type (`string` when omitted or
/// unrecognized); every other segment, malformed braces included, stays a
/// literal.
pub(crate) fn parse(pattern: &str) -> ParsedPattern {
    let raw_segments = split(pattern);
    let first_segment = raw_segments.first().copied().unwrap_or("").to_string();

    let mut segments = Vec::with_capacity(raw_segments.len());
    let mut param_names = Vec::new();

    for raw in raw_segments {
        match PLACEHOLDER_RE.captures(raw) {
            Some(caps) => {
                let name = caps[1].to_string();
                let ty = caps
                    .get(2)
                    .map(|m| ParamType::from_declared(m.as_str()))
                    .unwrap_or(ParamType::Str);
                param_names.push(name.clone());
                segments.push(Segment::Param { name, ty });
            }
            None => segments.push(Segment::Literal(raw.to_string())),
        }
    }

    ParsedPattern {
        segments,
        param_names,
        first_segment,
    }
}
