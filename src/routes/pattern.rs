//! Route path patterns. A pattern is a `/`-separated list of literal segments,
//! `:name` parameters (optionally constrained, e.g. `:id(\d+)`) and a trailing
//! `*` wildcard that swallows the rest of the path.

use regex::Regex;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route pattern {pattern:?}: parameter without a name")]
    UnnamedParam { pattern: String },
    #[error("route pattern {pattern:?}: wildcard must be the last segment")]
    WildcardNotLast { pattern: String },
    #[error("route pattern {pattern:?}: invalid constraint: {source}")]
    InvalidConstraint {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Clone, Debug)]
enum Segment {
    Literal(String),
    Param {
        name: String,
        constraint: Option<Regex>,
    },
    Wildcard,
}

#[derive(Clone, Debug)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a pattern. Leading, trailing and repeated slashes are ignored, so
    /// `""` and `"/"` both match the empty remainder.
    ///
    /// # Errors
    /// Returns an error for unnamed parameters, misplaced wildcards or invalid
    /// constraint expressions.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let parts: Vec<&str> = split_segments(raw).collect();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = if *part == "*" {
                if index + 1 != parts.len() {
                    return Err(RouteError::WildcardNotLast {
                        pattern: raw.to_string(),
                    });
                }
                Segment::Wildcard
            } else if let Some(param) = part.strip_prefix(':') {
                parse_param(raw, param)?
            } else {
                Segment::Literal((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Preference when siblings compete: literal, then parameter, then
    /// wildcard. An empty pattern counts as literal.
    pub(crate) fn rank(&self) -> u8 {
        match self.segments.first() {
            None | Some(Segment::Literal(_)) => 0,
            Some(Segment::Param { .. }) => 1,
            Some(Segment::Wildcard) => 2,
        }
    }

    /// Matches the pattern against the start of `path`, returning how many
    /// segments were consumed. Captured parameters are appended to `params`.
    pub(crate) fn match_prefix(
        &self,
        path: &[&str],
        params: &mut Vec<(String, String)>,
    ) -> Option<usize> {
        let mut captured = Vec::new();
        let mut consumed = 0;

        for segment in &self.segments {
            match segment {
                Segment::Wildcard => {
                    captured.push(("*".to_string(), path[consumed..].join("/")));
                    consumed = path.len();
                }
                Segment::Literal(literal) => {
                    let value = path.get(consumed)?;
                    if *value != literal.as_str() {
                        return None;
                    }
                    consumed += 1;
                }
                Segment::Param { name, constraint } => {
                    let value = path.get(consumed)?;
                    if let Some(constraint) = constraint {
                        if !constraint.is_match(value) {
                            return None;
                        }
                    }
                    captured.push((name.clone(), (*value).to_string()));
                    consumed += 1;
                }
            }
        }

        params.extend(captured);
        Some(consumed)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.raw)
    }
}

fn parse_param(raw: &str, param: &str) -> Result<Segment, RouteError> {
    let (name, constraint) = match param.split_once('(') {
        Some((name, rest)) => {
            let expression = rest.strip_suffix(')').unwrap_or(rest);
            let regex = Regex::new(&format!("^(?:{expression})$")).map_err(|source| {
                RouteError::InvalidConstraint {
                    pattern: raw.to_string(),
                    source,
                }
            })?;
            (name, Some(regex))
        }
        None => (param, None),
    };

    if name.is_empty() {
        return Err(RouteError::UnnamedParam {
            pattern: raw.to_string(),
        });
    }

    Ok(Segment::Param {
        name: name.to_string(),
        constraint,
    })
}

/// Splits a path into its non-empty segments.
pub(crate) fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
