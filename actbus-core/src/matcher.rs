//! Matchers over one routing-key component.
//!
//! A [`Matcher`] decides whether a candidate string satisfies a pattern. The
//! string form collapses wildcard and exact matching into one rule: a string
//! pattern equal to [`WILDCARD`] matches everything, any other string pattern
//! matches only itself.
//!
//! Matchers are pure and stateless. Predicates are trusted to be pure too;
//! nothing guards against a predicate with side effects.

use crate::error::ConfigurationError;
use regex::Regex;
use serde::Deserialize;
use std::{collections::BTreeMap, fmt, sync::Arc};

/// The literal wildcard token.
pub const WILDCARD: &str = "*";

/// A decision function over a candidate string.
pub type PredicateFn = Arc<dyn Fn(&str) -> bool + Send + Sync + 'static>;

/// A pattern over one routing-key component.
#[derive(Clone)]
pub enum Matcher {
    /// Matches the exact string, or everything when the string is [`WILDCARD`].
    Exact(String),
    /// Matches every candidate.
    Wildcard,
    /// Matches when the expression finds a match in the candidate.
    ///
    /// Expressions are not anchored by the bus.
    Pattern(Regex),
    /// Matches when the function returns `true`.
    Predicate(PredicateFn),
}

impl Matcher {
    /// A string matcher. `"*"` matches everything.
    pub fn exact(value: impl Into<String>) -> Self {
        Matcher::Exact(value.into())
    }

    /// The universal matcher.
    pub const fn any() -> Self {
        Matcher::Wildcard
    }

    /// Compile a regular-expression matcher.
    pub fn pattern(expr: &str) -> Result<Self, ConfigurationError> {
        Regex::new(expr)
            .map(Matcher::Pattern)
            .map_err(|source| ConfigurationError::InvalidPattern {
                pattern: expr.to_owned(),
                source,
            })
    }

    /// A predicate matcher.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(Arc::new(f))
    }

    /// Whether `candidate` satisfies this matcher.
    pub fn matches(&self, candidate: &str) -> bool {
        match self {
            Matcher::Exact(value) => value == WILDCARD || value == candidate,
            Matcher::Wildcard => true,
            Matcher::Pattern(re) => re.is_match(candidate),
            Matcher::Predicate(f) => f(candidate),
        }
    }

    /// Whether this matcher accepts every candidate by construction.
    pub fn is_wildcard(&self) -> bool {
        match self {
            Matcher::Exact(value) => value == WILDCARD,
            Matcher::Wildcard => true,
            Matcher::Pattern(_) | Matcher::Predicate(_) => false,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Matcher::Wildcard
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Exact(value) => f.debug_tuple("Exact").field(value).finish(),
            Matcher::Wildcard => f.write_str("Wildcard"),
            Matcher::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for Matcher {
    fn from(value: &str) -> Self {
        Matcher::exact(value)
    }
}

impl From<String> for Matcher {
    fn from(value: String) -> Self {
        Matcher::Exact(value)
    }
}

impl From<Regex> for Matcher {
    fn from(re: Regex) -> Self {
        Matcher::Pattern(re)
    }
}

/// A declarative matcher, as written in configuration files.
///
/// - a bare string is a string matcher (`"*"` is the wildcard)
/// - `{ exact = "..." }` is a string matcher
/// - `{ pattern = "..." }` or `{ regex = "..." }` is a regular expression
/// - `{ any = true }` is the wildcard
///
/// Any other key is an unknown matcher kind and is rejected when the table is
/// resolved, not when a dispatch call happens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MatcherSpec {
    /// A string matcher.
    Literal(String),
    /// A single-key table naming the matcher kind.
    Table(BTreeMap<String, MatcherValue>),
}

impl MatcherSpec {
    /// Resolve into a [`Matcher`].
    pub fn to_matcher(&self) -> Result<Matcher, ConfigurationError> {
        let table = match self {
            MatcherSpec::Literal(value) => return Ok(Matcher::exact(value.clone())),
            MatcherSpec::Table(table) => table,
        };

        let mut entries = table.iter();
        let (kind, value) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(ConfigurationError::InvalidMatcher(format!(
                    "expected exactly one matcher kind, found {}",
                    table.len()
                )));
            }
        };

        match (kind.as_str(), value) {
            ("exact", MatcherValue::Str(value)) => Ok(Matcher::exact(value.clone())),
            ("pattern" | "regex", MatcherValue::Str(expr)) => Matcher::pattern(expr),
            ("any", MatcherValue::Bool(true)) => Ok(Matcher::any()),
            ("exact" | "pattern" | "regex" | "any", other) => Err(
                ConfigurationError::InvalidMatcher(format!("unexpected value {other:?} for `{kind}`")),
            ),
            (unknown, _) => Err(ConfigurationError::UnknownMatcherKind(unknown.to_owned())),
        }
    }
}

impl From<&str> for MatcherSpec {
    fn from(value: &str) -> Self {
        MatcherSpec::Literal(value.to_owned())
    }
}

/// The scalar values a matcher table may carry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MatcherValue {
    /// A string argument, for `exact`, `pattern` and `regex`.
    Str(String),
    /// A flag, for `any`.
    Bool(bool),
}
