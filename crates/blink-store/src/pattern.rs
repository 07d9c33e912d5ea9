//! Key query patterns.
//!
//! A query is either exact or wildcard:
//!
//! - No `*` anywhere: the query names at most one key, itself.
//! - One or more `*`: every `*` matches any run of characters (including
//!   none, including `.` and newlines), every other character matches only
//!   itself, and the match is anchored to the whole key.
//!
//! `*` knows nothing about separators. `prefix.*.suffix` matches
//! `prefix.a.b.suffix` just as well as `prefix.a.suffix`.

use std::fmt;

use regex::Regex;
use tracing::debug;

/// The wildcard character.
pub const WILDCARD: char = '*';

/// A compiled key query.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Matches exactly one literal key.
    Exact(String),
    /// Matches every key the anchored wildcard expression accepts.
    Wildcard { source: String, matcher: Matcher },
}

/// How a wildcard pattern tests keys.
#[derive(Clone, Debug)]
pub enum Matcher {
    /// Anchored regular expression with every literal piece escaped.
    Regex(Regex),
    /// The literal pieces between stars, used when the expression is too
    /// large for the regex engine.
    Pieces(Vec<String>),
}

impl Pattern {
    /// Compile a query string. Never fails.
    ///
    /// ```
    /// use blink_store::Pattern;
    ///
    /// let p = Pattern::parse("prefix.*.suffix");
    /// assert!(p.matches("prefix.middle.suffix"));
    /// assert!(!p.matches("prefixXmiddle.suffix"));
    /// ```
    pub fn parse(query: &str) -> Self {
        if !Self::is_wildcard_str(query) {
            return Pattern::Exact(query.to_string());
        }

        let body: Vec<String> = query.split(WILDCARD).map(regex::escape).collect();
        let expr = format!(r"(?s)\A{}\z", body.join(".*"));
        let matcher = match Regex::new(&expr) {
            Ok(regex) => Matcher::Regex(regex),
            Err(e) => {
                debug!(len = query.len(), error = %e, "wildcard too large for regex; matching by pieces");
                Matcher::Pieces(query.split(WILDCARD).map(str::to_string).collect())
            }
        };

        Pattern::Wildcard {
            source: query.to_string(),
            matcher,
        }
    }

    /// Returns `true` if `query` would compile to a wildcard pattern.
    pub fn is_wildcard_str(query: &str) -> bool {
        query.contains(WILDCARD)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Pattern::Wildcard { .. })
    }

    /// The query string this pattern was compiled from.
    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Exact(key) => key,
            Pattern::Wildcard { source, .. } => source,
        }
    }

    /// Test a stored key against this pattern.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Pattern::Exact(expected) => expected == key,
            Pattern::Wildcard { matcher, .. } => matcher.matches(key),
        }
    }
}

impl Matcher {
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Matcher::Regex(regex) => regex.is_match(key),
            Matcher::Pieces(pieces) => pieces_match(pieces, key),
        }
    }
}

/// Anchored glob match over the literal pieces a query splits into at `*`.
///
/// `pieces` has at least two elements. The first must be a prefix of `key`,
/// the last a suffix that does not overlap it, and the ones in between must
/// appear in order; taking the leftmost occurrence of each is always safe.
fn pieces_match(pieces: &[String], key: &str) -> bool {
    let (first, rest) = match pieces.split_first() {
        Some(split) => split,
        None => return key.is_empty(),
    };
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return key == first,
    };

    let Some(mut remaining) = key.strip_prefix(first.as_str()) else {
        return false;
    };
    let Some(body) = remaining.strip_suffix(last.as_str()) else {
        return false;
    };
    remaining = body;

    for piece in middle {
        match remaining.find(piece.as_str()) {
            Some(at) => remaining = &remaining[at + piece.len()..],
            None => return false,
        }
    }
    true
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
