//! Request matching for handler blocks.
//!
//! # Responsibilities
//! - Match host header (exact match, case-insensitive)
//! - Match path prefix (case-sensitive)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Host matching is case-insensitive (per HTTP spec)
//! - Path matching is case-sensitive
//! - Empty condition = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use axum::http::{header, HeaderMap, Uri};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, uri: &Uri, headers: &HeaderMap) -> bool;
}

/// Matches the Host header, or the URI authority when there is none.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, uri: &Uri, headers: &HeaderMap) -> bool {
        headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| uri.authority().map(|a| a.as_str()))
            .map(|h| h.to_lowercase() == self.expected_host)
            .unwrap_or(false)
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, uri: &Uri, _headers: &HeaderMap) -> bool {
        uri.path().starts_with(&self.prefix)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, uri: &Uri, headers: &HeaderMap) -> bool {
        self.matchers.iter().all(|m| m.matches(uri, headers))
    }
}

/// Build the matcher for a handler block. No conditions matches everything.
pub fn build_matcher(host: Option<&str>, path_prefix: Option<&str>) -> Box<dyn Matcher> {
    let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();
    if let Some(host) = host {
        matchers.push(Box::new(HostMatcher::new(host)));
    }
    if let Some(prefix) = path_prefix {
        matchers.push(Box::new(PathPrefixMatcher::new(prefix)));
    }
    Box::new(AndMatcher::new(matchers))
}
