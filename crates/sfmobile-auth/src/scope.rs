//! OAuth 2.0 scope handling.
//!
//! Salesforce returns the granted scopes as a single space-delimited string (`"api id
//! refresh_token"`), and expects the requested scopes in the same form on the authorize endpoint.
//! [`ScopeParser`] normalizes both directions.

use std::{collections::BTreeSet, fmt};

/// Scope granting a refresh token. Always requested when any scope is requested.
pub const REFRESH_TOKEN: &str = "refresh_token";
/// Scope granting access to the identity service.
pub const ID: &str = "id";
/// Scope granting access to the REST API.
pub const API: &str = "api";
/// Scope granting access to web sessions (front door).
pub const WEB: &str = "web";
/// OpenID Connect scope.
pub const OPENID: &str = "openid";

/// A deduplicated, sorted set of OAuth scopes.
///
/// Matching is exact and case is preserved. An empty or missing input results in an empty set,
/// never in an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeParser {
    scopes: BTreeSet<String>,
}

impl ScopeParser {
    /// Parses an optional space-delimited scope string. `None` and blank strings yield an empty
    /// set.
    pub fn new(scopes: Option<&str>) -> Self {
        scopes.map(Self::parse).unwrap_or_default()
    }

    /// Parses a space-delimited scope string.
    pub fn parse(scopes: &str) -> Self {
        Self::from_scopes([scopes])
    }

    /// Builds the set from a list of scopes. Every entry is itself split on whitespace, so
    /// `["api id", "web"]` is equivalent to `["api", "id", "web"]`.
    pub fn from_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scopes = scopes
            .into_iter()
            .flat_map(|s| {
                s.as_ref()
                    .split_whitespace()
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
            .collect();

        Self { scopes }
    }

    /// Returns `true` if `name` (trimmed) is one of the held scopes. Blank names never match.
    pub fn has_scope(&self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && self.scopes.contains(name)
    }

    /// Returns `true` if the `refresh_token` scope is present.
    pub fn has_refresh_token_scope(&self) -> bool {
        self.has_scope(REFRESH_TOKEN)
    }

    /// Returns `true` if the identity service may be called with a token carrying these scopes.
    pub fn has_identity_scope(&self) -> bool {
        self.has_scope(ID)
    }

    /// The held scopes in alphabetical order.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    /// Number of distinct scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns `true` if no scope is held.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Alphabetically sorted, space-joined scopes. Empty string for an empty set.
    pub fn scopes_as_string(&self) -> String {
        self.scopes().collect::<Vec<_>>().join(" ")
    }

    /// Computes the `scope` parameter for an authorization request.
    ///
    /// Returns an empty string when no scope is requested. Otherwise `refresh_token` is added if
    /// missing and the result is sorted and space-joined.
    pub fn compute_scope_parameter<S: AsRef<str>>(scopes: &[S]) -> String {
        let mut parser = Self::from_scopes(scopes);
        if parser.is_empty() {
            return String::new();
        }
        parser.scopes.insert(REFRESH_TOKEN.to_owned());
        parser.scopes_as_string()
    }
}

impl fmt::Display for ScopeParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.scopes_as_string())
    }
}

impl From<&str> for ScopeParser {
    fn from(scopes: &str) -> Self {
        Self::parse(scopes)
    }
}
