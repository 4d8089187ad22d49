// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route classification: which endpoints are reachable anonymously.
//!
//! | Pattern | Classification |
//! |---------|----------------|
//! | `/register`, `/login` | public |
//! | `/health/**` | public |
//! | `/h2-console/**`, `/docs/**`, `/api-doc/**` | public with debug routes enabled |
//! | everything else | protected |
//!
//! Rules are checked in order and the first match wins. A path matching no
//! rule is protected.

use super::context::SecurityContext;
use super::error::AuthError;

pub const PUBLIC_ROUTES: &[&str] = &["/register", "/login", "/health/**"];
pub const DEBUG_ROUTES: &[&str] = &["/h2-console/**", "/docs/**", "/api-doc/**"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClassification {
    Public,
    Protected,
}

/// A path pattern: either an exact path or `prefix/**`, which matches the
/// prefix itself and everything beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    Subtree(String),
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => RoutePattern::Subtree(prefix.to_string()),
            None => RoutePattern::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            RoutePattern::Exact(exact) => path == exact,
            RoutePattern::Subtree(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

/// Immutable route table, built once at startup.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    rules: Vec<(RoutePattern, RouteClassification)>,
}

impl RoutePolicy {
    /// Default table. `debug_routes` opts the developer console and API docs
    /// into anonymous access.
    pub fn new(debug_routes: bool) -> Self {
        let debug = if debug_routes { DEBUG_ROUTES } else { &[] };
        Self::from_rules(
            PUBLIC_ROUTES
                .iter()
                .chain(debug.iter())
                .map(|p| (*p, RouteClassification::Public)),
        )
    }

    pub fn from_rules<'a, I>(rules: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, RouteClassification)>,
    {
        Self {
            rules: rules
                .into_iter()
                .map(|(pattern, class)| (RoutePattern::parse(pattern), class))
                .collect(),
        }
    }

    pub fn classify(&self, path: &str) -> RouteClassification {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, class)| *class)
            .unwrap_or(RouteClassification::Protected)
    }

    /// Decide whether a request for `path` under `ctx` may reach its handler.
    ///
    /// # Errors
    /// [`AuthError::Forbidden`] for a protected path with an anonymous context.
    pub fn check(&self, path: &str, ctx: &SecurityContext) -> Result<(), AuthError> {
        match self.classify(path) {
            RouteClassification::Public => Ok(()),
            RouteClassification::Protected if ctx.is_authenticated() => Ok(()),
            RouteClassification::Protected => Err(AuthError::Forbidden),
        }
    }
}
