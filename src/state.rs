// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{RoutePolicy, TokenCodec};
use crate::config::{AppConfig, ConfigError};
use crate::store::InMemoryStore;

/// Shared application state.
///
/// `tokens` and `policy` are immutable after startup and read without
/// locking. Per-request identity is not stored here; it lives in each
/// request's extensions.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<InMemoryStore>>,
    pub tokens: Arc<TokenCodec>,
    pub policy: Arc<RoutePolicy>,
    /// Whether `/h2-console` and `/docs` are mounted.
    pub debug_routes: bool,
}

impl AppState {
    pub fn new(store: InMemoryStore, tokens: TokenCodec, policy: RoutePolicy, debug_routes: bool) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            tokens: Arc::new(tokens),
            policy: Arc::new(policy),
            debug_routes,
        }
    }

    /// Build state with an empty store from startup configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            InMemoryStore::new(),
            TokenCodec::new(&config.token)?,
            RoutePolicy::new(config.debug_routes),
            config.debug_routes,
        ))
    }
}

#[cfg(test)]
impl AppState {
    /// Empty store, fixed test secret, one-hour tokens, debug routes off.
    pub fn for_tests() -> Self {
        use crate::config::TokenConfig;
        use std::time::Duration;

        let tokens = TokenCodec::new(&TokenConfig::new("test-secret", Duration::from_secs(3600)))
            .unwrap_or_else(|e| panic!("test token config rejected: {e}"));
        Self::new(InMemoryStore::new(), tokens, RoutePolicy::new(false), false)
    }
}
