// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pet Registry - user accounts and pet records behind bearer-token auth.
//!
//! Accounts log in with email and password and receive an HS256-signed
//! token. Every request passes through the authenticator and the route
//! policy; endpoints that act on one account additionally check that the
//! caller owns it.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - token codec, security context, middleware, route policy
//! - `config` - environment configuration
//! - `storage` - resource ownership guard
//! - `store` - in-memory user and pet store

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
