// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Auth Gate - HTTP Basic Authentication Layer
//!
//! Decides per request whether credentials are required, decodes
//! `Authorization: Basic` headers and resolves them against an embedded
//! redb user store.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Exemptions, Basic decoding, authenticators and middleware
//! - `config` - Environment configuration
//! - `server` - Startup, graceful shutdown and seeding
//! - `storage` - Credential stores (redb and in-memory)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod server;
pub mod state;
pub mod storage;
