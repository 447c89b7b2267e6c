//! # invest-gateway
//!
//! HTTP gateway shell for the AI compute investment platform backend.
//!
//! The gateway owns the request pipeline — security headers, cross-origin
//! policy, rate limiting, body-size capping, routing, and failure
//! normalization — and delegates all business logic to domain handler
//! groups mounted per URL namespace (auth, user, transactions,
//! investments, webhook).
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── Policy middleware (middleware/): security headers,
//!     │   CORS, per-client rate limiting
//!     │
//!     ├── Router (api/): /api namespaces, /api/health, /api/info,
//!     │   static views, terminal not-found handlers
//!     │
//!     ├── Namespace dispatch (api/handlers/dispatch.rs)
//!     │       └── DomainHandler groups (domain/) — external collaborators
//!     │
//!     ├── ErrorNormalizer (error.rs) — one envelope per failure kind
//!     │
//!     └── PostgreSQL reachability probe (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod persistence;
