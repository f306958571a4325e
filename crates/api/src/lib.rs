//! HTTP surface for the micro-wins service.
//!
//! The binary in `main.rs` wires configuration, the task store and the
//! language-model client into [`state::AppState`] and serves
//! [`router::build_app_router`]. Integration tests build the same router
//! against the in-memory store.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
