//! Lawva HTTP server.
//!
//! Serves the certification data endpoint at `/api/*` and server-rendered
//! result and original-document pages at `/main/certificate/*`. Pages are
//! drawn from the same view projection the CLI uses.

pub mod config;
pub mod error;
pub mod repository;
pub mod routes;
pub mod state;
