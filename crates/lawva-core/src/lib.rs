//! Core library for Lawva.
//!
//! Contains the certification data model, the fetch error taxonomy, the
//! certification sources (an HTTP client and the trait it implements), the
//! per-page fetch lifecycle, and the pure projection from fetch state to a
//! renderable page. This crate knows nothing about HTML or terminals; the
//! server and CLI decide how a [`view::PageView`] is drawn.

pub mod error;
pub mod fetch;
pub mod modal;
pub mod model;
pub mod source;
pub mod view;
