//! Request middleware.
//!
//! Purpose: Define middleware components for request lifecycle concerns.
//! [`Trace`] wraps the whole application so every request, including ones
//! answered with a classified error body or the not-found fallback, runs
//! inside a `request` span and returns its `trace-id` header.

pub mod trace;

pub use trace::Trace;
