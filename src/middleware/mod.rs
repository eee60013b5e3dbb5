//! Cross-cutting request concerns.
//!
//! - [`cors`]: the permissive CORS policy of the articles endpoint
//! - `trace`: per-request span with method, path, status, latency (applied by
//!   the server to every route)

pub mod cors;

pub(crate) mod trace;
