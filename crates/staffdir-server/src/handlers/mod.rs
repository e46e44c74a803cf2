//! Route handlers, one module per resource.
//!
//! Every handler is generic over the store and blob backends and receives the
//! acting user through the [`crate::auth::Authenticated`] extractor.

pub mod contacts;
pub mod import;
pub mod org;
