//! Core types and trait definitions for the staff directory.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! holds the contact record shapes, the validation/normalization pipeline,
//! the in-memory list view, and the gateway that mediates between validated
//! records and the document/blob store collaborators.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actor;
pub mod contact;
pub mod error;
pub mod gateway;
pub mod listing;
pub mod org;
pub mod store;
pub mod validate;

pub use error::{Error, Result, ValidationError};

#[cfg(test)]
mod testing;
