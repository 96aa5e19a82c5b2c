//! Implementation of the `#[derive(Record)]` macro.
//!
//! Generates field name constants, the typed accessor and the static field
//! schema from `#[field(...)]` annotations.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
