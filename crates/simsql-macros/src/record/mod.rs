//! Implementation of the `#[derive(Record)]` macro.
//!
//! Turns struct fields into `simsql` columns and generates column name
//! constants.

mod attrs;
mod derive;

pub use derive::record_derive_impl;
