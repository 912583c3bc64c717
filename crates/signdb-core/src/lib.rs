//! signdb-core
//!
//! Domain types, index traits, typed errors, configuration and description
//! variant splitting shared by every other `signdb-*` crate.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod variants;

pub use error::{Error, Result};
