//! Core constants, configuration and error types.
//!
//! Always compiled, independent of the `crypto` feature.

mod config;
mod constants;
mod error;

pub use config::*;
pub use constants::*;
pub use error::*;
