//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod chain;
pub mod market;

pub use chain::*;
pub use market::*;
