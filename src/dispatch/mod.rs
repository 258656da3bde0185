//! Action dispatch module.
//!
//! Contains the action descriptors, decoded trade requests, the dispatcher and
//! the response envelope.

pub mod action;
pub mod dispatcher;
pub mod envelope;
pub mod params;
pub mod trade;

pub use action::Action;
pub use dispatcher::{Collaborators, Dispatcher};
pub use envelope::{normalize, ResponseEnvelope};
