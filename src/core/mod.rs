//! Core domain models for the ETL engine
//!
//! This module defines pipeline definitions, the persisted run cursor,
//! the step contract and the configuration they are built from.

pub mod config;
pub mod context;
pub mod error;
pub mod form;
pub mod pipeline;
pub mod state;
pub mod step;

pub use context::*;
pub use error::*;
pub use form::*;
pub use pipeline::*;
pub use state::*;
pub use step::*;
