//! # serenity-core
//!
//! Core types, traits, and abstractions for the serenity recovery companion.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other serenity crates depend on: the domain records kept in sync
//! between the local durable store and the remote store, the sync-queue
//! operation model, and the seams (`LocalStore`, `RemoteStore`,
//! `PayloadCipher`) that make backends pluggable and the services testable.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
