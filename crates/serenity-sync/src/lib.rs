//! # serenity-sync
//!
//! Offline-first synchronization for serenity recovery data.
//!
//! This crate provides:
//! - [`RecoveryService`]: the session facade with immediate writes
//!   regardless of connectivity, a durable FIFO queue of offline writes,
//!   and strictly sequential queue drain on reconnect
//! - [`ConnectivityWatch`]: the explicit, injectable online/offline signal
//! - Remote-store clients: [`HttpRemoteStore`] for the hosted backend and
//!   [`MemoryRemoteStore`] for tests and local development
//! - The two payload-cipher variants: [`LocalPayloadCipher`] (secret held
//!   in-process) and [`HttpPayloadCipher`] (secret held by the encryption
//!   API)
//! - [`CrisisPlanService`] and [`AuditService`]: encrypt-before-store
//!   access to the sensitive collections
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use serenity_sync::{ConnectivityWatch, MemoryRemoteStore, RecoveryService};
//!
//! let connectivity = ConnectivityWatch::online();
//! let service = Arc::new(RecoveryService::new(
//!     user_id,
//!     Arc::new(MemoryRemoteStore::new()),
//!     local_store,
//!     connectivity.clone(),
//! ));
//! service.clone().spawn_auto_sync();
//!
//! // Platform connectivity events feed the watch:
//! connectivity.set_online(false);
//! let record = service.save_crisis_resolution(input).await?; // queued
//! connectivity.set_online(true);                             // drains
//! ```

pub mod audit;
pub mod cipher;
pub mod connectivity;
pub mod crisis;
pub mod memory;
pub mod remote;
pub mod service;

// Re-export core types
pub use serenity_core::*;

pub use audit::AuditService;
pub use cipher::{HttpPayloadCipher, LocalPayloadCipher};
pub use connectivity::ConnectivityWatch;
pub use crisis::CrisisPlanService;
pub use memory::MemoryRemoteStore;
pub use remote::HttpRemoteStore;
pub use service::RecoveryService;
