//! Backend abstraction and implementations for FocusForge.
//!
//! The hosted data service owns every record; this crate provides a
//! trait-based interface to it plus in-memory and JSON-file stand-ins for
//! tests and offline use.

#![warn(missing_docs)]

pub mod trait_;
pub mod memory;
#[cfg(feature = "json")]
pub mod json_storage;
#[cfg(feature = "rest")]
pub mod rest;

pub use trait_::{Backend, BackendError, Result};
pub use memory::MemoryBackend;
#[cfg(feature = "json")]
pub use json_storage::JsonBackend;
#[cfg(feature = "rest")]
pub use rest::{RestBackend, RestConfig};
