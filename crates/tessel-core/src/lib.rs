//! Core types and traits for the Tessel buffer workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces every buffer type is generic over or reports through:
//!
//! - [`AllocPolicy`]: the injectable allocation strategy (allocate,
//!   deallocate, construct, destroy, select-on-copy, propagate-on-swap),
//!   with [`Global`] as the default.
//! - [`AllocError`]: allocation failures propagated to callers.
//! - [`contract`]: precondition/postcondition assertions for programming
//!   errors, active in debug builds or with the `contracts` feature.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod alloc;
pub mod contract;
pub mod error;

pub use alloc::{AllocPolicy, Global};
pub use error::AllocError;
