//! Test utilities and instrumented types for Tessel development.
//!
//! - [`TrackingAlloc`] / [`PropagatingAlloc`]: allocation policies that
//!   record every block, construction, and destruction in a shared
//!   [`Ledger`], optionally under a byte budget.
//! - [`Probe`]: hands out [`Probed`] elements that report their clones and
//!   drops, including the order of destruction.

#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod probe;
mod tracking;

pub use probe::{Probe, Probed};
pub use tracking::{Ledger, PropagatingAlloc, TrackingAlloc};
