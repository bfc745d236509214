//! # Engine Module
//!
//! The collaborators a job is handed to once it has been described: code
//! resolution, execution, and the provenance store that remembers every job
//! and the artifacts it consumed and produced.
//!
//! The [`traits`] are the seams. [`local`], [`code`] and [`store`] implement
//! them for a single machine, and tests substitute in-memory fakes.

pub mod code;
pub mod error;
pub mod local;
pub mod progress;
pub mod store;
pub mod traits;
