//! # Workflows Module
//!
//! End-to-end job launching. [`calculation`] and [`general`] turn user input
//! into a [`calculation::PreparedJob`]; [`launch`] resolves the code, reuses
//! outputs of earlier jobs through [`chaining`], and hands the finished job
//! description to an engine.

pub mod calculation;
pub mod chaining;
pub mod general;
pub mod launch;
