//! # Core Module
//!
//! The job-definition protocol, free of any engine: typed tool parameters,
//! input staging, command assembly, output declaration and reconciliation,
//! plus the plain data types ([`job::JobDescription`], [`artifact::Artifact`])
//! that cross into the engine layer.

pub mod artifact;
pub mod command;
pub mod includes;
pub mod job;
pub mod labels;
pub mod outputs;
pub mod params;
pub mod staging;
