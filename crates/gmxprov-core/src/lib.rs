//! # gmxprov Core Library
//!
//! Runs GROMACS tools (`pdb2gmx`, `grompp`, `mdrun`, `editconf`) and arbitrary
//! shell commands as provenance-tracked jobs: every input and output file is
//! stored as a content-addressed artifact and linked to the job that used or
//! produced it.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the job-definition protocol apart from the machinery
//! that executes jobs, in three layers:
//!
//! - **[`core`]: The Protocol.** Typed tool parameters validated against
//!   per-tool flag tables, input staging, command-line assembly, output
//!   declaration and reconciliation. Pure data and functions over it.
//!
//! - **[`engine`]: The Collaborators.** The seams a job is handed across
//!   (code resolution, execution, job history) as traits, with local
//!   implementations backed by a file store.
//!
//! - **[`workflows`]: The Public API.** Prepares a tool or shell job,
//!   chains outputs of earlier jobs into its inputs and launches it.

pub mod core;
pub mod engine;
pub mod workflows;
