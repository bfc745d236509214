pub mod config;
pub mod general;
pub mod jobs;
pub mod tool;
