//! Configuration and report data models.

pub mod config;
pub mod report;
