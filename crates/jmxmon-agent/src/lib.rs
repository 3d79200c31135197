//! The jmxmon agent: configuration, target list and the poll loop.

pub mod config;
pub mod scheduler;
pub mod targets;
