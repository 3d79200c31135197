//! Shared data model for the jmxmon agent.
//!
//! Targets and attribute specifications come from configuration, the
//! collector turns remote readings into [`types::Observation`]s and
//! [`types::GcGroup`]s, and the output writers consume one
//! [`types::PassReport`] per polling period.

pub mod error;
pub mod remote;
pub mod spec;
pub mod types;
