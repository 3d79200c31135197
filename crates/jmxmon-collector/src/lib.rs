//! Sampling core of the jmxmon agent.
//!
//! A [`sampler::TargetSampler`] opens one [`transport::Connection`] per
//! target and pass, reads garbage collector counters, CPU time and the
//! configured attributes, and converts cumulative counters into rates with
//! [`rate::RateCalculator`]. The readings a rate needs next time live in the
//! target's [`state::RateState`].

pub mod attributes;
pub mod cpu;
pub mod error;
pub mod gc;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod rate;
pub mod sampler;
pub mod state;
pub mod transport;

pub use sampler::TargetSampler;
pub use state::RateState;
pub use transport::{Connection, Transport};

#[cfg(test)]
mod tests;
