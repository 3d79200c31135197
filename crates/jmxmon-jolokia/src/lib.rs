//! Jolokia transport for the jmxmon sampler.
//!
//! Each target runs a Jolokia agent; requests are JSON documents POSTed to
//! `http(s)://{address}{path}`. See [`JolokiaTransport`].

pub mod client;
pub mod error;
pub mod protocol;

pub use client::{JolokiaConfig, JolokiaTransport};
