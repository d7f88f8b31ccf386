//! Implementations of the identity core ports.

pub mod inbound;
pub mod outbound;
