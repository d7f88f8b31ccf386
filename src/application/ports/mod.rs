//! Boundaries of the identity core.

pub mod inbound;
pub mod outbound;
