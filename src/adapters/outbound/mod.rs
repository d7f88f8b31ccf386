//! Outbound adapters.

pub mod argon2;
pub mod clock;
pub mod jwt;
pub mod persistence;
