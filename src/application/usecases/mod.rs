//! Application services implementing business logic.

pub mod user;

pub use user::*;
