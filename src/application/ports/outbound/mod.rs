//! These traits define what the application needs from the outside world.

pub mod clock;
pub mod crypto;
pub mod repository;
pub mod token;

pub use clock::*;
pub use crypto::*;
pub use repository::{RepositoryError, UserRepository};
pub use token::*;
