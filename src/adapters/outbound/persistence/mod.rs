//! Storage collaborators implementing [`UserRepository`].
//!
//! [`UserRepository`]: crate::application::ports::outbound::UserRepository

pub mod memory;
pub mod postgres;

pub use memory::MemoryUserRepository;
pub use postgres::PgUserRepository;
