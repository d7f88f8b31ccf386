//! Transport adapters driving the [`UserUsecase`].
//!
//! Each one decodes its wire request, calls exactly one usecase method and
//! encodes the result or error.
//!
//! [`UserUsecase`]: crate::application::ports::inbound::UserUsecase

pub mod graph;
pub mod http;
pub mod rpc;
