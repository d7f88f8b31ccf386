//! Transport-agnostic identity usecase.

pub mod dto;
pub mod error;
pub mod ports;
pub mod usecases;
