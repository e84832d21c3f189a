//! sms-relay: phone SMS mirror -> verification code -> clipboard + paste, with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
