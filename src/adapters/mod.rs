//! Infrastructure adapters. Implement ports.
//!
//! HTTP endpoint, desktop capabilities, logging, terminal UI. Map errors to DomainError.

pub mod desktop;
pub mod http;
pub mod logging;
pub mod memory;
pub mod ui;
