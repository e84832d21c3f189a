//! Application use cases. Orchestrate domain logic via ports.

pub mod dispatch_service;
pub mod listener_controller;
pub mod relay_app;

pub use dispatch_service::{CODE_NOT_FOUND, DispatchService};
pub use listener_controller::ListenerController;
pub use relay_app::{RelayApp, SERVICE_TITLE};
