//! HTTP ingestion endpoint (axum).

pub mod routes;
pub mod server;

pub use routes::{SUCCESS_BODY, build_router};
pub use server::AxumEndpoint;
