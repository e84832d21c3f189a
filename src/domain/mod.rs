//! Core domain layer. No external I/O dependencies.
//!
//! Entities and the extraction rule live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod extraction;

pub use entities::{
    ControlCommand, ControlView, ExtractedCode, IncomingMessage, ListenerStatus, Route,
    StartOutcome, StopOutcome,
};
pub use errors::{CollaboratorFailure, DispatchError, DomainError};
pub use extraction::{CodeExtractor, DEFAULT_MARKER, extract_code};
