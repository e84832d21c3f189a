//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the control surface into the application
//! - Outbound: Called by the application into OS capabilities

pub mod inbound;
pub mod outbound;

pub use inbound::ControlPort;
pub use outbound::{
    AutorunPort, BoundListener, ClipboardPort, EndpointPort, LogViewerPort, NotifierPort,
    PastePort,
};
