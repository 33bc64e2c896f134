//! Life OS Application - Ports and the authenticated request gateway
//!
//! This crate holds the parts of the client that coordinate I/O without
//! performing it: the ports adapters implement, the single-flight token
//! refresh, the gateway every API call goes through, and the session
//! service built on top of it.

pub mod auth;
pub mod error;
pub mod ports;

pub use auth::{
    AuthGateway, Flight, FlightGuard, MemoryCredentialStore, RefreshCoordinator, RefreshOutcome,
    SessionEvents, SessionService, Waiter,
};
pub use error::{GatewayError, GatewayResult, RefreshError};
