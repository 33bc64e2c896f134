//! Authentication module for the Life OS client.
//!
//! This module provides:
//! - Single-flight coordination of token refreshes
//! - The authenticated request gateway
//! - Session events and the login/logout session service
//! - An in-memory credential store

mod events;
mod gateway;
mod refresh;
mod session;
#[cfg(test)]
mod test_support;
mod token_store;

pub use events::SessionEvents;
pub use gateway::AuthGateway;
pub use refresh::{Flight, FlightGuard, RefreshCoordinator, RefreshOutcome, Waiter};
pub use session::SessionService;
pub use token_store::MemoryCredentialStore;
