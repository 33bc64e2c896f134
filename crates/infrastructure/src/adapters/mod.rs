//! Port adapters

mod reqwest_client;
mod session_terminator;

pub use reqwest_client::ReqwestHttpClient;
pub use session_terminator::RedirectSessionTerminator;
