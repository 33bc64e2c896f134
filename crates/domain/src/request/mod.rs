//! Outgoing API request types

mod api_request;
mod method;

pub use api_request::{AUTHORIZATION, ApiRequest, Header};
pub use method::HttpMethod;
