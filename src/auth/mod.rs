//! Bearer token authentication for the REST API.

mod middleware;
mod token;

pub use middleware::{AuthState, auth_guard};
pub use token::{DEFAULT_TOKEN_DURATION, create_token, decode_token};
