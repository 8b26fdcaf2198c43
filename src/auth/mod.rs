//! Bearer token acquisition for the booking platform.

pub mod error;
pub mod exchange;
pub mod provider;

pub use error::AuthError;
pub use exchange::{ClientCredentialsExchange, CredentialExchange, IssuedToken};
pub use provider::{TokenManager, TokenProvider};
