//! Authentication
//!
//! - [`JwtService`] - session token verification
//! - [`CurrentUser`] - authenticated caller, extracted per request

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, SESSION_COOKIE};
