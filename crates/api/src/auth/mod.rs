//! Bearer-token authentication.
//!
//! - [`jwt`] -- HS256 access-token issuing and validation.

pub mod jwt;
