//! Authentication primitives.
//!
//! - [`jwt`] -- access-token generation and validation for app-issued tokens.

pub mod jwt;
