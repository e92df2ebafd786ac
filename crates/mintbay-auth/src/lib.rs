//! Authentication primitives: Argon2id password hashing, JWT access tokens,
//! and opaque DB-backed refresh tokens.
//!
//! This crate is transport- and storage-agnostic. Session persistence lives
//! in `mintbay-db`; cookie and header plumbing lives in `mintbay-server`.

pub mod password;
pub mod refresh;
pub mod token;

pub use password::{hash_password, verify_password, verify_password_timing_safe};
pub use refresh::{RefreshToken, hash_refresh_secret, refresh_secret_matches};
pub use token::{AccessClaims, TokenConfig};
