//! Authentication primitives.
//!
//! This module provides password hashing and verification with Argon2id.
//! Session tokens live in `vantage-shared`; opaque bridge tokens live in the
//! database layer.

mod password;

pub use password::{PasswordError, hash_password, verify_password};
