//! Encryption support for SCS save files.
//!
//! This crate provides:
//! - AES-256-CBC decryption for `ScsC` save containers
//! - The hardcoded game key shared by every encrypted save
//!
//! It deliberately knows nothing about the SII payload; unwrapping the
//! container and decoding what is inside belongs to `sii-parser`.

pub mod aes_cbc;
pub mod error;
pub mod keys;

pub use error::CryptoError;

/// Result type for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;
