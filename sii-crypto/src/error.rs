//! Error types for sii-crypto operations.

use thiserror::Error;

/// Errors that can occur during crypto operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Decryption produced invalid PKCS#7 padding. The save key is fixed,
    /// so this almost always means a corrupted or truncated container.
    #[error("decryption failed: invalid block padding (corrupted file?)")]
    InvalidPadding,
}
