//! Error types for SII parsing and decoding

use thiserror::Error;

/// Result type for SII operations
pub type Result<T> = std::result::Result<T, Error>;

/// SII error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Read past the end of the input buffer
    #[error("Truncated input: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Signature is neither a known container format nor the expected magic
    #[error("Unrecognized file signature: {0:#010x}")]
    UnknownSignature(u32),

    /// BSII format version outside the supported range
    #[error("Unsupported BSII version: {0} (supported: 1-3)")]
    UnsupportedVersion(u32),

    /// 3nK-packed payloads are recognized but not implemented
    #[error("3nK-packed SII payloads are not supported")]
    Unsupported3nK,

    /// A field survived decoding with a type tag the serializer has no rule for
    #[error("Cannot serialize field `{field}`: unknown type tag {tag:#04x}")]
    UnknownSerializationTag { field: String, tag: u32 },

    /// Decryption error from sii-crypto
    #[error("Decryption error: {0}")]
    Crypto(#[from] sii_crypto::CryptoError),

    /// zlib stream failed to inflate
    #[error("Inflate failed: {0}")]
    Inflate(#[source] std::io::Error),

    /// Text buffer write failed
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}
