//! Outer container handling for SII save files.
//!
//! A save on disk is one of: plain SiiNunit text, a BSII binary stream, or
//! an `ScsC` envelope (AES-256-CBC over a zlib stream) around either of
//! those. This module detects the outer form, unwraps the envelope when
//! present, and dispatches the inner payload.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::ZlibDecoder;
use tracing::{debug, warn};

use sii_crypto::{aes_cbc::decrypt_cbc, keys::SII_AES_KEY};

use crate::decoder::{BsiiDocument, BsiiHeader};
use crate::serializer;
use crate::{Error, Result};

pub(crate) const SIGNATURE_PLAIN: u32 = u32::from_le_bytes(*b"SiiN");
pub(crate) const SIGNATURE_ENCRYPTED: u32 = u32::from_le_bytes(*b"ScsC");
pub(crate) const SIGNATURE_BINARY: u32 = u32::from_le_bytes(*b"BSII");
pub(crate) const SIGNATURE_3NK: u32 = u32::from_le_bytes(*b"3nK\x01");

/// ScsC envelope layout: signature, 32-byte HMAC (unchecked), 16-byte AES
/// IV, declared plaintext size, then ciphertext.
const ENCRYPTED_IV_OFFSET: usize = 36;
const ENCRYPTED_SIZE_OFFSET: usize = 52;
const ENCRYPTED_BODY_OFFSET: usize = 56;

/// The 4-byte signature leading every save container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// `SiiN` — plain SiiNunit text.
    PlainText,
    /// `ScsC` — AES-encrypted, zlib-compressed envelope.
    Encrypted,
    /// `BSII` — binary structured stream.
    Binary,
    /// `3nK\x01` — legacy scrambled format, recognized but not decoded.
    ThreeNK,
    /// Anything else, with the unmatched value kept for diagnostics.
    Unknown(u32),
}

impl Signature {
    /// Classify a little-endian signature value.
    pub fn from_u32(value: u32) -> Self {
        match value {
            SIGNATURE_PLAIN => Self::PlainText,
            SIGNATURE_ENCRYPTED => Self::Encrypted,
            SIGNATURE_BINARY => Self::Binary,
            SIGNATURE_3NK => Self::ThreeNK,
            other => Self::Unknown(other),
        }
    }
}

/// A processed save file.
///
/// `data` is SiiNunit text (as UTF-8 bytes) after a full [`SiiFile::parse`],
/// or the raw unwrapped inner payload after [`SiiFile::decrypt`].
#[derive(Debug, Clone)]
pub struct SiiFile {
    /// Signature of the inner payload (after envelope removal).
    pub signature: Signature,
    /// Whether an `ScsC` envelope was unwrapped.
    pub encrypted: bool,
    /// Resulting bytes; see the struct docs for what they hold.
    pub data: Vec<u8>,
    /// BSII stream header, present only when a binary payload was decoded.
    pub header: Option<BsiiHeader>,
}

impl SiiFile {
    /// Fully process a save: unwrap any envelope, then decode the payload
    /// to SiiNunit text.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::process(bytes, true)
    }

    /// Unwrap the envelope only; the returned `data` is the inner payload
    /// verbatim, with its signature sniffed but not decoded.
    pub fn decrypt(bytes: &[u8]) -> Result<Self> {
        Self::process(bytes, false)
    }

    /// Read a file from disk and [`parse`](Self::parse) it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::parse(&fs::read(path)?)
    }

    fn process(bytes: &[u8], decode: bool) -> Result<Self> {
        let outer = read_signature(bytes)?;
        debug!(signature = ?outer, len = bytes.len(), "processing save container");

        let (inner, encrypted): (Cow<'_, [u8]>, bool) = if outer == Signature::Encrypted {
            (Cow::Owned(unwrap_encrypted(bytes)?), true)
        } else {
            (Cow::Borrowed(bytes), false)
        };

        let signature = read_signature(&inner)?;

        if !decode {
            return Ok(Self {
                signature,
                encrypted,
                data: inner.into_owned(),
                header: None,
            });
        }

        match signature {
            Signature::PlainText => Ok(Self {
                signature,
                encrypted,
                data: inner.into_owned(),
                header: None,
            }),
            Signature::Binary => {
                let doc = BsiiDocument::parse(&inner)?;
                let text = serializer::serialize(&doc)?;
                Ok(Self {
                    signature,
                    encrypted,
                    data: text.into_bytes(),
                    header: Some(doc.header),
                })
            }
            Signature::ThreeNK => Err(Error::Unsupported3nK),
            // An ScsC envelope inside an ScsC envelope does not occur in
            // real saves and is not unwrapped recursively.
            Signature::Encrypted => Err(Error::UnknownSignature(SIGNATURE_ENCRYPTED)),
            Signature::Unknown(value) => Err(Error::UnknownSignature(value)),
        }
    }
}

fn read_signature(bytes: &[u8]) -> Result<Signature> {
    if bytes.len() < 4 {
        return Err(Error::Truncated {
            offset: 0,
            needed: 4,
            available: bytes.len(),
        });
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    Ok(Signature::from_u32(u32::from_le_bytes(raw)))
}

/// Decrypt and inflate an `ScsC` envelope, returning the inner payload.
fn unwrap_encrypted(bytes: &[u8]) -> Result<Vec<u8>> {
    if bytes.len() < ENCRYPTED_BODY_OFFSET {
        return Err(Error::Truncated {
            offset: 0,
            needed: ENCRYPTED_BODY_OFFSET,
            available: bytes.len(),
        });
    }

    let mut iv = [0u8; 16];
    iv.copy_from_slice(&bytes[ENCRYPTED_IV_OFFSET..ENCRYPTED_SIZE_OFFSET]);

    let mut declared = [0u8; 4];
    declared.copy_from_slice(&bytes[ENCRYPTED_SIZE_OFFSET..ENCRYPTED_BODY_OFFSET]);
    let declared = u32::from_le_bytes(declared) as usize;

    debug!(
        declared,
        ciphertext_len = bytes.len() - ENCRYPTED_BODY_OFFSET,
        "unwrapping ScsC envelope"
    );

    let plaintext = decrypt_cbc(&bytes[ENCRYPTED_BODY_OFFSET..], &SII_AES_KEY, &iv)?;

    let mut inflated = Vec::with_capacity(declared);
    ZlibDecoder::new(plaintext.as_slice())
        .read_to_end(&mut inflated)
        .map_err(Error::Inflate)?;

    if inflated.len() != declared {
        warn!(
            declared,
            actual = inflated.len(),
            "inflated payload size differs from envelope's declared size"
        );
    }

    Ok(inflated)
}
