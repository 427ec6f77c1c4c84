//! AES-256-CBC cipher for the body of `ScsC` save containers.
//!
//! The container stores a per-file IV in its header; the key is the fixed
//! game key from [`crate::keys`]. Padding is standard PKCS#7.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use tracing::debug;

use crate::{CryptoError, Result};

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Decrypt an in-memory CBC buffer, stripping the PKCS#7 padding.
///
/// `data` must hold whole cipher blocks; anything else (or padding that
/// does not verify after decryption) fails with
/// [`CryptoError::InvalidPadding`].
pub fn decrypt_cbc(data: &[u8], key: &[u8; 32], iv: &[u8; 16]) -> Result<Vec<u8>> {
    let plaintext = Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(data)
        .map_err(|_| CryptoError::InvalidPadding)?;

    debug!(
        ciphertext_len = data.len(),
        plaintext_len = plaintext.len(),
        "decrypted CBC buffer"
    );

    Ok(plaintext)
}

/// Encrypt an in-memory buffer with AES-256-CBC and PKCS#7 padding.
///
/// The decoder never re-encrypts saves; this exists so tests and fixture
/// tooling can build valid `ScsC` bodies with [`decrypt_cbc`]'s exact
/// inverse.
pub fn encrypt_cbc(data: &[u8], key: &[u8; 32], iv: &[u8; 16]) -> Vec<u8> {
    Aes256CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(data)
}
