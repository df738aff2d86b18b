//! AES Key Wrap (RFC 3394) without padding (KW)
//!
//! Spec references:
//! - RFC 3394: <https://datatracker.ietf.org/doc/html/rfc3394>
//! - NIST SP 800-38F: <https://csrc.nist.gov/pubs/sp/800/38/f/final>
//!
//! Notes:
//! - Input must be a multiple of 8 bytes and at least 16 bytes (n >= 2 blocks).
//! - The IV (A) defaults to 0xA6A6A6A6A6A6A6A6; an alternative 8-byte IV may be given.
//! - No padding is performed; for non-8-byte input lengths, use RFC 5649 (KWP).

use openssl::memcmp;
use tracing::trace;
use zeroize::Zeroizing;

use super::{
    block_cipher::{AesCipher, BlockCipher, check_kek_size},
    semiblocks::{SEMIBLOCK_SIZE, load, store, unwrap_rounds, wrap_rounds},
};
use crate::{
    crypto_ensure,
    error::{CryptoError, result::CryptoResult},
};

pub const DEFAULT_IV: [u8; SEMIBLOCK_SIZE] = [0xA6; SEMIBLOCK_SIZE];

fn check_plaintext_size(n_bytes: usize) -> CryptoResult<()> {
    crypto_ensure!(
        n_bytes % SEMIBLOCK_SIZE == 0 && n_bytes >= 2 * SEMIBLOCK_SIZE,
        CryptoError::InvalidPlaintextLength(format!(
            "The plaintext size should be >= 16 and a multiple of 8, got {n_bytes}"
        ))
    );
    Ok(())
}

// 24 bytes minimum: 16 for the key + 8 for the IV
fn check_ciphertext_size(n_bytes: usize) -> CryptoResult<()> {
    crypto_ensure!(
        n_bytes % SEMIBLOCK_SIZE == 0 && n_bytes >= 3 * SEMIBLOCK_SIZE,
        CryptoError::InvalidWrappedLength(format!(
            "The ciphertext size should be >= 24 and a multiple of 8, got {n_bytes}"
        ))
    );
    Ok(())
}

/// Wrap a plaintext key using AES Key Wrap (RFC 3394).
///
/// `iv` replaces the default integrity check value when given.
pub fn rfc3394_wrap(
    plaintext: &[u8],
    kek: &[u8],
    iv: Option<&[u8; SEMIBLOCK_SIZE]>,
) -> CryptoResult<Vec<u8>> {
    check_plaintext_size(plaintext.len())?;
    check_kek_size(kek)?;
    let mut cipher = AesCipher::new(kek)?;
    rfc3394_wrap_with(&mut cipher, plaintext, iv)
}

/// Wrap a plaintext key with RFC 3394 over any 128-bit block cipher.
pub fn rfc3394_wrap_with<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    plaintext: &[u8],
    iv: Option<&[u8; SEMIBLOCK_SIZE]>,
) -> CryptoResult<Vec<u8>> {
    check_plaintext_size(plaintext.len())?;
    trace!("RFC 3394 wrap of {} bytes", plaintext.len());

    let mut registers = load(plaintext)?;
    let a = wrap_rounds(
        cipher,
        u64::from_be_bytes(*iv.unwrap_or(&DEFAULT_IV)),
        &mut registers,
    )?;
    Ok(store(a, &registers))
}

/// Unwrap a ciphertext produced by AES Key Wrap (RFC 3394).
///
/// `iv` is the integrity check value expected after unwrapping,
/// the default one when `None`.
pub fn rfc3394_unwrap(
    ciphertext: &[u8],
    kek: &[u8],
    iv: Option<&[u8; SEMIBLOCK_SIZE]>,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    check_ciphertext_size(ciphertext.len())?;
    check_kek_size(kek)?;
    let mut cipher = AesCipher::new(kek)?;
    rfc3394_unwrap_with(&mut cipher, ciphertext, iv)
}

/// Unwrap an RFC 3394 ciphertext over any 128-bit block cipher.
pub fn rfc3394_unwrap_with<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    ciphertext: &[u8],
    iv: Option<&[u8; SEMIBLOCK_SIZE]>,
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    check_ciphertext_size(ciphertext.len())?;
    trace!("RFC 3394 unwrap of {} bytes", ciphertext.len());

    let mut blocks = load(ciphertext)?;
    let Some((c0, registers)) = blocks.split_first_mut() else {
        return Err(CryptoError::InvalidWrappedLength(
            "The ciphertext is empty".to_owned(),
        ));
    };
    let a = unwrap_rounds(cipher, *c0, registers)?;

    // constant-time comparison: the recovered A must be the expected IV
    let expected = iv.unwrap_or(&DEFAULT_IV);
    if !memcmp::eq(&a.to_be_bytes(), expected) {
        // `blocks` is zeroized on drop
        return Err(CryptoError::IntegrityCheckFailed(
            "The ciphertext is invalid. Unwrapped IV does not match RFC 3394".to_owned(),
        ));
    }

    let mut unwrapped = Zeroizing::new(Vec::with_capacity(registers.len() * SEMIBLOCK_SIZE));
    for block in registers.iter() {
        unwrapped.extend_from_slice(&block.to_be_bytes());
    }
    Ok(unwrapped)
}
