//! AES Key Wrap with padding (RFC 5649, KWP).
//! This is the current standard for AES key wrapping according to the NIST SP 800-38F.
//!
//! Spec references:
//! - RFC 5649: <https://datatracker.ietf.org/doc/html/rfc5649>
//! - NIST SP 800-38F: <https://csrc.nist.gov/pubs/sp/800/38/f/final>
//!
//! This RFC is an improvement of RFC 3394 and allows to wrap keys of any size.
//! The default IV is replaced by an Alternative IV (AIV) made of the 32-bit
//! constant `A65959A6` followed by the Message Length Indicator (MLI), the
//! big-endian byte length of the unpadded key. The key is zero-padded to a
//! multiple of 8 bytes; a single padded semiblock is encrypted in one AES
//! block operation, anything longer goes through the RFC 3394 rounds.

use tracing::trace;
use zeroize::Zeroizing;

use super::{
    block_cipher::{AesCipher, BlockCipher, check_kek_size},
    semiblocks::{SEMIBLOCK_SIZE, join, load, split, store, unwrap_rounds, wrap_rounds},
};
use crate::{
    crypto_ensure,
    error::{
        CryptoError,
        result::{CryptoResult, CryptoResultHelper},
    },
};

pub const AIV_PREFIX: u32 = 0xA659_59A6;

/// RFC 5649 requires plaintext to be at least 1 byte and less than 2^32 bytes.
/// Returns the Message Length Indicator.
fn message_length_indicator(n_bytes: usize) -> CryptoResult<u32> {
    crypto_ensure!(
        n_bytes > 0,
        CryptoError::InvalidPlaintextLength(
            "The plaintext size should be at least 1 byte".to_owned()
        )
    );
    u32::try_from(n_bytes).map_err(|_| {
        CryptoError::InvalidPlaintextLength(format!(
            "The plaintext size should be less than 2^32 bytes, got {n_bytes}"
        ))
    })
}

// At least 2 semi-blocks (so 1 AES block) and complete semi-blocks
fn check_ciphertext_size(n_bytes: usize) -> CryptoResult<()> {
    crypto_ensure!(
        n_bytes % SEMIBLOCK_SIZE == 0 && n_bytes >= 2 * SEMIBLOCK_SIZE,
        CryptoError::InvalidWrappedLength(format!(
            "The ciphertext size should be >= 16 and a multiple of 8, got {n_bytes}"
        ))
    );
    Ok(())
}

fn alternative_iv(mli: u32) -> u64 {
    (u64::from(AIV_PREFIX) << 32) | u64::from(mli)
}

/// Wrap a key of any length (1 to 2^32 - 1 bytes) with RFC 5649.
pub fn rfc5649_wrap(plaintext: &[u8], kek: &[u8]) -> CryptoResult<Vec<u8>> {
    message_length_indicator(plaintext.len())?;
    check_kek_size(kek)?;
    let mut cipher = AesCipher::new(kek)?;
    rfc5649_wrap_with(&mut cipher, plaintext)
}

/// Wrap a key of any length with RFC 5649 over any 128-bit block cipher.
pub fn rfc5649_wrap_with<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    plaintext: &[u8],
) -> CryptoResult<Vec<u8>> {
    let mli = message_length_indicator(plaintext.len())?;
    let aiv = alternative_iv(mli);
    trace!("RFC 5649 wrap of {mli} bytes");

    // zero-pad the trailing semiblock
    let mut registers = Zeroizing::new(Vec::with_capacity(plaintext.len().div_ceil(SEMIBLOCK_SIZE)));
    for chunk in plaintext.chunks(SEMIBLOCK_SIZE) {
        let mut semiblock = Zeroizing::new([0_u8; SEMIBLOCK_SIZE]);
        semiblock[..chunk.len()].copy_from_slice(chunk);
        registers.push(u64::from_be_bytes(*semiblock));
    }

    if let [single] = registers.as_slice() {
        // Special case: single block encryption of AIV | P
        let (msb, lsb) = split(cipher.encrypt_block(&join(aiv, *single))?);
        return Ok(store(msb, &[lsb]));
    }

    let a = wrap_rounds(cipher, aiv, &mut registers)?;
    Ok(store(a, &registers))
}

/// Unwrap an RFC 5649 ciphertext.
pub fn rfc5649_unwrap(ciphertext: &[u8], kek: &[u8]) -> CryptoResult<Zeroizing<Vec<u8>>> {
    check_ciphertext_size(ciphertext.len())?;
    check_kek_size(kek)?;
    let mut cipher = AesCipher::new(kek)?;
    rfc5649_unwrap_with(&mut cipher, ciphertext)
}

/// Unwrap an RFC 5649 ciphertext over any 128-bit block cipher.
pub fn rfc5649_unwrap_with<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    ciphertext: &[u8],
) -> CryptoResult<Zeroizing<Vec<u8>>> {
    check_ciphertext_size(ciphertext.len())?;
    trace!("RFC 5649 unwrap of {} bytes", ciphertext.len());

    let mut blocks = load(ciphertext)?;
    let (c0, registers) = blocks
        .split_first_mut()
        .context("The ciphertext has no leading semiblock")?;

    let aiv = if let [single] = &mut *registers {
        // Special case: one AES block holds AIV | P
        let (msb, lsb) = split(cipher.decrypt_block(&join(*c0, *single))?);
        *single = lsb;
        msb
    } else {
        unwrap_rounds(cipher, *c0, registers)?
    };

    let mut padded = Zeroizing::new(Vec::with_capacity(registers.len() * SEMIBLOCK_SIZE));
    for block in registers.iter() {
        padded.extend_from_slice(&block.to_be_bytes());
    }

    let mli = check_alternative_iv(aiv, &padded)?;
    padded.truncate(mli);
    Ok(padded)
}

/// Validate the recovered AIV against the padded plaintext and return the
/// MLI. The padded plaintext is never handed out on failure.
#[allow(clippy::cast_possible_truncation)]
fn check_alternative_iv(aiv: u64, padded: &[u8]) -> CryptoResult<usize> {
    let prefix = (aiv >> 32) as u32;
    let mli = usize::try_from(aiv as u32)?;

    let prefix_ok = prefix == AIV_PREFIX;
    let length_ok = mli >= 1 && mli <= padded.len() && padded.len() - mli < SEMIBLOCK_SIZE;
    let padding_ok = length_ok
        && padded
            .get(mli..)
            .is_some_and(|padding| padding.iter().fold(0_u8, |acc, b| acc | b) == 0);

    crypto_ensure!(
        prefix_ok && length_ok && padding_ok,
        CryptoError::IntegrityCheckFailed(
            "The ciphertext is invalid. Unwrapped AIV does not match RFC 5649".to_owned()
        )
    );
    Ok(mli)
}
