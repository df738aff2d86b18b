//! The RFC 3394 round function, shared by KW and KWP.
//!
//! Semiblocks are handled as big-endian `u64` values: `A` is the integrity
//! check register, `R[1..n]` the key data registers.

use zeroize::Zeroizing;

use super::block_cipher::{AES_BLOCK_SIZE, BlockCipher};
use crate::error::result::CryptoResult;

pub const SEMIBLOCK_SIZE: usize = 0x8; // 64-bit
const ROUNDS: usize = 6;

/// `A || R` as one cipher block.
pub(crate) fn join(a: u64, r: u64) -> [u8; AES_BLOCK_SIZE] {
    ((u128::from(a) << 64) | u128::from(r)).to_be_bytes()
}

/// `(MSB(64, B), LSB(64, B))`
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn split(block: [u8; AES_BLOCK_SIZE]) -> (u64, u64) {
    let b = u128::from_be_bytes(block);
    ((b >> 64) as u64, b as u64)
}

/// Load a byte string whose length is a multiple of 8.
pub(crate) fn load(bytes: &[u8]) -> CryptoResult<Zeroizing<Vec<u64>>> {
    let mut registers = Zeroizing::new(Vec::with_capacity(bytes.len() / SEMIBLOCK_SIZE));
    for chunk in bytes.chunks_exact(SEMIBLOCK_SIZE) {
        registers.push(u64::from_be_bytes(chunk.try_into()?));
    }
    Ok(registers)
}

/// Concatenate `A || R[1] || ... || R[n]`.
pub(crate) fn store(a: u64, registers: &[u64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(SEMIBLOCK_SIZE * (registers.len() + 1));
    out.extend_from_slice(&a.to_be_bytes());
    for r in registers {
        out.extend_from_slice(&r.to_be_bytes());
    }
    out
}

/// Round counter `t = n*j + i`, with `i` 1-based.
fn step(n: usize, j: usize, i: usize) -> CryptoResult<u64> {
    Ok(u64::try_from(n * j + i)?)
}

/// Wrapping rounds: `j` ascending, `i` ascending.
/// Returns the final value of `A`; `registers` end up holding `R[1..n]`.
pub(crate) fn wrap_rounds<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    iv: u64,
    registers: &mut [u64],
) -> CryptoResult<u64> {
    let n = registers.len();
    let mut a = iv;
    for j in 0..ROUNDS {
        for (i, r) in registers.iter_mut().enumerate() {
            // B = AES(K, A | R[i])
            let (msb, lsb) = split(cipher.encrypt_block(&join(a, *r))?);
            // A = MSB(64, B) ^ t
            a = msb ^ step(n, j, i + 1)?;
            // R[i] = LSB(64, B)
            *r = lsb;
        }
    }
    Ok(a)
}

/// Unwrapping rounds: `j` descending, `i` descending.
/// Returns the recovered `A`, which the caller must validate before
/// trusting anything left in `registers`.
pub(crate) fn unwrap_rounds<C: BlockCipher + ?Sized>(
    cipher: &mut C,
    c0: u64,
    registers: &mut [u64],
) -> CryptoResult<u64> {
    let n = registers.len();
    let mut a = c0;
    for j in (0..ROUNDS).rev() {
        for (i, r) in registers.iter_mut().enumerate().rev() {
            // B = AES-1(K, (A ^ t) | R[i])
            let (msb, lsb) = split(cipher.decrypt_block(&join(a ^ step(n, j, i + 1)?, *r))?);
            a = msb;
            *r = lsb;
        }
    }
    Ok(a)
}
