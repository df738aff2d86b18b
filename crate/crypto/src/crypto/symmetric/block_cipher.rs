//! The 128-bit block cipher consumed by the key wrap engines.
//!
//! Key wrapping only ever needs single block encryption and decryption
//! under the KEK, so the boundary is a raw ECB primitive without padding.
//! [`AesCipher`] is the production implementation, backed by rust-openssl.

use std::fmt;

use openssl::symm::{Cipher, Crypter, Mode};
use zeroize::Zeroizing;

use crate::{
    crypto_bail, crypto_ensure,
    error::{
        CryptoError,
        result::{CryptoResult, CryptoResultHelper},
    },
};

pub const AES_BLOCK_SIZE: usize = 0x10; // 128-bit

/// Accepted KEK sizes, in bytes: AES-128, AES-192 and AES-256.
pub const KEK_SIZES: [usize; 3] = [16, 24, 32];

/// A block cipher with a 128-bit block, already keyed with the KEK.
pub trait BlockCipher {
    fn encrypt_block(&mut self, block: &[u8; AES_BLOCK_SIZE]) -> CryptoResult<[u8; AES_BLOCK_SIZE]>;

    fn decrypt_block(&mut self, block: &[u8; AES_BLOCK_SIZE]) -> CryptoResult<[u8; AES_BLOCK_SIZE]>;
}

/// Check that the KEK can key an AES cipher.
pub fn check_kek_size(kek: &[u8]) -> CryptoResult<()> {
    crypto_ensure!(
        KEK_SIZES.contains(&kek.len()),
        CryptoError::InvalidKeyLength(format!(
            "The KEK size should be 16, 24 or 32 bytes, got {}",
            kek.len()
        ))
    );
    Ok(())
}

fn select_cipher(kek: &[u8]) -> CryptoResult<Cipher> {
    Ok(match kek.len() {
        16 => Cipher::aes_128_ecb(),
        24 => Cipher::aes_192_ecb(),
        32 => Cipher::aes_256_ecb(),
        _ => {
            return Err(CryptoError::InvalidKeyLength(format!(
                "The KEK size should be 16, 24 or 32 bytes, got {}",
                kek.len()
            )));
        }
    })
}

/// AES-ECB without padding, keyed once and reused for every block.
///
/// ECB carries no chaining state between blocks, so one encrypter and one
/// decrypter context serve the whole wrap or unwrap operation.
pub struct AesCipher {
    encrypter: Crypter,
    decrypter: Crypter,
    key_size: usize,
}

impl AesCipher {
    /// Key a new AES cipher; fails with `InvalidKeyLength` unless the
    /// KEK is 16, 24 or 32 bytes long.
    pub fn new(kek: &[u8]) -> CryptoResult<Self> {
        check_kek_size(kek)?;
        let cipher = select_cipher(kek)?;

        let mut encrypter = Crypter::new(cipher, Mode::Encrypt, kek, None)?;
        encrypter.pad(false);
        let mut decrypter = Crypter::new(cipher, Mode::Decrypt, kek, None)?;
        decrypter.pad(false);

        Ok(Self {
            encrypter,
            decrypter,
            key_size: kek.len(),
        })
    }

    #[must_use]
    pub const fn key_size(&self) -> usize {
        self.key_size
    }
}

fn process_block(
    crypter: &mut Crypter,
    block: &[u8; AES_BLOCK_SIZE],
) -> CryptoResult<[u8; AES_BLOCK_SIZE]> {
    // rust-openssl requires room for one extra block in the output buffer
    let mut output = Zeroizing::new([0_u8; AES_BLOCK_SIZE * 2]);
    let written = crypter.update(block, output.as_mut_slice())?;
    if written != AES_BLOCK_SIZE {
        crypto_bail!("AES block operation returned {written} bytes instead of {AES_BLOCK_SIZE}");
    }
    Ok(output
        .get(..AES_BLOCK_SIZE)
        .context("AES output buffer too short")?
        .try_into()?)
}

impl BlockCipher for AesCipher {
    fn encrypt_block(&mut self, block: &[u8; AES_BLOCK_SIZE]) -> CryptoResult<[u8; AES_BLOCK_SIZE]> {
        process_block(&mut self.encrypter, block)
    }

    fn decrypt_block(&mut self, block: &[u8; AES_BLOCK_SIZE]) -> CryptoResult<[u8; AES_BLOCK_SIZE]> {
        process_block(&mut self.decrypter, block)
    }
}

impl fmt::Debug for AesCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AesCipher(aes-{}-ecb, key: [****])", self.key_size * 8)
    }
}
