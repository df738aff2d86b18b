//! AES key wrapping: RFC 3394 (KW) and RFC 5649 (KWP) over a pluggable
//! 128-bit block cipher.

pub use crypto::symmetric::{
    SEMIBLOCK_SIZE,
    block_cipher::{AES_BLOCK_SIZE, AesCipher, BlockCipher, KEK_SIZES, check_kek_size},
    rfc3394::{DEFAULT_IV, rfc3394_unwrap, rfc3394_unwrap_with, rfc3394_wrap, rfc3394_wrap_with},
    rfc5649::{AIV_PREFIX, rfc5649_unwrap, rfc5649_unwrap_with, rfc5649_wrap, rfc5649_wrap_with},
};
pub use error::{CryptoError, result::CryptoResultHelper};

pub mod crypto;
mod error;

pub mod reexport {
    pub use zeroize;
}
