pub mod block_cipher;
pub mod rfc3394;
#[allow(clippy::indexing_slicing)]
pub mod rfc5649;
mod semiblocks;

pub use semiblocks::SEMIBLOCK_SIZE;
