pub mod hashing;
pub mod wallet;

pub use hashing::{digest, digest_file};
pub use wallet::{recover_signer, SigningHandle, WalletIdentity, WalletPool};
