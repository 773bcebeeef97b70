//! Deterministic pool of test identities and EIP-191 personal-message signing.
//!
//! The pool is derived once from a seed phrase along `m/44'/60'/0'/0/{index}`,
//! the same path dev chains (anvil, hardhat) use to fund their default
//! accounts. Private keys stay in memory and are never serialized.

use alloy::primitives::{Address, Bytes, PrimitiveSignature};
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use alloy::signers::SignerSync;
use std::fmt;

use crate::error::WorkflowError;

/// Well-known public test phrase. Never use with real funds.
pub const DEFAULT_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Number of identities in the default pool.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// One address/private-key pair from the pool.
#[derive(Clone)]
pub struct WalletIdentity {
    pub index: usize,
    signer: PrivateKeySigner,
}

impl WalletIdentity {
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn signing_handle(&self) -> SigningHandle {
        SigningHandle {
            index: self.index,
            signer: self.signer.clone(),
        }
    }
}

impl fmt::Debug for WalletIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletIdentity")
            .field("index", &self.index)
            .field("address", &self.address())
            .finish()
    }
}

/// Capability to sign messages and transactions as one identity.
#[derive(Clone)]
pub struct SigningHandle {
    index: usize,
    signer: PrivateKeySigner,
}

impl SigningHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying local signer, for wiring into a transaction-sending provider.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// EIP-191 personal-message signature (`r || s || v`, 65 bytes).
    pub fn sign_message(&self, message: &[u8]) -> Result<Bytes, WorkflowError> {
        let signature = self
            .signer
            .sign_message_sync(message)
            .map_err(|e| WorkflowError::Signing(e.to_string()))?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

impl fmt::Debug for SigningHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningHandle")
            .field("index", &self.index)
            .field("address", &self.address())
            .finish()
    }
}

/// The fixed set of identities a session can switch between.
#[derive(Debug, Clone)]
pub struct WalletPool {
    identities: Vec<WalletIdentity>,
}

impl WalletPool {
    /// Derives `count` identities from `phrase`.
    pub fn from_mnemonic(phrase: &str, count: usize) -> anyhow::Result<Self> {
        let mut identities = Vec::with_capacity(count);
        for index in 0..count {
            let signer = MnemonicBuilder::<English>::default()
                .phrase(phrase)
                .index(index as u32)?
                .build()?;
            identities.push(WalletIdentity { index, signer });
        }
        Ok(Self { identities })
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&WalletIdentity> {
        self.identities.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WalletIdentity> {
        self.identities.iter()
    }
}

/// Recovers the address that produced a personal-message signature over `message`.
/// Returns `None` when the bytes are not a well-formed 65-byte signature.
pub fn recover_signer(message: &[u8], signature: &[u8]) -> Option<Address> {
    let signature = PrimitiveSignature::try_from(signature).ok()?;
    signature.recover_address_from_msg(message).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> WalletPool {
        WalletPool::from_mnemonic(DEFAULT_MNEMONIC, 3).unwrap()
    }

    #[test]
    fn derives_well_known_dev_accounts() {
        let pool = pool();
        assert_eq!(pool.len(), 3);
        assert_eq!(
            pool.get(0).unwrap().address().to_checksum(None),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert_eq!(
            pool.get(1).unwrap().address().to_checksum(None),
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        );
        assert!(pool.get(3).is_none());
    }

    #[test]
    fn signature_recovers_to_signer() {
        let handle = pool().get(0).unwrap().signing_handle();
        let sig = handle.sign_message(b"0xabc").unwrap();
        assert_eq!(sig.len(), 65);
        assert_eq!(recover_signer(b"0xabc", &sig), Some(handle.address()));
        assert_ne!(recover_signer(b"0xabd", &sig), Some(handle.address()));
    }

    #[test]
    fn signing_handle_keeps_its_pool_slot() {
        let pool = pool();
        let identity = pool.get(2).unwrap();
        let handle = identity.signing_handle();
        assert_eq!(handle.index(), 2);
        assert_eq!(handle.address(), identity.address());
    }

    #[test]
    fn malformed_signature_does_not_recover() {
        assert_eq!(recover_signer(b"msg", &[0u8; 10]), None);
    }

    #[test]
    fn debug_output_hides_key_material() {
        let id = pool().get(0).unwrap().clone();
        let dbg = format!("{:?}", id);
        assert!(dbg.contains("address"));
        assert!(!dbg.contains("signer"));
    }
}
