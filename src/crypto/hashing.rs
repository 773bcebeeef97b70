// Content digests for documents. Keccak-256 so the digest is a native `bytes32`
// for the registry contract.

use alloy::primitives::{keccak256, Address, B256};
use std::path::{Path, PathBuf};

use crate::error::HashError;

/// Hashes raw bytes into a 32-byte digest.
pub fn digest(bytes: &[u8]) -> B256 {
    keccak256(bytes)
}

/// Reads a file and hashes its contents. A leading `~` is expanded.
pub async fn digest_file(path: impl AsRef<Path>) -> Result<B256, HashError> {
    let path = expand_path(path.as_ref());
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| HashError::ReadFailed {
            path: path.clone(),
            source,
        })?;
    Ok(digest(&bytes))
}

/// Keccak-256 of a UTF-8 string.
pub fn hash_string(value: &str) -> B256 {
    digest(value.as_bytes())
}

/// Normalizes a bytes32 hex string so it always carries the `0x` prefix.
pub fn format_bytes32(hash: &str) -> String {
    if hash.starts_with("0x") {
        hash.to_string()
    } else {
        format!("0x{hash}")
    }
}

/// Parses a 32-byte hex string, with or without `0x`.
pub fn parse_b256(s: &str) -> Result<B256, String> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|_| "invalid hex".to_string())?;
    if bytes.len() != 32 {
        return Err("expected 32-byte hex string".to_string());
    }
    Ok(B256::from_slice(&bytes))
}

/// `0x1234…cdef` style display form of a digest or signature.
pub fn shorten_hash(hash: &str, chars: usize) -> String {
    if hash.len() <= 2 * chars + 2 {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..chars + 2], &hash[hash.len() - chars..])
}

pub fn shorten_address(address: &Address) -> String {
    let s = address.to_checksum(None);
    format!("{}...{}", &s[..6], &s[s.len() - 4..])
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_input_is_keccak_empty() {
        assert_eq!(
            digest(b"").to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn hello_digest_matches_known_vector() {
        assert_eq!(
            hash_string("hello").to_string(),
            "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn parse_b256_accepts_both_prefix_forms() {
        let h = hash_string("hello");
        let hex_str = hex::encode(h);
        assert_eq!(parse_b256(&hex_str).unwrap(), h);
        assert_eq!(parse_b256(&format_bytes32(&hex_str)).unwrap(), h);
        assert!(parse_b256("0x1234").is_err());
        assert!(parse_b256("zz").is_err());
    }

    #[test]
    fn shorten_keeps_head_and_tail() {
        let h = hash_string("hello").to_string();
        let short = shorten_hash(&h, 8);
        assert_eq!(short, "0x1c8aff95...a36deac8");
        assert_eq!(shorten_hash("0xabcd", 8), "0xabcd");
    }
}
