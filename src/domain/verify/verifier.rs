// Pure verification rules applied to a record read back from the registry.

use alloy::primitives::{Address, B256};

use crate::crypto::wallet::recover_signer;
use crate::domain::document::{DocumentRecord, VerificationResult};

/// The exact bytes a document's signature covers: the `0x`-prefixed lowercase
/// hex text of its digest, signed as a personal message.
pub fn signing_message(hash: &B256) -> String {
    hash.to_string()
}

/// Addresses compare case-insensitively in their textual form.
/// Free text that is not an address simply never matches.
pub fn signer_matches(stored: &Address, candidate: &str) -> bool {
    let candidate = candidate.trim();
    let stored = stored.to_string();
    stored.eq_ignore_ascii_case(candidate)
}

/// Builds the result for a record that was found. Only the stored signer field is
/// compared against the candidate; the signature bytes are not checked here.
pub fn evaluate(record: &DocumentRecord, candidate: &str) -> VerificationResult {
    VerificationResult {
        hash: record.hash,
        queried_signer: candidate.to_string(),
        document_found: true,
        is_valid: signer_matches(&record.signer, candidate),
        stored_signer: Some(record.signer),
        stored_timestamp: Some(record.timestamp),
        recovered_signer: None,
        signature_matches: None,
    }
}

/// Like [`evaluate`], plus recovery of the signer from the stored signature.
///
/// `is_valid` keeps the signer-field semantics; `signature_matches` reports
/// whether the signature was really produced by the stored signer.
pub fn evaluate_with_recovery(record: &DocumentRecord, candidate: &str) -> VerificationResult {
    let mut result = evaluate(record, candidate);
    let message = signing_message(&record.hash);
    let recovered = recover_signer(message.as_bytes(), &record.signature);
    result.signature_matches = Some(recovered == Some(record.signer));
    result.recovered_signer = recovered;
    result
}
