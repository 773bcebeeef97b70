pub mod verifier;

pub use verifier::{evaluate, evaluate_with_recovery, signer_matches, signing_message};
