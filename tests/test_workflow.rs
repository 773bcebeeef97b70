//! End-to-end workflow tests against the in-process registry:
//! sign/store/verify with two identities, failure paths that must leave the
//! flow where it was, and listing/pagination over the registry.

use alloy::primitives::{address, Address, B256, U256};
use rand::RngCore;
use std::io::Write;
use std::sync::Arc;

use document_registry::app::workflow::list_documents;
use document_registry::domain::document::DocumentEvent;
use document_registry::{
    digest, digest_file, verify_bytes, verify_digest, DocumentPages, DocumentRecord,
    DocumentRegistry, HashError,
    MemoryChain, RegistryError, Session, SignAndStore, SignFlowState, StaticApproval, VerifyMode,
    WalletPool, WorkflowError,
};

const ACCOUNT_0: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
const ACCOUNT_1: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
const FIXED_TS: u64 = 1_700_000_000;

fn pool() -> Arc<WalletPool> {
    Arc::new(
        WalletPool::from_mnemonic(document_registry::crypto::wallet::DEFAULT_MNEMONIC, 10)
            .expect("derive pool"),
    )
}

fn setup() -> (Arc<MemoryChain>, Session, SignAndStore) {
    let chain = Arc::new(MemoryChain::new());
    let session = Session::new(pool(), chain.clone());
    let flow = SignAndStore::new(chain.clone()).with_clock(Arc::new(|| FIXED_TS));
    (chain, session, flow)
}

async fn sign_and_store(
    flow: &mut SignAndStore,
    session: &Session,
    name: &str,
    bytes: &[u8],
) -> B256 {
    let hash = flow.select_bytes(name, bytes);
    flow.sign(session, &StaticApproval(true)).await.expect("sign");
    flow.store(session, &StaticApproval(true)).await.expect("store");
    hash
}

#[tokio::test]
async fn hello_signed_by_first_identity_verifies_only_for_it() {
    let (chain, mut session, mut flow) = setup();
    assert!(session.connect(0).await);
    assert_eq!(session.active_address(), Some(ACCOUNT_0));

    let hash = flow.select_bytes("hello.txt", b"hello");
    assert_eq!(
        hash.to_string(),
        "0x1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
    );
    let signature = flow.sign(&session, &StaticApproval(true)).await.expect("sign");
    assert_eq!(signature.len(), 65);
    flow.store(&session, &StaticApproval(true)).await.expect("store");

    assert!(chain.is_stored(hash).await.expect("is_stored"));
    let record = chain.get_info(hash).await.expect("record");
    assert_eq!(
        record,
        DocumentRecord {
            hash,
            timestamp: FIXED_TS,
            signer: ACCOUNT_0,
            signature,
        }
    );

    let ok = verify_bytes(chain.as_ref(), b"hello", &ACCOUNT_0.to_string(), VerifyMode::SignerField)
        .await
        .expect("verify");
    assert!(ok.document_found);
    assert!(ok.is_valid);
    assert_eq!(ok.stored_timestamp, Some(FIXED_TS));

    let other = verify_bytes(chain.as_ref(), b"hello", &ACCOUNT_1.to_string(), VerifyMode::SignerField)
        .await
        .expect("verify");
    assert!(other.document_found);
    assert!(!other.is_valid);
    assert_eq!(other.stored_signer, Some(ACCOUNT_0));
}

#[tokio::test]
async fn signer_comparison_ignores_case() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    let hash = sign_and_store(&mut flow, &session, "a.txt", b"case").await;

    let lower = format!("{:#x}", ACCOUNT_0);
    let upper = lower.to_uppercase().replacen("0X", "0x", 1);
    for candidate in [lower, upper] {
        let result = verify_digest(chain.as_ref(), hash, &candidate, VerifyMode::SignerField)
            .await
            .expect("verify");
        assert!(result.is_valid, "candidate {candidate}");
    }
}

#[tokio::test]
async fn recovery_reports_the_real_signer() {
    let (chain, mut session, mut flow) = setup();
    session.connect(1).await;
    let hash = sign_and_store(&mut flow, &session, "doc.pdf", b"recover me").await;

    let result = verify_digest(chain.as_ref(), hash, &ACCOUNT_1.to_string(), VerifyMode::WithRecovery)
        .await
        .expect("verify");
    assert!(result.is_valid);
    assert_eq!(result.recovered_signer, Some(ACCOUNT_1));
    assert_eq!(result.signature_matches, Some(true));
}

#[tokio::test]
async fn verify_before_store_reports_not_found() {
    let (chain, _session, _flow) = setup();
    let result = verify_bytes(chain.as_ref(), b"never stored", &ACCOUNT_0.to_string(), VerifyMode::SignerField)
        .await
        .expect("verify");
    assert!(!result.document_found);
    assert!(!result.is_valid);
    assert_eq!(result.stored_signer, None);
    assert!(chain.events().is_empty());
}

#[tokio::test]
async fn verify_surfaces_remote_failure() {
    let (chain, _session, _flow) = setup();
    chain.set_offline(true);
    let err = verify_bytes(chain.as_ref(), b"x", "0xabc", VerifyMode::SignerField)
        .await
        .expect_err("offline");
    assert!(matches!(err, WorkflowError::Registry(RegistryError::RemoteCall(_))));
}

#[tokio::test]
async fn switching_to_the_same_wallet_is_idempotent() {
    let (_chain, mut session, _flow) = setup();
    assert!(session.connect(1).await);
    let before = session.info();
    assert!(session.switch_wallet(1).await);
    assert_eq!(session.info(), before);
    assert_eq!(session.active_address(), Some(ACCOUNT_1));
}

#[tokio::test]
async fn out_of_range_index_leaves_session_unchanged() {
    let (_chain, mut session, _flow) = setup();
    assert!(!session.connect(10).await);
    assert!(!session.is_connected());

    session.connect(2).await;
    let before = session.info();
    assert!(!session.switch_wallet(10).await);
    assert_eq!(session.info(), before);
}

#[tokio::test]
async fn balance_lookup_failure_leaves_balance_unknown() {
    let (chain, mut session, _flow) = setup();
    chain.set_balance(ACCOUNT_0, U256::from(42u64));
    session.connect(0).await;
    assert_eq!(session.balance(), Some(U256::from(42u64)));

    chain.fail_balance_lookups(true);
    session.refresh_balance().await;
    assert!(session.is_connected());
    assert_eq!(session.balance(), None);
    assert_eq!(session.info().balance, None);
}

#[tokio::test]
async fn sign_requires_connection_and_file() {
    let (_chain, mut session, mut flow) = setup();
    let err = flow.sign(&session, &StaticApproval(true)).await.expect_err("idle");
    assert!(matches!(err, WorkflowError::InvalidState(_)));

    flow.select_bytes("f", b"data");
    let err = flow.sign(&session, &StaticApproval(true)).await.expect_err("no wallet");
    assert!(matches!(err, WorkflowError::NotConnected));
    assert_eq!(flow.state().name(), "hashed");

    session.connect(0).await;
    flow.sign(&session, &StaticApproval(true)).await.expect("sign");
    assert_eq!(flow.state().name(), "signed");
}

#[tokio::test]
async fn declined_approval_leaves_state_unchanged() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    flow.select_bytes("f", b"decline");
    let hashed = flow.state().clone();

    let err = flow.sign(&session, &StaticApproval(false)).await.expect_err("declined");
    assert!(matches!(err, WorkflowError::UserDeclined));
    assert_eq!(flow.state(), &hashed);

    flow.sign(&session, &StaticApproval(true)).await.expect("sign");
    let signed = flow.state().clone();
    let err = flow.store(&session, &StaticApproval(false)).await.expect_err("declined");
    assert!(matches!(err, WorkflowError::UserDeclined));
    assert_eq!(flow.state(), &signed);
    assert_eq!(chain.count().await.expect("count"), 0);
}

#[tokio::test]
async fn failed_store_stays_signed_and_can_be_retried() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    flow.select_bytes("retry.txt", b"retry");
    let signature = flow.sign(&session, &StaticApproval(true)).await.expect("sign");

    chain.fail_stores(true);
    let err = flow.store(&session, &StaticApproval(true)).await.expect_err("revert");
    assert!(matches!(err, WorkflowError::Registry(RegistryError::RemoteCall(_))));
    match flow.state() {
        SignFlowState::Signed { signature: s, .. } => assert_eq!(s, &signature),
        other => panic!("expected signed, got {other:?}"),
    }
    assert_eq!(chain.count().await.expect("count"), 0);

    chain.fail_stores(false);
    let receipt = flow.store(&session, &StaticApproval(true)).await.expect("store");
    assert_eq!(receipt.block_number, 1);
    assert_eq!(flow.state().name(), "stored");

    let err = flow.store(&session, &StaticApproval(true)).await.expect_err("twice");
    assert!(matches!(err, WorkflowError::InvalidState(_)));
}

#[tokio::test]
async fn storing_the_same_hash_twice_is_rejected() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    sign_and_store(&mut flow, &session, "a", b"same bytes").await;

    session.switch_wallet(1).await;
    flow.select_bytes("b", b"same bytes");
    flow.sign(&session, &StaticApproval(true)).await.expect("sign");
    let err = flow.store(&session, &StaticApproval(true)).await.expect_err("dup");
    assert!(err.to_string().contains("already stored"));
    assert_eq!(chain.count().await.expect("count"), 1);

    let record = chain.get_info(digest(b"same bytes")).await.expect("record");
    assert_eq!(record.signer, ACCOUNT_0);
}

#[tokio::test]
async fn store_emits_document_stored_event() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    let hash = sign_and_store(&mut flow, &session, "e", b"event").await;

    let events = chain.events();
    assert_eq!(events.len(), 1);
    match &events[0] {
        DocumentEvent::DocumentStored {
            hash: h,
            signer,
            timestamp,
            ..
        } => {
            assert_eq!(*h, hash);
            assert_eq!(*signer, ACCOUNT_0);
            assert_eq!(*timestamp, FIXED_TS);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn list_all_matches_count_in_store_order() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    let mut hashes = Vec::new();
    for i in 0..5u8 {
        hashes.push(sign_and_store(&mut flow, &session, "n", &[i; 8]).await);
    }

    let listing = list_documents(chain.as_ref()).await.expect("list");
    assert_eq!(listing.total, 5);
    assert_eq!(listing.documents.len(), 5);
    for (j, record) in listing.documents.iter().enumerate() {
        assert_eq!(record.hash, hashes[j]);
        let at = chain.hash_at_index(j as u64).await.expect("index");
        assert_eq!(record, &chain.get_info(at).await.expect("info"));
    }
}

#[tokio::test]
async fn empty_registry_lists_nothing() {
    let (chain, _session, _flow) = setup();
    let listing = list_documents(chain.as_ref()).await.expect("list");
    assert_eq!(listing.total, 0);
    assert!(listing.documents.is_empty());
}

#[tokio::test]
async fn pages_keep_fetched_records_when_a_lookup_fails() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    let mut hashes = Vec::new();
    for i in 0..5u8 {
        hashes.push(sign_and_store(&mut flow, &session, "p", &[i; 4]).await);
    }
    chain.break_lookup(hashes[3]);

    let err = chain.list_all().await.expect_err("list_all aborts");
    assert!(matches!(err, RegistryError::RemoteCall(_)));

    let page = chain.page(0, 10).await.expect("page");
    assert_eq!(page.total, 5);
    assert_eq!(page.records.len(), 4);
    assert_eq!(page.failures.len(), 1);
    assert_eq!(page.failures[0].index, 3);
    assert_eq!(page.next_offset, None);

    let mut pages = DocumentPages::new(chain.clone(), 2);
    let first = pages.next_page().await.expect("some").expect("ok");
    assert_eq!(first.next_offset, Some(2));
    let (records, failures) = pages.collect_all().await.expect("rest");
    assert_eq!(records.len(), 2);
    assert_eq!(failures.len(), 1);
    assert!(pages.next_page().await.is_none());

    pages.restart();
    let (all, _) = pages.collect_all().await.expect("all");
    assert_eq!(all.len(), 4);
}

#[tokio::test]
async fn digest_is_deterministic_for_random_content() {
    let mut bytes = vec![0u8; 4096];
    rand::thread_rng().fill_bytes(&mut bytes);
    assert_eq!(digest(&bytes), digest(&bytes.clone()));
    assert_eq!(
        digest(b"").to_string(),
        "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
    );
}

#[tokio::test]
async fn file_digest_matches_in_memory_digest() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(b"hello").expect("write");
    let hash = digest_file(file.path()).await.expect("digest");
    assert_eq!(hash, digest(b"hello"));

    let (_chain, _session, mut flow) = setup();
    flow.select_file(file.path()).await.expect("select");
    assert_eq!(flow.state().hash(), Some(hash));
}

#[tokio::test]
async fn missing_file_is_a_hash_error_and_keeps_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("nope.bin");
    let err = digest_file(&missing).await.expect_err("missing");
    assert!(matches!(err, HashError::ReadFailed { .. }));

    let (_chain, _session, mut flow) = setup();
    flow.select_bytes("kept", b"kept");
    let before = flow.state().clone();
    let err = flow.select_file(&missing).await.expect_err("missing");
    assert!(matches!(err, WorkflowError::Hash(_)));
    assert_eq!(flow.state(), &before);
}

#[tokio::test]
async fn contract_verify_call_checks_signer_and_signature() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    let hash = sign_and_store(&mut flow, &session, "v", b"contract verify").await;
    let handle = session.signing_handle().expect("connected");

    let signature = chain.get_signature(hash).await.expect("signature");
    assert!(chain
        .verify_document(&handle, hash, ACCOUNT_0, &signature)
        .await
        .expect("call"));
    assert!(!chain
        .verify_document(&handle, hash, ACCOUNT_1, &signature)
        .await
        .expect("call"));
    assert!(!chain
        .verify_document(&handle, B256::repeat_byte(7), ACCOUNT_0, &signature)
        .await
        .expect("call"));
    // Simulated call only: nothing beyond the store event is recorded.
    assert_eq!(chain.events().len(), 1);
}

#[tokio::test]
async fn store_after_switching_uses_the_active_wallet() {
    let (chain, mut session, mut flow) = setup();
    session.connect(0).await;
    let hash = flow.select_bytes("s", b"switch mid run");
    flow.sign(&session, &StaticApproval(true)).await.expect("sign");

    session.switch_wallet(1).await;
    flow.store(&session, &StaticApproval(true)).await.expect("store");
    let record = chain.get_info(hash).await.expect("record");
    assert_eq!(record.signer, ACCOUNT_1);

    let result = verify_digest(chain.as_ref(), hash, &ACCOUNT_1.to_string(), VerifyMode::WithRecovery)
        .await
        .expect("verify");
    assert!(result.is_valid);
    assert_eq!(result.recovered_signer, Some(ACCOUNT_0));
    assert_eq!(result.signature_matches, Some(false));
}
