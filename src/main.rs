//! Command-line front end for the document registry.
//!
//! `--offline` swaps the RPC-backed registry for an in-process one; its state
//! lives only for the duration of one invocation.

use alloy::primitives::utils::format_ether;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use document_registry::app::approval::{Approver, StaticApproval, TerminalApprover};
use document_registry::app::workflow::list_documents;
use document_registry::crypto::hashing::shorten_address;
use document_registry::domain::document::DocumentRecord;
use document_registry::infra::{config, telemetry};
use document_registry::{
    digest_file, verify_file, ChainClient, DocumentRegistry, EvmDocumentRegistry, EvmRpcClient,
    MemoryChain, Session, SignAndStore, SignFlowState, VerifyMode, WalletPool,
};

#[derive(Parser, Debug)]
#[command(name = "document-registry", version, about = "Hash, sign, store and verify documents")]
struct Cli {
    /// Use an in-process registry instead of the configured RPC endpoint.
    #[arg(long, global = true, env = "OFFLINE")]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the test identities with their balances.
    Wallets,
    /// Print the keccak-256 digest of a file.
    Hash { file: PathBuf },
    /// Hash, sign and store a file.
    SignStore {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        wallet: usize,
        /// Approve both prompts without asking.
        #[arg(long)]
        yes: bool,
    },
    /// Check whether a file was stored by a given signer.
    Verify {
        file: PathBuf,
        #[arg(long)]
        signer: String,
        /// Also recover the signer from the stored signature.
        #[arg(long)]
        recover: bool,
    },
    /// List stored documents in store order.
    List {
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Page size; without it every record is loaded.
        #[arg(long)]
        limit: Option<u64>,
    },
}

struct Backend {
    chain: Arc<dyn ChainClient>,
    registry: Arc<dyn DocumentRegistry>,
}

fn backend(offline: bool) -> anyhow::Result<Backend> {
    if offline {
        let memory = Arc::new(MemoryChain::new());
        return Ok(Backend {
            chain: memory.clone(),
            registry: memory,
        });
    }
    let rpc_url = config::rpc_url()?;
    let contract = config::contract_address()?;
    Ok(Backend {
        chain: Arc::new(EvmRpcClient::new(rpc_url.clone())),
        registry: Arc::new(EvmDocumentRegistry::new(rpc_url, contract)),
    })
}

fn print_record(index: Option<u64>, record: &DocumentRecord) {
    let stored_at = record
        .stored_at()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| record.timestamp.to_string());
    match index {
        Some(i) => println!("[{}] {}  {}  {}", i, record.hash, shorten_address(&record.signer), stored_at),
        None => println!("{}  {}  {}", record.hash, shorten_address(&record.signer), stored_at),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let cli = Cli::parse();
    let backend = backend(cli.offline)?;

    match cli.command {
        Command::Wallets => {
            let pool = WalletPool::from_mnemonic(&config::mnemonic(), config::wallet_count()?)?;
            for identity in pool.iter() {
                let balance = match backend.chain.balance(identity.address()).await {
                    Ok(b) => format!("{} ETH", format_ether(b)),
                    Err(e) => format!("unavailable ({})", e),
                };
                println!("{:>2}  {}  {}", identity.index, identity.address(), balance);
            }
        }
        Command::Hash { file } => {
            let hash = digest_file(&file).await?;
            println!("{}", hash);
        }
        Command::SignStore { file, wallet, yes } => {
            let pool = Arc::new(WalletPool::from_mnemonic(&config::mnemonic(), config::wallet_count()?)?);
            let mut session = Session::new(pool.clone(), backend.chain.clone());
            if !session.connect(wallet).await {
                anyhow::bail!("wallet index {} is outside the pool of {}", wallet, pool.len());
            }
            if let Some(balance) = session.balance() {
                println!("Connected wallet {} ({} ETH)", wallet, format_ether(balance));
            }
            match list_documents(backend.registry.as_ref()).await {
                Ok(listing) => println!("{} document(s) already stored", listing.total),
                Err(e) => println!("Could not load stored documents: {}", e),
            }

            let approver: Box<dyn Approver> = if yes {
                Box::new(StaticApproval(true))
            } else {
                Box::new(TerminalApprover)
            };
            let mut flow = SignAndStore::new(backend.registry.clone());
            let hash = flow.select_file(&file).await?;
            println!("Hash: {}", hash);
            let signature = flow.sign(&session, approver.as_ref()).await?;
            println!("Signature: 0x{}", hex::encode(&signature));
            let receipt = flow.store(&session, approver.as_ref()).await?;
            println!(
                "Stored in block {} (tx {})",
                receipt.block_number, receipt.transaction_hash
            );
            if let SignFlowState::Stored { timestamp, .. } = flow.state() {
                println!("Timestamp: {}", timestamp);
            }
        }
        Command::Verify {
            file,
            signer,
            recover,
        } => {
            let mode = if recover {
                VerifyMode::WithRecovery
            } else {
                VerifyMode::SignerField
            };
            let result = verify_file(backend.registry.as_ref(), &file, &signer, mode).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&result).context("failed to render result")?
            );
            if !result.document_found {
                println!("Document not found in the registry.");
            } else if result.is_valid {
                println!("Document is valid for {}.", signer);
            } else {
                println!("Document was stored by a different signer.");
            }
        }
        Command::List { offset, limit } => match limit {
            Some(limit) => {
                let page = backend.registry.page(offset, limit).await?;
                println!("{} document(s) stored", page.total);
                for item in &page.records {
                    print_record(Some(item.index), &item.record);
                }
                for failure in &page.failures {
                    println!("[{}] lookup failed: {}", failure.index, failure.error);
                }
                if let Some(next) = page.next_offset {
                    println!("more: --offset {} --limit {}", next, limit);
                }
            }
            None => {
                let listing = list_documents(backend.registry.as_ref()).await?;
                println!("{} document(s) stored", listing.total);
                for record in listing.documents.iter().skip(offset as usize) {
                    print_record(None, record);
                }
            }
        },
    }

    Ok(())
}
