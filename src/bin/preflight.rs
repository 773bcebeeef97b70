use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;

use document_registry::infra::config;
use document_registry::{ChainClient, DocumentRegistry, EvmDocumentRegistry, EvmRpcClient, WalletPool};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads env vars (all optional, dev-node defaults):\n\
           RPC_URL, CONTRACT_ADDRESS, MNEMONIC, WALLET_COUNT\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let rpc_url = config::rpc_url()?;
    let contract = config::contract_address()?;
    let count = config::wallet_count()?;

    println!("> Preflight:");
    println!("  RPC_URL={}", rpc_url);
    println!("  CONTRACT_ADDRESS={}", contract);
    println!("  WALLET_COUNT={}", count);

    let client = EvmRpcClient::new(rpc_url.clone());
    let registry = EvmDocumentRegistry::new(rpc_url.clone(), contract);

    // Basic RPC connectivity
    let chain_id = client
        .chain_id()
        .await
        .map_err(|e| anyhow::anyhow!("RPC not reachable at {}: {}", client.rpc_url(), e))?;
    let block = client.block_number().await?;
    println!("  Chain id: {}", chain_id);
    println!("  Latest block: {}", block);

    // Contract deployment
    if !client.has_code(registry.contract_address()).await? {
        return Err(anyhow::anyhow!(
            "No contract code at {}. Deploy DocumentRegistry or set CONTRACT_ADDRESS",
            registry.contract_address()
        ));
    }
    println!("  Contract code present.");

    let stored = registry
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Contract does not answer getDocumentCount: {}", e))?;
    println!("  Documents stored: {}", stored);

    // Identity balances
    let pool = WalletPool::from_mnemonic(&config::mnemonic(), count)?;
    for identity in pool.iter() {
        let balance = client.balance(identity.address()).await?;
        println!(
            "  [{}] {} {} ETH",
            identity.index,
            identity.address(),
            format_ether(balance)
        );
        if balance == U256::ZERO {
            eprintln!("  Warning: wallet {} has no funds; store transactions will fail.", identity.index);
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
