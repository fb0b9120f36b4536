//! Redemption Engine Binary
//!
//! Drives a local redemption engine against the simulated bridge.
//!
//! Usage:
//!   redeemd demo [--mint <bloom>] [--redeem <bloom>]
//!   redeemd quote <bloom>
//!   redeemd max <locked_sats> <supply>
//!   redeemd keygen

use std::env;
use std::sync::Arc;

use bloom_redeem::{
    logging, peg, EngineConfig, InMemorySupplyLedger, IntentSigner, RedemptionEngine, SupplyLedger,
};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "demo" => cmd_demo(&args[2..]).await,
        "quote" => cmd_quote(&args[2..]),
        "max" => cmd_max(&args[2..]),
        "keygen" => cmd_keygen(),
        "help" | "--help" | "-h" => print_usage(),
        _ => print_usage(),
    }
}

fn print_usage() {
    println!("Bloom Redemption Engine - BLOOM -> BTC settlement");
    println!();
    println!("Usage:");
    println!("  redeemd demo [--mint <bloom>] [--redeem <bloom>]   Run a full redemption cycle");
    println!("  redeemd quote <bloom>                              Quote BLOOM in satoshis");
    println!("  redeemd max <locked_sats> <supply>                 Max redeemable bound");
    println!("  redeemd keygen                                     Generate an intent signing key");
    println!();
    println!("Environment:");
    println!("  BLOOM_NETWORK       mainnet | testnet | devnet (default: devnet)");
    println!("  BLOOM_BRIDGE_API    HTLC bridge API endpoint");
    println!("  BLOOM_SIGNER_KEY    Hex-encoded 32-byte signing key");
    println!("  BLOOM_LOG_LEVEL     debug | info | warn | error");
}

async fn cmd_demo(args: &[String]) {
    let config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return;
        }
    };

    if let Err(e) = logging::init_from_config(&config) {
        eprintln!("Warning: {}", e);
    }

    config.print_summary();

    let mint = flag_value(args, "--mint").unwrap_or(10);
    let redeem = flag_value(args, "--redeem").unwrap_or(5);

    let ledger = InMemorySupplyLedger::new();
    let engine = RedemptionEngine::simulated(config, Arc::new(ledger.clone()));

    println!();
    println!("{}", peg::peg_statement());
    println!("Bridge mode: {}", engine.bridge_mode());
    println!();

    if let Err(e) = ledger.record_mint(mint).await {
        eprintln!("Mint failed: {}", e);
        return;
    }
    println!("Minted {} BLOOM (supply: {})", mint, ledger.current_supply().await);

    let intent = match engine.request_redeem(redeem, DEMO_ADDRESS).await {
        Ok(intent) => intent,
        Err(e) => {
            eprintln!("Redemption request rejected: {}", e);
            return;
        }
    };

    println!(
        "Intent {}: {} BLOOM -> {} sats, HTLC {}, deadline {}",
        intent.id, intent.bloom_amount, intent.quoted_sats, intent.btc_txid, intent.deadline
    );

    match engine.complete_redemption(&intent.id).await {
        Ok(true) => {
            let intent = engine.get_intent(&intent.id).await.unwrap();
            println!(
                "Completed: claim {} | supply now {}",
                intent.claim_txid.as_deref().unwrap_or("-"),
                ledger.current_supply().await
            );
        }
        Ok(false) => {
            let intent = engine.get_intent(&intent.id).await.unwrap();
            println!("Not completed: intent is {}", intent.status);
        }
        Err(e) => eprintln!("Completion rejected: {}", e),
    }

    println!();
    println!("{}", engine.stats().await);
}

fn cmd_quote(args: &[String]) {
    let Some(bloom) = args.first().and_then(|s| s.parse::<u64>().ok()) else {
        eprintln!("Usage: redeemd quote <bloom>");
        return;
    };

    match peg::quote(bloom) {
        Some(sats) => println!("{} BLOOM = {} sats", bloom, sats),
        None => eprintln!("Amount too large to quote"),
    }
}

fn cmd_max(args: &[String]) {
    let (Some(locked), Some(supply)) = (
        args.first().and_then(|s| s.parse::<u64>().ok()),
        args.get(1).and_then(|s| s.parse::<u64>().ok()),
    ) else {
        eprintln!("Usage: redeemd max <locked_sats> <supply>");
        return;
    };

    let max = peg::max_bloom_for_locked(locked).min(supply);
    println!(
        "Max redeemable: {} BLOOM (reserve covers {}, supply {})",
        max,
        peg::max_bloom_for_locked(locked),
        supply
    );
}

fn cmd_keygen() {
    let signer = IntentSigner::generate();
    println!("Generated intent signing key:");
    println!("  Private (hex): {}", signer.secret_hex());
    println!("  Public:        {}", signer.public_key());
    println!();
    println!("Set BLOOM_SIGNER_KEY to the private key for live-bridge mode.");
}

fn flag_value(args: &[String], flag: &str) -> Option<u64> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1)?.parse().ok()
}

const DEMO_ADDRESS: &str = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx";
