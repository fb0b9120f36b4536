//! End-to-end redemption flows against the in-memory ledger and the
//! simulated bridge.

use std::sync::Arc;

use bloom_redeem::{
    EngineConfig, EngineError, InMemorySupplyLedger, IntentStatus, RedemptionEngine, SupplyLedger,
    SATS_PER_BLOOM,
};

const ADDR: &str = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx";

fn engine_with_ledger() -> (RedemptionEngine, InMemorySupplyLedger) {
    let ledger = InMemorySupplyLedger::new();
    let engine = RedemptionEngine::simulated(EngineConfig::default(), Arc::new(ledger.clone()));
    (engine, ledger)
}

#[tokio::test]
async fn mint_request_complete_cycle() {
    let (engine, ledger) = engine_with_ledger();
    ledger.record_mint(10).await.unwrap();

    let intent = engine.request_redeem(5, ADDR).await.unwrap();
    assert_eq!(intent.quoted_sats, 50_000_000);
    assert_eq!(intent.status, IntentStatus::Pending);
    assert_eq!(intent.bloom_amount, 5);
    assert_eq!(intent.btc_address, ADDR);

    let completed = engine.complete_redemption(&intent.id).await.unwrap();
    assert!(completed);

    let intent = engine.get_intent(&intent.id).await.unwrap();
    assert_eq!(intent.status, IntentStatus::Completed);
    assert!(intent.claim_txid.is_some());
    assert_eq!(ledger.current_supply().await, 5);
}

#[tokio::test]
async fn insufficient_supply_rejected_before_side_effects() {
    let (engine, ledger) = engine_with_ledger();
    ledger.record_mint(5).await.unwrap();

    let result = engine.request_redeem(10, ADDR).await;
    assert!(matches!(
        result,
        Err(EngineError::InsufficientSupply {
            requested: 10,
            supply: 5
        })
    ));

    assert!(engine.intents().await.is_empty());
    assert_eq!(ledger.current_supply().await, 5);
}

#[tokio::test]
async fn zero_amount_rejected() {
    let (engine, ledger) = engine_with_ledger();
    ledger.record_mint(5).await.unwrap();

    let result = engine.request_redeem(0, ADDR).await;
    assert!(matches!(result, Err(EngineError::InvalidAmount { got: 0 })));
    assert!(engine.intents().await.is_empty());
}

#[tokio::test]
async fn completion_is_at_most_once() {
    let (engine, ledger) = engine_with_ledger();
    ledger.record_mint(10).await.unwrap();

    let intent = engine.request_redeem(5, ADDR).await.unwrap();
    assert!(engine.complete_redemption(&intent.id).await.unwrap());
    assert_eq!(ledger.current_supply().await, 5);

    // Second completion rejected, tokens not burned twice
    let result = engine.complete_redemption(&intent.id).await;
    assert!(matches!(
        result,
        Err(EngineError::IntentNotPending {
            status: IntentStatus::Completed,
            ..
        })
    ));
    assert_eq!(ledger.current_supply().await, 5);
}

#[tokio::test]
async fn unknown_intent_rejected() {
    let (engine, _ledger) = engine_with_ledger();

    let result = engine.complete_redemption("rdm_doesnotexist").await;
    assert!(matches!(result, Err(EngineError::IntentNotFound(_))));
}

#[tokio::test]
async fn rate_limit_boundary() {
    let (engine, ledger) = engine_with_ledger();

    // 10 sequential successful requests, each preceded by a mint of 1
    for _ in 0..10 {
        ledger.record_mint(1).await.unwrap();
        engine.request_redeem(1, ADDR).await.unwrap();
    }

    ledger.record_mint(1).await.unwrap();
    let result = engine.request_redeem(1, ADDR).await;
    assert!(matches!(result, Err(EngineError::RateLimitExceeded { .. })));

    // Other addresses are unaffected
    engine
        .request_redeem(1, "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7")
        .await
        .unwrap();
}

#[tokio::test]
async fn supply_conservation_under_interleaving() {
    let (engine, ledger) = engine_with_ledger();

    let mut minted: u64 = 0;
    let mut burned: u64 = 0;

    for (mint, redeem) in [(10u64, 4u64), (3, 2), (7, 7), (5, 1)] {
        ledger.record_mint(mint).await.unwrap();
        minted += mint;

        let intent = engine.request_redeem(redeem, ADDR).await.unwrap();
        assert!(engine.complete_redemption(&intent.id).await.unwrap());
        burned += redeem;

        assert_eq!(ledger.current_supply().await, minted - burned);
    }

    let totals = ledger.totals().await;
    assert_eq!(totals.total_minted, minted);
    assert_eq!(totals.total_burned, burned);

    let stats = engine.stats().await;
    assert_eq!(stats.completed, 4);
    assert_eq!(stats.total_bloom_burned, burned);
    assert_eq!(stats.total_sats_settled, burned * SATS_PER_BLOOM);
}

#[tokio::test]
async fn max_redeemable_is_bounded_by_reserve_and_supply() {
    let (engine, ledger) = engine_with_ledger();
    ledger.record_mint(8).await.unwrap();

    // Reserve covers 5, supply is 8 -> 5
    assert_eq!(engine.calculate_max_redeemable(50_000_000).await, 5);
    // Reserve covers 20, supply is 8 -> 8
    assert_eq!(engine.calculate_max_redeemable(200_000_000).await, 8);
    // Sub-BLOOM reserve rounds down
    assert_eq!(engine.calculate_max_redeemable(9_999_999).await, 0);
}

#[tokio::test]
async fn concurrent_completions_burn_exactly_once() {
    let (engine, ledger) = engine_with_ledger();
    ledger.record_mint(10).await.unwrap();

    let engine = Arc::new(engine);
    let intent = engine.request_redeem(5, ADDR).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        let id = intent.id.clone();
        handles.push(tokio::spawn(
            async move { engine.complete_redemption(&id).await },
        ));
    }

    let mut successes = 0;
    let mut not_pending = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(true) => successes += 1,
            Err(EngineError::IntentNotPending { .. }) => not_pending += 1,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(not_pending, 7);
    assert_eq!(ledger.current_supply().await, 5);
}

#[tokio::test]
async fn intents_are_kept_as_audit_trail() {
    let (engine, ledger) = engine_with_ledger();
    ledger.record_mint(10).await.unwrap();

    let a = engine.request_redeem(2, ADDR).await.unwrap();
    let b = engine.request_redeem(3, ADDR).await.unwrap();
    engine.complete_redemption(&a.id).await.unwrap();

    let all = engine.intents().await;
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|i| i.id == a.id));
    assert!(all.iter().any(|i| i.id == b.id));
}
