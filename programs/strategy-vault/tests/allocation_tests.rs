/// Allocation engine behaviour against mock strategies
///
/// Covers rebalancing, strategy losses, strategy-local failure handling,
/// withdrawal sourcing order and the emergency drain.

mod common;

use anchor_lang::prelude::*;
use common::{assert_vault_error, new_position, TestVault};
use strategy_vault::{
    access,
    constants::{HEALTH_PENALTY, MAX_HEALTH, SCALE, SLOTS_PER_YEAR},
    engine,
    errors::VaultError,
    ledger::WithdrawRequest,
    state::StrategyWeight,
};

fn request(shares: u64) -> WithdrawRequest {
    WithdrawRequest {
        shares,
        min_assets: 0,
        deadline: u64::MAX,
    }
}

// =============================================================================
// REBALANCE
// =============================================================================

#[test]
fn test_deposit_allocates_by_weight() {
    let mut t = TestVault::with_weights(&[6000, 4000, 0]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();

    assert_eq!(t.strategies[0].balance(), 600);
    assert_eq!(t.strategies[1].balance(), 400);
    assert_eq!(t.strategies[2].balance(), 0);
    assert_eq!(t.vault.idle_assets, 0);
    t.assert_books_balance();
}

#[test]
fn test_rebalance_is_idempotent() {
    let mut t = TestVault::with_weights(&[6000, 4000]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();
    let calls: Vec<u64> = t.strategies.iter().map(|s| s.calls()).collect();

    let report = t.rebalance().unwrap();
    assert_eq!(report.deployed, 0);
    assert_eq!(report.recalled, 0);
    let after: Vec<u64> = t.strategies.iter().map(|s| s.calls()).collect();
    assert_eq!(calls, after);
}

#[test]
fn test_rebalance_leaves_unharvested_yield_in_place() {
    let mut t = TestVault::with_weights(&[10_000]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[0].accrue(40);

    let report = t.rebalance().unwrap();
    assert_eq!(report.recalled, 0);
    assert_eq!(t.strategies[0].balance(), 1040);
    assert_eq!(t.vault.total_assets, 1000);
}

#[test]
fn test_weight_change_moves_capital() {
    let mut t = TestVault::with_weights(&[6000, 4000]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();

    t.registry
        .set_weights(&[StrategyWeight::new(t.ids[1], 10_000)])
        .unwrap();
    let report = t.rebalance().unwrap();

    assert_eq!(report.recalled, 600);
    assert_eq!(report.deployed, 600);
    assert_eq!(t.strategies[0].balance(), 0);
    assert_eq!(t.strategies[1].balance(), 1000);
    assert_eq!(t.deployed(0), 0);
    t.assert_books_balance();
}

#[test]
fn test_zero_weights_recall_everything() {
    let mut t = TestVault::with_weights(&[5000, 5000]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();

    t.registry.set_weights(&[]).unwrap();
    t.rebalance().unwrap();
    assert_eq!(t.vault.idle_assets, 1000);
    assert_eq!(t.registry.total_deployed().unwrap(), 0);
}

#[test]
fn test_failing_strategy_degraded_not_fatal() {
    let mut t = TestVault::with_weights(&[6000, 4000]);
    t.strategies[1].book().fail_deposits = true;
    let mut position = new_position(Pubkey::new_unique());

    assert_eq!(t.deposit(&mut position, 1000).unwrap(), 1000);
    assert_eq!(t.strategies[0].balance(), 600);
    assert_eq!(t.vault.idle_assets, 400);
    assert_eq!(t.health(1), MAX_HEALTH - HEALTH_PENALTY);
    assert_eq!(t.health(0), MAX_HEALTH);
    t.assert_books_balance();

    let report = t.rebalance().unwrap();
    assert_eq!(report.degraded, vec![t.ids[1]]);
    assert_eq!(t.health(1), MAX_HEALTH - 2 * HEALTH_PENALTY);

    // Recovered strategy receives its share on the next pass
    t.strategies[1].book().fail_deposits = false;
    let report = t.rebalance().unwrap();
    assert_eq!(report.deployed, 400);
    assert!(report.degraded.is_empty());
}

#[test]
fn test_unusable_strategy_skipped_without_penalty() {
    let mut t = TestVault::with_weights(&[5000, 5000]);
    t.strategies[0].book().inactive = true;
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();

    assert_eq!(t.strategies[0].balance(), 0);
    assert_eq!(t.strategies[1].balance(), 500);
    assert_eq!(t.health(0), MAX_HEALTH);
}

// =============================================================================
// WITHDRAWAL SOURCING
// =============================================================================

#[test]
fn test_idle_assets_used_before_strategies() {
    let mut t = TestVault::with_weights(&[10_000]);
    t.strategies[0].book().fail_deposits = true;
    let alice = Pubkey::new_unique();
    let mut position = new_position(alice);
    t.deposit(&mut position, 1000).unwrap();
    let calls = t.strategies[0].calls();

    t.withdraw(&mut position, alice, request(300), 0).unwrap();
    assert_eq!(t.vault.idle_assets, 700);
    assert_eq!(t.strategies[0].calls(), calls);
}

#[test]
fn test_equal_health_sourced_by_weight() {
    let mut t = TestVault::with_weights(&[6000, 4000]);
    let alice = Pubkey::new_unique();
    let mut position = new_position(alice);
    t.deposit(&mut position, 1000).unwrap();

    t.withdraw(&mut position, alice, request(500), 0).unwrap();
    assert_eq!(t.strategies[0].balance(), 300);
    assert_eq!(t.strategies[1].balance(), 200);
    t.assert_books_balance();
}

#[test]
fn test_unhealthiest_strategy_drained_first() {
    let mut t = TestVault::with_weights(&[5000, 2500, 2500]);
    let alice = Pubkey::new_unique();
    let mut position = new_position(alice);
    t.deposit(&mut position, 1000).unwrap();
    t.set_health(1, 50);
    t.set_health(2, 75);

    t.withdraw(&mut position, alice, request(300), 0).unwrap();
    assert_eq!(t.strategies[1].balance(), 0);
    assert_eq!(t.strategies[2].balance(), 200);
    assert_eq!(t.strategies[0].balance(), 500);
    t.assert_books_balance();
}

#[test]
fn test_failed_pull_replanned_over_remaining_strategies() {
    let mut t = TestVault::with_weights(&[6000, 4000]);
    let alice = Pubkey::new_unique();
    let mut position = new_position(alice);
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[0].book().fail_withdrawals = true;

    assert_eq!(t.withdraw(&mut position, alice, request(300), 0).unwrap(), 300);
    assert_eq!(t.strategies[0].balance(), 600);
    assert_eq!(t.strategies[1].balance(), 100);
    assert_eq!(t.health(0), MAX_HEALTH - HEALTH_PENALTY);
    t.assert_books_balance();
}

#[test]
fn test_insufficient_liquidity_fails_atomically() {
    let mut t = TestVault::with_weights(&[6000, 4000]);
    let alice = Pubkey::new_unique();
    let mut position = new_position(alice);
    t.deposit(&mut position, 1000).unwrap();
    for strategy in &t.strategies {
        strategy.book().fail_withdrawals = true;
    }
    let (vault, registry) = (t.vault.clone(), t.registry.clone());

    let result = t.withdraw(&mut position, alice, request(500), 0);
    assert_vault_error(result, VaultError::InsufficientLiquidity);
    assert_eq!(t.vault, vault);
    assert_eq!(t.registry, registry);
    assert_eq!(position.shares, 1000);
}

#[test]
fn test_unreachable_liquidity_rejected_before_any_write() {
    let mut t = TestVault::with_weights(&[10_000]);
    let alice = Pubkey::new_unique();
    let mut position = new_position(alice);
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[0].book().inactive = true;
    let calls = t.strategies[0].calls();

    let result = t.withdraw(&mut position, alice, request(1), 0);
    assert_vault_error(result, VaultError::InsufficientLiquidity);
    assert_eq!(t.strategies[0].calls(), calls);
}

// =============================================================================
// HARVEST
// =============================================================================

#[test]
fn test_harvest_reports_annualised_apy() {
    let mut t = TestVault::with_weights(&[10_000]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[0].accrue(10);

    // 1% over a full year
    let report = t.harvest(0, SLOTS_PER_YEAR).unwrap();
    assert_eq!(report.harvested, 10);
    assert_eq!(report.apy_bps, 100);
    assert_eq!(t.strategies[0].book().apy_bps, 100);

    let entry = t.registry.get(&t.ids[0]).unwrap();
    assert_eq!(entry.total_earned, 10);
    assert_eq!(entry.last_harvest_slot, SLOTS_PER_YEAR);
    // 100 bps on 1000 of 1010 total assets
    assert_eq!(t.vault.weighted_apy_bps, 99);
}

#[test]
fn test_harvest_failure_degrades_and_keeps_ledger() {
    let mut t = TestVault::with_weights(&[10_000]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[0].accrue(50);
    t.strategies[0].book().fail_withdrawals = true;

    let report = t.harvest(0, 100).unwrap();
    assert_eq!(report.harvested, 0);
    assert_eq!(report.degraded, vec![t.ids[0]]);
    assert_eq!(t.vault.total_assets, 1000);
    assert_eq!(t.health(0), MAX_HEALTH - HEALTH_PENALTY);

    // A successful harvest restores some health
    t.strategies[0].book().fail_withdrawals = false;
    assert_eq!(t.harvest(0, 200).unwrap().harvested, 50);
    assert_eq!(t.health(0), MAX_HEALTH - HEALTH_PENALTY + 10);
}

#[test]
fn test_harvest_needs_every_funded_strategy() {
    let mut t = TestVault::with_weights(&[5000, 5000]);
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[0].accrue(10);

    // Leaving out a funded strategy would skew the vault APY
    let mut slots = t.slots();
    let id = t.ids[0];
    let result = engine::harvest(&mut t.vault, &mut t.registry, &mut slots[..1], &id, 100);
    assert_vault_error(result, VaultError::IncompleteStrategySet);
    assert_eq!(t.vault.total_assets, 1000);

    assert_eq!(t.harvest(0, 100).unwrap().harvested, 10);
}

// =============================================================================
// LOSSES
// =============================================================================

#[test]
fn test_strategy_loss_shared_by_all_holders() {
    let mut t = TestVault::with_weights(&[10_000]);
    let (alice, bob) = (Pubkey::new_unique(), Pubkey::new_unique());
    let mut alice_position = new_position(alice);
    let mut bob_position = new_position(bob);
    t.deposit(&mut alice_position, 1000).unwrap();
    t.deposit(&mut bob_position, 1000).unwrap();

    t.strategies[0].lose(1000);
    let report = t.rebalance().unwrap();
    assert_eq!(report.written_off, 1000);
    assert_eq!(report.deployed, 0);
    assert_eq!(t.deployed(0), 1000);
    assert_eq!(t.vault.total_assets, 1000);
    assert_eq!(t.vault.share_price().unwrap(), SCALE / 2);
    t.assert_books_balance();

    // The first one out cannot leave the loss to the last one
    assert_eq!(t.withdraw_all(&mut alice_position, 0).unwrap(), 500);
    assert_eq!(t.withdraw_all(&mut bob_position, 0).unwrap(), 500);
    assert_eq!(t.vault.total_assets, 0);
    assert_eq!(t.vault.total_shares, 0);
    assert_eq!(t.strategies[0].balance(), 0);
    t.assert_zero_invariant();
}

#[test]
fn test_loss_booked_before_deposit_and_withdraw_pricing() {
    let mut t = TestVault::with_weights(&[10_000]);
    let (alice, carol) = (Pubkey::new_unique(), Pubkey::new_unique());
    let mut alice_position = new_position(alice);
    let mut carol_position = new_position(carol);
    t.deposit(&mut alice_position, 1000).unwrap();

    // No keeper ran since the loss: the deposit itself books it
    t.strategies[0].lose(400);
    assert_eq!(t.deposit(&mut carol_position, 600).unwrap(), 1000);
    assert_eq!(t.vault.total_assets, 1200);
    assert_eq!(t.deployed(0), 1200);
    t.assert_books_balance();

    t.strategies[0].lose(600);
    assert_eq!(t.withdraw_all(&mut alice_position, 0).unwrap(), 300);
    assert_eq!(t.withdraw_all(&mut carol_position, 0).unwrap(), 300);
    t.assert_zero_invariant();
    t.assert_books_balance();
}

#[test]
fn test_wiped_out_strategy_refuses_new_deposits() {
    let mut t = TestVault::with_weights(&[10_000]);
    let alice = Pubkey::new_unique();
    let mut alice_position = new_position(alice);
    t.deposit(&mut alice_position, 1000).unwrap();
    t.strategies[0].lose(1000);

    let mut bob_position = new_position(Pubkey::new_unique());
    assert_vault_error(t.deposit(&mut bob_position, 500), VaultError::VaultInsolvent);
    assert_eq!(bob_position.shares, 0);

    // Worthless shares can still be burned
    assert_eq!(t.withdraw_all(&mut alice_position, 0).unwrap(), 0);
    t.assert_zero_invariant();
}

// =============================================================================
// EMERGENCY
// =============================================================================

#[test]
fn test_emergency_recall_while_paused() {
    let mut t = TestVault::with_weights(&[6000, 4000]);
    let owner = t.owner;
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[1].book().fail_withdrawals = true;

    access::pause(&mut t.vault, &owner).unwrap();
    let report = t.recall_all().unwrap();

    assert_eq!(report.recalled, 600);
    assert_eq!(report.degraded, vec![t.ids[1]]);
    assert_eq!(t.vault.idle_assets, 600);
    assert_eq!(t.vault.total_assets, 1000);
    assert_eq!(t.registry.active_weight_sum(), 10_000);
    t.assert_books_balance();
}

#[test]
fn test_emergency_recall_books_losses() {
    let mut t = TestVault::with_weights(&[10_000]);
    let owner = t.owner;
    let mut position = new_position(Pubkey::new_unique());
    t.deposit(&mut position, 1000).unwrap();
    t.strategies[0].lose(250);

    access::pause(&mut t.vault, &owner).unwrap();
    let report = t.recall_all().unwrap();
    assert_eq!(report.written_off, 250);
    assert_eq!(report.recalled, 750);
    assert_eq!(t.deployed(0), 0);
    assert_eq!(t.vault.total_assets, 750);
    t.assert_books_balance();
}
