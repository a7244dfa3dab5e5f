//! Shared harness: an in-memory vault driven through the ledger and engine
//! exactly as the instruction handlers drive it, with mock strategies.

#![allow(dead_code)]

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use anchor_lang::prelude::*;
use strategy_vault::{
    adapter::{AdapterInfo, StrategyAdapter, StrategySlot},
    engine::{self, HarvestReport, RebalanceReport},
    errors::VaultError,
    ledger::{self, WithdrawRequest},
    state::{StrategyRegistry, StrategyWeight, UserPosition, VaultState},
};

/// Observable state of a mock strategy
#[derive(Clone, Debug, Default)]
pub struct MockBook {
    pub balance: u64,
    pub apy_bps: u16,
    pub fail_reads: bool,
    pub fail_deposits: bool,
    pub fail_withdrawals: bool,
    /// Reports itself unusable (e.g. frozen reserve)
    pub inactive: bool,
    /// Transfers attempted, successful or not
    pub calls: u64,
}

/// Strategy whose balance lives in a shared book the test can inspect
#[derive(Clone, Default)]
pub struct MockStrategy {
    book: Rc<RefCell<MockBook>>,
}

impl MockStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book(&self) -> RefMut<'_, MockBook> {
        self.book.borrow_mut()
    }

    pub fn balance(&self) -> u64 {
        self.book.borrow().balance
    }

    pub fn calls(&self) -> u64 {
        self.book.borrow().calls
    }

    /// Yield credited by the external protocol
    pub fn accrue(&self, amount: u64) {
        self.book.borrow_mut().balance += amount;
    }

    /// Principal lost by the external protocol
    pub fn lose(&self, amount: u64) {
        self.book.borrow_mut().balance -= amount;
    }

    fn snapshot(&self) -> MockBook {
        self.book.borrow().clone()
    }

    fn restore(&self, book: MockBook) {
        *self.book.borrow_mut() = book;
    }
}

impl StrategyAdapter for MockStrategy {
    fn get_balance(&self) -> Result<u64> {
        let book = self.book.borrow();
        require!(!book.fail_reads, VaultError::StrategyUnavailable);
        Ok(book.balance)
    }

    fn estimate_apy(&self) -> Result<u16> {
        Ok(self.book.borrow().apy_bps)
    }

    fn get_info(&self) -> Result<AdapterInfo> {
        let book = self.book.borrow();
        require!(!book.fail_reads, VaultError::StrategyUnavailable);
        Ok(AdapterInfo {
            health_score: 100,
            total_earned: 0,
            active: !book.inactive,
        })
    }

    fn deposit_into(&mut self, amount: u64) -> Result<()> {
        let mut book = self.book.borrow_mut();
        book.calls += 1;
        require!(!book.fail_deposits, VaultError::StrategyUnavailable);
        book.balance += amount;
        Ok(())
    }

    fn withdraw_from(&mut self, amount: u64) -> Result<u64> {
        let mut book = self.book.borrow_mut();
        book.calls += 1;
        require!(!book.fail_withdrawals, VaultError::StrategyUnavailable);
        let paid = amount.min(book.balance);
        book.balance -= paid;
        Ok(paid)
    }

    fn on_harvest(&mut self, apy_bps: u16) {
        self.book.borrow_mut().apy_bps = apy_bps;
    }
}

/// Fail unless `result` is the given vault error
pub fn assert_vault_error<T: std::fmt::Debug>(result: Result<T>, expected: VaultError) {
    let code: u32 = expected.into();
    match result {
        Err(anchor_lang::error::Error::AnchorError(err)) => {
            assert_eq!(err.error_code_number, code, "got {}", err.error_name)
        }
        other => panic!("expected error code {}, got {:?}", code, other),
    }
}

pub fn new_vault(authority: Pubkey) -> VaultState {
    VaultState {
        authority,
        asset_mint: Pubkey::new_unique(),
        vault_id: 0,
        total_assets: 0,
        total_shares: 0,
        idle_assets: 0,
        paused: false,
        locked: false,
        withdrawal_fee_bps: 0,
        weighted_apy_bps: 0,
        bump: 0,
        authority_bump: 0,
        _reserved: [0; 64],
    }
}

pub fn new_position(owner: Pubkey) -> UserPosition {
    UserPosition {
        vault: Pubkey::default(),
        owner,
        shares: 0,
        bump: 0,
    }
}

/// A vault, its registry and its strategies, with transaction-style rollback
pub struct TestVault {
    pub owner: Pubkey,
    pub vault: VaultState,
    pub registry: StrategyRegistry,
    pub ids: Vec<Pubkey>,
    pub strategies: Vec<MockStrategy>,
}

impl TestVault {
    /// One whitelisted strategy per weight; non-zero weights become active
    pub fn with_weights(weights: &[u16]) -> Self {
        let owner = Pubkey::new_unique();
        let mut registry = StrategyRegistry {
            vault: Pubkey::new_unique(),
            strategies: Vec::new(),
            bump: 0,
        };
        let ids: Vec<Pubkey> = weights.iter().map(|_| Pubkey::new_unique()).collect();
        for (i, id) in ids.iter().enumerate() {
            registry
                .whitelist(*id, &format!("Strategy{}", i), true, 0)
                .unwrap();
        }

        let table: Vec<StrategyWeight> = ids
            .iter()
            .zip(weights)
            .filter(|(_, weight)| **weight > 0)
            .map(|(id, weight)| StrategyWeight::new(*id, *weight))
            .collect();
        registry.set_weights(&table).unwrap();

        Self {
            owner,
            vault: new_vault(owner),
            registry,
            strategies: ids.iter().map(|_| MockStrategy::new()).collect(),
            ids,
        }
    }

    pub fn slots(&self) -> Vec<StrategySlot<'static>> {
        self.ids
            .iter()
            .zip(&self.strategies)
            .map(|(id, strategy)| StrategySlot::new(*id, strategy.clone()))
            .collect()
    }

    pub fn deposit(&mut self, position: &mut UserPosition, amount: u64) -> Result<u64> {
        let snapshot = self.snapshot(position);
        let result = self.try_deposit(position, amount);
        if result.is_err() {
            self.restore(snapshot, position);
        }
        result
    }

    fn try_deposit(&mut self, position: &mut UserPosition, amount: u64) -> Result<u64> {
        let mut slots = self.slots();
        let minted = ledger::deposit(
            &mut self.vault,
            &mut self.registry,
            position,
            &slots,
            amount,
        )?;
        engine::rebalance(&mut self.vault, &mut self.registry, &mut slots)?;
        Ok(minted)
    }

    /// Returns the net amount paid to the caller
    pub fn withdraw(
        &mut self,
        position: &mut UserPosition,
        caller: Pubkey,
        request: WithdrawRequest,
        current_slot: u64,
    ) -> Result<u64> {
        let snapshot = self.snapshot(position);
        let result = self.try_withdraw(position, caller, request, current_slot);
        if result.is_err() {
            self.restore(snapshot, position);
        }
        result
    }

    fn try_withdraw(
        &mut self,
        position: &mut UserPosition,
        caller: Pubkey,
        request: WithdrawRequest,
        current_slot: u64,
    ) -> Result<u64> {
        let mut slots = self.slots();
        let quote = ledger::withdraw(
            &mut self.vault,
            &mut self.registry,
            position,
            &slots,
            &caller,
            request,
            current_slot,
        )?;
        engine::source_payout(
            &mut self.vault,
            &mut self.registry,
            &mut slots,
            quote.net_amount,
        )?;
        Ok(quote.net_amount)
    }

    pub fn withdraw_all(&mut self, position: &mut UserPosition, current_slot: u64) -> Result<u64> {
        let request = WithdrawRequest {
            shares: position.shares,
            min_assets: 0,
            deadline: u64::MAX,
        };
        let owner = position.owner;
        self.withdraw(position, owner, request, current_slot)
    }

    pub fn rebalance(&mut self) -> Result<RebalanceReport> {
        let mut slots = self.slots();
        engine::rebalance(&mut self.vault, &mut self.registry, &mut slots)
    }

    pub fn harvest(&mut self, index: usize, current_slot: u64) -> Result<HarvestReport> {
        let mut slots = self.slots();
        let id = self.ids[index];
        engine::harvest(
            &mut self.vault,
            &mut self.registry,
            &mut slots,
            &id,
            current_slot,
        )
    }

    pub fn recall_all(&mut self) -> Result<RebalanceReport> {
        let mut slots = self.slots();
        engine::recall_all(&mut self.vault, &mut self.registry, &mut slots)
    }

    pub fn deployed(&self, index: usize) -> u64 {
        self.registry.get(&self.ids[index]).unwrap().deployed
    }

    pub fn health(&self, index: usize) -> u8 {
        self.registry.get(&self.ids[index]).unwrap().health_score
    }

    pub fn set_health(&mut self, index: usize, health_score: u8) {
        let id = self.ids[index];
        self.registry.get_mut(&id).unwrap().health_score = health_score;
    }

    /// `total_assets` is always idle plus deployed principal
    pub fn assert_books_balance(&self) {
        let deployed = self.registry.total_deployed().unwrap();
        assert_eq!(self.vault.total_assets, self.vault.idle_assets + deployed);
    }

    pub fn assert_zero_invariant(&self) {
        assert_eq!(self.vault.total_shares == 0, self.vault.total_assets == 0);
    }

    fn snapshot(&self, position: &UserPosition) -> Snapshot {
        Snapshot {
            vault: self.vault.clone(),
            registry: self.registry.clone(),
            position: position.clone(),
            books: self.strategies.iter().map(|s| s.snapshot()).collect(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot, position: &mut UserPosition) {
        self.vault = snapshot.vault;
        self.registry = snapshot.registry;
        *position = snapshot.position;
        for (strategy, book) in self.strategies.iter().zip(snapshot.books) {
            strategy.restore(book);
        }
    }
}

struct Snapshot {
    vault: VaultState,
    registry: StrategyRegistry,
    position: UserPosition,
    books: Vec<MockBook>,
}
