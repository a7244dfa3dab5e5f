use anchor_lang::prelude::*;

use crate::constants::{
    HEALTH_PENALTY, HEALTH_RECOVERY, MAX_BPS, MAX_HEALTH, MAX_NAME_LEN, MAX_STRATEGIES,
};
use crate::errors::VaultError;

/// Whitelist and weight table for strategies
///
/// Security: only the vault owner reaches the mutating methods, and
/// `set_weights` validates the whole table before touching any entry, so the
/// active weight sum is always 0 or 10000.
#[account]
#[derive(Debug, PartialEq)]
pub struct StrategyRegistry {
    /// Vault this registry belongs to
    pub vault: Pubkey,              // 32 bytes

    /// Entries are never removed, only deactivated
    pub strategies: Vec<StrategyEntry>, // 4 + (n * STRATEGY_ENTRY_SIZE) bytes

    /// Bump seed for PDA
    pub bump: u8,                   // 1 byte
}

/// One row of a `set_weights` table
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrategyWeight {
    pub strategy_id: Pubkey,
    pub weight_bps: u16,
}

impl StrategyWeight {
    pub fn new(strategy_id: Pubkey, weight_bps: u16) -> Self {
        Self {
            strategy_id,
            weight_bps,
        }
    }
}

/// One strategy known to the vault
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq)]
pub struct StrategyEntry {
    /// Reserve token account that holds the strategy's capital
    pub id: Pubkey,

    /// Human-readable name (e.g., "Lending", "Stable LP")
    pub name: String,

    pub whitelisted: bool,
    pub active: bool,

    /// Share of total assets targeted at this strategy
    pub weight_bps: u16,

    /// 0-100; lowered on every strategy-local failure
    pub health_score: u8,

    /// Lifetime yield harvested
    pub total_earned: u64,

    pub last_harvest_slot: u64,

    /// Principal placed into the strategy by the vault
    pub deployed: u64,

    /// Realised APY from the last harvest
    pub apy_bps: u16,
}

impl StrategyEntry {
    pub fn new(id: Pubkey, name: String, current_slot: u64) -> Self {
        Self {
            id,
            name,
            whitelisted: false,
            active: false,
            weight_bps: 0,
            health_score: MAX_HEALTH,
            total_earned: 0,
            last_harvest_slot: current_slot,
            deployed: 0,
            apy_bps: 0,
        }
    }

    pub fn degrade(&mut self) {
        self.health_score = self.health_score.saturating_sub(HEALTH_PENALTY);
    }

    pub fn recover(&mut self) {
        self.health_score = self
            .health_score
            .saturating_add(HEALTH_RECOVERY)
            .min(MAX_HEALTH);
    }
}

impl StrategyRegistry {
    pub fn get(&self, id: &Pubkey) -> Option<&StrategyEntry> {
        self.strategies.iter().find(|s| s.id == *id)
    }

    pub fn get_mut(&mut self, id: &Pubkey) -> Option<&mut StrategyEntry> {
        self.strategies.iter_mut().find(|s| s.id == *id)
    }

    pub fn entry(&self, id: &Pubkey) -> Result<&StrategyEntry> {
        self.get(id).ok_or(error!(VaultError::StrategyNotFound))
    }

    pub fn entry_mut(&mut self, id: &Pubkey) -> Result<&mut StrategyEntry> {
        self.get_mut(id).ok_or(error!(VaultError::StrategyNotFound))
    }

    pub fn is_whitelisted(&self, id: &Pubkey) -> bool {
        self.get(id).map(|s| s.whitelisted).unwrap_or(false)
    }

    pub fn active_weight_sum(&self) -> u64 {
        self.strategies
            .iter()
            .filter(|s| s.active)
            .map(|s| s.weight_bps as u64)
            .sum()
    }

    /// Principal deployed across every strategy
    pub fn total_deployed(&self) -> Result<u64> {
        self.strategies.iter().try_fold(0u64, |acc, s| {
            acc.checked_add(s.deployed)
                .ok_or(error!(VaultError::MathOverflow))
        })
    }

    /// Set the whitelist flag, registering the strategy on first use
    pub fn whitelist(
        &mut self,
        id: Pubkey,
        name: &str,
        allowed: bool,
        current_slot: u64,
    ) -> Result<()> {
        require!(name.len() <= MAX_NAME_LEN, VaultError::NameTooLong);

        if let Some(entry) = self.get_mut(&id) {
            require!(allowed || !entry.active, VaultError::StrategyStillActive);
            entry.whitelisted = allowed;
            return Ok(());
        }

        require!(
            self.strategies.len() < MAX_STRATEGIES,
            VaultError::RegistryFull
        );

        let mut entry = StrategyEntry::new(id, name.to_string(), current_slot);
        entry.whitelisted = allowed;
        self.strategies.push(entry);
        Ok(())
    }

    /// Replace the active weight table
    ///
    /// Every named strategy becomes active with its weight; every other
    /// strategy becomes inactive with weight 0. Nothing changes on failure.
    pub fn set_weights(&mut self, weights: &[StrategyWeight]) -> Result<()> {
        let mut sum: u64 = 0;
        for (i, row) in weights.iter().enumerate() {
            require!(
                self.is_whitelisted(&row.strategy_id),
                VaultError::StrategyNotWhitelisted
            );
            require!(
                !weights[..i]
                    .iter()
                    .any(|other| other.strategy_id == row.strategy_id),
                VaultError::InvalidWeights
            );
            require!(row.weight_bps as u64 <= MAX_BPS, VaultError::InvalidWeights);
            sum += row.weight_bps as u64;
        }
        require!(sum == 0 || sum == MAX_BPS, VaultError::InvalidWeights);

        for entry in self.strategies.iter_mut() {
            match weights.iter().find(|row| row.strategy_id == entry.id) {
                Some(row) => {
                    entry.active = true;
                    entry.weight_bps = row.weight_bps;
                }
                None => {
                    entry.active = false;
                    entry.weight_bps = 0;
                }
            }
        }
        Ok(())
    }
}
