use anchor_lang::prelude::*;

use crate::access;
use crate::constants::MAX_WITHDRAWAL_FEE_BPS;
use crate::errors::VaultError;
use crate::state::{StrategyRegistry, StrategyWeight, VaultState};

/// Registry and fee changes are owner-only and refused while paused
fn require_active_owner(vault: &VaultState, caller: &Pubkey) -> Result<()> {
    access::require_owner(vault, caller)?;
    access::require_unpaused(vault)
}

pub fn whitelist_strategy(
    vault: &VaultState,
    registry: &mut StrategyRegistry,
    caller: &Pubkey,
    strategy_id: Pubkey,
    name: &str,
    allowed: bool,
    current_slot: u64,
) -> Result<()> {
    require_active_owner(vault, caller)?;
    registry.whitelist(strategy_id, name, allowed, current_slot)
}

pub fn set_weights(
    vault: &VaultState,
    registry: &mut StrategyRegistry,
    caller: &Pubkey,
    weights: &[StrategyWeight],
) -> Result<()> {
    require_active_owner(vault, caller)?;
    registry.set_weights(weights)
}

pub fn set_withdrawal_fee(
    vault: &mut VaultState,
    caller: &Pubkey,
    withdrawal_fee_bps: u16,
) -> Result<()> {
    require_active_owner(vault, caller)?;
    require!(
        withdrawal_fee_bps <= MAX_WITHDRAWAL_FEE_BPS,
        VaultError::InvalidFee
    );

    vault.withdrawal_fee_bps = withdrawal_fee_bps;
    Ok(())
}
