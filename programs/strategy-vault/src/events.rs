use anchor_lang::prelude::*;

use crate::state::VaultState;

/// What a `VaultActivity` event records
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityKind {
    Deposit,
    Withdraw,
    Rebalance,
    Harvest,
    WhitelistStrategy,
    SetWeights,
    Pause,
    Unpause,
    EmergencyWithdraw,
    FeeUpdated,
    StrategyDegraded,
}

/// Event emitted when a new vault is initialized
#[event]
pub struct VaultInitialized {
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub asset_mint: Pubkey,
    pub vault_id: u8,
    pub withdrawal_fee_bps: u16,
    pub block_height: u64,
}

/// Event emitted by every state-changing instruction
#[event]
pub struct VaultActivity {
    pub vault: Pubkey,
    pub kind: ActivityKind,
    pub actor: Pubkey,
    pub amount: u64,
    pub strategy_id: Option<Pubkey>,
    pub block_height: u64,
    pub total_assets: u64,
    pub total_shares: u64,
}

/// Emit a `VaultActivity` stamped with the current slot
pub fn record_activity(
    vault_key: Pubkey,
    vault: &VaultState,
    kind: ActivityKind,
    actor: Pubkey,
    amount: u64,
    strategy_id: Option<Pubkey>,
) -> Result<()> {
    emit!(VaultActivity {
        vault: vault_key,
        kind,
        actor,
        amount,
        strategy_id,
        block_height: Clock::get()?.slot,
        total_assets: vault.total_assets,
        total_shares: vault.total_shares,
    });
    Ok(())
}

/// One `StrategyDegraded` event per strategy the engine excluded this pass
pub fn record_degraded(
    vault_key: Pubkey,
    vault: &VaultState,
    actor: Pubkey,
    degraded: &[Pubkey],
) -> Result<()> {
    for id in degraded {
        record_activity(
            vault_key,
            vault,
            ActivityKind::StrategyDegraded,
            actor,
            0,
            Some(*id),
        )?;
    }
    Ok(())
}
