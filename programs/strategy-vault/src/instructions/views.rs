use anchor_lang::prelude::*;

use crate::{constants::*, errors::*, state::*};

/// Read-only access to the vault and its strategies
///
/// Views never write and stay available while the vault is paused.
#[derive(Accounts)]
pub struct VaultView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,
}

#[derive(Accounts)]
#[instruction(user: Pubkey)]
pub struct PositionView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    /// User's position PDA; may not exist yet
    /// CHECK: address validated by seeds, contents read only if owned by this program
    #[account(
        seeds = [POSITION_SEED, vault_state.key().as_ref(), user.as_ref()],
        bump,
    )]
    pub position: UncheckedAccount<'info>,
}

fn position_shares(position: &AccountInfo) -> Result<u64> {
    if position.data_is_empty() {
        return Ok(0);
    }
    require_keys_eq!(*position.owner, crate::ID, VaultError::InvalidOwner);

    let data = position.try_borrow_data()?;
    Ok(UserPosition::try_deserialize(&mut &data[..])?.shares)
}

pub fn shares_of(ctx: Context<PositionView>, _user: Pubkey) -> Result<u64> {
    position_shares(&ctx.accounts.position)
}

/// Asset value of the user's shares
pub fn balance_of(ctx: Context<PositionView>, _user: Pubkey) -> Result<u64> {
    let shares = position_shares(&ctx.accounts.position)?;
    ctx.accounts.vault_state.calculate_assets(shares)
}

pub fn total_value(ctx: Context<VaultView>) -> Result<u64> {
    Ok(ctx.accounts.vault_state.total_assets)
}

pub fn share_price(ctx: Context<VaultView>) -> Result<u64> {
    ctx.accounts.vault_state.share_price()
}

pub fn strategy_info(ctx: Context<VaultView>, strategy_id: Pubkey) -> Result<StrategyEntry> {
    ctx.accounts
        .strategy_registry
        .entry(&strategy_id)
        .cloned()
}

pub fn all_strategies(ctx: Context<VaultView>) -> Result<Vec<StrategyEntry>> {
    Ok(ctx.accounts.strategy_registry.strategies.clone())
}

pub fn quote_withdraw(ctx: Context<VaultView>, shares: u64) -> Result<WithdrawPreview> {
    ctx.accounts
        .vault_state
        .preview_withdraw(shares, Clock::get()?.slot)
}
