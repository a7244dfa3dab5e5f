use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::{
    access, adapter::load_reserve_slots, constants::*, engine, errors::*, events::*, state::*,
};

/// Accounts shared by every instruction that moves capital between the vault
/// and its strategies
///
/// Strategy reserves are passed as remaining accounts and validated by
/// `load_reserve_slots`.
#[derive(Accounts)]
pub struct Allocate<'info> {
    /// Keeper for rebalance and harvest, owner for emergency_withdraw
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump = strategy_registry.bump,
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Move capital toward the current weight table (permissionless)
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let caller = ctx.accounts.caller.key();

    access::enter(&mut ctx.accounts.vault_state)?;
    ctx.accounts.vault_state.exit(&crate::ID)?;

    let mut slots = load_reserve_slots(
        ctx.remaining_accounts,
        &ctx.accounts.strategy_registry,
        &ctx.accounts.vault_state,
        &ctx.accounts.vault_authority.to_account_info(),
        &ctx.accounts.vault_token_account.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
    )?;
    let report = engine::rebalance(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut slots,
    )?;

    access::unlock(&mut ctx.accounts.vault_state);

    let vault_state = &ctx.accounts.vault_state;
    record_activity(
        vault_key,
        vault_state,
        ActivityKind::Rebalance,
        caller,
        report.deployed.saturating_add(report.recalled),
        None,
    )?;
    record_degraded(vault_key, vault_state, caller, &report.degraded)
}
