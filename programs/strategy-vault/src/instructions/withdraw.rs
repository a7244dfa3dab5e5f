use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{
    access,
    adapter::load_reserve_slots,
    constants::*,
    engine,
    errors::*,
    events::*,
    ledger::{self, WithdrawRequest},
    state::*,
};

/// Burn shares and receive the underlying assets
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: User must be signer and own the position
/// ✅ 2. ACCOUNT OWNERSHIP: Position PDA derived from vault and user
/// ✅ 6. MATH SAFETY: u128 intermediates, rounding down
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Deadline, slippage and liquidity checked before any write
#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

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

    #[account(
        mut,
        seeds = [POSITION_SEED, vault_state.key().as_ref(), user.key().as_ref()],
        bump = position.bump,
    )]
    pub position: Account<'info, UserPosition>,

    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// User's asset token account (destination)
    #[account(
        mut,
        constraint = user_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
    shares: u64,
    min_assets: u64,
    deadline: u64,
) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let user_key = ctx.accounts.user.key();
    let current_slot = Clock::get()?.slot;

    access::enter(&mut ctx.accounts.vault_state)?;

    let mut slots = load_reserve_slots(
        ctx.remaining_accounts,
        &ctx.accounts.strategy_registry,
        &ctx.accounts.vault_state,
        &ctx.accounts.vault_authority.to_account_info(),
        &ctx.accounts.vault_token_account.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
    )?;

    // CHECKS + EFFECTS: book losses, burn shares and book the payout
    let quote = ledger::withdraw(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut ctx.accounts.position,
        &slots,
        &user_key,
        WithdrawRequest {
            shares,
            min_assets,
            deadline,
        },
        current_slot,
    )?;
    ctx.accounts.vault_state.exit(&crate::ID)?;
    ctx.accounts.strategy_registry.exit(&crate::ID)?;
    ctx.accounts.position.exit(&crate::ID)?;

    // INTERACTIONS: pull liquidity back from strategies, then pay out
    let report = engine::source_payout(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut slots,
        quote.net_amount,
    )?;

    let asset_mint_key = ctx.accounts.vault_state.asset_mint;
    let vault_id = ctx.accounts.vault_state.vault_id;
    let authority_bump = ctx.accounts.vault_state.authority_bump;
    let authority_seeds: &[&[u8]] = &[
        VAULT_AUTHORITY_SEED,
        asset_mint_key.as_ref(),
        &[vault_id],
        &[authority_bump],
    ];
    let signer_seeds = &[&authority_seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.vault_token_account.to_account_info(),
            to: ctx.accounts.user_asset_account.to_account_info(),
            authority: ctx.accounts.vault_authority.to_account_info(),
        },
        signer_seeds,
    );
    token::transfer(transfer_ctx, quote.net_amount)?;

    access::unlock(&mut ctx.accounts.vault_state);

    if quote.fee > 0 {
        msg!("Withdrawal fee {} retained", quote.fee);
    }
    let vault_state = &ctx.accounts.vault_state;
    record_activity(
        vault_key,
        vault_state,
        ActivityKind::Withdraw,
        user_key,
        quote.net_amount,
        None,
    )?;
    record_degraded(vault_key, vault_state, user_key, &report.degraded)?;

    Ok(())
}
