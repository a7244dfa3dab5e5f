use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::{
    access, adapter::load_reserve_slots, constants::*, engine, errors::*, events::*, ledger,
    state::*,
};

/// Deposit assets into the vault and receive shares
///
/// Security checklist:
/// ✅ 1. SIGNER VALIDATION: User must be signer
/// ✅ 2. ACCOUNT OWNERSHIP: Vault, registry and position PDAs validated with seeds
/// ✅ 6. MATH SAFETY: Uses checked operations for share calculation
/// ✅ 7. TOKEN ACCOUNT VALIDATION: Validates mint and owner
/// ✅ 8. BUSINESS LOGIC: Checks-effects-interactions pattern, lock held across CPIs
/// ✅ 10. EVENTS: Emits VaultActivity
///
/// Strategy reserves to deploy into are passed as remaining accounts.
#[derive(Accounts)]
pub struct Deposit<'info> {
    /// User depositing assets
    /// Security: Must be signer
    #[account(mut)]
    pub user: Signer<'info>,

    /// Vault state PDA
    /// Security: Validated by seeds, contains authority and totals
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

    /// User's share position, created on first deposit
    #[account(
        init_if_needed,
        payer = user,
        space = USER_POSITION_SIZE,
        seeds = [POSITION_SEED, vault_state.key().as_ref(), user.key().as_ref()],
        bump
    )]
    pub position: Account<'info, UserPosition>,

    /// Vault authority PDA
    /// CHECK: PDA used as authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.authority_bump,
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// User's asset token account (source)
    /// Security: Must be owned by user and correct mint
    #[account(
        mut,
        constraint = user_asset_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = user_asset_account.owner == user.key() @ VaultError::InvalidOwner,
    )]
    pub user_asset_account: Account<'info, TokenAccount>,

    /// Vault's token account
    /// Security: Must be correct mint and owned by vault_authority
    #[account(
        mut,
        constraint = vault_token_account.mint == vault_state.asset_mint @ VaultError::InvalidMint,
        constraint = vault_token_account.owner == vault_authority.key() @ VaultError::InvalidOwner,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
    amount: u64,
) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let user_key = ctx.accounts.user.key();

    let position = &mut ctx.accounts.position;
    if position.owner == Pubkey::default() {
        position.vault = vault_key;
        position.owner = user_key;
        position.bump = ctx.bumps.position;
    }

    access::enter(&mut ctx.accounts.vault_state)?;

    let mut slots = load_reserve_slots(
        ctx.remaining_accounts,
        &ctx.accounts.strategy_registry,
        &ctx.accounts.vault_state,
        &ctx.accounts.vault_authority.to_account_info(),
        &ctx.accounts.vault_token_account.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
    )?;

    // CHECKS + EFFECTS: book losses and mint shares before any external call
    let minted = ledger::deposit(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut ctx.accounts.position,
        &slots,
        amount,
    )?;
    ctx.accounts.vault_state.exit(&crate::ID)?;
    ctx.accounts.strategy_registry.exit(&crate::ID)?;
    ctx.accounts.position.exit(&crate::ID)?;

    // INTERACTIONS: Transfer assets from user to vault, then deploy
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.user_asset_account.to_account_info(),
            to: ctx.accounts.vault_token_account.to_account_info(),
            authority: ctx.accounts.user.to_account_info(),
        },
    );
    token::transfer(transfer_ctx, amount)?;

    let report = engine::rebalance(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut slots,
    )?;

    access::unlock(&mut ctx.accounts.vault_state);

    msg!("Minted {} shares for {}", minted, amount);
    let vault_state = &ctx.accounts.vault_state;
    record_activity(vault_key, vault_state, ActivityKind::Deposit, user_key, amount, None)?;
    record_degraded(vault_key, vault_state, user_key, &report.degraded)?;

    Ok(())
}
