use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{Mint, Token, TokenAccount},
};

use crate::{constants::*, errors::*, events::*, state::*};

/// Initialize a new vault for a given asset token
///
/// `vault_id` is part of the vault and authority seeds, so one mint can back
/// several vaults (e.g. conservative, balanced and growth tiers).
#[derive(Accounts)]
#[instruction(vault_id: u8)]
pub struct Initialize<'info> {
    /// Vault owner - can pause, manage strategies and set the fee
    /// Security: Must be signer, stored in state
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Vault state PDA
    /// Security: Initialized with proper space and padding for upgrades
    #[account(
        init,
        payer = authority,
        space = VAULT_STATE_SIZE,
        seeds = [VAULT_SEED, asset_mint.key().as_ref(), &[vault_id]],
        bump
    )]
    pub vault_state: Account<'info, VaultState>,

    /// Strategy registry PDA, sized for MAX_STRATEGIES entries up front
    #[account(
        init,
        payer = authority,
        space = STRATEGY_REGISTRY_SIZE,
        seeds = [REGISTRY_SEED, vault_state.key().as_ref()],
        bump
    )]
    pub strategy_registry: Account<'info, StrategyRegistry>,

    /// Asset token mint (the underlying token users deposit)
    /// Security: No constraints needed - any valid mint can have a vault
    pub asset_mint: Account<'info, Mint>,

    /// Vault authority PDA - owns the vault and strategy reserve token accounts
    /// CHECK: PDA used as token authority, validated by seeds
    #[account(
        seeds = [VAULT_AUTHORITY_SEED, asset_mint.key().as_ref(), &[vault_id]],
        bump
    )]
    pub vault_authority: UncheckedAccount<'info>,

    /// Vault's token account for idle assets
    /// Security: Owned by vault_authority PDA, correct mint
    #[account(
        init,
        payer = authority,
        associated_token::mint = asset_mint,
        associated_token::authority = vault_authority,
    )]
    pub vault_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>, vault_id: u8, withdrawal_fee_bps: u16) -> Result<()> {
    require!(
        withdrawal_fee_bps <= MAX_WITHDRAWAL_FEE_BPS,
        VaultError::InvalidFee
    );

    let vault_key = ctx.accounts.vault_state.key();

    let registry = &mut ctx.accounts.strategy_registry;
    registry.vault = vault_key;
    registry.strategies = Vec::new();
    registry.bump = ctx.bumps.strategy_registry;

    let vault_state = &mut ctx.accounts.vault_state;
    vault_state.authority = ctx.accounts.authority.key();
    vault_state.asset_mint = ctx.accounts.asset_mint.key();
    vault_state.vault_id = vault_id;
    vault_state.total_assets = 0;
    vault_state.total_shares = 0;
    vault_state.idle_assets = 0;
    vault_state.paused = false;
    vault_state.locked = false;
    vault_state.withdrawal_fee_bps = withdrawal_fee_bps;
    vault_state.weighted_apy_bps = 0;
    vault_state.bump = ctx.bumps.vault_state;
    vault_state.authority_bump = ctx.bumps.vault_authority;
    vault_state._reserved = [0; 64];

    emit!(VaultInitialized {
        vault: vault_key,
        authority: vault_state.authority,
        asset_mint: vault_state.asset_mint,
        vault_id,
        withdrawal_fee_bps,
        block_height: Clock::get()?.slot,
    });

    Ok(())
}
