use anchor_lang::prelude::*;

use crate::{admin, constants::*, events::*, state::*};

/// Register a strategy reserve or change its whitelist flag
#[derive(Accounts)]
pub struct WhitelistStrategy<'info> {
    /// Security: checked against vault_state.authority in the handler
    pub caller: Signer<'info>,

    #[account(
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
}

pub fn handler(
    ctx: Context<WhitelistStrategy>,
    strategy_id: Pubkey,
    name: String,
    allowed: bool,
) -> Result<()> {
    let vault_state = &ctx.accounts.vault_state;
    let caller = ctx.accounts.caller.key();

    admin::whitelist_strategy(
        vault_state,
        &mut ctx.accounts.strategy_registry,
        &caller,
        strategy_id,
        &name,
        allowed,
        Clock::get()?.slot,
    )?;

    record_activity(
        vault_state.key(),
        vault_state,
        ActivityKind::WhitelistStrategy,
        caller,
        allowed as u64,
        Some(strategy_id),
    )
}
