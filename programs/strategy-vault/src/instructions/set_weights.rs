use anchor_lang::prelude::*;

use crate::{admin, constants::*, events::*, state::*};

/// Replace the active weight table
#[derive(Accounts)]
pub struct SetWeights<'info> {
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

pub fn handler(ctx: Context<SetWeights>, weights: Vec<StrategyWeight>) -> Result<()> {
    let vault_state = &ctx.accounts.vault_state;
    let caller = ctx.accounts.caller.key();

    admin::set_weights(
        vault_state,
        &mut ctx.accounts.strategy_registry,
        &caller,
        &weights,
    )?;

    record_activity(
        vault_state.key(),
        vault_state,
        ActivityKind::SetWeights,
        caller,
        ctx.accounts.strategy_registry.active_weight_sum(),
        None,
    )
}
