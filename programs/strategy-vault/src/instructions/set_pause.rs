use anchor_lang::prelude::*;

use crate::{access, constants::*, events::*, state::*};

/// Flip the emergency pause flag
#[derive(Accounts)]
pub struct SetPause<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetPause>, paused: bool) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let caller = ctx.accounts.caller.key();
    let vault_state = &mut ctx.accounts.vault_state;

    let kind = if paused {
        access::pause(vault_state, &caller)?;
        ActivityKind::Pause
    } else {
        access::unpause(vault_state, &caller)?;
        ActivityKind::Unpause
    };

    record_activity(vault_key, vault_state, kind, caller, 0, None)
}
