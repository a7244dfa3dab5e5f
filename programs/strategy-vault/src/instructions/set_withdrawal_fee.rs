use anchor_lang::prelude::*;

use crate::{admin, constants::*, events::*, state::*};

#[derive(Accounts)]
pub struct SetWithdrawalFee<'info> {
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault_state.asset_mint.as_ref(), &[vault_state.vault_id]],
        bump = vault_state.bump,
    )]
    pub vault_state: Account<'info, VaultState>,
}

pub fn handler(ctx: Context<SetWithdrawalFee>, withdrawal_fee_bps: u16) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let caller = ctx.accounts.caller.key();
    let vault_state = &mut ctx.accounts.vault_state;

    admin::set_withdrawal_fee(vault_state, &caller, withdrawal_fee_bps)?;

    record_activity(
        vault_key,
        vault_state,
        ActivityKind::FeeUpdated,
        caller,
        withdrawal_fee_bps as u64,
        None,
    )
}
