use anchor_lang::prelude::*;

use crate::{access, adapter::load_reserve_slots, engine, events::*};

use super::Allocate;

/// Pull every strategy's principal back to the vault
///
/// Security: owner-only, and the one capital-moving path that stays open
/// while the vault is paused.
pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let caller = ctx.accounts.caller.key();

    access::require_owner(&ctx.accounts.vault_state, &caller)?;
    access::lock(&mut ctx.accounts.vault_state)?;
    ctx.accounts.vault_state.exit(&crate::ID)?;

    let mut slots = load_reserve_slots(
        ctx.remaining_accounts,
        &ctx.accounts.strategy_registry,
        &ctx.accounts.vault_state,
        &ctx.accounts.vault_authority.to_account_info(),
        &ctx.accounts.vault_token_account.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
    )?;
    let report = engine::recall_all(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut slots,
    )?;

    access::unlock(&mut ctx.accounts.vault_state);

    msg!("Emergency recall of {} into idle", report.recalled);
    let vault_state = &ctx.accounts.vault_state;
    record_activity(
        vault_key,
        vault_state,
        ActivityKind::EmergencyWithdraw,
        caller,
        report.recalled,
        None,
    )?;
    record_degraded(vault_key, vault_state, caller, &report.degraded)
}
