use anchor_lang::prelude::*;

use crate::{access, adapter::load_reserve_slots, engine, events::*};

use super::Allocate;

/// Realise one strategy's accrued yield (permissionless)
///
/// Every reserve holding vault capital must be among the remaining accounts:
/// losses are booked across all of them and they feed the vault-level
/// weighted APY.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>,
    strategy_id: Pubkey,
) -> Result<()> {
    let vault_key = ctx.accounts.vault_state.key();
    let caller = ctx.accounts.caller.key();
    let current_slot = Clock::get()?.slot;

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
    let report = engine::harvest(
        &mut ctx.accounts.vault_state,
        &mut ctx.accounts.strategy_registry,
        &mut slots,
        &strategy_id,
        current_slot,
    )?;

    access::unlock(&mut ctx.accounts.vault_state);

    msg!(
        "Harvested {} from {} at {} bps",
        report.harvested,
        strategy_id,
        report.apy_bps
    );
    let vault_state = &ctx.accounts.vault_state;
    record_activity(
        vault_key,
        vault_state,
        ActivityKind::Harvest,
        caller,
        report.harvested,
        Some(strategy_id),
    )?;
    record_degraded(vault_key, vault_state, caller, &report.degraded)
}
