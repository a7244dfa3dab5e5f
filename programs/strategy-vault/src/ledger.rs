use anchor_lang::prelude::*;

use crate::access;
use crate::adapter::StrategySlot;
use crate::engine;
use crate::errors::VaultError;
use crate::guard;
use crate::state::{StrategyRegistry, UserPosition, VaultState, WithdrawPreview};

/// Arguments of a withdrawal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub shares: u64,
    /// Smallest net payout the caller accepts
    pub min_assets: u64,
    /// Last slot in which the withdrawal may land
    pub deadline: u64,
}

/// Mint shares for `amount` of newly deposited assets
///
/// Security:
/// - Strategy losses are booked first, so new money never buys in at a stale
///   price
/// - Rejects deposits too small to mint a share, so a donation-inflated price
///   cannot swallow a deposit
/// - Assets land in `idle_assets` until the engine deploys them
pub fn deposit(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    position: &mut UserPosition,
    slots: &[StrategySlot],
    amount: u64,
) -> Result<u64> {
    access::require_unpaused(vault)?;
    require!(amount > 0, VaultError::ZeroAmount);

    engine::book_losses(vault, registry, slots)?;
    let minted = vault.calculate_shares(amount)?;
    require!(minted > 0, VaultError::ZeroAmount);

    vault.total_assets = vault
        .total_assets
        .checked_add(amount)
        .ok_or(error!(VaultError::MathOverflow))?;
    vault.total_shares = vault
        .total_shares
        .checked_add(minted)
        .ok_or(error!(VaultError::MathOverflow))?;
    vault.idle_assets = vault
        .idle_assets
        .checked_add(amount)
        .ok_or(error!(VaultError::MathOverflow))?;
    position.credit(minted)?;

    Ok(minted)
}

/// Burn shares and book the payout
///
/// Every caller check runs before the first write. Strategy losses are booked
/// before the quote so an early exit cannot leave them to later holders. The
/// returned quote's `net_amount` is owed to the caller and still has to be
/// sourced with `engine::source_payout`; the fee stays in `total_assets`.
pub fn withdraw(
    vault: &mut VaultState,
    registry: &mut StrategyRegistry,
    position: &mut UserPosition,
    slots: &[StrategySlot],
    caller: &Pubkey,
    request: WithdrawRequest,
    current_slot: u64,
) -> Result<WithdrawPreview> {
    access::require_unpaused(vault)?;
    require_keys_eq!(position.owner, *caller, VaultError::NotAuthorized);
    require!(request.shares > 0, VaultError::ZeroAmount);
    require!(
        request.shares <= position.shares,
        VaultError::InsufficientShares
    );
    guard::check_deadline(current_slot, request.deadline)?;

    engine::book_losses(vault, registry, slots)?;
    let quote = vault.preview_withdraw(request.shares, current_slot)?;
    guard::check_slippage(quote.net_amount, request.min_assets)?;

    let liquidity = engine::available_liquidity(vault, registry, slots)?;
    require!(
        liquidity >= quote.net_amount,
        VaultError::InsufficientLiquidity
    );

    position.debit(request.shares)?;
    vault.total_shares = vault
        .total_shares
        .checked_sub(request.shares)
        .ok_or(error!(VaultError::MathOverflow))?;
    vault.total_assets = vault
        .total_assets
        .checked_sub(quote.net_amount)
        .ok_or(error!(VaultError::MathOverflow))?;

    Ok(quote)
}
