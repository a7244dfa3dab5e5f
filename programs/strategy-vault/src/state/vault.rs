use anchor_lang::prelude::*;

use crate::constants::{MAX_BPS, SCALE};
use crate::errors::VaultError;

/// Global vault state tracking assets and shares
///
/// Security considerations:
/// - Authority stored in state (not instruction args)
/// - `total_assets` is tracked, never read from a token balance, so tokens
///   donated to the vault token account cannot move the share price
/// - `locked` is persisted before any strategy CPI so a reentrant call sees it
/// - 64 bytes padding for future upgrades
#[account]
#[derive(Debug, PartialEq)]
pub struct VaultState {
    /// Owner: can pause, manage the strategy registry and set the fee
    pub authority: Pubkey,          // 32 bytes

    /// Mint of the underlying asset token
    pub asset_mint: Pubkey,         // 32 bytes

    /// Tells apart vaults over the same mint (e.g. risk tiers)
    pub vault_id: u8,               // 1 byte

    /// Net assets owned by shareholders (idle + deployed)
    pub total_assets: u64,          // 8 bytes

    /// Total shares issued to depositors
    pub total_shares: u64,          // 8 bytes

    /// Part of `total_assets` sitting in the vault token account
    pub idle_assets: u64,           // 8 bytes

    /// Emergency pause flag
    pub paused: bool,               // 1 byte

    /// Transaction-scoped in-progress guard
    pub locked: bool,               // 1 byte

    /// Fee kept by the vault on withdrawals
    pub withdrawal_fee_bps: u16,    // 2 bytes

    /// Balance-weighted APY across strategies, refreshed on harvest
    pub weighted_apy_bps: u16,      // 2 bytes

    /// Bump seed for vault state PDA
    pub bump: u8,                   // 1 byte

    /// Bump seed for vault authority PDA
    pub authority_bump: u8,         // 1 byte

    // Padding for future upgrades
    pub _reserved: [u8; 64],        // 64 bytes
}

/// Quote for burning a number of shares
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WithdrawPreview {
    pub shares: u64,
    pub gross_amount: u64,
    pub fee: u64,
    pub net_amount: u64,
    pub current_slot: u64,
}

impl VaultState {
    /// Calculate shares to mint for a given asset amount
    ///
    /// ERC-4626 formula:
    /// - If first deposit: shares = assets
    /// - Otherwise: shares = assets * totalShares / totalAssets
    ///
    /// Rounds down so existing holders never lose value. Fails when strategy
    /// losses wiped out every asset behind outstanding shares.
    pub fn calculate_shares(&self, assets: u64) -> Result<u64> {
        // First deposit: 1:1 ratio
        if self.total_shares == 0 {
            return Ok(assets);
        }
        require!(self.total_assets > 0, VaultError::VaultInsolvent);

        mul_div(assets, self.total_shares, self.total_assets)
    }

    /// Calculate asset value of shares
    ///
    /// ERC-4626 formula: assets = shares * totalAssets / totalShares
    pub fn calculate_assets(&self, shares: u64) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(0);
        }

        mul_div(shares, self.total_assets, self.total_shares)
    }

    /// Assets per share scaled by `SCALE`; 1:1 on an empty vault
    pub fn share_price(&self) -> Result<u64> {
        if self.total_shares == 0 {
            return Ok(SCALE);
        }

        mul_div(self.total_assets, SCALE, self.total_shares)
    }

    /// Gross value, fee and net payout for burning `shares`
    ///
    /// The fee is waived when every outstanding share is burned, otherwise the
    /// fee would be stranded in a vault with no shares.
    pub fn preview_withdraw(&self, shares: u64, current_slot: u64) -> Result<WithdrawPreview> {
        let gross_amount = self.calculate_assets(shares)?;

        let fee = if shares >= self.total_shares {
            0
        } else {
            mul_div(gross_amount, self.withdrawal_fee_bps as u64, MAX_BPS)?
        };

        let net_amount = gross_amount
            .checked_sub(fee)
            .ok_or(error!(VaultError::MathOverflow))?;

        Ok(WithdrawPreview {
            shares,
            gross_amount,
            fee,
            net_amount,
            current_slot,
        })
    }
}

/// `a * b / c` through a u128 intermediate, rounding down
pub fn mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    let value = (a as u128)
        .checked_mul(b as u128)
        .ok_or(error!(VaultError::MathOverflow))?
        .checked_div(c as u128)
        .ok_or(error!(VaultError::MathOverflow))?;

    u64::try_from(value).map_err(|_| error!(VaultError::MathOverflow))
}
