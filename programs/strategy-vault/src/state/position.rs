use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Shares owned by one user in one vault
///
/// Shares live only here (no share mint), so the sum of all positions is the
/// vault's `total_shares` and only the owner can burn them.
#[account]
#[derive(Debug, PartialEq)]
pub struct UserPosition {
    /// Vault this position belongs to
    pub vault: Pubkey,              // 32 bytes

    /// Wallet that owns the shares
    pub owner: Pubkey,              // 32 bytes

    /// Shares held
    pub shares: u64,                // 8 bytes

    /// Bump seed for PDA
    pub bump: u8,                   // 1 byte
}

impl UserPosition {
    pub fn credit(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_add(shares)
            .ok_or(error!(VaultError::MathOverflow))?;
        Ok(())
    }

    pub fn debit(&mut self, shares: u64) -> Result<()> {
        self.shares = self
            .shares
            .checked_sub(shares)
            .ok_or(error!(VaultError::InsufficientShares))?;
        Ok(())
    }
}
