use anchor_lang::prelude::*;

use crate::errors::VaultError;

/// Deadline is inclusive: a withdrawal landing in slot `deadline` is accepted
pub fn check_deadline(current_slot: u64, deadline: u64) -> Result<()> {
    require!(current_slot <= deadline, VaultError::DeadlineExpired);
    Ok(())
}

pub fn check_slippage(payout: u64, min_assets: u64) -> Result<()> {
    require!(payout >= min_assets, VaultError::SlippageExceeded);
    Ok(())
}
