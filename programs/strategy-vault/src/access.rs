use anchor_lang::prelude::*;

use crate::errors::VaultError;
use crate::state::VaultState;

pub fn require_owner(vault: &VaultState, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(*caller, vault.authority, VaultError::NotAuthorized);
    Ok(())
}

pub fn require_unpaused(vault: &VaultState) -> Result<()> {
    require!(!vault.paused, VaultError::Paused);
    Ok(())
}

pub fn pause(vault: &mut VaultState, caller: &Pubkey) -> Result<()> {
    require_owner(vault, caller)?;
    vault.paused = true;
    Ok(())
}

pub fn unpause(vault: &mut VaultState, caller: &Pubkey) -> Result<()> {
    require_owner(vault, caller)?;
    vault.paused = false;
    Ok(())
}

/// Take the in-progress guard before calling into strategies
///
/// Handlers persist the vault right after taking it, so a strategy that calls
/// back into the program observes `locked == true`.
pub fn lock(vault: &mut VaultState) -> Result<()> {
    require!(!vault.locked, VaultError::OperationInProgress);
    vault.locked = true;
    Ok(())
}

pub fn unlock(vault: &mut VaultState) {
    vault.locked = false;
}

/// Pause check, then the in-progress guard
///
/// Capital-moving handlers call this before reading any remaining account, so
/// a paused vault answers `Paused` whatever reserves are passed.
pub fn enter(vault: &mut VaultState) -> Result<()> {
    require_unpaused(vault)?;
    lock(vault)
}
