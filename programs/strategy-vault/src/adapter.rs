use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::constants::VAULT_AUTHORITY_SEED;
use crate::errors::VaultError;
use crate::state::{StrategyEntry, StrategyRegistry, VaultState};

/// Snapshot a strategy reports about itself
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdapterInfo {
    pub health_score: u8,
    pub total_earned: u64,
    pub active: bool,
}

/// Contract every strategy module satisfies
///
/// Any `Err` is a strategy-local failure: the engine downgrades the strategy's
/// health and leaves it out of the current pass.
pub trait StrategyAdapter {
    /// Base-asset units currently held by the strategy, accrued yield included
    fn get_balance(&self) -> Result<u64>;

    /// Expected annual yield in basis points
    fn estimate_apy(&self) -> Result<u16>;

    fn get_info(&self) -> Result<AdapterInfo>;

    /// Move `amount` from the vault's idle balance into the strategy
    fn deposit_into(&mut self, amount: u64) -> Result<()>;

    /// Move up to `amount` back to the vault; returns what actually arrived
    fn withdraw_from(&mut self, amount: u64) -> Result<u64>;

    /// Called after a harvest realised `apy_bps`
    fn on_harvest(&mut self, _apy_bps: u16) {}
}

/// A strategy handle paired with its registry id
pub struct StrategySlot<'a> {
    pub id: Pubkey,
    pub handle: Box<dyn StrategyAdapter + 'a>,
}

impl<'a> StrategySlot<'a> {
    pub fn new(id: Pubkey, handle: impl StrategyAdapter + 'a) -> Self {
        Self {
            id,
            handle: Box::new(handle),
        }
    }
}

/// Strategy backed by a reserve token account owned by the vault authority PDA
///
/// The external protocol credits yield to the reserve; the vault moves
/// principal in and out with PDA-signed SPL transfers. Every failure the
/// adapter can foresee is reported before the CPI so it stays strategy-local.
pub struct TokenReserveAdapter<'info> {
    reserve: AccountInfo<'info>,
    vault_token_account: AccountInfo<'info>,
    vault_authority: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    asset_mint: Pubkey,
    vault_id: u8,
    authority_bump: u8,
    apy_bps: u16,
    health_score: u8,
    total_earned: u64,
}

impl<'info> TokenReserveAdapter<'info> {
    fn transfer(
        &self,
        from: &AccountInfo<'info>,
        to: &AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        let vault_id = [self.vault_id];
        let authority_bump = [self.authority_bump];
        let authority_seeds: &[&[u8]] = &[
            VAULT_AUTHORITY_SEED,
            self.asset_mint.as_ref(),
            &vault_id,
            &authority_bump,
        ];
        let signer_seeds = &[&authority_seeds[..]];

        let transfer_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            Transfer {
                from: from.clone(),
                to: to.clone(),
                authority: self.vault_authority.clone(),
            },
            signer_seeds,
        );
        token::transfer(transfer_ctx, amount)
    }
}

impl<'info> StrategyAdapter for TokenReserveAdapter<'info> {
    fn get_balance(&self) -> Result<u64> {
        Ok(read_token_account(&self.reserve)?.amount)
    }

    fn estimate_apy(&self) -> Result<u16> {
        Ok(self.apy_bps)
    }

    fn get_info(&self) -> Result<AdapterInfo> {
        let frozen = read_token_account(&self.reserve)?.is_frozen();
        Ok(AdapterInfo {
            health_score: self.health_score,
            total_earned: self.total_earned,
            active: !frozen,
        })
    }

    fn deposit_into(&mut self, amount: u64) -> Result<()> {
        let reserve = read_token_account(&self.reserve)?;
        let vault = read_token_account(&self.vault_token_account)?;
        require!(
            !reserve.is_frozen() && !vault.is_frozen() && vault.amount >= amount,
            VaultError::StrategyUnavailable
        );

        self.transfer(&self.vault_token_account, &self.reserve, amount)
    }

    fn withdraw_from(&mut self, amount: u64) -> Result<u64> {
        let reserve = read_token_account(&self.reserve)?;
        require!(
            !reserve.is_frozen() && reserve.amount >= amount,
            VaultError::StrategyUnavailable
        );

        self.transfer(&self.reserve, &self.vault_token_account, amount)?;
        Ok(amount)
    }

    fn on_harvest(&mut self, apy_bps: u16) {
        self.apy_bps = apy_bps;
    }
}

fn read_token_account(account: &AccountInfo) -> Result<TokenAccount> {
    let data = account.try_borrow_data()?;
    TokenAccount::try_deserialize(&mut &data[..])
}

/// Build one slot per reserve passed in `remaining_accounts`
///
/// Security: each reserve must be a registered strategy, hold the vault's
/// asset mint, be owned by the vault authority PDA and appear only once.
pub fn load_reserve_slots<'info>(
    remaining_accounts: &[AccountInfo<'info>],
    registry: &StrategyRegistry,
    vault: &VaultState,
    vault_authority: &AccountInfo<'info>,
    vault_token_account: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
) -> Result<Vec<StrategySlot<'info>>> {
    let mut slots: Vec<StrategySlot<'info>> = Vec::with_capacity(remaining_accounts.len());

    for reserve in remaining_accounts {
        let entry: &StrategyEntry = registry.entry(reserve.key)?;
        require!(
            !slots.iter().any(|s| s.id == entry.id),
            VaultError::DuplicateStrategy
        );
        require_keys_eq!(*reserve.owner, token::ID, VaultError::InvalidOwner);

        let account = read_token_account(reserve)?;
        require_keys_eq!(account.mint, vault.asset_mint, VaultError::InvalidMint);
        require_keys_eq!(account.owner, *vault_authority.key, VaultError::InvalidOwner);

        slots.push(StrategySlot::new(
            entry.id,
            TokenReserveAdapter {
                reserve: reserve.clone(),
                vault_token_account: vault_token_account.clone(),
                vault_authority: vault_authority.clone(),
                token_program: token_program.clone(),
                asset_mint: vault.asset_mint,
                vault_id: vault.vault_id,
                authority_bump: vault.authority_bump,
                apy_bps: entry.apy_bps,
                health_score: entry.health_score,
                total_earned: entry.total_earned,
            },
        ));
    }

    Ok(slots)
}
