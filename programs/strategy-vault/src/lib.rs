// Strategy Vault - share-accounting vault that allocates across weighted strategies
// Security: Checks-effects-interactions with a persisted in-progress lock around strategy CPIs
// Architecture: Registry + Whitelist for strategies, one reserve token account per strategy

use anchor_lang::prelude::*;

pub mod access;
pub mod adapter;
pub mod admin;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod guard;
pub mod instructions;
pub mod ledger;
pub mod state;

use instructions::*;
use state::{StrategyEntry, StrategyWeight, WithdrawPreview};

declare_id!("VAULTvgMLuVNhWKYA2oYzH5gcz6XxsjXrqvnxTJbG8F");

#[program]
pub mod strategy_vault {
    use super::*;

    /// Initialize a new vault for a given asset token
    ///
    /// Security considerations:
    /// - Validates authority is signer
    /// - Initializes vault state and strategy registry PDAs
    /// - Vault token account is owned by the vault authority PDA
    /// - `vault_id` lets several vaults (e.g. risk tiers) share one asset mint
    pub fn initialize(
        ctx: Context<Initialize>,
        vault_id: u8,
        withdrawal_fee_bps: u16,
    ) -> Result<()> {
        instructions::initialize::handler(ctx, vault_id, withdrawal_fee_bps)
    }

    /// Deposit assets into the vault and receive shares
    ///
    /// Security considerations:
    /// - Validates user token accounts (mint, owner)
    /// - Uses checked math for share calculation
    /// - Follows checks-effects-interactions pattern
    /// - New capital is deployed to the reserves passed as remaining accounts
    pub fn deposit<'info>(
        ctx: Context<'_, '_, 'info, 'info, Deposit<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::deposit::handler(ctx, amount)
    }

    /// Burn shares for assets, guarded by slippage and a slot deadline
    ///
    /// Security considerations:
    /// - Only the position owner can burn its shares
    /// - No state changes unless every check passes
    /// - Fails atomically if strategies cannot supply the payout
    pub fn withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Withdraw<'info>>,
        shares: u64,
        min_assets: u64,
        deadline: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, shares, min_assets, deadline)
    }

    /// Add a strategy to the registry or change its whitelist flag
    pub fn whitelist_strategy(
        ctx: Context<WhitelistStrategy>,
        strategy_id: Pubkey,
        name: String,
        allowed: bool,
    ) -> Result<()> {
        instructions::whitelist_strategy::handler(ctx, strategy_id, name, allowed)
    }

    /// Atomically replace the active weights; they must sum to 0 or 10000
    pub fn set_weights(ctx: Context<SetWeights>, weights: Vec<StrategyWeight>) -> Result<()> {
        instructions::set_weights::handler(ctx, weights)
    }

    pub fn emergency_pause(ctx: Context<SetPause>) -> Result<()> {
        instructions::set_pause::handler(ctx, true)
    }

    pub fn unpause(ctx: Context<SetPause>) -> Result<()> {
        instructions::set_pause::handler(ctx, false)
    }

    pub fn set_withdrawal_fee(ctx: Context<SetWithdrawalFee>, withdrawal_fee_bps: u16) -> Result<()> {
        instructions::set_withdrawal_fee::handler(ctx, withdrawal_fee_bps)
    }

    /// Permissionless keeper call
    pub fn rebalance<'info>(ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>) -> Result<()> {
        instructions::rebalance::handler(ctx)
    }

    /// Permissionless keeper call
    pub fn harvest<'info>(
        ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>,
        strategy_id: Pubkey,
    ) -> Result<()> {
        instructions::harvest::handler(ctx, strategy_id)
    }

    /// Owner-only drain of every strategy back to the vault; allowed while paused
    pub fn emergency_withdraw<'info>(
        ctx: Context<'_, '_, 'info, 'info, Allocate<'info>>,
    ) -> Result<()> {
        instructions::emergency_withdraw::handler(ctx)
    }

    pub fn get_balance(ctx: Context<PositionView>, user: Pubkey) -> Result<u64> {
        instructions::views::balance_of(ctx, user)
    }

    pub fn get_shares(ctx: Context<PositionView>, user: Pubkey) -> Result<u64> {
        instructions::views::shares_of(ctx, user)
    }

    pub fn get_total_value(ctx: Context<VaultView>) -> Result<u64> {
        instructions::views::total_value(ctx)
    }

    /// Assets per share scaled by 1_000_000
    pub fn get_share_price(ctx: Context<VaultView>) -> Result<u64> {
        instructions::views::share_price(ctx)
    }

    pub fn get_strategy_info(ctx: Context<VaultView>, strategy_id: Pubkey) -> Result<StrategyEntry> {
        instructions::views::strategy_info(ctx, strategy_id)
    }

    pub fn get_all_strategies(ctx: Context<VaultView>) -> Result<Vec<StrategyEntry>> {
        instructions::views::all_strategies(ctx)
    }

    pub fn preview_withdraw(ctx: Context<VaultView>, shares: u64) -> Result<WithdrawPreview> {
        instructions::views::quote_withdraw(ctx, shares)
    }
}
