use anchor_lang::prelude::*;

/// Custom error codes for the Strategy Vault program
///
/// The first ten variants are the stable public taxonomy (codes 6000-6009).
/// New variants are only ever appended.
#[error_code]
pub enum VaultError {
    #[msg("Unauthorized - only the vault owner can perform this action")]
    NotAuthorized,

    #[msg("Vault is paused")]
    Paused,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Position holds fewer shares than requested")]
    InsufficientShares,

    #[msg("Withdrawal payout is below the requested minimum")]
    SlippageExceeded,

    #[msg("Withdrawal deadline has passed")]
    DeadlineExpired,

    #[msg("Strategies cannot supply enough liquidity for this withdrawal")]
    InsufficientLiquidity,

    #[msg("Strategy weights must sum to 0 or 10000 basis points")]
    InvalidWeights,

    #[msg("Strategy is not whitelisted")]
    StrategyNotWhitelisted,

    #[msg("Strategy is not active")]
    StrategyNotActive,

    #[msg("Math overflow occurred during calculation")]
    MathOverflow,

    #[msg("Invalid token mint - does not match vault asset")]
    InvalidMint,

    #[msg("Invalid token account owner")]
    InvalidOwner,

    #[msg("Strategy registry is full - maximum strategies reached")]
    RegistryFull,

    #[msg("Strategy name too long - maximum 32 characters")]
    NameTooLong,

    #[msg("Strategy not found in registry")]
    StrategyNotFound,

    #[msg("Strategy still carries weight - remove it with set_weights first")]
    StrategyStillActive,

    #[msg("Strategy listed more than once")]
    DuplicateStrategy,

    #[msg("Strategy cannot service the request")]
    StrategyUnavailable,

    #[msg("Another vault operation is in progress")]
    OperationInProgress,

    #[msg("Withdrawal fee exceeds the maximum")]
    InvalidFee,

    #[msg("Every strategy holding vault capital must be supplied")]
    IncompleteStrategySet,

    #[msg("Vault has outstanding shares but no assets")]
    VaultInsolvent,
}
