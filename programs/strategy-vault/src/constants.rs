// Constants for the Strategy Vault program

/// Seed for vault state PDA, followed by the asset mint and the vault id
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed for vault authority PDA (owns the vault and reserve token accounts)
pub const VAULT_AUTHORITY_SEED: &[u8] = b"vault_authority";

/// Seed for strategy registry PDA
pub const REGISTRY_SEED: &[u8] = b"strategy_registry";

/// Seed for per-user position PDA
pub const POSITION_SEED: &[u8] = b"position";

/// Fixed-point scale for share price (1:1 == 1_000_000)
pub const SCALE: u64 = 1_000_000;

/// Basis points denominator; active weights sum to exactly this or zero
pub const MAX_BPS: u64 = 10_000;

/// Upper bound on the withdrawal fee (1%)
pub const MAX_WITHDRAWAL_FEE_BPS: u16 = 100;

/// Registry capacity
pub const MAX_STRATEGIES: usize = 10;

/// Maximum strategy name length in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Health score of a freshly whitelisted strategy
pub const MAX_HEALTH: u8 = 100;

/// Health lost on each strategy-local failure
pub const HEALTH_PENALTY: u8 = 25;

/// Health regained on each successful harvest
pub const HEALTH_RECOVERY: u8 = 10;

/// ~400ms slots
pub const SLOTS_PER_YEAR: u64 = 78_840_000;

/// Space for VaultState account (8 discriminator + 32 authority + 32 asset_mint +
/// 1 vault_id + 8 total_assets + 8 total_shares + 8 idle_assets + 1 paused + 1 locked +
/// 2 withdrawal_fee_bps + 2 weighted_apy_bps + 1 bump + 1 authority_bump +
/// 64 padding)
pub const VAULT_STATE_SIZE: usize = 8 + 32 + 32 + 1 + 8 + 8 + 8 + 1 + 1 + 2 + 2 + 1 + 1 + 64;

/// Space for UserPosition account (8 discriminator + 32 vault + 32 owner +
/// 8 shares + 1 bump)
pub const USER_POSITION_SIZE: usize = 8 + 32 + 32 + 8 + 1;

/// Serialized size of one StrategyEntry (32 id + 4 + 32 name + 1 whitelisted +
/// 1 active + 2 weight_bps + 1 health_score + 8 total_earned +
/// 8 last_harvest_slot + 8 deployed + 2 apy_bps)
pub const STRATEGY_ENTRY_SIZE: usize = 32 + 4 + MAX_NAME_LEN + 1 + 1 + 2 + 1 + 8 + 8 + 8 + 2;

/// Space for StrategyRegistry account (8 discriminator + 32 vault + 4 vec len +
/// entries + 1 bump + 64 padding)
pub const STRATEGY_REGISTRY_SIZE: usize =
    8 + 32 + 4 + (MAX_STRATEGIES * STRATEGY_ENTRY_SIZE) + 1 + 64;
