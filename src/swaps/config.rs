/// Swap engine configuration - hardcoded parameters

// =============================================================================
// SWAP MATH
// =============================================================================

/// Raydium AMM V4 swap fee, taken off the input amount
pub const SWAP_FEE_PERCENT: f64 = 0.25;

/// Default slippage tolerance when the caller does not supply one
pub const DEFAULT_SLIPPAGE_PERCENT: f64 = 5.0;

/// Reserves at or below this ui amount are treated as no liquidity
pub const NEAR_ZERO_RESERVE: f64 = 1e-9;

// =============================================================================
// COMPUTE BUDGET
// =============================================================================

/// Compute unit limit requested for every swap transaction
pub const COMPUTE_UNIT_LIMIT: u32 = 150_000;

/// Compute unit price (micro-lamports) for priority fees
pub const COMPUTE_UNIT_PRICE_MICRO_LAMPORTS: u64 = 1_000_000;

// =============================================================================
// TRANSACTION CONFIRMATION
// =============================================================================

/// Transaction confirmation maximum poll attempts
pub const TRANSACTION_CONFIRMATION_MAX_ATTEMPTS: u32 = 20;

/// Transaction confirmation retry delay (milliseconds) between polls
pub const TRANSACTION_CONFIRMATION_RETRY_DELAY_MS: u64 = 2_000;

// =============================================================================
// EPHEMERAL WSOL ACCOUNT
// =============================================================================

/// SPL token account data size, used for rent and account creation
pub const TOKEN_ACCOUNT_LEN: u64 = 165;

/// Random bytes drawn per swap for the ephemeral WSOL account seed.
/// 24 bytes encode to exactly 32 URL-safe base64 characters, the maximum
/// seed length `Pubkey::create_with_seed` accepts.
pub const WSOL_SEED_BYTES: usize = 24;
