// Centralized Protocol Constants

// Fee math
// ========

/// Denominator for every basis-point value (fee rate, sale weight, exponential delta).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Sale weight applied to units without an explicit entry (100%).
pub const DEFAULT_SALE_WEIGHT_BPS: u16 = 10_000;

// Capacity limits
// ===============

/// Maximum number of units a pool can hold, reserved plus in auction.
/// NOTE: fixed max_len to keep account size deterministic.
pub const MAX_RESERVED_UNITS: usize = 64;

/// Maximum number of concurrently running auctions per pool.
pub const MAX_ACTIVE_AUCTIONS: usize = 16;

/// Maximum number of units listed for creator seeding at pool creation.
pub const MAX_INITIAL_UNITS: usize = 16;

/// Maximum number of sale weight entries per pool.
pub const MAX_SALE_WEIGHTS: usize = 16;

/// Maximum number of swap source units held aside while awaiting fulfillment.
pub const MAX_INCOMING_UNITS: usize = 16;

/// Maximum units a single redeem may request (and random words per fulfillment).
pub const MAX_UNITS_PER_REQUEST: u32 = 8;

/// Maximum units per lock_units / seed_units call (bounded by tx account limits).
pub const MAX_BATCH: usize = 8;

// Time logic
// ==========

/// Seconds after which a pending randomness request may be cancelled by its requester.
/// 86_400 s = 1 day without an oracle answer.
pub const REQUEST_TIMEOUT_SECS: i64 = 86_400;

// Claim token
// ===========

/// Decimals of every pool's claim (mapping) token mint.
pub const CLAIM_DECIMALS: u8 = 9;

// Versioning
// ==========

/// Initial version for the registry account.
pub const INITIAL_VERSION: u16 = 1;

/// Current Pool layout version; `migrate_pool` upgrades older accounts to it.
pub const POOL_VERSION: u16 = 1;
