use anchor_lang::prelude::*;

#[error_code]
pub enum PoolError {
    #[msg("Unauthorized")]
    Unauthorized,
    #[msg("Protocol paused")]
    Paused,

    // -----------------
    // Pool parameters
    // -----------------
    #[msg("Invalid fee bps (must be 0..=10_000)")]
    InvalidFeeBps,
    #[msg("Invalid duration")]
    InvalidDuration,
    #[msg("Unit price must be positive")]
    InvalidUnitPrice,
    #[msg("Invalid units per deposit for this pool kind")]
    InvalidUnitsPerDeposit,
    #[msg("Invalid pool parameters")]
    InvalidPoolParams,

    // -----------------
    // Reserved set
    // -----------------
    #[msg("Unit list is empty or too long")]
    EmptyUnitList,
    #[msg("Unit already held by the pool")]
    DuplicateUnit,
    #[msg("Pool is full")]
    PoolFull,
    #[msg("Unit is not in the reserved set")]
    UnitNotReserved,
    #[msg("Unit is not listed for initial seeding")]
    UnitNotListed,
    #[msg("Mint is not a unit of the pool collection")]
    NotCollectionUnit,
    #[msg("Token ledger rejected the transfer")]
    TransferRejected,
    #[msg("Unit account does not match the expected unit")]
    UnitAccountMismatch,

    // -----------------
    // Auctions
    // -----------------
    #[msg("Auction already started")]
    AlreadyStarted,
    #[msg("Auction already ended")]
    AlreadyEnded,
    #[msg("Auction duration has not elapsed")]
    AuctionNotElapsed,
    #[msg("Unit lock duration has not elapsed")]
    LockNotElapsed,
    #[msg("Auction is closed for bidding")]
    AuctionClosed,
    #[msg("Bid below the minimum first bid")]
    BidTooLow,
    #[msg("Bid below the minimum increment")]
    InsufficientBid,
    #[msg("Refund of the displaced bid failed")]
    RefundFailed,
    #[msg("Payment account missing for this pool's payment asset")]
    PaymentAccountMissing,

    // -----------------
    // Redeem / swap / randomness
    // -----------------
    #[msg("Insufficient balance")]
    InsufficientBalance,
    #[msg("Not enough eligible reserved units")]
    InsufficientReservedUnits,
    #[msg("Invalid unit count")]
    InvalidUnitCount,
    #[msg("Unknown or already consumed request")]
    UnknownRequest,
    #[msg("Random words must be one word or one per requested unit")]
    InvalidRandomWords,
    #[msg("Request has not expired yet")]
    RequestNotExpired,
    #[msg("Request is still pending")]
    RequestStillPending,

    // -----------------
    // Misc
    // -----------------
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Pool already at current version")]
    AlreadyMigrated,
}
