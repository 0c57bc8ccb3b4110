use anchor_lang::prelude::*;

use crate::state::{PoolKind, RequestKind, RequestStatus};

#[event]
pub struct RegistryInitialized {
    pub admin: Pubkey,
    pub oracle: Pubkey,
}

#[event]
pub struct OracleUpdated {
    pub old_oracle: Pubkey,
    pub new_oracle: Pubkey,
}

#[event]
pub struct PauseChanged {
    pub is_paused: bool,
}

#[event]
pub struct AdminTransferred {
    pub old_admin: Pubkey,
    pub new_admin: Pubkey,
}

#[event]
pub struct PoolCreated {
    pub pool: Pubkey,
    pub index: u64,
    pub creator: Pubkey,
    pub collection: Pubkey,
    pub kind: PoolKind,
    pub claim_mint: Pubkey,
    pub payment_mint: Option<Pubkey>,
    pub unit_price: u64,
    pub fee_bps: u16,
}

#[event]
pub struct PoolMigrated {
    pub pool: Pubkey,
    pub from_version: u16,
    pub to_version: u16,
}

#[event]
pub struct PaymentVaultInitialized {
    pub pool: Pubkey,
    pub vault: Pubkey,
    pub payment_mint: Pubkey,
}

#[event]
pub struct UnitVaultInitialized {
    pub pool: Pubkey,
    pub vault: Pubkey,
    pub unit_mint: Pubkey,
}

#[event]
pub struct UnitsSeeded {
    pub pool: Pubkey,
    pub creator: Pubkey,
    pub units: Vec<Pubkey>,
}

#[event]
pub struct UnitsLocked {
    pub pool: Pubkey,
    pub user: Pubkey,
    pub units: Vec<Pubkey>,
    pub minted: u64,
}

#[event]
pub struct AuctionStarted {
    pub pool: Pubkey,
    pub auction: Pubkey,
    pub auction_id: u64,
    pub unit: Pubkey,
    pub start_time: i64,
    pub end_time: i64,
}

#[event]
pub struct BidAccepted {
    pub pool: Pubkey,
    pub auction_id: u64,
    pub unit: Pubkey,
    pub bidder: Pubkey,
    pub amount: u64,
    pub refunded_bidder: Option<Pubkey>,
    pub refunded_amount: u64,
}

#[event]
pub struct AuctionEnded {
    pub pool: Pubkey,
    pub auction_id: u64,
    pub unit: Pubkey,
    pub winner: Option<Pubkey>,
    pub amount: u64,
    pub fee_recipient: Pubkey,
}

/// Outbound message for the randomness oracle.
#[event]
pub struct RandomnessRequested {
    pub pool: Pubkey,
    pub request: Pubkey,
    pub request_id: u64,
    pub requester: Pubkey,
    pub count: u32,
    pub kind: RequestKind,
}

#[event]
pub struct RedeemRequested {
    pub pool: Pubkey,
    pub request_id: u64,
    pub requester: Pubkey,
    pub count: u32,
    pub burned: u64,
    pub fee: u64,
}

#[event]
pub struct SwapRequested {
    pub pool: Pubkey,
    pub request_id: u64,
    pub requester: Pubkey,
    pub source_unit: Pubkey,
    pub fee: u64,
}

#[event]
pub struct RandomnessFulfilled {
    pub pool: Pubkey,
    pub request_id: u64,
    pub requester: Pubkey,
    pub kind: RequestKind,
    pub units: Vec<Pubkey>,
}

#[event]
pub struct RequestCancelled {
    pub pool: Pubkey,
    pub request_id: u64,
    pub requester: Pubkey,
    pub reminted: u64,
    pub returned_unit: Option<Pubkey>,
}

#[event]
pub struct RequestClosed {
    pub pool: Pubkey,
    pub request_id: u64,
    pub requester: Pubkey,
    pub status: RequestStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::{Discriminator, Event};

    #[test]
    fn closed_request_event_carries_final_status() {
        let requester = Pubkey::new_unique();
        let data = RequestClosed {
            pool: Pubkey::new_unique(),
            request_id: 9,
            requester,
            status: RequestStatus::Cancelled,
        }
        .data();

        assert_eq!(&data[..8], RequestClosed::DISCRIMINATOR);
        // pool, request_id, requester, then the status tag
        assert_eq!(&data[8 + 32 + 8..8 + 32 + 8 + 32], requester.as_ref());
        assert_eq!(data[8 + 32 + 8 + 32], RequestStatus::Cancelled as u8);
    }

    #[test]
    fn vault_events_are_distinct() {
        assert_ne!(UnitVaultInitialized::DISCRIMINATOR, PaymentVaultInitialized::DISCRIMINATOR);
    }
}
