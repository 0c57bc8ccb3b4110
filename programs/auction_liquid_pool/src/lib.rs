use anchor_lang::prelude::*;

pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;
pub mod utils;
pub mod contexts;
pub mod constants;

pub use utils::*;
pub use instructions::*;
pub use state::*;
pub use errors::*;
pub use contexts::*;
pub use constants::*;

declare_id!("8vXq3mZrUj1oJmTqkR6hGZt2k9JwEaQ5n4sBv7cYdLpA");

#[program]
pub mod auction_liquid_pool {
    use super::*;
    use crate::instructions::{admin, auction, deposit, lifecycle, oracle, redeem};

    // ----------------------------
    // Registry admin controls
    // ----------------------------
    pub fn initialize_registry(ctx: Context<InitializeRegistry>, oracle: Pubkey) -> Result<()> {
        admin::initialize_registry(ctx, oracle)
    }

    pub fn set_oracle(ctx: Context<SetOracle>, oracle: Pubkey) -> Result<()> {
        admin::set_oracle(ctx, oracle)
    }

    pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
        admin::set_pause(ctx, paused)
    }

    pub fn transfer_admin(ctx: Context<TransferAdmin>, new_admin: Pubkey) -> Result<()> {
        admin::transfer_admin(ctx, new_admin)
    }

    // ----------------------------
    // Pool factory
    // ----------------------------
    pub fn create_pool(ctx: Context<CreatePool>, params: PoolParams) -> Result<()> {
        admin::create_pool(ctx, params)
    }

    pub fn init_payment_vault(ctx: Context<InitPaymentVault>) -> Result<()> {
        admin::init_payment_vault(ctx)
    }

    pub fn migrate_pool(ctx: Context<MigratePool>) -> Result<()> {
        admin::migrate_pool(ctx)
    }

    // ----------------------------
    // Deposits
    // ----------------------------
    pub fn init_unit_vault(ctx: Context<InitUnitVault>) -> Result<()> {
        deposit::init_unit_vault(ctx)
    }

    pub fn seed_units<'info>(
        ctx: Context<'_, '_, 'info, 'info, SeedUnits<'info>>,
        units: Vec<Pubkey>,
    ) -> Result<()> {
        deposit::seed_units(ctx, units)
    }

    pub fn lock_units<'info>(
        ctx: Context<'_, '_, 'info, 'info, LockUnits<'info>>,
        units: Vec<Pubkey>,
    ) -> Result<()> {
        deposit::lock_units(ctx, units)
    }

    // ----------------------------
    // Auctions
    // ----------------------------
    pub fn start_auction(ctx: Context<StartAuction>, unit: Pubkey) -> Result<()> {
        auction::start_auction(ctx, unit)
    }

    pub fn bid(ctx: Context<Bid>, auction_id: u64, amount: u64) -> Result<()> {
        auction::bid(ctx, auction_id, amount)
    }

    pub fn end_auction(ctx: Context<EndAuction>, auction_id: u64) -> Result<()> {
        auction::end_auction(ctx, auction_id)
    }

    // ----------------------------
    // Redeem / swap
    // ----------------------------
    pub fn redeem(ctx: Context<Redeem>, count: u32) -> Result<()> {
        redeem::redeem(ctx, count)
    }

    pub fn swap(ctx: Context<Swap>) -> Result<()> {
        redeem::swap(ctx)
    }

    // ----------------------------
    // Randomness
    // ----------------------------
    pub fn fulfill_randomness<'info>(
        ctx: Context<'_, '_, 'info, 'info, FulfillRandomness<'info>>,
        request_id: u64,
        random_words: Vec<[u8; 32]>,
    ) -> Result<()> {
        oracle::fulfill_randomness(ctx, request_id, random_words)
    }

    pub fn cancel_request(ctx: Context<CancelRequest>, request_id: u64) -> Result<()> {
        lifecycle::cancel_request(ctx, request_id)
    }

    pub fn close_request(ctx: Context<CloseRequest>, request_id: u64) -> Result<()> {
        lifecycle::close_request(ctx, request_id)
    }
}
