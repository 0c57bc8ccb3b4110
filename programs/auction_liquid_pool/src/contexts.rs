// programs/auction_liquid_pool/src/contexts.rs

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::CLAIM_DECIMALS;
use crate::errors::PoolError;
use crate::state::{Auction, Pool, RandomnessRequest, Registry};

// ----------------------------
// Registry (admin)
// ----------------------------

#[derive(Accounts)]
pub struct InitializeRegistry<'info> {
    #[account(
        init,
        payer = admin,
        space = 8 + Registry::INIT_SPACE,
        seeds = [crate::REGISTRY_SEED],
        bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SetOracle<'info> {
    #[account(
        mut,
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct SetPause<'info> {
    #[account(
        mut,
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct TransferAdmin<'info> {
    #[account(
        mut,
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    pub admin: Signer<'info>,
}

// ----------------------------
// Pool factory
// ----------------------------

#[derive(Accounts)]
pub struct CreatePool<'info> {
    #[account(
        mut,
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        init,
        payer = creator,
        space = 8 + Pool::INIT_SPACE,
        seeds = [
            crate::POOL_SEED,
            registry.key().as_ref(),
            registry.pool_count.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    /// Claim (mapping) token, mint authority = pool PDA
    #[account(
        init,
        payer = creator,
        seeds = [crate::CLAIM_MINT_SEED, pool.key().as_ref()],
        bump,
        mint::decimals = CLAIM_DECIMALS,
        mint::authority = pool
    )]
    pub claim_mint: Account<'info, Mint>,

    /// CHECK: system-owned escrow PDA, holds native bids, no data
    #[account(
        init,
        payer = creator,
        space = 0,
        owner = anchor_lang::solana_program::system_program::ID,
        seeds = [crate::BID_ESCROW_SEED, pool.key().as_ref()],
        bump
    )]
    pub bid_escrow: UncheckedAccount<'info>,

    /// SPL payment asset; absent = native lamports
    pub payment_mint: Option<Account<'info, Mint>>,

    #[account(mut)]
    pub creator: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct InitPaymentVault<'info> {
    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = creator @ PoolError::Unauthorized
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        constraint = pool.payment_mint == Some(payment_mint.key()) @ PoolError::PaymentAccountMissing
    )]
    pub payment_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = creator,
        seeds = [crate::PAYMENT_VAULT_SEED, pool.key().as_ref()],
        bump,
        token::mint = payment_mint,
        token::authority = pool
    )]
    pub payment_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub creator: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/// Realloc-based migration: the pool is read raw because older layouts may not deserialize.
#[derive(Accounts)]
pub struct MigratePool<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    /// CHECK: owner and registry link verified in the handler
    #[account(mut)]
    pub pool: UncheckedAccount<'info>,

    #[account(mut)]
    pub admin: Signer<'info>,

    pub system_program: Program<'info, System>,
}

// ----------------------------
// Deposits
// ----------------------------

#[derive(Accounts)]
pub struct InitUnitVault<'info> {
    #[account(
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    pub unit_mint: Account<'info, Mint>,

    #[account(
        init_if_needed,
        payer = payer,
        seeds = [crate::UNIT_VAULT_SEED, pool.key().as_ref(), unit_mint.key().as_ref()],
        bump,
        token::mint = unit_mint,
        token::authority = pool
    )]
    pub unit_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct SeedUnits<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = registry,
        has_one = creator @ PoolError::Unauthorized
    )]
    pub pool: Box<Account<'info, Pool>>,

    pub creator: Signer<'info>,

    pub token_program: Program<'info, Token>,
    // units via remaining_accounts: [unit_mint, creator_unit_account, unit_vault] per unit
}

#[derive(Accounts)]
pub struct LockUnits<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = registry
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(mut, address = pool.claim_mint)]
    pub claim_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = user_claim_account.mint == claim_mint.key(),
        constraint = user_claim_account.owner == user.key()
    )]
    pub user_claim_account: Account<'info, TokenAccount>,

    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
    // units via remaining_accounts: [unit_mint, user_unit_account, unit_vault] per unit
}

// ----------------------------
// Auctions
// ----------------------------

#[derive(Accounts)]
pub struct StartAuction<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = registry
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        init,
        payer = starter,
        space = 8 + Auction::INIT_SPACE,
        seeds = [
            crate::AUCTION_SEED,
            pool.key().as_ref(),
            pool.next_auction_id.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub auction: Account<'info, Auction>,

    #[account(mut)]
    pub starter: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(auction_id: u64)]
pub struct Bid<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = registry
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        mut,
        seeds = [crate::AUCTION_SEED, pool.key().as_ref(), auction_id.to_le_bytes().as_ref()],
        bump = auction.bump
    )]
    pub auction: Account<'info, Auction>,

    #[account(mut)]
    pub bidder: Signer<'info>,

    /// CHECK: native refund destination, must equal auction.highest_bidder (handler)
    #[account(mut)]
    pub previous_bidder: Option<UncheckedAccount<'info>>,

    /// CHECK: system-owned escrow PDA. Address enforced by seeds/bump.
    #[account(
        mut,
        seeds = [crate::BID_ESCROW_SEED, pool.key().as_ref()],
        bump = pool.bid_escrow_bump
    )]
    pub bid_escrow: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = pool.payment_vault == Some(payment_vault.key()) @ PoolError::PaymentAccountMissing
    )]
    pub payment_vault: Option<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = Some(bidder_payment_account.mint) == pool.payment_mint @ PoolError::PaymentAccountMissing,
        constraint = bidder_payment_account.owner == bidder.key()
    )]
    pub bidder_payment_account: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub previous_bidder_payment_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
#[instruction(auction_id: u64)]
pub struct EndAuction<'info> {
    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        mut,
        seeds = [crate::AUCTION_SEED, pool.key().as_ref(), auction_id.to_le_bytes().as_ref()],
        bump = auction.bump
    )]
    pub auction: Account<'info, Auction>,

    #[account(
        mut,
        seeds = [crate::UNIT_VAULT_SEED, pool.key().as_ref(), auction.unit.as_ref()],
        bump
    )]
    pub unit_vault: Account<'info, TokenAccount>,

    /// Required when the auction has a winner
    #[account(mut)]
    pub winner_unit_account: Option<Account<'info, TokenAccount>>,

    /// CHECK: system-owned escrow PDA. Address enforced by seeds/bump.
    #[account(
        mut,
        seeds = [crate::BID_ESCROW_SEED, pool.key().as_ref()],
        bump = pool.bid_escrow_bump
    )]
    pub bid_escrow: UncheckedAccount<'info>,

    /// CHECK: native payout destination. Address enforced.
    #[account(mut, address = pool.fee_recipient)]
    pub fee_recipient: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = pool.payment_vault == Some(payment_vault.key()) @ PoolError::PaymentAccountMissing
    )]
    pub payment_vault: Option<Account<'info, TokenAccount>>,

    #[account(
        mut,
        constraint = Some(fee_recipient_payment_account.mint) == pool.payment_mint @ PoolError::PaymentAccountMissing,
        constraint = fee_recipient_payment_account.owner == pool.fee_recipient
    )]
    pub fee_recipient_payment_account: Option<Account<'info, TokenAccount>>,

    pub caller: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

// ----------------------------
// Redeem / swap (randomness requests)
// ----------------------------

#[derive(Accounts)]
pub struct Redeem<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = registry
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        init,
        payer = user,
        space = 8 + RandomnessRequest::INIT_SPACE,
        seeds = [
            crate::REQUEST_SEED,
            pool.key().as_ref(),
            pool.next_request_id.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub request: Account<'info, RandomnessRequest>,

    #[account(mut, address = pool.claim_mint)]
    pub claim_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = user_claim_account.mint == claim_mint.key(),
        constraint = user_claim_account.owner == user.key()
    )]
    pub user_claim_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = fee_recipient_claim_account.mint == claim_mint.key(),
        constraint = fee_recipient_claim_account.owner == pool.fee_recipient
    )]
    pub fee_recipient_claim_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Swap<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = registry
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        init,
        payer = user,
        space = 8 + RandomnessRequest::INIT_SPACE,
        seeds = [
            crate::REQUEST_SEED,
            pool.key().as_ref(),
            pool.next_request_id.to_le_bytes().as_ref(),
        ],
        bump
    )]
    pub request: Account<'info, RandomnessRequest>,

    pub unit_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = user_unit_account.mint == unit_mint.key(),
        constraint = user_unit_account.owner == user.key()
    )]
    pub user_unit_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = user,
        seeds = [crate::UNIT_VAULT_SEED, pool.key().as_ref(), unit_mint.key().as_ref()],
        bump,
        token::mint = unit_mint,
        token::authority = pool
    )]
    pub unit_vault: Box<Account<'info, TokenAccount>>,

    #[account(address = pool.claim_mint)]
    pub claim_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = user_claim_account.mint == claim_mint.key(),
        constraint = user_claim_account.owner == user.key()
    )]
    pub user_claim_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = fee_recipient_claim_account.mint == claim_mint.key(),
        constraint = fee_recipient_claim_account.owner == pool.fee_recipient
    )]
    pub fee_recipient_claim_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

// ----------------------------
// Oracle callback
// ----------------------------

#[derive(Accounts)]
#[instruction(request_id: u64)]
pub struct FulfillRandomness<'info> {
    #[account(
        seeds = [crate::REGISTRY_SEED],
        bump = registry.bump
    )]
    pub registry: Account<'info, Registry>,

    #[account(address = registry.oracle @ PoolError::Unauthorized)]
    pub oracle: Signer<'info>,

    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump,
        has_one = registry
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        mut,
        seeds = [crate::REQUEST_SEED, pool.key().as_ref(), request_id.to_le_bytes().as_ref()],
        bump = request.bump
    )]
    pub request: Account<'info, RandomnessRequest>,

    pub token_program: Program<'info, Token>,
    // selected units via remaining_accounts: [unit_vault, requester_unit_account] per unit
}

// ----------------------------
// Request lifecycle
// ----------------------------

#[derive(Accounts)]
#[instruction(request_id: u64)]
pub struct CancelRequest<'info> {
    #[account(
        mut,
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        mut,
        seeds = [crate::REQUEST_SEED, pool.key().as_ref(), request_id.to_le_bytes().as_ref()],
        bump = request.bump,
        has_one = requester @ PoolError::Unauthorized
    )]
    pub request: Account<'info, RandomnessRequest>,

    #[account(mut, address = pool.claim_mint)]
    pub claim_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = requester_claim_account.mint == claim_mint.key(),
        constraint = requester_claim_account.owner == requester.key()
    )]
    pub requester_claim_account: Account<'info, TokenAccount>,

    /// Swap requests only: vault holding the source unit
    #[account(mut)]
    pub unit_vault: Option<Account<'info, TokenAccount>>,

    /// Swap requests only: destination of the returned source unit
    #[account(
        mut,
        constraint = requester_unit_account.owner == requester.key()
    )]
    pub requester_unit_account: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub requester: Signer<'info>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
#[instruction(request_id: u64)]
pub struct CloseRequest<'info> {
    #[account(
        seeds = [crate::POOL_SEED, pool.registry.as_ref(), pool.index.to_le_bytes().as_ref()],
        bump = pool.bump
    )]
    pub pool: Box<Account<'info, Pool>>,

    #[account(
        mut,
        seeds = [crate::REQUEST_SEED, pool.key().as_ref(), request_id.to_le_bytes().as_ref()],
        bump = request.bump,
        has_one = requester @ PoolError::Unauthorized,
        close = requester
    )]
    pub request: Account<'info, RandomnessRequest>,

    #[account(mut)]
    pub requester: Signer<'info>,

    pub system_program: Program<'info, System>,
}
