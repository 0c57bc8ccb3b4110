use anchor_lang::prelude::*;
use anchor_spl::token::{self, Burn, Transfer};

use crate::errors::PoolError;
use crate::events::{RandomnessRequested, RedeemRequested, SwapRequested};
use crate::state::{RequestKind, RequestStatus};
use crate::utils::assert_collection_unit;
use crate::{Redeem, Swap};

/// Burns `count * unit_price` claim tokens (minus the fee) and asks the oracle which
/// reserved units to release.
pub fn redeem(ctx: Context<Redeem>, count: u32) -> Result<()> {
    require!(!ctx.accounts.registry.paused, PoolError::Paused);

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let user_key = ctx.accounts.user.key();

    let pool = &mut ctx.accounts.pool;
    let (request_id, fee, burn) = pool.open_redeem(count)?;
    let total = fee.checked_add(burn).ok_or(PoolError::MathOverflow)?;
    require!(
        ctx.accounts.user_claim_account.amount >= total,
        PoolError::InsufficientBalance
    );

    if fee > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_claim_account.to_account_info(),
                    to: ctx.accounts.fee_recipient_claim_account.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            fee,
        )?;
    }

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.claim_mint.to_account_info(),
                from: ctx.accounts.user_claim_account.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        burn,
    )?;

    let request = &mut ctx.accounts.request;
    request.pool = pool_key;
    request.request_id = request_id;
    request.bump = ctx.bumps.request;
    request.requester = user_key;
    request.count = count;
    request.kind = RequestKind::Redeem;
    request.source_unit = None;
    request.burned = burn;
    request.fee_paid = fee;
    request.requested_at = now;
    request.status = RequestStatus::Pending;
    request.settled_at = 0;
    request.allocated = Vec::new();

    emit!(RedeemRequested {
        pool: pool_key,
        request_id,
        requester: user_key,
        count,
        burned: burn,
        fee,
    });
    emit!(RandomnessRequested {
        pool: pool_key,
        request: request.key(),
        request_id,
        requester: user_key,
        count,
        kind: RequestKind::Redeem,
    });
    Ok(())
}

/// Deposits one unit and pays the swap fee; the oracle picks the unit given back.
pub fn swap(ctx: Context<Swap>) -> Result<()> {
    require!(!ctx.accounts.registry.paused, PoolError::Paused);

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let user_key = ctx.accounts.user.key();
    let source = ctx.accounts.unit_mint.key();

    let pool = &mut ctx.accounts.pool;
    assert_collection_unit(&ctx.accounts.unit_mint, &pool.collection, pool.kind)?;

    let fee = pool.swap_fee()?;
    let request_id = pool.open_swap(&source)?;
    require!(
        ctx.accounts.user_claim_account.amount >= fee,
        PoolError::InsufficientBalance
    );

    token::transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.user_unit_account.to_account_info(),
                to: ctx.accounts.unit_vault.to_account_info(),
                authority: ctx.accounts.user.to_account_info(),
            },
        ),
        pool.unit_amount(),
    )
    .map_err(|_| error!(PoolError::TransferRejected))?;

    if fee > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.user_claim_account.to_account_info(),
                    to: ctx.accounts.fee_recipient_claim_account.to_account_info(),
                    authority: ctx.accounts.user.to_account_info(),
                },
            ),
            fee,
        )?;
    }

    let request = &mut ctx.accounts.request;
    request.pool = pool_key;
    request.request_id = request_id;
    request.bump = ctx.bumps.request;
    request.requester = user_key;
    request.count = 1;
    request.kind = RequestKind::Swap;
    request.source_unit = Some(source);
    request.burned = 0;
    request.fee_paid = fee;
    request.requested_at = now;
    request.status = RequestStatus::Pending;
    request.settled_at = 0;
    request.allocated = Vec::new();

    emit!(SwapRequested {
        pool: pool_key,
        request_id,
        requester: user_key,
        source_unit: source,
        fee,
    });
    emit!(RandomnessRequested {
        pool: pool_key,
        request: request.key(),
        request_id,
        requester: user_key,
        count: 1,
        kind: RequestKind::Swap,
    });
    Ok(())
}
