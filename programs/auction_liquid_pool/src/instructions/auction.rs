use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::errors::PoolError;
use crate::events::{AuctionEnded, AuctionStarted, BidAccepted};
use crate::instructions::shared::{collect_lamports, release_lamports};
use crate::state::BidRule;
use crate::{Bid, EndAuction, StartAuction};

/// Takes a lock-elapsed unit out of the reserved set and opens an auction for it.
pub fn start_auction(ctx: Context<StartAuction>, unit: Pubkey) -> Result<()> {
    require!(!ctx.accounts.registry.paused, PoolError::Paused);

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();

    let pool = &mut ctx.accounts.pool;
    let auction_id = pool.begin_auction(&unit, now)?;

    let auction = &mut ctx.accounts.auction;
    auction.open(pool_key, auction_id, unit, now, pool.auction_duration)?;
    auction.bump = ctx.bumps.auction;

    emit!(AuctionStarted {
        pool: pool_key,
        auction: auction.key(),
        auction_id,
        unit,
        start_time: auction.start_time,
        end_time: auction.end_time,
    });
    Ok(())
}

/// Escrows the new bid and refunds the displaced highest bidder in the same transaction.
pub fn bid(ctx: Context<Bid>, auction_id: u64, amount: u64) -> Result<()> {
    require!(!ctx.accounts.registry.paused, PoolError::Paused);

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let bidder_key = ctx.accounts.bidder.key();

    let pool = &ctx.accounts.pool;
    let auction = &mut ctx.accounts.auction;
    require!(
        pool.auction_of(&auction.unit) == Some(auction_id),
        PoolError::AuctionClosed
    );

    let rule = BidRule {
        min_first_bid: pool.min_first_bid(&auction.unit)?,
        curve: pool.bid_curve,
        delta: pool.bid_delta,
    };
    let displaced = auction.place_bid(bidder_key, amount, now, &rule)?;

    // 1. Escrow the new bid
    match pool.payment_mint {
        None => collect_lamports(
            &ctx.accounts.bidder.to_account_info(),
            &ctx.accounts.bid_escrow.to_account_info(),
            &ctx.accounts.system_program.to_account_info(),
            amount,
        )
        .map_err(|_| error!(PoolError::InsufficientBalance))?,
        Some(_) => {
            let vault = ctx
                .accounts
                .payment_vault
                .as_ref()
                .ok_or(PoolError::PaymentAccountMissing)?;
            let from = ctx
                .accounts
                .bidder_payment_account
                .as_ref()
                .ok_or(PoolError::PaymentAccountMissing)?;
            require!(from.amount >= amount, PoolError::InsufficientBalance);

            token::transfer(
                CpiContext::new(
                    ctx.accounts.token_program.to_account_info(),
                    Transfer {
                        from: from.to_account_info(),
                        to: vault.to_account_info(),
                        authority: ctx.accounts.bidder.to_account_info(),
                    },
                ),
                amount,
            )?;
        }
    }

    // 2. Refund the displaced bid (all-or-nothing with the new bid)
    if let Some((prev_bidder, prev_amount)) = displaced {
        match pool.payment_mint {
            None => {
                let dest = ctx
                    .accounts
                    .previous_bidder
                    .as_ref()
                    .ok_or(PoolError::RefundFailed)?;
                require_keys_eq!(dest.key(), prev_bidder, PoolError::RefundFailed);

                release_lamports(
                    &ctx.accounts.bid_escrow.to_account_info(),
                    &dest.to_account_info(),
                    &ctx.accounts.system_program.to_account_info(),
                    &pool_key,
                    pool.bid_escrow_bump,
                    prev_amount,
                )
                .map_err(|_| error!(PoolError::RefundFailed))?;
            }
            Some(payment_mint) => {
                let vault = ctx
                    .accounts
                    .payment_vault
                    .as_ref()
                    .ok_or(PoolError::PaymentAccountMissing)?;
                let dest = ctx
                    .accounts
                    .previous_bidder_payment_account
                    .as_ref()
                    .ok_or(PoolError::RefundFailed)?;
                require_keys_eq!(dest.owner, prev_bidder, PoolError::RefundFailed);
                require_keys_eq!(dest.mint, payment_mint, PoolError::RefundFailed);

                let registry_key = pool.registry;
                let index_bytes = pool.index.to_le_bytes();
                let signer_seeds: &[&[&[u8]]] = &[&[
                    crate::POOL_SEED,
                    registry_key.as_ref(),
                    index_bytes.as_ref(),
                    &[pool.bump],
                ]];

                token::transfer(
                    CpiContext::new_with_signer(
                        ctx.accounts.token_program.to_account_info(),
                        Transfer {
                            from: vault.to_account_info(),
                            to: dest.to_account_info(),
                            authority: pool.to_account_info(),
                        },
                        signer_seeds,
                    ),
                    prev_amount,
                )
                .map_err(|_| error!(PoolError::RefundFailed))?;
            }
        }
    }

    emit!(BidAccepted {
        pool: pool_key,
        auction_id,
        unit: auction.unit,
        bidder: bidder_key,
        amount,
        refunded_bidder: displaced.map(|(b, _)| b),
        refunded_amount: displaced.map(|(_, a)| a).unwrap_or(0),
    });
    Ok(())
}

/// Settles an elapsed auction. Anyone may call.
pub fn end_auction(ctx: Context<EndAuction>, auction_id: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();

    let pool = &mut ctx.accounts.pool;
    let winner = pool.settle_auction(&mut ctx.accounts.auction, now)?;
    let unit = ctx.accounts.auction.unit;

    if let Some((winner_key, amount)) = winner {
        let registry_key = pool.registry;
        let index_bytes = pool.index.to_le_bytes();
        let signer_seeds: &[&[&[u8]]] = &[&[
            crate::POOL_SEED,
            registry_key.as_ref(),
            index_bytes.as_ref(),
            &[pool.bump],
        ]];

        // 1. Unit to the winner
        let dest = ctx
            .accounts
            .winner_unit_account
            .as_ref()
            .ok_or(PoolError::UnitAccountMismatch)?;
        require_keys_eq!(dest.owner, winner_key, PoolError::UnitAccountMismatch);
        require_keys_eq!(dest.mint, unit, PoolError::UnitAccountMismatch);

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.unit_vault.to_account_info(),
                    to: dest.to_account_info(),
                    authority: pool.to_account_info(),
                },
                signer_seeds,
            ),
            pool.unit_amount(),
        )
        .map_err(|_| error!(PoolError::TransferRejected))?;

        // 2. Winning bid to the fee recipient
        match pool.payment_mint {
            None => release_lamports(
                &ctx.accounts.bid_escrow.to_account_info(),
                &ctx.accounts.fee_recipient.to_account_info(),
                &ctx.accounts.system_program.to_account_info(),
                &pool_key,
                pool.bid_escrow_bump,
                amount,
            )?,
            Some(_) => {
                let vault = ctx
                    .accounts
                    .payment_vault
                    .as_ref()
                    .ok_or(PoolError::PaymentAccountMissing)?;
                let to = ctx
                    .accounts
                    .fee_recipient_payment_account
                    .as_ref()
                    .ok_or(PoolError::PaymentAccountMissing)?;

                token::transfer(
                    CpiContext::new_with_signer(
                        ctx.accounts.token_program.to_account_info(),
                        Transfer {
                            from: vault.to_account_info(),
                            to: to.to_account_info(),
                            authority: pool.to_account_info(),
                        },
                        signer_seeds,
                    ),
                    amount,
                )?;
            }
        }
        msg!("auction {} sold {} for {}", auction_id, unit, amount);
    } else {
        msg!("auction {} ended without bids, {} back in reserve", auction_id, unit);
    }

    emit!(AuctionEnded {
        pool: pool_key,
        auction_id,
        unit,
        winner: winner.map(|(w, _)| w),
        amount: winner.map(|(_, a)| a).unwrap_or(0),
        fee_recipient: pool.fee_recipient,
    });
    Ok(())
}
