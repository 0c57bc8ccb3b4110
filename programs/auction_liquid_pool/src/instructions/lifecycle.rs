use anchor_lang::prelude::*;
use anchor_spl::token::{self, MintTo, Transfer};

use crate::errors::PoolError;
use crate::events::{RequestCancelled, RequestClosed};
use crate::instructions::shared::unit_vault_address;
use crate::state::RequestKind;
use crate::{CancelRequest, CloseRequest};

/// Requester escape hatch once the oracle has been silent past the timeout.
/// Redeem: burned claim tokens are re-minted (the fee is kept). Swap: the source unit returns.
pub fn cancel_request(ctx: Context<CancelRequest>, request_id: u64) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();
    let requester = ctx.accounts.requester.key();

    let request = &mut ctx.accounts.request;
    request.cancel(now)?;

    let pool = &mut ctx.accounts.pool;
    let reminted = pool.cancel_request(request)?;

    let registry_key = pool.registry;
    let index_bytes = pool.index.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[
        crate::POOL_SEED,
        registry_key.as_ref(),
        index_bytes.as_ref(),
        &[pool.bump],
    ]];

    if reminted > 0 {
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.claim_mint.to_account_info(),
                    to: ctx.accounts.requester_claim_account.to_account_info(),
                    authority: pool.to_account_info(),
                },
                signer_seeds,
            ),
            reminted,
        )?;
    }

    let mut returned_unit = None;
    if let (RequestKind::Swap, Some(source)) = (request.kind, request.source_unit) {
        let vault = ctx
            .accounts
            .unit_vault
            .as_ref()
            .ok_or(PoolError::UnitAccountMismatch)?;
        require_keys_eq!(
            vault.key(),
            unit_vault_address(&pool_key, &source, ctx.program_id),
            PoolError::UnitAccountMismatch
        );
        let dest = ctx
            .accounts
            .requester_unit_account
            .as_ref()
            .ok_or(PoolError::UnitAccountMismatch)?;
        require_keys_eq!(dest.mint, source, PoolError::UnitAccountMismatch);

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
            pool.unit_amount(),
        )
        .map_err(|_| error!(PoolError::TransferRejected))?;
        returned_unit = Some(source);
    }

    msg!("request {} cancelled after timeout", request_id);
    emit!(RequestCancelled {
        pool: pool_key,
        request_id,
        requester,
        reminted,
        returned_unit,
    });
    Ok(())
}

/// Reclaims rent of a settled request. Pending requests stay open.
pub fn close_request(ctx: Context<CloseRequest>, request_id: u64) -> Result<()> {
    require!(
        !ctx.accounts.request.is_pending(),
        PoolError::RequestStillPending
    );
    msg!("request {} closed", request_id);

    emit!(RequestClosed {
        pool: ctx.accounts.pool.key(),
        request_id,
        requester: ctx.accounts.requester.key(),
        status: ctx.accounts.request.status,
    });
    Ok(())
}
