use anchor_lang::prelude::*;
use anchor_spl::token::{self, Transfer};

use crate::errors::PoolError;
use crate::events::RandomnessFulfilled;
use crate::instructions::shared::{read_token_account, unit_vault_address};
use crate::state::RequestKind;
use crate::FulfillRandomness;

/// Oracle callback: selects the units for a pending request and delivers them.
///
/// `remaining_accounts` carries one `[unit_vault, requester_unit_account]` pair per
/// selected unit, in selection order. The oracle derives that order off-chain from the
/// same words, so a mismatch aborts the whole fulfillment.
pub fn fulfill_randomness<'info>(
    ctx: Context<'_, '_, 'info, 'info, FulfillRandomness<'info>>,
    request_id: u64,
    random_words: Vec<[u8; 32]>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();

    let request = &mut ctx.accounts.request;
    request.ensure_pending()?;
    let requester = request.requester;

    let pool = &mut ctx.accounts.pool;
    let picked = pool.allocate(request.count, &random_words)?;
    require!(
        ctx.remaining_accounts.len() == picked.len() * 2,
        PoolError::UnitAccountMismatch
    );

    let registry_key = pool.registry;
    let index_bytes = pool.index.to_le_bytes();
    let pool_bump = pool.bump;
    let signer_seeds: &[&[&[u8]]] = &[&[
        crate::POOL_SEED,
        registry_key.as_ref(),
        index_bytes.as_ref(),
        &[pool_bump],
    ]];

    let amount = pool.unit_amount();
    for (unit, pair) in picked.iter().zip(ctx.remaining_accounts.chunks(2)) {
        let (vault_info, dest_info) = (&pair[0], &pair[1]);

        require_keys_eq!(
            unit_vault_address(&pool_key, unit, ctx.program_id),
            *vault_info.key,
            PoolError::UnitAccountMismatch
        );
        let dest = read_token_account(dest_info)?;
        require_keys_eq!(dest.owner, requester, PoolError::UnitAccountMismatch);
        require_keys_eq!(dest.mint, *unit, PoolError::UnitAccountMismatch);

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: vault_info.clone(),
                    to: dest_info.clone(),
                    authority: pool.to_account_info(),
                },
                signer_seeds,
            ),
            amount,
        )
        .map_err(|_| error!(PoolError::TransferRejected))?;
    }

    if request.kind == RequestKind::Swap {
        let source = request.source_unit.ok_or(PoolError::UnknownRequest)?;
        pool.accept_swapped_unit(&source, now)?;
    }

    request.fulfill(picked.clone(), now)?;

    msg!("request {} fulfilled with {} unit(s)", request_id, picked.len());
    emit!(RandomnessFulfilled {
        pool: pool_key,
        request_id,
        requester,
        kind: request.kind,
        units: picked,
    });
    Ok(())
}
