use anchor_lang::prelude::*;
use anchor_spl::token::{self, MintTo};

use crate::errors::PoolError;
use crate::events::{UnitVaultInitialized, UnitsLocked, UnitsSeeded};
use crate::instructions::shared::pull_units;
use crate::{InitUnitVault, LockUnits, SeedUnits};

/// Creates (idempotently) the vault that will custody one unit mint.
pub fn init_unit_vault(ctx: Context<InitUnitVault>) -> Result<()> {
    msg!(
        "unit vault {} for mint {}",
        ctx.accounts.unit_vault.key(),
        ctx.accounts.unit_mint.key()
    );

    emit!(UnitVaultInitialized {
        pool: ctx.accounts.pool.key(),
        vault: ctx.accounts.unit_vault.key(),
        unit_mint: ctx.accounts.unit_mint.key(),
    });
    Ok(())
}

/// Creator deposits units listed at pool creation. No claim tokens are minted.
pub fn seed_units<'info>(
    ctx: Context<'_, '_, 'info, 'info, SeedUnits<'info>>,
    units: Vec<Pubkey>,
) -> Result<()> {
    require!(!ctx.accounts.registry.paused, PoolError::Paused);

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();

    let pool = &mut ctx.accounts.pool;
    pool.seed_units(&units, now)?;

    pull_units(
        pool,
        &pool_key,
        ctx.program_id,
        &units,
        ctx.remaining_accounts,
        &ctx.accounts.creator.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
    )?;

    emit!(UnitsSeeded {
        pool: pool_key,
        creator: ctx.accounts.creator.key(),
        units,
    });
    Ok(())
}

/// Lock-in: units go to the reserved set, the user receives `unit_price` claim tokens per unit.
pub fn lock_units<'info>(
    ctx: Context<'_, '_, 'info, 'info, LockUnits<'info>>,
    units: Vec<Pubkey>,
) -> Result<()> {
    require!(!ctx.accounts.registry.paused, PoolError::Paused);

    let now = Clock::get()?.unix_timestamp;
    let pool_key = ctx.accounts.pool.key();

    let pool = &mut ctx.accounts.pool;
    let minted = pool.lock_units(&units, now)?;

    pull_units(
        pool,
        &pool_key,
        ctx.program_id,
        &units,
        ctx.remaining_accounts,
        &ctx.accounts.user.to_account_info(),
        &ctx.accounts.token_program.to_account_info(),
    )?;

    // Pool PDA is the claim mint authority
    let registry_key = pool.registry;
    let index_bytes = pool.index.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[
        crate::POOL_SEED,
        registry_key.as_ref(),
        index_bytes.as_ref(),
        &[pool.bump],
    ]];

    token::mint_to(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            MintTo {
                mint: ctx.accounts.claim_mint.to_account_info(),
                to: ctx.accounts.user_claim_account.to_account_info(),
                authority: pool.to_account_info(),
            },
            signer_seeds,
        ),
        minted,
    )?;

    emit!(UnitsLocked {
        pool: pool_key,
        user: ctx.accounts.user.key(),
        units,
        minted,
    });
    Ok(())
}
