use anchor_lang::prelude::*;
use anchor_lang::Discriminator;
use anchor_lang::solana_program::{program::invoke, system_instruction};

use crate::constants::*;
use crate::errors::PoolError;
use crate::events::{
    AdminTransferred, OracleUpdated, PauseChanged, PaymentVaultInitialized, PoolCreated, PoolMigrated,
    RegistryInitialized,
};
use crate::state::{Pool, PoolParams};
use crate::{
    CreatePool, InitPaymentVault, InitializeRegistry, MigratePool, SetOracle, SetPause, TransferAdmin,
};

// Fixed-position header of a serialized Pool: discriminator, registry, index, bump, version.
const POOL_REGISTRY_OFFSET: usize = 8;
const POOL_VERSION_OFFSET: usize = 8 + 32 + 8 + 1;

pub fn initialize_registry(ctx: Context<InitializeRegistry>, oracle: Pubkey) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    registry.admin = ctx.accounts.admin.key();
    registry.bump = ctx.bumps.registry;
    registry.oracle = oracle;
    registry.paused = false;
    registry.pool_count = 0;
    registry.version = INITIAL_VERSION;

    emit!(RegistryInitialized {
        admin: registry.admin,
        oracle,
    });
    Ok(())
}

pub fn set_oracle(ctx: Context<SetOracle>, oracle: Pubkey) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    require_keys_eq!(registry.admin, ctx.accounts.admin.key(), PoolError::Unauthorized);

    let old_oracle = registry.oracle;
    registry.oracle = oracle;

    emit!(OracleUpdated {
        old_oracle,
        new_oracle: oracle,
    });
    Ok(())
}

pub fn set_pause(ctx: Context<SetPause>, paused: bool) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    require_keys_eq!(registry.admin, ctx.accounts.admin.key(), PoolError::Unauthorized);

    registry.paused = paused;

    emit!(PauseChanged { is_paused: paused });
    Ok(())
}

pub fn transfer_admin(ctx: Context<TransferAdmin>, new_admin: Pubkey) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    require_keys_eq!(registry.admin, ctx.accounts.admin.key(), PoolError::Unauthorized);

    let old_admin = registry.admin;
    registry.admin = new_admin;

    emit!(AdminTransferred {
        old_admin,
        new_admin,
    });
    Ok(())
}

/// Pool factory: one pool per call, indexed by the registry counter.
pub fn create_pool(ctx: Context<CreatePool>, params: PoolParams) -> Result<()> {
    require!(!ctx.accounts.registry.paused, PoolError::Paused);

    let registry_key = ctx.accounts.registry.key();
    let creator = ctx.accounts.creator.key();
    let index = ctx.accounts.registry.pool_count;

    let pool = &mut ctx.accounts.pool;
    pool.configure(&params, creator)?;
    pool.registry = registry_key;
    pool.index = index;
    pool.bump = ctx.bumps.pool;

    pool.claim_mint = ctx.accounts.claim_mint.key();
    pool.payment_mint = ctx.accounts.payment_mint.as_ref().map(|m| m.key());
    pool.payment_vault = None;
    pool.bid_escrow = ctx.accounts.bid_escrow.key();
    pool.bid_escrow_bump = ctx.bumps.bid_escrow;

    let registry = &mut ctx.accounts.registry;
    registry.pool_count = index.checked_add(1).ok_or(PoolError::MathOverflow)?;

    emit!(PoolCreated {
        pool: pool.key(),
        index,
        creator,
        collection: pool.collection,
        kind: pool.kind,
        claim_mint: pool.claim_mint,
        payment_mint: pool.payment_mint,
        unit_price: pool.unit_price,
        fee_bps: pool.fee_bps,
    });
    Ok(())
}

/// SPL-paid pools only: bids are escrowed in this vault.
pub fn init_payment_vault(ctx: Context<InitPaymentVault>) -> Result<()> {
    let pool = &mut ctx.accounts.pool;
    pool.payment_vault = Some(ctx.accounts.payment_vault.key());
    msg!("payment vault {} ready for pool {}", ctx.accounts.payment_vault.key(), pool.key());

    emit!(PaymentVaultInitialized {
        pool: pool.key(),
        vault: ctx.accounts.payment_vault.key(),
        payment_mint: ctx.accounts.payment_mint.key(),
    });
    Ok(())
}

/// Grows an older pool account to the current layout and bumps its version.
pub fn migrate_pool(ctx: Context<MigratePool>) -> Result<()> {
    let pool_info = ctx.accounts.pool.to_account_info();
    require_keys_eq!(*pool_info.owner, crate::ID, PoolError::Unauthorized);
    require_keys_eq!(
        ctx.accounts.registry.admin,
        ctx.accounts.admin.key(),
        PoolError::Unauthorized
    );

    // 1. Header checks (the account may not deserialize under the current layout)
    let from_version = {
        let data = pool_info.try_borrow_data()?;
        require!(
            data.len() >= POOL_VERSION_OFFSET + 2 && data[..8] == *Pool::DISCRIMINATOR,
            PoolError::InvalidPoolParams
        );
        let registry_on_chain = Pubkey::try_from(&data[POOL_REGISTRY_OFFSET..POOL_REGISTRY_OFFSET + 32])
            .map_err(|_| error!(PoolError::InvalidPoolParams))?;
        require_keys_eq!(registry_on_chain, ctx.accounts.registry.key(), PoolError::Unauthorized);
        u16::from_le_bytes([data[POOL_VERSION_OFFSET], data[POOL_VERSION_OFFSET + 1]])
    };
    require!(from_version < POOL_VERSION, PoolError::AlreadyMigrated);

    // 2. Fund and realloc
    let new_size = 8 + Pool::INIT_SPACE;
    let rent = Rent::get()?;
    let lamports_diff = rent.minimum_balance(new_size).saturating_sub(pool_info.lamports());
    if lamports_diff > 0 {
        invoke(
            &system_instruction::transfer(&ctx.accounts.admin.key(), &pool_info.key(), lamports_diff),
            &[
                ctx.accounts.admin.to_account_info(),
                pool_info.clone(),
                ctx.accounts.system_program.to_account_info(),
            ],
        )?;
    }
    if pool_info.data_len() < new_size {
        pool_info.realloc(new_size, true)?;
    }

    // 3. Stamp version
    {
        let mut data = pool_info.try_borrow_mut_data()?;
        data[POOL_VERSION_OFFSET..POOL_VERSION_OFFSET + 2].copy_from_slice(&POOL_VERSION.to_le_bytes());
    }

    msg!("Pool migrated to size: {}", new_size);
    emit!(PoolMigrated {
        pool: pool_info.key(),
        from_version,
        to_version: POOL_VERSION,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_header_offsets_match_serialized_pool() {
        let registry = Pubkey::new_unique();
        let pool = Pool {
            registry,
            index: 7,
            bump: 254,
            version: 3,
            ..Default::default()
        };

        let mut data = Vec::new();
        pool.try_serialize(&mut data).unwrap();

        assert_eq!(&data[..8], Pool::DISCRIMINATOR);
        assert_eq!(&data[POOL_REGISTRY_OFFSET..POOL_REGISTRY_OFFSET + 32], registry.as_ref());
        assert_eq!(
            u16::from_le_bytes([data[POOL_VERSION_OFFSET], data[POOL_VERSION_OFFSET + 1]]),
            3
        );
        assert!(data.len() <= 8 + Pool::INIT_SPACE);
    }
}
