use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    program::{invoke, invoke_signed},
    system_instruction,
};
use anchor_spl::token::{self, Mint, TokenAccount, Transfer};

use crate::errors::PoolError;
use crate::state::Pool;
use crate::utils::assert_collection_unit;

/// Reads an SPL token account passed through `remaining_accounts`.
pub fn read_token_account(info: &AccountInfo) -> Result<TokenAccount> {
    require_keys_eq!(*info.owner, token::ID, PoolError::UnitAccountMismatch);
    let data = info.try_borrow_data()?;
    let mut buf: &[u8] = &data;
    TokenAccount::try_deserialize(&mut buf).map_err(|_| error!(PoolError::UnitAccountMismatch))
}

pub fn read_mint(info: &AccountInfo) -> Result<Mint> {
    require_keys_eq!(*info.owner, token::ID, PoolError::NotCollectionUnit);
    let data = info.try_borrow_data()?;
    let mut buf: &[u8] = &data;
    Mint::try_deserialize(&mut buf).map_err(|_| error!(PoolError::NotCollectionUnit))
}

/// Vault PDA that custodies `unit` for `pool`.
pub fn unit_vault_address(pool: &Pubkey, unit: &Pubkey, program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[crate::UNIT_VAULT_SEED, pool.as_ref(), unit.as_ref()], program_id).0
}

/// Moves deposited units from `depositor` into the pool vaults.
///
/// `accounts` holds one `[unit_mint, depositor_unit_account, unit_vault]` triple per unit,
/// in the same order as `units`. Every mint must belong to the pool collection.
pub fn pull_units<'info>(
    pool: &Pool,
    pool_key: &Pubkey,
    program_id: &Pubkey,
    units: &[Pubkey],
    accounts: &'info [AccountInfo<'info>],
    depositor: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
) -> Result<()> {
    require!(accounts.len() == units.len() * 3, PoolError::UnitAccountMismatch);

    let amount = pool.unit_amount();
    for (unit, triple) in units.iter().zip(accounts.chunks(3)) {
        let (mint_info, from_info, vault_info) = (&triple[0], &triple[1], &triple[2]);

        require_keys_eq!(*mint_info.key, *unit, PoolError::UnitAccountMismatch);
        let mint = read_mint(mint_info)?;
        assert_collection_unit(&mint, &pool.collection, pool.kind)?;

        require_keys_eq!(
            unit_vault_address(pool_key, unit, program_id),
            *vault_info.key,
            PoolError::UnitAccountMismatch
        );
        let vault = read_token_account(vault_info)?;
        require_keys_eq!(vault.owner, *pool_key, PoolError::UnitAccountMismatch);

        let from = read_token_account(from_info)?;
        require_keys_eq!(from.mint, *unit, PoolError::UnitAccountMismatch);
        require_keys_eq!(from.owner, *depositor.key, PoolError::UnitAccountMismatch);

        token::transfer(
            CpiContext::new(
                token_program.clone(),
                Transfer {
                    from: from_info.clone(),
                    to: vault_info.clone(),
                    authority: depositor.clone(),
                },
            ),
            amount,
        )
        .map_err(|_| error!(PoolError::TransferRejected))?;
    }

    Ok(())
}

/// Native lamport transfer signed by the payer.
pub fn collect_lamports<'info>(
    from: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    invoke(
        &system_instruction::transfer(from.key, to.key, amount),
        &[from.clone(), to.clone(), system_program.clone()],
    )?;
    Ok(())
}

/// Native lamport transfer out of the pool's bid escrow PDA.
pub fn release_lamports<'info>(
    escrow: &AccountInfo<'info>,
    to: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
    pool_key: &Pubkey,
    escrow_bump: u8,
    amount: u64,
) -> Result<()> {
    let signer_seeds: &[&[&[u8]]] = &[&[crate::BID_ESCROW_SEED, pool_key.as_ref(), &[escrow_bump]]];
    invoke_signed(
        &system_instruction::transfer(escrow.key, to.key, amount),
        &[escrow.clone(), to.clone(), system_program.clone()],
        signer_seeds,
    )?;
    Ok(())
}
