use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
use anchor_lang::solana_program::program::{get_return_data, invoke_signed};
use anchor_lang::system_program;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::{ExternalCallExecuted, RewardPaid};
use crate::state::*;

/// Forward an instruction to an allow-listed program, signed by the reserve vault.
///
/// `remaining_accounts` become the forwarded instruction's accounts; the vault
/// is marked as signer wherever it appears. The call may take at most `value`
/// reserve units from the vault: lamports for a native reserve, tokens out of
/// the vault's reserve account otherwise. A caller other than the owner is
/// rewarded on what the call actually took, when the reserve can spare it.
pub fn execute_external_call<'info>(
    ctx: Context<'_, '_, 'info, 'info, ExecuteExternalCall<'info>>,
    value: u64,
    data: Vec<u8>,
) -> Result<Vec<u8>> {
    let target = ctx.accounts.target_program.key();
    let caller = ctx.accounts.caller.key();
    let vault_key = ctx.accounts.reserve_vault.key();

    let allowed = ctx.accounts.strategy.resolve_target(&target)?;
    let reserve_mint = ctx.accounts.strategy.reserve_mint;
    if let Some(mint) = reserve_mint {
        let vault_reserve = ctx
            .accounts
            .vault_reserve_account
            .as_ref()
            .ok_or(StrategyError::WrongReserveMode)?;
        require!(
            vault_reserve.owner == vault_key && vault_reserve.mint == mint,
            StrategyError::WrongReserveMode
        );
        if let Some(caller_reserve) = ctx.accounts.caller_reserve_account.as_ref() {
            require!(caller_reserve.mint == mint, StrategyError::WrongReserveMode);
        }
    }

    ctx.accounts.strategy.enter()?;
    require!(
        value <= ctx.accounts.strategy.treasury.reserve_balance,
        StrategyError::InsufficientLiquidity
    );
    ctx.accounts.strategy.exit(&crate::ID)?;

    let strategy_key = ctx.accounts.strategy.key();
    let seeds = &[
        RESERVE_VAULT_SEED,
        strategy_key.as_ref(),
        &[ctx.accounts.strategy.vault_bump],
    ];
    let signer = &[&seeds[..]];

    let metas: Vec<AccountMeta> = ctx
        .remaining_accounts
        .iter()
        .map(|info| AccountMeta {
            pubkey: info.key(),
            is_signer: info.is_signer || info.key() == vault_key,
            is_writable: info.is_writable,
        })
        .collect();
    let ix = Instruction {
        program_id: target,
        accounts: metas,
        data,
    };
    let mut infos = ctx.remaining_accounts.to_vec();
    infos.push(ctx.accounts.target_program.to_account_info());

    let before = vault_reserve_units(ctx.accounts)?;
    invoke_signed(&ix, &infos, signer).map_err(|e| {
        msg!("External call to {} failed: {}", target, e);
        error!(StrategyError::CallFailed)
    })?;
    if let Some(vault_reserve) = ctx.accounts.vault_reserve_account.as_mut() {
        vault_reserve.reload()?;
    }
    let after = vault_reserve_units(ctx.accounts)?;

    let return_data = match get_return_data() {
        Some((program_id, data)) if program_id == target => data,
        _ => Vec::new(),
    };

    let forwarded = before.saturating_sub(after);
    let spendable = if reserve_mint.is_some() {
        // No destination for a token reward means no reward
        let payable = ctx.accounts.caller_reserve_account.is_some()
            && ctx.accounts.token_program.is_some();
        if payable {
            after
        } else {
            0
        }
    } else {
        after.saturating_sub(Rent::get()?.minimum_balance(0))
    };
    let reward = ctx
        .accounts
        .strategy
        .settle_external_call(&caller, value, forwarded, spendable)?;

    let clock = Clock::get()?;
    if reward > 0 {
        if reserve_mint.is_some() {
            let (Some(vault_reserve), Some(caller_reserve), Some(token_program)) = (
                &ctx.accounts.vault_reserve_account,
                &ctx.accounts.caller_reserve_account,
                &ctx.accounts.token_program,
            ) else {
                return err!(StrategyError::WrongReserveMode);
            };
            token::transfer(
                CpiContext::new_with_signer(
                    token_program.to_account_info(),
                    Transfer {
                        from: vault_reserve.to_account_info(),
                        to: caller_reserve.to_account_info(),
                        authority: ctx.accounts.reserve_vault.to_account_info(),
                    },
                    signer,
                ),
                reward,
            )?;
        } else {
            system_program::transfer(
                CpiContext::new_with_signer(
                    ctx.accounts.system_program.to_account_info(),
                    system_program::Transfer {
                        from: ctx.accounts.reserve_vault.to_account_info(),
                        to: ctx.accounts.caller.to_account_info(),
                    },
                    signer,
                ),
                reward,
            )?;
        }

        emit!(RewardPaid {
            strategy: strategy_key,
            caller,
            reward,
            timestamp: clock.unix_timestamp,
        });
    }

    ctx.accounts.strategy.leave();

    emit!(ExternalCallExecuted {
        strategy: strategy_key,
        caller,
        target,
        value,
        forwarded,
        timestamp: clock.unix_timestamp,
    });

    msg!("External call to {:?} {} forwarded {}/{}", allowed, target, forwarded, value);
    if reward > 0 {
        msg!("Reward paid: {}", reward);
    }

    Ok(return_data)
}

/// Reserve held by the vault: reserve tokens when the strategy has a reserve
/// mint, lamports otherwise
fn vault_reserve_units(accounts: &ExecuteExternalCall) -> Result<u64> {
    if accounts.strategy.uses_native_reserve() {
        return Ok(accounts.reserve_vault.lamports());
    }
    let vault_reserve = accounts
        .vault_reserve_account
        .as_ref()
        .ok_or(StrategyError::WrongReserveMode)?;
    Ok(vault_reserve.amount)
}

#[derive(Accounts)]
pub struct ExecuteExternalCall<'info> {
    /// Anyone; earns the keeper reward unless it is the owner
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    /// CHECK: matched against the strategy's allow-list by `resolve_target`
    #[account(executable)]
    pub target_program: UncheckedAccount<'info>,

    /// Vault's reserve token account; required when the reserve is an SPL token
    #[account(mut)]
    pub vault_reserve_account: Option<Account<'info, TokenAccount>>,

    /// Receives a keeper reward paid in reserve tokens
    #[account(mut)]
    pub caller_reserve_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Option<Program<'info, Token>>,

    pub system_program: Program<'info, System>,
}
