use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::Redeemed;
use crate::state::*;

/// Burn strategy tokens and pay out native SOL from the reserve vault
pub fn redeem(ctx: Context<Redeem>, amount: u64, min_out: u64) -> Result<u64> {
    require!(
        ctx.accounts.holder_token_account.amount >= amount,
        StrategyError::InsufficientBalance
    );

    let strategy = &mut ctx.accounts.strategy;
    strategy.require_native_reserve()?;

    let amount_out = strategy.process_redeem(amount, min_out)?;
    strategy.exit(&crate::ID)?;
    let clock = Clock::get()?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.strategy_mint.to_account_info(),
                from: ctx.accounts.holder_token_account.to_account_info(),
                authority: ctx.accounts.holder.to_account_info(),
            },
        ),
        amount,
    )?;

    if amount_out > 0 {
        let strategy_key = strategy.key();
        let seeds = &[RESERVE_VAULT_SEED, strategy_key.as_ref(), &[strategy.vault_bump]];
        let signer = &[&seeds[..]];

        system_program::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.reserve_vault.to_account_info(),
                    to: ctx.accounts.recipient.to_account_info(),
                },
                signer,
            ),
            amount_out,
        )?;
    }

    emit!(Redeemed {
        strategy: strategy.key(),
        from: ctx.accounts.holder.key(),
        to: ctx.accounts.recipient.key(),
        amount,
        amount_out,
        total_supply: strategy.treasury.total_supply,
        reserve_balance: strategy.treasury.reserve_balance,
        timestamp: clock.unix_timestamp,
    });

    msg!("Redeemed {} for {} lamports. Supply: {}", amount, amount_out, strategy.treasury.total_supply);

    Ok(amount_out)
}

#[derive(Accounts)]
pub struct Redeem<'info> {
    pub holder: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(mut, address = strategy.strategy_mint)]
    pub strategy_mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = strategy_mint,
        token::authority = holder,
    )]
    pub holder_token_account: Account<'info, TokenAccount>,

    /// Receives the SOL
    #[account(mut)]
    pub recipient: SystemAccount<'info>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Burn strategy tokens and pay out the SPL reserve token
pub fn redeem_for_reserve_token(
    ctx: Context<RedeemForReserveToken>,
    amount: u64,
    min_out: u64,
) -> Result<u64> {
    require!(
        ctx.accounts.holder_token_account.amount >= amount,
        StrategyError::InsufficientBalance
    );

    let strategy = &mut ctx.accounts.strategy;
    strategy.require_token_reserve()?;

    let amount_out = strategy.process_redeem(amount, min_out)?;
    strategy.exit(&crate::ID)?;
    let clock = Clock::get()?;

    token::burn(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Burn {
                mint: ctx.accounts.strategy_mint.to_account_info(),
                from: ctx.accounts.holder_token_account.to_account_info(),
                authority: ctx.accounts.holder.to_account_info(),
            },
        ),
        amount,
    )?;

    if amount_out > 0 {
        let strategy_key = strategy.key();
        let seeds = &[RESERVE_VAULT_SEED, strategy_key.as_ref(), &[strategy.vault_bump]];
        let signer = &[&seeds[..]];

        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault_reserve_account.to_account_info(),
                    to: ctx.accounts.recipient_reserve_account.to_account_info(),
                    authority: ctx.accounts.reserve_vault.to_account_info(),
                },
                signer,
            ),
            amount_out,
        )?;
    }

    emit!(Redeemed {
        strategy: strategy.key(),
        from: ctx.accounts.holder.key(),
        to: ctx.accounts.recipient_reserve_account.owner,
        amount,
        amount_out,
        total_supply: strategy.treasury.total_supply,
        reserve_balance: strategy.treasury.reserve_balance,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Redeemed {} for {} reserve tokens. Supply: {}",
        amount,
        amount_out,
        strategy.treasury.total_supply
    );

    Ok(amount_out)
}

#[derive(Accounts)]
pub struct RedeemForReserveToken<'info> {
    pub holder: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
        constraint = strategy.reserve_mint == Some(reserve_mint.key()) @ StrategyError::WrongReserveMode,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(mut, address = strategy.strategy_mint)]
    pub strategy_mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = strategy_mint,
        token::authority = holder,
    )]
    pub holder_token_account: Account<'info, TokenAccount>,

    pub reserve_mint: Account<'info, Mint>,

    #[account(
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    #[account(
        mut,
        associated_token::mint = reserve_mint,
        associated_token::authority = reserve_vault,
    )]
    pub vault_reserve_account: Account<'info, TokenAccount>,

    #[account(mut, token::mint = reserve_mint)]
    pub recipient_reserve_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}
