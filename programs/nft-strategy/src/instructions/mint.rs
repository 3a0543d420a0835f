use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Mint, MintTo, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::Minted;
use crate::state::*;

/// Mint strategy tokens against a native SOL reserve
///
/// The payer is charged the exact curve cost; `max_payment` only bounds it.
pub fn mint(ctx: Context<MintStrategy>, amount: u64, max_payment: u64) -> Result<u64> {
    let strategy = &mut ctx.accounts.strategy;
    strategy.require_native_reserve()?;

    let cost = strategy.process_mint(amount, max_payment)?;
    strategy.exit(&crate::ID)?;
    let clock = Clock::get()?;

    if cost > 0 {
        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.payer.to_account_info(),
                    to: ctx.accounts.reserve_vault.to_account_info(),
                },
            ),
            cost,
        )?;
    }

    mint_strategy_tokens(
        strategy,
        ctx.accounts.strategy_mint.to_account_info(),
        ctx.accounts.receiver_token_account.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
    )?;

    emit!(Minted {
        strategy: strategy.key(),
        payer: ctx.accounts.payer.key(),
        receiver: ctx.accounts.receiver_token_account.owner,
        amount,
        cost,
        total_supply: strategy.treasury.total_supply,
        reserve_balance: strategy.treasury.reserve_balance,
        timestamp: clock.unix_timestamp,
    });

    msg!("Minted {} for {} lamports. Supply: {}", amount, cost, strategy.treasury.total_supply);

    Ok(cost)
}

#[derive(Accounts)]
pub struct MintStrategy<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(mut, address = strategy.strategy_mint)]
    pub strategy_mint: Account<'info, Mint>,

    /// Receives the minted tokens, any owner
    #[account(mut, token::mint = strategy_mint)]
    pub receiver_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Mint strategy tokens against an SPL reserve
pub fn mint_with_reserve_token(
    ctx: Context<MintWithReserveToken>,
    amount: u64,
    max_payment: u64,
) -> Result<u64> {
    let strategy = &mut ctx.accounts.strategy;
    strategy.require_token_reserve()?;

    let cost = strategy.process_mint(amount, max_payment)?;
    strategy.exit(&crate::ID)?;
    let clock = Clock::get()?;

    require!(
        ctx.accounts.payer_reserve_account.amount >= cost,
        StrategyError::InsufficientPayment
    );

    if cost > 0 {
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.payer_reserve_account.to_account_info(),
                    to: ctx.accounts.vault_reserve_account.to_account_info(),
                    authority: ctx.accounts.payer.to_account_info(),
                },
            ),
            cost,
        )?;
    }

    mint_strategy_tokens(
        strategy,
        ctx.accounts.strategy_mint.to_account_info(),
        ctx.accounts.receiver_token_account.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
    )?;

    emit!(Minted {
        strategy: strategy.key(),
        payer: ctx.accounts.payer.key(),
        receiver: ctx.accounts.receiver_token_account.owner,
        amount,
        cost,
        total_supply: strategy.treasury.total_supply,
        reserve_balance: strategy.treasury.reserve_balance,
        timestamp: clock.unix_timestamp,
    });

    msg!(
        "Minted {} for {} reserve tokens. Supply: {}",
        amount,
        cost,
        strategy.treasury.total_supply
    );

    Ok(cost)
}

#[derive(Accounts)]
pub struct MintWithReserveToken<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
        constraint = strategy.reserve_mint == Some(reserve_mint.key()) @ StrategyError::WrongReserveMode,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(mut, address = strategy.strategy_mint)]
    pub strategy_mint: Account<'info, Mint>,

    #[account(mut, token::mint = strategy_mint)]
    pub receiver_token_account: Account<'info, TokenAccount>,

    pub reserve_mint: Account<'info, Mint>,

    #[account(
        mut,
        token::mint = reserve_mint,
        token::authority = payer,
    )]
    pub payer_reserve_account: Account<'info, TokenAccount>,

    #[account(
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    /// Vault's reserve token account (created on first mint)
    #[account(
        init_if_needed,
        payer = payer,
        associated_token::mint = reserve_mint,
        associated_token::authority = reserve_vault,
    )]
    pub vault_reserve_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

/// Mint with the strategy PDA as mint authority
fn mint_strategy_tokens<'info>(
    strategy: &Account<'info, Strategy>,
    mint: AccountInfo<'info>,
    to: AccountInfo<'info>,
    token_program: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let mint_key = strategy.strategy_mint;
    let seeds = &[STRATEGY_SEED, mint_key.as_ref(), &[strategy.bump]];
    let signer = &[&seeds[..]];

    token::mint_to(
        CpiContext::new_with_signer(
            token_program,
            MintTo {
                mint,
                to,
                authority: strategy.to_account_info(),
            },
            signer,
        ),
        amount,
    )
}
