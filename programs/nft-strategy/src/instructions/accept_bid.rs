use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Burn, Mint, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::BidAccepted;
use crate::state::*;

/// Settle an auction: burn the current price from the buyer, release the NFT.
///
/// State is written back before either CPI runs, so a nested entry sees the
/// auction closed and the strategy locked.
pub fn accept_bid(ctx: Context<AcceptBid>, max_price: u64) -> Result<()> {
    let nft_mint = ctx.accounts.nft_mint.key();
    let vault_key = ctx.accounts.reserve_vault.key();
    require_custody(&ctx.accounts.custody_nft_account, &vault_key, &nft_mint)?;

    let clock = Clock::get()?;
    ctx.accounts.strategy.enter()?;

    // Checks and effects
    let price = ctx.accounts.auction.settle(
        clock.unix_timestamp,
        ctx.accounts.buyer_token_account.amount,
        max_price,
    )?;
    ctx.accounts.strategy.record_burn(price)?;

    ctx.accounts.strategy.exit(&crate::ID)?;
    ctx.accounts.auction.exit(&crate::ID)?;

    // Interactions
    if price > 0 {
        token::burn(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.strategy_mint.to_account_info(),
                    from: ctx.accounts.buyer_token_account.to_account_info(),
                    authority: ctx.accounts.buyer.to_account_info(),
                },
            ),
            price,
        )?;
    }

    let strategy_key = ctx.accounts.strategy.key();
    let seeds = &[
        RESERVE_VAULT_SEED,
        strategy_key.as_ref(),
        &[ctx.accounts.strategy.vault_bump],
    ];
    let signer = &[&seeds[..]];

    token::transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.custody_nft_account.to_account_info(),
                to: ctx.accounts.buyer_nft_account.to_account_info(),
                authority: ctx.accounts.reserve_vault.to_account_info(),
            },
            signer,
        ),
        1,
    )?;

    ctx.accounts.strategy.leave();

    let auction_id = ctx.accounts.auction.auction_id;
    emit!(BidAccepted {
        strategy: strategy_key,
        auction_id,
        nft_mint,
        buyer: ctx.accounts.buyer.key(),
        price,
        timestamp: clock.unix_timestamp,
    });

    msg!("Auction #{} settled at {} for NFT {}", auction_id, price, nft_mint);
    msg!("Supply after burn: {}", ctx.accounts.strategy.treasury.total_supply);

    Ok(())
}

#[derive(Accounts)]
pub struct AcceptBid<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(mut, address = strategy.strategy_mint)]
    pub strategy_mint: Account<'info, Mint>,

    /// Pays the price in strategy tokens
    #[account(
        mut,
        token::mint = strategy_mint,
        token::authority = buyer,
    )]
    pub buyer_token_account: Account<'info, TokenAccount>,

    pub nft_mint: Account<'info, Mint>,

    #[account(
        mut,
        seeds = [AUCTION_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump = auction.bump,
    )]
    pub auction: Account<'info, Auction>,

    #[account(
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    #[account(
        mut,
        constraint = custody_nft_account.owner == reserve_vault.key() @ StrategyError::NotInCustody,
    )]
    pub custody_nft_account: Account<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = buyer,
        associated_token::mint = nft_mint,
        associated_token::authority = buyer,
    )]
    pub buyer_nft_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}
