use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, TokenAccount};

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::{AuctionCancelled, AuctionStarted};
use crate::state::*;

/// Open an auction for a custodied NFT without going through a proposal.
/// A pending proposal for the same NFT has to be approved or rejected first.
pub fn start_auction(ctx: Context<StartAuction>, start_price: u64, end_price: u64) -> Result<()> {
    let nft_mint = ctx.accounts.nft_mint.key();

    require_custody(
        &ctx.accounts.custody_nft_account,
        &ctx.accounts.reserve_vault.key(),
        &nft_mint,
    )?;
    require!(
        !proposal_is_pending(&ctx.accounts.proposal)?,
        StrategyError::ProposalPending
    );

    let clock = Clock::get()?;
    let strategy = &mut ctx.accounts.strategy;
    let auction_id = strategy.take_auction_id()?;

    let auction = &mut ctx.accounts.auction;
    auction.open(
        strategy.key(),
        nft_mint,
        auction_id,
        start_price,
        end_price,
        clock.unix_timestamp,
        ctx.bumps.auction,
    )?;

    emit!(AuctionStarted {
        strategy: strategy.key(),
        auction_id,
        nft_mint,
        start_price,
        end_price,
        start_time: auction.start_time,
    });

    msg!("Auction #{} started for NFT {}", auction_id, nft_mint);
    msg!("Prices: {} -> {}", start_price, end_price);

    Ok(())
}

#[derive(Accounts)]
pub struct StartAuction<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
        has_one = authority @ StrategyError::Unauthorized,
    )]
    pub strategy: Account<'info, Strategy>,

    pub nft_mint: Account<'info, Mint>,

    #[account(
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    pub custody_nft_account: Account<'info, TokenAccount>,

    /// CHECK: proposal PDA of this NFT, may not exist; read by `proposal_is_pending`
    #[account(
        seeds = [PROPOSAL_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump,
    )]
    pub proposal: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = authority,
        space = 8 + Auction::SIZE,
        seeds = [AUCTION_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump,
    )]
    pub auction: Account<'info, Auction>,

    pub system_program: Program<'info, System>,
}

/// Stop a live auction; the NFT stays in custody
pub fn cancel_auction(ctx: Context<CancelAuction>) -> Result<()> {
    let auction = &mut ctx.accounts.auction;
    auction.cancel()?;

    emit!(AuctionCancelled {
        strategy: ctx.accounts.strategy.key(),
        auction_id: auction.auction_id,
        nft_mint: auction.nft_mint,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Auction #{} cancelled", auction.auction_id);

    Ok(())
}

#[derive(Accounts)]
pub struct CancelAuction<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
        has_one = authority @ StrategyError::Unauthorized,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(
        mut,
        seeds = [AUCTION_SEED, strategy.key().as_ref(), auction.nft_mint.as_ref()],
        bump = auction.bump,
    )]
    pub auction: Account<'info, Auction>,
}
