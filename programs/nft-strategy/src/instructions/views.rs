use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::StrategyError;
use crate::state::*;

// Read-only instructions; results travel back as return data.

pub fn preview_mint(ctx: Context<ReadStrategy>, amount: u64) -> Result<u64> {
    ctx.accounts.strategy.preview_mint(amount)
}

pub fn preview_redeem(ctx: Context<ReadStrategy>, amount: u64) -> Result<u64> {
    ctx.accounts.strategy.preview_redeem(amount)
}

pub fn preview_tokens_for_payment(ctx: Context<ReadStrategy>, budget: u64) -> Result<u64> {
    ctx.accounts.strategy.preview_tokens_for_payment(budget)
}

pub fn total_supply(ctx: Context<ReadStrategy>) -> Result<u64> {
    Ok(ctx.accounts.strategy.treasury.total_supply)
}

pub fn curve(ctx: Context<ReadStrategy>) -> Result<CurveParams> {
    Ok(ctx.accounts.strategy.curve)
}

pub fn get_reward_percentage(ctx: Context<ReadStrategy>) -> Result<u16> {
    Ok(ctx.accounts.strategy.reward.reward_percentage_bps)
}

pub fn has_pending_proposal(ctx: Context<ReadProposal>) -> Result<bool> {
    proposal_is_pending(&ctx.accounts.proposal)
}

/// Zeroed, inactive view for an NFT that was never auctioned
pub fn auction_info(ctx: Context<ReadAuction>) -> Result<AuctionView> {
    let now = Clock::get()?.unix_timestamp;
    Ok(match load_auction(&ctx.accounts.auction)? {
        Some(auction) => auction.view(now),
        None => AuctionView {
            active: false,
            auction_id: 0,
            nft_mint: ctx.accounts.nft_mint.key(),
            start_time: 0,
            current_price: 0,
            start_price: 0,
            end_price: 0,
        },
    })
}

pub fn current_auction_price(ctx: Context<ReadAuction>) -> Result<u64> {
    let auction = load_auction(&ctx.accounts.auction)?
        .filter(|auction| auction.active)
        .ok_or(StrategyError::NoActiveAuction)?;
    Ok(auction.current_price(Clock::get()?.unix_timestamp))
}

#[derive(Accounts)]
pub struct ReadStrategy<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,
}

#[derive(Accounts)]
pub struct ReadProposal<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    /// CHECK: only its key seeds the proposal PDA
    pub nft_mint: UncheckedAccount<'info>,

    /// CHECK: proposal PDA, may not exist; read by `proposal_is_pending`
    #[account(
        seeds = [PROPOSAL_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump,
    )]
    pub proposal: UncheckedAccount<'info>,
}

#[derive(Accounts)]
pub struct ReadAuction<'info> {
    #[account(
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    /// CHECK: only its key seeds the auction PDA
    pub nft_mint: UncheckedAccount<'info>,

    /// CHECK: auction PDA, may not exist; read by `load_auction`
    #[account(
        seeds = [AUCTION_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump,
    )]
    pub auction: UncheckedAccount<'info>,
}
