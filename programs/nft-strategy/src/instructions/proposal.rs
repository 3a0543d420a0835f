use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, TokenAccount};

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::{AuctionProposed, AuctionStarted, ProposalRejected};
use crate::state::*;

/// Propose a Dutch auction for an NFT held by the treasury
/// Anyone may propose; the proposer pays the proposal account's rent
pub fn propose_auction(ctx: Context<ProposeAuction>, start_price: u64, end_price: u64) -> Result<()> {
    let nft_mint = ctx.accounts.nft_mint.key();

    require_custody(
        &ctx.accounts.custody_nft_account,
        &ctx.accounts.reserve_vault.key(),
        &nft_mint,
    )?;
    require!(
        !auction_is_active(&ctx.accounts.auction)?,
        StrategyError::AuctionActive
    );

    let clock = Clock::get()?;
    let strategy = &mut ctx.accounts.strategy;
    let proposal_id = strategy.take_proposal_id()?;

    let proposal = &mut ctx.accounts.proposal;
    proposal.submit(
        strategy.key(),
        nft_mint,
        proposal_id,
        ctx.accounts.proposer.key(),
        start_price,
        end_price,
        ctx.bumps.proposal,
    )?;

    emit!(AuctionProposed {
        strategy: strategy.key(),
        proposal_id,
        nft_mint,
        proposer: proposal.proposer,
        start_price,
        end_price,
        timestamp: clock.unix_timestamp,
    });

    msg!("Auction proposed #{} for NFT {}", proposal_id, nft_mint);
    msg!("Prices: {} -> {}", start_price, end_price);

    Ok(())
}

#[derive(Accounts)]
pub struct ProposeAuction<'info> {
    #[account(mut)]
    pub proposer: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
    )]
    pub strategy: Account<'info, Strategy>,

    pub nft_mint: Account<'info, Mint>,

    #[account(
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump = strategy.vault_bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    /// Vault-owned token account holding the NFT
    pub custody_nft_account: Account<'info, TokenAccount>,

    /// CHECK: auction PDA of this NFT, may not exist yet; read by `auction_is_active`
    #[account(
        seeds = [AUCTION_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump,
    )]
    pub auction: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = proposer,
        space = 8 + Proposal::SIZE,
        seeds = [PROPOSAL_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump,
    )]
    pub proposal: Account<'info, Proposal>,

    pub system_program: Program<'info, System>,
}

/// Approve a pending proposal and open its auction
/// The proposal account is closed and its rent returned to the proposer
pub fn approve_proposal(ctx: Context<ApproveProposal>, proposal_id: u64) -> Result<()> {
    let nft_mint = ctx.accounts.nft_mint.key();

    require_custody(
        &ctx.accounts.custody_nft_account,
        &ctx.accounts.reserve_vault.key(),
        &nft_mint,
    )?;

    let (start_price, end_price) = ctx.accounts.proposal.approve(proposal_id)?;

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

    msg!("Proposal #{} approved, auction #{} started", proposal_id, auction_id);

    Ok(())
}

#[derive(Accounts)]
pub struct ApproveProposal<'info> {
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

    #[account(
        mut,
        close = proposer,
        seeds = [PROPOSAL_SEED, strategy.key().as_ref(), nft_mint.key().as_ref()],
        bump = proposal.bump,
    )]
    pub proposal: Account<'info, Proposal>,

    /// Gets the proposal rent back
    #[account(mut, address = proposal.proposer)]
    pub proposer: SystemAccount<'info>,

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

/// Reject a pending proposal; the NFT may be proposed again
/// The proposal account is closed and its rent returned to the proposer
pub fn reject_proposal(ctx: Context<RejectProposal>, proposal_id: u64) -> Result<()> {
    let proposal = &mut ctx.accounts.proposal;
    let proposer = proposal.reject(proposal_id)?;

    emit!(ProposalRejected {
        strategy: ctx.accounts.strategy.key(),
        proposal_id,
        nft_mint: proposal.nft_mint,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Proposal #{} rejected, rent refunded to {}", proposal_id, proposer);

    Ok(())
}

#[derive(Accounts)]
pub struct RejectProposal<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
        has_one = authority @ StrategyError::Unauthorized,
    )]
    pub strategy: Account<'info, Strategy>,

    #[account(
        mut,
        close = proposer,
        seeds = [PROPOSAL_SEED, strategy.key().as_ref(), proposal.nft_mint.as_ref()],
        bump = proposal.bump,
    )]
    pub proposal: Account<'info, Proposal>,

    /// Gets the proposal rent back
    #[account(mut, address = proposal.proposer)]
    pub proposer: SystemAccount<'info>,
}
