use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod math;
pub mod state;
pub mod instructions;

use instructions::*;
use state::{AuctionView, CurveParams};

declare_id!("BidStrat111111111111111111111111111111111111");

/// NFT Strategy - a fungible token backed by an NFT treasury
///
/// - Strategy token minted/redeemed on a quadratic bonding curve
/// - Reserve spends on NFTs through allow-listed external calls, with a keeper reward
/// - Custodied NFTs are sold back through Dutch auctions paid in the strategy token
#[program]
pub mod nft_strategy {
    use super::*;

    /// Deploy a strategy token with its curve, fee and reward settings
    ///
    /// Creates the Strategy PDA and the strategy mint, funds the reserve vault's
    /// rent floor. Pass a reserve mint to run the strategy on an SPL reserve.
    pub fn deploy_strategy(ctx: Context<DeployStrategy>, params: DeployParams) -> Result<()> {
        instructions::deploy::deploy_strategy(ctx, params)
    }

    /// Set the curve of a strategy deployed without one (one-shot, owner only)
    pub fn initialize_curve(ctx: Context<InitializeCurve>, p0: u64, k: u64) -> Result<()> {
        instructions::deploy::initialize_curve(ctx, p0, k)
    }

    /// Mint `amount` strategy tokens paying native SOL
    ///
    /// # Arguments
    /// * `amount` - Strategy tokens to mint (base units)
    /// * `max_payment` - Most lamports the payer is willing to spend
    pub fn mint(ctx: Context<MintStrategy>, amount: u64, max_payment: u64) -> Result<u64> {
        instructions::mint::mint(ctx, amount, max_payment)
    }

    /// Mint `amount` strategy tokens paying the SPL reserve token
    pub fn mint_with_reserve_token(
        ctx: Context<MintWithReserveToken>,
        amount: u64,
        max_payment: u64,
    ) -> Result<u64> {
        instructions::mint::mint_with_reserve_token(ctx, amount, max_payment)
    }

    /// Burn `amount` strategy tokens for native SOL
    ///
    /// # Arguments
    /// * `amount` - Strategy tokens to redeem (base units)
    /// * `min_out` - Fewest lamports the holder accepts
    pub fn redeem(ctx: Context<Redeem>, amount: u64, min_out: u64) -> Result<u64> {
        instructions::redeem::redeem(ctx, amount, min_out)
    }

    /// Burn `amount` strategy tokens for the SPL reserve token
    pub fn redeem_for_reserve_token(
        ctx: Context<RedeemForReserveToken>,
        amount: u64,
        min_out: u64,
    ) -> Result<u64> {
        instructions::redeem::redeem_for_reserve_token(ctx, amount, min_out)
    }

    pub fn preview_mint(ctx: Context<ReadStrategy>, amount: u64) -> Result<u64> {
        instructions::views::preview_mint(ctx, amount)
    }

    pub fn preview_redeem(ctx: Context<ReadStrategy>, amount: u64) -> Result<u64> {
        instructions::views::preview_redeem(ctx, amount)
    }

    /// Strategy tokens a `budget` of reserve buys at the current supply
    pub fn preview_tokens_for_payment(ctx: Context<ReadStrategy>, budget: u64) -> Result<u64> {
        instructions::views::preview_tokens_for_payment(ctx, budget)
    }

    pub fn total_supply(ctx: Context<ReadStrategy>) -> Result<u64> {
        instructions::views::total_supply(ctx)
    }

    pub fn curve(ctx: Context<ReadStrategy>) -> Result<CurveParams> {
        instructions::views::curve(ctx)
    }

    /// Propose selling a custodied NFT through a Dutch auction
    ///
    /// Permissionless. The NFT must sit in the treasury, with no live auction
    /// and no pending proposal.
    pub fn propose_auction(
        ctx: Context<ProposeAuction>,
        start_price: u64,
        end_price: u64,
    ) -> Result<()> {
        instructions::proposal::propose_auction(ctx, start_price, end_price)
    }

    pub fn has_pending_proposal(ctx: Context<ReadProposal>) -> Result<bool> {
        instructions::views::has_pending_proposal(ctx)
    }

    /// Approve a pending proposal and start its auction (owner only)
    pub fn approve_proposal(ctx: Context<ApproveProposal>, proposal_id: u64) -> Result<()> {
        instructions::proposal::approve_proposal(ctx, proposal_id)
    }

    /// Start an auction without a proposal (owner only)
    pub fn start_auction(ctx: Context<StartAuction>, start_price: u64, end_price: u64) -> Result<()> {
        instructions::auction::start_auction(ctx, start_price, end_price)
    }

    pub fn reject_proposal(ctx: Context<RejectProposal>, proposal_id: u64) -> Result<()> {
        instructions::proposal::reject_proposal(ctx, proposal_id)
    }

    pub fn auction_info(ctx: Context<ReadAuction>) -> Result<AuctionView> {
        instructions::views::auction_info(ctx)
    }

    pub fn current_auction_price(ctx: Context<ReadAuction>) -> Result<u64> {
        instructions::views::current_auction_price(ctx)
    }

    /// Buy an auctioned NFT at its current price
    ///
    /// Burns the price in strategy tokens from the buyer and releases the NFT.
    /// `max_price` caps what the buyer accepts if the quote moved.
    pub fn accept_bid(ctx: Context<AcceptBid>, max_price: u64) -> Result<()> {
        instructions::accept_bid::accept_bid(ctx, max_price)
    }

    /// Stop a live auction, the NFT stays in custody (owner only)
    pub fn cancel_auction(ctx: Context<CancelAuction>) -> Result<()> {
        instructions::auction::cancel_auction(ctx)
    }

    /// Forward a call to an allow-listed program with the reserve vault as signer
    ///
    /// Permissionless. A caller other than the owner earns a reward on the
    /// reserve the call spent, when the reserve can afford it.
    ///
    /// # Arguments
    /// * `value` - Most reserve units (lamports or reserve tokens) the call may take from the vault
    /// * `data` - Instruction data passed through untouched
    pub fn execute_external_call<'info>(
        ctx: Context<'_, '_, 'info, 'info, ExecuteExternalCall<'info>>,
        value: u64,
        data: Vec<u8>,
    ) -> Result<Vec<u8>> {
        instructions::external_call::execute_external_call(ctx, value, data)
    }

    pub fn set_reward_percentage(ctx: Context<AdminUpdate>, new_bps: u16) -> Result<()> {
        instructions::admin::set_reward_percentage(ctx, new_bps)
    }

    pub fn get_reward_percentage(ctx: Context<ReadStrategy>) -> Result<u16> {
        instructions::views::get_reward_percentage(ctx)
    }

    pub fn set_external_targets(
        ctx: Context<AdminUpdate>,
        collection_program: Pubkey,
        registry_program: Pubkey,
    ) -> Result<()> {
        instructions::admin::set_external_targets(ctx, collection_program, registry_program)
    }

    pub fn transfer_authority(ctx: Context<AdminUpdate>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::transfer_authority(ctx, new_authority)
    }
}
