use anchor_lang::prelude::*;

/// Emitted when a strategy token is deployed
#[event]
pub struct TokenDeployed {
    pub strategy: Pubkey,
    pub strategy_mint: Pubkey,
    pub authority: Pubkey,
    pub reserve_mint: Option<Pubkey>,
    pub fee_rate_bps: u16,
    pub p0: u64,
    pub k: u64,
    pub timestamp: i64,
}

/// Emitted when a deferred curve is set
#[event]
pub struct CurveInitialized {
    pub strategy: Pubkey,
    pub p0: u64,
    pub k: u64,
    pub timestamp: i64,
}

/// Emitted when strategy tokens are minted against the curve
#[event]
pub struct Minted {
    pub strategy: Pubkey,
    pub payer: Pubkey,
    pub receiver: Pubkey,
    pub amount: u64,
    pub cost: u64,
    pub total_supply: u64,
    pub reserve_balance: u64,
    pub timestamp: i64,
}

/// Emitted when strategy tokens are redeemed for reserve
#[event]
pub struct Redeemed {
    pub strategy: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
    pub amount_out: u64,
    pub total_supply: u64,
    pub reserve_balance: u64,
    pub timestamp: i64,
}

#[event]
pub struct AuctionProposed {
    pub strategy: Pubkey,
    pub proposal_id: u64,
    pub nft_mint: Pubkey,
    pub proposer: Pubkey,
    pub start_price: u64,
    pub end_price: u64,
    pub timestamp: i64,
}

#[event]
pub struct ProposalRejected {
    pub strategy: Pubkey,
    pub proposal_id: u64,
    pub nft_mint: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct AuctionStarted {
    pub strategy: Pubkey,
    pub auction_id: u64,
    pub nft_mint: Pubkey,
    pub start_price: u64,
    pub end_price: u64,
    pub start_time: i64,
}

/// Emitted when a buyer settles an auction
#[event]
pub struct BidAccepted {
    pub strategy: Pubkey,
    pub auction_id: u64,
    pub nft_mint: Pubkey,
    pub buyer: Pubkey,
    pub price: u64,
    pub timestamp: i64,
}

#[event]
pub struct AuctionCancelled {
    pub strategy: Pubkey,
    pub auction_id: u64,
    pub nft_mint: Pubkey,
    pub timestamp: i64,
}

/// Emitted after every successful allow-listed external call
#[event]
pub struct ExternalCallExecuted {
    pub strategy: Pubkey,
    pub caller: Pubkey,
    pub target: Pubkey,
    pub value: u64,
    pub forwarded: u64,
    pub timestamp: i64,
}

/// Emitted when a keeper reward is paid out of the reserve
#[event]
pub struct RewardPaid {
    pub strategy: Pubkey,
    pub caller: Pubkey,
    pub reward: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardPercentageUpdated {
    pub strategy: Pubkey,
    pub old_bps: u16,
    pub new_bps: u16,
    pub timestamp: i64,
}

#[event]
pub struct AuthorityTransferred {
    pub strategy: Pubkey,
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
    pub timestamp: i64,
}
