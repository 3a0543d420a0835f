use anchor_lang::prelude::*;

#[error_code]
pub enum StrategyError {
    #[msg("Target program is not on the allow-list")]
    InvalidTarget,

    #[msg("External call may not target this program")]
    SelfCall,

    #[msg("Reward percentage exceeds the configured maximum")]
    InvalidRewardPercentage,

    #[msg("NFT is not held by the treasury")]
    NotInCustody,

    #[msg("An auction is already active for this NFT")]
    AuctionActive,

    #[msg("A proposal is already pending for this NFT")]
    ProposalPending,

    #[msg("No active auction for this NFT")]
    NoActiveAuction,

    #[msg("Proposal does not exist")]
    ProposalNotFound,

    #[msg("Proposal is not pending")]
    ProposalNotPending,

    #[msg("Insufficient balance for operation")]
    InsufficientBalance,

    #[msg("Payment is below the quoted cost")]
    InsufficientPayment,

    #[msg("Price moved beyond the caller's limit")]
    SlippageExceeded,

    #[msg("Reserve cannot cover the payout")]
    InsufficientLiquidity,

    #[msg("Fee basis points exceeds maximum (10%)")]
    FeeTooHigh,

    #[msg("Curve parameters are invalid")]
    InvalidCurve,

    #[msg("Curve is already initialized")]
    CurveAlreadyInitialized,

    #[msg("Curve is not initialized, pricing unavailable")]
    PricingUnavailable,

    #[msg("Redeem amount exceeds total supply")]
    RedeemExceedsSupply,

    #[msg("Instruction does not match the strategy's reserve asset")]
    WrongReserveMode,

    #[msg("External call failed")]
    CallFailed,

    #[msg("Reentrant call rejected")]
    Reentrancy,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Unauthorized")]
    Unauthorized,

    #[msg("Invalid amount")]
    InvalidAmount,
}
