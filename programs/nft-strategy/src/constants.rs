/// Seeds
pub const STRATEGY_SEED: &[u8] = b"strategy";
pub const RESERVE_VAULT_SEED: &[u8] = b"reserve";
pub const AUCTION_SEED: &[u8] = b"auction";
pub const PROPOSAL_SEED: &[u8] = b"proposal";

/// Decimals of every strategy token mint
pub const STRATEGY_TOKEN_DECIMALS: u8 = 9;

/// Fixed-point decimals of `CurveParams::p0` and `CurveParams::k`
pub const CURVE_PRICE_DECIMALS: u32 = 9;

/// Basis point denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Maximum mint/redeem fee: 10%
pub const MAX_FEE_BPS: u16 = 1000;

/// Hard ceiling for the keeper reward cap: 10%
pub const MAX_REWARD_CAP_BPS: u16 = 1000;

/// Default keeper reward: 1%
pub const DEFAULT_REWARD_BPS: u16 = 100;

/// Every auction decays from start to end price over 24 hours
pub const AUCTION_DURATION_SECONDS: i64 = 86_400;
