use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::StrategyError;
use crate::math::curve;

/// Bonding curve parameters, fixed-point with `CURVE_PRICE_DECIMALS`.
/// `k == 0` means the curve has not been initialized yet.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CurveParams {
    /// Base offset, kept for integrations; not part of the mint/redeem integral
    pub p0: u64,
    /// Curvature of the marginal price `k·x²`
    pub k: u64,
}

impl CurveParams {
    pub const SIZE: usize = 8 + 8;

    pub fn is_initialized(&self) -> bool {
        self.k > 0
    }
}

/// Supply and reserve owned by the strategy
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreasuryState {
    /// Strategy tokens outstanding (base units)
    pub total_supply: u64,
    /// Reserve backing the curve, excluding the vault's rent-exempt floor
    pub reserve_balance: u64,
    /// Mint premium / redeem discount in basis points
    pub fee_rate_bps: u16,
}

impl TreasuryState {
    pub const SIZE: usize = 8 + 8 + 2;
}

/// Keeper reward settings
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardConfig {
    pub reward_percentage_bps: u16,
    pub max_reward_percentage_bps: u16,
}

impl RewardConfig {
    pub const SIZE: usize = 2 + 2;

    pub fn new(reward_percentage_bps: u16, max_reward_percentage_bps: u16) -> Result<Self> {
        require!(
            max_reward_percentage_bps <= MAX_REWARD_CAP_BPS,
            StrategyError::InvalidRewardPercentage
        );
        require!(
            reward_percentage_bps <= max_reward_percentage_bps,
            StrategyError::InvalidRewardPercentage
        );
        Ok(Self {
            reward_percentage_bps,
            max_reward_percentage_bps,
        })
    }

    /// Update the percentage, returning the previous one
    pub fn set_percentage(&mut self, new_bps: u16) -> Result<u16> {
        require!(
            new_bps <= self.max_reward_percentage_bps,
            StrategyError::InvalidRewardPercentage
        );
        let old = self.reward_percentage_bps;
        self.reward_percentage_bps = new_bps;
        Ok(old)
    }

    /// `value * bps / 10000`, rounded down
    pub fn reward_for(&self, value: u64) -> u64 {
        ((value as u128) * (self.reward_percentage_bps as u128) / (BPS_DENOMINATOR as u128)) as u64
    }
}

/// The two programs an external call may reach
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllowedTarget {
    /// Program managing the collection's NFTs (marketplace purchases, approvals)
    Collection,
    /// Registry the strategy reports into
    StrategyRegistry,
}

/// Strategy token state: ledger, curve, reward and allow-list.
/// PDA seeds: [b"strategy", strategy_mint.as_ref()]
#[account]
pub struct Strategy {
    /// Owner: approves proposals, cancels auctions, tunes rewards
    pub authority: Pubkey,

    /// SPL mint of the strategy token (mint authority = this PDA)
    pub strategy_mint: Pubkey,

    /// SPL reserve token, or None when the reserve is native SOL
    pub reserve_mint: Option<Pubkey>,

    pub curve: CurveParams,

    pub treasury: TreasuryState,

    pub reward: RewardConfig,

    /// Allow-listed external call targets
    pub collection_program: Pubkey,
    pub registry_program: Pubkey,

    /// Id counters, both start at 1
    pub next_auction_id: u64,
    pub next_proposal_id: u64,

    /// Set while an instruction that hands control to foreign code is running
    pub locked: bool,

    /// Unix timestamp when deployed
    pub created_at: i64,

    /// PDA bumps
    pub bump: u8,
    pub vault_bump: u8,
}

impl Strategy {
    pub const SIZE: usize = 32 + // authority
                            32 + // strategy_mint
                            33 + // reserve_mint
                            CurveParams::SIZE +
                            TreasuryState::SIZE +
                            RewardConfig::SIZE +
                            32 + // collection_program
                            32 + // registry_program
                            8 +  // next_auction_id
                            8 +  // next_proposal_id
                            1 +  // locked
                            8 +  // created_at
                            1 +  // bump
                            1;   // vault_bump

    pub fn uses_native_reserve(&self) -> bool {
        self.reserve_mint.is_none()
    }

    pub fn require_native_reserve(&self) -> Result<()> {
        require!(self.uses_native_reserve(), StrategyError::WrongReserveMode);
        Ok(())
    }

    pub fn require_token_reserve(&self) -> Result<()> {
        require!(!self.uses_native_reserve(), StrategyError::WrongReserveMode);
        Ok(())
    }

    /// One-shot curve initialization for strategies deployed without one
    pub fn initialize_curve(&mut self, p0: u64, k: u64) -> Result<()> {
        require!(!self.curve.is_initialized(), StrategyError::CurveAlreadyInitialized);
        require!(k > 0, StrategyError::InvalidCurve);
        self.curve = CurveParams { p0, k };
        Ok(())
    }

    pub fn preview_mint(&self, amount: u64) -> Result<u64> {
        curve::mint_cost(
            self.treasury.total_supply,
            amount,
            self.curve.k,
            self.treasury.fee_rate_bps,
        )
    }

    pub fn preview_redeem(&self, amount: u64) -> Result<u64> {
        curve::redeem_value(
            self.treasury.total_supply,
            amount,
            self.curve.k,
            self.treasury.fee_rate_bps,
        )
    }

    pub fn preview_tokens_for_payment(&self, budget: u64) -> Result<u64> {
        curve::max_mint_for_payment(
            self.treasury.total_supply,
            budget,
            self.curve.k,
            self.treasury.fee_rate_bps,
        )
    }

    /// Quote and book a mint. Returns the cost the payer must transfer.
    pub fn process_mint(&mut self, amount: u64, max_payment: u64) -> Result<u64> {
        require!(amount > 0, StrategyError::InvalidAmount);
        require!(self.curve.is_initialized(), StrategyError::PricingUnavailable);

        let cost = self.preview_mint(amount)?;
        require!(cost <= max_payment, StrategyError::InsufficientPayment);

        self.treasury.total_supply = self
            .treasury
            .total_supply
            .checked_add(amount)
            .ok_or(StrategyError::MathOverflow)?;
        self.treasury.reserve_balance = self
            .treasury
            .reserve_balance
            .checked_add(cost)
            .ok_or(StrategyError::MathOverflow)?;

        Ok(cost)
    }

    /// Quote and book a redeem. Returns the amount owed to the recipient.
    pub fn process_redeem(&mut self, amount: u64, min_out: u64) -> Result<u64> {
        require!(amount > 0, StrategyError::InvalidAmount);
        require!(self.curve.is_initialized(), StrategyError::PricingUnavailable);

        let amount_out = self.preview_redeem(amount)?;
        require!(
            self.treasury.reserve_balance >= amount_out,
            StrategyError::InsufficientLiquidity
        );
        require!(amount_out >= min_out, StrategyError::SlippageExceeded);

        self.treasury.total_supply -= amount;
        self.treasury.reserve_balance -= amount_out;

        Ok(amount_out)
    }

    /// Book tokens burned to settle an auction
    pub fn record_burn(&mut self, amount: u64) -> Result<()> {
        self.treasury.total_supply = self
            .treasury
            .total_supply
            .checked_sub(amount)
            .ok_or(StrategyError::MathOverflow)?;
        Ok(())
    }

    pub fn take_auction_id(&mut self) -> Result<u64> {
        let id = self.next_auction_id;
        self.next_auction_id = id.checked_add(1).ok_or(StrategyError::MathOverflow)?;
        Ok(id)
    }

    pub fn take_proposal_id(&mut self) -> Result<u64> {
        let id = self.next_proposal_id;
        self.next_proposal_id = id.checked_add(1).ok_or(StrategyError::MathOverflow)?;
        Ok(id)
    }

    /// Map a CPI target onto the allow-list
    pub fn resolve_target(&self, target: &Pubkey) -> Result<AllowedTarget> {
        require_keys_neq!(*target, crate::ID, StrategyError::SelfCall);
        if *target == self.collection_program {
            Ok(AllowedTarget::Collection)
        } else if *target == self.registry_program {
            Ok(AllowedTarget::StrategyRegistry)
        } else {
            err!(StrategyError::InvalidTarget)
        }
    }

    /// Book the lamports an external call pulled from the vault and work out the
    /// keeper reward.
    ///
    /// `spendable` is what the vault can still pay out (above its rent floor for
    /// a native reserve). A reward
    /// that either the ledger or the vault cannot cover is skipped, not failed.
    /// Returns the reward to pay (0 for none); the ledger is already debited for it.
    pub fn settle_external_call(
        &mut self,
        caller: &Pubkey,
        value: u64,
        forwarded: u64,
        spendable: u64,
    ) -> Result<u64> {
        require!(forwarded <= value, StrategyError::CallFailed);
        self.treasury.reserve_balance = self
            .treasury
            .reserve_balance
            .checked_sub(forwarded)
            .ok_or(StrategyError::InsufficientLiquidity)?;

        if *caller == self.authority || forwarded == 0 {
            return Ok(0);
        }
        let reward = self.reward.reward_for(forwarded);
        if reward == 0 || reward > self.treasury.reserve_balance || reward > spendable {
            return Ok(0);
        }

        self.treasury.reserve_balance -= reward;
        Ok(reward)
    }

    pub fn enter(&mut self) -> Result<()> {
        require!(!self.locked, StrategyError::Reentrancy);
        self.locked = true;
        Ok(())
    }

    pub fn leave(&mut self) {
        self.locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOL: u64 = 1_000_000_000;
    const K: u64 = 3 * SOL * SOL;

    fn err(e: StrategyError) -> anchor_lang::error::Error {
        e.into()
    }

    fn strategy(reward_bps: u16) -> Strategy {
        Strategy {
            authority: Pubkey::new_unique(),
            strategy_mint: Pubkey::new_unique(),
            reserve_mint: None,
            curve: CurveParams { p0: 0, k: K },
            treasury: TreasuryState {
                total_supply: 0,
                reserve_balance: 0,
                fee_rate_bps: 100,
            },
            reward: RewardConfig::new(reward_bps, MAX_REWARD_CAP_BPS).unwrap(),
            collection_program: Pubkey::new_unique(),
            registry_program: Pubkey::new_unique(),
            next_auction_id: 1,
            next_proposal_id: 1,
            locked: false,
            created_at: 0,
            bump: 255,
            vault_bump: 254,
        }
    }

    fn funded(reward_bps: u16, reserve: u64) -> Strategy {
        let mut s = strategy(reward_bps);
        s.treasury.reserve_balance = reserve;
        s
    }

    #[test]
    fn mint_books_supply_and_reserve() {
        let mut s = strategy(0);
        let cost = s.process_mint(SOL, 2 * SOL).unwrap();
        assert_eq!(cost, 1_010_000_000);
        assert_eq!(s.treasury.total_supply, SOL);
        assert_eq!(s.treasury.reserve_balance, cost);
    }

    #[test]
    fn mint_rejects_underpayment_without_side_effects() {
        let mut s = strategy(0);
        assert_eq!(
            s.process_mint(SOL, SOL).unwrap_err(),
            err(StrategyError::InsufficientPayment)
        );
        assert_eq!(s.treasury, strategy(0).treasury);
    }

    #[test]
    fn uninitialised_curve_blocks_trading() {
        let mut s = strategy(0);
        s.curve = CurveParams::default();
        assert_eq!(s.preview_mint(SOL).unwrap(), 0);
        assert_eq!(
            s.process_mint(SOL, u64::MAX).unwrap_err(),
            err(StrategyError::PricingUnavailable)
        );
        assert_eq!(
            s.process_redeem(SOL, 0).unwrap_err(),
            err(StrategyError::PricingUnavailable)
        );
    }

    #[test]
    fn curve_is_set_once() {
        let mut s = strategy(0);
        s.curve = CurveParams::default();
        assert_eq!(s.initialize_curve(1, 0).unwrap_err(), err(StrategyError::InvalidCurve));
        s.initialize_curve(7, K).unwrap();
        assert_eq!(s.curve, CurveParams { p0: 7, k: K });
        assert_eq!(
            s.initialize_curve(0, 2 * K).unwrap_err(),
            err(StrategyError::CurveAlreadyInitialized)
        );
    }

    #[test]
    fn redeem_pays_out_with_discount() {
        let mut s = strategy(0);
        let cost = s.process_mint(2 * SOL, u64::MAX).unwrap();
        let out = s.process_redeem(SOL, 0).unwrap();

        assert_eq!(out, 6_930_000_000);
        assert!(out < cost);
        assert_eq!(s.treasury.total_supply, SOL);
        assert_eq!(s.treasury.reserve_balance, cost - out);
    }

    #[test]
    fn redeem_enforces_slippage_and_liquidity() {
        let mut s = strategy(0);
        s.process_mint(2 * SOL, u64::MAX).unwrap();
        let before = s.treasury;

        assert_eq!(
            s.process_redeem(SOL, 7 * SOL).unwrap_err(),
            err(StrategyError::SlippageExceeded)
        );
        s.treasury.reserve_balance = SOL;
        assert_eq!(
            s.process_redeem(SOL, 0).unwrap_err(),
            err(StrategyError::InsufficientLiquidity)
        );
        s.treasury.reserve_balance = before.reserve_balance;
        assert_eq!(s.treasury, before);
        assert_eq!(
            s.process_redeem(3 * SOL, 0).unwrap_err(),
            err(StrategyError::RedeemExceedsSupply)
        );
    }

    #[test]
    fn reward_arithmetic_scales_linearly() {
        let mut reward = RewardConfig::new(100, 1000).unwrap();
        assert_eq!(reward.reward_for(SOL), 10_000_000);
        assert_eq!(reward.reward_for(SOL / 1000), 10_000);

        assert_eq!(reward.set_percentage(200).unwrap(), 100);
        assert_eq!(reward.reward_for(2 * SOL), 40_000_000);
    }

    #[test]
    fn reward_cap_is_enforced() {
        let mut reward = RewardConfig::new(100, 1000).unwrap();
        assert_eq!(
            reward.set_percentage(1500).unwrap_err(),
            err(StrategyError::InvalidRewardPercentage)
        );
        assert_eq!(reward.reward_percentage_bps, 100);
        reward.set_percentage(1000).unwrap();

        assert!(RewardConfig::new(100, 1001).is_err());
        assert!(RewardConfig::new(600, 500).is_err());
    }

    #[test]
    fn keeper_is_paid_from_reserve() {
        let mut s = funded(100, 10 * SOL);
        let keeper = Pubkey::new_unique();

        let reward = s.settle_external_call(&keeper, SOL, SOL, 9 * SOL).unwrap();
        assert_eq!(reward, 10_000_000);
        assert_eq!(s.treasury.reserve_balance, 9 * SOL - 10_000_000);
    }

    #[test]
    fn owner_is_not_rewarded() {
        let mut s = funded(100, 10 * SOL);
        let owner = s.authority;

        assert_eq!(s.settle_external_call(&owner, SOL, SOL, 9 * SOL).unwrap(), 0);
        assert_eq!(s.treasury.reserve_balance, 9 * SOL);
    }

    #[test]
    fn reward_fails_open_when_reserve_is_short() {
        let mut s = funded(1000, 10 * SOL);
        let keeper = Pubkey::new_unique();

        // the purchase drains the reserve, 10% of it cannot be paid
        assert_eq!(s.settle_external_call(&keeper, 10 * SOL, 10 * SOL, 0).unwrap(), 0);
        assert_eq!(s.treasury.reserve_balance, 0);

        // ledger has room, vault lamports do not
        let mut s = funded(1000, 10 * SOL);
        assert_eq!(s.settle_external_call(&keeper, SOL, SOL, 50_000_000).unwrap(), 0);
        assert_eq!(s.treasury.reserve_balance, 9 * SOL);
    }

    #[test]
    fn zero_value_or_zero_percentage_pays_nothing() {
        let keeper = Pubkey::new_unique();

        let mut s = funded(100, 10 * SOL);
        assert_eq!(s.settle_external_call(&keeper, 0, 0, 10 * SOL).unwrap(), 0);
        assert_eq!(s.treasury.reserve_balance, 10 * SOL);

        let mut s = funded(0, 10 * SOL);
        assert_eq!(s.settle_external_call(&keeper, SOL, SOL, 9 * SOL).unwrap(), 0);
        assert_eq!(s.treasury.reserve_balance, 9 * SOL);
    }

    #[test]
    fn call_may_not_spend_beyond_value() {
        let mut s = funded(100, 10 * SOL);
        let keeper = Pubkey::new_unique();
        assert_eq!(
            s.settle_external_call(&keeper, SOL, SOL + 1, 9 * SOL).unwrap_err(),
            err(StrategyError::CallFailed)
        );
    }

    #[test]
    fn targets_are_restricted_to_the_allow_list() {
        let s = strategy(100);
        assert_eq!(
            s.resolve_target(&crate::ID).unwrap_err(),
            err(StrategyError::SelfCall)
        );
        assert_eq!(
            s.resolve_target(&Pubkey::new_unique()).unwrap_err(),
            err(StrategyError::InvalidTarget)
        );
        assert_eq!(
            s.resolve_target(&s.collection_program).unwrap(),
            AllowedTarget::Collection
        );
        assert_eq!(
            s.resolve_target(&s.registry_program).unwrap(),
            AllowedTarget::StrategyRegistry
        );
    }

    #[test]
    fn reserve_token_outflow_is_debited_from_ledger() {
        let mut s = strategy(100);
        s.reserve_mint = Some(Pubkey::new_unique());
        let cost = s.process_mint(2 * SOL, u64::MAX).unwrap();
        assert_eq!(cost, 8_080_000_000);

        // the call moved 8 reserve tokens out of the vault's token account
        let keeper = Pubkey::new_unique();
        let vault_after = cost - 8 * SOL;
        let reward = s
            .settle_external_call(&keeper, 8 * SOL, 8 * SOL, vault_after)
            .unwrap();
        assert_eq!(reward, 80_000_000);
        assert_eq!(s.treasury.reserve_balance, 0);

        // backing that left the vault can no longer be redeemed
        assert_eq!(
            s.process_redeem(SOL, 0).unwrap_err(),
            err(StrategyError::InsufficientLiquidity)
        );
    }

    #[test]
    fn guard_rejects_nested_entry() {
        let mut s = strategy(0);
        s.enter().unwrap();
        assert_eq!(s.enter().unwrap_err(), err(StrategyError::Reentrancy));
        s.leave();
        s.enter().unwrap();
    }

    #[test]
    fn ids_are_sequential() {
        let mut s = strategy(0);
        assert_eq!(s.take_auction_id().unwrap(), 1);
        assert_eq!(s.take_auction_id().unwrap(), 2);
        assert_eq!(s.take_proposal_id().unwrap(), 1);
    }
}
