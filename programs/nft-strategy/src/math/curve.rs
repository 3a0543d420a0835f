//! Quadratic bonding curve.
//!
//! Marginal price is `k·x²` (x in whole strategy tokens, price in lamports or
//! reserve-token base units), so buying `a` tokens at supply `s` costs the area
//! under the curve over `[s, s + a]` and selling returns the area over `[s − a, s]`.
//! The fee is a premium on the way in and a discount on the way out, which opens a
//! spread between the two sides of the book.
//!
//! Every pricing path, on-chain or quoted off-chain, goes through this module.
use anchor_lang::prelude::*;

use crate::constants::{BPS_DENOMINATOR, CURVE_PRICE_DECIMALS, STRATEGY_TOKEN_DECIMALS};
use crate::errors::StrategyError;

// Expanded outside the prelude: the macro needs std's two-argument `Result`.
#[allow(clippy::assign_op_pattern)]
#[allow(clippy::ptr_offset_with_cast)]
#[allow(clippy::manual_range_contains)]
mod wide {
    uint::construct_uint! {
        pub struct U256(4);
    }
}

pub use wide::U256;

/// Token amounts enter cubed, `k` enters once.
fn curve_scale() -> U256 {
    U256::exp10(3 * STRATEGY_TOKEN_DECIMALS as usize + CURVE_PRICE_DECIMALS as usize)
}

fn mul(a: U256, b: U256) -> Result<U256> {
    Ok(a.checked_mul(b).ok_or(StrategyError::MathOverflow)?)
}

fn add(a: U256, b: U256) -> Result<U256> {
    Ok(a.checked_add(b).ok_or(StrategyError::MathOverflow)?)
}

fn to_u64(value: U256) -> Result<u64> {
    require!(value <= U256::from(u64::MAX), StrategyError::MathOverflow);
    Ok(value.low_u64())
}

/// Returns `(s²a, sa², a³)`.
fn cubic_terms(supply: u64, amount: u64) -> Result<(U256, U256, U256)> {
    let s = U256::from(supply);
    let a = U256::from(amount);
    Ok((
        mul(mul(s, s)?, a)?,
        mul(mul(s, a)?, a)?,
        mul(mul(a, a)?, a)?,
    ))
}

/// Cost of minting `amount` tokens on top of `supply`:
/// `k · (s²a + sa² + a³/3) · (1 + fee)`, rounded up.
///
/// Returns 0 when the curve is uninitialised (`k == 0`).
pub fn mint_cost(supply: u64, amount: u64, k: u64, fee_rate_bps: u16) -> Result<u64> {
    if k == 0 || amount == 0 {
        return Ok(0);
    }
    let three = U256::from(3u8);
    let (s2a, sa2, a3) = cubic_terms(supply, amount)?;
    let area = add(add(mul(three, s2a)?, mul(three, sa2)?)?, a3)?;

    let fee_factor = U256::from(BPS_DENOMINATOR + fee_rate_bps as u64);
    let gross = mul(mul(area, U256::from(k))?, fee_factor)?;
    let denominator = mul(mul(three, curve_scale())?, U256::from(BPS_DENOMINATOR))?;

    let (quotient, remainder) = gross.div_mod(denominator);
    let cost = if remainder.is_zero() {
        quotient
    } else {
        add(quotient, U256::one())?
    };
    to_u64(cost)
}

/// Value returned for redeeming `amount` tokens out of `supply`:
/// `k · (s²a − sa² + a³/3) · (1 − fee)`, rounded down.
///
/// Returns 0 when the curve is uninitialised (`k == 0`).
pub fn redeem_value(supply: u64, amount: u64, k: u64, fee_rate_bps: u16) -> Result<u64> {
    if k == 0 || amount == 0 {
        return Ok(0);
    }
    require!(amount <= supply, StrategyError::RedeemExceedsSupply);
    require!(
        fee_rate_bps as u64 <= BPS_DENOMINATOR,
        StrategyError::FeeTooHigh
    );

    let three = U256::from(3u8);
    let (s2a, sa2, a3) = cubic_terms(supply, amount)?;
    // s >= a, so s²a >= sa² and the subtraction cannot go negative
    let area = add(mul(three, s2a)? - mul(three, sa2)?, a3)?;

    let fee_factor = U256::from(BPS_DENOMINATOR - fee_rate_bps as u64);
    let net = mul(mul(area, U256::from(k))?, fee_factor)?;
    let denominator = mul(mul(three, curve_scale())?, U256::from(BPS_DENOMINATOR))?;

    to_u64(net / denominator)
}

/// Largest amount mintable at `supply` whose `mint_cost` fits in `budget`.
///
/// Exact on the integer grid: exponential bracketing followed by a binary search,
/// at most ~128 cost evaluations.
pub fn max_mint_for_payment(supply: u64, budget: u64, k: u64, fee_rate_bps: u16) -> Result<u64> {
    if k == 0 || budget == 0 {
        return Ok(0);
    }
    let headroom = u64::MAX - supply;
    if headroom == 0 {
        return Ok(0);
    }
    let affordable =
        |amount: u64| matches!(mint_cost(supply, amount, k, fee_rate_bps), Ok(cost) if cost <= budget);

    let mut hi: u64 = 1;
    while hi < headroom && affordable(hi) {
        hi = hi.saturating_mul(2).min(headroom);
    }
    if affordable(hi) {
        return Ok(hi);
    }

    let mut lo: u64 = 0;
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if affordable(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: u64 = 1_000_000_000;
    /// 3 lamport-SOL per token³, so the first whole token costs exactly 1 SOL
    const K: u64 = 3 * ONE * ONE;

    fn err(e: StrategyError) -> anchor_lang::error::Error {
        e.into()
    }

    #[test]
    fn first_token_costs_one_sol() {
        assert_eq!(mint_cost(0, ONE, K, 0).unwrap(), ONE);
        assert_eq!(mint_cost(0, ONE, K, 100).unwrap(), 1_010_000_000);
        assert_eq!(mint_cost(ONE, ONE, K, 0).unwrap(), 7 * ONE);
    }

    #[test]
    fn redeem_mirrors_mint_without_fee() {
        assert_eq!(redeem_value(2 * ONE, ONE, K, 0).unwrap(), 7 * ONE);
        assert_eq!(redeem_value(2 * ONE, ONE, K, 100).unwrap(), 6_930_000_000);
        assert_eq!(
            redeem_value(5 * ONE, 3 * ONE, K, 0).unwrap(),
            mint_cost(2 * ONE, 3 * ONE, K, 0).unwrap()
        );
    }

    #[test]
    fn uninitialised_curve_prices_at_zero() {
        assert_eq!(mint_cost(10 * ONE, ONE, 0, 100).unwrap(), 0);
        assert_eq!(redeem_value(10 * ONE, ONE, 0, 100).unwrap(), 0);
        assert_eq!(max_mint_for_payment(0, ONE, 0, 0).unwrap(), 0);
    }

    #[test]
    fn zero_amount_is_free() {
        assert_eq!(mint_cost(ONE, 0, K, 100).unwrap(), 0);
        assert_eq!(redeem_value(ONE, 0, K, 100).unwrap(), 0);
    }

    #[test]
    fn mint_cost_strictly_increases_in_supply_and_amount() {
        let amounts = [ONE / 1000, ONE / 10, ONE, 7 * ONE];
        let supplies = [0, ONE / 10, ONE, 10 * ONE, 1000 * ONE];

        for a in amounts {
            let costs: Vec<u64> = supplies
                .iter()
                .map(|s| mint_cost(*s, a, K, 50).unwrap())
                .collect();
            assert!(costs.windows(2).all(|w| w[0] < w[1]), "amount {a}: {costs:?}");
        }
        for s in supplies {
            let costs: Vec<u64> = amounts
                .iter()
                .map(|a| mint_cost(s, *a, K, 50).unwrap())
                .collect();
            assert!(costs.windows(2).all(|w| w[0] < w[1]), "supply {s}: {costs:?}");
        }
    }

    #[test]
    fn redeem_is_below_mint_when_fee_is_charged() {
        for (s, a) in [(ONE, ONE), (10 * ONE, ONE), (10 * ONE, 10 * ONE), (500 * ONE, 3 * ONE)] {
            let bid = redeem_value(s, a, K, 100).unwrap();
            let ask = mint_cost(s - a, a, K, 100).unwrap();
            assert!(bid < ask, "s={s} a={a}: {bid} !< {ask}");
        }
    }

    #[test]
    fn round_trip_is_not_value_neutral() {
        let supply = 4 * ONE;
        let cost = mint_cost(supply, ONE, K, 100).unwrap();
        let back = redeem_value(supply + ONE, ONE, K, 100).unwrap();
        assert!(back < cost);
    }

    #[test]
    fn redeeming_more_than_supply_is_rejected() {
        assert_eq!(
            redeem_value(ONE, ONE + 1, K, 0).unwrap_err(),
            err(StrategyError::RedeemExceedsSupply)
        );
    }

    #[test]
    fn cubic_overflow_is_reported() {
        assert_eq!(
            mint_cost(u64::MAX, u64::MAX, u64::MAX, 1000).unwrap_err(),
            err(StrategyError::MathOverflow)
        );
        // fits in 256 bits but not in a u64 price
        assert_eq!(
            mint_cost(0, 1_000_000 * ONE, K, 0).unwrap_err(),
            err(StrategyError::MathOverflow)
        );
    }

    #[test]
    fn max_mint_inverts_mint_cost() {
        assert_eq!(max_mint_for_payment(0, ONE, K, 0).unwrap(), ONE);

        for (supply, budget) in [(0, 3 * ONE), (ONE, ONE / 3), (25 * ONE, 100 * ONE), (7, 1)] {
            let amount = max_mint_for_payment(supply, budget, K, 100).unwrap();
            assert!(mint_cost(supply, amount, K, 100).unwrap() <= budget);
            assert!(mint_cost(supply, amount + 1, K, 100).unwrap() > budget);
        }
    }
}
