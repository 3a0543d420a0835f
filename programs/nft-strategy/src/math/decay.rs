use crate::constants::AUCTION_DURATION_SECONDS;

/// Dutch auction price at `now`.
///
/// Linear from `start_price` at `start_time` to `end_price` after
/// `AUCTION_DURATION_SECONDS`, clamped on both sides. An auction with
/// `start_price < end_price` ramps upward through the same formula.
pub fn current_price(start_price: u64, end_price: u64, start_time: i64, now: i64) -> u64 {
    if now <= start_time {
        return start_price;
    }
    let elapsed = now.saturating_sub(start_time);
    if elapsed >= AUCTION_DURATION_SECONDS {
        return end_price;
    }

    let delta = end_price as i128 - start_price as i128;
    let price = start_price as i128 + delta * elapsed as i128 / AUCTION_DURATION_SECONDS as i128;
    // bounded by start_price and end_price
    price as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: i64 = 1_700_000_000;
    const DAY: i64 = AUCTION_DURATION_SECONDS;

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(current_price(1_000, 100, START, START), 1_000);
        assert_eq!(current_price(1_000, 100, START, START + DAY), 100);
        assert_eq!(current_price(1_000, 100, START, START - 3_600), 1_000);
        assert_eq!(current_price(1_000, 100, START, START + 10 * DAY), 100);
    }

    #[test]
    fn halfway_is_the_midpoint() {
        assert_eq!(current_price(1_000, 0, START, START + DAY / 2), 500);
        assert_eq!(current_price(0, 1_000, START, START + DAY / 2), 500);
    }

    #[test]
    fn descending_price_never_increases() {
        let mut last = u64::MAX;
        for t in (0..=DAY + 60).step_by(97) {
            let price = current_price(5_000_000_000, 1_000_000, START, START + t);
            assert!(price <= last);
            assert!((1_000_000..=5_000_000_000).contains(&price));
            last = price;
        }
    }

    #[test]
    fn ascending_ramp_stays_in_bounds() {
        let mut last = 0;
        for t in (0..=DAY).step_by(331) {
            let price = current_price(10, 10_000, START, START + t);
            assert!(price >= last);
            assert!((10..=10_000).contains(&price));
            last = price;
        }
        assert_eq!(current_price(10, 10_000, START, START + DAY), 10_000);
    }

    #[test]
    fn flat_auction_holds_price() {
        for t in [0, 1, DAY / 3, DAY] {
            assert_eq!(current_price(42, 42, START, START + t), 42);
        }
    }

    #[test]
    fn extreme_prices_do_not_overflow() {
        // descending ramps truncate toward the start price
        assert_eq!(current_price(u64::MAX, 0, START, START + DAY / 2), u64::MAX / 2 + 1);
        assert_eq!(current_price(0, u64::MAX, i64::MIN, i64::MAX), u64::MAX);
    }
}
