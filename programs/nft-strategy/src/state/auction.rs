use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::errors::StrategyError;
use crate::math::decay;

/// Dutch auction for one custodied NFT
/// PDA seeds: [b"auction", strategy.as_ref(), nft_mint.as_ref()]
///
/// The account outlives individual auctions: it is reopened for the next sale
/// of the same NFT, `active` gates every transition.
#[account]
pub struct Auction {
    pub strategy: Pubkey,

    /// NFT being sold
    pub nft_mint: Pubkey,

    /// Strategy-wide sequence number of the current (or last) auction
    pub auction_id: u64,

    pub active: bool,

    /// Unix timestamp the decay starts from
    pub start_time: i64,

    /// Prices in strategy token base units
    pub start_price: u64,
    pub end_price: u64,

    /// PDA bump
    pub bump: u8,
}

/// Read model returned by the `auction_info` view
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AuctionView {
    pub active: bool,
    pub auction_id: u64,
    pub nft_mint: Pubkey,
    pub start_time: i64,
    pub current_price: u64,
    pub start_price: u64,
    pub end_price: u64,
}

impl Auction {
    pub const SIZE: usize = 32 + // strategy
                            32 + // nft_mint
                            8 +  // auction_id
                            1 +  // active
                            8 +  // start_time
                            8 +  // start_price
                            8 +  // end_price
                            1;   // bump

    #[allow(clippy::too_many_arguments)]
    pub fn open(
        &mut self,
        strategy: Pubkey,
        nft_mint: Pubkey,
        auction_id: u64,
        start_price: u64,
        end_price: u64,
        now: i64,
        bump: u8,
    ) -> Result<()> {
        require!(!self.active, StrategyError::AuctionActive);

        self.strategy = strategy;
        self.nft_mint = nft_mint;
        self.auction_id = auction_id;
        self.active = true;
        self.start_time = now;
        self.start_price = start_price;
        self.end_price = end_price;
        self.bump = bump;
        Ok(())
    }

    pub fn current_price(&self, now: i64) -> u64 {
        decay::current_price(self.start_price, self.end_price, self.start_time, now)
    }

    /// Close the auction for a buyer holding `buyer_balance` strategy tokens.
    /// Returns the price to burn.
    pub fn settle(&mut self, now: i64, buyer_balance: u64, max_price: u64) -> Result<u64> {
        require!(self.active, StrategyError::NoActiveAuction);

        let price = self.current_price(now);
        require!(price <= max_price, StrategyError::SlippageExceeded);
        require!(buyer_balance >= price, StrategyError::InsufficientBalance);

        self.active = false;
        Ok(price)
    }

    pub fn cancel(&mut self) -> Result<()> {
        require!(self.active, StrategyError::NoActiveAuction);
        self.active = false;
        Ok(())
    }

    pub fn view(&self, now: i64) -> AuctionView {
        AuctionView {
            active: self.active,
            auction_id: self.auction_id,
            nft_mint: self.nft_mint,
            start_time: self.start_time,
            current_price: self.current_price(now),
            start_price: self.start_price,
            end_price: self.end_price,
        }
    }
}

/// Deserialize the auction PDA behind `info`, `None` if it was never created
pub fn load_auction(info: &AccountInfo) -> Result<Option<Auction>> {
    if info.data_is_empty() {
        return Ok(None);
    }
    require_keys_eq!(
        *info.owner,
        crate::ID,
        anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram
    );
    let data = info.try_borrow_data()?;
    Ok(Some(Auction::try_deserialize(&mut &data[..])?))
}

/// Whether the auction PDA behind `info` holds a live auction
pub fn auction_is_active(info: &AccountInfo) -> Result<bool> {
    Ok(load_auction(info)?.map_or(false, |auction| auction.active))
}

/// The treasury holds `nft_mint` when `vault` owns a token account carrying it
pub fn require_custody(account: &TokenAccount, vault: &Pubkey, nft_mint: &Pubkey) -> Result<()> {
    require!(
        account.owner == *vault && account.mint == *nft_mint && account.amount == 1,
        StrategyError::NotInCustody
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUCTION_DURATION_SECONDS;

    const NOW: i64 = 1_700_000_000;
    const ONE: u64 = 1_000_000_000;

    fn err(e: StrategyError) -> anchor_lang::error::Error {
        e.into()
    }

    fn blank() -> Auction {
        Auction {
            strategy: Pubkey::default(),
            nft_mint: Pubkey::default(),
            auction_id: 0,
            active: false,
            start_time: 0,
            start_price: 0,
            end_price: 0,
            bump: 0,
        }
    }

    fn live(start_price: u64, end_price: u64) -> Auction {
        let mut auction = blank();
        auction
            .open(Pubkey::new_unique(), Pubkey::new_unique(), 1, start_price, end_price, NOW, 253)
            .unwrap();
        auction
    }

    #[test]
    fn only_one_active_auction_per_nft() {
        let mut auction = live(10 * ONE, ONE);
        let (strategy, nft) = (auction.strategy, auction.nft_mint);
        assert_eq!(
            auction.open(strategy, nft, 2, ONE, ONE, NOW + 5, 253).unwrap_err(),
            err(StrategyError::AuctionActive)
        );
        assert_eq!(auction.auction_id, 1);
        assert_eq!(auction.start_time, NOW);
    }

    #[test]
    fn settle_burns_the_decayed_price_once() {
        let mut auction = live(10 * ONE, 2 * ONE);
        let halfway = NOW + AUCTION_DURATION_SECONDS / 2;

        assert_eq!(auction.settle(halfway, 100 * ONE, u64::MAX).unwrap(), 6 * ONE);
        assert!(!auction.active);

        // a racing buyer in the same slot sees the closed auction
        assert_eq!(
            auction.settle(halfway, 100 * ONE, u64::MAX).unwrap_err(),
            err(StrategyError::NoActiveAuction)
        );
    }

    #[test]
    fn short_buyer_leaves_auction_open() {
        let mut auction = live(10 * ONE, 2 * ONE);
        assert_eq!(
            auction.settle(NOW, 9 * ONE, u64::MAX).unwrap_err(),
            err(StrategyError::InsufficientBalance)
        );
        assert!(auction.active);

        // after full decay the same balance is enough
        let late = NOW + AUCTION_DURATION_SECONDS;
        assert_eq!(auction.settle(late, 9 * ONE, u64::MAX).unwrap(), 2 * ONE);
    }

    #[test]
    fn price_cap_protects_buyer() {
        let mut auction = live(2 * ONE, 10 * ONE);
        let late = NOW + AUCTION_DURATION_SECONDS;
        assert_eq!(
            auction.settle(late, 100 * ONE, 5 * ONE).unwrap_err(),
            err(StrategyError::SlippageExceeded)
        );
        assert!(auction.active);
    }

    #[test]
    fn cancel_then_reopen() {
        let mut auction = live(5 * ONE, ONE);
        auction.cancel().unwrap();
        assert_eq!(auction.cancel().unwrap_err(), err(StrategyError::NoActiveAuction));
        assert_eq!(
            auction.settle(NOW, 100 * ONE, u64::MAX).unwrap_err(),
            err(StrategyError::NoActiveAuction)
        );

        let (strategy, nft) = (auction.strategy, auction.nft_mint);
        auction.open(strategy, nft, 7, 3 * ONE, ONE, NOW + 100, 253).unwrap();
        assert_eq!(auction.auction_id, 7);
        assert_eq!(auction.current_price(NOW + 100), 3 * ONE);
    }

    #[test]
    fn view_reports_live_price() {
        let auction = live(10 * ONE, 0);
        let view = auction.view(NOW + AUCTION_DURATION_SECONDS / 4);
        assert!(view.active);
        assert_eq!(view.current_price, 7_500_000_000);
        assert_eq!(view.start_price, 10 * ONE);
        assert_eq!(view.end_price, 0);
        assert_eq!(view.start_time, NOW);
    }
}
