use anchor_lang::prelude::*;

use crate::errors::StrategyError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProposalStatus {
    /// Freshly allocated account, nothing proposed yet
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

/// Request to sell a custodied NFT through a Dutch auction
/// PDA seeds: [b"proposal", strategy.as_ref(), nft_mint.as_ref()]
///
/// Approval and rejection both close the account, refunding the proposer's rent.
/// Proposing the NFT again allocates a fresh account paid by the new proposer.
#[account]
pub struct Proposal {
    pub strategy: Pubkey,
    pub nft_mint: Pubkey,
    pub proposal_id: u64,

    /// Paid the rent, receives it back on approval
    pub proposer: Pubkey,

    pub start_price: u64,
    pub end_price: u64,
    pub status: ProposalStatus,

    /// PDA bump
    pub bump: u8,
}

impl Proposal {
    pub const SIZE: usize = 32 + // strategy
                            32 + // nft_mint
                            8 +  // proposal_id
                            32 + // proposer
                            8 +  // start_price
                            8 +  // end_price
                            1 +  // status
                            1;   // bump

    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        strategy: Pubkey,
        nft_mint: Pubkey,
        proposal_id: u64,
        proposer: Pubkey,
        start_price: u64,
        end_price: u64,
        bump: u8,
    ) -> Result<()> {
        require!(!self.is_pending(), StrategyError::ProposalPending);

        self.strategy = strategy;
        self.nft_mint = nft_mint;
        self.proposal_id = proposal_id;
        self.proposer = proposer;
        self.start_price = start_price;
        self.end_price = end_price;
        self.status = ProposalStatus::Pending;
        self.bump = bump;
        Ok(())
    }

    fn require_pending(&self, proposal_id: u64) -> Result<()> {
        require!(
            self.status != ProposalStatus::None && self.proposal_id == proposal_id,
            StrategyError::ProposalNotFound
        );
        require!(self.is_pending(), StrategyError::ProposalNotPending);
        Ok(())
    }

    /// Returns the approved `(start_price, end_price)`
    pub fn approve(&mut self, proposal_id: u64) -> Result<(u64, u64)> {
        self.require_pending(proposal_id)?;
        self.status = ProposalStatus::Approved;
        Ok((self.start_price, self.end_price))
    }

    /// Returns the proposer, who gets the account's rent back
    pub fn reject(&mut self, proposal_id: u64) -> Result<Pubkey> {
        self.require_pending(proposal_id)?;
        self.status = ProposalStatus::Rejected;
        Ok(self.proposer)
    }
}

/// Whether the proposal PDA behind `info` holds a pending proposal
pub fn proposal_is_pending(info: &AccountInfo) -> Result<bool> {
    if info.data_is_empty() {
        return Ok(false);
    }
    require_keys_eq!(
        *info.owner,
        crate::ID,
        anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram
    );
    let data = info.try_borrow_data()?;
    let proposal = Proposal::try_deserialize(&mut &data[..])?;
    Ok(proposal.is_pending())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUCTION_DURATION_SECONDS;
    use crate::state::Auction;

    const ONE: u64 = 1_000_000_000;
    const NOW: i64 = 1_700_000_000;

    fn err(e: StrategyError) -> anchor_lang::error::Error {
        e.into()
    }

    fn blank() -> Proposal {
        Proposal {
            strategy: Pubkey::default(),
            nft_mint: Pubkey::default(),
            proposal_id: 0,
            proposer: Pubkey::default(),
            start_price: 0,
            end_price: 0,
            status: ProposalStatus::default(),
            bump: 0,
        }
    }

    fn submitted(id: u64) -> Proposal {
        let mut proposal = blank();
        proposal
            .submit(Pubkey::new_unique(), Pubkey::new_unique(), id, Pubkey::new_unique(), 10 * ONE, ONE, 252)
            .unwrap();
        proposal
    }

    #[test]
    fn second_proposal_while_pending_is_rejected() {
        let mut proposal = submitted(1);
        let (strategy, nft) = (proposal.strategy, proposal.nft_mint);
        assert_eq!(
            proposal
                .submit(strategy, nft, 2, Pubkey::new_unique(), ONE, ONE, 252)
                .unwrap_err(),
            err(StrategyError::ProposalPending)
        );
        assert_eq!(proposal.proposal_id, 1);
        assert_eq!(proposal.start_price, 10 * ONE);
    }

    #[test]
    fn rejection_frees_the_nft() {
        let mut proposal = submitted(1);
        proposal.reject(1).unwrap();
        assert_eq!(proposal.status, ProposalStatus::Rejected);
        assert_eq!(proposal.approve(1).unwrap_err(), err(StrategyError::ProposalNotPending));

        let mut next = blank();
        next.submit(proposal.strategy, proposal.nft_mint, 2, Pubkey::new_unique(), 4 * ONE, 2 * ONE, 252)
            .unwrap();
        assert!(next.is_pending());
        assert_eq!(next.approve(2).unwrap(), (4 * ONE, 2 * ONE));
    }

    #[test]
    fn rejection_refunds_the_original_proposer() {
        let mut proposal = submitted(1);
        let first = proposal.proposer;
        assert_eq!(proposal.reject(1).unwrap(), first);
        assert_eq!(proposal.proposer, first);

        // the rejected account is closed, the next proposer funds a new one
        let second = Pubkey::new_unique();
        let mut next = blank();
        next.submit(proposal.strategy, proposal.nft_mint, 2, second, ONE, ONE, 252).unwrap();
        assert_eq!(next.proposer, second);
        assert_ne!(next.proposer, first);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let mut proposal = submitted(3);
        assert_eq!(proposal.approve(4).unwrap_err(), err(StrategyError::ProposalNotFound));
        assert_eq!(proposal.reject(2).unwrap_err(), err(StrategyError::ProposalNotFound));
        assert_eq!(blank().approve(0).unwrap_err(), err(StrategyError::ProposalNotFound));
        assert!(proposal.is_pending());
    }

    #[test]
    fn approved_proposal_becomes_a_single_auction() {
        let mut proposal = submitted(1);
        let (start_price, end_price) = proposal.approve(1).unwrap();

        let mut auction = Auction {
            strategy: proposal.strategy,
            nft_mint: proposal.nft_mint,
            auction_id: 0,
            active: false,
            start_time: 0,
            start_price: 0,
            end_price: 0,
            bump: 0,
        };
        auction
            .open(proposal.strategy, proposal.nft_mint, 1, start_price, end_price, NOW, 251)
            .unwrap();

        let price = auction.settle(NOW + AUCTION_DURATION_SECONDS, ONE, u64::MAX).unwrap();
        assert_eq!(price, ONE);
        assert_eq!(
            auction.settle(NOW + AUCTION_DURATION_SECONDS, ONE, u64::MAX).unwrap_err(),
            err(StrategyError::NoActiveAuction)
        );
    }
}
