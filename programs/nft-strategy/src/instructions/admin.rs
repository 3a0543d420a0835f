use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::{AuthorityTransferred, RewardPercentageUpdated};
use crate::state::*;

/// Update the keeper reward, bounded by the cap fixed at deploy
pub fn set_reward_percentage(ctx: Context<AdminUpdate>, new_bps: u16) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    let old_bps = strategy.reward.set_percentage(new_bps)?;

    emit!(RewardPercentageUpdated {
        strategy: strategy.key(),
        old_bps,
        new_bps,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Reward percentage: {} -> {} bps", old_bps, new_bps);

    Ok(())
}

pub fn set_external_targets(
    ctx: Context<AdminUpdate>,
    collection_program: Pubkey,
    registry_program: Pubkey,
) -> Result<()> {
    require_keys_neq!(collection_program, crate::ID, StrategyError::SelfCall);
    require_keys_neq!(registry_program, crate::ID, StrategyError::SelfCall);

    let strategy = &mut ctx.accounts.strategy;
    strategy.collection_program = collection_program;
    strategy.registry_program = registry_program;

    msg!("External targets: collection {}, registry {}", collection_program, registry_program);

    Ok(())
}

pub fn transfer_authority(ctx: Context<AdminUpdate>, new_authority: Pubkey) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    let old_authority = strategy.authority;
    strategy.authority = new_authority;

    emit!(AuthorityTransferred {
        strategy: strategy.key(),
        old_authority,
        new_authority,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Authority transferred: {} -> {}", old_authority, new_authority);

    Ok(())
}

#[derive(Accounts)]
pub struct AdminUpdate<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
        has_one = authority @ StrategyError::Unauthorized,
    )]
    pub strategy: Account<'info, Strategy>,
}
