use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{Mint, Token};

use crate::constants::*;
use crate::errors::StrategyError;
use crate::events::{CurveInitialized, TokenDeployed};
use crate::state::*;

/// Strategy settings chosen at deploy time
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct DeployParams {
    pub fee_rate_bps: u16,
    /// Leave `k` at 0 to set the curve later with `initialize_curve`
    pub p0: u64,
    pub k: u64,
    pub reward_percentage_bps: Option<u16>,
    pub max_reward_percentage_bps: Option<u16>,
    pub collection_program: Pubkey,
    pub registry_program: Pubkey,
}

/// Deploy a new strategy token
/// Creates: Strategy PDA, strategy mint; tops up the reserve vault to its rent floor
pub fn deploy_strategy(ctx: Context<DeployStrategy>, params: DeployParams) -> Result<()> {
    require!(params.fee_rate_bps <= MAX_FEE_BPS, StrategyError::FeeTooHigh);
    require_keys_neq!(params.collection_program, crate::ID, StrategyError::SelfCall);
    require_keys_neq!(params.registry_program, crate::ID, StrategyError::SelfCall);

    let reward = RewardConfig::new(
        params.reward_percentage_bps.unwrap_or(DEFAULT_REWARD_BPS),
        params.max_reward_percentage_bps.unwrap_or(MAX_REWARD_CAP_BPS),
    )?;

    let clock = Clock::get()?;
    let reserve_mint = ctx.accounts.reserve_mint.as_ref().map(|mint| mint.key());

    let strategy = &mut ctx.accounts.strategy;
    strategy.authority = ctx.accounts.authority.key();
    strategy.strategy_mint = ctx.accounts.strategy_mint.key();
    strategy.reserve_mint = reserve_mint;
    strategy.curve = CurveParams {
        p0: params.p0,
        k: params.k,
    };
    strategy.treasury = TreasuryState {
        total_supply: 0,
        reserve_balance: 0,
        fee_rate_bps: params.fee_rate_bps,
    };
    strategy.reward = reward;
    strategy.collection_program = params.collection_program;
    strategy.registry_program = params.registry_program;
    strategy.next_auction_id = 1;
    strategy.next_proposal_id = 1;
    strategy.locked = false;
    strategy.created_at = clock.unix_timestamp;
    strategy.bump = ctx.bumps.strategy;
    strategy.vault_bump = ctx.bumps.reserve_vault;

    // The vault is a bare system account; it must stay rent exempt before it can
    // receive reserve or sign for NFT custody
    let rent = Rent::get()?;
    let shortfall = rent
        .minimum_balance(0)
        .saturating_sub(ctx.accounts.reserve_vault.lamports());
    if shortfall > 0 {
        system_program::transfer(
            CpiContext::new(
                ctx.accounts.system_program.to_account_info(),
                system_program::Transfer {
                    from: ctx.accounts.authority.to_account_info(),
                    to: ctx.accounts.reserve_vault.to_account_info(),
                },
            ),
            shortfall,
        )?;
    }

    emit!(TokenDeployed {
        strategy: strategy.key(),
        strategy_mint: strategy.strategy_mint,
        authority: strategy.authority,
        reserve_mint,
        fee_rate_bps: params.fee_rate_bps,
        p0: params.p0,
        k: params.k,
        timestamp: clock.unix_timestamp,
    });

    msg!("Strategy deployed for mint: {}", strategy.strategy_mint);
    msg!(
        "Fee: {} bps, reward: {}/{} bps, curve initialized: {}",
        params.fee_rate_bps,
        reward.reward_percentage_bps,
        reward.max_reward_percentage_bps,
        strategy.curve.is_initialized()
    );

    Ok(())
}

#[derive(Accounts)]
pub struct DeployStrategy<'info> {
    /// Becomes the strategy owner, pays for all accounts
    #[account(mut)]
    pub authority: Signer<'info>,

    /// Fresh keypair for the strategy token mint
    #[account(
        init,
        payer = authority,
        mint::decimals = STRATEGY_TOKEN_DECIMALS,
        mint::authority = strategy,
    )]
    pub strategy_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = authority,
        space = 8 + Strategy::SIZE,
        seeds = [STRATEGY_SEED, strategy_mint.key().as_ref()],
        bump,
    )]
    pub strategy: Account<'info, Strategy>,

    /// Holds the native reserve and owns every custody token account
    #[account(
        mut,
        seeds = [RESERVE_VAULT_SEED, strategy.key().as_ref()],
        bump,
    )]
    pub reserve_vault: SystemAccount<'info>,

    /// SPL reserve token; omit for a native SOL reserve
    pub reserve_mint: Option<Account<'info, Mint>>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Set the curve on a strategy deployed without one
pub fn initialize_curve(ctx: Context<InitializeCurve>, p0: u64, k: u64) -> Result<()> {
    let strategy = &mut ctx.accounts.strategy;
    strategy.initialize_curve(p0, k)?;

    emit!(CurveInitialized {
        strategy: strategy.key(),
        p0,
        k,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Curve initialized: p0={}, k={}", p0, k);

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeCurve<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [STRATEGY_SEED, strategy.strategy_mint.as_ref()],
        bump = strategy.bump,
        has_one = authority @ StrategyError::Unauthorized,
    )]
    pub strategy: Account<'info, Strategy>,
}
