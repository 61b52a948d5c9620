/// Quote Calculator: pure constant-product swap math, no I/O
///
/// All amounts are ui units (f64), matching how reserves are read.
/// Outputs round to 9 decimal places before the slippage floor is applied;
/// scaling into raw on-chain units happens at instruction-build time.

use crate::rpc::SwapError;
use crate::swaps::config::{ NEAR_ZERO_RESERVE, SWAP_FEE_PERCENT };

/// A computed swap quote
///
/// `minimum_amount_out` is a floor, not a target: the swap program itself
/// rejects any execution below it, which is the only protection against
/// price movement between quoting and confirmation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwapQuote {
    pub amount_in: f64,
    pub amount_out: f64,
    pub minimum_amount_out: f64,
}

fn round_to_9_decimals(value: f64) -> f64 {
    (value * 1_000_000_000.0).round() / 1_000_000_000.0
}

fn check_reserves(token_reserve: f64, sol_reserve: f64) -> Result<(), SwapError> {
    if !token_reserve.is_finite() || !sol_reserve.is_finite() {
        return Err(
            SwapError::DegenerateReserves(
                format!("Non-finite reserves: token={}, sol={}", token_reserve, sol_reserve)
            )
        );
    }
    if token_reserve <= NEAR_ZERO_RESERVE || sol_reserve <= NEAR_ZERO_RESERVE {
        return Err(
            SwapError::DegenerateReserves(
                format!("Pool has no usable liquidity: token={}, sol={}", token_reserve, sol_reserve)
            )
        );
    }
    Ok(())
}

/// Tokens received for `sol_in` SOL under x*y=k with the fee off the input
pub fn sol_for_tokens(
    sol_in: f64,
    token_reserve: f64,
    sol_reserve: f64
) -> Result<f64, SwapError> {
    check_reserves(token_reserve, sol_reserve)?;

    let effective_sol_in = sol_in * (1.0 - SWAP_FEE_PERCENT / 100.0);
    let constant_product = token_reserve * sol_reserve;
    let updated_token_reserve = constant_product / (sol_reserve + effective_sol_in);
    let tokens_received = token_reserve - updated_token_reserve;

    Ok(round_to_9_decimals(tokens_received))
}

/// SOL received for `token_in` tokens under x*y=k with the fee off the input
pub fn tokens_for_sol(
    token_in: f64,
    token_reserve: f64,
    sol_reserve: f64
) -> Result<f64, SwapError> {
    check_reserves(token_reserve, sol_reserve)?;

    let effective_tokens_in = token_in * (1.0 - SWAP_FEE_PERCENT / 100.0);
    let constant_product = token_reserve * sol_reserve;
    let updated_sol_reserve = constant_product / (token_reserve + effective_tokens_in);
    let sol_received = sol_reserve - updated_sol_reserve;

    Ok(round_to_9_decimals(sol_received))
}

/// Validate a caller-supplied slippage tolerance (percent, 0 to 100)
pub fn validate_slippage(slippage_percent: f64) -> Result<(), SwapError> {
    if !slippage_percent.is_finite() || slippage_percent < 0.0 || slippage_percent > 100.0 {
        return Err(
            SwapError::InvalidInput(
                format!("Slippage must be between 0 and 100 percent, got {}", slippage_percent)
            )
        );
    }
    Ok(())
}

/// Floor an already-rounded output by the slippage tolerance
pub fn apply_slippage(amount_out: f64, slippage_percent: f64) -> f64 {
    amount_out * (1.0 - slippage_percent / 100.0)
}

/// Quote a buy: SOL in, tokens out
pub fn quote_buy(
    sol_in: f64,
    token_reserve: f64,
    sol_reserve: f64,
    slippage_percent: f64
) -> Result<SwapQuote, SwapError> {
    if !sol_in.is_finite() || sol_in <= 0.0 {
        return Err(SwapError::InvalidInput(format!("SOL amount must be positive, got {}", sol_in)));
    }
    validate_slippage(slippage_percent)?;

    let amount_out = sol_for_tokens(sol_in, token_reserve, sol_reserve)?;
    Ok(SwapQuote {
        amount_in: sol_in,
        amount_out,
        minimum_amount_out: apply_slippage(amount_out, slippage_percent),
    })
}

/// Quote a sell: tokens in, SOL out
pub fn quote_sell(
    token_in: f64,
    token_reserve: f64,
    sol_reserve: f64,
    slippage_percent: f64
) -> Result<SwapQuote, SwapError> {
    if !token_in.is_finite() || token_in <= 0.0 {
        return Err(
            SwapError::InvalidInput(format!("Token amount must be positive, got {}", token_in))
        );
    }
    validate_slippage(slippage_percent)?;

    let amount_out = tokens_for_sol(token_in, token_reserve, sol_reserve)?;
    Ok(SwapQuote {
        amount_in: token_in,
        amount_out,
        minimum_amount_out: apply_slippage(amount_out, slippage_percent),
    })
}
