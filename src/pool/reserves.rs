/// Reserve Oracle: point-in-time vault balances for a resolved pool
///
/// Both vault accounts are fetched in one batched read so the snapshot is
/// consistent. A missing vault or an unparseable token account is a hard
/// failure: a silent zero would read as "no liquidity" and poison the
/// quote math downstream.

use crate::constants::SOL_MINT_PUBKEY;
use crate::pool::keys::AmmPoolKeys;
use crate::rpc::{ RpcClient, SwapError };
use solana_program::program_pack::Pack;

/// Reserves oriented native-side first, in ui units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolReserves {
    /// WSOL side of the pool
    pub sol_reserve: f64,
    /// Token side of the pool
    pub token_reserve: f64,
    /// Decimals of the token side mint
    pub token_decimals: u8,
}

/// Fetch both vault balances and orient them WSOL-side first
///
/// Raydium pools put WSOL on either the base or the quote slot. When the
/// base mint is WSOL the vaults flip; every other pool treats the quote
/// vault as the native side, which covers the common token/WSOL pairs.
pub async fn fetch_reserves(
    rpc: &RpcClient,
    keys: &AmmPoolKeys
) -> Result<PoolReserves, SwapError> {
    let accounts = rpc.get_multiple_accounts(&[keys.quote_vault, keys.base_vault]).await?;

    let quote_account = accounts
        .first()
        .and_then(|account| account.as_ref())
        .ok_or_else(|| {
            SwapError::LiquidityUnreadable(format!("Quote vault {} is missing", keys.quote_vault))
        })?;
    let base_account = accounts
        .get(1)
        .and_then(|account| account.as_ref())
        .ok_or_else(|| {
            SwapError::LiquidityUnreadable(format!("Base vault {} is missing", keys.base_vault))
        })?;

    let quote_token = spl_token::state::Account::unpack(&quote_account.data).map_err(|e| {
        SwapError::LiquidityUnreadable(format!("Quote vault {}: {}", keys.quote_vault, e))
    })?;
    let base_token = spl_token::state::Account::unpack(&base_account.data).map_err(|e| {
        SwapError::LiquidityUnreadable(format!("Base vault {}: {}", keys.base_vault, e))
    })?;

    let quote_ui = (quote_token.amount as f64) / (10f64).powi(keys.quote_decimals as i32);
    let base_ui = (base_token.amount as f64) / (10f64).powi(keys.base_decimals as i32);

    Ok(orient_reserves(keys, base_ui, quote_ui))
}

/// Orient raw vault balances so the WSOL side always comes first
pub(crate) fn orient_reserves(keys: &AmmPoolKeys, base_ui: f64, quote_ui: f64) -> PoolReserves {
    if keys.base_mint == *SOL_MINT_PUBKEY {
        PoolReserves {
            sol_reserve: base_ui,
            token_reserve: quote_ui,
            token_decimals: keys.quote_decimals,
        }
    } else {
        PoolReserves {
            sol_reserve: quote_ui,
            token_reserve: base_ui,
            token_decimals: keys.base_decimals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;

    fn keys_with_mints(base_mint: Pubkey, quote_mint: Pubkey) -> AmmPoolKeys {
        AmmPoolKeys {
            amm_id: Pubkey::new_unique(),
            base_mint,
            quote_mint,
            base_decimals: 6,
            quote_decimals: 9,
            open_orders: Pubkey::new_unique(),
            target_orders: Pubkey::new_unique(),
            base_vault: Pubkey::new_unique(),
            quote_vault: Pubkey::new_unique(),
            market_id: Pubkey::new_unique(),
            market_authority: Pubkey::new_unique(),
            market_base_vault: Pubkey::new_unique(),
            market_quote_vault: Pubkey::new_unique(),
            bids: Pubkey::new_unique(),
            asks: Pubkey::new_unique(),
            event_queue: Pubkey::new_unique(),
            ray_authority_v4: Pubkey::new_unique(),
            open_book_program: Pubkey::new_unique(),
            token_program_id: spl_token::id(),
        }
    }

    #[test]
    fn quote_side_is_native_for_token_sol_pools() {
        let keys = keys_with_mints(Pubkey::new_unique(), *SOL_MINT_PUBKEY);
        let reserves = orient_reserves(&keys, 1_000_000.0, 500.0);
        assert_eq!(reserves.sol_reserve, 500.0);
        assert_eq!(reserves.token_reserve, 1_000_000.0);
        assert_eq!(reserves.token_decimals, keys.base_decimals);
    }

    #[test]
    fn vaults_flip_when_base_mint_is_wsol() {
        let keys = keys_with_mints(*SOL_MINT_PUBKEY, Pubkey::new_unique());
        let reserves = orient_reserves(&keys, 500.0, 1_000_000.0);
        assert_eq!(reserves.sol_reserve, 500.0);
        assert_eq!(reserves.token_reserve, 1_000_000.0);
        assert_eq!(reserves.token_decimals, keys.quote_decimals);
    }
}
