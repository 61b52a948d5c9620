/// Fixed-offset account layouts for Raydium AMM V4 and OpenBook markets
///
/// Both layouts are external contracts published by their programs; the
/// offsets below must match them byte for byte. A buffer shorter than the
/// full layout size never decodes - no partial state is returned.

use crate::pool::utils::{ read_pubkey, read_u64_le };
use crate::rpc::SwapError;
use solana_sdk::pubkey::Pubkey;

/// Raydium AMM V4 liquidity state account size
pub const LIQUIDITY_STATE_V4_LEN: usize = 752;

/// OpenBook (Serum) market state v3 account size
pub const MARKET_STATE_V3_LEN: usize = 388;

/// Raydium AMM V4 liquidity state, the fields the swap pipeline needs
///
/// Field offsets into the 752-byte account:
/// status 0, coin_decimals 32, pc_decimals 40, then the pubkey block
/// starting at 336 (vaults, mints, open orders, market, target orders).
#[derive(Debug, Clone)]
pub struct LiquidityStateV4 {
    pub status: u64,
    pub coin_decimals: u64,
    pub pc_decimals: u64,
    pub pool_coin_token_account: Pubkey,
    pub pool_pc_token_account: Pubkey,
    pub coin_mint: Pubkey,
    pub pc_mint: Pubkey,
    pub amm_open_orders: Pubkey,
    pub serum_market: Pubkey,
    pub serum_program_id: Pubkey,
    pub amm_target_orders: Pubkey,
}

impl LiquidityStateV4 {
    pub fn decode(data: &[u8]) -> Result<Self, SwapError> {
        if data.len() < LIQUIDITY_STATE_V4_LEN {
            return Err(
                SwapError::Decode(
                    format!(
                        "Liquidity state buffer too short: {} bytes, expected {}",
                        data.len(),
                        LIQUIDITY_STATE_V4_LEN
                    )
                )
            );
        }

        Ok(Self {
            status: read_u64_le(data, 0),
            coin_decimals: read_u64_le(data, 32),
            pc_decimals: read_u64_le(data, 40),
            pool_coin_token_account: read_pubkey(data, 336),
            pool_pc_token_account: read_pubkey(data, 368),
            coin_mint: read_pubkey(data, 400),
            pc_mint: read_pubkey(data, 432),
            amm_open_orders: read_pubkey(data, 496),
            serum_market: read_pubkey(data, 528),
            serum_program_id: read_pubkey(data, 560),
            amm_target_orders: read_pubkey(data, 592),
        })
    }
}

/// OpenBook market state v3, the fields the swap pipeline needs
///
/// The layout carries a 5-byte "serum" prefix before the first field, so
/// offsets start at 13 for own_address and 45 for vault_signer_nonce.
#[derive(Debug, Clone)]
pub struct MarketStateV3 {
    pub own_address: Pubkey,
    pub vault_signer_nonce: u64,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub base_vault: Pubkey,
    pub quote_vault: Pubkey,
    pub event_queue: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
}

impl MarketStateV3 {
    pub fn decode(data: &[u8]) -> Result<Self, SwapError> {
        if data.len() < MARKET_STATE_V3_LEN {
            return Err(
                SwapError::Decode(
                    format!(
                        "Market state buffer too short: {} bytes, expected {}",
                        data.len(),
                        MARKET_STATE_V3_LEN
                    )
                )
            );
        }

        Ok(Self {
            own_address: read_pubkey(data, 13),
            vault_signer_nonce: read_u64_le(data, 45),
            base_mint: read_pubkey(data, 53),
            quote_mint: read_pubkey(data, 85),
            base_vault: read_pubkey(data, 117),
            quote_vault: read_pubkey(data, 165),
            event_queue: read_pubkey(data, 253),
            bids: read_pubkey(data, 285),
            asks: read_pubkey(data, 317),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_pubkey(data: &mut [u8], offset: usize, value: u8) -> Pubkey {
        let bytes = [value; 32];
        data[offset..offset + 32].copy_from_slice(&bytes);
        Pubkey::new_from_array(bytes)
    }

    #[test]
    fn undersized_liquidity_state_never_decodes() {
        for len in [0, 1, 100, LIQUIDITY_STATE_V4_LEN - 1] {
            let data = vec![0u8; len];
            assert!(
                matches!(LiquidityStateV4::decode(&data), Err(SwapError::Decode(_))),
                "buffer of {} bytes must fail to decode",
                len
            );
        }
    }

    #[test]
    fn undersized_market_state_never_decodes() {
        for len in [0, 13, MARKET_STATE_V3_LEN - 1] {
            let data = vec![0u8; len];
            assert!(
                matches!(MarketStateV3::decode(&data), Err(SwapError::Decode(_))),
                "buffer of {} bytes must fail to decode",
                len
            );
        }
    }

    #[test]
    fn liquidity_state_fields_read_from_fixed_offsets() {
        let mut data = vec![0u8; LIQUIDITY_STATE_V4_LEN];
        data[0..8].copy_from_slice(&6u64.to_le_bytes());
        data[32..40].copy_from_slice(&9u64.to_le_bytes());
        data[40..48].copy_from_slice(&6u64.to_le_bytes());
        let base_vault = put_pubkey(&mut data, 336, 0x11);
        let quote_vault = put_pubkey(&mut data, 368, 0x22);
        let coin_mint = put_pubkey(&mut data, 400, 0x33);
        let pc_mint = put_pubkey(&mut data, 432, 0x44);
        let open_orders = put_pubkey(&mut data, 496, 0x55);
        let market = put_pubkey(&mut data, 528, 0x66);
        let serum_program = put_pubkey(&mut data, 560, 0x77);
        let target_orders = put_pubkey(&mut data, 592, 0x88);

        let state = LiquidityStateV4::decode(&data).unwrap();
        assert_eq!(state.status, 6);
        assert_eq!(state.coin_decimals, 9);
        assert_eq!(state.pc_decimals, 6);
        assert_eq!(state.pool_coin_token_account, base_vault);
        assert_eq!(state.pool_pc_token_account, quote_vault);
        assert_eq!(state.coin_mint, coin_mint);
        assert_eq!(state.pc_mint, pc_mint);
        assert_eq!(state.amm_open_orders, open_orders);
        assert_eq!(state.serum_market, market);
        assert_eq!(state.serum_program_id, serum_program);
        assert_eq!(state.amm_target_orders, target_orders);
    }

    #[test]
    fn market_state_fields_read_from_fixed_offsets() {
        let mut data = vec![0u8; MARKET_STATE_V3_LEN];
        let own_address = put_pubkey(&mut data, 13, 0x01);
        data[45..53].copy_from_slice(&3u64.to_le_bytes());
        let base_mint = put_pubkey(&mut data, 53, 0x02);
        let quote_mint = put_pubkey(&mut data, 85, 0x03);
        let base_vault = put_pubkey(&mut data, 117, 0x04);
        let quote_vault = put_pubkey(&mut data, 165, 0x05);
        let event_queue = put_pubkey(&mut data, 253, 0x06);
        let bids = put_pubkey(&mut data, 285, 0x07);
        let asks = put_pubkey(&mut data, 317, 0x08);

        let market = MarketStateV3::decode(&data).unwrap();
        assert_eq!(market.own_address, own_address);
        assert_eq!(market.vault_signer_nonce, 3);
        assert_eq!(market.base_mint, base_mint);
        assert_eq!(market.quote_mint, quote_mint);
        assert_eq!(market.base_vault, base_vault);
        assert_eq!(market.quote_vault, quote_vault);
        assert_eq!(market.event_queue, event_queue);
        assert_eq!(market.bids, bids);
        assert_eq!(market.asks, asks);
    }
}
