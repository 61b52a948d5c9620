/// Caller-facing swap entry points
///
/// Thin wrappers that load the wallet, build an RPC client from the
/// configs, and run one swap pipeline. Callers issuing several swaps
/// against the same wallet must serialize them; nothing here guards the
/// signer's spendable balance across concurrent transactions.

use crate::global::Configs;
use crate::rpc::RpcClient;
use crate::swaps::execution::{ buy_swap, sell_swap, BuyResult, SellResult };
use crate::rpc::SwapError;
use crate::wallet;

/// Buy a pool's token with `sol_in` SOL
pub async fn buy_token(
    configs: &Configs,
    pair_address: &str,
    sol_in: f64,
    slippage_percent: f64
) -> Result<BuyResult, SwapError> {
    let rpc = RpcClient::from_configs(configs);
    let payer = wallet::load_keypair(configs)?;
    buy_swap(&rpc, &payer, pair_address, sol_in, slippage_percent).await
}

/// Sell `percentage` percent of the wallet's holdings in a pool's token
pub async fn sell_token(
    configs: &Configs,
    pair_address: &str,
    percentage: u8,
    slippage_percent: f64
) -> Result<SellResult, SwapError> {
    let rpc = RpcClient::from_configs(configs);
    let payer = wallet::load_keypair(configs)?;
    sell_swap(&rpc, &payer, pair_address, percentage, slippage_percent).await
}
