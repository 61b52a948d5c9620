/// Wallet keypair loading and token balance lookups

use crate::global::Configs;
use crate::rpc::{ RpcClient, SwapError };
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

/// Load the main wallet keypair from the configs
///
/// Accepts the private key either as a base58 string or as a JSON-style
/// byte array like `[12,34,...]` (64 bytes either way).
pub fn load_keypair(configs: &Configs) -> Result<Keypair, SwapError> {
    let raw = configs.main_wallet_private.trim();

    let bytes: Vec<u8> = if raw.starts_with('[') && raw.ends_with(']') {
        raw
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .map(|s| s.trim().parse::<u8>())
            .collect::<Result<Vec<u8>, _>>()
            .map_err(|e| SwapError::Config(format!("Failed to parse private key array: {}", e)))?
    } else {
        bs58
            ::decode(raw)
            .into_vec()
            .map_err(|e| SwapError::Config(format!("Invalid base58 private key: {}", e)))?
    };

    if bytes.len() != 64 {
        return Err(
            SwapError::Config(
                format!("Invalid private key length: expected 64 bytes, got {}", bytes.len())
            )
        );
    }

    Keypair::try_from(&bytes[..]).map_err(|e|
        SwapError::Config(format!("Failed to create keypair: {}", e))
    )
}

/// Get the owner's spendable balance for one mint (ui units)
///
/// Returns None when the owner has no token account for the mint or the
/// parsed balance is absent; the caller decides whether that is fatal.
pub async fn get_token_balance(
    rpc: &RpcClient,
    owner: &Pubkey,
    mint: &Pubkey
) -> Result<Option<f64>, SwapError> {
    let accounts = rpc.get_token_accounts_by_owner(owner, mint).await?;
    Ok(accounts.first().and_then(|account| account.ui_amount))
}

/// Find the owner's existing token account for one mint, if any
pub async fn find_token_account(
    rpc: &RpcClient,
    owner: &Pubkey,
    mint: &Pubkey
) -> Result<Option<Pubkey>, SwapError> {
    let accounts = rpc.get_token_accounts_by_owner(owner, mint).await?;
    Ok(accounts.first().map(|account| account.pubkey))
}
