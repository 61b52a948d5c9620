/// Centralized RPC client for Solana
///
/// Wraps the synchronous solana-client behind spawn_blocking for account
/// reads, and uses raw JSON-RPC over HTTP for the two calls the swap
/// pipeline needs precise control over: sendTransaction (base64 payload,
/// preflight disabled) and getTransaction (confirmation polling).

use crate::global::{ Configs, is_debug_rpc_enabled };
use crate::logger::{ log, LogTag };
use base64::{ engine::general_purpose, Engine as _ };
use serde::{ Deserialize, Serialize };
use solana_account_decoder::UiAccountData;
use solana_client::rpc_client::RpcClient as SolanaRpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
};
use std::str::FromStr;
use std::sync::Arc;

/// Error kinds for the swap pipeline
///
/// Every failure a swap can hit maps onto exactly one of these variants so
/// callers can branch on kind instead of matching error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// Undersized or malformed account buffer
    Decode(String),
    /// Pool or referenced market account absent
    NotFound(String),
    /// Vault balance missing or unparseable (never coerced to zero)
    LiquidityUnreadable(String),
    /// Zero or near-zero reserve on either side of the pool
    DegenerateReserves(String),
    /// Retryable network failure, only surfaced by the confirmation poll
    TransientNetwork(String),
    /// The network refused the transaction outright
    SubmissionRejected(String),
    /// The swap program reverted on-chain (e.g. slippage floor violated)
    ExecutionFailed(String),
    /// Instruction list could not be assembled
    Build(String),
    /// Bad caller-supplied parameter
    InvalidInput(String),
    /// Signer holds no balance to sell
    InsufficientBalance(String),
    /// Unparseable RPC payload
    InvalidResponse(String),
    Config(String),
    Signing(String),
    /// Any other RPC transport failure outside the confirmation poll
    Rpc(String),
}

impl std::fmt::Display for SwapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapError::Decode(msg) => write!(f, "Decode Error: {}", msg),
            SwapError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            SwapError::LiquidityUnreadable(msg) => write!(f, "Liquidity Unreadable: {}", msg),
            SwapError::DegenerateReserves(msg) => write!(f, "Degenerate Reserves: {}", msg),
            SwapError::TransientNetwork(msg) => write!(f, "Transient Network Error: {}", msg),
            SwapError::SubmissionRejected(msg) => write!(f, "Submission Rejected: {}", msg),
            SwapError::ExecutionFailed(msg) => write!(f, "On-chain Execution Error: {}", msg),
            SwapError::Build(msg) => write!(f, "Build Error: {}", msg),
            SwapError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            SwapError::InsufficientBalance(msg) => write!(f, "Insufficient Balance: {}", msg),
            SwapError::InvalidResponse(msg) => write!(f, "Invalid Response: {}", msg),
            SwapError::Config(msg) => write!(f, "Config Error: {}", msg),
            SwapError::Signing(msg) => write!(f, "Signing Error: {}", msg),
            SwapError::Rpc(msg) => write!(f, "RPC Error: {}", msg),
        }
    }
}

impl std::error::Error for SwapError {}

impl From<reqwest::Error> for SwapError {
    fn from(err: reqwest::Error) -> Self {
        SwapError::Rpc(err.to_string())
    }
}

/// Converts lamports to SOL amount
pub fn lamports_to_sol(lamports: u64) -> f64 {
    (lamports as f64) / 1_000_000_000.0
}

/// Converts SOL amount to lamports (1 SOL = 1,000,000,000 lamports)
pub fn sol_to_lamports(sol_amount: f64) -> u64 {
    (sol_amount * 1_000_000_000.0) as u64
}

/// Transaction details from getTransaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetails {
    pub slot: u64,
    pub transaction: TransactionData,
    pub meta: Option<TransactionMeta>,
}

/// Transaction data structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    pub message: serde_json::Value,
    pub signatures: Vec<String>,
}

/// Transaction metadata with balance changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionMeta {
    pub err: Option<serde_json::Value>,
    #[serde(rename = "preBalances")]
    pub pre_balances: Vec<u64>,
    #[serde(rename = "postBalances")]
    pub post_balances: Vec<u64>,
    #[serde(rename = "preTokenBalances")]
    pub pre_token_balances: Option<Vec<TokenBalance>>,
    #[serde(rename = "postTokenBalances")]
    pub post_token_balances: Option<Vec<TokenBalance>>,
    pub fee: u64,
    #[serde(rename = "logMessages")]
    pub log_messages: Option<Vec<String>>,
}

/// Token balance information in transaction metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenBalance {
    #[serde(rename = "accountIndex")]
    pub account_index: u32,
    pub mint: String,
    pub owner: Option<String>,
    #[serde(rename = "uiTokenAmount")]
    pub ui_token_amount: UiTokenAmount,
}

/// Token amount with UI representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiTokenAmount {
    pub amount: String,
    pub decimals: u8,
    #[serde(rename = "uiAmount")]
    pub ui_amount: Option<f64>,
    #[serde(rename = "uiAmountString")]
    pub ui_amount_string: Option<String>,
}

/// One of the signer's token accounts, with its parsed balance
#[derive(Debug, Clone)]
pub struct TokenAccountInfo {
    pub pubkey: Pubkey,
    pub ui_amount: Option<f64>,
}

pub struct RpcClient {
    rpc_url: String,
    client: Arc<SolanaRpcClient>,
    http: reqwest::Client,
}

impl RpcClient {
    pub fn new(rpc_url: &str) -> Self {
        let client = SolanaRpcClient::new_with_commitment(
            rpc_url.to_string(),
            CommitmentConfig::confirmed()
        );
        Self {
            rpc_url: rpc_url.to_string(),
            client: Arc::new(client),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_configs(configs: &Configs) -> Self {
        Self::new(&configs.rpc_url)
    }

    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    /// Get single account data
    pub async fn get_account(&self, pubkey: &Pubkey) -> Result<Account, SwapError> {
        if is_debug_rpc_enabled() {
            log(LogTag::Rpc, "GET_ACCOUNT", &format!("Fetching account {}", pubkey));
        }

        tokio::task
            ::spawn_blocking({
                let client = self.client.clone();
                let pubkey = *pubkey;
                move || {
                    client.get_account(&pubkey).map_err(|e| {
                        let msg = e.to_string();
                        if msg.contains("AccountNotFound") {
                            SwapError::NotFound(format!("Account {} not found", pubkey))
                        } else {
                            SwapError::Rpc(format!("Failed to get account {}: {}", pubkey, msg))
                        }
                    })
                }
            }).await
            .map_err(|e| SwapError::Rpc(format!("Task error: {}", e)))?
    }

    /// Get multiple accounts in one batched request (consistent snapshot)
    pub async fn get_multiple_accounts(
        &self,
        pubkeys: &[Pubkey]
    ) -> Result<Vec<Option<Account>>, SwapError> {
        if pubkeys.is_empty() {
            return Ok(Vec::new());
        }

        tokio::task
            ::spawn_blocking({
                let client = self.client.clone();
                let pubkeys = pubkeys.to_vec();
                move || {
                    client
                        .get_multiple_accounts(&pubkeys)
                        .map_err(|e| SwapError::Rpc(format!("Failed to get multiple accounts: {}", e)))
                }
            }).await
            .map_err(|e| SwapError::Rpc(format!("Task error: {}", e)))?
    }

    /// Minimum lamports for an account of `data_len` bytes to be rent exempt
    pub async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize
    ) -> Result<u64, SwapError> {
        tokio::task
            ::spawn_blocking({
                let client = self.client.clone();
                move || {
                    client
                        .get_minimum_balance_for_rent_exemption(data_len)
                        .map_err(|e| SwapError::Rpc(format!("Failed to get rent exemption: {}", e)))
                }
            }).await
            .map_err(|e| SwapError::Rpc(format!("Task error: {}", e)))?
    }

    /// Latest blockhash used as the transaction validity window anchor
    pub async fn get_latest_blockhash(&self) -> Result<Hash, SwapError> {
        tokio::task
            ::spawn_blocking({
                let client = self.client.clone();
                move || {
                    client
                        .get_latest_blockhash()
                        .map_err(|e| SwapError::Rpc(format!("Failed to get latest blockhash: {}", e)))
                }
            }).await
            .map_err(|e| SwapError::Rpc(format!("Task error: {}", e)))?
    }

    /// List the owner's token accounts for one mint, with parsed balances
    pub async fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey
    ) -> Result<Vec<TokenAccountInfo>, SwapError> {
        let keyed_accounts = tokio::task
            ::spawn_blocking({
                let client = self.client.clone();
                let owner = *owner;
                let mint = *mint;
                move || {
                    client
                        .get_token_accounts_by_owner(&owner, TokenAccountsFilter::Mint(mint))
                        .map_err(|e| SwapError::Rpc(format!("Failed to get token accounts: {}", e)))
                }
            }).await
            .map_err(|e| SwapError::Rpc(format!("Task error: {}", e)))??;

        let mut accounts = Vec::with_capacity(keyed_accounts.len());
        for keyed in keyed_accounts {
            let pubkey = Pubkey::from_str(&keyed.pubkey).map_err(|e|
                SwapError::InvalidResponse(format!("Invalid token account pubkey: {}", e))
            )?;
            let ui_amount = match &keyed.account.data {
                UiAccountData::Json(parsed) =>
                    parsed.parsed
                        .get("info")
                        .and_then(|info| info.get("tokenAmount"))
                        .and_then(|amount| amount.get("uiAmount"))
                        .and_then(|ui| ui.as_f64()),
                _ => None,
            };
            accounts.push(TokenAccountInfo { pubkey, ui_amount });
        }

        Ok(accounts)
    }

    /// Submit a signed, base64-encoded transaction with preflight disabled
    ///
    /// Preflight simulation is skipped on purpose: the slippage floor inside
    /// the swap instruction is the correctness backstop, and skipping the
    /// simulation saves a round trip before the transaction reaches a leader.
    pub async fn send_transaction_base64(
        &self,
        signed_transaction_base64: &str
    ) -> Result<String, SwapError> {
        let rpc_payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sendTransaction",
            "params": [
                signed_transaction_base64,
                {
                    "encoding": "base64",
                    "skipPreflight": true
                }
            ]
        });

        let response = self.http
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&rpc_payload)
            .send().await
            .map_err(|e| SwapError::Rpc(format!("sendTransaction request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(
                SwapError::SubmissionRejected(
                    format!("sendTransaction returned HTTP {}", response.status())
                )
            );
        }

        let rpc_response: serde_json::Value = response
            .json().await
            .map_err(|e| SwapError::InvalidResponse(format!("sendTransaction response: {}", e)))?;

        if let Some(error) = rpc_response.get("error") {
            return Err(SwapError::SubmissionRejected(format!("RPC error: {}", error)));
        }

        match rpc_response.get("result").and_then(|r| r.as_str()) {
            Some(signature) => {
                if is_debug_rpc_enabled() {
                    log(LogTag::Rpc, "SENT", &format!("Transaction submitted: {}", signature));
                }
                Ok(signature.to_string())
            }
            None =>
                Err(
                    SwapError::InvalidResponse(
                        "sendTransaction response missing result signature".to_string()
                    )
                ),
        }
    }

    /// Fetch a submitted transaction's execution result by signature
    ///
    /// Everything short of a definitive answer - transport failure, RPC
    /// error object, or a null result because the transaction is not yet
    /// indexed - comes back as TransientNetwork so the confirmation poll
    /// can treat it as one consumed attempt.
    pub async fn get_transaction_details(
        &self,
        transaction_signature: &str
    ) -> Result<TransactionDetails, SwapError> {
        let rpc_payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTransaction",
            "params": [
                transaction_signature,
                {
                    "encoding": "json",
                    "commitment": "confirmed",
                    "maxSupportedTransactionVersion": 0
                }
            ]
        });

        let response = self.http
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&rpc_payload)
            .send().await
            .map_err(|e| SwapError::TransientNetwork(format!("getTransaction request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(
                SwapError::TransientNetwork(
                    format!("getTransaction returned HTTP {}", response.status())
                )
            );
        }

        let rpc_response: serde_json::Value = response
            .json().await
            .map_err(|e| SwapError::TransientNetwork(format!("getTransaction response: {}", e)))?;

        if let Some(error) = rpc_response.get("error") {
            return Err(SwapError::TransientNetwork(format!("RPC error: {}", error)));
        }

        match rpc_response.get("result") {
            Some(result) if !result.is_null() => {
                serde_json
                    ::from_value(result.clone())
                    .map_err(|e|
                        SwapError::TransientNetwork(
                            format!("Failed to parse transaction details: {}", e)
                        )
                    )
            }
            _ =>
                Err(
                    SwapError::TransientNetwork(
                        "Transaction not found or not confirmed yet".to_string()
                    )
                ),
        }
    }
}

/// Encode a bincode-serializable transaction as base64 for submission
pub fn serialize_transaction_base64<T: serde::Serialize>(
    transaction: &T
) -> Result<String, SwapError> {
    let bytes = bincode
        ::serialize(transaction)
        .map_err(|e| SwapError::Signing(format!("Failed to serialize transaction: {}", e)))?;
    Ok(general_purpose::STANDARD.encode(bytes))
}
