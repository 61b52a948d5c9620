/// Submitter/Confirmer and the buy/sell swap pipelines
///
/// A submitted transaction walks Built -> Submitted -> one terminal state:
/// Confirmed, Failed, or Unknown. Only a definitive on-chain result moves
/// the machine; transport hiccups and not-yet-indexed lookups consume one
/// poll attempt each. Unknown means undetermined, not failed - the
/// transaction's on-chain fate is fixed the moment it is submitted, and a
/// local timeout only changes what gets reported. Nothing here retries a
/// whole swap: resubmitting after Unknown risks double execution.

use crate::global::is_debug_swap_enabled;
use crate::logger::{ log, LogTag };
use crate::pool::{ fetch_pool_keys, fetch_reserves };
use crate::rpc::{
    lamports_to_sol,
    serialize_transaction_base64,
    sol_to_lamports,
    RpcClient,
    SwapError,
    TransactionDetails,
    TransactionMeta,
};
use crate::swaps::config::{
    TOKEN_ACCOUNT_LEN,
    TRANSACTION_CONFIRMATION_MAX_ATTEMPTS,
    TRANSACTION_CONFIRMATION_RETRY_DELAY_MS,
};
use crate::swaps::instructions::{
    build_buy_instructions,
    build_sell_instructions,
    derive_ephemeral_wsol_account,
    non_sol_mint,
    BuyInstructionParams,
    SellInstructionParams,
};
use crate::swaps::quote::{ quote_buy, quote_sell };
use crate::wallet;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::Transaction;
use spl_associated_token_account::get_associated_token_address;
use std::future::Future;
use std::time::Duration;

/// Signer-observed balance changes extracted from confirmed metadata
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealizedAmounts {
    /// Signer's SOL change in SOL units (negative on buys; includes fees)
    pub sol_delta: f64,
    /// Signer's traded-token change in ui units
    pub token_delta: f64,
}

/// Terminal result of one submitted swap transaction
#[derive(Debug, Clone)]
pub enum TransactionOutcome {
    Confirmed {
        signature: String,
        realized: Option<RealizedAmounts>,
    },
    Failed {
        signature: String,
        reason: SwapError,
    },
    Unknown {
        signature: String,
    },
}

impl TransactionOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransactionOutcome::Confirmed { .. })
    }

    pub fn signature(&self) -> &str {
        match self {
            TransactionOutcome::Confirmed { signature, .. } => signature,
            TransactionOutcome::Failed { signature, .. } => signature,
            TransactionOutcome::Unknown { signature } => signature,
        }
    }
}

/// Result of a buy pipeline run
#[derive(Debug, Clone)]
pub struct BuyResult {
    pub confirmed: bool,
    /// Quoted token output (ui units)
    pub amount_out: f64,
    pub signature: String,
    pub outcome: TransactionOutcome,
}

/// Result of a sell pipeline run
#[derive(Debug, Clone)]
pub struct SellResult {
    pub confirmed: bool,
    /// Tokens sold (ui units)
    pub token_amount_sold: f64,
    /// Quoted SOL output
    pub sol_received: f64,
    pub signature: String,
    pub outcome: TransactionOutcome,
}

/// Signer balance deltas for the traded mint, from transaction metadata
fn extract_realized_amounts(
    meta: &TransactionMeta,
    signer: &Pubkey,
    mint: &Pubkey
) -> Option<RealizedAmounts> {
    let pre_sol = *meta.pre_balances.first()?;
    let post_sol = *meta.post_balances.first()?;
    let sol_delta = lamports_to_sol(post_sol) - lamports_to_sol(pre_sol);

    let signer_str = signer.to_string();
    let mint_str = mint.to_string();
    let sum_for_signer = |balances: &Option<Vec<crate::rpc::TokenBalance>>| -> f64 {
        balances
            .as_ref()
            .map(|list| {
                list.iter()
                    .filter(|balance| {
                        balance.mint == mint_str &&
                            balance.owner.as_deref() == Some(signer_str.as_str())
                    })
                    .filter_map(|balance| balance.ui_token_amount.ui_amount)
                    .sum()
            })
            .unwrap_or(0.0)
    };

    let token_delta = sum_for_signer(&meta.post_token_balances) -
        sum_for_signer(&meta.pre_token_balances);

    Some(RealizedAmounts { sol_delta, token_delta })
}

/// Sign and submit the instruction list as one transaction
///
/// The blockhash is fetched immediately before compiling so the validity
/// window starts at submission. Preflight simulation stays disabled; the
/// minimum-output floor inside the swap instruction is the backstop.
pub async fn submit_transaction(
    rpc: &RpcClient,
    instructions: &[Instruction],
    payer: &Keypair
) -> Result<String, SwapError> {
    let recent_blockhash = rpc.get_latest_blockhash().await?;

    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &[payer],
        recent_blockhash
    );

    let encoded = serialize_transaction_base64(&transaction)?;
    rpc.send_transaction_base64(&encoded).await
}

/// Poll a transaction to a terminal outcome, generic over the poll call
///
/// The first definitive on-chain error returns Failed immediately without
/// touching the remaining attempt budget; exhausting every attempt without
/// a definitive answer returns Unknown.
pub async fn confirm_transaction_with<F, Fut>(
    signature: &str,
    signer: &Pubkey,
    mint: &Pubkey,
    max_attempts: u32,
    retry_delay: Duration,
    mut poll: F
) -> TransactionOutcome
    where F: FnMut() -> Fut, Fut: Future<Output = Result<TransactionDetails, SwapError>>
{
    for attempt in 1..=max_attempts {
        match poll().await {
            Ok(details) => {
                if let Some(meta) = &details.meta {
                    match &meta.err {
                        None => {
                            log(
                                LogTag::Swap,
                                "CONFIRMED",
                                &format!(
                                    "✅ Transaction confirmed on attempt {}: {}",
                                    attempt,
                                    signature
                                )
                            );
                            return TransactionOutcome::Confirmed {
                                signature: signature.to_string(),
                                realized: extract_realized_amounts(meta, signer, mint),
                            };
                        }
                        Some(err) => {
                            log(
                                LogTag::Swap,
                                "TX_FAILED",
                                &format!("❌ Transaction failed on-chain: {} - {}", signature, err)
                            );
                            return TransactionOutcome::Failed {
                                signature: signature.to_string(),
                                reason: SwapError::ExecutionFailed(err.to_string()),
                            };
                        }
                    }
                }
                // Indexed but without metadata: not definitive yet
            }
            Err(e) => {
                if is_debug_swap_enabled() {
                    log(
                        LogTag::Swap,
                        "PENDING",
                        &format!(
                            "⏳ Awaiting confirmation (attempt {}/{}): {}",
                            attempt,
                            max_attempts,
                            e
                        )
                    );
                }
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(retry_delay).await;
        }
    }

    log(
        LogTag::Swap,
        "UNKNOWN",
        &format!(
            "⏰ No definitive outcome after {} attempts: {} (outcome undetermined, not failed)",
            max_attempts,
            signature
        )
    );
    TransactionOutcome::Unknown { signature: signature.to_string() }
}

/// Poll the network for a transaction's terminal outcome
pub async fn confirm_transaction(
    rpc: &RpcClient,
    signature: &str,
    signer: &Pubkey,
    mint: &Pubkey
) -> TransactionOutcome {
    confirm_transaction_with(
        signature,
        signer,
        mint,
        TRANSACTION_CONFIRMATION_MAX_ATTEMPTS,
        Duration::from_millis(TRANSACTION_CONFIRMATION_RETRY_DELAY_MS),
        || rpc.get_transaction_details(signature)
    ).await
}

/// Execute a buy: spend `sol_in` SOL for the pool's token
pub async fn buy_swap(
    rpc: &RpcClient,
    payer: &Keypair,
    pair_address: &str,
    sol_in: f64,
    slippage_percent: f64
) -> Result<BuyResult, SwapError> {
    if !sol_in.is_finite() || sol_in <= 0.0 {
        return Err(SwapError::InvalidInput(format!("SOL amount must be positive, got {}", sol_in)));
    }

    log(
        LogTag::Swap,
        "BUY_START",
        &format!("🟢 Buy {} SOL on pool {} (slippage {}%)", sol_in, pair_address, slippage_percent)
    );

    let keys = fetch_pool_keys(rpc, pair_address).await?;
    let mint = non_sol_mint(&keys);
    let payer_pubkey = payer.pubkey();

    let reserves = fetch_reserves(rpc, &keys).await?;
    let quote = quote_buy(sol_in, reserves.token_reserve, reserves.sol_reserve, slippage_percent)?;

    let amount_in = sol_to_lamports(sol_in);
    let minimum_amount_out = (quote.minimum_amount_out *
        (10f64).powi(reserves.token_decimals as i32)) as u64;

    if is_debug_swap_enabled() {
        log(
            LogTag::Swap,
            "BUY_QUOTE",
            &format!(
                "Quote: {} SOL -> {} tokens (min {} raw units, reserves {} / {})",
                quote.amount_in,
                quote.amount_out,
                minimum_amount_out,
                reserves.sol_reserve,
                reserves.token_reserve
            )
        );
    }

    let existing_account = wallet::find_token_account(rpc, &payer_pubkey, &mint).await?;
    let (token_account, create_token_account) = match existing_account {
        Some(account) => (account, false),
        None => (get_associated_token_address(&payer_pubkey, &mint), true),
    };

    let rent_exempt_lamports = rpc.get_minimum_balance_for_rent_exemption(
        TOKEN_ACCOUNT_LEN as usize
    ).await?;
    let wsol_account = derive_ephemeral_wsol_account(&payer_pubkey)?;

    let instructions = build_buy_instructions(
        &(BuyInstructionParams {
            keys: &keys,
            payer: payer_pubkey,
            wsol_account: &wsol_account,
            rent_exempt_lamports,
            amount_in,
            minimum_amount_out,
            token_account,
            create_token_account,
        })
    )?;

    let signature = submit_transaction(rpc, &instructions, payer).await?;
    log(LogTag::Swap, "BUY_SENT", &format!("📤 Buy transaction submitted: {}", signature));

    let outcome = confirm_transaction(rpc, &signature, &payer_pubkey, &mint).await;

    Ok(BuyResult {
        confirmed: outcome.is_confirmed(),
        amount_out: quote.amount_out,
        signature,
        outcome,
    })
}

/// Execute a sell: sell `percentage` percent of the signer's holdings
pub async fn sell_swap(
    rpc: &RpcClient,
    payer: &Keypair,
    pair_address: &str,
    percentage: u8,
    slippage_percent: f64
) -> Result<SellResult, SwapError> {
    if percentage < 1 || percentage > 100 {
        return Err(
            SwapError::InvalidInput(
                format!("Sell percentage must be between 1 and 100, got {}", percentage)
            )
        );
    }

    log(
        LogTag::Swap,
        "SELL_START",
        &format!(
            "🔴 Sell {}% on pool {} (slippage {}%)",
            percentage,
            pair_address,
            slippage_percent
        )
    );

    let keys = fetch_pool_keys(rpc, pair_address).await?;
    let mint = non_sol_mint(&keys);
    let payer_pubkey = payer.pubkey();

    let token_balance = wallet
        ::get_token_balance(rpc, &payer_pubkey, &mint).await?
        .filter(|balance| *balance > 0.0)
        .ok_or_else(|| {
            SwapError::InsufficientBalance(format!("No balance to sell for mint {}", mint))
        })?;

    let token_in = token_balance * ((percentage as f64) / 100.0);

    let reserves = fetch_reserves(rpc, &keys).await?;
    let quote = quote_sell(token_in, reserves.token_reserve, reserves.sol_reserve, slippage_percent)?;

    let amount_in = (token_in * (10f64).powi(reserves.token_decimals as i32)) as u64;
    if amount_in == 0 {
        return Err(
            SwapError::InsufficientBalance(
                format!("Sell amount {} rounds to zero raw units", token_in)
            )
        );
    }
    let minimum_amount_out = sol_to_lamports(quote.minimum_amount_out);

    if is_debug_swap_enabled() {
        log(
            LogTag::Swap,
            "SELL_QUOTE",
            &format!(
                "Quote: {} tokens -> {} SOL (min {} lamports, reserves {} / {})",
                quote.amount_in,
                quote.amount_out,
                minimum_amount_out,
                reserves.sol_reserve,
                reserves.token_reserve
            )
        );
    }

    let token_account = get_associated_token_address(&payer_pubkey, &mint);
    let rent_exempt_lamports = rpc.get_minimum_balance_for_rent_exemption(
        TOKEN_ACCOUNT_LEN as usize
    ).await?;
    let wsol_account = derive_ephemeral_wsol_account(&payer_pubkey)?;

    let instructions = build_sell_instructions(
        &(SellInstructionParams {
            keys: &keys,
            payer: payer_pubkey,
            wsol_account: &wsol_account,
            rent_exempt_lamports,
            amount_in,
            minimum_amount_out,
            token_account,
            close_token_account: percentage == 100,
        })
    )?;

    let signature = submit_transaction(rpc, &instructions, payer).await?;
    log(LogTag::Swap, "SELL_SENT", &format!("📤 Sell transaction submitted: {}", signature));

    let outcome = confirm_transaction(rpc, &signature, &payer_pubkey, &mint).await;

    Ok(SellResult {
        confirmed: outcome.is_confirmed(),
        token_amount_sold: token_in,
        sol_received: quote.amount_out,
        signature,
        outcome,
    })
}
