/// Instruction Builder: the ordered operation list for one atomic swap
///
/// The swap instruction's byte layout and 18-account ordering are a fixed
/// contract with the Raydium AMM V4 program; any deviation is rejected
/// outright on-chain, never partially executed. Builders here are pure -
/// rent and account-existence facts are passed in so the sequences can be
/// asserted in tests without a network.
///
/// Every swap wraps SOL through a single-use token account derived from a
/// fresh random seed, created and closed inside the same transaction, so
/// no wrapped balance ever outlives the swap.

use crate::constants::{ RAYDIUM_AMM_V4_PROGRAM_PUBKEY, SOL_MINT_PUBKEY };
use crate::pool::keys::AmmPoolKeys;
use crate::rpc::SwapError;
use crate::swaps::config::{
    COMPUTE_UNIT_LIMIT,
    COMPUTE_UNIT_PRICE_MICRO_LAMPORTS,
    TOKEN_ACCOUNT_LEN,
    WSOL_SEED_BYTES,
};
use base64::{ engine::general_purpose, Engine as _ };
use rand::rngs::OsRng;
use rand::RngCore;
use solana_sdk::compute_budget::ComputeBudgetInstruction;
use solana_sdk::instruction::{ AccountMeta, Instruction };
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;

/// swap_base_in operation code
pub const SWAP_BASE_IN_DISCRIMINATOR: u8 = 9;

/// A single-use wrapped-SOL token account address and the seed behind it
#[derive(Debug, Clone)]
pub struct EphemeralWsolAccount {
    pub pubkey: Pubkey,
    pub seed: String,
}

/// Derive an ephemeral WSOL account from an explicit seed string
pub fn derive_ephemeral_wsol_account_with_seed(
    payer: &Pubkey,
    seed: &str
) -> Result<EphemeralWsolAccount, SwapError> {
    let pubkey = Pubkey::create_with_seed(payer, seed, &spl_token::id()).map_err(|e|
        SwapError::Build(format!("Failed to derive seeded WSOL account: {}", e))
    )?;
    Ok(EphemeralWsolAccount { pubkey, seed: seed.to_string() })
}

/// Derive a fresh ephemeral WSOL account for one swap
///
/// The seed is 24 bytes from the OS CSPRNG, URL-safe base64 encoded into
/// 32 ASCII characters.
pub fn derive_ephemeral_wsol_account(payer: &Pubkey) -> Result<EphemeralWsolAccount, SwapError> {
    let mut seed_bytes = [0u8; WSOL_SEED_BYTES];
    OsRng.fill_bytes(&mut seed_bytes);
    let seed = general_purpose::URL_SAFE.encode(seed_bytes);
    derive_ephemeral_wsol_account_with_seed(payer, &seed)
}

/// Build the Raydium AMM V4 swap_base_in instruction
///
/// Data is 17 bytes: the operation code, then amount_in and
/// minimum_amount_out as little-endian u64s. The account list order is
/// mandated by the program.
pub fn make_swap_instruction(
    amount_in: u64,
    minimum_amount_out: u64,
    token_account_in: &Pubkey,
    token_account_out: &Pubkey,
    keys: &AmmPoolKeys,
    owner: &Pubkey
) -> Instruction {
    let accounts = vec![
        AccountMeta::new_readonly(keys.token_program_id, false),
        AccountMeta::new(keys.amm_id, false),
        AccountMeta::new_readonly(keys.ray_authority_v4, false),
        AccountMeta::new(keys.open_orders, false),
        AccountMeta::new(keys.target_orders, false),
        AccountMeta::new(keys.base_vault, false),
        AccountMeta::new(keys.quote_vault, false),
        AccountMeta::new_readonly(keys.open_book_program, false),
        AccountMeta::new(keys.market_id, false),
        AccountMeta::new(keys.bids, false),
        AccountMeta::new(keys.asks, false),
        AccountMeta::new(keys.event_queue, false),
        AccountMeta::new(keys.market_base_vault, false),
        AccountMeta::new(keys.market_quote_vault, false),
        AccountMeta::new_readonly(keys.market_authority, false),
        AccountMeta::new(*token_account_in, false),
        AccountMeta::new(*token_account_out, false),
        AccountMeta::new_readonly(*owner, true)
    ];

    let mut data = Vec::with_capacity(17);
    data.push(SWAP_BASE_IN_DISCRIMINATOR);
    data.extend_from_slice(&amount_in.to_le_bytes());
    data.extend_from_slice(&minimum_amount_out.to_le_bytes());

    Instruction {
        program_id: *RAYDIUM_AMM_V4_PROGRAM_PUBKEY,
        accounts,
        data,
    }
}

/// Everything a buy transaction needs, resolved ahead of building
#[derive(Debug)]
pub struct BuyInstructionParams<'a> {
    pub keys: &'a AmmPoolKeys,
    pub payer: Pubkey,
    pub wsol_account: &'a EphemeralWsolAccount,
    pub rent_exempt_lamports: u64,
    pub amount_in: u64,
    pub minimum_amount_out: u64,
    pub token_account: Pubkey,
    pub create_token_account: bool,
}

/// Buy sequence: wrap exactly amount_in lamports of SOL, swap, unwrap
///
/// [compute limit, compute price, create WSOL with seed, init WSOL,
///  (create destination token account), swap, close WSOL]
pub fn build_buy_instructions(
    params: &BuyInstructionParams<'_>
) -> Result<Vec<Instruction>, SwapError> {
    let mut instructions = Vec::with_capacity(7);

    instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(COMPUTE_UNIT_LIMIT));
    instructions.push(
        ComputeBudgetInstruction::set_compute_unit_price(COMPUTE_UNIT_PRICE_MICRO_LAMPORTS)
    );

    instructions.push(
        system_instruction::create_account_with_seed(
            &params.payer,
            &params.wsol_account.pubkey,
            &params.payer,
            &params.wsol_account.seed,
            params.rent_exempt_lamports + params.amount_in,
            TOKEN_ACCOUNT_LEN,
            &spl_token::id()
        )
    );

    instructions.push(
        spl_token::instruction
            ::initialize_account(
                &spl_token::id(),
                &params.wsol_account.pubkey,
                &SOL_MINT_PUBKEY,
                &params.payer
            )
            .map_err(|e| SwapError::Build(format!("initialize_account: {}", e)))?
    );

    if params.create_token_account {
        let mint = non_sol_mint(params.keys);
        instructions.push(
            spl_associated_token_account::instruction::create_associated_token_account(
                &params.payer,
                &params.payer,
                &mint,
                &spl_token::id()
            )
        );
    }

    instructions.push(
        make_swap_instruction(
            params.amount_in,
            params.minimum_amount_out,
            &params.wsol_account.pubkey,
            &params.token_account,
            params.keys,
            &params.payer
        )
    );

    instructions.push(
        spl_token::instruction
            ::close_account(
                &spl_token::id(),
                &params.wsol_account.pubkey,
                &params.payer,
                &params.payer,
                &[]
            )
            .map_err(|e| SwapError::Build(format!("close_account: {}", e)))?
    );

    Ok(instructions)
}

/// Everything a sell transaction needs, resolved ahead of building
#[derive(Debug)]
pub struct SellInstructionParams<'a> {
    pub keys: &'a AmmPoolKeys,
    pub payer: Pubkey,
    pub wsol_account: &'a EphemeralWsolAccount,
    pub rent_exempt_lamports: u64,
    pub amount_in: u64,
    pub minimum_amount_out: u64,
    pub token_account: Pubkey,
    /// True only when the full balance is sold (percentage == 100)
    pub close_token_account: bool,
}

/// Sell sequence, symmetric to the buy: the WSOL account is the swap
/// destination and carries only rent. Selling the entire balance appends
/// one final instruction reclaiming the source account's rent.
pub fn build_sell_instructions(
    params: &SellInstructionParams<'_>
) -> Result<Vec<Instruction>, SwapError> {
    let mut instructions = Vec::with_capacity(7);

    instructions.push(ComputeBudgetInstruction::set_compute_unit_limit(COMPUTE_UNIT_LIMIT));
    instructions.push(
        ComputeBudgetInstruction::set_compute_unit_price(COMPUTE_UNIT_PRICE_MICRO_LAMPORTS)
    );

    instructions.push(
        system_instruction::create_account_with_seed(
            &params.payer,
            &params.wsol_account.pubkey,
            &params.payer,
            &params.wsol_account.seed,
            params.rent_exempt_lamports,
            TOKEN_ACCOUNT_LEN,
            &spl_token::id()
        )
    );

    instructions.push(
        spl_token::instruction
            ::initialize_account(
                &spl_token::id(),
                &params.wsol_account.pubkey,
                &SOL_MINT_PUBKEY,
                &params.payer
            )
            .map_err(|e| SwapError::Build(format!("initialize_account: {}", e)))?
    );

    instructions.push(
        make_swap_instruction(
            params.amount_in,
            params.minimum_amount_out,
            &params.token_account,
            &params.wsol_account.pubkey,
            params.keys,
            &params.payer
        )
    );

    instructions.push(
        spl_token::instruction
            ::close_account(
                &spl_token::id(),
                &params.wsol_account.pubkey,
                &params.payer,
                &params.payer,
                &[]
            )
            .map_err(|e| SwapError::Build(format!("close_account: {}", e)))?
    );

    if params.close_token_account {
        instructions.push(
            spl_token::instruction
                ::close_account(
                    &spl_token::id(),
                    &params.token_account,
                    &params.payer,
                    &params.payer,
                    &[]
                )
                .map_err(|e| SwapError::Build(format!("close_account: {}", e)))?
        );
    }

    Ok(instructions)
}

/// The traded (non-WSOL) mint of a pool
pub fn non_sol_mint(keys: &AmmPoolKeys) -> Pubkey {
    if keys.base_mint != *SOL_MINT_PUBKEY {
        keys.base_mint
    } else {
        keys.quote_mint
    }
}
