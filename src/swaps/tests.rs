/// Test suite for swap operations
/// Covers quote math, instruction building, and the confirmation state
/// machine, all without touching the network.

#[cfg(test)]
mod tests {
    use crate::constants::{ RAYDIUM_AMM_V4_PROGRAM_PUBKEY, SOL_MINT_PUBKEY };
    use crate::pool::keys::AmmPoolKeys;
    use crate::rpc::{
        SwapError,
        TokenBalance,
        TransactionData,
        TransactionDetails,
        TransactionMeta,
        UiTokenAmount,
    };
    use crate::swaps::config::SWAP_FEE_PERCENT;
    use crate::swaps::execution::{ confirm_transaction_with, TransactionOutcome };
    use crate::swaps::instructions::{
        build_buy_instructions,
        build_sell_instructions,
        derive_ephemeral_wsol_account,
        derive_ephemeral_wsol_account_with_seed,
        make_swap_instruction,
        non_sol_mint,
        BuyInstructionParams,
        SellInstructionParams,
        SWAP_BASE_IN_DISCRIMINATOR,
    };
    use crate::swaps::quote::{ quote_buy, quote_sell, sol_for_tokens, tokens_for_sol };
    use solana_sdk::pubkey::Pubkey;
    use solana_sdk::system_instruction::SystemInstruction;
    use std::sync::atomic::{ AtomicU32, Ordering };
    use std::sync::Arc;
    use std::time::Duration;

    const TOKEN_RESERVE: f64 = 1_000_000.0;
    const SOL_RESERVE: f64 = 500.0;

    fn test_pool_keys() -> AmmPoolKeys {
        AmmPoolKeys {
            amm_id: Pubkey::new_unique(),
            base_mint: Pubkey::new_unique(),
            quote_mint: *SOL_MINT_PUBKEY,
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

    // =========================================================================
    // QUOTE MATH
    // =========================================================================

    #[test]
    fn sol_for_tokens_matches_constant_product_example() {
        // reserves (1_000_000 tokens, 500 SOL), input 10 SOL, fee 0.25%:
        // effective_in = 9.975, k = 500_000_000,
        // new_token_reserve = 500_000_000 / 509.975 = 980_440.217657...,
        // tokens_out = 19_559.782342...
        let tokens_out = sol_for_tokens(10.0, TOKEN_RESERVE, SOL_RESERVE).unwrap();
        assert!(
            (tokens_out - 19_559.782342).abs() < 1e-5,
            "unexpected output: {}",
            tokens_out
        );
    }

    #[test]
    fn quote_output_is_rounded_to_9_decimals() {
        let tokens_out = sol_for_tokens(10.0, TOKEN_RESERVE, SOL_RESERVE).unwrap();
        let rescaled = tokens_out * 1_000_000_000.0;
        assert!((rescaled - rescaled.round()).abs() < 1e-3);
    }

    #[test]
    fn round_trip_loses_at_least_twice_the_fee_and_never_creates_value() {
        let sol_in = 10.0;
        let tokens = sol_for_tokens(sol_in, TOKEN_RESERVE, SOL_RESERVE).unwrap();
        let sol_back = tokens_for_sol(tokens, TOKEN_RESERVE, SOL_RESERVE).unwrap();
        assert!(sol_back < sol_in, "round trip must not create value");
        assert!(
            sol_back <= sol_in * (1.0 - (2.0 * SWAP_FEE_PERCENT) / 100.0),
            "round trip must lose at least twice the fee: {} -> {}",
            sol_in,
            sol_back
        );

        let token_in = 1_000.0;
        let sol = tokens_for_sol(token_in, TOKEN_RESERVE, SOL_RESERVE).unwrap();
        let tokens_back = sol_for_tokens(sol, TOKEN_RESERVE, SOL_RESERVE).unwrap();
        assert!(tokens_back < token_in);
        assert!(tokens_back <= token_in * (1.0 - (2.0 * SWAP_FEE_PERCENT) / 100.0));
    }

    #[test]
    fn minimum_amount_out_is_non_increasing_in_slippage() {
        let mut previous = f64::INFINITY;
        for slippage in [0.0, 0.5, 1.0, 5.0, 25.0, 50.0, 100.0] {
            let quote = quote_buy(10.0, TOKEN_RESERVE, SOL_RESERVE, slippage).unwrap();
            assert!(quote.minimum_amount_out <= quote.amount_out);
            assert!(
                quote.minimum_amount_out <= previous,
                "minimum_amount_out must not increase with slippage"
            );
            previous = quote.minimum_amount_out;
        }
    }

    #[test]
    fn full_slippage_floors_minimum_at_zero() {
        let quote = quote_sell(1_000.0, TOKEN_RESERVE, SOL_RESERVE, 100.0).unwrap();
        assert_eq!(quote.minimum_amount_out, 0.0);
    }

    #[test]
    fn degenerate_reserves_fail_instead_of_faulting() {
        for (token_reserve, sol_reserve) in [
            (0.0, SOL_RESERVE),
            (TOKEN_RESERVE, 0.0),
            (0.0, 0.0),
            (1e-12, SOL_RESERVE),
            (TOKEN_RESERVE, f64::NAN),
        ] {
            assert!(
                matches!(
                    sol_for_tokens(10.0, token_reserve, sol_reserve),
                    Err(SwapError::DegenerateReserves(_))
                ),
                "reserves ({}, {}) must be rejected",
                token_reserve,
                sol_reserve
            );
            assert!(
                matches!(
                    tokens_for_sol(10.0, token_reserve, sol_reserve),
                    Err(SwapError::DegenerateReserves(_))
                )
            );
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            quote_buy(0.0, TOKEN_RESERVE, SOL_RESERVE, 5.0),
            Err(SwapError::InvalidInput(_))
        ));
        assert!(matches!(
            quote_sell(-1.0, TOKEN_RESERVE, SOL_RESERVE, 5.0),
            Err(SwapError::InvalidInput(_))
        ));
        for slippage in [-0.1, 100.1, f64::NAN] {
            assert!(
                matches!(
                    quote_buy(1.0, TOKEN_RESERVE, SOL_RESERVE, slippage),
                    Err(SwapError::InvalidInput(_))
                ),
                "slippage {} must be rejected",
                slippage
            );
        }
    }

    // =========================================================================
    // INSTRUCTION BUILDING
    // =========================================================================

    #[test]
    fn swap_instruction_data_is_17_bytes_little_endian() {
        let keys = test_pool_keys();
        let source = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let instruction = make_swap_instruction(
            123_456_789,
            987_654,
            &source,
            &destination,
            &keys,
            &owner
        );

        assert_eq!(instruction.program_id, *RAYDIUM_AMM_V4_PROGRAM_PUBKEY);
        assert_eq!(instruction.data.len(), 17);
        assert_eq!(instruction.data[0], SWAP_BASE_IN_DISCRIMINATOR);
        assert_eq!(&instruction.data[1..9], &123_456_789u64.to_le_bytes());
        assert_eq!(&instruction.data[9..17], &987_654u64.to_le_bytes());
    }

    #[test]
    fn swap_instruction_account_ordering_matches_the_program_contract() {
        let keys = test_pool_keys();
        let source = Pubkey::new_unique();
        let destination = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let instruction = make_swap_instruction(1, 1, &source, &destination, &keys, &owner);
        let accounts = &instruction.accounts;
        assert_eq!(accounts.len(), 18);

        let expected = [
            (keys.token_program_id, false, false),
            (keys.amm_id, true, false),
            (keys.ray_authority_v4, false, false),
            (keys.open_orders, true, false),
            (keys.target_orders, true, false),
            (keys.base_vault, true, false),
            (keys.quote_vault, true, false),
            (keys.open_book_program, false, false),
            (keys.market_id, true, false),
            (keys.bids, true, false),
            (keys.asks, true, false),
            (keys.event_queue, true, false),
            (keys.market_base_vault, true, false),
            (keys.market_quote_vault, true, false),
            (keys.market_authority, false, false),
            (source, true, false),
            (destination, true, false),
            (owner, false, true),
        ];
        for (index, (pubkey, writable, signer)) in expected.iter().enumerate() {
            assert_eq!(accounts[index].pubkey, *pubkey, "account {} pubkey", index);
            assert_eq!(accounts[index].is_writable, *writable, "account {} writable", index);
            assert_eq!(accounts[index].is_signer, *signer, "account {} signer", index);
        }
    }

    #[test]
    fn buy_sequence_wraps_swaps_and_unwraps() {
        let keys = test_pool_keys();
        let payer = Pubkey::new_unique();
        let wsol = derive_ephemeral_wsol_account_with_seed(&payer, "11111111222222223333333344444444")
            .unwrap();

        let params = BuyInstructionParams {
            keys: &keys,
            payer,
            wsol_account: &wsol,
            rent_exempt_lamports: 2_039_280,
            amount_in: 1_000_000_000,
            minimum_amount_out: 42,
            token_account: Pubkey::new_unique(),
            create_token_account: false,
        };
        let instructions = build_buy_instructions(&params).unwrap();

        assert_eq!(instructions.len(), 6);
        assert_eq!(instructions[0].program_id, solana_sdk::compute_budget::id());
        assert_eq!(instructions[1].program_id, solana_sdk::compute_budget::id());
        assert_eq!(instructions[2].program_id, solana_sdk::system_program::id());
        assert_eq!(instructions[3].program_id, spl_token::id());
        assert_eq!(instructions[4].program_id, *RAYDIUM_AMM_V4_PROGRAM_PUBKEY);
        assert_eq!(instructions[5].program_id, spl_token::id());

        // The temporary WSOL account is funded with rent plus the exact
        // input amount, nothing else.
        let created: SystemInstruction = bincode::deserialize(&instructions[2].data).unwrap();
        match created {
            SystemInstruction::CreateAccountWithSeed { lamports, space, .. } => {
                assert_eq!(lamports, 2_039_280 + 1_000_000_000);
                assert_eq!(space, 165);
            }
            other => panic!("expected CreateAccountWithSeed, got {:?}", other),
        }

        // Swap spends from the WSOL account into the destination account.
        assert_eq!(instructions[4].accounts[15].pubkey, wsol.pubkey);
        assert_eq!(instructions[4].accounts[16].pubkey, params.token_account);
        // Unwrap closes the WSOL account, never the destination.
        assert_eq!(instructions[5].accounts[0].pubkey, wsol.pubkey);
    }

    #[test]
    fn buy_sequence_creates_destination_account_only_when_missing() {
        let keys = test_pool_keys();
        let payer = Pubkey::new_unique();
        let wsol = derive_ephemeral_wsol_account_with_seed(&payer, "abcdefghabcdefghabcdefghabcdefgh")
            .unwrap();

        let mut params = BuyInstructionParams {
            keys: &keys,
            payer,
            wsol_account: &wsol,
            rent_exempt_lamports: 2_039_280,
            amount_in: 500_000_000,
            minimum_amount_out: 1,
            token_account: Pubkey::new_unique(),
            create_token_account: true,
        };
        let instructions = build_buy_instructions(&params).unwrap();
        assert_eq!(instructions.len(), 7);
        assert_eq!(instructions[4].program_id, spl_associated_token_account::id());
        assert_eq!(instructions[5].program_id, *RAYDIUM_AMM_V4_PROGRAM_PUBKEY);

        params.create_token_account = false;
        let instructions = build_buy_instructions(&params).unwrap();
        assert!(
            instructions.iter().all(|ix| ix.program_id != spl_associated_token_account::id())
        );
    }

    #[test]
    fn sell_sequence_closes_source_account_iff_full_exit() {
        let keys = test_pool_keys();
        let payer = Pubkey::new_unique();
        let wsol = derive_ephemeral_wsol_account_with_seed(&payer, "00000000111111112222222233333333")
            .unwrap();
        let token_account = Pubkey::new_unique();

        let mut params = SellInstructionParams {
            keys: &keys,
            payer,
            wsol_account: &wsol,
            rent_exempt_lamports: 2_039_280,
            amount_in: 123_456,
            minimum_amount_out: 789,
            token_account,
            close_token_account: true,
        };

        // percentage == 100: the final instruction reclaims the source
        // account's rent.
        let instructions = build_sell_instructions(&params).unwrap();
        assert_eq!(instructions.len(), 7);
        let last = instructions.last().unwrap();
        assert_eq!(last.program_id, spl_token::id());
        assert_eq!(last.accounts[0].pubkey, token_account);

        // Any partial exit keeps the source account open.
        params.close_token_account = false;
        let instructions = build_sell_instructions(&params).unwrap();
        assert_eq!(instructions.len(), 6);
        let last = instructions.last().unwrap();
        assert_eq!(last.accounts[0].pubkey, wsol.pubkey);

        // Swap direction: source token account in, WSOL out.
        assert_eq!(instructions[4].accounts[15].pubkey, token_account);
        assert_eq!(instructions[4].accounts[16].pubkey, wsol.pubkey);

        // Sell-side WSOL account carries rent only.
        let created: SystemInstruction = bincode::deserialize(&instructions[2].data).unwrap();
        match created {
            SystemInstruction::CreateAccountWithSeed { lamports, .. } => {
                assert_eq!(lamports, 2_039_280);
            }
            other => panic!("expected CreateAccountWithSeed, got {:?}", other),
        }
    }

    #[test]
    fn ephemeral_wsol_seed_is_32_url_safe_chars_and_single_use() {
        let payer = Pubkey::new_unique();

        let first = derive_ephemeral_wsol_account(&payer).unwrap();
        let second = derive_ephemeral_wsol_account(&payer).unwrap();

        for account in [&first, &second] {
            assert_eq!(account.seed.len(), 32);
            assert!(
                account.seed
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='),
                "seed is not URL-safe base64: {}",
                account.seed
            );
        }
        assert_ne!(first.seed, second.seed, "each swap must draw a fresh seed");
        assert_ne!(first.pubkey, second.pubkey);

        // Same seed, same address.
        let replay = derive_ephemeral_wsol_account_with_seed(&payer, &first.seed).unwrap();
        assert_eq!(replay.pubkey, first.pubkey);
    }

    #[test]
    fn non_sol_mint_picks_the_traded_side() {
        let mut keys = test_pool_keys();
        assert_eq!(non_sol_mint(&keys), keys.base_mint);

        keys.quote_mint = keys.base_mint;
        keys.base_mint = *SOL_MINT_PUBKEY;
        assert_eq!(non_sol_mint(&keys), keys.quote_mint);
    }

    // =========================================================================
    // CONFIRMATION STATE MACHINE
    // =========================================================================

    fn details_with_meta(meta: Option<TransactionMeta>) -> TransactionDetails {
        TransactionDetails {
            slot: 1,
            transaction: TransactionData {
                message: serde_json::json!({}),
                signatures: vec!["sig".to_string()],
            },
            meta,
        }
    }

    fn success_meta() -> TransactionMeta {
        TransactionMeta {
            err: None,
            pre_balances: vec![10_000_000_000, 0],
            post_balances: vec![8_994_995_000, 0],
            pre_token_balances: Some(vec![]),
            post_token_balances: None,
            fee: 5_000,
            log_messages: None,
        }
    }

    fn failed_meta() -> TransactionMeta {
        TransactionMeta {
            err: Some(
                serde_json::json!({"InstructionError": [4, {"Custom": 30}]})
            ),
            pre_balances: vec![10_000_000_000],
            post_balances: vec![9_999_995_000],
            pre_token_balances: None,
            post_token_balances: None,
            fee: 5_000,
            log_messages: None,
        }
    }

    #[tokio::test]
    async fn definitive_failure_stops_polling_immediately() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        let outcome = confirm_transaction_with(
            "test-signature",
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            20,
            Duration::from_millis(1),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(details_with_meta(Some(failed_meta()))) }
            }
        ).await;

        assert_eq!(polls.load(Ordering::SeqCst), 1, "no retries after a definitive error");
        match outcome {
            TransactionOutcome::Failed { signature, reason } => {
                assert_eq!(signature, "test-signature");
                assert!(matches!(reason, SwapError::ExecutionFailed(_)));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn transient_errors_exhaust_exactly_the_attempt_budget() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        let outcome = confirm_transaction_with(
            "test-signature",
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            5,
            Duration::from_millis(1),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(SwapError::TransientNetwork("connection reset".to_string())) }
            }
        ).await;

        assert_eq!(polls.load(Ordering::SeqCst), 5, "every configured attempt is consumed");
        assert!(matches!(outcome, TransactionOutcome::Unknown { .. }));
    }

    #[tokio::test]
    async fn success_after_transient_errors_confirms() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        let outcome = confirm_transaction_with(
            "test-signature",
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            20,
            Duration::from_millis(1),
            move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt < 3 {
                        Err(SwapError::TransientNetwork("not found yet".to_string()))
                    } else {
                        Ok(details_with_meta(Some(success_meta())))
                    }
                }
            }
        ).await;

        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert!(outcome.is_confirmed());
    }

    #[tokio::test]
    async fn indexed_without_metadata_is_not_definitive() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();

        let outcome = confirm_transaction_with(
            "test-signature",
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            3,
            Duration::from_millis(1),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok(details_with_meta(None)) }
            }
        ).await;

        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert!(matches!(outcome, TransactionOutcome::Unknown { .. }));
    }

    #[tokio::test]
    async fn confirmed_outcome_carries_signer_balance_deltas() {
        let signer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let mut meta = success_meta();
        meta.pre_token_balances = Some(vec![TokenBalance {
            account_index: 1,
            mint: mint.to_string(),
            owner: Some(signer.to_string()),
            ui_token_amount: UiTokenAmount {
                amount: "0".to_string(),
                decimals: 6,
                ui_amount: None,
                ui_amount_string: None,
            },
        }]);
        meta.post_token_balances = Some(vec![TokenBalance {
            account_index: 1,
            mint: mint.to_string(),
            owner: Some(signer.to_string()),
            ui_token_amount: UiTokenAmount {
                amount: "19559782342".to_string(),
                decimals: 6,
                ui_amount: Some(19_559.782342),
                ui_amount_string: Some("19559.782342".to_string()),
            },
        }]);

        let outcome = confirm_transaction_with(
            "test-signature",
            &signer,
            &mint,
            1,
            Duration::from_millis(1),
            move || {
                let meta = meta.clone();
                async move { Ok(details_with_meta(Some(meta))) }
            }
        ).await;

        match outcome {
            TransactionOutcome::Confirmed { realized: Some(realized), .. } => {
                assert!((realized.token_delta - 19_559.782342).abs() < 1e-9);
                assert!((realized.sol_delta - (-1.005005)).abs() < 1e-9);
            }
            other => panic!("expected Confirmed with realized amounts, got {:?}", other),
        }
    }
}
