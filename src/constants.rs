/// Chain-wide program and mint addresses

use once_cell::sync::Lazy;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

/// Wrapped SOL mint address
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Raydium AMM V4 (Liquidity Pool V4) program
pub const RAYDIUM_AMM_V4_PROGRAM: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";

/// Raydium AMM V4 pool authority
pub const RAYDIUM_AUTHORITY_V4: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";

/// OpenBook (Serum) central limit order book program
pub const OPEN_BOOK_PROGRAM: &str = "srmqPvymJeFKQ4zGQed1GFppgkRHL9kaELCbyksJtPX";

pub static SOL_MINT_PUBKEY: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str(SOL_MINT).expect("valid WSOL mint address")
});

pub static RAYDIUM_AMM_V4_PROGRAM_PUBKEY: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str(RAYDIUM_AMM_V4_PROGRAM).expect("valid Raydium AMM V4 program address")
});

pub static RAYDIUM_AUTHORITY_V4_PUBKEY: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str(RAYDIUM_AUTHORITY_V4).expect("valid Raydium authority address")
});

pub static OPEN_BOOK_PROGRAM_PUBKEY: Lazy<Pubkey> = Lazy::new(|| {
    Pubkey::from_str(OPEN_BOOK_PROGRAM).expect("valid OpenBook program address")
});
