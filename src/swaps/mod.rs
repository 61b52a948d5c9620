/// Direct Raydium AMM V4 swap execution
///
/// One swap is a strictly linear pipeline: resolve pool keys, snapshot
/// reserves, quote, build the instruction list, then submit and confirm.
/// No stage shares mutable state with another, and nothing is cached
/// between swaps.

pub mod config;
pub mod execution;
pub mod instructions;
pub mod interface;
pub mod quote;
pub mod tests;

pub use execution::{ BuyResult, RealizedAmounts, SellResult, TransactionOutcome };
pub use interface::{ buy_token, sell_token };
pub use quote::SwapQuote;
