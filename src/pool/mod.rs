/// Pool metadata resolution for Raydium AMM V4 pools
///
/// A pool address resolves into the full set of routing accounts in two
/// chained reads: the 752-byte liquidity state account, then the OpenBook
/// market account it references. Reserves are a separate point-in-time
/// snapshot fetched per swap.

pub mod keys;
pub mod layouts;
pub mod reserves;
pub mod utils;

pub use keys::{ fetch_pool_keys, AmmPoolKeys };
pub use reserves::{ fetch_reserves, PoolReserves };
