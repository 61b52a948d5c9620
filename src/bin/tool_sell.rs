/// Direct Raydium AMM V4 sell tool
///
/// Sells a percentage of the wallet's holdings in a pool's token for SOL.
/// Selling 100% also reclaims the token account's rent.
///
/// Usage: cargo run --bin tool_sell -- --pool <POOL_ADDRESS> --percentage <1-100> [--slippage <PERCENT>]

use anyhow::Context;
use clap::{ Arg, Command };
use solswap::global::read_configs;
use solswap::logger::{ log, LogTag };
use solswap::swaps::config::DEFAULT_SLIPPAGE_PERCENT;
use solswap::swaps::sell_token;
use std::process;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("Raydium Sell Tool")
        .version("1.0")
        .about("Sell a pool's token for SOL directly on Raydium AMM V4")
        .arg(
            Arg::new("pool")
                .short('p')
                .long("pool")
                .value_name("POOL_ADDRESS")
                .help("Raydium AMM V4 pool address")
                .required(true)
        )
        .arg(
            Arg::new("percentage")
                .short('c')
                .long("percentage")
                .value_name("PERCENT")
                .help("Share of holdings to sell (1-100)")
                .required(true)
        )
        .arg(
            Arg::new("slippage")
                .long("slippage")
                .value_name("PERCENT")
                .help("Slippage tolerance in percent (0-100)")
                .required(false)
        )
        .arg(
            Arg::new("debug-swap")
                .long("debug-swap")
                .help("Enable verbose swap logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    let pool_address = matches.get_one::<String>("pool").expect("required arg");
    let percentage: u8 = matches
        .get_one::<String>("percentage")
        .expect("required arg")
        .parse()
        .context("--percentage must be an integer between 1 and 100")?;
    let slippage: f64 = match matches.get_one::<String>("slippage") {
        Some(raw) => raw.parse().context("--slippage must be a number")?,
        None => DEFAULT_SLIPPAGE_PERCENT,
    };

    let configs = read_configs("configs.json").map_err(|e|
        anyhow::anyhow!("Failed to read configs.json: {}", e)
    )?;

    log(LogTag::System, "START", "Raydium Sell Tool");

    match sell_token(&configs, pool_address, percentage, slippage).await {
        Ok(result) => {
            log(
                LogTag::System,
                "RESULT",
                &format!(
                    "confirmed={} token_amount_sold={} sol_received={} signature={}",
                    result.confirmed,
                    result.token_amount_sold,
                    result.sol_received,
                    result.signature
                )
            );
            if !result.confirmed {
                process::exit(1);
            }
        }
        Err(e) => {
            log(LogTag::System, "ERROR", &format!("Sell failed: {}", e));
            process::exit(1);
        }
    }

    Ok(())
}
