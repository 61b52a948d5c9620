/// Direct Raydium AMM V4 buy tool
///
/// Swaps SOL for a pool's token straight against the pool, no aggregator.
///
/// Usage: cargo run --bin tool_buy -- --pool <POOL_ADDRESS> --sol <AMOUNT> [--slippage <PERCENT>]

use anyhow::Context;
use clap::{ Arg, Command };
use solswap::global::read_configs;
use solswap::logger::{ log, LogTag };
use solswap::swaps::buy_token;
use solswap::swaps::config::DEFAULT_SLIPPAGE_PERCENT;
use std::process;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("Raydium Buy Tool")
        .version("1.0")
        .about("Buy a pool's token with SOL directly on Raydium AMM V4")
        .arg(
            Arg::new("pool")
                .short('p')
                .long("pool")
                .value_name("POOL_ADDRESS")
                .help("Raydium AMM V4 pool address")
                .required(true)
        )
        .arg(
            Arg::new("sol")
                .short('s')
                .long("sol")
                .value_name("AMOUNT")
                .help("SOL amount to spend")
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
    let sol_in: f64 = matches
        .get_one::<String>("sol")
        .expect("required arg")
        .parse()
        .context("--sol must be a number")?;
    let slippage: f64 = match matches.get_one::<String>("slippage") {
        Some(raw) => raw.parse().context("--slippage must be a number")?,
        None => DEFAULT_SLIPPAGE_PERCENT,
    };

    let configs = read_configs("configs.json").map_err(|e|
        anyhow::anyhow!("Failed to read configs.json: {}", e)
    )?;

    log(LogTag::System, "START", "Raydium Buy Tool");

    match buy_token(&configs, pool_address, sol_in, slippage).await {
        Ok(result) => {
            log(
                LogTag::System,
                "RESULT",
                &format!(
                    "confirmed={} amount_out={} signature={}",
                    result.confirmed,
                    result.amount_out,
                    result.signature
                )
            );
            if !result.confirmed {
                process::exit(1);
            }
        }
        Err(e) => {
            log(LogTag::System, "ERROR", &format!("Buy failed: {}", e));
            process::exit(1);
        }
    }

    Ok(())
}
