/// Tagged console logging
/// Every subsystem logs through `log(tag, code, message)` so output stays
/// grep-able: one short uppercase code per event plus a free-form message.

use chrono::Local;
use colored::*;
use std::io::{ self, Write };

/// Width reserved for the tag column
const TAG_WIDTH: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    Pool,
    Swap,
    Rpc,
    Wallet,
    System,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Pool => "POOL",
            LogTag::Swap => "SWAP",
            LogTag::Rpc => "RPC",
            LogTag::Wallet => "WALLET",
            LogTag::System => "SYSTEM",
        }
    }
}

fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.as_str(), width = TAG_WIDTH);
    match tag {
        LogTag::Pool => padded.cyan().bold(),
        LogTag::Swap => padded.yellow().bold(),
        LogTag::Rpc => padded.bright_green().bold(),
        LogTag::Wallet => padded.blue().bold(),
        LogTag::System => padded.magenta().bold(),
    }
}

/// Log a tagged message to the console
pub fn log(tag: LogTag, log_type: &str, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    println!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        format_tag(&tag),
        log_type.white().bold(),
        message
    );
    let _ = io::stdout().flush();
}
