use once_cell::sync::Lazy;
use serde::{ Deserialize, Serialize };
use std::env;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| { Mutex::new(env::args().collect()) });

/// Check if debug swap mode is enabled via command line args
pub fn is_debug_swap_enabled() -> bool {
    if let Ok(args) = CMD_ARGS.lock() {
        args.contains(&"--debug-swap".to_string())
    } else {
        false
    }
}

/// Check if debug rpc mode is enabled via command line args
pub fn is_debug_rpc_enabled() -> bool {
    if let Ok(args) = CMD_ARGS.lock() {
        args.contains(&"--debug-rpc".to_string())
    } else {
        false
    }
}

/// Represents the runtime configuration loaded from configs.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configs {
    pub main_wallet_private: String,
    pub rpc_url: String,
}

/// Reads the configs.json file from the project root and returns a Configs object
pub fn read_configs<P: AsRef<Path>>(path: P) -> Result<Configs, Box<dyn std::error::Error>> {
    let data = fs::read_to_string(path)?;
    let configs: Configs = serde_json::from_str(&data)?;
    Ok(configs)
}
