//! CLI settings file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use std::str::FromStr;

/// Program id of the deployed prediction-market program
pub const DEFAULT_PROGRAM_ID: &str = "5q1C8N47AYvLu7w6LKngwXhLjrZCZ5izMB8nbziZhYEV";

/// Settings file used when neither `--config` nor `MARKET_CLI_CONFIG` is given
pub const DEFAULT_SETTINGS_PATH: &str = "market-cli.toml";

pub const SETTINGS_ENV: &str = "MARKET_CLI_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prediction-market program id (base58)
    pub program_id: String,

    /// Skip the RPC node's simulation before broadcast
    pub skip_preflight: bool,

    /// Values written by the `config` command
    pub market_config: MarketConfigSettings,

    /// Token metadata and slot window used by the `market` command
    pub market: MarketSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfigSettings {
    /// Team wallet receiving platform fees, defaults to the signer
    pub team_wallet: Option<String>,

    /// Fees in basis points (100 = 1%)
    pub platform_buy_fee: u64,
    pub platform_sell_fee: u64,
    pub lp_buy_fee: u64,
    pub lp_sell_fee: u64,

    /// Supply minted per outcome token, in base units. Must be a whole number of tokens.
    pub token_supply: u64,
    pub token_decimals: u8,
    pub initial_real_token_reserves: u64,

    /// Minimum liquidity in lamports
    pub min_sol_liquidity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub yes_symbol: String,
    pub yes_uri: String,
    pub no_symbol: String,
    pub no_uri: String,
    pub start_slot: Option<u64>,
    pub ending_slot: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID.to_string(),
            skip_preflight: true,
            market_config: MarketConfigSettings::default(),
            market: MarketSettings::default(),
        }
    }
}

impl Default for MarketConfigSettings {
    fn default() -> Self {
        Self {
            team_wallet: None,
            platform_buy_fee: 100,
            platform_sell_fee: 100,
            lp_buy_fee: 20,
            lp_sell_fee: 20,
            token_supply: 1_000_000_000_000_000,
            token_decimals: 6,
            initial_real_token_reserves: 1_000_000_000,
            min_sol_liquidity: 5_000_000_000,
        }
    }
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            yes_symbol: "AGREE".to_string(),
            yes_uri: "https://arweave.net/prediction-market/yes.json".to_string(),
            no_symbol: "DISAGREE".to_string(),
            no_uri: "https://arweave.net/prediction-market/no.json".to_string(),
            start_slot: None,
            ending_slot: None,
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path (flag or environment) must exist. The implicit default
    /// path is optional and falls back to built-in defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let explicit = explicit
            .map(str::to_string)
            .or_else(|| std::env::var(SETTINGS_ENV).ok());

        match explicit {
            Some(path) => Self::from_file(&path),
            None if Path::new(DEFAULT_SETTINGS_PATH).exists() => {
                Self::from_file(DEFAULT_SETTINGS_PATH)
            }
            None => {
                log::warn!("No settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let expanded = shellexpand::tilde(path);
        let settings_str = std::fs::read_to_string(expanded.as_ref())
            .context(format!("Failed to read settings file: {}", path))?;

        Self::from_toml(&settings_str)
    }

    pub fn from_toml(settings_str: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(settings_str).context("Failed to parse settings TOML")?;
        settings.program_id()?;
        settings.market_config.team_wallet()?;
        Ok(settings)
    }

    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.program_id)
            .context(format!("Invalid program_id: {}", self.program_id))
    }

    /// Write default settings to file
    pub fn write_default(path: &str) -> Result<()> {
        let toml_str = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize settings")?;

        std::fs::write(path, toml_str)
            .context(format!("Failed to write settings to {}", path))?;

        log::info!("Created default settings at {}", path);
        Ok(())
    }
}

impl MarketConfigSettings {
    pub fn team_wallet(&self) -> Result<Option<Pubkey>> {
        self.team_wallet
            .as_deref()
            .map(|s| Pubkey::from_str(s).context(format!("Invalid team_wallet: {}", s)))
            .transpose()
    }
}
