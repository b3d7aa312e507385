//! Cluster context: endpoint, commitment and signing identity
//!
//! Built once per invocation and passed by reference to every stage. Nothing
//! here touches the network.

use crate::error::{CliError, CliResult};
use crate::settings::Settings;
use anyhow::{bail, Context, Result};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

pub const DEFAULT_CLUSTER: &str = "devnet";
pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";

/// Public endpoint for a named cluster
pub fn cluster_endpoint(cluster: &str) -> Option<&'static str> {
    match cluster {
        "devnet" => Some("https://api.devnet.solana.com"),
        "testnet" => Some("https://api.testnet.solana.com"),
        "mainnet-beta" => Some("https://api.mainnet-beta.solana.com"),
        "localnet" => Some("http://localhost:8899"),
        _ => None,
    }
}

#[derive(Debug)]
pub struct ClusterContext {
    pub endpoint: String,
    pub commitment: CommitmentConfig,
    pub payer: Keypair,
    pub program_id: Pubkey,
    pub settings: Settings,
}

impl ClusterContext {
    /// Resolve flags into a context. An `rpc` override wins over the cluster table.
    pub fn resolve(
        cluster: &str,
        rpc: Option<&str>,
        keypair_path: &str,
        settings: Settings,
    ) -> CliResult<Self> {
        let endpoint = match rpc {
            Some(url) if !url.trim().is_empty() => url.to_string(),
            _ => cluster_endpoint(cluster)
                .ok_or_else(|| {
                    CliError::Config(format!(
                        "unknown cluster '{}' (expected devnet, testnet, mainnet-beta or localnet) and no --rpc given",
                        cluster
                    ))
                })?
                .to_string(),
        };

        let payer = load_keypair(keypair_path).map_err(|e| CliError::Config(format!("{:#}", e)))?;
        let program_id = settings
            .program_id()
            .map_err(|e| CliError::Config(format!("{:#}", e)))?;

        log::info!("Solana Cluster: {}", cluster);
        log::info!("Keypair Path: {}", keypair_path);
        log::info!("RPC URL: {}", endpoint);
        log::info!("Wallet Address: {}", payer.pubkey());
        log::info!("ProgramId: {}", program_id);

        Ok(Self {
            endpoint,
            commitment: CommitmentConfig::confirmed(),
            payer,
            program_id,
            settings,
        })
    }

    pub fn payer_pubkey(&self) -> Pubkey {
        self.payer.pubkey()
    }
}

/// Load a keypair file: solana-keygen JSON array, raw 64 bytes, or a base58 secret key
pub fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded_path = shellexpand::tilde(path);
    let bytes = std::fs::read(expanded_path.as_ref())
        .context(format!("Failed to read keypair from {}", path))?;

    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() {
        bail!("Keypair file {} is empty", path);
    }

    let keypair = if bytes.len() == 64 {
        // Binary format
        Keypair::try_from(&bytes[..]).context("Failed to create keypair from bytes")?
    } else if trimmed[0] == b'[' {
        // JSON format
        let json_data: Vec<u8> =
            serde_json::from_slice(trimmed).context("Failed to parse keypair JSON")?;
        Keypair::try_from(&json_data[..]).context("Failed to create keypair from bytes")?
    } else {
        let text = std::str::from_utf8(trimmed).context("Keypair file is not valid text")?;
        let decoded = bs58::decode(text)
            .into_vec()
            .context("Failed to decode base58 keypair")?;
        Keypair::try_from(&decoded[..]).context("Failed to create keypair from bytes")?
    };

    Ok(keypair)
}
