//! Deterministic program addresses
//!
//! The program derives the same addresses on-chain, so seed bytes and
//! component order here must match it exactly. A mismatch is not detected at
//! derivation time; it surfaces later as an account-not-found read-back.

use solana_sdk::pubkey::Pubkey;

pub const CONFIG_SEED: &[u8] = b"config";
pub const GLOBAL_SEED: &[u8] = b"global";
pub const MARKET_SEED: &[u8] = b"market";
pub const USERINFO_SEED: &[u8] = b"userinfo";
pub const METADATA_SEED: &[u8] = b"metadata";

pub const TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
pub const TOKEN_METADATA_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Derive a program address from a fixed seed followed by public keys, in order.
pub fn derive(program_id: &Pubkey, seed: &[u8], components: &[&Pubkey]) -> Pubkey {
    let mut seeds: Vec<&[u8]> = Vec::with_capacity(components.len() + 1);
    seeds.push(seed);
    seeds.extend(components.iter().map(|key| key.as_ref()));

    Pubkey::find_program_address(&seeds, program_id).0
}

/// Singleton config account
pub fn config_address(program_id: &Pubkey) -> Pubkey {
    derive(program_id, CONFIG_SEED, &[])
}

/// SOL vault owned by the program, also the mint authority of outcome tokens
pub fn global_vault_address(program_id: &Pubkey) -> Pubkey {
    derive(program_id, GLOBAL_SEED, &[])
}

/// Market keyed by (yes, no). Swapping the two yields a different market.
pub fn market_address(program_id: &Pubkey, yes_token: &Pubkey, no_token: &Pubkey) -> Pubkey {
    derive(program_id, MARKET_SEED, &[yes_token, no_token])
}

pub fn user_info_address(program_id: &Pubkey, user: &Pubkey, market: &Pubkey) -> Pubkey {
    derive(program_id, USERINFO_SEED, &[user, market])
}

pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

pub fn metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            METADATA_SEED,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .0
}

/// Every address a market instruction touches, derived once per command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketAddresses {
    pub config: Pubkey,
    pub global_vault: Pubkey,
    pub market: Pubkey,
    pub global_yes_ata: Pubkey,
    pub global_no_ata: Pubkey,
}

impl MarketAddresses {
    pub fn derive(program_id: &Pubkey, yes_token: &Pubkey, no_token: &Pubkey) -> Self {
        let global_vault = global_vault_address(program_id);
        Self {
            config: config_address(program_id),
            global_vault,
            market: market_address(program_id, yes_token, no_token),
            global_yes_ata: associated_token_address(&global_vault, yes_token),
            global_no_ata: associated_token_address(&global_vault, no_token),
        }
    }
}
