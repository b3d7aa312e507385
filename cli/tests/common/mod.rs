//! In-memory chain that records every round trip

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use prediction_market_cli::{
    settings::Settings,
    state::{LpInfo, Market, MarketConfig, ProgramAccount, UserInfo},
    ChainClient, ClusterContext,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::str::FromStr;

pub const YES: &str = "A5LmU5ZciBaJZKT9u59tasTDNrdMpGAo4WkGhmTkoBBA";
pub const NO: &str = "9jnqZhBjuAjmj6qwmGBAm7ftok437prs6WkgcfLnKzrr";

pub fn key(s: &str) -> Pubkey {
    Pubkey::from_str(s).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Blockhash,
    Send {
        signers: Vec<Pubkey>,
        instructions: usize,
        verified: bool,
    },
    Fetch(Pubkey),
}

#[derive(Default)]
pub struct FakeChain {
    calls: RefCell<Vec<Call>>,
    accounts: RefCell<HashMap<Pubkey, Vec<u8>>>,
    /// Served for any address not in `accounts`
    fallback: Option<Vec<u8>>,
    send_error: Option<String>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account<T: ProgramAccount>(self, address: Pubkey, account: &T) -> Self {
        self.accounts
            .borrow_mut()
            .insert(address, account.to_account_data().unwrap());
        self
    }

    pub fn with_fallback<T: ProgramAccount>(mut self, account: &T) -> Self {
        self.fallback = Some(account.to_account_data().unwrap());
        self
    }

    pub fn failing_send(mut self, error: &str) -> Self {
        self.send_error = Some(error.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn sends(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Send { .. }))
            .collect()
    }

    /// Calls made after the last submission
    pub fn after_send(&self) -> Vec<Call> {
        let calls = self.calls();
        match calls.iter().rposition(|c| matches!(c, Call::Send { .. })) {
            Some(i) => calls[i + 1..].to_vec(),
            None => Vec::new(),
        }
    }
}

impl ChainClient for FakeChain {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.calls.borrow_mut().push(Call::Blockhash);
        Ok(Hash::new_unique())
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        let required = transaction.message.header.num_required_signatures as usize;
        self.calls.borrow_mut().push(Call::Send {
            signers: transaction.message.account_keys[..required].to_vec(),
            instructions: transaction.message.instructions.len(),
            verified: transaction.verify().is_ok(),
        });

        match &self.send_error {
            Some(err) => Err(anyhow!(err.clone())),
            None => Ok(transaction.signatures[0]),
        }
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push(Call::Fetch(*address));
        self.accounts
            .borrow()
            .get(address)
            .cloned()
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| anyhow!("AccountNotFound: pubkey={}", address))
    }
}

pub fn context() -> ClusterContext {
    let settings = Settings::default();
    ClusterContext {
        endpoint: "https://api.devnet.solana.com".to_string(),
        commitment: CommitmentConfig::confirmed(),
        payer: Keypair::new(),
        program_id: settings.program_id().unwrap(),
        settings,
    }
}

pub fn sample_config(authority: &Pubkey, team_wallet: &Pubkey) -> MarketConfig {
    MarketConfig {
        authority: authority.to_bytes(),
        pending_authority: [0u8; 32],
        team_wallet: team_wallet.to_bytes(),
        platform_buy_fee: 100,
        platform_sell_fee: 100,
        lp_buy_fee: 20,
        lp_sell_fee: 20,
        token_supply_config: 1_000_000_000_000_000,
        token_decimals_config: 6,
        initial_real_token_reserves_config: 1_000_000_000,
        min_sol_liquidity: 5_000_000_000,
        initialized: true,
    }
}

pub fn sample_market(yes: &Pubkey, no: &Pubkey, lp: &Pubkey) -> Market {
    Market {
        yes_token_mint: yes.to_bytes(),
        no_token_mint: no.to_bytes(),
        creator: lp.to_bytes(),
        initial_yes_token_reserves: 1_000_000_000_000_000,
        real_yes_token_reserves: 1_000_000_000_000_000,
        real_yes_sol_reserves: 1_000_000_000,
        token_yes_total_supply: 1_000_000_000_000_000,
        initial_no_token_reserves: 1_000_000_000_000_000,
        real_no_token_reserves: 1_000_000_000_000_000,
        real_no_sol_reserves: 1_000_000_000,
        token_no_total_supply: 1_000_000_000_000_000,
        is_completed: false,
        start_slot: None,
        ending_slot: None,
        lps: vec![LpInfo {
            user: lp.to_bytes(),
            sol_amount: 2_000_000_000,
        }],
        total_lp_amount: 2_000_000_000,
    }
}

pub fn sample_user_info(user: &Pubkey) -> UserInfo {
    UserInfo {
        user: user.to_bytes(),
        yes_balance: 0,
        no_balance: 0,
        is_lp: true,
        is_initialized: true,
    }
}
