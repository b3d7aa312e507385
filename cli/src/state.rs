//! Off-chain mirrors of the program's accounts
//!
//! Layout is Anchor's: 8-byte `sha256("account:<Name>")` prefix followed by
//! Borsh fields. Accounts are allocated with trailing zero padding, so decoding
//! reads a prefix and ignores the rest.

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use solana_sdk::pubkey::Pubkey;
use std::fmt;

pub const DISCRIMINATOR_LEN: usize = 8;

pub fn account_discriminator(name: &str) -> [u8; 8] {
    let mut h = Sha256::new();
    h.update(b"account:");
    h.update(name.as_bytes());
    let out = h.finalize();
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&out[..8]);
    disc
}

/// Account type with a fixed Anchor name
pub trait ProgramAccount: BorshDeserialize + BorshSerialize + Sized {
    const NAME: &'static str;

    fn from_account_data(data: &[u8]) -> Result<Self, String> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(format!(
                "{} account data too short: {} bytes",
                Self::NAME,
                data.len()
            ));
        }
        if data[..DISCRIMINATOR_LEN] != account_discriminator(Self::NAME) {
            return Err(format!("account is not a {} account", Self::NAME));
        }
        Self::deserialize(&mut &data[DISCRIMINATOR_LEN..])
            .map_err(|e| format!("invalid {} layout: {}", Self::NAME, e))
    }

    fn to_account_data(&self) -> Result<Vec<u8>, String> {
        let mut data = account_discriminator(Self::NAME).to_vec();
        self.serialize(&mut data)
            .map_err(|e| format!("borsh serialize {}: {}", Self::NAME, e))?;
        Ok(data)
    }
}

/// Global program configuration. Also the argument of the `configure` instruction.
#[derive(BorshSerialize, BorshDeserialize, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    pub authority: [u8; 32],
    pub pending_authority: [u8; 32],
    pub team_wallet: [u8; 32],
    pub platform_buy_fee: u64,
    pub platform_sell_fee: u64,
    pub lp_buy_fee: u64,
    pub lp_sell_fee: u64,
    pub token_supply_config: u64,
    pub token_decimals_config: u8,
    pub initial_real_token_reserves_config: u64,
    pub min_sol_liquidity: u64,
    pub initialized: bool,
}

impl ProgramAccount for MarketConfig {
    const NAME: &'static str = "Config";
}

impl MarketConfig {
    pub fn team_wallet(&self) -> Pubkey {
        Pubkey::new_from_array(self.team_wallet)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, PartialEq, Eq)]
pub struct LpInfo {
    pub user: [u8; 32],
    pub sol_amount: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, PartialEq, Eq)]
pub struct Market {
    pub yes_token_mint: [u8; 32],
    pub no_token_mint: [u8; 32],
    pub creator: [u8; 32],

    pub initial_yes_token_reserves: u64,
    pub real_yes_token_reserves: u64,
    pub real_yes_sol_reserves: u64,
    pub token_yes_total_supply: u64,

    pub initial_no_token_reserves: u64,
    pub real_no_token_reserves: u64,
    pub real_no_sol_reserves: u64,
    pub token_no_total_supply: u64,

    pub is_completed: bool,
    pub start_slot: Option<u64>,
    pub ending_slot: Option<u64>,

    pub lps: Vec<LpInfo>,
    pub total_lp_amount: u64,
}

impl ProgramAccount for Market {
    const NAME: &'static str = "Market";
}

#[derive(BorshSerialize, BorshDeserialize, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub user: [u8; 32],
    pub yes_balance: u64,
    pub no_balance: u64,
    pub is_lp: bool,
    pub is_initialized: bool,
}

impl ProgramAccount for UserInfo {
    const NAME: &'static str = "UserInfo";
}

// Debug prints keys in base58 rather than as byte arrays.

struct Key<'a>(&'a [u8; 32]);

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Pubkey::new_from_array(*self.0))
    }
}

impl fmt::Debug for MarketConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("authority", &Key(&self.authority))
            .field("pending_authority", &Key(&self.pending_authority))
            .field("team_wallet", &Key(&self.team_wallet))
            .field("platform_buy_fee", &self.platform_buy_fee)
            .field("platform_sell_fee", &self.platform_sell_fee)
            .field("lp_buy_fee", &self.lp_buy_fee)
            .field("lp_sell_fee", &self.lp_sell_fee)
            .field("token_supply_config", &self.token_supply_config)
            .field("token_decimals_config", &self.token_decimals_config)
            .field(
                "initial_real_token_reserves_config",
                &self.initial_real_token_reserves_config,
            )
            .field("min_sol_liquidity", &self.min_sol_liquidity)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl fmt::Debug for LpInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LpInfo")
            .field("user", &Key(&self.user))
            .field("sol_amount", &self.sol_amount)
            .finish()
    }
}

impl fmt::Debug for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Market")
            .field("yes_token_mint", &Key(&self.yes_token_mint))
            .field("no_token_mint", &Key(&self.no_token_mint))
            .field("creator", &Key(&self.creator))
            .field("initial_yes_token_reserves", &self.initial_yes_token_reserves)
            .field("real_yes_token_reserves", &self.real_yes_token_reserves)
            .field("real_yes_sol_reserves", &self.real_yes_sol_reserves)
            .field("token_yes_total_supply", &self.token_yes_total_supply)
            .field("initial_no_token_reserves", &self.initial_no_token_reserves)
            .field("real_no_token_reserves", &self.real_no_token_reserves)
            .field("real_no_sol_reserves", &self.real_no_sol_reserves)
            .field("token_no_total_supply", &self.token_no_total_supply)
            .field("is_completed", &self.is_completed)
            .field("start_slot", &self.start_slot)
            .field("ending_slot", &self.ending_slot)
            .field("lps", &self.lps)
            .field("total_lp_amount", &self.total_lp_amount)
            .finish()
    }
}

impl fmt::Debug for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInfo")
            .field("user", &Key(&self.user))
            .field("yes_balance", &self.yes_balance)
            .field("no_balance", &self.no_balance)
            .field("is_lp", &self.is_lp)
            .field("is_initialized", &self.is_initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_market() -> Market {
        Market {
            yes_token_mint: Pubkey::new_unique().to_bytes(),
            no_token_mint: Pubkey::new_unique().to_bytes(),
            creator: Pubkey::new_unique().to_bytes(),
            initial_yes_token_reserves: 1_000,
            real_yes_token_reserves: 900,
            real_yes_sol_reserves: 50,
            token_yes_total_supply: 1_000,
            initial_no_token_reserves: 1_000,
            real_no_token_reserves: 950,
            real_no_sol_reserves: 25,
            token_no_total_supply: 1_000,
            is_completed: false,
            start_slot: Some(10),
            ending_slot: None,
            lps: vec![LpInfo {
                user: Pubkey::new_unique().to_bytes(),
                sol_amount: 2_000_000_000,
            }],
            total_lp_amount: 2_000_000_000,
        }
    }

    #[test]
    fn test_account_discriminators() {
        assert_eq!(
            account_discriminator("Config"),
            [155, 12, 170, 224, 30, 250, 204, 130]
        );
        assert_eq!(
            account_discriminator("Market"),
            [219, 190, 213, 55, 0, 227, 198, 154]
        );
        assert_eq!(
            account_discriminator("UserInfo"),
            [83, 134, 200, 56, 144, 56, 10, 62]
        );
    }

    #[test]
    fn test_market_decodes_with_trailing_padding() {
        let market = sample_market();
        let mut data = market.to_account_data().unwrap();
        data.extend_from_slice(&[0u8; 64]);

        assert_eq!(Market::from_account_data(&data).unwrap(), market);
    }

    #[test]
    fn test_wrong_discriminator_rejected() {
        let info = UserInfo {
            user: [7u8; 32],
            yes_balance: 1,
            no_balance: 2,
            is_lp: true,
            is_initialized: true,
        };
        let data = info.to_account_data().unwrap();

        let err = Market::from_account_data(&data).unwrap_err();
        assert!(err.contains("not a Market"));
        assert_eq!(UserInfo::from_account_data(&data).unwrap(), info);
    }

    #[test]
    fn test_short_data_rejected() {
        assert!(MarketConfig::from_account_data(&[1, 2, 3]).is_err());

        // Discriminator alone, no body
        let data = account_discriminator("Config").to_vec();
        assert!(MarketConfig::from_account_data(&data).is_err());
    }

    #[test]
    fn test_debug_prints_base58_keys() {
        let market = sample_market();
        let rendered = format!("{:?}", market);
        let yes = Pubkey::new_from_array(market.yes_token_mint).to_string();
        assert!(rendered.contains(&yes));
    }
}
