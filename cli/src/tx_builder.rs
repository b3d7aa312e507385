//! Instruction builders for the prediction-market program
//!
//! Each builder returns the instructions for one command together with any
//! freshly generated keypairs that must co-sign. Program-side invariants (fee
//! bounds, reserve sufficiency) are not checked here; the program enforces
//! them and rejects the transaction on submission.

use crate::pda::{self, MarketAddresses};
use crate::state::MarketConfig;
use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program, sysvar,
};

pub fn instruction_discriminator(ix_name: &str) -> [u8; 8] {
    let mut h = Sha256::new();
    h.update(b"global:");
    h.update(ix_name.as_bytes());
    let out = h.finalize();
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&out[..8]);
    disc
}

fn instruction_data<T: BorshSerialize>(ix_name: &str, args: &T) -> Vec<u8> {
    let mut data = instruction_discriminator(ix_name).to_vec();
    // Writing into a Vec cannot fail
    let _ = args.serialize(&mut data);
    data
}

/// Instructions plus the extra signers they need besides the fee payer
#[derive(Debug, Default)]
pub struct PendingTransaction {
    pub instructions: Vec<Instruction>,
    pub signers: Vec<Keypair>,
}

impl PendingTransaction {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            signers: Vec::new(),
        }
    }

    /// Append another builder's output, keeping instruction order
    pub fn merge(mut self, other: PendingTransaction) -> Self {
        self.instructions.extend(other.instructions);
        self.signers.extend(other.signers);
        self
    }
}

/// Buy or sell side of a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SwapDirection {
    Buy = 0,
    Sell = 1,
}

/// Outcome token selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TokenType {
    No = 0,
    Yes = 1,
}

impl TryFrom<u8> for SwapDirection {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Buy),
            1 => Ok(Self::Sell),
            _ => Err(format!("invalid swap style {} (0: buy, 1: sell)", v)),
        }
    }
}

impl TryFrom<u8> for TokenType {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::No),
            1 => Ok(Self::Yes),
            _ => Err(format!("invalid token type {} (0: no, 1: yes)", v)),
        }
    }
}

#[derive(BorshSerialize)]
struct MintNoTokenArgs {
    no_symbol: String,
    no_uri: String,
}

#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateMarketParams {
    pub yes_symbol: String,
    pub yes_uri: String,
    pub start_slot: Option<u64>,
    pub ending_slot: Option<u64>,
}

#[derive(BorshSerialize)]
struct SwapArgs {
    amount: u64,
    direction: u8,
    token_type: u8,
    minimum_receive_amount: u64,
}

#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionParams {
    pub yes_amount: u64,
    pub no_amount: u64,
    pub token_type: u8,
    pub is_completed: bool,
}

#[derive(BorshSerialize)]
struct AmountArgs {
    amount: u64,
}

#[derive(BorshSerialize)]
struct NominateArgs {
    new_admin: [u8; 32],
}

#[derive(BorshSerialize)]
struct NoArgs {}

/// Initialize or overwrite the global config. Payer must be the current authority
/// once the config exists.
pub fn configure(program_id: &Pubkey, payer: &Pubkey, new_config: &MarketConfig) -> PendingTransaction {
    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(pda::config_address(program_id), false),
        AccountMeta::new(pda::global_vault_address(program_id), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(pda::TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::ASSOCIATED_TOKEN_PROGRAM_ID, false),
    ];

    PendingTransaction::new(vec![Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("configure", new_config),
    }])
}

/// Create the "no" outcome mint. Generates the mint keypair, which must co-sign.
pub fn mint_no_token(
    program_id: &Pubkey,
    creator: &Pubkey,
    no_symbol: &str,
    no_uri: &str,
) -> PendingTransaction {
    let no_token = Keypair::new();
    let ix = mint_no_token_instruction(program_id, creator, &no_token.pubkey(), no_symbol, no_uri);

    PendingTransaction {
        instructions: vec![ix],
        signers: vec![no_token],
    }
}

fn mint_no_token_instruction(
    program_id: &Pubkey,
    creator: &Pubkey,
    no_token: &Pubkey,
    no_symbol: &str,
    no_uri: &str,
) -> Instruction {
    let global_vault = pda::global_vault_address(program_id);

    let accounts = vec![
        AccountMeta::new(pda::config_address(program_id), false),
        AccountMeta::new(global_vault, false),
        AccountMeta::new(*creator, true),
        AccountMeta::new(*no_token, true),
        AccountMeta::new(pda::metadata_address(no_token), false),
        AccountMeta::new(pda::associated_token_address(&global_vault, no_token), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(pda::TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::TOKEN_METADATA_PROGRAM_ID, false),
    ];

    let args = MintNoTokenArgs {
        no_symbol: no_symbol.to_string(),
        no_uri: no_uri.to_string(),
    };

    Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("mint_no_token", &args),
    }
}

/// Create the "yes" mint and the market account for an existing "no" mint.
/// Generates the yes mint keypair, which must co-sign.
pub fn create_market(
    program_id: &Pubkey,
    creator: &Pubkey,
    team_wallet: &Pubkey,
    no_token: &Pubkey,
    params: &CreateMarketParams,
) -> PendingTransaction {
    let yes_token = Keypair::new();
    let yes = yes_token.pubkey();
    let addrs = MarketAddresses::derive(program_id, &yes, no_token);

    let accounts = vec![
        AccountMeta::new(addrs.config, false),
        AccountMeta::new(addrs.global_vault, false),
        AccountMeta::new(*creator, true),
        AccountMeta::new(yes, true),
        AccountMeta::new_readonly(*no_token, false),
        AccountMeta::new(addrs.market, false),
        AccountMeta::new(pda::metadata_address(&yes), false),
        AccountMeta::new(pda::metadata_address(no_token), false),
        AccountMeta::new(addrs.global_yes_ata, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
        AccountMeta::new_readonly(pda::TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::ASSOCIATED_TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::TOKEN_METADATA_PROGRAM_ID, false),
        AccountMeta::new(*team_wallet, false),
    ];

    PendingTransaction {
        instructions: vec![Instruction {
            program_id: *program_id,
            accounts,
            data: instruction_data("create_market", params),
        }],
        signers: vec![yes_token],
    }
}

#[allow(clippy::too_many_arguments)]
pub fn swap(
    program_id: &Pubkey,
    user: &Pubkey,
    team_wallet: &Pubkey,
    yes_token: &Pubkey,
    no_token: &Pubkey,
    amount: u64,
    direction: SwapDirection,
    token_type: TokenType,
    minimum_receive_amount: u64,
) -> PendingTransaction {
    let addrs = MarketAddresses::derive(program_id, yes_token, no_token);

    let accounts = vec![
        AccountMeta::new(addrs.config, false),
        AccountMeta::new(*team_wallet, false),
        AccountMeta::new(addrs.market, false),
        AccountMeta::new(addrs.global_vault, false),
        AccountMeta::new_readonly(*yes_token, false),
        AccountMeta::new_readonly(*no_token, false),
        AccountMeta::new(addrs.global_yes_ata, false),
        AccountMeta::new(addrs.global_no_ata, false),
        AccountMeta::new(pda::associated_token_address(user, yes_token), false),
        AccountMeta::new(pda::associated_token_address(user, no_token), false),
        AccountMeta::new(pda::user_info_address(program_id, user, &addrs.market), false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(pda::TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::ASSOCIATED_TOKEN_PROGRAM_ID, false),
    ];

    let args = SwapArgs {
        amount,
        direction: direction as u8,
        token_type: token_type as u8,
        minimum_receive_amount,
    };

    PendingTransaction::new(vec![Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("swap", &args),
    }])
}

/// Settle a user's position. `authority` must be the config authority.
pub fn resolution(
    program_id: &Pubkey,
    authority: &Pubkey,
    user: &Pubkey,
    yes_token: &Pubkey,
    no_token: &Pubkey,
    params: &ResolutionParams,
) -> PendingTransaction {
    let addrs = MarketAddresses::derive(program_id, yes_token, no_token);

    let accounts = vec![
        AccountMeta::new(addrs.config, false),
        AccountMeta::new(addrs.market, false),
        AccountMeta::new(addrs.global_vault, false),
        AccountMeta::new_readonly(*yes_token, false),
        AccountMeta::new_readonly(*no_token, false),
        AccountMeta::new(pda::user_info_address(program_id, user, &addrs.market), false),
        AccountMeta::new(*user, false),
        AccountMeta::new(*authority, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(pda::TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::ASSOCIATED_TOKEN_PROGRAM_ID, false),
    ];

    PendingTransaction::new(vec![Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("resolution", params),
    }])
}

/// Liquidity instructions share one account list
fn liquidity_instruction(
    ix_name: &str,
    program_id: &Pubkey,
    user: &Pubkey,
    team_wallet: &Pubkey,
    yes_token: &Pubkey,
    no_token: &Pubkey,
    amount: u64,
) -> Instruction {
    let addrs = MarketAddresses::derive(program_id, yes_token, no_token);

    let accounts = vec![
        AccountMeta::new(addrs.config, false),
        AccountMeta::new(*team_wallet, false),
        AccountMeta::new(addrs.market, false),
        AccountMeta::new(addrs.global_vault, false),
        AccountMeta::new_readonly(*yes_token, false),
        AccountMeta::new_readonly(*no_token, false),
        AccountMeta::new(pda::user_info_address(program_id, user, &addrs.market), false),
        AccountMeta::new(*user, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(pda::TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(pda::ASSOCIATED_TOKEN_PROGRAM_ID, false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data(ix_name, &AmountArgs { amount }),
    }
}

pub fn add_liquidity(
    program_id: &Pubkey,
    user: &Pubkey,
    team_wallet: &Pubkey,
    yes_token: &Pubkey,
    no_token: &Pubkey,
    amount: u64,
) -> PendingTransaction {
    PendingTransaction::new(vec![liquidity_instruction(
        "add_liquidity",
        program_id,
        user,
        team_wallet,
        yes_token,
        no_token,
        amount,
    )])
}

pub fn withdraw_liquidity(
    program_id: &Pubkey,
    user: &Pubkey,
    team_wallet: &Pubkey,
    yes_token: &Pubkey,
    no_token: &Pubkey,
    amount: u64,
) -> PendingTransaction {
    PendingTransaction::new(vec![liquidity_instruction(
        "withdraw_liquidity",
        program_id,
        user,
        team_wallet,
        yes_token,
        no_token,
        amount,
    )])
}

/// First step of the authority handover
pub fn nominate_authority(program_id: &Pubkey, admin: &Pubkey, new_admin: &Pubkey) -> PendingTransaction {
    let accounts = vec![
        AccountMeta::new(*admin, true),
        AccountMeta::new(pda::config_address(program_id), false),
    ];
    let args = NominateArgs {
        new_admin: new_admin.to_bytes(),
    };

    PendingTransaction::new(vec![Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("nominate_authority", &args),
    }])
}

/// Second step: the nominated key takes over
pub fn accept_authority(program_id: &Pubkey, new_admin: &Pubkey) -> PendingTransaction {
    let accounts = vec![
        AccountMeta::new(*new_admin, true),
        AccountMeta::new(pda::config_address(program_id), false),
    ];

    PendingTransaction::new(vec![Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("accept_authority", &NoArgs {}),
    }])
}
