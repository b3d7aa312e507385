//! Command dispatcher
//!
//! Flags are validated into a [`Request`] before the context is resolved, so a
//! missing or malformed flag never loads a keypair or opens a connection.
//! Each request then runs one pipeline:
//! derive addresses → build instructions → sign and submit → read back.

use crate::context::{ClusterContext, DEFAULT_CLUSTER, DEFAULT_KEYPAIR_PATH};
use crate::error::{CliError, CliResult};
use crate::executor::{self, ChainClient};
use crate::pda;
use crate::settings::{Settings, DEFAULT_SETTINGS_PATH};
use crate::state::{Market, MarketConfig, UserInfo};
use crate::tx_builder::{self, CreateMarketParams, ResolutionParams, SwapDirection, TokenType};
use clap::{Args, Parser, Subcommand};
use solana_sdk::{pubkey::Pubkey, signature::Signature, signer::Signer};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "market-cli")]
#[command(about = "Client for the prediction-market program", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Solana cluster name: devnet, testnet, mainnet-beta, localnet
    #[arg(short = 'e', long = "env", global = true, default_value = DEFAULT_CLUSTER)]
    pub env: String,

    /// RPC URL, overrides the cluster's public endpoint
    #[arg(short, long, global = true)]
    pub rpc: Option<String>,

    /// Wallet keypair path
    #[arg(short, long, global = true, default_value = DEFAULT_KEYPAIR_PATH)]
    pub keypair: String,

    /// Settings file (falls back to $MARKET_CLI_CONFIG, then ./market-cli.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub settings: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize or update the program's global config
    Config,

    /// Mint a yes/no token pair and create its market
    Market,

    /// Buy or sell outcome tokens
    Swap(SwapArgs),

    /// Resolve the signer's position in a market
    Resolution(ResolutionArgs),

    /// Add SOL liquidity to a market
    Addlp(LiquidityArgs),

    /// Withdraw SOL liquidity from a market
    Withdraw(LiquidityArgs),

    /// Nominate a new config authority
    Nominate(NominateArgs),

    /// Accept a pending authority nomination
    Accept,

    /// Write a default settings file
    InitSettings {
        #[arg(default_value = DEFAULT_SETTINGS_PATH)]
        path: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct MarketTokens {
    /// Yes token mint address
    #[arg(short = 'y', long = "yesToken", visible_alias = "yes-token")]
    pub yes_token: Option<String>,

    /// No token mint address
    #[arg(short = 'n', long = "noToken", visible_alias = "no-token")]
    pub no_token: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct SwapArgs {
    #[command(flatten)]
    pub tokens: MarketTokens,

    /// Swap amount in base units
    #[arg(short, long)]
    pub amount: Option<String>,

    /// 0: buy token, 1: sell token
    #[arg(short, long)]
    pub style: Option<String>,

    /// 0: no token, 1: yes token
    #[arg(short = 't', long = "tokenType", visible_alias = "token-type")]
    pub token_type: Option<String>,

    /// Minimum amount to receive
    #[arg(long = "min-receive", default_value_t = 0)]
    pub min_receive: u64,
}

#[derive(Args, Debug, Default)]
pub struct ResolutionArgs {
    #[command(flatten)]
    pub tokens: MarketTokens,

    #[arg(long = "yes-amount", default_value_t = 0)]
    pub yes_amount: u64,

    #[arg(long = "no-amount", default_value_t = 0)]
    pub no_amount: u64,

    /// Winning token: 0: no, 1: yes
    #[arg(long, default_value_t = 1)]
    pub winner: u8,

    /// Mark the market completed
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub completed: bool,
}

#[derive(Args, Debug, Default)]
pub struct LiquidityArgs {
    #[command(flatten)]
    pub tokens: MarketTokens,

    /// Amount in lamports
    #[arg(short, long)]
    pub amount: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct NominateArgs {
    #[arg(long = "new-authority")]
    pub new_authority: Option<String>,
}

/// A validated command, ready to run against a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Config,
    Market,
    Swap {
        yes_token: Pubkey,
        no_token: Pubkey,
        amount: u64,
        direction: SwapDirection,
        token_type: TokenType,
        min_receive: u64,
    },
    Resolution {
        yes_token: Pubkey,
        no_token: Pubkey,
        params: ResolutionParams,
    },
    AddLiquidity {
        yes_token: Pubkey,
        no_token: Pubkey,
        amount: u64,
    },
    WithdrawLiquidity {
        yes_token: Pubkey,
        no_token: Pubkey,
        amount: u64,
    },
    Nominate {
        new_authority: Pubkey,
    },
    Accept,
}

fn required<'a>(value: &'a Option<String>, message: &str) -> CliResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| CliError::Validation(message.to_string()))
}

fn parse_pubkey(value: &Option<String>, message: &str) -> CliResult<Pubkey> {
    let raw = required(value, message)?;
    Pubkey::from_str(raw).map_err(|e| CliError::Validation(format!("{}: {} ({})", message, raw, e)))
}

fn parse_amount(value: &Option<String>, message: &str) -> CliResult<u64> {
    let raw = required(value, message)?;
    raw.parse::<u64>()
        .map_err(|e| CliError::Validation(format!("{}: {} ({})", message, raw, e)))
}

fn parse_flag<T: TryFrom<u8, Error = String>>(value: &Option<String>, message: &str) -> CliResult<T> {
    let raw = required(value, message)?;
    let byte = raw
        .parse::<u8>()
        .map_err(|e| CliError::Validation(format!("{}: {} ({})", message, raw, e)))?;
    T::try_from(byte).map_err(|e| CliError::Validation(format!("{}: {}", message, e)))
}

impl MarketTokens {
    fn parse(&self) -> CliResult<(Pubkey, Pubkey)> {
        let yes_token = parse_pubkey(&self.yes_token, "Error yesToken address")?;
        let no_token = parse_pubkey(&self.no_token, "Error noToken address")?;
        Ok((yes_token, no_token))
    }
}

impl Command {
    /// Check flag presence and values. Returns `None` for commands that run
    /// without a cluster.
    pub fn validate(&self) -> CliResult<Option<Request>> {
        let request = match self {
            Command::Config => Request::Config,
            Command::Market => Request::Market,
            Command::Swap(args) => {
                let (yes_token, no_token) = args.tokens.parse()?;
                Request::Swap {
                    yes_token,
                    no_token,
                    amount: parse_amount(&args.amount, "Error swap amount")?,
                    direction: parse_flag(&args.style, "Error swap style")?,
                    token_type: parse_flag(&args.token_type, "Error token style")?,
                    min_receive: args.min_receive,
                }
            }
            Command::Resolution(args) => {
                let (yes_token, no_token) = args.tokens.parse()?;
                let winner = TokenType::try_from(args.winner).map_err(CliError::Validation)?;
                Request::Resolution {
                    yes_token,
                    no_token,
                    params: ResolutionParams {
                        yes_amount: args.yes_amount,
                        no_amount: args.no_amount,
                        token_type: winner as u8,
                        is_completed: args.completed,
                    },
                }
            }
            Command::Addlp(args) => {
                let (yes_token, no_token) = args.tokens.parse()?;
                Request::AddLiquidity {
                    yes_token,
                    no_token,
                    amount: parse_amount(&args.amount, "Error swap amount")?,
                }
            }
            Command::Withdraw(args) => {
                let (yes_token, no_token) = args.tokens.parse()?;
                Request::WithdrawLiquidity {
                    yes_token,
                    no_token,
                    amount: parse_amount(&args.amount, "Error swap amount")?,
                }
            }
            Command::Nominate(args) => Request::Nominate {
                new_authority: parse_pubkey(&args.new_authority, "Error new authority address")?,
            },
            Command::Accept => Request::Accept,
            Command::InitSettings { .. } => return Ok(None),
        };
        Ok(Some(request))
    }
}

/// Account state fetched after (or, for resolution, before) submission
#[derive(Debug)]
pub enum ReadBack {
    Config(Pubkey, MarketConfig),
    Market(Pubkey, Market),
    UserInfo(Pubkey, UserInfo),
}

impl ReadBack {
    pub fn address(&self) -> &Pubkey {
        match self {
            ReadBack::Config(address, _)
            | ReadBack::Market(address, _)
            | ReadBack::UserInfo(address, _) => address,
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub signature: Signature,
    /// Addresses worth showing the user, e.g. freshly created mints
    pub addresses: Vec<(&'static str, Pubkey)>,
    pub accounts: Vec<ReadBack>,
}

impl Outcome {
    fn new(signature: Signature) -> Self {
        Self {
            signature,
            addresses: Vec::new(),
            accounts: Vec::new(),
        }
    }

    pub fn print(&self) {
        println!("Signature: {}", self.signature);
        for (label, address) in &self.addresses {
            println!("{}: {}", label, address);
        }
        for account in &self.accounts {
            match account {
                ReadBack::Config(address, config) => println!("config {}: {:#?}", address, config),
                ReadBack::Market(address, market) => println!("market {}: {:#?}", address, market),
                ReadBack::UserInfo(address, info) => println!("userInfo {}: {:#?}", address, info),
            }
        }
    }
}

/// Run one validated request against a chain
pub async fn dispatch<C: ChainClient>(
    chain: &C,
    ctx: &ClusterContext,
    request: &Request,
) -> CliResult<Outcome> {
    match request {
        Request::Config => configure(chain, ctx).await,
        Request::Market => create_market(chain, ctx).await,
        Request::Swap {
            yes_token,
            no_token,
            amount,
            direction,
            token_type,
            min_receive,
        } => {
            let team_wallet = fetch_team_wallet(chain, ctx).await?;
            let pending = tx_builder::swap(
                &ctx.program_id,
                &ctx.payer_pubkey(),
                &team_wallet,
                yes_token,
                no_token,
                *amount,
                *direction,
                *token_type,
                *min_receive,
            );
            let mut outcome = Outcome::new(executor::execute(chain, ctx, pending).await?);
            outcome
                .accounts
                .push(read_market(chain, ctx, yes_token, no_token).await?);
            Ok(outcome)
        }
        Request::Resolution {
            yes_token,
            no_token,
            params,
        } => {
            let address = pda::market_address(&ctx.program_id, yes_token, no_token);
            log::info!("market: {}", address);
            let market: Market = executor::load_account(chain, &address)
                .await
                .map_err(|e| CliError::Config(format!("market not found: {:#}", e)))?;
            let before = ReadBack::Market(address, market);
            let payer = ctx.payer_pubkey();
            let pending =
                tx_builder::resolution(&ctx.program_id, &payer, &payer, yes_token, no_token, params);

            let mut outcome = Outcome::new(executor::execute(chain, ctx, pending).await?);
            outcome.accounts.push(before);
            Ok(outcome)
        }
        Request::AddLiquidity {
            yes_token,
            no_token,
            amount,
        } => {
            let team_wallet = fetch_team_wallet(chain, ctx).await?;
            let pending = tx_builder::add_liquidity(
                &ctx.program_id,
                &ctx.payer_pubkey(),
                &team_wallet,
                yes_token,
                no_token,
                *amount,
            );
            liquidity_outcome(chain, ctx, pending, yes_token, no_token).await
        }
        Request::WithdrawLiquidity {
            yes_token,
            no_token,
            amount,
        } => {
            let team_wallet = fetch_team_wallet(chain, ctx).await?;
            let pending = tx_builder::withdraw_liquidity(
                &ctx.program_id,
                &ctx.payer_pubkey(),
                &team_wallet,
                yes_token,
                no_token,
                *amount,
            );
            liquidity_outcome(chain, ctx, pending, yes_token, no_token).await
        }
        Request::Nominate { new_authority } => {
            let pending =
                tx_builder::nominate_authority(&ctx.program_id, &ctx.payer_pubkey(), new_authority);
            config_outcome(chain, ctx, pending).await
        }
        Request::Accept => {
            let pending = tx_builder::accept_authority(&ctx.program_id, &ctx.payer_pubkey());
            config_outcome(chain, ctx, pending).await
        }
    }
}

async fn configure<C: ChainClient>(chain: &C, ctx: &ClusterContext) -> CliResult<Outcome> {
    let payer = ctx.payer_pubkey();
    let values = &ctx.settings.market_config;
    let team_wallet = values
        .team_wallet()
        .map_err(|e| CliError::Config(format!("{:#}", e)))?
        .unwrap_or(payer);

    let new_config = MarketConfig {
        authority: payer.to_bytes(),
        pending_authority: Pubkey::default().to_bytes(),
        team_wallet: team_wallet.to_bytes(),
        platform_buy_fee: values.platform_buy_fee,
        platform_sell_fee: values.platform_sell_fee,
        lp_buy_fee: values.lp_buy_fee,
        lp_sell_fee: values.lp_sell_fee,
        token_supply_config: values.token_supply,
        token_decimals_config: values.token_decimals,
        initial_real_token_reserves_config: values.initial_real_token_reserves,
        min_sol_liquidity: values.min_sol_liquidity,
        initialized: true,
    };

    let pending = tx_builder::configure(&ctx.program_id, &payer, &new_config);
    config_outcome(chain, ctx, pending).await
}

async fn create_market<C: ChainClient>(chain: &C, ctx: &ClusterContext) -> CliResult<Outcome> {
    let team_wallet = fetch_team_wallet(chain, ctx).await?;
    let creator = ctx.payer_pubkey();
    let market = &ctx.settings.market;

    let mint = tx_builder::mint_no_token(&ctx.program_id, &creator, &market.no_symbol, &market.no_uri);
    let no_token = mint.signers[0].pubkey();

    let params = CreateMarketParams {
        yes_symbol: market.yes_symbol.clone(),
        yes_uri: market.yes_uri.clone(),
        start_slot: market.start_slot,
        ending_slot: market.ending_slot,
    };
    let create = tx_builder::create_market(&ctx.program_id, &creator, &team_wallet, &no_token, &params);
    let yes_token = create.signers[0].pubkey();

    let pending = mint.merge(create);
    let market_address = pda::market_address(&ctx.program_id, &yes_token, &no_token);

    let mut outcome = Outcome::new(executor::execute(chain, ctx, pending).await?);
    log::info!("no_token: {}", no_token);
    log::info!("yes_token: {}", yes_token);
    log::info!("market: {}", market_address);
    outcome.addresses = vec![
        ("no_token", no_token),
        ("yes_token", yes_token),
        ("market", market_address),
    ];
    outcome
        .accounts
        .push(read_market(chain, ctx, &yes_token, &no_token).await?);
    Ok(outcome)
}

async fn config_outcome<C: ChainClient>(
    chain: &C,
    ctx: &ClusterContext,
    pending: tx_builder::PendingTransaction,
) -> CliResult<Outcome> {
    let mut outcome = Outcome::new(executor::execute(chain, ctx, pending).await?);

    let address = pda::config_address(&ctx.program_id);
    let config: MarketConfig = executor::fetch_account(chain, &address).await?;
    outcome.accounts.push(ReadBack::Config(address, config));
    Ok(outcome)
}

/// Submit, then read back the market followed by the signer's user info
async fn liquidity_outcome<C: ChainClient>(
    chain: &C,
    ctx: &ClusterContext,
    pending: tx_builder::PendingTransaction,
    yes_token: &Pubkey,
    no_token: &Pubkey,
) -> CliResult<Outcome> {
    let mut outcome = Outcome::new(executor::execute(chain, ctx, pending).await?);

    let market = read_market(chain, ctx, yes_token, no_token).await?;
    let user_info_address =
        pda::user_info_address(&ctx.program_id, &ctx.payer_pubkey(), market.address());
    log::info!("userInfo: {}", user_info_address);
    let user_info: UserInfo = executor::fetch_account(chain, &user_info_address).await?;

    outcome.accounts.push(market);
    outcome
        .accounts
        .push(ReadBack::UserInfo(user_info_address, user_info));
    Ok(outcome)
}

async fn read_market<C: ChainClient>(
    chain: &C,
    ctx: &ClusterContext,
    yes_token: &Pubkey,
    no_token: &Pubkey,
) -> CliResult<ReadBack> {
    let address = pda::market_address(&ctx.program_id, yes_token, no_token);
    log::info!("market: {}", address);
    let market: Market = executor::fetch_account(chain, &address).await?;
    Ok(ReadBack::Market(address, market))
}

/// Team wallet recorded in the config account. Instructions that pay fees need it.
async fn fetch_team_wallet<C: ChainClient>(chain: &C, ctx: &ClusterContext) -> CliResult<Pubkey> {
    let address = pda::config_address(&ctx.program_id);
    let config: MarketConfig = executor::load_account(chain, &address)
        .await
        .map_err(|e| {
            CliError::Config(format!("program not configured, run `config` first: {:#}", e))
        })?;
    Ok(config.team_wallet())
}

/// Full invocation: validate, resolve context, dispatch.
pub async fn run(cli: Cli) -> CliResult<Option<Outcome>> {
    let request = match cli.command.validate()? {
        Some(request) => request,
        None => {
            if let Command::InitSettings { path } = &cli.command {
                Settings::write_default(path).map_err(|e| CliError::Config(format!("{:#}", e)))?;
            }
            return Ok(None);
        }
    };

    let settings = Settings::load(cli.settings.as_deref())
        .map_err(|e| CliError::Config(format!("{:#}", e)))?;
    let ctx = ClusterContext::resolve(&cli.env, cli.rpc.as_deref(), &cli.keypair, settings)?;
    let chain = executor::RpcChain::new(&ctx);

    dispatch(&chain, &ctx, &request).await.map(Some)
}
