//! Prediction Market CLI
//!
//! Builds, signs and submits transactions for the prediction-market program:
//! global config, market creation, swaps, liquidity and resolution. All
//! market math and state transitions live on-chain; this crate derives
//! addresses, encodes instructions, submits them and prints the resulting
//! account state.

pub mod commands;
pub mod context;
pub mod error;
pub mod executor;
pub mod pda;
pub mod settings;
pub mod state;
pub mod tx_builder;

pub use commands::{dispatch, Cli, Command, Outcome, ReadBack, Request};
pub use context::ClusterContext;
pub use error::{CliError, CliResult};
pub use executor::ChainClient;
