//! Sign, submit and read back
//!
//! Every network round trip goes through [`ChainClient`]. Calls are awaited one
//! at a time; there is no retry. Failures are passed through verbatim.

use crate::context::ClusterContext;
use crate::error::{CliError, CliResult};
use crate::state::ProgramAccount;
use crate::tx_builder::PendingTransaction;
use anyhow::{Context, Result};
use solana_client::{nonblocking::rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    message::Message,
    packet::PACKET_DATA_SIZE,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::Transaction,
};

/// The RPC surface the CLI needs
#[allow(async_fn_in_trait)]
pub trait ChainClient {
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Broadcast and wait for confirmation at the client's commitment level
    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature>;

    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>>;
}

/// JSON-RPC backed chain client
pub struct RpcChain {
    client: RpcClient,
    commitment: CommitmentConfig,
    skip_preflight: bool,
}

impl RpcChain {
    pub fn new(ctx: &ClusterContext) -> Self {
        Self {
            client: RpcClient::new_with_commitment(ctx.endpoint.clone(), ctx.commitment),
            commitment: ctx.commitment,
            skip_preflight: ctx.settings.skip_preflight,
        }
    }
}

impl ChainClient for RpcChain {
    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .context("Failed to get latest blockhash")
    }

    async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: self.skip_preflight,
            preflight_commitment: Some(self.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };

        let signature = self
            .client
            .send_and_confirm_transaction_with_spinner_and_config(
                transaction,
                self.commitment,
                config,
            )
            .await?;
        Ok(signature)
    }

    async fn account_data(&self, address: &Pubkey) -> Result<Vec<u8>> {
        self.client
            .get_account_data(address)
            .await
            .context(format!("Failed to get account {}", address))
    }
}

/// Sign `pending` with the context payer plus its own co-signers, submit, and
/// wait for confirmation.
pub async fn execute<C: ChainClient>(
    chain: &C,
    ctx: &ClusterContext,
    pending: PendingTransaction,
) -> CliResult<Signature> {
    if pending.instructions.is_empty() {
        return Err(CliError::submission("no instructions to submit"));
    }

    let payer = ctx.payer.pubkey();
    let recent_blockhash = chain
        .latest_blockhash()
        .await
        .map_err(|e| CliError::submission(format!("{:#}", e)))?;

    let transaction = sign(&pending, ctx, &payer, recent_blockhash)?;

    let size = bincode::serialize(&transaction)
        .map_err(CliError::submission)?
        .len();
    log::debug!(
        "Submitting {} instruction(s), {} signer(s), {} bytes",
        pending.instructions.len(),
        transaction.signatures.len(),
        size
    );
    if size > PACKET_DATA_SIZE {
        return Err(CliError::Submission(format!(
            "transaction is {} bytes, limit is {}",
            size, PACKET_DATA_SIZE
        )));
    }

    let signature = chain
        .send_and_confirm(&transaction)
        .await
        .map_err(|e| CliError::submission(format!("{:#}", e)))?;

    log::info!("Transaction confirmed: {}", signature);
    Ok(signature)
}

fn sign(
    pending: &PendingTransaction,
    ctx: &ClusterContext,
    payer: &Pubkey,
    recent_blockhash: Hash,
) -> CliResult<Transaction> {
    let message = Message::new(&pending.instructions, Some(payer));
    let mut transaction = Transaction::new_unsigned(message);

    let mut signers: Vec<&dyn Signer> = vec![&ctx.payer];
    signers.extend(pending.signers.iter().map(|kp| kp as &dyn Signer));

    transaction
        .try_sign(&signers, recent_blockhash)
        .map_err(CliError::submission)?;
    Ok(transaction)
}

/// Fetch and decode a program account after submission. Failures are
/// [`CliError::ReadBack`]; the transaction has already landed.
pub async fn fetch_account<C: ChainClient, T: ProgramAccount>(
    chain: &C,
    address: &Pubkey,
) -> CliResult<T> {
    load_account(chain, address)
        .await
        .map_err(|e| CliError::read_back(format!("{:#}", e)))
}

/// Fetch and decode a program account, leaving the error class to the caller
pub async fn load_account<C: ChainClient, T: ProgramAccount>(
    chain: &C,
    address: &Pubkey,
) -> Result<T> {
    let data = chain.account_data(address).await?;
    T::from_account_data(&data).map_err(|e| anyhow::anyhow!("{} at {}: {}", T::NAME, address, e))
}
