//! Deploying through a JSON-RPC node.

use crate::opts::WalletChoice;
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Bytes};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use eyre::{Result, WrapErr};
use parx_deploy::{DeployReceipt, Deployer, encode_deploy_data};
use url::Url;

/// A [`Deployer`] sending contract creation transactions to a node.
///
/// Gas, fees and nonces are filled in from the node.
pub struct RpcDeployer {
    provider: DynProvider,
    sender: Address,
}

impl RpcDeployer {
    pub fn new(url: Url, wallet: WalletChoice) -> Self {
        match wallet {
            WalletChoice::Local(signer) => {
                let sender = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                Self { provider, sender }
            }
            WalletChoice::Unlocked(sender) => {
                let provider = ProviderBuilder::new().connect_http(url).erased();
                Self { provider, sender }
            }
        }
    }

    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Returns the chain id reported by the node.
    pub async fn chain_id(&self) -> Result<u64> {
        self.provider.get_chain_id().await.wrap_err("failed to fetch the chain id")
    }
}

#[async_trait::async_trait]
impl Deployer for RpcDeployer {
    async fn deploy(
        &self,
        bytecode: &Bytes,
        abi: &JsonAbi,
        args: &[DynSolValue],
    ) -> Result<DeployReceipt> {
        let data = encode_deploy_data(bytecode, abi, args)?;
        let tx = TransactionRequest::default().with_from(self.sender).with_deploy_code(data);

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "sent creation transaction");

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            eyre::bail!("transaction {tx_hash} reverted");
        }
        let address = receipt
            .contract_address
            .ok_or_else(|| eyre::eyre!("receipt of {tx_hash} has no contract address"))?;
        Ok(DeployReceipt { address, tx_hash })
    }
}
