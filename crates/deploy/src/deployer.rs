use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, TxHash};
use serde::{Deserialize, Serialize};

/// The outcome of a successful contract creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReceipt {
    pub address: Address,
    pub tx_hash: TxHash,
}

/// Something that can put a contract on chain.
///
/// Any error returned is treated as a failed deployment step, its message is surfaced verbatim.
#[async_trait::async_trait]
pub trait Deployer: Send + Sync {
    async fn deploy(
        &self,
        bytecode: &Bytes,
        abi: &JsonAbi,
        args: &[DynSolValue],
    ) -> eyre::Result<DeployReceipt>;
}

/// Returns the creation payload: `bytecode` followed by the ABI-encoded constructor arguments.
pub fn encode_deploy_data(
    bytecode: &Bytes,
    abi: &JsonAbi,
    args: &[DynSolValue],
) -> eyre::Result<Bytes> {
    match (abi.constructor(), args.is_empty()) {
        (None, false) => eyre::bail!("constructor arguments given but the ABI has no constructor"),
        (None, true) => Ok(bytecode.clone()),
        (Some(constructor), _) => {
            let input = constructor.abi_encode_input(args)?;
            Ok(bytecode.iter().copied().chain(input).collect())
        }
    }
}
