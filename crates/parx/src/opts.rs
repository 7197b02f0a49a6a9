use alloy_primitives::{Address, B256, hex::FromHex};
use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use eyre::{Result, WrapErr};
use figment::{
    Metadata, Profile, Provider,
    value::{Dict, Map},
};
use parx_config::Config;
use std::path::PathBuf;

/// Options locating the project.
#[derive(Clone, Debug, Parser)]
pub struct ProjectOpts {
    /// The project root, holding `parx.toml`.
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub root: PathBuf,
}

/// Options for reaching the node.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "RPC options")]
pub struct RpcOpts {
    /// The RPC endpoint.
    #[arg(long, short, visible_alias = "rpc-url", value_name = "URL", env = "ETH_RPC_URL")]
    pub url: Option<String>,

    /// The chain id the node must report.
    #[arg(long, value_name = "CHAIN_ID")]
    pub chain_id: Option<u64>,
}

impl Provider for RpcOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("RpcOpts")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        Ok(Map::from([(Profile::Global, self.dict())]))
    }
}

impl RpcOpts {
    pub fn dict(&self) -> Dict {
        let mut dict = Dict::new();
        if let Some(url) = &self.url {
            dict.insert("rpc_url".into(), url.clone().into());
        }
        if let Some(chain_id) = self.chain_id {
            dict.insert("chain_id".into(), chain_id.into());
        }
        dict
    }

    /// Loads the project config with these options applied.
    pub fn load_config(&self, project: &ProjectOpts) -> Result<Config> {
        Ok(Config::load_with_overrides(&project.root, self.clone())?)
    }
}

/// How transactions get signed.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Wallet options")]
pub struct WalletOpts {
    /// Sign with the provided private key.
    #[arg(long, value_name = "RAW_PRIVATE_KEY", conflicts_with = "unlocked")]
    pub private_key: Option<String>,

    /// Send through `eth_sendTransaction`, letting the node sign for an unlocked account.
    #[arg(long, requires = "from")]
    pub unlocked: bool,

    /// The sender of the transactions.
    #[arg(long, short, value_name = "ADDRESS", env = "ETH_FROM")]
    pub from: Option<Address>,
}

/// A resolved [`WalletOpts`].
#[derive(Clone, Debug)]
pub enum WalletChoice {
    Local(PrivateKeySigner),
    Unlocked(Address),
}

impl WalletOpts {
    /// Picks the signer to deploy with.
    ///
    /// Sending from an unlocked node account takes `--unlocked --from`, or a `sender` in the
    /// config. `--from` alone is not enough.
    pub fn choose(&self, config: &Config) -> Result<WalletChoice> {
        if let Some(key) = &self.private_key {
            return create_private_key_signer(key).map(WalletChoice::Local);
        }
        if self.unlocked {
            let Some(from) = self.from else { eyre::bail!("--unlocked requires --from <ADDRESS>") };
            return Ok(WalletChoice::Unlocked(from));
        }
        if let Some(sender) = config.sender {
            return Ok(WalletChoice::Unlocked(sender));
        }
        match self.from {
            Some(from) => eyre::bail!(
                "no signer given for {from}, pass --private-key or --unlocked to send from a node \
                 account"
            ),
            None => eyre::bail!("no signer given, pass --private-key or --unlocked --from <ADDRESS>"),
        }
    }
}

fn ensure_pk_not_env(pk: &str) -> Result<()> {
    if !pk.starts_with("0x") && std::env::var(pk).is_ok() {
        eyre::bail!(
            "failed to create wallet from private key: env var {pk} exists, is the `$` anchor missing?"
        );
    }
    Ok(())
}

/// Validates a raw private key.
pub fn create_private_key_signer(private_key: &str) -> Result<PrivateKeySigner> {
    let Ok(key) = B256::from_hex(private_key.trim()) else {
        ensure_pk_not_env(private_key)?;
        eyre::bail!("failed to decode private key")
    };
    PrivateKeySigner::from_bytes(&key).wrap_err("failed to create wallet from private key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Parser)]
    struct Args {
        #[command(flatten)]
        rpc: RpcOpts,
        #[command(flatten)]
        wallet: WalletOpts,
    }

    #[test]
    fn parses_private_key() {
        let key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let signer = create_private_key_signer(key).unwrap();
        assert_eq!(
            signer.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
        assert!(create_private_key_signer("0x1234").is_err());
    }

    #[test]
    fn unlocked_requires_sender() {
        assert!(Args::try_parse_from(["parx", "--unlocked"]).is_err());
        let args = Args::try_parse_from([
            "parx",
            "--unlocked",
            "--from",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "--rpc-url",
            "http://localhost:8545",
        ])
        .unwrap();
        assert!(matches!(
            args.wallet.choose(&Config::default()).unwrap(),
            WalletChoice::Unlocked(_)
        ));
        assert_eq!(args.rpc.dict().len(), 1);
    }

    #[test]
    fn private_key_conflicts_with_unlocked() {
        let res = Args::try_parse_from([
            "parx",
            "--unlocked",
            "--from",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
            "--private-key",
            "0x01",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn from_alone_does_not_pick_unlocked_sending() {
        let args = Args::try_parse_from([
            "parx",
            "--from",
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        ])
        .unwrap();
        let err = args.wallet.choose(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("--unlocked"), "{err}");
    }

    #[test]
    fn falls_back_to_configured_sender() {
        let sender = Address::with_last_byte(1);
        let config = Config { sender: Some(sender), ..Default::default() };
        let choice = WalletOpts::default().choose(&config).unwrap();
        assert!(matches!(choice, WalletChoice::Unlocked(from) if from == sender));
        assert!(WalletOpts::default().choose(&Config::default()).is_err());
    }
}
