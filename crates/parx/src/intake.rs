//! Turning the configured contract list into a [`Batch`].

use eyre::{Result, WrapErr};
use parx_config::Config;
use parx_deploy::{Batch, ContractArtifact, ContractEntry};

/// Loads every configured artifact and parses its constructor arguments.
pub fn load_batch(config: &Config) -> Result<Batch> {
    if config.contracts.is_empty() {
        eyre::bail!("no contracts configured, add `[[contracts]]` entries to {}", Config::FILE_NAME);
    }

    let mut batch = Batch::new();
    for contract in &config.contracts {
        let path = config.resolve(&contract.artifact);
        let mut artifact = ContractArtifact::load(&path)?;
        if let Some(name) = &contract.name {
            artifact.name.clone_from(name);
        }
        let name = artifact.name.clone();
        let entry = ContractEntry::new(artifact)
            .with_raw_args(&contract.args)
            .wrap_err_with(|| format!("invalid constructor arguments for {name}"))?;
        batch.push(entry)?;
    }
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parx_config::ContractConfig;
    use parx_deploy::ArgValue;
    use std::path::Path;

    fn write_artifact(root: &Path, name: &str, params: &str) {
        let dir = root.join(format!("out/{name}.sol"));
        std::fs::create_dir_all(&dir).unwrap();
        let abi = format!(
            r#"[{{"type":"constructor","inputs":[{params}],"stateMutability":"nonpayable"}}]"#
        );
        let json = format!(r#"{{"abi":{abi},"bytecode":{{"object":"0x6080"}}}}"#);
        std::fs::write(dir.join(format!("{name}.json")), json).unwrap();
    }

    fn contract(name: &str, args: &[&str]) -> ContractConfig {
        ContractConfig {
            artifact: format!("out/{name}.sol/{name}.json").into(),
            name: None,
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    #[test]
    fn loads_configured_contracts() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Token", r#"{"name":"supply","type":"uint256"}"#);
        write_artifact(dir.path(), "Vault", r#"{"name":"token","type":"address"}"#);

        let config = Config {
            root: dir.path().to_path_buf(),
            contracts: vec![contract("Vault", &["{{Token}}"]), contract("Token", &["1000"])],
            ..Default::default()
        };
        let batch = load_batch(&config).unwrap();
        assert_eq!(batch.len(), 2);
        let vault = batch.by_name("Vault").unwrap();
        assert_eq!(vault.constructor_args(), [ArgValue::placeholder("Token")]);
        assert_eq!(batch.plan().unwrap().names().collect::<Vec<_>>(), ["Token", "Vault"]);
    }

    #[test]
    fn renames_and_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Token", r#"{"name":"supply","type":"uint256"}"#);

        let mut second = contract("Token", &["2"]);
        second.name = Some("OtherToken".into());
        let mut config = Config {
            root: dir.path().to_path_buf(),
            contracts: vec![contract("Token", &["1"]), second],
            ..Default::default()
        };
        let batch = load_batch(&config).unwrap();
        assert!(batch.by_name("OtherToken").is_some());

        config.contracts[1].name = None;
        let err = load_batch(&config).unwrap_err();
        assert!(err.to_string().contains("used more than once"), "{err}");
    }

    #[test]
    fn reports_bad_arguments() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "Token", r#"{"name":"supply","type":"uint256"}"#);

        let config = Config {
            root: dir.path().to_path_buf(),
            contracts: vec![contract("Token", &["lots"])],
            ..Default::default()
        };
        let err = load_batch(&config).unwrap_err();
        assert_eq!(err.to_string(), "invalid constructor arguments for Token");

        assert!(load_batch(&Config::default()).is_err());
    }
}
