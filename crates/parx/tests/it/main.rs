use snapbox::{cmd::Command, str};
use std::path::Path;

fn parx() -> Command {
    Command::new(snapbox::cmd::cargo_bin!("parx")).env("NO_COLOR", "1").env_remove("RUST_LOG")
}

fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Writes a Foundry artifact for `name` whose constructor takes `params`.
fn foundry_artifact(root: &Path, name: &str, params: &str) {
    write(
        root,
        &format!("out/{name}.sol/{name}.json"),
        &format!(
            r#"{{
  "abi": [{{ "type": "constructor", "inputs": [{params}], "stateMutability": "nonpayable" }}],
  "bytecode": {{ "object": "0x6080604052", "linkReferences": {{}} }}
}}"#
        ),
    );
}

fn project(contracts: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    foundry_artifact(root, "Token", r#"{ "name": "supply", "type": "uint256" }"#);
    foundry_artifact(root, "Oracle", "");
    foundry_artifact(
        root,
        "Vault",
        r#"{ "name": "token", "type": "address" }, { "name": "oracle", "type": "address" }"#,
    );
    write(root, "parx.toml", contents_or_default(contracts));
    dir
}

fn contents_or_default(contracts: &str) -> &str {
    if contracts.is_empty() { DEFAULT_CONTRACTS } else { contracts }
}

const DEFAULT_CONTRACTS: &str = r#"
[[contracts]]
artifact = "out/Vault.sol/Vault.json"
args = ["{{Token}}", "{{Oracle}}"]

[[contracts]]
artifact = "out/Token.sol/Token.json"
args = ["1000000"]

[[contracts]]
artifact = "out/Oracle.sol/Oracle.json"
"#;

#[test]
fn plan_orders_dependencies_first() {
    let dir = project("");
    parx().args(["plan", "--root"]).arg(dir.path()).assert().success().stdout_eq(str![[r#"
1. Token
2. Oracle
3. Vault (after Token, Oracle)

"#]]);
}

#[test]
fn plan_reports_cycles() {
    let dir = project(
        r#"
[[contracts]]
artifact = "out/Vault.sol/Vault.json"
name = "A"
args = ["{{B}}", "0x0000000000000000000000000000000000000001"]

[[contracts]]
artifact = "out/Vault.sol/Vault.json"
name = "B"
args = ["{{A}}", "0x0000000000000000000000000000000000000001"]
"#,
    );
    parx().args(["plan", "--root"]).arg(dir.path()).assert().failure().stderr_eq(str![[r#"
Error: circular dependency detected involving [..]
...
"#]]);
}

#[test]
fn plan_reports_unknown_references() {
    let dir = project(
        r#"
[[contracts]]
artifact = "out/Vault.sol/Vault.json"
args = ["{{Tokn}}", "{{Oracle}}"]

[[contracts]]
artifact = "out/Oracle.sol/Oracle.json"
"#,
    );
    parx().args(["plan", "--root"]).arg(dir.path()).assert().failure().stderr_eq(str![[r#"
Error: Vault references "Tokn", which is not part of the batch
...
"#]]);
}

#[test]
fn plan_rejects_placeholders_in_non_address_params() {
    let dir = project(
        r#"
[[contracts]]
artifact = "out/Token.sol/Token.json"
args = ["{{Oracle}}"]
"#,
    );
    parx().args(["plan", "--root"]).arg(dir.path()).assert().failure().stderr_eq(str![[r#"
Error: invalid constructor arguments for Token
...
"#]]);
}

#[test]
fn plan_requires_contracts() {
    let dir = tempfile::tempdir().unwrap();
    parx().args(["plan", "--root"]).arg(dir.path()).assert().failure().stderr_eq(str![[r#"
Error: no contracts configured, add `[[contracts]]` entries to parx.toml
...
"#]]);
}

#[test]
fn inspect_foundry_artifact() {
    let dir = project("");
    parx()
        .arg("inspect")
        .arg(dir.path().join("out/Vault.sol/Vault.json"))
        .assert()
        .success()
        .stdout_eq(str![[r#"
Name: Vault
Framework: foundry
Bytecode: 5 bytes
Constructor:
  token: address
  oracle: address

"#]]);
}

#[test]
fn inspect_hardhat_artifact() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "artifacts/contracts/Greeter.sol/Greeter.json",
        r#"{
  "_format": "hh-sol-artifact-1",
  "contractName": "Greeter",
  "abi": [],
  "bytecode": "0x6080",
  "deployedBytecode": "0x6080"
}"#,
    );
    parx()
        .arg("inspect")
        .arg(dir.path().join("artifacts/contracts/Greeter.sol/Greeter.json"))
        .assert()
        .success()
        .stdout_eq(str![[r#"
Name: Greeter
Framework: hardhat
Bytecode: 2 bytes
Constructor: none

"#]]);
}

#[test]
fn inspect_rejects_non_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "build-info/abc.json", r#"{ "id": "abc" }"#);
    parx()
        .arg("inspect")
        .arg(dir.path().join("build-info/abc.json"))
        .assert()
        .failure()
        .stderr_eq(str![[r#"
Error: abc is neither a Foundry nor a Hardhat artifact
...
"#]]);
}

#[test]
fn inspect_lists_artifacts_of_a_directory() {
    let dir = project("");
    write(dir.path(), "out/build-info/0a1b.json", r#"{ "id": "0a1b", "output": {} }"#);
    parx().arg("inspect").arg(dir.path().join("out")).assert().success().stdout_eq(str![[r#"
Oracle [foundry] constructor()
Token [foundry] constructor(uint256 supply)
Vault [foundry] constructor(address token, address oracle)

"#]]);
}

#[test]
fn inspect_requires_artifacts_in_directory() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "out/notes.txt", "not json");
    parx().arg("inspect").arg(dir.path().join("out")).assert().failure().stderr_eq(str![[r#"
Error: no deployable artifacts found in [..]
...
"#]]);
}
