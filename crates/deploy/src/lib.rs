//! # parx-deploy
//!
//! Dependency-aware deployment of compiled contracts.
//!
//! Contracts are collected into a [`Batch`]. Constructor arguments may reference the address of
//! another contract of the batch with a `{{Name}}` placeholder. [`Batch::plan`] orders the batch
//! so that every contract comes after the contracts it references, and a [`DeploymentSession`]
//! deploys the plan one contract at a time through a [`Deployer`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod artifact;
pub mod error;
pub mod placeholder;
pub mod value;

mod batch;
mod deployer;
mod entry;
mod resolver;
mod session;

pub use artifact::{ArtifactError, ContractArtifact, Framework};
pub use batch::{Batch, BatchError};
pub use deployer::{DeployReceipt, Deployer, encode_deploy_data};
pub use entry::{ContractEntry, EntryId};
pub use resolver::{CycleError, DeploymentPlan, resolve_dependency_order};
pub use session::{
    DeploymentSession, EntryOutcome, EntryStatus, LogEntry, LogKind, SessionReport, SessionState,
    StepError,
};
pub use value::{ArgError, ArgValue, TypedValue};
