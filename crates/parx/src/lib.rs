//! # parx
//!
//! Command line interface deploying interdependent contracts in dependency order.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
extern crate tracing;

pub mod args;
pub mod cmd;
pub mod handler;
pub mod intake;
pub mod opts;
pub mod provider;
pub mod state;
pub mod utils;
