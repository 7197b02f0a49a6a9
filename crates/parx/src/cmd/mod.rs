//! Subcommands.

pub mod deploy;
pub mod inspect;
pub mod plan;
