//! CLI subcommands.

pub mod inspect;
pub mod migrate;
