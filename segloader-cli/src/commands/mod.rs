//! CLI subcommands.

pub mod batch;
pub mod common;
pub mod get;
