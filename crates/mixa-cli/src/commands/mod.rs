//! CLI subcommands

pub mod ancestors;
pub mod report;
pub mod reporters;
