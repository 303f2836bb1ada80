//! Command-line interface

pub mod args;

pub use args::{split_subcommand, Cli};
