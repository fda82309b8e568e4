//! Command-line interface definitions and handlers for the bramble CLI.

pub mod args;
pub mod filters;
pub mod inspect;

pub use args::{Cli, Commands, FilterCommands, HeaderCommands, TreeCommands};
