//! Functionality related to the `runcmd list` subcommand.

pub mod command;
