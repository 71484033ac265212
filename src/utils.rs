//! Utilities that are used across the `runcmd` subcommands.

pub mod args;
