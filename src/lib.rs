//! `runcmd` is a command line tool that writes the shell scripts used to
//! submit a sequencing run's analysis jobs to DNAnexus. This package is
//! composed of both a library crate, as well as a binary crate.
//!
//! The library finds a run's files on the platform, pairs related files
//! (BAMs with their indexes, R1 FASTQs with their R2 mates), derives run
//! metadata from sample names and run manifests, and turns the result into
//! `dx run` commands for each analysis stage.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod config;
pub mod generate;
pub mod list;
pub mod pair;
pub mod platform;
pub mod resolve;
pub mod sample;
pub mod script;
pub mod utils;
