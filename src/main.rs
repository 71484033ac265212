use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use git_testament::{git_testament, render_testament};
use tracing::debug;

use runcmd::config::Config;
use runcmd::generate::command::{generate, GenerateArgs};
use runcmd::list::command::{list, ListArgs};
use runcmd::pair::command::{pair, PairArgs};
use runcmd::platform::dx::DxToolkit;

git_testament!(TESTAMENT);

#[derive(Parser)]
#[command(name = "runcmd", propagate_version = true)]
#[command(about = "Generates DNAnexus job submission scripts for a sequencing run.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// All available information, including debug information, is printed
    /// to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// The runcmd configuration file.
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        env = "RUNCMD_CONFIG",
        default_value = "runcmd.toml"
    )]
    config: PathBuf,

    /// The dx executable to run.
    #[arg(long, global = true, value_name = "PATH", default_value = "dx")]
    dx: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Generates the job submission script for an analysis stage.
    Generate(GenerateArgs),

    /// Pairs the R1 and R2 FASTQ files of a project.
    Pair(PairArgs),

    /// Lists various configured items.
    List(ListArgs),
}

fn main() -> anyhow::Result<()> {
    let version = render_testament!(TESTAMENT);
    let matches = Cli::command().version(version).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let level = if cli.quiet {
        tracing::Level::ERROR
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let dx = DxToolkit::new(cli.dx);
    debug!("Using dx executable: {}", dx.program().display());

    match cli.command {
        Command::Generate(args) => {
            let config = load_config(&cli.config)?;
            generate(args, &config, &dx)
        }
        Command::Pair(args) => pair(&dx, args),
        Command::List(args) => {
            let config = load_config(&cli.config)?;
            list(args, &config)
        }
    }
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    Config::load(path).with_context(|| "loading runcmd configuration")
}
