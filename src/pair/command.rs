//! Functionality relating to the `runcmd pair` subcommand itself.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use num_format::{Locale, ToFormattedString};
use tracing::info;

use crate::pair::compute::PairResult;
use crate::pair::{find_pairs, FASTQ_MATES};
use crate::platform::Platform;
use crate::utils::args::project_id;

/// Clap arguments for the `runcmd pair` subcommand.
#[derive(Args)]
pub struct PairArgs {
    /// The project to list FASTQ files in.
    #[arg(value_name = "PROJECT_ID", value_parser = project_id)]
    pub project: String,

    /// Destination for the `r1_id:r2_id` pairs.
    #[arg(short, long, value_name = "PATH", default_value = "fastq_pairs.txt")]
    pub output: PathBuf,
}

/// Writes one `primary_id:secondary_id` line per pair.
pub fn write_pairs(path: &Path, result: &PairResult) -> anyhow::Result<()> {
    let mut writer = File::create(path)
        .map(BufWriter::new)
        .with_context(|| format!("creating output file: {}", path.display()))?;

    for (primary, secondary) in &result.matched {
        writeln!(writer, "{}:{}", primary, secondary)
            .with_context(|| format!("writing to output file: {}", path.display()))?;
    }

    writer.flush()?;
    Ok(())
}

/// Main function for the `runcmd pair` subcommand.
pub fn pair<P: Platform>(platform: &P, args: PairArgs) -> anyhow::Result<()> {
    info!("Starting pair subcommand.");

    let result = find_pairs(platform, &args.project, &FASTQ_MATES)
        .with_context(|| format!("listing FASTQ files in {}", args.project))?;
    write_pairs(&args.output, &result)?;

    info!(
        "Wrote {} R1/R2 pairs to {}",
        result.matched.len().to_formatted_string(&Locale::en),
        args.output.display()
    );

    let output = serde_json::to_string_pretty(&result)?;
    println!("{}", output);

    Ok(())
}
