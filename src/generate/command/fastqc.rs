//! Functionality relating to the `runcmd generate fastqc` subcommand.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::config::Config;
use crate::generate::{output_path, project_by_id, StageSummary};
use crate::pair::{find_pairs, FASTQ_MATES};
use crate::platform::Platform;
use crate::script::{commands, ScriptHeader, ScriptWriter};
use crate::utils::args::project_id;

/// Clap arguments for the `runcmd generate fastqc` subcommand.
#[derive(Args)]
pub struct FastqcArgs {
    /// The project holding the FASTQ files.
    #[arg(value_name = "PROJECT_ID", value_parser = project_id)]
    pub project: String,

    /// Destination for the generated script.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Main function for the `runcmd generate fastqc` subcommand.
pub fn generate<P: Platform>(
    platform: &P,
    config: &Config,
    args: FastqcArgs,
) -> anyhow::Result<StageSummary> {
    info!("Starting generate fastqc subcommand.");

    let project = project_by_id(platform, &args.project);
    let script_path = output_path(args.output.as_deref(), &project, "fastqc_cmds.sh");

    let pairs = find_pairs(platform, &project.id, &FASTQ_MATES)
        .with_context(|| format!("listing FASTQ files in {}", project.id))?;
    if pairs.matched.is_empty() {
        warn!("No R1/R2 pairs found. No commands will be generated.");
    }

    let header = ScriptHeader::new("FastQC Analysis Commands", project.clone());
    let mut script = ScriptWriter::create(&script_path, &header)
        .with_context(|| format!("creating output script: {}", script_path.display()))?;

    for (r1, r2) in &pairs.matched {
        script
            .push(commands::fastqc(&config.applets.fastqc, r1, r2, &project.id))
            .with_context(|| format!("writing to output script: {}", script_path.display()))?;
    }
    let commands = script.finish()?;

    let mut summary = StageSummary::new("fastqc", project, script_path, commands);
    summary.failures = pairs.unpaired_primary_count;
    summary.pairing = Some(pairs);
    Ok(summary)
}
