//! Functionality relating to the `runcmd generate coverage` subcommand.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::config::Config;
use crate::generate::{output_path, project_by_id, StageSummary};
use crate::pair::{find_pairs, BAM_BAI};
use crate::platform::Platform;
use crate::script::{commands, ScriptHeader, ScriptWriter};
use crate::utils::args::project_id;

/// Clap arguments for the `runcmd generate coverage` subcommand.
#[derive(Args)]
pub struct CoverageArgs {
    /// The project holding the BAM files.
    #[arg(value_name = "PROJECT_ID", value_parser = project_id)]
    pub project: String,

    /// Destination for the generated script.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Main function for the `runcmd generate coverage` subcommand.
pub fn generate<P: Platform>(
    platform: &P,
    config: &Config,
    args: CoverageArgs,
) -> anyhow::Result<StageSummary> {
    info!("Starting generate coverage subcommand.");

    let project = project_by_id(platform, &args.project);
    let script_path = output_path(args.output.as_deref(), &project, "coverage_cmds.sh");

    let pairs = find_pairs(platform, &project.id, &BAM_BAI)
        .with_context(|| format!("listing BAM files in {}", project.id))?;
    if pairs.matched.is_empty() {
        warn!("No BAM/BAI pairs found. No commands will be generated.");
    }

    let header = ScriptHeader::new("Coverage Analysis Commands", project.clone());
    let mut script = ScriptWriter::create(&script_path, &header)
        .with_context(|| format!("creating output script: {}", script_path.display()))?;

    for (bam, bai) in &pairs.matched {
        script
            .push(commands::coverage(config, bam, bai, &project.id))
            .with_context(|| format!("writing to output script: {}", script_path.display()))?;
    }
    let commands = script.finish()?;

    let mut summary = StageSummary::new("coverage", project, script_path, commands);
    summary.failures = pairs.unpaired_primary_count;
    summary.pairing = Some(pairs);
    Ok(summary)
}
