//! Functionality relating to the `runcmd generate picard` subcommand.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::config::Config;
use crate::generate::{output_path, project_by_id, StageSummary};
use crate::pair::compute::FileRecord;
use crate::platform::Platform;
use crate::script::{commands, ScriptHeader, ScriptWriter};
use crate::utils::args::project_id;

/// The glob BAM files are listed with.
pub const BAM_PATTERN: &str = "*markdup.bam";

/// Clap arguments for the `runcmd generate picard` subcommand.
#[derive(Args)]
pub struct PicardArgs {
    /// The project holding the BAM files.
    #[arg(value_name = "PROJECT_ID", value_parser = project_id)]
    pub project: String,

    /// Destination for the generated script.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Keeps the BAM files whose name ends in `.bam`, sorted by name.
fn sorted_bams(records: Vec<FileRecord>) -> (Vec<FileRecord>, usize) {
    let total = records.len();
    let mut bams: Vec<FileRecord> = records
        .into_iter()
        .filter(|record| match record.display_name.ends_with(".bam") {
            true => true,
            false => {
                warn!(
                    "File '{}' (ID: {}) did not end with '.bam'. Skipping.",
                    record.display_name, record.id
                );
                false
            }
        })
        .collect();
    bams.sort_by(|a, b| a.display_name.cmp(&b.display_name));

    let skipped = total - bams.len();
    (bams, skipped)
}

/// Main function for the `runcmd generate picard` subcommand.
pub fn generate<P: Platform>(
    platform: &P,
    config: &Config,
    args: PicardArgs,
) -> anyhow::Result<StageSummary> {
    info!("Starting generate picard subcommand.");

    let project = project_by_id(platform, &args.project);
    let script_path = output_path(args.output.as_deref(), &project, "picard_cmds.sh");

    let records = platform
        .find_files(&project.id, BAM_PATTERN)
        .with_context(|| format!("listing BAM files in {}", project.id))?;
    let (bams, skipped) = sorted_bams(records);
    info!("Found {} sorted BAM files", bams.len());

    let header = ScriptHeader::new("Picard Analysis Commands", project.clone());
    let mut script = ScriptWriter::create(&script_path, &header)
        .with_context(|| format!("creating output script: {}", script_path.display()))?;

    for bam in &bams {
        let command =
            commands::picard(&config.applets.picard, &config.picard, &bam.id, &project.id);
        script
            .push(command)
            .with_context(|| format!("writing to output script: {}", script_path.display()))?;
    }
    let commands = script.finish()?;

    let mut summary = StageSummary::new("picard", project, script_path, commands);
    summary.failures = skipped;
    Ok(summary)
}
