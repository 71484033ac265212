//! Functionality relating to the `runcmd generate cnv-reanalysis` subcommand.
//!
//! A reanalysis calls CNVs for one sample's panel again, this time against
//! the CNV BED file of a different panel. The BAMs are still selected by the
//! panel the sample was originally sequenced against.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use tracing::info;

use crate::config::Config;
use crate::generate::command::cnv::find_readcount_file;
use crate::generate::{output_path, project_of_file, read_manifest, StageSummary};
use crate::platform::Platform;
use crate::resolve::cnv_bedfile;
use crate::sample::manifest::original_pan_for_sample;
use crate::script::commands::{self, CnvJob};
use crate::script::{ScriptHeader, ScriptWriter};
use crate::utils::args::{file_id, pan_number, sample_identifier};

/// Clap arguments for the `runcmd generate cnv-reanalysis` subcommand.
#[derive(Args)]
pub struct CnvReanalysisArgs {
    /// DNAnexus file ID of the RunManifest.csv.
    #[arg(value_name = "FILE_ID", value_parser = file_id)]
    pub manifest: String,

    /// The sample to reanalyse (e.g. 123456 or NGS0001_R1.001).
    #[arg(value_name = "SAMPLE", value_parser = sample_identifier)]
    pub sample: String,

    /// The new panel whose CNV BED file is used (e.g. Pan1234).
    #[arg(value_name = "PAN", value_parser = pan_number)]
    pub new_pan: String,

    /// Destination for the generated script.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Main function for the `runcmd generate cnv-reanalysis` subcommand.
pub fn generate<P: Platform>(
    platform: &P,
    config: &Config,
    args: CnvReanalysisArgs,
) -> anyhow::Result<StageSummary> {
    info!("Starting generate cnv-reanalysis subcommand.");

    let project = project_of_file(platform, &args.manifest)?;
    let readcount_file = find_readcount_file(platform, &project)?;

    let cnv_bed = match cnv_bedfile(&args.new_pan, &config.panels, &config.common_data_project)
        .with_context(|| format!("resolving CNV BED file for {}", args.new_pan))?
    {
        Some(bed) => bed,
        None => bail!(
            "no CNV bedfile configured for NEW Pan number {}; cannot proceed with reanalysis",
            args.new_pan
        ),
    };

    let manifest = read_manifest(platform, &args.manifest)?;
    let Some(original_pan) = original_pan_for_sample(&manifest, &args.sample) else {
        bail!(
            "could not find original Pan number for sample {} in the manifest",
            args.sample
        );
    };
    info!(
        "Found original Pan number for {}: {}",
        args.sample, original_pan
    );

    let script_path = output_path(args.output.as_deref(), &project, "cnv_reanalysis_cmds.sh");
    let header = ScriptHeader::new("CNV ExomeDepth Reanalysis Commands", project.clone());
    let mut script = ScriptWriter::create(&script_path, &header)
        .with_context(|| format!("creating output script: {}", script_path.display()))?;

    let job = CnvJob {
        readcount_file: &readcount_file,
        cnv_bed: &cnv_bed,
        project: &project,
        bam_pan: &original_pan,
    };
    script
        .push(commands::cnv_reanalysis(config, &job, &args.new_pan))
        .with_context(|| format!("writing to output script: {}", script_path.display()))?;
    let commands = script.finish()?;

    info!(
        "Generated CNV reanalysis command for sample {} (Original Pan: {}) with NEW panel {}",
        args.sample, original_pan, args.new_pan
    );
    Ok(StageSummary::new(
        "cnv-reanalysis",
        project,
        script_path,
        commands,
    ))
}
