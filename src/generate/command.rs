//! Functionality related to the `runcmd generate` subcommand itself.

pub mod cnv;
pub mod cnv_reanalysis;
pub mod coverage;
pub mod fastqc;
pub mod picard;
pub mod readcount;
pub mod workflow;

use clap::{Args, Subcommand};

use crate::config::Config;
use crate::generate::StageSummary;
use crate::platform::Platform;

//========================//
// Command-line arguments //
//========================//

/// Command line arguments for `runcmd generate`.
#[derive(Args)]
pub struct GenerateArgs {
    /// The stage to generate commands for.
    #[command(subcommand)]
    pub subcommand: GenerateSubcommand,
}

/// The stages `runcmd generate` can write scripts for.
#[derive(Subcommand)]
pub enum GenerateSubcommand {
    /// Alignment and variant calling workflow, one job per sample in a run
    /// manifest.
    Workflow(self::workflow::WorkflowArgs),

    /// Sambamba coverage, one job per BAM/BAI pair.
    Coverage(self::coverage::CoverageArgs),

    /// Picard QC metrics, one job per BAM.
    Picard(self::picard::PicardArgs),

    /// FastQC, one job per pair of FASTQ mates.
    Fastqc(self::fastqc::FastqcArgs),

    /// ExomeDepth CNV calling, one job per panel in a run manifest.
    Cnv(self::cnv::CnvArgs),

    /// ExomeDepth CNV reanalysis of one sample against a new panel.
    CnvReanalysis(self::cnv_reanalysis::CnvReanalysisArgs),

    /// ExomeDepth read counting over every panel in a run manifest.
    Readcount(self::readcount::ReadcountArgs),
}

//==============//
// Main command //
//==============//

/// Main function for the `runcmd generate` subcommand.
pub fn generate<P: Platform>(
    args: GenerateArgs,
    config: &Config,
    platform: &P,
) -> anyhow::Result<()> {
    let summary = match args.subcommand {
        GenerateSubcommand::Workflow(args) => workflow::generate(platform, config, args)?,
        GenerateSubcommand::Coverage(args) => coverage::generate(platform, config, args)?,
        GenerateSubcommand::Picard(args) => picard::generate(platform, config, args)?,
        GenerateSubcommand::Fastqc(args) => fastqc::generate(platform, config, args)?,
        GenerateSubcommand::Cnv(args) => cnv::generate(platform, config, args)?,
        GenerateSubcommand::CnvReanalysis(args) => {
            cnv_reanalysis::generate(platform, config, args)?
        }
        GenerateSubcommand::Readcount(args) => readcount::generate(platform, config, args)?,
    };

    summary.log();
    print_summary(&summary)
}

/// Prints the summary to stdout as JSON.
fn print_summary(summary: &StageSummary) -> anyhow::Result<()> {
    let output = serde_json::to_string_pretty(summary)?;
    println!("{}", output);
    Ok(())
}
