//! Functionality relating to the `runcmd generate readcount` subcommand.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use itertools::Itertools;
use tracing::info;

use crate::config::Config;
use crate::generate::{
    auth_token_or_placeholder, output_path, project_of_file, read_manifest, StageSummary,
};
use crate::platform::Platform;
use crate::sample::manifest::extract_pan_numbers;
use crate::script::commands::{self, PAN_NUMBERS_VAR};
use crate::script::{ScriptHeader, ScriptWriter};
use crate::utils::args::file_id;

/// Clap arguments for the `runcmd generate readcount` subcommand.
#[derive(Args)]
pub struct ReadcountArgs {
    /// DNAnexus file ID of the RunManifest.csv.
    #[arg(value_name = "FILE_ID", value_parser = file_id)]
    pub manifest: String,

    /// Destination for the generated script.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Main function for the `runcmd generate readcount` subcommand.
pub fn generate<P: Platform>(
    platform: &P,
    config: &Config,
    args: ReadcountArgs,
) -> anyhow::Result<StageSummary> {
    info!("Starting generate readcount subcommand.");

    let project = project_of_file(platform, &args.manifest)?;
    let pan_numbers = extract_pan_numbers(&read_manifest(platform, &args.manifest)?);
    if pan_numbers.is_empty() {
        bail!("no Pan numbers found in the manifest file {}", args.manifest);
    }

    let pan_list = pan_numbers.iter().join(",");
    info!("Read counts will be taken for: {}", pan_list);

    let script_path = output_path(args.output.as_deref(), &project, "readcount_cmd.sh");
    let header = ScriptHeader::new("DNAnexus Readcount Command", project.clone())
        .with_project_variables(&auth_token_or_placeholder(config))
        .with_variable(PAN_NUMBERS_VAR, pan_list);
    let mut script = ScriptWriter::create(&script_path, &header)
        .with_context(|| format!("creating output script: {}", script_path.display()))?;

    script.push_text(
        "echo \"Starting readcount command execution...\"\n\
         echo \"Project ID: ${PROJECT_ID}\"\n\
         echo \"Project Name: ${PROJECT_NAME}\"\n\
         echo \"PAN Numbers: ${PAN_NUMBERS}\"\n\
         echo \"----------------------------------------\"\n",
    )?;
    script
        .push(commands::readcount(config))
        .with_context(|| format!("writing to output script: {}", script_path.display()))?;
    script.push_text("echo \"----------------------------------------\"\n")?;
    let commands = script.finish()?;

    Ok(StageSummary::new("readcount", project, script_path, commands))
}
