//! Functionality relating to the `runcmd generate workflow` subcommand.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Args};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::generate::{auth_token_or_placeholder, output_path, read_manifest, StageSummary};
use crate::platform::{Platform, ProjectInfo};
use crate::resolve::prepare_batch;
use crate::sample::manifest::{samples_from_list, samples_from_manifest};
use crate::script::failures::FailuresLog;
use crate::script::{commands, ScriptHeader, ScriptWriter};
use crate::utils::args::{file_id, project_id};

/// Written in place of the project ID when it cannot be determined.
pub const PROJECT_ID_PLACEHOLDER: &str = "{PROJECT_ID_PLACEHOLDER}";

/// Written in place of the project name when it cannot be determined.
pub const UNKNOWN_PROJECT: &str = "UNKNOWN_PROJECT";

/// Clap arguments for the `runcmd generate workflow` subcommand.
#[derive(Args)]
#[command(group(ArgGroup::new("samples").required(true).args(["dxfile", "file", "sample"])))]
pub struct WorkflowArgs {
    /// DNAnexus file ID of the RunManifest.csv listing the samples.
    #[arg(short, long, value_name = "FILE_ID", value_parser = file_id)]
    pub dxfile: Option<String>,

    /// Local file listing one sample per line.
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// A single sample name.
    #[arg(short, long, value_name = "SAMPLE")]
    pub sample: Option<String>,

    /// Project ID, overriding the project detected from the manifest.
    #[arg(short, long, value_name = "PROJECT_ID", value_parser = project_id)]
    pub project: Option<String>,

    /// Destination for the generated script.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Destination for the CSV log of samples that failed checks.
    #[arg(short = 'e', long, value_name = "PATH", default_value = "failures.csv")]
    pub failures: PathBuf,
}

/// Works out the project from the manifest and the `--project` override.
/// Returns the project and whether its name is known.
fn workflow_project<P: Platform>(
    platform: &P,
    args: &WorkflowArgs,
) -> anyhow::Result<(ProjectInfo, bool)> {
    let (mut id, mut name) = match &args.dxfile {
        Some(file) => {
            let description = platform
                .locate_file(file)
                .with_context(|| format!("describing DNAnexus file {}", file))?;
            (description.project_id, description.project_name)
        }
        None => (None, None),
    };

    if let Some(project) = &args.project {
        info!("Using user-provided Project ID: {}", project);
        id = Some(project.clone());

        if name.is_none() {
            name = match platform.project_name(project) {
                Ok(name) => name,
                Err(err) => {
                    warn!(
                        "Could not determine project name from project ID '{}': {:#}",
                        project,
                        anyhow::Error::from(err)
                    );
                    None
                }
            };
        }
    }

    let id = id.unwrap_or_else(|| {
        warn!("Using placeholder for Project ID: {}", PROJECT_ID_PLACEHOLDER);
        String::from(PROJECT_ID_PLACEHOLDER)
    });

    let known = name.is_some();
    let name = name.unwrap_or_else(|| {
        warn!("Project name is unknown. FASTQ paths in the script might be incorrect.");
        String::from(UNKNOWN_PROJECT)
    });

    Ok((ProjectInfo::new(id, name), known))
}

/// Lists the samples to generate commands for.
fn samples<P: Platform>(platform: &P, args: &WorkflowArgs) -> anyhow::Result<Vec<String>> {
    if let Some(file) = &args.dxfile {
        info!("Fetching samples from DNAnexus file: {}", file);
        let samples = samples_from_manifest(&read_manifest(platform, file)?);
        if samples.is_empty() {
            bail!(
                "no samples found in the DNAnexus file '{}'; expected one sample per line \
                or a CSV with samples starting with NGS in the first column",
                file
            );
        }
        return Ok(samples);
    }

    if let Some(path) = &args.file {
        info!("Using local sample file: {}", path.display());
        let list = fs::read_to_string(path)
            .with_context(|| format!("reading sample file: {}", path.display()))?;
        return Ok(samples_from_list(&list));
    }

    Ok(args.sample.iter().cloned().collect())
}

/// Main function for the `runcmd generate workflow` subcommand.
pub fn generate<P: Platform>(
    platform: &P,
    config: &Config,
    args: WorkflowArgs,
) -> anyhow::Result<StageSummary> {
    info!("Starting generate workflow subcommand.");

    // (1) Determine the project and where the script goes.
    let (project, known) = workflow_project(platform, &args)?;
    let script_path = match (&args.output, known) {
        (Some(path), _) => path.clone(),
        (None, true) => output_path(None, &project, "workflow_cmds.sh"),
        (None, false) => PathBuf::from("dnanexus_workflow_cmds.sh"),
    };

    // (2) Collect and check every sample before anything is written.
    let samples = samples(platform, &args)?;
    info!("Processing {} samples.", samples.len());
    let batch = prepare_batch(&samples, config);

    // (3) Write the script and the failures log.
    let header = ScriptHeader::new("CP2 Workflow Commands", project.clone())
        .with_project_variables(&auth_token_or_placeholder(config));
    let mut script = ScriptWriter::create(&script_path, &header)
        .with_context(|| format!("creating output script: {}", script_path.display()))?;
    let mut failures = FailuresLog::create(&args.failures)
        .with_context(|| format!("creating failures log: {}", args.failures.display()))?;

    for (metadata, params) in &batch.accepted {
        let command = commands::workflow(&config.applets.workflow, &metadata.name, params);
        script
            .push(command)
            .with_context(|| format!("writing to output script: {}", script_path.display()))?;

        if metadata.is_whole_exome() {
            info!(
                "Detected WES sample {} without standard R number, using WES configuration.",
                metadata.name
            );
        }
        info!("Added run command for {}", metadata.name);
        debug!(
            "  R-Number: {:?}, Pan Code: {:?}, Batch: {:?}, PRS: {}, vcf_eval: {}, PolyEdge: {}",
            metadata.run_number,
            metadata.panel_code,
            metadata.batch,
            params.prs_enabled,
            params.cnv_eval_enabled,
            params.polyedge_enabled
        );
    }

    for rejection in &batch.rejected {
        failures
            .record(rejection)
            .with_context(|| format!("writing to failures log: {}", args.failures.display()))?;
    }

    let commands = script.finish()?;
    let failures_log = failures.finish()?;

    let mut summary = StageSummary::new("workflow", project, script_path, commands);
    summary.failures = batch.rejected.len();
    summary.failures_log = failures_log;
    Ok(summary)
}
