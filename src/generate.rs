//! Functionality related to the `runcmd generate` subcommand.
//!
//! Each stage is a plain function taking a [`Platform`], the [`Config`] and
//! its command line arguments, and returning a [`StageSummary`] describing
//! what was written.

pub mod command;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use num_format::{Locale, ToFormattedString};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::pair::compute::PairResult;
use crate::platform::{Platform, ProjectInfo};

/// Written in place of the auth token when it cannot be read.
pub const AUTH_TOKEN_PLACEHOLDER: &str = "{AUTH_TOKEN_PLACEHOLDER}";

/// What a stage wrote.
#[derive(Debug, Serialize)]
pub struct StageSummary {
    /// The stage that ran.
    pub stage: &'static str,

    /// The project the commands target.
    pub project: ProjectInfo,

    /// The generated script.
    pub script: PathBuf,

    /// The number of commands in the script.
    pub commands: usize,

    /// The number of samples (or panels) no command was generated for.
    pub failures: usize,

    /// The failures log, if any failure was recorded in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures_log: Option<PathBuf>,

    /// Items that were deliberately left out (e.g. panels without a CNV BED
    /// file).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,

    /// How the file listings paired up, for stages that pair files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing: Option<PairResult>,
}

impl StageSummary {
    /// Creates a new [`StageSummary`] with no failures.
    pub fn new(stage: &'static str, project: ProjectInfo, script: PathBuf, commands: usize) -> Self {
        StageSummary {
            stage,
            project,
            script,
            commands,
            failures: 0,
            failures_log: None,
            skipped: Vec::new(),
            pairing: None,
        }
    }

    /// Logs the summary at info level.
    pub fn log(&self) {
        info!(
            "{}: wrote {} commands to {}",
            self.stage,
            self.commands.to_formatted_string(&Locale::en),
            self.script.display()
        );
        if self.failures > 0 {
            warn!(
                "{}: {} items failed pre-submission checks",
                self.stage,
                self.failures.to_formatted_string(&Locale::en)
            );
        }
        if let Some(log) = &self.failures_log {
            info!("Failures log: {}", log.display());
        }
        info!("To execute the generated commands, run: bash {}", self.script.display());
    }
}

/// The script path: `output` if given, otherwise `<project name>_<suffix>`
/// with spaces in the project name replaced by underscores.
pub fn output_path(output: Option<&Path>, project: &ProjectInfo, suffix: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("{}_{}", project.file_stem(), suffix)),
    }
}

/// Looks up the project with ID `project_id`. If its name cannot be found,
/// the ID is used as the name.
pub fn project_by_id<P: Platform>(platform: &P, project_id: &str) -> ProjectInfo {
    match platform.project_name(project_id) {
        Ok(Some(name)) => ProjectInfo::new(project_id, name),
        Ok(None) => {
            warn!("Project {} has no name, using its ID instead.", project_id);
            ProjectInfo::new(project_id, project_id)
        }
        Err(err) => {
            warn!(
                "Could not get project name from project ID '{}': {:#}",
                project_id,
                anyhow::Error::from(err)
            );
            ProjectInfo::new(project_id, project_id)
        }
    }
}

/// Finds the project holding `file_id` (typically the run manifest). Both
/// the project ID and its name must be detected.
pub fn project_of_file<P: Platform>(platform: &P, file_id: &str) -> anyhow::Result<ProjectInfo> {
    let description = platform
        .locate_file(file_id)
        .with_context(|| format!("describing DNAnexus file {}", file_id))?;

    match description.project() {
        Some(project) => Ok(project),
        None => bail!(
            "could not detect project information from the provided file: {}",
            file_id
        ),
    }
}

/// Reads the auth token, falling back to [`AUTH_TOKEN_PLACEHOLDER`] with a
/// warning.
pub fn auth_token_or_placeholder(config: &Config) -> String {
    match config.auth_token() {
        Ok(token) => token,
        Err(err) => {
            warn!("{:#}. Using placeholder.", anyhow::Error::from(err));
            String::from(AUTH_TOKEN_PLACEHOLDER)
        }
    }
}

/// Reads the manifest and returns its content, failing if it is empty.
pub fn read_manifest<P: Platform>(platform: &P, file_id: &str) -> anyhow::Result<String> {
    let manifest = platform
        .read_file(file_id)
        .with_context(|| format!("reading manifest file {}", file_id))?;

    if manifest.trim().is_empty() {
        bail!("manifest file {} is empty", file_id);
    }

    Ok(manifest)
}
