//! Access to the DNAnexus platform.
//!
//! Everything `runcmd` needs from the platform goes through the narrow
//! [`Platform`] trait: listing files by name, reading a file, and describing
//! files and projects. [`dx::DxToolkit`] implements it by running the `dx`
//! command line tool, and [`fixture::Fixture`] implements it in memory.

pub mod dx;
pub mod fixture;

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::pair::compute::FileRecord;
use crate::sample::patterns;

/// Errors raised while talking to the platform.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The `dx` executable could not be found.
    #[error("dx command-line tool not found at {0}; please ensure it's installed and in your PATH")]
    NotInstalled(PathBuf),

    /// The `dx` executable could not be started.
    #[error("could not run `{command}`")]
    Spawn {
        /// The command line that was run.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A `dx` command exited unsuccessfully.
    #[error("`{command}` failed with exit code {code:?}: {stderr}")]
    Failed {
        /// The command line that was run.
        command: String,
        /// The exit code, if the process exited normally.
        code: Option<i32>,
        /// Everything the command wrote to stderr.
        stderr: String,
    },

    /// A `dx` command produced output that is not the expected JSON.
    #[error("could not parse JSON output of `{command}`")]
    Json {
        /// The command line that was run.
        command: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The requested object does not exist.
    #[error("no such object: {0}")]
    NotFound(String),
}

/// A DNAnexus project.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProjectInfo {
    /// The project ID (`project-xxxx`).
    pub id: String,

    /// The project name.
    pub name: String,
}

impl ProjectInfo {
    /// Creates a new [`ProjectInfo`].
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        ProjectInfo {
            id: id.into(),
            name: name.into(),
        }
    }

    /// The project name made safe for use in a file name.
    pub fn file_stem(&self) -> String {
        self.name.replace(' ', "_")
    }
}

/// The project fields found in the text output of `dx describe <file>`.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct FileDescription {
    /// The ID of the project holding the file.
    pub project_id: Option<String>,

    /// The project name, taken from the first component of the file's folder.
    pub project_name: Option<String>,
}

impl FileDescription {
    /// Parses the text output of `dx describe <file>`.
    pub fn parse(description: &str) -> Self {
        let project_id = patterns::DX_PROJECT
            .captures(description)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        if project_id.is_none() {
            warn!("Could not detect Project ID from dx describe output.");
        }

        let project_name = patterns::DX_FOLDER
            .captures(description)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().trim().trim_start_matches('/').split('/').next())
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        if project_name.is_none() {
            warn!("Could not derive project name from the folder in dx describe output.");
        }

        FileDescription {
            project_id,
            project_name,
        }
    }

    /// The project, if both the ID and the name were found.
    pub fn project(self) -> Option<ProjectInfo> {
        match (self.project_id, self.project_name) {
            (Some(id), Some(name)) => Some(ProjectInfo { id, name }),
            _ => None,
        }
    }
}

/// The operations `runcmd` needs from the platform.
pub trait Platform {
    /// Lists the files in `project` whose name matches the glob `pattern`.
    fn find_files(&self, project: &str, pattern: &str) -> Result<Vec<FileRecord>, PlatformError>;

    /// Reads the full text content of a file.
    fn read_file(&self, file_id: &str) -> Result<String, PlatformError>;

    /// Describes a file, returning the human-readable description.
    fn describe_file(&self, file_id: &str) -> Result<String, PlatformError>;

    /// Looks up the name of a project.
    fn project_name(&self, project_id: &str) -> Result<Option<String>, PlatformError>;

    /// Finds the project holding a file.
    fn locate_file(&self, file_id: &str) -> Result<FileDescription, PlatformError> {
        info!("Extracting project information from DNAnexus file {}...", file_id);
        let description = FileDescription::parse(&self.describe_file(file_id)?);

        if let Some(id) = &description.project_id {
            info!("Detected Project ID: {}", id);
        }
        if let Some(name) = &description.project_name {
            info!("Detected Project Name: {}", name);
        }

        Ok(description)
    }
}
