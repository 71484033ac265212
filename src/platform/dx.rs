//! A [`Platform`] backed by the `dx` command line tool.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::pair::compute::FileRecord;
use crate::platform::{Platform, PlatformError};

/// The DNAnexus toolkit (`dx`) installed on this machine.
#[derive(Clone, Debug)]
pub struct DxToolkit {
    program: PathBuf,
}

impl DxToolkit {
    /// Creates a new [`DxToolkit`] that runs `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        DxToolkit {
            program: program.into(),
        }
    }

    /// The executable that is run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The command line for `args`, as shown in logs and errors.
    fn command_line(&self, args: &[&str]) -> String {
        format!("{} {}", self.program.display(), args.join(" "))
    }

    /// Runs `dx` with `args`, returning its stdout.
    fn run(&self, args: &[&str]) -> Result<String, PlatformError> {
        let command = self.command_line(args);
        debug!("Executing: {}", command);

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => PlatformError::NotInstalled(self.program.clone()),
                _ => PlatformError::Spawn {
                    command: command.clone(),
                    source,
                },
            })?;

        if !output.status.success() {
            return Err(PlatformError::Failed {
                command,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parses the JSON printed by `dx find data --json`.
///
/// Empty output means nothing matched. Items without an `id` or a
/// `describe.name` are skipped with a warning.
pub fn parse_find_output(stdout: &str, command: &str) -> Result<Vec<FileRecord>, PlatformError> {
    if stdout.trim().is_empty() {
        info!("No files found by {}. Proceeding.", command);
        return Ok(Vec::new());
    }

    let items: Vec<Value> =
        serde_json::from_str(stdout).map_err(|source| PlatformError::Json {
            command: command.to_string(),
            source,
        })?;

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let id = item.get("id").and_then(Value::as_str);
        let name = item.pointer("/describe/name").and_then(Value::as_str);

        match (id, name) {
            (Some(id), Some(name)) => records.push(FileRecord::new(id, name)),
            _ => warn!("Skipping item with missing id or name in JSON item: {}", item),
        }
    }

    Ok(records)
}

impl Platform for DxToolkit {
    fn find_files(&self, project: &str, pattern: &str) -> Result<Vec<FileRecord>, PlatformError> {
        let args = [
            "find", "data", "--name", pattern, "--class", "file", "--project", project, "--json",
        ];
        let stdout = self.run(&args)?;
        parse_find_output(&stdout, &format!("'{}' file query", pattern))
    }

    fn read_file(&self, file_id: &str) -> Result<String, PlatformError> {
        self.run(&["cat", file_id])
    }

    fn describe_file(&self, file_id: &str) -> Result<String, PlatformError> {
        self.run(&["describe", file_id])
    }

    fn project_name(&self, project_id: &str) -> Result<Option<String>, PlatformError> {
        let args = ["describe", project_id, "--json"];
        let stdout = self.run(&args)?;
        let description: Value = serde_json::from_str(&stdout).map_err(|source| {
            PlatformError::Json {
                command: self.command_line(&args),
                source,
            }
        })?;

        Ok(description
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}
