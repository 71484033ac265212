//! Writing of generated shell scripts.
//!
//! Every stage writes a bash script with the same preamble: a shebang, a
//! description of what the script does, the time it was generated and the
//! project it targets, optionally followed by shell variables that the
//! commands refer to (`${PROJECT_ID}` and friends).

pub mod commands;
pub mod failures;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use crate::platform::ProjectInfo;

/// The shell variable holding the DNAnexus auth token.
pub const AUTH_TOKEN_VAR: &str = "AUTH_TOKEN";

/// The shell variable holding the project ID.
pub const PROJECT_ID_VAR: &str = "PROJECT_ID";

/// The shell variable holding the project name.
pub const PROJECT_NAME_VAR: &str = "PROJECT_NAME";

/// The preamble written at the top of a script.
#[derive(Clone, Debug)]
pub struct ScriptHeader {
    description: String,
    project: ProjectInfo,
    variables: Vec<(String, String)>,
}

impl ScriptHeader {
    /// Creates a new [`ScriptHeader`] with no shell variables.
    pub fn new(description: impl Into<String>, project: ProjectInfo) -> Self {
        ScriptHeader {
            description: description.into(),
            project,
            variables: Vec::new(),
        }
    }

    /// Adds a shell variable assignment.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.push((name.into(), value.into()));
        self
    }

    /// Adds the `AUTH_TOKEN`, `PROJECT_ID` and `PROJECT_NAME` variables.
    pub fn with_project_variables(self, auth_token: &str) -> Self {
        let id = self.project.id.clone();
        let name = self.project.name.clone();

        self.with_variable(AUTH_TOKEN_VAR, auth_token)
            .with_variable(PROJECT_ID_VAR, id)
            .with_variable(PROJECT_NAME_VAR, name)
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "#!/bin/bash")?;
        writeln!(writer, "# {}", self.description)?;
        writeln!(
            writer,
            "# Generated on: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )?;
        writeln!(writer, "# Project: {} ({})", self.project.name, self.project.id)?;
        writeln!(writer)?;

        if !self.variables.is_empty() {
            for (name, value) in &self.variables {
                writeln!(writer, "{}=\"{}\"", name, value)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

/// An executable shell script being written.
pub struct ScriptWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    commands: usize,
}

impl ScriptWriter {
    /// Creates the script at `path`, truncating any existing file, and writes
    /// the header.
    pub fn create(path: impl AsRef<Path>, header: &ScriptHeader) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut writer = BufWriter::new(File::create(&path)?);
        header.write(&mut writer)?;

        info!("Initialized output script: {}", path.display());
        Ok(ScriptWriter {
            path,
            writer,
            commands: 0,
        })
    }

    /// Appends one command on its own line.
    pub fn push(&mut self, command: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.writer, "{}", command.as_ref())?;
        self.commands += 1;
        Ok(())
    }

    /// Appends free-form text (comments, job bookkeeping) that is not counted
    /// as a command.
    pub fn push_text(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        self.writer.write_all(text.as_ref().as_bytes())
    }

    /// Flushes the script and marks it executable. Returns the number of
    /// commands written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        make_executable(&self.path)?;

        debug!(
            "Wrote {} commands to {}",
            self.commands,
            self.path.display()
        );
        Ok(self.commands)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_: &Path) -> io::Result<()> {
    Ok(())
}
