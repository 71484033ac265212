//! An in-memory [`Platform`].
//!
//! The fixture holds a fixed catalog of files, file contents and
//! descriptions, and answers queries the way `dx` would. Stage generators are
//! tested against it.

use std::collections::HashMap;

use regex::Regex;

use crate::pair::compute::FileRecord;
use crate::platform::{Platform, PlatformError};

/// An in-memory data catalog.
#[derive(Clone, Debug, Default)]
pub struct Fixture {
    files: Vec<(String, FileRecord)>,
    contents: HashMap<String, String>,
    descriptions: HashMap<String, String>,
    project_names: HashMap<String, String>,
}

impl Fixture {
    /// Creates a new, empty [`Fixture`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file named `name` with ID `id` to `project`.
    pub fn with_file(mut self, project: &str, id: &str, name: &str) -> Self {
        self.files
            .push((project.to_string(), FileRecord::new(id, name)));
        self
    }

    /// Sets the text content of a file.
    pub fn with_content(mut self, id: &str, content: &str) -> Self {
        self.contents.insert(id.to_string(), content.to_string());
        self
    }

    /// Sets the `dx describe` output for a file placed in `folder` of
    /// `project`.
    pub fn with_description(mut self, id: &str, project: &str, folder: &str) -> Self {
        let description = format!(
            "Result 1:\nID                  {}\nClass               file\nProject             {}\nFolder              {}\nState               closed\n",
            id, project, folder
        );
        self.descriptions.insert(id.to_string(), description);
        self
    }

    /// Sets the name of a project.
    pub fn with_project_name(mut self, project: &str, name: &str) -> Self {
        self.project_names
            .insert(project.to_string(), name.to_string());
        self
    }
}

/// Translates a `dx`-style name glob into an anchored regex. Only `*` and `?`
/// are special.
fn glob_to_regex(pattern: &str) -> Regex {
    let translated = pattern
        .chars()
        .map(|c| match c {
            '*' => String::from(".*"),
            '?' => String::from("."),
            c => regex::escape(&c.to_string()),
        })
        .collect::<String>();

    Regex::new(&format!("^{}$", translated)).expect("escaped glob is a valid regex")
}

impl Platform for Fixture {
    fn find_files(&self, project: &str, pattern: &str) -> Result<Vec<FileRecord>, PlatformError> {
        let glob = glob_to_regex(pattern);

        Ok(self
            .files
            .iter()
            .filter(|(p, record)| p == project && glob.is_match(&record.display_name))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn read_file(&self, file_id: &str) -> Result<String, PlatformError> {
        self.contents
            .get(file_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(file_id.to_string()))
    }

    fn describe_file(&self, file_id: &str) -> Result<String, PlatformError> {
        self.descriptions
            .get(file_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(file_id.to_string()))
    }

    fn project_name(&self, project_id: &str) -> Result<Option<String>, PlatformError> {
        Ok(self.project_names.get(project_id).cloned())
    }
}
