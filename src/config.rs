//! Loading of the `runcmd` configuration file.
//!
//! The configuration is a TOML file naming the DNAnexus executables to run,
//! shared reference data, and the panel table that decides which panels get
//! CNV analysis. It is loaded once by the command line and passed explicitly
//! to everything that needs it.
//!
//! ```toml
//! common_data_project = "project-ByfFPz00jy1fk6PjpZ95F27J"
//! reference_genome = "project-ByfFPz00jy1fk6PjpZ95F27J:file-B6ZY7VG2J35Vfvpkj8y0KZ01"
//!
//! [applets]
//! workflow = "project-ByfFPz00jy1fk6PjpZ95F27J:workflow-Gzj03g80jy1XbKzZY4yz7JXZ"
//! coverage = "applet-G6vyyf00jy1kPkX9PJ1YkxB1"
//! cnv = "applet-GFYvJF00jy1bXZbP6BqFqYjg"
//! readcount = "applet-GFYvJF00jy1bXZbP6BqFqYjf"
//!
//! [coverage]
//! sambamba_bed = "project-ByfFPz00jy1fk6PjpZ95F27J:file-G6PVbY00jy1Zq9q5Fz0K0yqQ"
//!
//! [readcount]
//! normals_rdata = "project-ByfFPz00jy1fk6PjpZ95F27J:file-GFYvJF00jy1bXZbP6BqFqYjq"
//!
//! [panels.Pan4009]
//! cnv_bedfile = "Pan4009"
//!
//! [panels.Pan5180]
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading the configuration or the files it points to.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read configuration file {path}")]
    Read {
        /// The configuration file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid.
    #[error("invalid configuration file {path}")]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// The underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// The auth token file could not be read.
    #[error("could not read auth token from {path}")]
    AuthTokenRead {
        /// The auth token file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The auth token file is empty.
    #[error("auth token file {0} is empty")]
    EmptyAuthToken(PathBuf),
}

/// The `runcmd` configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// The project holding shared reference data such as BED files.
    pub common_data_project: String,

    /// The reference genome passed to CNV and read count jobs.
    pub reference_genome: String,

    /// A file containing the DNAnexus auth token written into scripts.
    #[serde(default = "default_auth_token_path")]
    pub auth_token_path: PathBuf,

    /// The executables run by each stage.
    pub applets: Applets,

    /// Settings for the workflow stage.
    #[serde(default)]
    pub workflow: WorkflowConfig,

    /// Settings for the coverage stage.
    pub coverage: CoverageConfig,

    /// Settings for the Picard stage.
    #[serde(default)]
    pub picard: PicardConfig,

    /// Settings for the read count stage.
    pub readcount: ReadcountConfig,

    /// The panel table, keyed by panel code.
    #[serde(default)]
    pub panels: Panels,
}

fn default_auth_token_path() -> PathBuf {
    PathBuf::from("/usr/local/src/mokaguys/.dnanexus_auth_token")
}

/// The DNAnexus executables (workflows or applets) run by each stage.
#[derive(Clone, Debug, Deserialize)]
pub struct Applets {
    /// The alignment and variant calling workflow.
    pub workflow: String,

    /// The coverage applet.
    pub coverage: String,

    /// The Picard QC applet.
    #[serde(default = "default_picard_applet")]
    pub picard: String,

    /// The FastQC applet.
    #[serde(default = "default_fastqc_applet")]
    pub fastqc: String,

    /// The ExomeDepth CNV calling applet.
    pub cnv: String,

    /// The ExomeDepth read count applet.
    pub readcount: String,
}

fn default_picard_applet() -> String {
    String::from("applet-GQKxx1Q0jy1kFXjx5961Pb8j")
}

fn default_fastqc_applet() -> String {
    String::from("applet-GKXqZV80jy1QxF4yKYB4Y3Kz")
}

/// BED files used by the workflow stage, relative to the BED folder of the
/// common data project.
#[derive(Clone, Debug, Deserialize)]
pub struct WorkflowConfig {
    /// Regions used for variant calling.
    #[serde(default = "default_variant_bed")]
    pub variant_bed: String,

    /// Regions used for coverage reporting.
    #[serde(default = "default_coverage_bed")]
    pub coverage_bed: String,
}

fn default_variant_bed() -> String {
    String::from("Pan5272_data.bed")
}

fn default_coverage_bed() -> String {
    String::from("Pan5272_sambamba.bed")
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        WorkflowConfig {
            variant_bed: default_variant_bed(),
            coverage_bed: default_coverage_bed(),
        }
    }
}

/// Settings for the coverage stage.
#[derive(Clone, Debug, Deserialize)]
pub struct CoverageConfig {
    /// The sambamba BED file (a full DNAnexus file reference).
    pub sambamba_bed: String,
}

/// Settings for the Picard stage (full DNAnexus file references).
#[derive(Clone, Debug, Deserialize)]
pub struct PicardConfig {
    /// The reference FASTA index.
    #[serde(default = "default_fasta_index")]
    pub fasta_index: String,

    /// The capture kit BED file.
    #[serde(default = "default_vendor_exome_bedfile")]
    pub vendor_exome_bedfile: String,
}

fn default_fasta_index() -> String {
    String::from("project-ByfFPz00jy1fk6PjpZ95F27J:file-ByYgX700b80gf4ZY1GxvF3Jv")
}

fn default_vendor_exome_bedfile() -> String {
    String::from("project-ByfFPz00jy1fk6PjpZ95F27J:file-Gzj07J00jy1kVJXbFj8z67G0")
}

impl Default for PicardConfig {
    fn default() -> Self {
        PicardConfig {
            fasta_index: default_fasta_index(),
            vendor_exome_bedfile: default_vendor_exome_bedfile(),
        }
    }
}

/// Settings for the read count stage.
#[derive(Clone, Debug, Deserialize)]
pub struct ReadcountConfig {
    /// The panel of normals (a full DNAnexus file reference).
    pub normals_rdata: String,

    /// The BED file read counts are taken over, relative to the BED folder of
    /// the common data project.
    #[serde(default = "default_readcount_bed")]
    pub bedfile: String,
}

fn default_readcount_bed() -> String {
    String::from("Pan5279_exomeDepth.bed")
}

/// One row of the panel table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct PanelEntry {
    /// The stem of the panel's CNV BED file, if CNV calling is configured.
    #[serde(default)]
    pub cnv_bedfile: Option<String>,
}

/// The panel table, in the order it was written.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Panels(IndexMap<String, PanelEntry>);

impl Panels {
    /// Looks up a panel code. `None` means the panel is not configured at all.
    pub fn get(&self, pan: &str) -> Option<&PanelEntry> {
        self.0.get(pan)
    }

    /// Iterates over the table in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PanelEntry)> {
        self.0.iter()
    }

    /// The number of configured panels.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromStr for Config {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Config {
    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = contents
            .parse::<Config>()
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded {} panels from configuration.", config.panels.len());

        Ok(config)
    }

    /// Reads the DNAnexus auth token.
    pub fn auth_token(&self) -> Result<String, ConfigError> {
        let path = &self.auth_token_path;
        let token = fs::read_to_string(path).map_err(|source| ConfigError::AuthTokenRead {
            path: path.clone(),
            source,
        })?;

        let token = token.trim();
        if token.is_empty() {
            return Err(ConfigError::EmptyAuthToken(path.clone()));
        }

        info!("Read auth token from {}", path.display());
        Ok(token.to_string())
    }

    /// The full DNAnexus path of a file in the common data project's BED
    /// folder.
    pub fn bed_path(&self, file: &str) -> String {
        format!("{}:/Data/BED/{}", self.common_data_project, file)
    }
}

#[cfg(test)]
pub(crate) static TEST_CONFIG: &str = r#"
common_data_project = "project-common"
reference_genome = "project-common:file-reference"

[applets]
workflow = "project-common:workflow-cp2"
coverage = "applet-coverage"
cnv = "applet-cnv"
readcount = "applet-readcount"

[coverage]
sambamba_bed = "project-common:file-sambamba"

[readcount]
normals_rdata = "project-common:file-normals"

[panels.Pan4009]
cnv_bedfile = "Pan4009"

[panels.Pan5180]

[panels.Pan5208]
cnv_bedfile = "Pan5208"
"#;
