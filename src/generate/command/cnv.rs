//! Functionality relating to the `runcmd generate cnv` subcommand.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use itertools::Itertools;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::generate::{output_path, project_of_file, read_manifest, StageSummary};
use crate::platform::{Platform, ProjectInfo};
use crate::resolve::cnv_bedfile;
use crate::sample::manifest::extract_pan_numbers;
use crate::script::commands::{self, CnvJob};
use crate::script::{ScriptHeader, ScriptWriter};
use crate::utils::args::file_id;

/// The glob the ExomeDepth read count file is listed with.
pub const READCOUNT_PATTERN: &str = "*.RData";

/// Clap arguments for the `runcmd generate cnv` subcommand.
#[derive(Args)]
pub struct CnvArgs {
    /// DNAnexus file ID of the RunManifest.csv.
    #[arg(value_name = "FILE_ID", value_parser = file_id)]
    pub manifest: String,

    /// Destination for the generated script.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Finds the ExomeDepth read count file in `project`. When there are several,
/// the first one listed is used.
pub fn find_readcount_file<P: Platform>(
    platform: &P,
    project: &ProjectInfo,
) -> anyhow::Result<String> {
    let files = platform
        .find_files(&project.id, READCOUNT_PATTERN)
        .with_context(|| format!("listing read count files in {}", project.id))?;

    let Some(first) = files.first() else {
        bail!("could not find .RData readcount file in project {}", project.id);
    };

    if files.len() > 1 {
        warn!(
            "Multiple .RData files found ({}). Using the first one: {}",
            files.iter().map(|f| f.id.as_str()).join(", "),
            first.id
        );
    }

    Ok(first.id.clone())
}

/// Main function for the `runcmd generate cnv` subcommand.
pub fn generate<P: Platform>(
    platform: &P,
    config: &Config,
    args: CnvArgs,
) -> anyhow::Result<StageSummary> {
    info!("Starting generate cnv subcommand.");

    // (1) Project, panels and read counts.
    let project = project_of_file(platform, &args.manifest)?;
    let pan_numbers = extract_pan_numbers(&read_manifest(platform, &args.manifest)?);
    if pan_numbers.is_empty() {
        bail!("no Pan numbers found in the manifest file {}", args.manifest);
    }
    info!(
        "Found {} unique Pan numbers: {}",
        pan_numbers.len(),
        pan_numbers.iter().join(", ")
    );

    let readcount_file = find_readcount_file(platform, &project)?;

    // (2) One job per panel with a CNV BED file.
    let script_path = output_path(args.output.as_deref(), &project, "cnv_cmds.sh");
    let header = ScriptHeader::new("CNV Analysis Commands", project.clone());
    let mut script = ScriptWriter::create(&script_path, &header)
        .with_context(|| format!("creating output script: {}", script_path.display()))?;
    script.push_text("# Initialize dependency tracking\nDEPENDS_LIST=\"\"\n")?;

    let mut skipped = Vec::new();
    let mut failures = 0;

    for pan in &pan_numbers {
        let cnv_bed = match cnv_bedfile(pan, &config.panels, &config.common_data_project) {
            Ok(Some(bed)) => bed,
            Ok(None) => {
                skipped.push(pan.clone());
                continue;
            }
            Err(err) => {
                error!("{}. No CNV command will be generated for it.", err);
                failures += 1;
                continue;
            }
        };

        let job = CnvJob {
            readcount_file: &readcount_file,
            cnv_bed: &cnv_bed,
            project: &project,
            bam_pan: pan,
        };

        script.push_text(format!("\n# Process {}\n", pan))?;
        script
            .push(commands::cnv(config, &job))
            .with_context(|| format!("writing to output script: {}", script_path.display()))?;
        script.push_text(commands::cnv_job_tracking(pan))?;
    }
    let commands = script.finish()?;

    let mut summary = StageSummary::new("cnv", project, script_path, commands);
    summary.failures = failures;
    summary.skipped = skipped;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::TEST_CONFIG;
    use crate::platform::fixture::Fixture;

    static MANIFEST: &str = "\
Sample_ID,Sample_Name,Description
NGS650_01_111111_R134_Pan4009_S1,111111,Pan4009
NGS650_02_222222_R134_Pan4009_S2,222222,Pan4009
NGS650_03_333333_R210_Pan5180_S3,333333,Pan5180
NGS650_04_444444_R211_Pan9999_S4,444444,Pan9999
NGS650_05_555555_R211_Pan5208_S5,555555,Pan5208
";

    fn fixture() -> Fixture {
        Fixture::new()
            .with_description("file-manifest", "project-run", "/002_run650/")
            .with_content("file-manifest", MANIFEST)
            .with_file("project-run", "file-rdata", "002_run650.RData")
    }

    #[test]
    fn test_cnv_commands_per_configured_panel() {
        let dir = tempfile::tempdir().unwrap();
        let config: Config = TEST_CONFIG.parse().unwrap();

        let args = CnvArgs {
            manifest: String::from("file-manifest"),
            output: Some(dir.path().join("cnv.sh")),
        };
        let summary = generate(&fixture(), &config, args).unwrap();
        assert_eq!(summary.commands, 2);
        assert_eq!(summary.skipped, vec!["Pan5180"]);
        assert_eq!(summary.failures, 1);

        let script = fs::read_to_string(dir.path().join("cnv.sh")).unwrap();
        assert!(script.contains("DEPENDS_LIST=\"\""));
        let jobs: Vec<&str> = script
            .lines()
            .filter(|l| l.starts_with("JOB_ID_CNV_"))
            .collect();
        assert_eq!(jobs.len(), 2);
        assert!(jobs[0].starts_with("JOB_ID_CNV_Pan4009=$(dx run applet-cnv "));
        assert!(jobs[0].contains("-ireadcount_file=file-rdata "));
        assert!(jobs[0].contains("-isubpanel_bed=project-common:/Data/BED/Pan4009_CNV.bed "));
        assert!(jobs[1].starts_with("JOB_ID_CNV_Pan5208="));
    }

    #[test]
    fn test_cnv_without_readcount_file() {
        let dir = tempfile::tempdir().unwrap();
        let config: Config = TEST_CONFIG.parse().unwrap();
        let fixture = Fixture::new()
            .with_description("file-manifest", "project-run", "/002_run650/")
            .with_content("file-manifest", MANIFEST);

        let args = CnvArgs {
            manifest: String::from("file-manifest"),
            output: Some(dir.path().join("cnv.sh")),
        };
        assert!(generate(&fixture, &config, args).is_err());
        assert!(!dir.path().join("cnv.sh").exists());
    }

    #[test]
    fn test_first_readcount_file_is_used() {
        let fixture = fixture().with_file("project-run", "file-other", "old.RData");
        let project = ProjectInfo::new("project-run", "002_run650");
        assert_eq!(find_readcount_file(&fixture, &project).unwrap(), "file-rdata");
    }
}
