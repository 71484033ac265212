//! Functionality related to pairing files, and the `runcmd pair` subcommand.

pub mod command;
pub mod compute;

use tracing::info;

use crate::platform::{Platform, PlatformError};
use compute::{NameTransform, PairResult};

/// How to find and pair two kinds of file in a project.
#[derive(Clone, Copy)]
pub struct PairSpec<'a> {
    /// Name glob for the primary files.
    pub primary_pattern: &'a str,

    /// Suffix stripped from primary names.
    pub primary_suffix: &'a str,

    /// Name glob for the secondary files.
    pub secondary_pattern: &'a str,

    /// Suffix stripped from secondary names.
    pub secondary_suffix: &'a str,

    /// Normalization applied to names and suffixes before comparison.
    pub transform: Option<NameTransform<'a>>,
}

/// Duplicate-marked BAMs and their indexes.
pub const BAM_BAI: PairSpec<'static> = PairSpec {
    primary_pattern: "*markdup.bam",
    primary_suffix: ".bam",
    secondary_pattern: "*markdup.bam.bai",
    secondary_suffix: ".bam.bai",
    transform: None,
};

/// R1 and R2 FASTQ mates.
pub const FASTQ_MATES: PairSpec<'static> = PairSpec {
    primary_pattern: "*_R1.fastq.gz",
    primary_suffix: "_R1.fastq.gz",
    secondary_pattern: "*_R2.fastq.gz",
    secondary_suffix: "_R2.fastq.gz",
    transform: Some(&compute::fastq_mate_transform),
};

/// Lists both kinds of file in `project` and pairs them.
pub fn find_pairs<P: Platform>(
    platform: &P,
    project: &str,
    spec: &PairSpec<'_>,
) -> Result<PairResult, PlatformError> {
    let primary = platform.find_files(project, spec.primary_pattern)?;
    info!(
        "Processing {} items from '{}' query.",
        primary.len(),
        spec.primary_pattern
    );

    let secondary = platform.find_files(project, spec.secondary_pattern)?;
    info!(
        "Processing {} items from '{}' query.",
        secondary.len(),
        spec.secondary_pattern
    );

    Ok(compute::pair(
        &primary,
        spec.primary_suffix,
        &secondary,
        spec.secondary_suffix,
        spec.transform,
    ))
}
