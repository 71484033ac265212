//! Derivation of per-sample and per-panel command parameters.
//!
//! Resolution is a pure function of the sample metadata, the configuration
//! and a handful of static rules:
//!
//! * PRS analysis runs only for `R134` samples.
//! * PolyEdge analysis of the MSH2 poly-A tract runs only for `R210` and
//!   `R211` samples.
//! * VCF evaluation runs only for the NA12878 control.
//! * CNV calling runs only for panels whose table entry names a CNV BED file.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Config, Panels};
use crate::sample::name::{SampleMetadata, SampleRejection};

/// The run for which polygenic risk scoring is enabled.
pub const PRS_RUN: &str = "R134";

/// The runs for which PolyEdge analysis is enabled.
pub const POLYEDGE_RUNS: [&str; 2] = ["R210", "R211"];

/// The fixed PolyEdge region: the MSH2 poly-A tract.
pub const MSH2_POLYEDGE: PolyEdge = PolyEdge {
    gene: "MSH2",
    chrom: 2,
    poly_start: 47641559,
    poly_end: 47641586,
};

/// Errors raised while resolving parameters.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ResolveError {
    /// The panel code is absent from the panel table.
    #[error("Pan number {0} not found in panel configuration")]
    ConfigurationMissing(String),
}

/// The region inspected by PolyEdge.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PolyEdge {
    /// Gene symbol.
    pub gene: &'static str,
    /// Chromosome number.
    pub chrom: u8,
    /// Start of the homopolymer.
    pub poly_start: u64,
    /// End of the homopolymer.
    pub poly_end: u64,
}

/// Parameters for a single sample's workflow command.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedParameters {
    /// BED file used for variant calling.
    pub variant_bed: String,

    /// BED file used for coverage reporting.
    pub coverage_bed: String,

    /// Whether polygenic risk scoring runs.
    pub prs_enabled: bool,

    /// Whether PolyEdge runs.
    pub polyedge_enabled: bool,

    /// The PolyEdge region, present iff `polyedge_enabled`.
    pub polyedge_fields: Option<PolyEdge>,

    /// Whether VCF evaluation against the control truth set runs.
    pub cnv_eval_enabled: bool,

    /// The CNV BED file for the sample's panel. An unconfigured panel is an
    /// error here and nowhere else: the workflow command does not use it.
    #[serde(skip)]
    pub cnv_bed: Result<Option<String>, ResolveError>,
}

/// Resolves the CNV BED file for a panel.
///
/// * A panel absent from the table is a configuration error.
/// * A panel without a CNV BED file resolves to `None`: CNV calling is
///   skipped for that panel only.
/// * Otherwise the BED file is `<project>:/Data/BED/<stem>_CNV.bed`.
pub fn cnv_bedfile(
    pan: &str,
    panels: &Panels,
    common_data_project: &str,
) -> Result<Option<String>, ResolveError> {
    let entry = panels
        .get(pan)
        .ok_or_else(|| ResolveError::ConfigurationMissing(pan.to_string()))?;

    match &entry.cnv_bedfile {
        Some(stem) => Ok(Some(format!(
            "{}:/Data/BED/{}_CNV.bed",
            common_data_project, stem
        ))),
        None => {
            info!(
                "Pan number {} found but has no CNV bedfile configured - skipping CNV analysis",
                pan
            );
            Ok(None)
        }
    }
}

/// Resolves the workflow parameters for a sample.
///
/// The rule flags depend only on the sample metadata. A sample without a
/// panel code has no CNV BED file.
pub fn resolve(sample: &SampleMetadata, config: &Config) -> ResolvedParameters {
    let run_number = sample.run_number.as_deref();
    let prs_enabled = run_number == Some(PRS_RUN);
    let polyedge_enabled = run_number.map_or(false, |run| POLYEDGE_RUNS.contains(&run));

    let cnv_bed = match sample.panel_code.as_deref() {
        Some(pan) => cnv_bedfile(pan, &config.panels, &config.common_data_project),
        None => Ok(None),
    };

    ResolvedParameters {
        variant_bed: config.bed_path(&config.workflow.variant_bed),
        coverage_bed: config.bed_path(&config.workflow.coverage_bed),
        prs_enabled,
        polyedge_enabled,
        polyedge_fields: polyedge_enabled.then_some(MSH2_POLYEDGE),
        cnv_eval_enabled: sample.is_control,
        cnv_bed,
    }
}

/// The result of preparing a batch of samples.
#[derive(Debug, Default)]
pub struct Batch {
    /// Samples ready for command generation, in input order.
    pub accepted: Vec<(SampleMetadata, ResolvedParameters)>,

    /// Samples that failed one or more checks, in input order.
    pub rejected: Vec<SampleRejection>,
}

/// Extracts and resolves a single sample.
pub fn prepare_sample(
    name: &str,
    config: &Config,
) -> Result<(SampleMetadata, ResolvedParameters), SampleRejection> {
    let metadata = crate::sample::name::extract_run_info(name)?;
    let params = resolve(&metadata, config);
    if let Err(err) = &params.cnv_bed {
        warn!("{}: {}", name, err);
    }

    debug!("Resolved {}: {:?}", name, params);
    Ok((metadata, params))
}

/// Prepares every sample in order. A rejected sample never stops the
/// remaining samples from being prepared.
pub fn prepare_batch<I, S>(samples: I, config: &Config) -> Batch
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut batch = Batch::default();

    for sample in samples {
        match prepare_sample(sample.as_ref(), config) {
            Ok(prepared) => batch.accepted.push(prepared),
            Err(rejection) => batch.rejected.push(rejection),
        }
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TEST_CONFIG;
    use crate::sample::name::{extract_run_info, FailureReason};

    fn config() -> Config {
        TEST_CONFIG.parse().unwrap()
    }

    #[test]
    fn test_prs_enabled_only_for_r134() {
        let config = config();

        let sample = extract_run_info("NGS001_R134_Pan4009").unwrap();
        let params = resolve(&sample, &config);
        assert!(params.prs_enabled);
        assert!(!params.polyedge_enabled);

        let sample = extract_run_info("NGS001_R1345_Pan4009").unwrap();
        assert!(!resolve(&sample, &config).prs_enabled);

        let sample = extract_run_info("NGS001_SingletonWES_Pan4009").unwrap();
        assert!(!resolve(&sample, &config).prs_enabled);
    }

    #[test]
    fn test_flags_do_not_depend_on_panel_table() {
        let config = config();

        let sample = extract_run_info("NGS001_R134_Pan999").unwrap();
        let params = resolve(&sample, &config);
        assert!(params.prs_enabled);
        assert!(!params.polyedge_enabled);
        assert_eq!(
            params.cnv_bed,
            Err(ResolveError::ConfigurationMissing("Pan999".to_string()))
        );

        let sample = extract_run_info("NGS001_SingletonWES_Pan999").unwrap();
        assert_eq!(sample.run_number.as_deref(), Some("WES"));
        assert!(!resolve(&sample, &config).prs_enabled);
    }

    #[test]
    fn test_polyedge_for_r210_and_r211() {
        let config = config();

        for name in ["NGS001_R210_Pan4009", "NGS001_R211_Pan4009"] {
            let sample = extract_run_info(name).unwrap();
            let params = resolve(&sample, &config);
            assert!(params.polyedge_enabled);
            assert_eq!(params.polyedge_fields, Some(MSH2_POLYEDGE));
        }

        let sample = extract_run_info("NGS001_R210.1_Pan4009").unwrap();
        let params = resolve(&sample, &config);
        assert!(!params.polyedge_enabled);
        assert_eq!(params.polyedge_fields, None);
    }

    #[test]
    fn test_cnv_eval_for_control_sample() {
        let config = config();
        let sample = extract_run_info("NGS001_NA12878_R134_Pan4009").unwrap();
        let params = resolve(&sample, &config);
        assert!(params.cnv_eval_enabled);
        assert_eq!(
            params.variant_bed,
            "project-common:/Data/BED/Pan5272_data.bed"
        );
        assert_eq!(
            params.coverage_bed,
            "project-common:/Data/BED/Pan5272_sambamba.bed"
        );
        assert_eq!(
            params.cnv_bed,
            Ok(Some("project-common:/Data/BED/Pan4009_CNV.bed".to_string()))
        );
    }

    #[test]
    fn test_cnv_bedfile_states() {
        let config = config();
        assert_eq!(
            cnv_bedfile("Pan4009", &config.panels, "project-common"),
            Ok(Some("project-common:/Data/BED/Pan4009_CNV.bed".to_string()))
        );
        assert_eq!(cnv_bedfile("Pan5180", &config.panels, "project-common"), Ok(None));
        assert_eq!(
            cnv_bedfile("Pan9999", &config.panels, "project-common"),
            Err(ResolveError::ConfigurationMissing("Pan9999".to_string()))
        );
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let config = config();
        let sample = extract_run_info("NGS001_R211_Pan5208").unwrap();
        assert_eq!(resolve(&sample, &config), resolve(&sample, &config));
    }

    #[test]
    fn test_batch_continues_after_rejection() {
        let config = config();
        let batch = prepare_batch(
            [
                "NGS001_R134_Pan4009",
                "garbage_no_markers",
                "NGS001_R134_Pan9999",
                "NGS002_R210_Pan5180",
            ],
            &config,
        );

        let accepted: Vec<&str> = batch
            .accepted
            .iter()
            .map(|(sample, _)| sample.name.as_str())
            .collect();
        assert_eq!(
            accepted,
            vec!["NGS001_R134_Pan4009", "NGS001_R134_Pan9999", "NGS002_R210_Pan5180"]
        );

        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].sample, "garbage_no_markers");
        assert_eq!(
            batch.rejected[0].reasons,
            vec![
                FailureReason::MissingRunNumber("garbage_no_markers".into()),
                FailureReason::MissingPanCode("garbage_no_markers".into()),
                FailureReason::MissingBatch("garbage_no_markers".into()),
            ]
        );
    }
}
