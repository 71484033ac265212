//! Functionality related to parsing sample names.
//!
//! Sample names follow the laboratory's convention of joining the batch, the
//! run number and the panel code with underscores, for example
//! `NGS650FFV06POOL2_02_123456_NA12878_U_R134_Pan4009_S2`. The fields can
//! appear in any order; each one is located independently.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::sample::patterns;

/// The run number used for whole exome samples, which carry no `R` number.
pub const WHOLE_EXOME_RUN: &str = "WES";

/// The reference sample that marks a sample as a run control.
pub const CONTROL_SAMPLE: &str = "NA12878";

/// Metadata derived from a sample name.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SampleMetadata {
    /// The sample name the metadata was derived from.
    pub name: String,

    /// The run number (e.g. `R134`), or [`WHOLE_EXOME_RUN`].
    pub run_number: Option<String>,

    /// The panel code (e.g. `Pan4009`), in the casing of the sample name.
    pub panel_code: Option<String>,

    /// The sequencing batch (e.g. `NGS650FFV06POOL2`).
    pub batch: Option<String>,

    /// Whether the sample is the NA12878 control.
    pub is_control: bool,
}

impl SampleMetadata {
    /// Locates every field in `name` without judging whether the sample is
    /// usable. Use [`extract_run_info`] to reject incomplete samples.
    pub fn inspect(name: &str) -> Self {
        let run_number = patterns::RUN_NUMBER
            .find(name)
            .map(|m| m.as_str().to_string())
            .or_else(|| {
                patterns::WHOLE_EXOME
                    .is_match(name)
                    .then(|| WHOLE_EXOME_RUN.to_string())
            });

        let panel_code = patterns::PAN_NUMBER
            .find(name)
            .map(|m| m.as_str().to_string());

        let batch = patterns::BATCH
            .captures(name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        SampleMetadata {
            name: name.to_string(),
            run_number,
            panel_code,
            batch,
            is_control: name.contains(CONTROL_SAMPLE),
        }
    }

    /// Whether the run number was supplied by the whole exome fallback.
    pub fn is_whole_exome(&self) -> bool {
        self.run_number.as_deref() == Some(WHOLE_EXOME_RUN)
    }
}

impl FromStr for SampleMetadata {
    type Err = SampleRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        extract_run_info(s)
    }
}

/// Why a sample cannot have a command generated for it.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FailureReason {
    /// Neither an `R` number nor a whole exome marker was found.
    #[error(
        "Could not extract R number from sample name: {0}. \
        Expected format: *R[number]* or *SingletonWES* or *WES*."
    )]
    MissingRunNumber(String),

    /// No `Pan` number was found.
    #[error("Could not extract Pan code from sample name: {0}. Expected format: *Pan[number]*.")]
    MissingPanCode(String),

    /// No `NGS` batch was found.
    #[error("Could not detect batch information (starting with NGS) from sample name '{0}'.")]
    MissingBatch(String),
}

/// A sample that failed one or more checks. Every failing check is kept so
/// the full diagnostic is available in a single failures log row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SampleRejection {
    /// The rejected sample name.
    pub sample: String,

    /// Every reason the sample was rejected, in check order. Never empty.
    pub reasons: Vec<FailureReason>,
}

impl SampleRejection {
    /// All reasons joined into one human-readable message.
    pub fn reason(&self) -> String {
        self.reasons.iter().join("; ")
    }
}

impl fmt::Display for SampleRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}

impl std::error::Error for SampleRejection {}

/// Extracts the run number, panel code and batch from a sample name.
///
/// The run number is the first `R<digits>[.<digits>]` in the name. When no
/// such token exists, names mentioning `SingletonWES` or `WES` (in any case)
/// are given the run number [`WHOLE_EXOME_RUN`]. The panel code is the first
/// `Pan<digits>` (in any case) and the batch is the first `NGS<digits>` token
/// up to the next underscore.
///
/// All three checks are always evaluated; a sample missing any of the fields
/// is rejected with one reason per missing field.
pub fn extract_run_info(name: &str) -> Result<SampleMetadata, SampleRejection> {
    let metadata = SampleMetadata::inspect(name);
    let mut reasons = Vec::new();

    if metadata.run_number.is_none() {
        reasons.push(FailureReason::MissingRunNumber(name.to_string()));
    }
    if metadata.panel_code.is_none() {
        reasons.push(FailureReason::MissingPanCode(name.to_string()));
    }
    if metadata.batch.is_none() {
        reasons.push(FailureReason::MissingBatch(name.to_string()));
    }

    match reasons.is_empty() {
        true => Ok(metadata),
        false => Err(SampleRejection {
            sample: name.to_string(),
            reasons,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_parse_standard_sample_name() {
        let result = "NGS650FFV06POOL2_02_123456_NA12878_U_R134_Pan4009_S2".parse::<SampleMetadata>();
        assert!(result.is_ok());

        let sample = result.unwrap();
        assert_eq!(sample.run_number, Some("R134".into()));
        assert_eq!(sample.panel_code, Some("Pan4009".into()));
        assert_eq!(sample.batch, Some("NGS650FFV06POOL2".into()));
        assert!(sample.is_control);
        assert!(!sample.is_whole_exome());
    }

    #[test]
    pub fn test_parse_run_number_with_subversion() {
        let sample = extract_run_info("NGS700_01_654321_F_R210.1_Pan5180_S7").unwrap();
        assert_eq!(sample.run_number, Some("R210.1".into()));
        assert_eq!(sample.batch, Some("NGS700".into()));
        assert!(!sample.is_control);
    }

    #[test]
    pub fn test_whole_exome_fallback() {
        let sample = extract_run_info("NGS001_SingletonWES_Pan999").unwrap();
        assert_eq!(sample.run_number, Some("WES".into()));
        assert!(sample.is_whole_exome());
        assert_eq!(sample.panel_code, Some("Pan999".into()));
        assert_eq!(sample.batch, Some("NGS001".into()));

        let sample = extract_run_info("NGS002_wes_pan12").unwrap();
        assert_eq!(sample.run_number, Some("WES".into()));
        assert_eq!(sample.panel_code, Some("pan12".into()));
    }

    #[test]
    pub fn test_run_number_takes_priority_over_whole_exome() {
        let sample = extract_run_info("NGS001_WES_R134_Pan999").unwrap();
        assert_eq!(sample.run_number, Some("R134".into()));
    }

    #[test]
    pub fn test_control_flag_is_case_sensitive() {
        let sample = SampleMetadata::inspect("NGS001_na12878_R134_Pan1");
        assert!(!sample.is_control);
    }

    #[test]
    pub fn test_every_missing_field_is_reported() {
        let rejection = extract_run_info("garbage_no_markers").unwrap_err();
        assert_eq!(rejection.sample, "garbage_no_markers");
        assert_eq!(
            rejection.reasons,
            vec![
                FailureReason::MissingRunNumber("garbage_no_markers".into()),
                FailureReason::MissingPanCode("garbage_no_markers".into()),
                FailureReason::MissingBatch("garbage_no_markers".into()),
            ]
        );
        assert_eq!(rejection.reason().matches("; ").count(), 2);
    }

    #[test]
    pub fn test_single_missing_field() {
        let rejection = extract_run_info("NGS001_R134_S1").unwrap_err();
        assert_eq!(
            rejection.reasons,
            vec![FailureReason::MissingPanCode("NGS001_R134_S1".into())]
        );
    }
}
