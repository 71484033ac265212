//! Functionality related to reading run manifests and sample lists.
//!
//! A run manifest (`RunManifest.csv`) lists one sample per line, with the
//! sample name in the first column and the panel code somewhere later on the
//! same line. Header lines and blank lines are tolerated everywhere.

use std::collections::BTreeSet;

use crate::sample::patterns;

/// Collects the unique panel codes mentioned in a manifest.
///
/// Each line contributes at most one panel code: the first case-insensitive
/// `Pan<digits>` match on that line, kept in the casing it was written in.
pub fn extract_pan_numbers(manifest: &str) -> BTreeSet<String> {
    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| patterns::PAN_NUMBER.find(line))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lists the sample names in a manifest, in manifest order.
///
/// Only lines that begin with an `NGS` batch are considered samples; the
/// sample name is everything up to the first comma.
pub fn samples_from_manifest(manifest: &str) -> Vec<String> {
    manifest
        .lines()
        .map(str::trim)
        .filter_map(|line| patterns::MANIFEST_SAMPLE.captures(line))
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lists the sample names in a local sample list.
///
/// One sample per line. Blank lines and lines starting with `#` are ignored,
/// and only the first comma-separated field of each line is kept.
pub fn samples_from_list(list: &str) -> Vec<String> {
    list.lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split(',').next())
        .map(|sample| sample.trim().to_string())
        .collect()
}

/// Finds the panel code a sample was originally sequenced against: the first
/// `Pan<digits>` on the first manifest line that mentions the sample and has
/// a panel code.
pub fn original_pan_for_sample(manifest: &str, sample: &str) -> Option<String> {
    manifest
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && line.contains(sample))
        .find_map(|line| patterns::PAN_NUMBER.find(line))
        .map(|m| m.as_str().to_string())
}

/// Whether `value` is exactly a panel code (`Pan` followed by digits, in any
/// case).
pub fn is_pan_number(value: &str) -> bool {
    patterns::PAN_NUMBER_EXACT.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    static MANIFEST: &str = "\
[Header]
Investigator Name,Lab
Sample_ID,Sample_Name,Description
NGS650FFV06POOL2_01_111111_F_R134_Pan4009_S1,111111,Pan4009
NGS650FFV06POOL2_02_222222_M_R210_Pan5180_S2,222222,Pan5180

NGS650FFV06POOL2_03_333333_NA12878_U_R134_PAN4009_S3,333333,PAN4009
";

    #[test]
    fn test_extract_pan_numbers() {
        let pans = extract_pan_numbers(MANIFEST);
        assert_eq!(
            pans.into_iter().collect::<Vec<_>>(),
            vec!["PAN4009", "Pan4009", "Pan5180"]
        );
    }

    #[test]
    fn test_extract_pan_numbers_keeps_source_casing() {
        let lower = extract_pan_numbers("sample,pan123,x");
        let upper = extract_pan_numbers("sample,PAN123,x");
        assert_eq!(lower, BTreeSet::from(["pan123".to_string()]));
        assert_eq!(upper, BTreeSet::from(["PAN123".to_string()]));
    }

    #[test]
    fn test_extract_pan_numbers_first_match_per_line() {
        let pans = extract_pan_numbers("NGS1_Pan1_S1,Pan2\n");
        assert_eq!(pans, BTreeSet::from(["Pan1".to_string()]));
    }

    #[test]
    fn test_extract_pan_numbers_from_empty_manifest() {
        assert!(extract_pan_numbers("").is_empty());
        assert!(extract_pan_numbers("no panels here\n\n").is_empty());
    }

    #[test]
    fn test_samples_from_manifest() {
        let samples = samples_from_manifest(MANIFEST);
        assert_eq!(
            samples,
            vec![
                "NGS650FFV06POOL2_01_111111_F_R134_Pan4009_S1",
                "NGS650FFV06POOL2_02_222222_M_R210_Pan5180_S2",
                "NGS650FFV06POOL2_03_333333_NA12878_U_R134_PAN4009_S3",
            ]
        );
    }

    #[test]
    fn test_samples_from_list() {
        let list = "# samples for run 650\nNGS1_R134_Pan1,extra\n\n  NGS2_R134_Pan1  \n";
        assert_eq!(samples_from_list(list), vec!["NGS1_R134_Pan1", "NGS2_R134_Pan1"]);
    }

    #[test]
    fn test_original_pan_for_sample() {
        assert_eq!(
            original_pan_for_sample(MANIFEST, "222222"),
            Some("Pan5180".to_string())
        );
        assert_eq!(original_pan_for_sample(MANIFEST, "999999"), None);
    }

    #[test]
    fn test_is_pan_number() {
        assert!(is_pan_number("Pan1234"));
        assert!(is_pan_number("pan1234"));
        assert!(!is_pan_number("Pan"));
        assert!(!is_pan_number("Pan12x"));
        assert!(!is_pan_number("XPan12"));
    }
}
