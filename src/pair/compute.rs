//! Reconciles two remote file listings into ordered pairs.
//!
//! Files are paired by their _base name_: the file name with a known suffix
//! removed. For instance, `S1markdup.bam` and `S1markdup.bam.bai` share the
//! base name `S1markdup` once `.bam` and `.bam.bai` are stripped from each
//! respectively. Mates whose names differ in the middle (such as R1/R2 FASTQ
//! files) are first normalized with a name transform so that both sides
//! collapse onto the same base name.

use std::collections::BTreeMap;
use std::fmt;

use num_format::{Locale, ToFormattedString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A single file entry from the platform's data catalog.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FileRecord {
    /// The opaque platform identifier of the file (e.g. `file-xxxx`).
    pub id: String,

    /// The name of the file, without the folder it lives in.
    pub display_name: String,
}

impl FileRecord {
    /// Creates a new [`FileRecord`].
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        FileRecord {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Which side of a pairing a listing belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Side {
    /// The listing that drives the output order.
    Primary,

    /// The listing that is matched against the primary listing.
    Secondary,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Primary => write!(f, "primary"),
            Side::Secondary => write!(f, "secondary"),
        }
    }
}

/// Base names mapped to the file id they were derived from. Iteration order
/// is ascending by base name.
pub type FileSet = BTreeMap<String, String>;

/// A function that normalizes a file name before its suffix is checked.
pub type NameTransform<'a> = &'a dyn Fn(&str) -> String;

/// The outcome of pairing two listings.
#[derive(Debug, Default, Eq, PartialEq, Serialize)]
pub struct PairResult {
    /// `(primary_id, secondary_id)` pairs ordered by ascending base name.
    pub matched: Vec<(String, String)>,

    /// Primary files with no secondary counterpart.
    pub unpaired_primary_count: usize,

    /// Secondary files with no primary counterpart.
    pub orphaned_secondary_count: usize,

    /// Primary files excluded because their name did not end with the
    /// expected suffix.
    pub skipped_primary_count: usize,

    /// Secondary files excluded because their name did not end with the
    /// expected suffix.
    pub skipped_secondary_count: usize,
}

/// Maps both `_R1.` and `_R2.` onto the shared placeholder `_R#.` so that
/// the two mates of a FASTQ pair end up with the same base name.
///
/// ```
/// use runcmd::pair::compute::fastq_mate_transform;
///
/// assert_eq!(fastq_mate_transform("S1_L001_R2.fastq.gz"), "S1_L001_R#.fastq.gz");
/// ```
pub fn fastq_mate_transform(name: &str) -> String {
    name.replace("_R1.", "_R#.").replace("_R2.", "_R#.")
}

/// Builds the [`FileSet`] for one side of a pairing. Returns the set along
/// with the number of entries that were excluded because their (transformed)
/// name did not end with the (transformed) suffix.
///
/// If two entries share a base name, the later entry wins.
pub fn file_set(
    entries: &[FileRecord],
    suffix: &str,
    transform: Option<NameTransform<'_>>,
    side: Side,
) -> (FileSet, usize) {
    let suffix = match transform {
        Some(f) => f(suffix),
        None => suffix.to_string(),
    };

    let mut files = FileSet::new();
    let mut skipped = 0;

    for entry in entries {
        let name = match transform {
            Some(f) => f(&entry.display_name),
            None => entry.display_name.clone(),
        };

        match name.strip_suffix(suffix.as_str()) {
            Some(base_name) => {
                if let Some(previous) = files.insert(base_name.to_string(), entry.id.clone()) {
                    debug!(
                        "{} base name '{}' seen twice, replacing {} with {}.",
                        side, base_name, previous, entry.id
                    );
                }
            }
            None => {
                warn!(
                    "{} file '{}' (ID: {}) did not end with '{}'. Skipping.",
                    side, name, entry.id, suffix
                );
                skipped += 1;
            }
        }
    }

    (files, skipped)
}

/// Pairs `primary` files with `secondary` files that share a base name.
///
/// Pairing never fails: files without a counterpart on the other side are
/// counted and reported, and files that do not carry the expected suffix are
/// excluded from consideration altogether.
///
/// # Arguments
///
/// * `primary`: The listing that drives the output order.
/// * `primary_suffix`: The suffix stripped from primary names.
/// * `secondary`: The listing matched against the primary listing.
/// * `secondary_suffix`: The suffix stripped from secondary names.
/// * `transform`: An optional normalization applied to every name and to
///   both suffixes before comparison.
pub fn pair(
    primary: &[FileRecord],
    primary_suffix: &str,
    secondary: &[FileRecord],
    secondary_suffix: &str,
    transform: Option<NameTransform<'_>>,
) -> PairResult {
    let (primary_files, skipped_primary_count) =
        file_set(primary, primary_suffix, transform, Side::Primary);
    let (secondary_files, skipped_secondary_count) =
        file_set(secondary, secondary_suffix, transform, Side::Secondary);

    info!(
        "Identified {} unique primary base names for pairing.",
        primary_files.len().to_formatted_string(&Locale::en)
    );
    info!(
        "Identified {} unique secondary base names for pairing.",
        secondary_files.len().to_formatted_string(&Locale::en)
    );

    let mut result = PairResult {
        skipped_primary_count,
        skipped_secondary_count,
        ..Default::default()
    };

    for (base_name, primary_id) in &primary_files {
        match secondary_files.get(base_name) {
            Some(secondary_id) => result
                .matched
                .push((primary_id.clone(), secondary_id.clone())),
            None => {
                warn!(
                    "Primary file for base '{}' (ID: {}) has no corresponding secondary file.",
                    base_name, primary_id
                );
                result.unpaired_primary_count += 1;
            }
        }
    }

    for (base_name, secondary_id) in &secondary_files {
        if !primary_files.contains_key(base_name) {
            warn!(
                "Secondary file for base '{}' (ID: {}) has no corresponding primary file.",
                base_name, secondary_id
            );
            result.orphaned_secondary_count += 1;
        }
    }

    info!(
        "Found {} pairs.",
        result.matched.len().to_formatted_string(&Locale::en)
    );
    if result.unpaired_primary_count > 0 {
        info!(
            "{} primary files did not have a matching secondary file.",
            result.unpaired_primary_count
        );
    }
    if result.orphaned_secondary_count > 0 {
        info!(
            "{} secondary files did not have a matching primary file.",
            result.orphaned_secondary_count
        );
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(entries: &[(&str, &str)]) -> Vec<FileRecord> {
        entries
            .iter()
            .map(|(id, name)| FileRecord::new(*id, *name))
            .collect()
    }

    fn pair_ids(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_bam_bai_pairing() {
        let bams = records(&[("f1", "S1markdup.bam")]);
        let bais = records(&[("f2", "S1markdup.bam.bai")]);

        let result = pair(&bams, ".bam", &bais, ".bam.bai", None);
        assert_eq!(result.matched, pair_ids(&[("f1", "f2")]));
        assert_eq!(result.unpaired_primary_count, 0);
        assert_eq!(result.orphaned_secondary_count, 0);
    }

    #[test]
    fn test_lone_read_one_is_unpaired() {
        let r1 = records(&[("f1", "A_R1.fastq.gz")]);

        let result = pair(
            &r1,
            "_R1.fastq.gz",
            &[],
            "_R2.fastq.gz",
            Some(&fastq_mate_transform),
        );
        assert!(result.matched.is_empty());
        assert_eq!(result.unpaired_primary_count, 1);
        assert_eq!(result.orphaned_secondary_count, 0);
        assert_eq!(result.skipped_primary_count, 0);
    }

    #[test]
    fn test_fastq_mates_pair_through_transform() {
        let r1 = records(&[
            ("r1-b", "B_S2_L001_R1.fastq.gz"),
            ("r1-a", "A_S1_L001_R1.fastq.gz"),
        ]);
        let r2 = records(&[
            ("r2-a", "A_S1_L001_R2.fastq.gz"),
            ("r2-b", "B_S2_L001_R2.fastq.gz"),
            ("r2-c", "C_S3_L001_R2.fastq.gz"),
        ]);

        let result = pair(
            &r1,
            "_R1.fastq.gz",
            &r2,
            "_R2.fastq.gz",
            Some(&fastq_mate_transform),
        );
        assert_eq!(result.matched, pair_ids(&[("r1-a", "r2-a"), ("r1-b", "r2-b")]));
        assert_eq!(result.unpaired_primary_count, 0);
        assert_eq!(result.orphaned_secondary_count, 1);
    }

    #[test]
    fn test_empty_listings() {
        let result = pair(&[], ".bam", &[], ".bam.bai", None);
        assert_eq!(result, PairResult::default());
    }

    #[test]
    fn test_suffix_mismatch_is_skipped_not_unpaired() {
        let bams = records(&[("f1", "S1markdup.bam"), ("f3", "S2markdup.cram")]);
        let bais = records(&[("f2", "S1markdup.bam.bai"), ("f4", "S2markdup.crai")]);

        let result = pair(&bams, ".bam", &bais, ".bam.bai", None);
        assert_eq!(result.matched, pair_ids(&[("f1", "f2")]));
        assert_eq!(result.unpaired_primary_count, 0);
        assert_eq!(result.orphaned_secondary_count, 0);
        assert_eq!(result.skipped_primary_count, 1);
        assert_eq!(result.skipped_secondary_count, 1);
    }

    #[test]
    fn test_duplicate_base_name_keeps_later_entry() {
        let bams = records(&[("old", "S1markdup.bam"), ("new", "S1markdup.bam")]);
        let bais = records(&[("idx", "S1markdup.bam.bai")]);

        let result = pair(&bams, ".bam", &bais, ".bam.bai", None);
        assert_eq!(result.matched, pair_ids(&[("new", "idx")]));
    }

    #[test]
    fn test_matched_is_sorted_by_base_name_and_repeatable() {
        let bams = records(&[
            ("c", "Cmarkdup.bam"),
            ("a", "Amarkdup.bam"),
            ("b", "Bmarkdup.bam"),
        ]);
        let bais = records(&[
            ("bi", "Bmarkdup.bam.bai"),
            ("ci", "Cmarkdup.bam.bai"),
            ("ai", "Amarkdup.bam.bai"),
        ]);

        let first = pair(&bams, ".bam", &bais, ".bam.bai", None);
        let second = pair(&bams, ".bam", &bais, ".bam.bai", None);
        assert_eq!(first.matched, pair_ids(&[("a", "ai"), ("b", "bi"), ("c", "ci")]));
        assert_eq!(first, second);
    }

    #[test]
    fn test_matched_plus_unpaired_covers_every_suffixed_primary() {
        let bams = records(&[
            ("a", "Amarkdup.bam"),
            ("b", "Bmarkdup.bam"),
            ("c", "Cmarkdup.bam"),
            ("x", "notes.txt"),
        ]);
        let bais = records(&[("ai", "Amarkdup.bam.bai"), ("zi", "Zmarkdup.bam.bai")]);

        let result = pair(&bams, ".bam", &bais, ".bam.bai", None);
        assert_eq!(result.matched.len() + result.unpaired_primary_count, 3);
        assert_eq!(result.unpaired_primary_count, 2);
        assert_eq!(result.orphaned_secondary_count, 1);
    }

    #[test]
    fn test_swapping_roles_swaps_counts() {
        let bams = records(&[("a", "Amarkdup.bam"), ("b", "Bmarkdup.bam")]);
        let bais = records(&[
            ("bi", "Bmarkdup.bam.bai"),
            ("ci", "Cmarkdup.bam.bai"),
            ("di", "Dmarkdup.bam.bai"),
        ]);

        let forward = pair(&bams, ".bam", &bais, ".bam.bai", None);
        let backward = pair(&bais, ".bam.bai", &bams, ".bam", None);
        assert_eq!(
            forward.unpaired_primary_count,
            backward.orphaned_secondary_count
        );
        assert_eq!(
            forward.orphaned_secondary_count,
            backward.unpaired_primary_count
        );
        assert_eq!(forward.unpaired_primary_count, 1);
        assert_eq!(forward.orphaned_secondary_count, 2);
    }

    #[test]
    fn test_identity_transform_matches_no_transform() {
        let bams = records(&[("a", "Amarkdup.bam"), ("b", "Bmarkdup.bam")]);
        let bais = records(&[("ai", "Amarkdup.bam.bai"), ("ci", "Cmarkdup.bam.bai")]);
        let identity = |name: &str| name.to_string();

        assert_eq!(
            pair(&bams, ".bam", &bais, ".bam.bai", Some(&identity)),
            pair(&bams, ".bam", &bais, ".bam.bai", None)
        );
    }
}
