//! Builders for the `dx run` commands written by each stage.
//!
//! Every builder returns a single line. Values that can contain characters
//! meaningful to the shell are double quoted; values the tool controls (IDs,
//! booleans, numbers) are written bare.

use std::fmt;

use crate::config::{Config, PicardConfig};
use crate::platform::ProjectInfo;
use crate::resolve::ResolvedParameters;

//========================//
// Workflow stage IDs     //
//========================//

/// Stage that checks the FASTQ reads.
pub const READS_STAGE: &str = "Ff0P5Jj0GYKY717pKX3vX8Z3";

/// Sentieon alignment and variant calling stage.
pub const SENTIEON_STAGE: &str = "Ff0P73j0GYKX41VkF3j62F9j";

/// Stage taking the variant calling BED file.
pub const BEDFILE_STAGE: &str = "G77VfJ803JGy589J21p7Jkqj";

/// Hybridisation capture metrics stage.
pub const CAPTURE_STAGE: &str = "Ff0P5pQ0GYKVBB0g1FG27BV8";

/// Coverage reporting stage.
pub const COVERAGE_STAGE: &str = "Ff0P82Q0GYKQ4j8b4gXzjqxX";

/// VCF evaluation against the NA12878 truth set.
pub const VCF_EVAL_STAGE: &str = "GK8G6p803JGx48f74jf16Kjx";

/// Polygenic risk scoring stage.
pub const PRS_STAGE: &str = "GK8G6k003JGx48f74jf16Kjv";

/// PolyEdge homopolymer analysis stage.
pub const POLYEDGE_STAGE: &str = "GK8G6kj03JGyVGvk2Q44KQG1";

/// The instance type the read count job runs on.
pub const READCOUNT_INSTANCE_TYPE: &str = "mem1_ssd1_v2_x36";

/// Wraps a value in double quotes.
pub fn quoted(value: impl fmt::Display) -> String {
    format!("\"{}\"", value)
}

/// A `dx run` command line under construction.
#[derive(Clone, Debug)]
pub struct DxRun {
    parts: Vec<String>,
}

impl DxRun {
    /// Creates a new [`DxRun`] running `executable`.
    pub fn new(executable: &str) -> Self {
        DxRun {
            parts: vec![String::from("dx run"), executable.to_string()],
        }
    }

    /// Appends a raw argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.parts.push(arg.into());
        self
    }

    /// Appends an executable input: `-i<name>=<value>`.
    pub fn input(self, name: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("-i{}={}", name, value))
    }

    /// Appends a workflow stage input: `-istage-<stage>.<name>=<value>`.
    pub fn stage_input(self, stage: &str, name: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("-istage-{}.{}={}", stage, name, value))
    }
}

impl fmt::Display for DxRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(" "))
    }
}

/// The alignment and variant calling workflow for one sample. FASTQ paths
/// are given relative to `${PROJECT_ID}` and `${PROJECT_NAME}` so the script
/// header decides where they are read from.
pub fn workflow(workflow: &str, sample: &str, params: &ResolvedParameters) -> String {
    let fastq = |read: &str| {
        quoted(format!(
            "${{PROJECT_ID}}:/${{PROJECT_NAME}}/Samples/{}_{}.fastq.gz",
            sample, read
        ))
    };

    let mut run = DxRun::new(workflow)
        .arg("--priority high -y")
        .arg(format!("--name {}", quoted(sample)))
        .stage_input(READS_STAGE, "reads", fastq("R1"))
        .stage_input(READS_STAGE, "reads", fastq("R2"))
        .stage_input(SENTIEON_STAGE, "reads_fastqgzs", fastq("R1"))
        .stage_input(SENTIEON_STAGE, "reads2_fastqgzs", fastq("R2"))
        .stage_input(SENTIEON_STAGE, "output_metrics", true)
        .stage_input(SENTIEON_STAGE, "germline_algo", "Haplotyper")
        .stage_input(SENTIEON_STAGE, "sample", quoted(sample))
        .stage_input(SENTIEON_STAGE, "output_gvcf", true)
        .stage_input(
            SENTIEON_STAGE,
            "gvcftyper_algo_options",
            "'--genotype_model multinomial'",
        )
        .stage_input(BEDFILE_STAGE, "bedfile", quoted(&params.variant_bed))
        .stage_input(CAPTURE_STAGE, "Capture_panel", "Hybridisation")
        .stage_input(
            CAPTURE_STAGE,
            "vendor_exome_bedfile",
            quoted(&params.variant_bed),
        )
        .stage_input(COVERAGE_STAGE, "coverage_level", 30)
        .stage_input(COVERAGE_STAGE, "sambamba_bed", quoted(&params.coverage_bed))
        .stage_input(VCF_EVAL_STAGE, "skip", !params.cnv_eval_enabled)
        .stage_input(VCF_EVAL_STAGE, "prefix", quoted(sample))
        .stage_input(VCF_EVAL_STAGE, "panel_bed", quoted(&params.variant_bed))
        .stage_input(PRS_STAGE, "skip", !params.prs_enabled);

    if let Some(polyedge) = &params.polyedge_fields {
        run = run
            .stage_input(POLYEDGE_STAGE, "gene", polyedge.gene)
            .stage_input(POLYEDGE_STAGE, "chrom", polyedge.chrom)
            .stage_input(POLYEDGE_STAGE, "poly_start", polyedge.poly_start)
            .stage_input(POLYEDGE_STAGE, "poly_end", polyedge.poly_end)
            .stage_input(POLYEDGE_STAGE, "skip", false);
    }

    run.arg("--dest=\"${PROJECT_ID}\" --brief --auth \"${AUTH_TOKEN}\" -y")
        .to_string()
}

/// Sambamba coverage for one BAM/BAI pair.
pub fn coverage(config: &Config, bam: &str, bai: &str, project_id: &str) -> String {
    DxRun::new(&config.applets.coverage)
        .input("coverage_level", 30)
        .input("bamfile", bam)
        .input("bam_index", bai)
        .input("min_base_qual", 10)
        .input("min_mapping_qual", 20)
        .input(
            "additional_filter_commands",
            quoted("not (unmapped or secondary_alignment)"),
        )
        .input("exclude_duplicate_reads", true)
        .input("exclude_failed_quality_control", true)
        .input("merge_overlapping_mate_reads", true)
        .input("sambamba_bed", &config.coverage.sambamba_bed)
        .arg(format!("--dest {} -y", project_id))
        .to_string()
}

/// Picard QC metrics for one sorted BAM.
pub fn picard(applet: &str, picard: &PicardConfig, bam: &str, project_id: &str) -> String {
    DxRun::new(applet)
        .input("sorted_bam", bam)
        .input("fasta_index", &picard.fasta_index)
        .input("vendor_exome_bedfile", &picard.vendor_exome_bedfile)
        .input("Capture_panel", quoted("Hybridisation"))
        .arg(format!("--dest {} -y", project_id))
        .to_string()
}

/// FastQC for one pair of mates.
pub fn fastqc(applet: &str, r1: &str, r2: &str, project_id: &str) -> String {
    DxRun::new(applet)
        .input("reads", r1)
        .input("reads", r2)
        .arg(format!("--dest {} -y", project_id))
        .to_string()
}

/// An ExomeDepth CNV calling job.
#[derive(Clone, Debug)]
pub struct CnvJob<'a> {
    /// The `.RData` read count file.
    pub readcount_file: &'a str,

    /// The CNV BED file for the panel being called.
    pub cnv_bed: &'a str,

    /// The project the BAMs live in.
    pub project: &'a ProjectInfo,

    /// The panel whose BAMs are analysed.
    pub bam_pan: &'a str,
}

impl CnvJob<'_> {
    fn run(&self, config: &Config, name: String) -> DxRun {
        DxRun::new(&config.applets.cnv)
            .arg("--priority high -y")
            .arg(format!("--name {}", name))
            .input("readcount_file", self.readcount_file)
            .input("bam_str", "markdup")
            .input("reference_genome", &config.reference_genome)
            .input("samplename_str", "_markdup.bam")
            .input("subpanel_bed", self.cnv_bed)
            .input("project_name", &self.project.name)
            .input("bamfile_pannumbers", self.bam_pan)
    }
}

/// The shell variable a CNV job's ID is captured into.
pub fn cnv_job_variable(pan: &str) -> String {
    format!("JOB_ID_CNV_{}", pan)
}

/// CNV calling for one panel. The job ID is captured into
/// [`cnv_job_variable`] so later jobs can depend on it.
pub fn cnv(config: &Config, job: &CnvJob<'_>) -> String {
    let run = job
        .run(config, format!("ED_CNVcalling-{}", job.bam_pan))
        .arg(format!("--dest={} --brief -y", job.project.id));

    format!("{}=$({})", cnv_job_variable(job.bam_pan), run)
}

/// Shell text that reports whether the CNV job for `pan` was submitted and
/// adds it to `DEPENDS_LIST`.
pub fn cnv_job_tracking(pan: &str) -> String {
    let var = cnv_job_variable(pan);
    format!(
        r#"
if [ -z "${{{var}}}" ]; then
    echo "ERROR: Failed to submit CNV job for {pan}. Check dx toolkit output."
else
    echo "Successfully submitted CNV job for {pan}: ${{{var}}}"
    DEPENDS_LIST="${{DEPENDS_LIST}} -d ${{{var}}}"
fi
"#,
        var = var,
        pan = pan
    )
}

/// Reanalysis of a sample's BAMs (sequenced against `job.bam_pan`) with the
/// CNV BED file of `new_pan`. Results go to `/exomedepth_output/<new_pan>`.
pub fn cnv_reanalysis(config: &Config, job: &CnvJob<'_>, new_pan: &str) -> String {
    let run = job
        .run(config, format!("ED_CNVcallingREANALYSIS-{}", new_pan))
        .arg(format!(
            "--dest={}:/exomedepth_output/{} --brief -y",
            job.project.id, new_pan
        ));

    format!("JOB_ID_CNV_REANALYSIS_{}=$({})", job.bam_pan, run)
}

/// The shell variable holding the comma separated panels read counts are
/// taken for.
pub const PAN_NUMBERS_VAR: &str = "PAN_NUMBERS";

/// ExomeDepth read counting over every panel in `${PAN_NUMBERS}`.
pub fn readcount(config: &Config) -> String {
    DxRun::new(&config.applets.readcount)
        .arg("--priority high -y")
        .arg(format!("--instance-type {}", READCOUNT_INSTANCE_TYPE))
        .arg(format!("--name {}", quoted("ED_Readcount-CP2")))
        .input("reference_genome", &config.reference_genome)
        .input("bedfile", config.bed_path(&config.readcount.bedfile))
        .input("bam_str", quoted("*markdup.ba*"))
        .input("normals_RData", &config.readcount.normals_rdata)
        .input("project_name", quoted("${PROJECT_NAME}"))
        .input("bamfile_pannumbers", quoted(format!("${{{}}}", PAN_NUMBERS_VAR)))
        .arg("--dest=\"${PROJECT_ID}\" --brief -y --auth \"${AUTH_TOKEN}\"")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TEST_CONFIG;
    use crate::resolve::prepare_sample;

    fn config() -> Config {
        TEST_CONFIG.parse().unwrap()
    }

    #[test]
    fn test_dx_run_builder() {
        let run = DxRun::new("applet-1")
            .input("reads", "file-1")
            .stage_input("stage-x", "skip", true)
            .arg("-y");
        assert_eq!(
            run.to_string(),
            "dx run applet-1 -ireads=file-1 -istage-stage-x.skip=true -y"
        );
    }

    #[test]
    fn test_workflow_command_for_standard_sample() {
        let config = config();
        let (_, params) = prepare_sample("NGS650_01_111_R134_Pan4009", &config).unwrap();
        let command = workflow(&config.applets.workflow, "NGS650_01_111_R134_Pan4009", &params);

        assert!(command.starts_with(
            "dx run project-common:workflow-cp2 --priority high -y --name \"NGS650_01_111_R134_Pan4009\" "
        ));
        assert!(command.contains(
            "-istage-Ff0P5Jj0GYKY717pKX3vX8Z3.reads=\"${PROJECT_ID}:/${PROJECT_NAME}/Samples/NGS650_01_111_R134_Pan4009_R1.fastq.gz\""
        ));
        assert!(command.contains(
            "-istage-G77VfJ803JGy589J21p7Jkqj.bedfile=\"project-common:/Data/BED/Pan5272_data.bed\""
        ));
        assert!(command.contains(
            "-istage-Ff0P82Q0GYKQ4j8b4gXzjqxX.sambamba_bed=\"project-common:/Data/BED/Pan5272_sambamba.bed\""
        ));
        assert!(command.contains("-istage-Ff0P73j0GYKX41VkF3j62F9j.gvcftyper_algo_options='--genotype_model multinomial'"));
        assert!(command.contains("-istage-GK8G6p803JGx48f74jf16Kjx.skip=true"));
        assert!(command.contains("-istage-GK8G6k003JGx48f74jf16Kjv.skip=false"));
        assert!(!command.contains(POLYEDGE_STAGE));
        assert!(command.ends_with("--dest=\"${PROJECT_ID}\" --brief --auth \"${AUTH_TOKEN}\" -y"));
        assert!(!command.contains('\n'));
    }

    #[test]
    fn test_workflow_command_with_polyedge_and_control() {
        let config = config();
        let sample = "NGS650_02_NA12878_R210_Pan4009";
        let (_, params) = prepare_sample(sample, &config).unwrap();
        let command = workflow(&config.applets.workflow, sample, &params);

        assert!(command.contains("-istage-GK8G6p803JGx48f74jf16Kjx.skip=false"));
        assert!(command.contains("-istage-GK8G6k003JGx48f74jf16Kjv.skip=true"));
        assert!(command.contains(
            "-istage-GK8G6kj03JGyVGvk2Q44KQG1.gene=MSH2 \
             -istage-GK8G6kj03JGyVGvk2Q44KQG1.chrom=2 \
             -istage-GK8G6kj03JGyVGvk2Q44KQG1.poly_start=47641559 \
             -istage-GK8G6kj03JGyVGvk2Q44KQG1.poly_end=47641586 \
             -istage-GK8G6kj03JGyVGvk2Q44KQG1.skip=false"
        ));
    }

    #[test]
    fn test_coverage_command() {
        let config = config();
        assert_eq!(
            coverage(&config, "file-bam", "file-bai", "project-run"),
            "dx run applet-coverage -icoverage_level=30 -ibamfile=file-bam -ibam_index=file-bai \
             -imin_base_qual=10 -imin_mapping_qual=20 \
             -iadditional_filter_commands=\"not (unmapped or secondary_alignment)\" \
             -iexclude_duplicate_reads=true -iexclude_failed_quality_control=true \
             -imerge_overlapping_mate_reads=true -isambamba_bed=project-common:file-sambamba \
             --dest project-run -y"
        );
    }

    #[test]
    fn test_picard_command() {
        let config = config();
        assert_eq!(
            picard(&config.applets.picard, &config.picard, "file-bam", "project-run"),
            "dx run applet-GQKxx1Q0jy1kFXjx5961Pb8j -isorted_bam=file-bam \
             -ifasta_index=project-ByfFPz00jy1fk6PjpZ95F27J:file-ByYgX700b80gf4ZY1GxvF3Jv \
             -ivendor_exome_bedfile=project-ByfFPz00jy1fk6PjpZ95F27J:file-Gzj07J00jy1kVJXbFj8z67G0 \
             -iCapture_panel=\"Hybridisation\" --dest project-run -y"
        );
    }

    #[test]
    fn test_fastqc_command() {
        assert_eq!(
            fastqc("applet-fastqc", "file-r1", "file-r2", "project-run"),
            "dx run applet-fastqc -ireads=file-r1 -ireads=file-r2 --dest project-run -y"
        );
    }

    #[test]
    fn test_cnv_commands() {
        let config = config();
        let project = ProjectInfo::new("project-run", "002_run650");
        let job = CnvJob {
            readcount_file: "file-rdata",
            cnv_bed: "project-common:/Data/BED/Pan4009_CNV.bed",
            project: &project,
            bam_pan: "Pan4009",
        };

        assert_eq!(
            cnv(&config, &job),
            "JOB_ID_CNV_Pan4009=$(dx run applet-cnv --priority high -y --name ED_CNVcalling-Pan4009 \
             -ireadcount_file=file-rdata -ibam_str=markdup -ireference_genome=project-common:file-reference \
             -isamplename_str=_markdup.bam -isubpanel_bed=project-common:/Data/BED/Pan4009_CNV.bed \
             -iproject_name=002_run650 -ibamfile_pannumbers=Pan4009 --dest=project-run --brief -y)"
        );

        let reanalysis = cnv_reanalysis(&config, &job, "Pan5208");
        assert!(reanalysis.starts_with("JOB_ID_CNV_REANALYSIS_Pan4009=$(dx run applet-cnv "));
        assert!(reanalysis.contains("--name ED_CNVcallingREANALYSIS-Pan5208 "));
        assert!(reanalysis.contains("-ibamfile_pannumbers=Pan4009 "));
        assert!(reanalysis.ends_with("--dest=project-run:/exomedepth_output/Pan5208 --brief -y)"));

        let tracking = cnv_job_tracking("Pan4009");
        assert!(tracking.contains("if [ -z \"${JOB_ID_CNV_Pan4009}\" ]; then"));
        assert!(tracking.contains("DEPENDS_LIST=\"${DEPENDS_LIST} -d ${JOB_ID_CNV_Pan4009}\""));
    }

    #[test]
    fn test_readcount_command() {
        let config = config();
        let command = readcount(&config);
        assert_eq!(command.matches("--instance-type").count(), 1);
        assert!(command.contains("--instance-type mem1_ssd1_v2_x36"));
        assert!(command.contains("-ibedfile=project-common:/Data/BED/Pan5279_exomeDepth.bed"));
        assert!(command.contains("-ibamfile_pannumbers=\"${PAN_NUMBERS}\""));
        assert!(command.contains("-inormals_RData=project-common:file-normals"));
    }
}
