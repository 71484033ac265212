//! Regular expressions for the laboratory's naming conventions and for the
//! text printed by `dx describe`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `R134`, `R210.1`
    pub(crate) static ref RUN_NUMBER: Regex = Regex::new(r"R\d+(?:\.\d+)?").unwrap();
    pub(crate) static ref WHOLE_EXOME: Regex = Regex::new(r"(?i)SingletonWES|WES").unwrap();
    pub(crate) static ref PAN_NUMBER: Regex = Regex::new(r"(?i)Pan\d+").unwrap();
    pub(crate) static ref PAN_NUMBER_EXACT: Regex = Regex::new(r"(?i)^Pan\d+$").unwrap();
    /// Shortest `NGS<digits><alnum>` run that is followed by `_` or the end.
    pub(crate) static ref BATCH: Regex = Regex::new(r"(NGS\d+[A-Za-z0-9]*?)(?:_|$)").unwrap();
    pub(crate) static ref MANIFEST_SAMPLE: Regex =
        Regex::new(r"^(NGS\d+[A-Za-z0-9_.-]*)(?:,.*)?").unwrap();
    pub(crate) static ref DX_PROJECT: Regex =
        Regex::new(r"Project\s+(project-[a-zA-Z0-9]+)").unwrap();
    pub(crate) static ref DX_FOLDER: Regex = Regex::new(r"Folder\s+([^\n]+)").unwrap();
}
