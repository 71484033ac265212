//! Utilities related to the parsing of arguments.

use crate::sample::manifest::is_pan_number;

//================//
// DNAnexus IDs   //
//================//

fn prefixed_id(raw: &str, prefix: &str, kind: &str) -> Result<String, String> {
    let id = raw.trim();

    match id.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()) => {
            Ok(id.to_string())
        }
        _ => Err(format!(
            "invalid DNAnexus {} ID format: {}; must start with '{}'",
            kind, raw, prefix
        )),
    }
}

/// Utility method to parse a DNAnexus project ID (`project-xxxx`) passed in
/// on the command line.
pub fn project_id(raw: &str) -> Result<String, String> {
    prefixed_id(raw, "project-", "project")
}

/// Utility method to parse a DNAnexus file ID (`file-xxxx`) passed in on the
/// command line.
pub fn file_id(raw: &str) -> Result<String, String> {
    prefixed_id(raw, "file-", "file")
}

//=============//
// Pan numbers //
//=============//

/// Utility method to parse a panel code passed in on the command line and
/// ensure it is `Pan` followed by digits.
pub fn pan_number(raw: &str) -> Result<String, String> {
    let pan = raw.trim();

    match is_pan_number(pan) {
        true => Ok(pan.to_string()),
        false => Err(format!(
            "invalid Pan number format: {}; must be 'Pan' followed by digits (e.g. Pan1234)",
            raw
        )),
    }
}

/// Utility method to parse a non-empty sample identifier.
pub fn sample_identifier(raw: &str) -> Result<String, String> {
    match raw.trim() {
        "" => Err(String::from("sample identifier cannot be empty")),
        sample => Ok(sample.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_id() {
        assert_eq!(
            project_id("project-GZ1Bq1Q0jy1fF4kZ3Gv1Y5XJ"),
            Ok(String::from("project-GZ1Bq1Q0jy1fF4kZ3Gv1Y5XJ"))
        );
        assert!(project_id("file-GZ1Bq1Q0jy1fF4kZ3Gv1Y5XJ").is_err());
        assert!(project_id("project-").is_err());
        assert!(project_id("project-abc:/folder").is_err());
    }

    #[test]
    fn test_file_id() {
        assert_eq!(file_id(" file-abc123 "), Ok(String::from("file-abc123")));
        assert!(file_id("abc123").is_err());
    }

    #[test]
    fn test_pan_number() {
        assert_eq!(pan_number("Pan1234"), Ok(String::from("Pan1234")));
        assert_eq!(pan_number("pan1234"), Ok(String::from("pan1234")));
        assert!(pan_number("Pan").is_err());
        assert!(pan_number("1234").is_err());
    }

    #[test]
    fn test_sample_identifier() {
        assert_eq!(sample_identifier(" 123456 "), Ok(String::from("123456")));
        assert!(sample_identifier("   ").is_err());
    }
}
