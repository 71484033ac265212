//! Extraction of run metadata from sample names and run manifests.

pub mod manifest;
pub mod name;
pub(crate) mod patterns;
