//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the
//! core services. Environment variables are read only in the binaries;
//! the helpers here take the already-read values, which keeps request
//! handling and tests free of process-wide state.

use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};
use crate::insert::PatientPolicy;
use crate::schema::SchemaMode;

/// Default name of the ledger data file, next to the working directory.
pub const DEFAULT_DATA_FILE: &str = "data.xlsx";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_file: PathBuf,
    catalog_dir: PathBuf,
    schema_mode: SchemaMode,
    patient_policy: PatientPolicy,
}

impl CoreConfig {
    pub fn new(
        data_file: PathBuf,
        catalog_dir: PathBuf,
        schema_mode: SchemaMode,
        patient_policy: PatientPolicy,
    ) -> Self {
        Self {
            data_file,
            catalog_dir,
            schema_mode,
            patient_policy,
        }
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    pub fn catalog_dir(&self) -> &Path {
        &self.catalog_dir
    }

    pub fn schema_mode(&self) -> SchemaMode {
        self.schema_mode
    }

    pub fn patient_policy(&self) -> PatientPolicy {
        self.patient_policy
    }
}

/// Parses the schema mode from an optional environment value.
///
/// `None` or blank defaults to [`SchemaMode::Strict`]: the upload path has
/// always rejected files with the wrong column count, and silently
/// padding a malformed insurer file is worse than refusing it.
pub fn schema_mode_from_env_value(value: Option<String>) -> LedgerResult<SchemaMode> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v.parse(),
        None => Ok(SchemaMode::Strict),
    }
}

/// Parses the patient policy from an optional environment value
/// (`"require-existing"` or `"allow-new"`). Defaults to
/// [`PatientPolicy::AllowNew`], the web generation's behaviour.
pub fn patient_policy_from_env_value(value: Option<String>) -> LedgerResult<PatientPolicy> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    match value.as_deref() {
        None => Ok(PatientPolicy::AllowNew),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "require-existing" => Ok(PatientPolicy::RequireExisting),
            "allow-new" => Ok(PatientPolicy::AllowNew),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown patient policy {:?} (expected \"require-existing\" or \"allow-new\")",
                other
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mode_defaults_to_strict() {
        assert_eq!(
            schema_mode_from_env_value(None).unwrap(),
            SchemaMode::Strict
        );
        assert_eq!(
            schema_mode_from_env_value(Some("  ".into())).unwrap(),
            SchemaMode::Strict
        );
        assert_eq!(
            schema_mode_from_env_value(Some("lenient".into())).unwrap(),
            SchemaMode::Lenient
        );
        assert!(schema_mode_from_env_value(Some("bogus".into())).is_err());
    }

    #[test]
    fn test_patient_policy_parsing() {
        assert_eq!(
            patient_policy_from_env_value(None).unwrap(),
            PatientPolicy::AllowNew
        );
        assert_eq!(
            patient_policy_from_env_value(Some("require-existing".into())).unwrap(),
            PatientPolicy::RequireExisting
        );
        assert!(patient_policy_from_env_value(Some("whatever".into())).is_err());
    }
}
