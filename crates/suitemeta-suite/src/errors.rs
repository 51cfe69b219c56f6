//! Errors raised while discovering, validating and publishing suites
//!
//! Every variant is fatal to the invocation. Messages name the offending
//! module and the configuration to fix.

use std::path::PathBuf;
use suitemeta_manifest::ManifestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No '{packaging}' modules have been detected, make sure the plugin modules are listed in the reactor")]
    NoModulesFound { packaging: String },

    #[error("Multiple modules have been found but no suite detected, make sure one of the modules depends on the others")]
    NoSuiteDetected,

    #[error("Multiple module suites have been found ({}), only one suite per reactor is supported", .roots.join(", "))]
    MultipleSuitesDetected { roots: Vec<String> },

    #[error("The manifest of module '{module}' should set 'OpenIDE-Module-Show-In-Client' to 'false' since it is bundled in the suite '{root}'")]
    ChildVisibilityViolation { module: String, root: String },

    #[error("The 'license-name' configuration should be set for the module '{module}'. It belongs to the module's [nbm] table in the reactor")]
    MissingLicense { module: String },

    #[error("The 'author' configuration should be set for the module '{module}'. Multiple authors can be separated by a comma")]
    MissingAuthors { module: String },

    #[error("Invalid manifest for module '{module}': {source}")]
    ManifestParse {
        module: String,
        #[source]
        source: ManifestError,
    },

    #[error("Dependency cycle detected between modules: {}", .modules.join(", "))]
    DependencyCycle { modules: Vec<String> },

    #[error("Failed to write '{}': {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl SuiteError {
    pub(crate) fn output_write(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        SuiteError::OutputWrite {
            path: path.into(),
            source: source.into(),
        }
    }
}
