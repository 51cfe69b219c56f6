//! Typed view of a reactor project
//!
//! The host build describes projects with arbitrary key-value
//! configuration. At the boundary that configuration is narrowed to
//! [`NbmConfig`], and everything downstream reads it through the
//! [`ModuleConfigSource`] getters.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// IDENTITY
// =============================================================================

/// Maven-style coordinates of a module
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleId {
    pub group: Arc<str>,
    pub artifact: Arc<str>,
    pub version: Arc<str>,
}

impl ModuleId {
    pub fn new(group: &str, artifact: &str, version: &str) -> Self {
        ModuleId {
            group: Arc::from(group),
            artifact: Arc::from(artifact),
            version: Arc::from(version),
        }
    }

    /// Identity used in `plugins.json`: `group.artifact`
    pub fn plugin_id(&self) -> String {
        format!("{}.{}", self.group, self.artifact)
    }

    /// `artifact-version`, the stem of every file built for this module
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.artifact, self.version)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// A declared dependency: `group:artifact[:version]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DependencySpec {
    pub group: Arc<str>,
    pub artifact: Arc<str>,
    pub version: Option<Arc<str>>,
}

impl DependencySpec {
    /// Whether this dependency refers to the module `id`
    pub fn matches(&self, id: &ModuleId) -> bool {
        self.group == id.group
            && self.artifact == id.artifact
            && self.version.as_ref().map_or(true, |v| *v == id.version)
    }
}

impl FromStr for DependencySpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        match parts.as_slice() {
            [group, artifact] if !group.is_empty() && !artifact.is_empty() => Ok(DependencySpec {
                group: Arc::from(*group),
                artifact: Arc::from(*artifact),
                version: None,
            }),
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(DependencySpec {
                    group: Arc::from(*group),
                    artifact: Arc::from(*artifact),
                    version: Some(Arc::from(*version)),
                })
            }
            _ => Err(format!(
                "invalid dependency '{}', expected 'group:artifact[:version]'",
                s
            )),
        }
    }
}

impl TryFrom<String> for DependencySpec {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DependencySpec> for String {
    fn from(spec: DependencySpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}:{}:{}", self.group, self.artifact, version),
            None => write!(f, "{}:{}", self.group, self.artifact),
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Packaging-plugin configuration of a module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NbmConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,
    /// Comma separated author names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage_url: Option<String>,
    /// Overrides the configured readme file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_file: Option<PathBuf>,
    /// Overrides the configured screenshot directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots_dir: Option<PathBuf>,
}

/// Typed access to the per-module settings the metadata is built from
pub trait ModuleConfigSource {
    fn license_name(&self) -> Option<&str>;
    fn authors_raw(&self) -> Option<&str>;
    fn homepage_url(&self) -> Option<&str>;
    fn sourcecode_url(&self) -> Option<&str>;
    fn readme_file(&self) -> Option<&Path>;
    fn screenshots_dir(&self) -> Option<&Path>;
    fn base_dir(&self) -> &Path;
}

// =============================================================================
// MODULE
// =============================================================================

/// One project of the reactor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,
    pub name: Option<String>,
    pub packaging: String,
    pub basedir: PathBuf,
    pub dependencies: Vec<DependencySpec>,
    pub properties: IndexMap<String, String>,
    pub nbm: NbmConfig,
    pub scm_url: Option<String>,
}

impl Module {
    /// Human readable name, falling back to the artifact id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id.artifact)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn is_packaged_as(&self, packaging: &str) -> bool {
        self.packaging == packaging
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl ModuleConfigSource for Module {
    fn license_name(&self) -> Option<&str> {
        non_blank(self.nbm.license_name.as_deref())
    }

    fn authors_raw(&self) -> Option<&str> {
        non_blank(self.nbm.author.as_deref())
    }

    fn homepage_url(&self) -> Option<&str> {
        non_blank(self.nbm.homepage_url.as_deref())
    }

    fn sourcecode_url(&self) -> Option<&str> {
        non_blank(self.scm_url.as_deref())
    }

    fn readme_file(&self) -> Option<&Path> {
        self.nbm.readme_file.as_deref()
    }

    fn screenshots_dir(&self) -> Option<&Path> {
        self.nbm.screenshots_dir.as_deref()
    }

    fn base_dir(&self) -> &Path {
        &self.basedir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_spec_parsing() {
        let spec: Result<DependencySpec, _> = "org.acme:core".parse();
        assert!(spec.is_ok_and(|s| s.version.is_none() && s.artifact.as_ref() == "core"));

        let spec: Result<DependencySpec, _> = "org.acme:core:1.2".parse();
        assert!(spec.is_ok_and(|s| s.version.as_deref() == Some("1.2")));

        assert!("org.acme".parse::<DependencySpec>().is_err());
        assert!("org.acme::1.0".parse::<DependencySpec>().is_err());
        assert!("a:b:c:d".parse::<DependencySpec>().is_err());
    }

    #[test]
    fn test_dependency_matching() {
        let core = ModuleId::new("org.acme", "core", "1.0");
        let any_version = "org.acme:core".parse::<DependencySpec>().unwrap_or_else(|e| panic!("{e}"));
        let pinned = "org.acme:core:2.0".parse::<DependencySpec>().unwrap_or_else(|e| panic!("{e}"));

        assert!(any_version.matches(&core));
        assert!(!pinned.matches(&core));
        assert_eq!(pinned.to_string(), "org.acme:core:2.0");
    }

    #[test]
    fn test_blank_configuration_is_absent() {
        let module = Module {
            id: ModuleId::new("org.acme", "core", "1.0"),
            nbm: NbmConfig {
                license_name: Some("   ".to_string()),
                author: Some(" Ada ".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(module.license_name(), None);
        assert_eq!(module.authors_raw(), Some("Ada"));
        assert_eq!(module.display_name(), "core");
    }

    #[test]
    fn test_identity_strings() {
        let id = ModuleId::new("org.acme", "layout", "1.0.3");
        assert_eq!(id.plugin_id(), "org.acme.layout");
        assert_eq!(id.file_stem(), "layout-1.0.3");
        assert_eq!(id.to_string(), "org.acme:layout:1.0.3");
    }
}
