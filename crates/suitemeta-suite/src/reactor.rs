//! Reactor description loading
//!
//! The reactor is the multi-project batch the host build runs. It is handed
//! over as a TOML document:
//!
//! ```toml
//! [properties]
//! "suite.version" = "0.9"
//!
//! [[projects]]
//! group = "org.acme"
//! artifact = "layout"
//! version = "1.0"
//! packaging = "nbm"
//! dependencies = ["org.acme:layout-api"]
//!
//! [projects.nbm]
//! license-name = "Apache 2.0"
//! author = "Ada Lovelace, Grace Hopper"
//! ```

use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::SuiteError;
use crate::module::{DependencySpec, Module, ModuleId, NbmConfig};

pub const DEFAULT_REACTOR_FILE: &str = "reactor.toml";
const DEFAULT_PACKAGING: &str = "jar";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ReactorFile {
    #[serde(default)]
    properties: IndexMap<String, String>,
    #[serde(default)]
    projects: Vec<ProjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ProjectEntry {
    group: String,
    artifact: String,
    version: String,
    name: Option<String>,
    packaging: Option<String>,
    basedir: Option<PathBuf>,
    #[serde(default)]
    dependencies: Vec<DependencySpec>,
    #[serde(default)]
    properties: IndexMap<String, String>,
    #[serde(default)]
    nbm: NbmConfig,
    scm_url: Option<String>,
}

impl ProjectEntry {
    fn into_module(self, root_dir: &Path) -> Module {
        let basedir = match self.basedir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => root_dir.join(dir),
            None => root_dir.join(&self.artifact),
        };
        Module {
            id: ModuleId::new(&self.group, &self.artifact, &self.version),
            name: self.name,
            packaging: self
                .packaging
                .unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
            basedir,
            dependencies: self.dependencies,
            properties: self.properties,
            nbm: self.nbm,
            scm_url: self.scm_url,
        }
    }
}

/// The projects of one batch and its batch-wide properties
#[derive(Debug, Clone, Default)]
pub struct Reactor {
    pub root_dir: PathBuf,
    pub properties: IndexMap<String, String>,
    pub modules: Vec<Module>,
}

impl Reactor {
    /// Load a reactor description; relative base directories resolve against its directory
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        debug!("Loading reactor from {:?}", path);
        let content = fs::read_to_string(path).map_err(|e| {
            SuiteError::Configuration(format!(
                "failed to read reactor '{}': {}",
                path.display(),
                e
            ))
        })?;
        let root_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml_str(&content, &root_dir)
    }

    pub fn from_toml_str(content: &str, root_dir: &Path) -> Result<Self, SuiteError> {
        let file: ReactorFile = toml::from_str(content)
            .map_err(|e| SuiteError::Configuration(format!("invalid reactor description: {e}")))?;

        if file.projects.is_empty() {
            return Err(SuiteError::Configuration(
                "the project should be a reactor project listing at least one module".to_string(),
            ));
        }

        let modules: Vec<Module> = file
            .projects
            .into_iter()
            .map(|entry| entry.into_module(root_dir))
            .collect();
        info!("Reactor loaded: {} projects", modules.len());

        Ok(Reactor {
            root_dir: root_dir.to_path_buf(),
            properties: file.properties,
            modules,
        })
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// The explicit label if given, otherwise the batch property `version_property`
    pub fn version_label(
        &self,
        explicit: Option<&str>,
        version_property: &str,
    ) -> Result<String, SuiteError> {
        explicit
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .or_else(|| {
                self.property(version_property)
                    .map(str::trim)
                    .filter(|label| !label.is_empty())
            })
            .map(str::to_string)
            .ok_or_else(|| {
                SuiteError::Configuration(format!(
                    "no version label: pass --version-label or set the '{version_property}' property of the reactor"
                ))
            })
    }

    /// Projects packaged as `packaging`, in reactor order
    pub fn plugin_modules(&self, packaging: &str) -> Vec<&Module> {
        self.modules
            .iter()
            .filter(|m| m.is_packaged_as(packaging))
            .collect()
    }

    /// Like [`Reactor::plugin_modules`], minus modules declaring another version label
    pub fn plugin_modules_for_version(
        &self,
        packaging: &str,
        version_property: &str,
        label: &str,
    ) -> Vec<&Module> {
        self.plugin_modules(packaging)
            .into_iter()
            .filter(|m| match m.property(version_property) {
                Some(own) if own.trim() != label => {
                    debug!(
                        "Ignoring '{}': its '{}' is '{}', not '{}'",
                        m.id, version_property, own, label
                    );
                    false
                }
                _ => true,
            })
            .collect()
    }
}
