//! Types of the `plugins.json` document
//!
//! Records are assembled once per metadata build and never mutated
//! afterwards. Strings shared across records use `Arc<str>`.

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::Arc;

// =============================================================================
// PLUGINS METADATA - Top-level document with index for O(1) lookup
// =============================================================================

/// Top-level `plugins.json` document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsMetadata {
    #[serde(default)]
    pub plugins: Vec<PluginMetadata>,

    /// Runtime only - rebuilt on load for O(1) lookup by plugin id
    #[serde(skip)]
    pub plugin_index: AHashMap<Arc<str>, usize>,
}

impl PluginsMetadata {
    pub fn new(plugins: Vec<PluginMetadata>) -> Self {
        let mut metadata = PluginsMetadata {
            plugins,
            plugin_index: AHashMap::new(),
        };
        metadata.rebuild_indexes();
        metadata
    }

    pub fn rebuild_indexes(&mut self) {
        self.plugin_index = self
            .plugins
            .iter()
            .enumerate()
            .map(|(idx, plugin)| (plugin.id.clone(), idx))
            .collect();
    }

    /// O(1) plugin lookup by id (`group.artifact`)
    #[inline]
    pub fn get_plugin(&self, id: &str) -> Option<&PluginMetadata> {
        self.plugin_index.get(id).map(|&idx| &self.plugins[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(|p| p.id.as_ref())
    }
}

// =============================================================================
// PLUGIN - One record per published root module
// =============================================================================

/// Metadata of a single published plugin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PluginMetadata {
    /// `group.artifact` of the root module
    pub id: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Arc<str>>,
    pub license: Option<Arc<str>>,
    pub authors: Option<SmallVec<[Author; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcecode: Option<Arc<str>>,
    /// Formatted as `Month D, YYYY`
    pub last_update: Arc<str>,
    pub readme: Option<String>,
    #[serde(default)]
    pub images: Vec<Arc<str>>,
    /// Version label -> download information
    #[serde(default)]
    pub versions: IndexMap<Arc<str>, Version>,
}

impl PluginMetadata {
    pub fn version_labels(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(|label| &**label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: String,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Author { name: name.into() }
    }
}

/// Download information for one version label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Version {
    pub last_update: Arc<str>,
    /// Relative to the output directory, e.g. `0.9/suite-1.0.tar.gz`
    pub url: Arc<str>,
}
