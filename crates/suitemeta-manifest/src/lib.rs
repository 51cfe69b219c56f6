//! Suitemeta manifest handling
//!
//! Two kinds of manifest live here:
//! - the `plugins.json` document describing every published plugin and the
//!   download location of each of its versions;
//! - the per-module NBM manifest (`manifest.mf`) together with the
//!   localizing bundle it points at.

pub mod errors;
pub mod manifest_writer;
pub mod nbm_manifest;
pub mod types;

pub use errors::ManifestError;
pub use manifest_writer::{read_from_path, write_to_path, PLUGINS_FILE_NAME};
pub use nbm_manifest::{read_manifest, ManifestDescriptor};
pub use types::{Author, PluginMetadata, PluginsMetadata, Version};
