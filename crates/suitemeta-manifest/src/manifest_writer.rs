//! Reading and writing `plugins.json`
//!
//! Writes go to a temporary file in the same directory which is renamed
//! into place once fully flushed, so a failed run never leaves a truncated
//! document behind.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::errors::ManifestError;
use crate::types::PluginsMetadata;

pub const PLUGINS_FILE_NAME: &str = "plugins.json";

/// Write the metadata document to `output_path` as pretty-printed JSON
pub fn write_to_path(metadata: &PluginsMetadata, output_path: &Path) -> Result<(), ManifestError> {
    debug!("Writing plugins metadata to: {:?}", output_path);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = output_path.with_extension("json.tmp");
    let written = write_json(metadata, &temp_path);
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    fs::rename(&temp_path, output_path)?;

    info!("Plugins metadata written to: {:?}", output_path);
    info!("Total plugins: {}", metadata.len());

    Ok(())
}

fn write_json(metadata: &PluginsMetadata, path: &Path) -> Result<(), ManifestError> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::with_capacity(64 * 1024, file);
    serde_json::to_writer_pretty(&mut writer, metadata)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a metadata document previously written by [`write_to_path`]
pub fn read_from_path(path: &Path) -> Result<PluginsMetadata, ManifestError> {
    debug!("Reading plugins metadata from: {:?}", path);

    let content = fs::read_to_string(path)?;
    let mut metadata: PluginsMetadata = serde_json::from_str(&content)?;
    metadata.rebuild_indexes();

    info!("Plugins metadata loaded: {} plugins", metadata.len());
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use crate::manifest_writer::*;
    use crate::types::{Author, PluginMetadata, Version};
    use indexmap::IndexMap;
    use smallvec::smallvec;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn record(id: &str, label: &str) -> PluginMetadata {
        let mut versions = IndexMap::new();
        versions.insert(
            Arc::from(label),
            Version {
                last_update: Arc::from("June 1, 2024"),
                url: Arc::from(format!("{label}/{id}.nbm")),
            },
        );
        PluginMetadata {
            id: Arc::from(id),
            name: Some(Arc::from("Example")),
            short_description: None,
            long_description: None,
            category: Some(Arc::from("Layout")),
            license: Some(Arc::from("Apache 2.0")),
            authors: Some(smallvec![Author::new("Ada"), Author::new("Grace")]),
            homepage: None,
            sourcecode: None,
            last_update: Arc::from("June 1, 2024"),
            readme: Some("# Example\n".to_string()),
            images: vec![Arc::from(format!("imgs/{id}/shot.png"))],
            versions,
        }
    }

    #[test]
    fn test_write_and_read_round_trip() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join("site").join(PLUGINS_FILE_NAME);

        let metadata = PluginsMetadata::new(vec![
            record("org.acme.layout", "0.9"),
            record("org.acme.export", "0.9"),
        ]);

        assert!(
            write_to_path(&metadata, &path).is_ok(),
            "Failed to write plugins metadata"
        );
        assert!(!path.with_extension("json.tmp").exists());

        let loaded = read_from_path(&path);
        assert!(loaded.is_ok(), "Failed to read plugins metadata");
        let loaded = loaded.unwrap_or_default();

        assert_eq!(loaded.ids().collect::<Vec<_>>(), metadata.ids().collect::<Vec<_>>());
        for plugin in &metadata.plugins {
            let Some(read_back) = loaded.get_plugin(&plugin.id) else {
                panic!("plugin {} missing after round trip", plugin.id);
            };
            assert_eq!(read_back, plugin);
            assert_eq!(read_back.version_labels().collect::<Vec<_>>(), vec!["0.9"]);
        }
    }

    #[test]
    fn test_read_rejects_malformed_json() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join(PLUGINS_FILE_NAME);
        assert!(std::fs::write(&path, "{ \"plugins\": [").is_ok());

        assert!(matches!(read_from_path(&path), Err(ManifestError::Json(_))));
    }
}
