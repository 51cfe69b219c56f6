//! `plugins.json` assembly
//!
//! One record per module tree root. Unlike validation, several suites are
//! allowed here and a broken manifest only drops the fields it would have
//! provided.

use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use suitemeta_manifest::{
    read_manifest, write_to_path, ManifestDescriptor, PluginMetadata, PluginsMetadata, Version,
    PLUGINS_FILE_NAME,
};
use tracing::{debug, info, warn};

use crate::bundle;
use crate::clock::{format_last_update, Clock};
use crate::errors::SuiteError;
use crate::extractor::{self, MetadataExtractor};
use crate::module::{Module, ModuleConfigSource};
use crate::tree::{build_trees, ModuleTree};

/// Directory under the output directory receiving screenshots, per plugin id
pub const IMAGES_DIR: &str = "imgs";

/// Output settings of a metadata build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub output_directory: PathBuf,
    pub manifest_file: String,
    pub packaging: String,
    /// Create the suite archive of every multi-module tree
    pub bundle_suites: bool,
}

pub struct MetadataBuilder<'c> {
    settings: BuildSettings,
    extractor: MetadataExtractor,
    clock: &'c dyn Clock,
}

impl<'c> MetadataBuilder<'c> {
    pub fn new(settings: BuildSettings, extractor: MetadataExtractor, clock: &'c dyn Clock) -> Self {
        MetadataBuilder {
            settings,
            extractor,
            clock,
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Build the records of every root found among `candidates`
    pub fn build<'a, I>(&self, candidates: I, version_label: &str) -> Result<PluginsMetadata, SuiteError>
    where
        I: IntoIterator<Item = &'a Module>,
    {
        let version_label = version_label.trim();
        if version_label.is_empty() {
            return Err(SuiteError::Configuration(
                "the version label must not be empty, set --version-label or the reactor's version property"
                    .to_string(),
            ));
        }

        let modules: Vec<&'a Module> = candidates.into_iter().collect();
        if modules.is_empty() {
            return Err(SuiteError::NoModulesFound {
                packaging: self.settings.packaging.clone(),
            });
        }

        let forest = build_trees(modules)?;
        let last_update: Arc<str> = Arc::from(format_last_update(self.clock.today()));
        let version_dir = self.settings.output_directory.join(version_label);

        // Every suite must be bundleable before anything is copied or archived
        if self.settings.bundle_suites {
            for tree in forest.trees().filter(|tree| !tree.is_singleton()) {
                bundle::built_members(tree, &version_dir)?;
            }
        }

        let mut written = Vec::new();
        let mut plugins = Vec::with_capacity(forest.len());
        for tree in forest.trees() {
            match self.record(tree, version_label, &version_dir, &last_update, &mut written) {
                Ok(record) => {
                    info!(
                        "Plugin '{}' recorded for version {}",
                        record.id, version_label
                    );
                    plugins.push(record);
                }
                Err(e) => {
                    remove_written(&written);
                    return Err(e);
                }
            }
        }

        Ok(PluginsMetadata::new(plugins))
    }

    fn record(
        &self,
        tree: &ModuleTree<'_>,
        version_label: &str,
        version_dir: &Path,
        last_update: &Arc<str>,
        written: &mut Vec<PathBuf>,
    ) -> Result<PluginMetadata, SuiteError> {
        let root = tree.root();
        let id = root.id.plugin_id();
        debug!("Building metadata record for '{}'", id);

        let manifest = self.manifest(root);

        let images_dir = self.settings.output_directory.join(IMAGES_DIR).join(&id);
        let images_prefix = format!("{IMAGES_DIR}/{id}/");
        let images: Vec<Arc<str>> = self
            .extractor
            .copy_screenshots(root, &images_dir, &images_prefix)
            .into_iter()
            .map(Arc::from)
            .collect();
        written.extend(
            images
                .iter()
                .filter_map(|url| url.strip_prefix(images_prefix.as_str()))
                .map(|name| images_dir.join(name)),
        );

        let url = bundle::download_path(tree, version_label, version_dir, self.settings.bundle_suites)?;
        if self.settings.bundle_suites && !tree.is_singleton() {
            written.push(version_dir.join(bundle::download_file_name(tree)));
        }
        let mut versions = IndexMap::with_capacity(1);
        versions.insert(
            Arc::from(version_label),
            Version {
                last_update: last_update.clone(),
                url: Arc::from(url),
            },
        );

        Ok(PluginMetadata {
            id: Arc::from(id),
            name: manifest
                .display_name
                .map(Arc::from)
                .or_else(|| root.name.as_deref().map(Arc::from)),
            short_description: manifest.short_description,
            long_description: manifest.long_description,
            category: manifest.category.map(Arc::from),
            license: extractor::license_name(root).map(Arc::from),
            authors: extractor::authors(root),
            homepage: extractor::homepage(root).map(Arc::from),
            sourcecode: extractor::sourcecode(root).map(Arc::from),
            last_update: last_update.clone(),
            readme: self.extractor.readme(root),
            images,
            versions,
        })
    }

    fn manifest(&self, module: &Module) -> ManifestDescriptor {
        match read_manifest(module.base_dir(), &self.settings.manifest_file) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                warn!(
                    "Manifest of '{}' could not be read, its display fields are left out: {}",
                    module.display_name(),
                    e
                );
                ManifestDescriptor::default()
            }
        }
    }

    /// Write `plugins.json` into the output directory
    pub fn write(&self, metadata: &PluginsMetadata) -> Result<PathBuf, SuiteError> {
        let path = self.settings.output_directory.join(PLUGINS_FILE_NAME);
        write_to_path(metadata, &path).map_err(|e| SuiteError::output_write(&path, e))?;
        Ok(path)
    }
}

/// Undo the images and archives of a build that failed part way
fn remove_written(written: &[PathBuf]) {
    for path in written {
        if let Err(e) = fs::remove_file(path) {
            warn!("Could not remove {:?} after a failed build: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::test_support::{publishable, write_file, MANIFEST_FILE};
    use chrono::NaiveDate;
    use suitemeta_manifest::read_from_path;
    use tempfile::TempDir;

    fn settings(output: &Path) -> BuildSettings {
        BuildSettings {
            output_directory: output.to_path_buf(),
            manifest_file: MANIFEST_FILE.to_string(),
            packaging: "nbm".to_string(),
            bundle_suites: false,
        }
    }

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or(NaiveDate::MIN))
    }

    #[test]
    fn test_one_record_per_root() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let base = temp_dir.path();
        let modules = vec![
            publishable(base, "suite", &["api"]),
            publishable(base, "api", &[]),
            publishable(base, "solo", &[]),
        ];
        let clock = clock();
        let builder = MetadataBuilder::new(
            settings(&base.join("site")),
            MetadataExtractor::default(),
            &clock,
        );

        let result = builder.build(&modules, "0.9");
        assert!(result.is_ok(), "{:?}", result.as_ref().err());
        let metadata = result.unwrap_or_default();

        assert_eq!(
            metadata.ids().collect::<Vec<_>>(),
            vec!["org.acme.suite", "org.acme.solo"]
        );
        let suite = metadata.get_plugin("org.acme.suite");
        assert!(suite.is_some_and(|p| {
            p.last_update.as_ref() == "June 1, 2024"
                && p.license.as_deref() == Some("Apache 2.0")
                && p.authors.as_ref().is_some_and(|a| a.len() == 2)
                && p.versions.get("0.9").is_some_and(|v| v.url.as_ref() == "0.9/suite-1.0.tar.gz")
        }));
        let solo = metadata.get_plugin("org.acme.solo");
        assert!(solo.is_some_and(|p| {
            p.versions.get("0.9").is_some_and(|v| v.url.as_ref() == "0.9/solo-1.0.nbm")
        }));
    }

    #[test]
    fn test_each_build_has_its_own_version_entry() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let base = temp_dir.path();
        let modules = vec![publishable(base, "core", &[])];
        let clock = clock();
        let builder = MetadataBuilder::new(
            settings(&base.join("site")),
            MetadataExtractor::default(),
            &clock,
        );

        for label in ["1.0", "1.1"] {
            let metadata = builder.build(&modules, label).unwrap_or_default();
            let labels: Vec<&str> = metadata
                .plugins
                .iter()
                .flat_map(PluginMetadata::version_labels)
                .collect();
            assert_eq!(labels, vec![label]);
        }
    }

    #[test]
    fn test_manifest_fields_and_failures() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let base = temp_dir.path();
        let modules = vec![publishable(base, "good", &[]), publishable(base, "bad", &[])];
        write_file(
            &modules[0].basedir.join(MANIFEST_FILE),
            "OpenIDE-Module: org.acme.good\nOpenIDE-Module-Localizing-Bundle: org/acme/good/Bundle.properties\n",
        );
        write_file(
            &modules[0]
                .basedir
                .join("src/main/resources/org/acme/good/Bundle.properties"),
            "OpenIDE-Module-Name=Good Plugin\nOpenIDE-Module-Display-Category=Layout\n",
        );
        write_file(&modules[1].basedir.join(MANIFEST_FILE), "not a header line\n");

        let clock = clock();
        let builder = MetadataBuilder::new(
            settings(&base.join("site")),
            MetadataExtractor::default(),
            &clock,
        );
        let metadata = builder.build(&modules, "2.0").unwrap_or_default();

        let good = metadata.get_plugin("org.acme.good");
        assert!(good.is_some_and(|p| {
            p.name.as_deref() == Some("Good Plugin") && p.category.as_deref() == Some("Layout")
        }));
        let bad = metadata.get_plugin("org.acme.bad");
        assert!(bad.is_some_and(|p| p.category.is_none() && p.name.as_deref() == Some("Acme bad")));
    }

    #[test]
    fn test_empty_label_and_no_candidates() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let modules = vec![publishable(temp_dir.path(), "core", &[])];
        let clock = clock();
        let builder = MetadataBuilder::new(
            settings(temp_dir.path()),
            MetadataExtractor::default(),
            &clock,
        );

        assert!(matches!(
            builder.build(&modules, "  "),
            Err(SuiteError::Configuration(_))
        ));
        assert!(matches!(
            builder.build(&modules[..0], "1.0"),
            Err(SuiteError::NoModulesFound { .. })
        ));
    }

    #[test]
    fn test_write_and_read_back() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let base = temp_dir.path();
        let modules = vec![publishable(base, "a", &[]), publishable(base, "b", &[])];
        write_file(&modules[0].basedir.join("README.md"), "# A\n");
        write_file(&modules[0].basedir.join("src/img/shot.png"), "png");

        let clock = clock();
        let builder = MetadataBuilder::new(
            settings(&base.join("site")),
            MetadataExtractor::default(),
            &clock,
        );
        let metadata = builder.build(&modules, "3.1").unwrap_or_default();
        let written = builder.write(&metadata);
        assert!(written.is_ok(), "{:?}", written.as_ref().err());
        let path = written.unwrap_or_default();
        assert_eq!(path, base.join("site").join("plugins.json"));
        assert!(base.join("site/imgs/org.acme.a/shot.png").is_file());

        let read_back = read_from_path(&path).unwrap_or_default();
        assert_eq!(read_back.ids().collect::<Vec<_>>(), vec!["org.acme.a", "org.acme.b"]);
        let a = read_back.get_plugin("org.acme.a");
        assert!(a.is_some_and(|p| {
            p.readme.as_deref() == Some("# A\n")
                && p.images == vec![Arc::<str>::from("imgs/org.acme.a/shot.png")]
                && p.version_labels().collect::<Vec<_>>() == vec!["3.1"]
        }));
    }

    #[test]
    fn test_bundling_requires_built_members() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let base = temp_dir.path();
        let modules = vec![publishable(base, "suite", &["api"]), publishable(base, "api", &[])];
        let clock = clock();
        let mut settings = settings(&base.join("site"));
        settings.bundle_suites = true;
        let builder = MetadataBuilder::new(settings, MetadataExtractor::default(), &clock);

        assert!(matches!(
            builder.build(&modules, "1.0"),
            Err(SuiteError::OutputWrite { .. })
        ));

        write_file(&base.join("site/1.0/suite-1.0.nbm"), "suite");
        write_file(&base.join("site/1.0/api-1.0.nbm"), "api");
        assert!(builder.build(&modules, "1.0").is_ok());
        assert!(base.join("site/1.0/suite-1.0.tar.gz").is_file());
    }

    #[test]
    fn test_failed_bundle_leaves_no_output() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let base = temp_dir.path();
        let modules = vec![
            publishable(base, "a", &["b"]),
            publishable(base, "b", &[]),
            publishable(base, "c", &["d"]),
            publishable(base, "d", &[]),
        ];
        write_file(&modules[0].basedir.join("src/img/shot.png"), "png");
        for built in ["a", "b", "c"] {
            write_file(&base.join(format!("site/1.0/{built}-1.0.nbm")), built);
        }

        let clock = clock();
        let mut settings = settings(&base.join("site"));
        settings.bundle_suites = true;
        let builder = MetadataBuilder::new(settings, MetadataExtractor::default(), &clock);

        let result = builder.build(&modules, "1.0");
        assert!(matches!(
            result,
            Err(SuiteError::OutputWrite { ref path, .. }) if path.ends_with("c-1.0.tar.gz")
        ));
        assert!(!base.join("site/1.0/a-1.0.tar.gz").exists());
        assert!(!base.join("site/1.0/c-1.0.tar.gz").exists());
        assert!(!base.join("site/imgs/org.acme.a/shot.png").exists());
    }

    #[test]
    fn test_remove_written_keeps_other_files() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let ours = temp_dir.path().join("imgs/p/new.png");
        let theirs = temp_dir.path().join("imgs/p/old.png");
        write_file(&ours, "new");
        write_file(&theirs, "old");

        remove_written(&[ours.clone(), temp_dir.path().join("never-written.tar.gz")]);
        assert!(!ours.exists());
        assert!(theirs.is_file());
    }
}
