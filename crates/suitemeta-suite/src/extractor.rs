//! Per-module metadata extraction
//!
//! Reads what a plugin record needs from a module's typed configuration and
//! its base directory. Everything here is optional data: missing files and
//! read failures come back as `None` or an empty list.

use smallvec::SmallVec;
use std::fs;
use std::path::{Path, PathBuf};
use suitemeta_manifest::Author;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::module::ModuleConfigSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

pub fn license_name<S: ModuleConfigSource + ?Sized>(source: &S) -> Option<String> {
    source.license_name().map(str::to_string)
}

/// Comma separated author list, trimmed, empty pieces dropped
pub fn authors<S: ModuleConfigSource + ?Sized>(source: &S) -> Option<SmallVec<[Author; 2]>> {
    let raw = source.authors_raw()?;
    let authors: SmallVec<[Author; 2]> = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Author::new)
        .collect();

    if authors.is_empty() {
        None
    } else {
        Some(authors)
    }
}

pub fn homepage<S: ModuleConfigSource + ?Sized>(source: &S) -> Option<String> {
    source.homepage_url().map(str::to_string)
}

pub fn sourcecode<S: ModuleConfigSource + ?Sized>(source: &S) -> Option<String> {
    source.sourcecode_url().map(str::to_string)
}

/// Reads readme text and screenshots relative to a module base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataExtractor {
    readme_file: PathBuf,
    screenshots_dir: PathBuf,
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        MetadataExtractor {
            readme_file: PathBuf::from("README.md"),
            screenshots_dir: PathBuf::from("src/img"),
        }
    }
}

impl MetadataExtractor {
    pub fn new(readme_file: impl Into<PathBuf>, screenshots_dir: impl Into<PathBuf>) -> Self {
        MetadataExtractor {
            readme_file: readme_file.into(),
            screenshots_dir: screenshots_dir.into(),
        }
    }

    fn readme_path<S: ModuleConfigSource + ?Sized>(&self, source: &S) -> PathBuf {
        let file = source.readme_file().unwrap_or(self.readme_file.as_path());
        source.base_dir().join(file)
    }

    fn screenshots_path<S: ModuleConfigSource + ?Sized>(&self, source: &S) -> PathBuf {
        let dir = source.screenshots_dir().unwrap_or(self.screenshots_dir.as_path());
        source.base_dir().join(dir)
    }

    /// Readme content, every line terminated by `\n`
    pub fn readme<S: ModuleConfigSource + ?Sized>(&self, source: &S) -> Option<String> {
        let path = self.readme_path(source);
        if !path.is_file() {
            debug!("No readme at {:?}", path);
            return None;
        }

        match fs::read_to_string(&path) {
            Ok(content) => Some(content.lines().fold(
                String::with_capacity(content.len() + 1),
                |mut normalized, line| {
                    normalized.push_str(line);
                    normalized.push('\n');
                    normalized
                },
            )),
            Err(e) => {
                warn!("Failed to read readme {:?}: {}", path, e);
                None
            }
        }
    }

    /// Image files of the screenshot directory, sorted by file name
    pub fn screenshots<S: ModuleConfigSource + ?Sized>(&self, source: &S) -> Vec<PathBuf> {
        let dir = self.screenshots_path(source);
        if !dir.is_dir() {
            return Vec::new();
        }

        WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && is_image(e.path()))
            .map(|e| e.into_path())
            .collect()
    }

    /// Copy the module's screenshots into `destination`
    ///
    /// Returns `<url_prefix><file name>` for every copied image. A file that
    /// can't be copied is logged and left out.
    pub fn copy_screenshots<S: ModuleConfigSource + ?Sized>(
        &self,
        source: &S,
        destination: &Path,
        url_prefix: &str,
    ) -> Vec<String> {
        let images = self.screenshots(source);
        if images.is_empty() {
            return Vec::new();
        }

        if let Err(e) = fs::create_dir_all(destination) {
            warn!("Failed to create screenshot directory {:?}: {}", destination, e);
            return Vec::new();
        }

        let mut urls = Vec::with_capacity(images.len());
        for image in images {
            let Some(file_name) = image.file_name() else {
                continue;
            };
            let target = destination.join(file_name);
            match fs::copy(&image, &target) {
                Ok(_) => {
                    debug!("Copied screenshot {:?} to {:?}", image, target);
                    urls.push(format!("{}{}", url_prefix, file_name.to_string_lossy()));
                }
                Err(e) => warn!("Failed to copy screenshot {:?}: {}", image, e),
            }
        }
        urls
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
