//! Download artifacts of a module tree
//!
//! A single-module tree is published as its own `.nbm`. A suite is published
//! as one gzip'd tar holding the `.nbm` of every member.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::SuiteError;
use crate::module::ModuleId;
use crate::tree::ModuleTree;

pub const NBM_EXTENSION: &str = "nbm";
pub const SUITE_ARCHIVE_EXTENSION: &str = "tar.gz";

/// `<artifact>-<version>.nbm`
pub fn nbm_file_name(id: &ModuleId) -> String {
    format!("{}.{}", id.file_stem(), NBM_EXTENSION)
}

/// File a tree is downloaded as, relative to its version directory
pub fn download_file_name(tree: &ModuleTree<'_>) -> String {
    let root = &tree.root().id;
    if tree.is_singleton() {
        nbm_file_name(root)
    } else {
        format!("{}.{}", root.file_stem(), SUITE_ARCHIVE_EXTENSION)
    }
}

/// Pack the `.nbm` of every member found in `version_dir` into the suite archive
///
/// The archive lands next to the member files. A member without its `.nbm`
/// fails the whole bundle and no archive is left behind.
pub fn bundle_suite(tree: &ModuleTree<'_>, version_dir: &Path) -> Result<PathBuf, SuiteError> {
    let archive_path = version_dir.join(download_file_name(tree));
    let members = built_members(tree, version_dir)?;

    info!(
        "Bundling {} modules into {:?}",
        members.len(),
        archive_path
    );
    if let Err(e) = write_archive(&archive_path, &members) {
        let _ = fs::remove_file(&archive_path);
        return Err(SuiteError::output_write(&archive_path, e));
    }

    Ok(archive_path)
}

/// Member `.nbm` paths and archive entry names, failing on the first member not built yet
pub(crate) fn built_members(
    tree: &ModuleTree<'_>,
    version_dir: &Path,
) -> Result<Vec<(PathBuf, String)>, SuiteError> {
    let members: Vec<(PathBuf, String)> = tree
        .members()
        .iter()
        .map(|member| {
            let name = nbm_file_name(&member.id);
            (version_dir.join(&name), name)
        })
        .collect();

    if let Some((path, _)) = members.iter().find(|(path, _)| !path.is_file()) {
        return Err(SuiteError::output_write(
            version_dir.join(download_file_name(tree)),
            format!("suite member '{}' has not been built", path.display()),
        ));
    }
    Ok(members)
}

fn write_archive(archive_path: &Path, members: &[(PathBuf, String)]) -> std::io::Result<()> {
    let file = fs::File::create(archive_path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(encoder);

    for (path, name) in members {
        debug!("Adding {:?} to suite archive", path);
        tar.append_path_with_name(path, name)?;
    }

    tar.into_inner()?.finish()?;
    Ok(())
}

/// Url of the tree's download, relative to the output directory
///
/// With `bundle` set, a suite archive is created first.
pub fn download_path(
    tree: &ModuleTree<'_>,
    version_label: &str,
    version_dir: &Path,
    bundle: bool,
) -> Result<String, SuiteError> {
    if bundle && !tree.is_singleton() {
        bundle_suite(tree, version_dir)?;
    }
    Ok(format!("{}/{}", version_label, download_file_name(tree)))
}
