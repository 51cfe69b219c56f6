use std::fs;
use std::path::Path;

use crate::module::{DependencySpec, Module, ModuleId, NbmConfig};

pub(crate) const MANIFEST_FILE: &str = "src/main/nbm/manifest.mf";

/// An `nbm` module `org.acme:<artifact>:1.0` depending on `org.acme:<dep>` for each dep
pub(crate) fn module(artifact: &str, deps: &[&str]) -> Module {
    Module {
        id: ModuleId::new("org.acme", artifact, "1.0"),
        name: Some(format!("Acme {artifact}")),
        packaging: "nbm".to_string(),
        dependencies: deps
            .iter()
            .map(|dep| {
                format!("org.acme:{dep}")
                    .parse::<DependencySpec>()
                    .unwrap_or_else(|e| panic!("{e}"))
            })
            .collect(),
        ..Default::default()
    }
}

/// Same as [`module`] with license and authors filled in and a base directory
pub(crate) fn publishable(base: &Path, artifact: &str, deps: &[&str]) -> Module {
    Module {
        basedir: base.join(artifact),
        nbm: NbmConfig {
            license_name: Some("Apache 2.0".to_string()),
            author: Some("Ada Lovelace, Grace Hopper".to_string()),
            ..Default::default()
        },
        ..module(artifact, deps)
    }
}

pub(crate) fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        assert!(fs::create_dir_all(parent).is_ok());
    }
    assert!(fs::write(path, content).is_ok());
}

/// Write a manifest for `module`, optionally declaring `Show-In-Client`
pub(crate) fn write_manifest(module: &Module, show_in_client: Option<bool>) {
    let mut content = format!("OpenIDE-Module: {}\n", module.id.plugin_id());
    if let Some(show) = show_in_client {
        content.push_str(&format!("OpenIDE-Module-Show-In-Client: {show}\n"));
    }
    write_file(&module.basedir.join(MANIFEST_FILE), &content);
}

pub(crate) fn ids<'a>(modules: impl IntoIterator<Item = &'a Module>) -> Vec<String> {
    modules
        .into_iter()
        .map(|m| m.id.artifact.to_string())
        .collect()
}
