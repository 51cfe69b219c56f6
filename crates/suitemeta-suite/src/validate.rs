//! Pre-release validation of a reactor's plugin suite
//!
//! A reactor publishes exactly one plugin: either a single module, or one
//! root module bundling its dependencies. Bundled children must be hidden
//! from the client, and the root must carry license and author information.
//! Every failure is fatal here, including unreadable manifests.

use suitemeta_manifest::{read_manifest, ManifestDescriptor};
use tracing::{debug, info};

use crate::errors::SuiteError;
use crate::extractor;
use crate::module::{Module, ModuleConfigSource};
use crate::tree::{build_trees, ModuleTree};

/// The suite a reactor publishes, once every rule has passed
#[derive(Debug, Clone)]
pub struct ValidatedSuite<'a> {
    tree: ModuleTree<'a>,
    root_manifest: ManifestDescriptor,
}

impl<'a> ValidatedSuite<'a> {
    pub fn root(&self) -> &'a Module {
        self.tree.root()
    }

    pub fn children(&self) -> impl Iterator<Item = &'a Module> + '_ {
        self.tree.children()
    }

    pub fn root_manifest(&self) -> &ManifestDescriptor {
        &self.root_manifest
    }

    /// Localized name from the root's manifest bundle, else the module name
    pub fn display_name(&self) -> &str {
        self.root_manifest
            .display_name
            .as_deref()
            .unwrap_or_else(|| self.root().display_name())
    }
}

#[derive(Debug, Clone)]
pub struct Validator {
    manifest_file: String,
    packaging: String,
}

impl Validator {
    pub fn new(manifest_file: impl Into<String>, packaging: impl Into<String>) -> Self {
        Validator {
            manifest_file: manifest_file.into(),
            packaging: packaging.into(),
        }
    }

    /// Check the candidate modules of a reactor
    pub fn validate<'a, I>(&self, candidates: I) -> Result<ValidatedSuite<'a>, SuiteError>
    where
        I: IntoIterator<Item = &'a Module>,
    {
        let modules: Vec<&'a Module> = candidates.into_iter().collect();

        let tree = match modules.as_slice() {
            [] => {
                return Err(SuiteError::NoModulesFound {
                    packaging: self.packaging.clone(),
                })
            }
            [single] => {
                info!("Unique module found: '{}'", single.display_name());
                ModuleTree::singleton(*single)
            }
            _ => self.single_suite(&modules)?,
        };

        let root = tree.root();
        for child in tree.children() {
            self.check_child(child, root)?;
        }

        let root_manifest = self.check_root(root)?;
        debug!("Suite '{}' is valid", root.id);

        Ok(ValidatedSuite {
            tree,
            root_manifest,
        })
    }

    fn single_suite<'a>(&self, modules: &[&'a Module]) -> Result<ModuleTree<'a>, SuiteError> {
        let forest = build_trees(modules.iter().copied())?;
        if forest.is_empty() {
            return Err(SuiteError::NoSuiteDetected);
        }

        match forest.into_single() {
            Ok(tree) => {
                info!("Suite of modules found: '{}'", tree.root().display_name());
                Ok(tree)
            }
            Err(forest) => Err(SuiteError::MultipleSuitesDetected {
                roots: forest.roots().map(|root| root.id.to_string()).collect(),
            }),
        }
    }

    fn check_child(&self, child: &Module, root: &Module) -> Result<(), SuiteError> {
        info!("'{}' is a dependency", child.display_name());

        let manifest = self.read(child)?;
        if manifest.is_visible_in_client() {
            return Err(SuiteError::ChildVisibilityViolation {
                module: child.display_name().to_string(),
                root: root.display_name().to_string(),
            });
        }
        Ok(())
    }

    fn check_root(&self, root: &Module) -> Result<ManifestDescriptor, SuiteError> {
        if extractor::license_name(root).is_none() {
            return Err(SuiteError::MissingLicense {
                module: root.display_name().to_string(),
            });
        }
        if extractor::authors(root).is_none() {
            return Err(SuiteError::MissingAuthors {
                module: root.display_name().to_string(),
            });
        }
        self.read(root)
    }

    fn read(&self, module: &Module) -> Result<ManifestDescriptor, SuiteError> {
        read_manifest(module.base_dir(), &self.manifest_file).map_err(|source| {
            SuiteError::ManifestParse {
                module: module.display_name().to_string(),
                source,
            }
        })
    }
}
