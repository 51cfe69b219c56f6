//! Plugin suite discovery and metadata
//!
//! Given the projects of a reactor build, this crate finds the plugin
//! modules, groups them into suites (one root plus the modules it packages),
//! validates a suite before release, and assembles the `plugins.json`
//! records describing every root.

pub mod bundle;
pub mod clock;
pub mod errors;
pub mod extractor;
pub mod metadata;
pub mod module;
pub mod reactor;
pub mod tree;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::SuiteError;
pub use extractor::MetadataExtractor;
pub use metadata::{BuildSettings, MetadataBuilder};
pub use module::{DependencySpec, Module, ModuleConfigSource, ModuleId, NbmConfig};
pub use reactor::Reactor;
pub use tree::{build_trees, ModuleForest, ModuleTree};
pub use validate::{ValidatedSuite, Validator};
