//! Module tree reconstruction
//!
//! A reactor lists its plugin modules flat. The modules a plugin depends on
//! are packaged with it, so the candidates form a forest: every root is a
//! module nobody else in the candidate set depends on, and its tree holds
//! everything reachable from it through dependency edges between
//! candidates.
//!
//! Algorithm:
//! 1. resolve each declared dependency against the candidate set;
//! 2. compute each candidate's closure (reachable candidates, excluding
//!    itself) with a per-walk visited set, so cycles terminate;
//! 3. a candidate is a root iff it lies in no other candidate's closure;
//! 4. a tree is the root plus its closure, in input order.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::errors::SuiteError;
use crate::module::{Module, ModuleId};

/// One root module and the candidates packaged with it
#[derive(Debug, Clone)]
pub struct ModuleTree<'a> {
    root: &'a Module,
    /// Root included, in candidate input order
    members: Vec<&'a Module>,
}

impl<'a> ModuleTree<'a> {
    pub fn root(&self) -> &'a Module {
        self.root
    }

    pub fn members(&self) -> &[&'a Module] {
        &self.members
    }

    /// Members other than the root
    pub fn children(&self) -> impl Iterator<Item = &'a Module> + '_ {
        let root_id = &self.root.id;
        self.members
            .iter()
            .copied()
            .filter(move |m| &m.id != root_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A tree made of the root alone
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub(crate) fn singleton(root: &'a Module) -> Self {
        ModuleTree {
            root,
            members: vec![root],
        }
    }
}

/// All trees found among the candidates, keyed by root, roots in input order
#[derive(Debug, Clone, Default)]
pub struct ModuleForest<'a> {
    trees: IndexMap<ModuleId, ModuleTree<'a>>,
}

impl<'a> ModuleForest<'a> {
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn get(&self, root: &ModuleId) -> Option<&ModuleTree<'a>> {
        self.trees.get(root)
    }

    pub fn roots(&self) -> impl Iterator<Item = &'a Module> + '_ {
        self.trees.values().map(|tree| tree.root)
    }

    pub fn trees(&self) -> impl Iterator<Item = &ModuleTree<'a>> {
        self.trees.values()
    }

    /// The only tree of the forest, if there is exactly one
    pub fn into_single(self) -> Result<ModuleTree<'a>, Self> {
        if self.trees.len() == 1 {
            if let Some((_, tree)) = self.trees.into_iter().next() {
                return Ok(tree);
            }
            return Err(ModuleForest::default());
        }
        Err(self)
    }
}

impl<'a> IntoIterator for ModuleForest<'a> {
    type Item = ModuleTree<'a>;
    type IntoIter = indexmap::map::IntoValues<ModuleId, ModuleTree<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.trees.into_values()
    }
}

/// Partition `candidates` into module trees
///
/// Fails with [`SuiteError::DependencyCycle`] when a cycle leaves candidates
/// that no root reaches.
pub fn build_trees<'a, I>(candidates: I) -> Result<ModuleForest<'a>, SuiteError>
where
    I: IntoIterator<Item = &'a Module>,
{
    let modules: Vec<&'a Module> = candidates.into_iter().collect();
    let edges = resolve_edges(&modules);
    let closures: Vec<IndexSet<usize>> = (0..modules.len())
        .map(|start| closure(start, &edges))
        .collect();

    let mut contained = vec![false; modules.len()];
    for (owner, reached) in closures.iter().enumerate() {
        for &idx in reached {
            if idx != owner {
                contained[idx] = true;
            }
        }
    }

    let roots: Vec<usize> = (0..modules.len()).filter(|&i| !contained[i]).collect();

    let mut covered = vec![false; modules.len()];
    let mut trees = IndexMap::with_capacity(roots.len());
    for &root in &roots {
        let mut member_idx: Vec<usize> = std::iter::once(root)
            .chain(closures[root].iter().copied())
            .collect();
        member_idx.sort_unstable();
        member_idx.dedup();

        for &idx in &member_idx {
            covered[idx] = true;
        }

        let tree = ModuleTree {
            root: modules[root],
            members: member_idx.iter().map(|&idx| modules[idx]).collect(),
        };
        debug!(
            "Module tree rooted at '{}' with {} member(s)",
            tree.root.id,
            tree.len()
        );
        trees.insert(modules[root].id.clone(), tree);
    }

    let uncovered: Vec<String> = covered
        .iter()
        .enumerate()
        .filter(|(_, &is_covered)| !is_covered)
        .map(|(idx, _)| modules[idx].id.to_string())
        .collect();
    if !uncovered.is_empty() {
        return Err(SuiteError::DependencyCycle {
            modules: uncovered,
        });
    }

    Ok(ModuleForest { trees })
}

/// Outgoing edges between candidates, by index
fn resolve_edges(modules: &[&Module]) -> Vec<Vec<usize>> {
    modules
        .iter()
        .enumerate()
        .map(|(from, module)| {
            let mut targets: Vec<usize> = Vec::new();
            for dep in &module.dependencies {
                let target = modules
                    .iter()
                    .enumerate()
                    .find(|(to, candidate)| *to != from && dep.matches(&candidate.id))
                    .map(|(to, _)| to);
                if let Some(to) = target {
                    if !targets.contains(&to) {
                        trace!("'{}' depends on candidate '{}'", module.id, modules[to].id);
                        targets.push(to);
                    }
                }
            }
            targets
        })
        .collect()
}

/// Candidates reachable from `start`, excluding `start` itself
fn closure(start: usize, edges: &[Vec<usize>]) -> IndexSet<usize> {
    let mut visited: IndexSet<usize> = IndexSet::new();
    let mut stack: Vec<usize> = edges[start].clone();

    while let Some(node) = stack.pop() {
        if node == start || !visited.insert(node) {
            continue;
        }
        stack.extend(edges[node].iter().copied());
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ids, module};

    fn roots(forest: &ModuleForest<'_>) -> Vec<String> {
        ids(forest.roots())
    }

    fn members(forest: &ModuleForest<'_>, root: &Module) -> Vec<String> {
        forest
            .get(&root.id)
            .map(|tree| ids(tree.members().iter().copied()))
            .unwrap_or_default()
    }

    #[test]
    fn test_no_edges_gives_singletons() {
        let modules = vec![module("a", &[]), module("b", &[]), module("c", &[])];
        let forest = build_trees(&modules);
        assert!(forest.is_ok());
        let forest = forest.unwrap_or_default();

        assert_eq!(roots(&forest), vec!["a", "b", "c"]);
        for m in &modules {
            assert_eq!(members(&forest, m), vec![m.id.artifact.to_string()]);
            assert!(forest.get(&m.id).is_some_and(ModuleTree::is_singleton));
        }
    }

    #[test]
    fn test_linear_chain_has_single_root() {
        // a -> b -> c
        let modules = vec![module("a", &["b"]), module("b", &["c"]), module("c", &[])];
        let forest = build_trees(&modules).unwrap_or_default();

        assert_eq!(roots(&forest), vec!["a"]);
        assert_eq!(members(&forest, &modules[0]), vec!["a", "b", "c"]);
        assert!(forest.get(&modules[1].id).is_none());
        assert!(forest.get(&modules[2].id).is_none());
    }

    #[test]
    fn test_disjoint_chains() {
        let modules = vec![
            module("a", &["b"]),
            module("b", &[]),
            module("c", &["d"]),
            module("d", &[]),
        ];
        let forest = build_trees(&modules).unwrap_or_default();

        assert_eq!(forest.len(), 2);
        assert_eq!(members(&forest, &modules[0]), vec!["a", "b"]);
        assert_eq!(members(&forest, &modules[2]), vec!["c", "d"]);
    }

    #[test]
    fn test_members_follow_input_order() {
        // Root listed last, children listed in reverse dependency order
        let modules = vec![module("c", &[]), module("b", &["c"]), module("a", &["b"])];
        let forest = build_trees(&modules).unwrap_or_default();

        assert_eq!(roots(&forest), vec!["a"]);
        assert_eq!(members(&forest, &modules[2]), vec!["c", "b", "a"]);

        let tree = forest.get(&modules[2].id);
        assert!(tree.is_some_and(|t| ids(t.children()) == vec!["c", "b"]));
    }

    #[test]
    fn test_diamond_is_deduplicated() {
        let modules = vec![
            module("a", &["b", "c"]),
            module("b", &["d"]),
            module("c", &["d"]),
            module("d", &[]),
        ];
        let forest = build_trees(&modules).unwrap_or_default();

        assert_eq!(roots(&forest), vec!["a"]);
        assert_eq!(members(&forest, &modules[0]), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_edges_outside_candidates_are_ignored() {
        let modules = vec![module("a", &["platform", "b"]), module("b", &["a-api"])];
        let forest = build_trees(&modules).unwrap_or_default();

        assert_eq!(roots(&forest), vec!["a"]);
        assert_eq!(members(&forest, &modules[0]), vec!["a", "b"]);
    }

    #[test]
    fn test_pure_cycle_fails_fast() {
        let modules = vec![module("a", &["b"]), module("b", &["a"])];
        let result = build_trees(&modules);
        assert!(matches!(
            result,
            Err(SuiteError::DependencyCycle { ref modules }) if modules.len() == 2
        ));
    }

    #[test]
    fn test_cycle_below_a_root_terminates() {
        let modules = vec![module("x", &["a"]), module("a", &["b"]), module("b", &["a"])];
        let forest = build_trees(&modules).unwrap_or_default();

        assert_eq!(roots(&forest), vec!["x"]);
        assert_eq!(members(&forest, &modules[0]), vec!["x", "a", "b"]);
    }

    #[test]
    fn test_single_tree_extraction() {
        let modules = vec![module("a", &["b"]), module("b", &[])];
        let forest = build_trees(&modules).unwrap_or_default();
        let single = forest.into_single();
        assert!(single.is_ok_and(|tree| tree.root().id.artifact.as_ref() == "a"));

        let modules = vec![module("a", &[]), module("b", &[])];
        let forest = build_trees(&modules).unwrap_or_default();
        assert!(forest.into_single().is_err_and(|forest| forest.len() == 2));
    }

    #[test]
    fn test_empty_candidates() {
        let modules: Vec<Module> = Vec::new();
        assert!(build_trees(&modules).is_ok_and(|forest| forest.is_empty()));
    }
}
