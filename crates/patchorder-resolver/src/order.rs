use std::collections::HashSet;

use anyhow::Result;
use indexmap::IndexSet;

use crate::error::CyclicDependency;
use crate::registry::PatchRegistry;

/// A patch whose declared dependencies are being walked.
struct Expansion {
    patch: String,
    dependencies: std::vec::IntoIter<String>,
}

impl PatchRegistry<'_> {
    pub(crate) fn compute_install_order(&mut self) -> Result<Vec<String>> {
        let mut ordered: IndexSet<String> = IndexSet::new();
        let mut roots = self.patches.clone();

        while let Some((_, root)) = roots.shift_remove_index(0) {
            let dependencies = self.resolve_dependencies(&root)?;
            roots.retain(|_, canonical| !dependencies.contains(canonical));

            ordered.extend(dependencies);
            ordered.insert(root);
        }

        Ok(ordered.into_iter().collect())
    }

    /// Flattens the unapplied dependencies of `root` into dependency-first
    /// order. `root` itself is not part of the result.
    ///
    /// Applied dependencies are not walked: everything below an applied patch
    /// is assumed to be applied as well.
    fn resolve_dependencies(&mut self, root: &str) -> Result<IndexSet<String>> {
        let mut resolved: IndexSet<String> = IndexSet::new();
        let mut in_progress: HashSet<String> = HashSet::new();
        let mut stack = vec![self.expand(root)?];
        in_progress.insert(root.to_string());

        while let Some(current) = stack.last_mut() {
            let Some(dependency) = current.dependencies.next() else {
                if let Some(done) = stack.pop() {
                    in_progress.remove(&done.patch);
                    if !stack.is_empty() {
                        resolved.insert(done.patch);
                    }
                }
                continue;
            };

            let canonical = self.aliases.resolve(&dependency);
            if in_progress.contains(&canonical) {
                return Err(CyclicDependency {
                    patch: current.patch.clone(),
                    dependency: canonical,
                }
                .into());
            }

            let Some(registered) = self.register_patch(&dependency)? else {
                continue;
            };
            if resolved.contains(&registered) {
                continue;
            }

            in_progress.insert(registered.clone());
            stack.push(self.expand(&registered)?);
        }

        Ok(resolved)
    }

    fn expand(&self, patch: &str) -> Result<Expansion> {
        let dependencies = self.catalog.dependencies(patch)?;
        tracing::trace!(patch, count = dependencies.len(), "expanding dependencies");
        Ok(Expansion {
            patch: patch.to_string(),
            dependencies: dependencies.into_iter(),
        })
    }

    pub(crate) fn compute_uninstall_order(&mut self) -> Vec<String> {
        let mut ordered: IndexSet<String> = IndexSet::new();

        while let Some((_, patch)) = self.applied.pop() {
            self.drain_dependents(&patch, &mut ordered);
            ordered.insert(patch);
        }

        ordered.into_iter().collect()
    }

    /// Moves every still-applied patch that depends on `patch`, directly or
    /// through other applied patches, into `ordered`, dependents first.
    fn drain_dependents(&mut self, patch: &str, ordered: &mut IndexSet<String>) {
        let Some(dependents) = self.dependents.get(patch).cloned() else {
            return;
        };

        for dependent in dependents {
            let Some(dependent) = self.take_applied(&dependent) else {
                continue;
            };
            self.drain_dependents(&dependent, ordered);
            ordered.insert(dependent);
        }
    }

    fn take_applied(&mut self, canonical: &str) -> Option<String> {
        let index = self
            .applied
            .get_index_of(canonical)
            .or_else(|| self.applied.values().position(|name| name == canonical))?;
        self.applied
            .shift_remove_index(index)
            .map(|(_, canonical)| canonical)
    }
}
