use crate::language::Module;
use parking_lot::RwLock;
use std::sync::Arc;

/// Position of a module snapshot in the [ModuleRegistry].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(usize);

/// Every module compiled so far, as immutable snapshots.
///
/// Publishing appends; nothing is ever replaced or removed. Looking a module up by name
/// returns the most recently published snapshot, so republishing a module after analysis
/// supersedes the raw one. A module is only visible once it is published, which happens
/// after it has been fully built.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: RwLock<Vec<Arc<Module>>>,
}

impl ModuleRegistry {
    pub fn publish(&self, module: Module) -> ModuleId {
        let mut modules = self.modules.write();
        modules.push(Arc::new(module));
        ModuleId(modules.len() - 1)
    }

    pub fn get(&self, name: &str) -> Option<Arc<Module>> {
        self.modules
            .read()
            .iter()
            .rev()
            .find(|module| module.name.as_str() == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

/// State shared by every compilation in one compiler invocation.
///
/// Passed explicitly to the builder and the passes; there is no global state.
#[derive(Debug, Default)]
pub struct CompilationContext {
    registry: ModuleRegistry,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_types::Ident;
    use rayon::prelude::*;

    fn module(name: &str, source: &str) -> Module {
        Module::new(Ident::new_no_span(name.into()), Arc::from(source))
    }

    #[test]
    fn last_published_snapshot_wins() {
        let registry = ModuleRegistry::default();
        let raw = registry.publish(module("shapes", "raw"));
        let analyzed = registry.publish(module("shapes", "analyzed"));
        assert_ne!(raw, analyzed);

        let found = registry.get("shapes").unwrap();
        assert_eq!(&*found.source, "analyzed");
        assert!(registry.get("geometry").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn concurrent_publish_and_lookup() {
        let ctx = CompilationContext::new();
        (0..64).into_par_iter().for_each(|i| {
            let name = format!("module_{i}");
            ctx.registry().publish(module(&name, "source"));
            assert!(ctx.registry().get(&name).is_some());
        });
        assert_eq!(ctx.registry().len(), 64);
    }
}
