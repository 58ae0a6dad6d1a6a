use crate::{
    error::{err, ok, CompileResult},
    language::Module,
    semantic_analysis::{fold_module, semantic_check_module, type_check_module},
    CompilationContext,
};
use indexmap::{map::Entry, IndexMap};
use quill_error::error::CompileError;
use quill_types::Span;

pub const TYPE_CHECK_NAME: &str = "type-check";
pub const CONST_FOLD_NAME: &str = "const-fold";
pub const SEMANTIC_CHECK_NAME: &str = "semantic-check";

/// The passes run by a default build, in order.
pub const DEFAULT_PASSES: &[&str] = &[TYPE_CHECK_NAME, CONST_FOLD_NAME, SEMANTIC_CHECK_NAME];

/// What happens to the errors a pass reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Any error stops the pipeline.
    Abort,
    /// Errors are recorded on the module and the pipeline continues.
    Collect,
}

pub type PassRunner = fn(&CompilationContext, &mut Module) -> CompileResult<()>;

pub struct Pass {
    pub name: &'static str,
    pub descr: &'static str,
    pub policy: ErrorPolicy,
    pub runner: PassRunner,
}

#[derive(Default)]
pub struct PassManager {
    passes: IndexMap<&'static str, Pass>,
}

impl PassManager {
    /// A pass manager with the type, folding and semantic passes registered.
    pub fn with_default_passes() -> Self {
        let mut pm = PassManager::default();
        pm.register(Pass {
            name: TYPE_CHECK_NAME,
            descr: "Resolve names and infer and check types",
            policy: ErrorPolicy::Abort,
            runner: type_check_module,
        });
        pm.register(Pass {
            name: CONST_FOLD_NAME,
            descr: "Fold constant integer arithmetic",
            policy: ErrorPolicy::Abort,
            runner: run_const_fold,
        });
        pm.register(Pass {
            name: SEMANTIC_CHECK_NAME,
            descr: "Collect constancy, aliasing, trait and scoping errors",
            policy: ErrorPolicy::Collect,
            runner: semantic_check_module,
        });
        pm
    }

    /// Register a pass. A pass registered under the name of an earlier one replaces it.
    pub fn register(&mut self, pass: Pass) -> &'static str {
        let pass_name = pass.name;
        match self.passes.entry(pass.name) {
            Entry::Occupied(mut entry) => {
                tracing::warn!("pass \"{pass_name}\" registered twice, keeping the latest");
                entry.insert(pass);
            }
            Entry::Vacant(entry) => {
                entry.insert(pass);
            }
        }
        pass_name
    }

    /// Run the passes specified in `config` over `module`, in order.
    ///
    /// The pipeline stops at the first pass that fails under [ErrorPolicy::Abort].
    /// Errors of [ErrorPolicy::Collect] passes are appended to [Module::errors].
    pub fn run(
        &self,
        ctx: &CompilationContext,
        module: &mut Module,
        config: &PassManagerConfig,
    ) -> CompileResult<()> {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        for name in &config.to_run {
            let Some(pass) = self.passes.get(name.as_str()) else {
                errors.push(CompileError::UnknownPass {
                    name: name.clone(),
                    span: Span::dummy(),
                });
                return err(warnings, errors);
            };
            if config.print_passes {
                tracing::info!("running pass \"{}\" on module \"{}\"", pass.name, module.name);
            } else {
                tracing::debug!("running pass \"{}\" on module \"{}\"", pass.name, module.name);
            }

            let mut res = (pass.runner)(ctx, module);
            warnings.append(&mut res.warnings);
            match pass.policy {
                _ if res.value.is_none() => {
                    errors.append(&mut res.errors);
                    return err(warnings, errors);
                }
                ErrorPolicy::Abort if !res.errors.is_empty() => {
                    errors.append(&mut res.errors);
                    return err(warnings, errors);
                }
                ErrorPolicy::Abort => (),
                ErrorPolicy::Collect => {
                    tracing::debug!(
                        "pass \"{}\" collected {} error(s)",
                        pass.name,
                        res.errors.len()
                    );
                    module.errors.append(&mut res.errors);
                }
            }
        }
        ok((), warnings, errors)
    }

    /// Is `name` a registered pass?
    pub fn is_registered(&self, name: &str) -> bool {
        self.passes.contains_key(name)
    }

    pub fn help_text(&self) -> String {
        let summary = self
            .passes
            .iter()
            .map(|(name, pass)| format!("  {name:16} - {}", pass.descr))
            .collect::<Vec<_>>()
            .join("\n");

        format!("Valid pass names are:\n\n{summary}",)
    }
}

fn run_const_fold(_: &CompilationContext, module: &mut Module) -> CompileResult<()> {
    fold_module(module)
}

/// Configuration for the pass manager to run passes.
#[derive(Debug, Clone, Default)]
pub struct PassManagerConfig {
    pub to_run: Vec<String>,
    pub print_passes: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_module;
    use pretty_assertions::assert_eq;

    fn config(passes: &[&str]) -> PassManagerConfig {
        PassManagerConfig {
            to_run: passes.iter().map(|p| p.to_string()).collect(),
            print_passes: false,
        }
    }

    #[test]
    fn default_passes_are_registered_in_order() {
        let pm = PassManager::with_default_passes();
        for name in DEFAULT_PASSES {
            assert!(pm.is_registered(name));
        }
        let help = pm.help_text();
        let type_check = help.find(TYPE_CHECK_NAME).unwrap();
        let semantic = help.find(SEMANTIC_CHECK_NAME).unwrap();
        assert!(type_check < semantic);
    }

    #[test]
    fn unknown_pass_is_an_error() {
        let ctx = CompilationContext::new();
        let mut module = parse_module("let a = 1;");
        let res = PassManager::with_default_passes().run(&ctx, &mut module, &config(&["inline"]));
        assert!(res.value.is_none());
        assert!(matches!(
            &res.errors[..],
            [CompileError::UnknownPass { name, .. }] if name == "inline"
        ));
    }

    #[test]
    fn collected_errors_land_on_the_module_and_later_passes_still_run() {
        fn count_errors(_: &CompilationContext, module: &mut Module) -> CompileResult<()> {
            module.variables.truncate(module.errors.len());
            ok((), vec![], vec![])
        }

        let ctx = CompilationContext::new();
        let mut pm = PassManager::with_default_passes();
        pm.register(Pass {
            name: "count",
            descr: "Keep as many globals as there are errors",
            policy: ErrorPolicy::Abort,
            runner: count_errors,
        });
        let mut module = parse_module("var a = 1; var b = 2; var c = 3; let d = 4;");
        let passes = config(&[TYPE_CHECK_NAME, SEMANTIC_CHECK_NAME, "count"]);
        let res = pm.run(&ctx, &mut module, &passes);
        assert!(res.is_ok());
        assert_eq!(module.errors.len(), 3);
        assert_eq!(module.variables.len(), 3);
    }

    #[test]
    fn abort_policy_stops_the_pipeline() {
        let ctx = CompilationContext::new();
        let mut module = parse_module("var a = 1 / 0; let b = true + 1;");
        let res = PassManager::with_default_passes().run(
            &ctx,
            &mut module,
            &config(&[CONST_FOLD_NAME, TYPE_CHECK_NAME, SEMANTIC_CHECK_NAME]),
        );
        assert!(res.value.is_none());
        assert!(matches!(res.errors[..], [CompileError::DivisionByZero { .. }]));
        assert!(module.errors.is_empty());
    }
}
