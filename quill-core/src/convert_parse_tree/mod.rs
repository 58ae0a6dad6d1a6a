//! Turns the pest parse tree of one source file into a [Module].

mod declaration;
mod expression;
mod statement;

use crate::{
    error::{err, ok, CompileResult},
    language::Module,
    parser::Rule,
    BuildConfig, CompilationContext,
};
use pest::iterators::Pair;
use quill_error::{
    convert_parse_tree_error::ConvertParseTreeError,
    error::CompileError,
    warning::{CompileWarning, Warning},
};
use quill_types::{constants, Ident, Span, Spanned};
use std::{collections::HashSet, path::PathBuf, sync::Arc};

/// Builds the module for `program` and publishes it to the registry of `ctx`.
///
/// Any shape the builder does not recognize is fatal.
pub fn convert_parse_tree(
    ctx: &CompilationContext,
    program: Pair<Rule>,
    module_name: &str,
    source: Arc<str>,
    config: Option<&BuildConfig>,
) -> CompileResult<Module> {
    let path = config.and_then(|c| c.file_path.clone());
    let mut converter = Converter::new(source, path, module_name);
    match converter.module(program) {
        Ok(module) => {
            let id = ctx.registry().publish(module.clone());
            tracing::debug!("built module \"{}\" as {:?}", module.name, id);
            ok(module, converter.warnings, vec![])
        }
        Err(e) => err(converter.warnings, vec![e]),
    }
}

pub(crate) struct Converter {
    src: Arc<str>,
    path: Option<Arc<PathBuf>>,
    module_name: Ident,
    warnings: Vec<CompileWarning>,
}

impl Converter {
    fn new(src: Arc<str>, path: Option<Arc<PathBuf>>, module_name: &str) -> Self {
        Converter {
            src,
            path,
            module_name: Ident::new_no_span(module_name.to_string()),
            warnings: vec![],
        }
    }

    fn span(&self, pair: &Pair<Rule>) -> Span {
        let span = pair.as_span();
        Span::new(self.src.clone(), span.start(), span.end(), self.path.clone())
            .unwrap_or_else(Span::dummy)
    }

    /// A name in the program's namespace. `main` is renamed wherever it is declared or
    /// used, so the entry point and every use of it keep agreeing.
    fn ident(&self, pair: &Pair<Rule>) -> Ident {
        let ident = self.raw_ident(pair);
        if ident.as_str() == constants::DEFAULT_ENTRY_POINT_FN_NAME {
            Ident::new_with_override(
                constants::RENAMED_ENTRY_POINT_FN_NAME.to_string(),
                ident.span(),
            )
        } else {
            ident
        }
    }

    /// A name outside the program's namespace: a module or an attribute.
    fn raw_ident(&self, pair: &Pair<Rule>) -> Ident {
        Ident::new(self.span(pair))
    }

    fn cannot_handle(&self, pair: &Pair<Rule>) -> CompileError {
        ConvertParseTreeError::CannotBeHandled {
            text: pair.as_str().to_string(),
            span: self.span(pair),
        }
        .into()
    }

    fn warn(&mut self, span: Span, warning_content: Warning) {
        self.warnings.push(CompileWarning {
            span,
            warning_content,
        });
    }

    /// Records `name` as declared in the current declaration scope, warning if it was
    /// declared there before.
    fn note_declared(&mut self, declared: &mut HashSet<Ident>, name: &Ident) {
        if !declared.insert(name.clone()) {
            self.warn(
                name.span(),
                Warning::ShadowsOtherSymbol { name: name.clone() },
            );
        }
    }

    fn module(&mut self, program: Pair<Rule>) -> Result<Module, CompileError> {
        let mut module = Module::new(self.module_name.clone(), self.src.clone());
        let mut declarations = vec![];
        for pair in program.into_inner() {
            match pair.as_rule() {
                Rule::external_declaration => {
                    declarations.extend(pair.into_inner());
                }
                Rule::EOI => (),
                _ => return Err(self.cannot_handle(&pair)),
            }
        }

        let mut declared = HashSet::new();
        for pair in of_rule(&declarations, Rule::import_declaration) {
            module.imports.push(self.import_declaration(pair)?);
        }
        for pair in of_rule(&declarations, Rule::variable_declaration_statement) {
            let variable = self.variable_declaration_statement(pair)?;
            self.note_declared(&mut declared, &variable.name);
            module.variables.push(variable);
        }
        for pair in declarations.iter().cloned() {
            match pair.as_rule() {
                Rule::class_declaration => {
                    let clazz = self.clazz_declaration(pair)?;
                    self.note_declared(&mut declared, &clazz.name);
                    module.clazzes.push(clazz);
                }
                Rule::trait_declaration => {
                    let trait_decl = self.trait_declaration(pair)?;
                    self.note_declared(&mut declared, &trait_decl.name);
                    module.traits.push(trait_decl);
                }
                _ => (),
            }
        }
        for pair in of_rule(&declarations, Rule::function_declaration) {
            let function = self.function_declaration(pair)?;
            self.note_declared(&mut declared, &function.name);
            module.functions.push(function);
        }

        let unexpected = declarations.iter().find(|pair| {
            !matches!(
                pair.as_rule(),
                Rule::import_declaration
                    | Rule::variable_declaration_statement
                    | Rule::class_declaration
                    | Rule::trait_declaration
                    | Rule::function_declaration
            )
        });
        if let Some(pair) = unexpected {
            return Err(self.cannot_handle(pair));
        }

        Ok(module)
    }
}

fn of_rule<'i>(pairs: &[Pair<'i, Rule>], rule: Rule) -> Vec<Pair<'i, Rule>> {
    pairs
        .iter()
        .filter(|pair| pair.as_rule() == rule)
        .cloned()
        .collect()
}
