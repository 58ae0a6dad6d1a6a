use super::{clazz::write_clazz, function::write_function, Clazz, Function, Trait, Variable};
use quill_error::error::CompileError;
use quill_types::{Ident, Span, Spanned};
use std::{fmt, sync::Arc};

/// `import name;`
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub name: Ident,
    pub span: Span,
}

/// One compilation unit.
///
/// Top level names may repeat; lookups pick the most recently declared match.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: Ident,
    pub imports: Vec<Import>,
    pub variables: Vec<Variable>,
    pub functions: Vec<Function>,
    pub clazzes: Vec<Clazz>,
    pub traits: Vec<Trait>,
    pub source: Arc<str>,
    /// Errors collected by passes that do not abort compilation. Code generation must
    /// not run unless this is empty.
    pub errors: Vec<CompileError>,
}

impl Module {
    pub fn new(name: Ident, source: Arc<str>) -> Module {
        Module {
            name,
            imports: vec![],
            variables: vec![],
            functions: vec![],
            clazzes: vec![],
            traits: vec![],
            source,
            errors: vec![],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

impl Spanned for Module {
    fn span(&self) -> Span {
        Span::new(self.source.clone(), 0, self.source.len(), None).unwrap_or_else(Span::dummy)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// module {}", self.name)?;
        for import in &self.imports {
            writeln!(f, "import {};", import.name)?;
        }
        for variable in &self.variables {
            writeln!(f, "{variable};")?;
        }
        for trait_decl in &self.traits {
            write!(f, "{trait_decl}")?;
        }
        for clazz in &self.clazzes {
            write_clazz(f, clazz)?;
        }
        for function in &self.functions {
            write_function(f, function, 0)?;
        }
        Ok(())
    }
}
