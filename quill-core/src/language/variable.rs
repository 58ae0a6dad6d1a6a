use super::{Expression, Type};
use quill_types::{Ident, Named, Span, Spanned};
use std::fmt;

/// A named storage slot: a global, a local, a class field or a formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub ty: Type,
    pub name: Ident,
    pub initial_expression: Option<Expression>,
    pub is_constant: bool,
    pub span: Span,
}

impl Variable {
    /// A function parameter. Formals are always constant and never initialized.
    pub fn formal(name: Ident, ty: Type, span: Span) -> Variable {
        Variable {
            ty,
            name,
            initial_expression: None,
            is_constant: true,
            span,
        }
    }

    pub fn keyword(&self) -> &'static str {
        if self.is_constant {
            "let"
        } else {
            "var"
        }
    }
}

impl Named for Variable {
    fn name(&self) -> &Ident {
        &self.name
    }
}

impl Spanned for Variable {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.keyword(), self.name, self.ty)?;
        if let Some(init) = &self.initial_expression {
            write!(f, " = {init}")?;
        }
        Ok(())
    }
}
