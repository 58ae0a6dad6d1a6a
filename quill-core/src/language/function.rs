use super::{statement::write_statement, Expression, FunctionType, Statement, Type, Variable};
use quill_types::{Ident, Named, Span, Spanned};
use std::fmt;

/// `@name` in front of a function declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub attributes: Vec<Attribute>,
    /// Undetermined until inferred from the trailing expression.
    pub return_type: Type,
    pub name: Ident,
    pub formals: Vec<Variable>,
    pub statements: Vec<Statement>,
    /// The value of the function, if it has one.
    pub trailing_expression: Option<Expression>,
    pub span: Span,
}

impl Function {
    pub fn signature(&self) -> FunctionType {
        FunctionType {
            parameters: self.formals.iter().map(|formal| formal.ty.clone()).collect(),
            return_type: Box::new(self.return_type.clone()),
        }
    }
}

impl Named for Function {
    fn name(&self) -> &Ident {
        &self.name
    }
}

impl Spanned for Function {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

pub(crate) fn write_function(
    f: &mut fmt::Formatter<'_>,
    function: &Function,
    depth: usize,
) -> fmt::Result {
    let indent = "    ".repeat(depth);
    for attr in &function.attributes {
        writeln!(f, "{indent}@{}", attr.name)?;
    }
    write!(f, "{indent}fn {}(", function.name)?;
    for (i, formal) in function.formals.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}: {}", formal.name, formal.ty)?;
    }
    writeln!(f, ") -> {} {{", function.return_type)?;
    for statement in &function.statements {
        write_statement(f, statement, depth + 1)?;
    }
    if let Some(expr) = &function.trailing_expression {
        writeln!(f, "{indent}    {expr}")?;
    }
    writeln!(f, "{indent}}}")
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_function(f, self, 0)
    }
}
