use crate::convert_parse_tree_error::ConvertParseTreeError;
use crate::type_error::TypeError;

use quill_types::{Ident, LineCol, Span, Spanned};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompileError {
    #[error("Error parsing input: {err}")]
    ParseFailure { span: Span, err: String },
    #[error("{0}")]
    ConvertParseTreeError(#[from] ConvertParseTreeError),
    #[error("{0}")]
    TypeError(#[from] TypeError),
    #[error("Function \"{name}\" could not be found in this scope.")]
    UnresolvedFunction { name: Ident, span: Span },
    #[error(
        "Function \"{name}\" expects {expected} argument(s) but {received} were provided."
    )]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        received: usize,
        span: Span,
    },
    #[error("Variable \"{var_name}\" does not exist in this scope.")]
    UnknownVariable { var_name: Ident, span: Span },
    #[error("Type {type_name} has no field named \"{field_name}\".")]
    FieldNotFound {
        field_name: Ident,
        type_name: String,
        span: Span,
    },
    #[error("Type {type_name} has no method named \"{method_name}\".")]
    MethodNotFound {
        method_name: Ident,
        type_name: String,
        span: Span,
    },
    #[error("The constant expression `{expression}` divides by zero.")]
    DivisionByZero { expression: String, span: Span },
    #[error("The constant expression `{expression}` overflows a 32-bit integer.")]
    IntegerOverflow { expression: String, span: Span },
    #[error("\"{name}\" needs to be a constant")]
    GlobalMustBeConstant { name: Ident, span: Span },
    #[error(
        "\"{name}\" would alias the instance of class \"{clazz_name}\" held by \"{source_name}\". \
         Implement the \"Copy\" trait on \"{clazz_name}\" to give it value semantics."
    )]
    AliasedClassInstance {
        name: Ident,
        source_name: Ident,
        clazz_name: String,
        span: Span,
    },
    #[error("Assignment to constant \"{name}\". Declare it with \"var\" to make it mutable.")]
    AssignmentToConstant { name: Ident, span: Span },
    #[error("Trait \"{name}\" does not exist in this scope.")]
    UnknownTrait { name: Ident, span: Span },
    #[error(
        "Class \"{clazz_name}\" does not implement the following methods of trait \
         \"{trait_name}\": {}.",
        missing.join(", ")
    )]
    MissingTraitMethods {
        clazz_name: Ident,
        trait_name: Ident,
        missing: Vec<String>,
        span: Span,
    },
    #[error("\"{name}\" is not a known compiler pass.")]
    UnknownPass { name: String, span: Span },
    #[error(
        "Internal compiler error: {0}\nPlease file an issue on the repository and include the \
         code that triggered this error."
    )]
    Internal(&'static str, Span),
}

impl Spanned for CompileError {
    fn span(&self) -> Span {
        use CompileError::*;
        match self {
            ParseFailure { span, .. } => span.clone(),
            ConvertParseTreeError(err) => err.span(),
            TypeError(err) => err.span(),
            UnresolvedFunction { span, .. } => span.clone(),
            ArgumentCountMismatch { span, .. } => span.clone(),
            UnknownVariable { span, .. } => span.clone(),
            FieldNotFound { span, .. } => span.clone(),
            MethodNotFound { span, .. } => span.clone(),
            DivisionByZero { span, .. } => span.clone(),
            IntegerOverflow { span, .. } => span.clone(),
            GlobalMustBeConstant { span, .. } => span.clone(),
            AliasedClassInstance { span, .. } => span.clone(),
            AssignmentToConstant { span, .. } => span.clone(),
            UnknownTrait { span, .. } => span.clone(),
            MissingTraitMethods { span, .. } => span.clone(),
            UnknownPass { span, .. } => span.clone(),
            Internal(_, span) => span.clone(),
        }
    }
}

impl CompileError {
    pub fn path(&self) -> Option<std::path::PathBuf> {
        self.span().path().map(|path| path.as_ref().clone())
    }

    /// Returns the line and column start and end.
    pub fn line_col(&self) -> (LineCol, LineCol) {
        self.span().line_col()
    }

    /// The error message prefixed with the position it refers to, if known.
    pub fn to_friendly_error_string(&self) -> String {
        let span = self.span();
        if span.is_dummy() {
            self.to_string()
        } else {
            format!("{}: {}", span.location(), self)
        }
    }
}
