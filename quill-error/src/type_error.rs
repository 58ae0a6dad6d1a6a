use quill_types::{Span, Spanned};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeError {
    #[error(
        "Mismatched types.\n\
         expected: {expected}\n\
         found:    {received}.\n\
         {help}",
         help = if !help_text.is_empty() { format!("help: {}", help_text) } else { String::new() }
    )]
    MismatchedType {
        expected: String,
        received: String,
        help_text: String,
        span: Span,
    },
    #[error("This type is not known. Try annotating it with a type annotation.")]
    UnknownType { span: Span },
    #[error("Type \"{name}\" is not declared in this scope.")]
    UnknownTypeName { name: String, span: Span },
    #[error(
        "Function \"{fn_name}\" is declared to return {expected} but does not end in an expression."
    )]
    MissingReturnValue {
        fn_name: String,
        expected: String,
        span: Span,
    },
    #[error("Operator \"{op}\" cannot be applied to values of type {received} in `{expression}`.")]
    InvalidOperandType {
        op: String,
        received: String,
        expression: String,
        span: Span,
    },
}

impl Spanned for TypeError {
    fn span(&self) -> Span {
        use TypeError::*;
        match self {
            MismatchedType { span, .. } => span.clone(),
            UnknownType { span } => span.clone(),
            UnknownTypeName { span, .. } => span.clone(),
            MissingReturnValue { span, .. } => span.clone(),
            InvalidOperandType { span, .. } => span.clone(),
        }
    }
}
