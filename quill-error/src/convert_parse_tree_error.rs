use quill_types::{Span, Spanned};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConvertParseTreeError {
    #[error("\"{text}\" cannot be handled yet")]
    CannotBeHandled { text: String, span: Span },
    #[error("assignment target \"{text}\" must be a variable or a field")]
    InvalidAssignmentTarget { text: String, span: Span },
    #[error("only calls can be used as statements, found \"{text}\"")]
    ExpressionStatementNotCall { text: String, span: Span },
    #[error("int literal out of range")]
    IntLiteralOutOfRange { span: Span },
    #[error("invalid float literal")]
    InvalidFloatLiteral { span: Span },
    #[error("char literals must contain exactly one character")]
    InvalidCharLiteral { span: Span },
    #[error("unknown operator \"{op}\"")]
    UnknownOperator { op: String, span: Span },
}

impl Spanned for ConvertParseTreeError {
    fn span(&self) -> Span {
        use ConvertParseTreeError::*;
        match self {
            CannotBeHandled { span, .. } => span.clone(),
            InvalidAssignmentTarget { span, .. } => span.clone(),
            ExpressionStatementNotCall { span, .. } => span.clone(),
            IntLiteralOutOfRange { span } => span.clone(),
            InvalidFloatLiteral { span } => span.clone(),
            InvalidCharLiteral { span } => span.clone(),
            UnknownOperator { span, .. } => span.clone(),
        }
    }
}
