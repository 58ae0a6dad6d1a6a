//! The abstract syntax tree produced from the parse tree and annotated by the passes.

mod clazz;
mod expression;
mod function;
mod module;
mod operator;
mod reference;
mod statement;
mod ty;
mod variable;

pub use clazz::*;
pub use expression::*;
pub use function::*;
pub use module::*;
pub use operator::*;
pub use reference::*;
pub use statement::*;
pub use ty::*;
pub use variable::*;
