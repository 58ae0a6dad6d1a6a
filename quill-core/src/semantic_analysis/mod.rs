//! Analyses and rewrites run over a built [Module](crate::language::Module).

pub mod const_fold;
pub mod namespace;
pub mod semantic_check;
pub mod type_check;

pub use const_fold::fold_module;
pub use semantic_check::semantic_check_module;
pub use type_check::type_check_module;
