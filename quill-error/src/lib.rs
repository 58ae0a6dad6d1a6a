pub mod convert_parse_tree_error;
pub mod error;
pub mod type_error;
pub mod warning;
