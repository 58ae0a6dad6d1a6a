//! Configurable yet non-changing constants for the compiler.

/// The default extension of [LANGUAGE_NAME] files, e.g. `main.ql`.
pub const DEFAULT_FILE_EXTENSION: &str = "ql";
pub const LANGUAGE_NAME: &str = "Quill";

/// The entry point as written by the user.
pub const DEFAULT_ENTRY_POINT_FN_NAME: &str = "main";
/// The name the user's entry point is given internally, so that a backend can
/// wrap it with its own `main`.
pub const RENAMED_ENTRY_POINT_FN_NAME: &str = "__quill_main";

/// A class method with this name becomes the class constructor.
pub const CONSTRUCTOR_NAME: &str = "init";

/// Refers to the enclosing class instance inside of a method body.
pub const THIS_KEYWORD: &str = "this";

/// The built-in marker trait that gives a class value semantics.
pub const COPY_TRAIT_NAME: &str = "Copy";

/// Function attributes the compiler knows about, e.g. `@inline fn f() {}`.
pub const INLINE_ATTRIBUTE_NAME: &str = "inline";
pub const EXPORT_ATTRIBUTE_NAME: &str = "export";
pub const TEST_ATTRIBUTE_NAME: &str = "test";
pub const VALID_ATTRIBUTE_NAMES: &[&str] = &[
    INLINE_ATTRIBUTE_NAME,
    EXPORT_ATTRIBUTE_NAME,
    TEST_ATTRIBUTE_NAME,
];
