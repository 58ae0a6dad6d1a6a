use std::{path::PathBuf, sync::Arc};

/// Configuration for the compilation of a single module.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub(crate) file_path: Option<Arc<PathBuf>>,
    pub(crate) print_ast: bool,
    pub(crate) print_passes: bool,
    pub(crate) passes: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            file_path: None,
            print_ast: false,
            print_passes: false,
            passes: crate::pass_manager::DEFAULT_PASSES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl BuildConfig {
    /// Attaches `file_path` to every span produced, so diagnostics can name the file.
    pub fn root_from_file_path(file_path: PathBuf) -> Self {
        Self {
            file_path: Some(Arc::new(file_path)),
            ..Self::default()
        }
    }

    pub fn print_ast(self, a: bool) -> Self {
        Self {
            print_ast: a,
            ..self
        }
    }

    pub fn print_passes(self, a: bool) -> Self {
        Self {
            print_passes: a,
            ..self
        }
    }

    pub fn without_const_folding(self) -> Self {
        let passes = self
            .passes
            .into_iter()
            .filter(|name| name != crate::pass_manager::CONST_FOLD_NAME)
            .collect();
        Self { passes, ..self }
    }
}
