//! End to end tests: every program under `test_programs` is compiled and the outcome
//! compared with the expectation in its header.
//!
//! A test is either a single `.ql` file or a directory holding a `main.ql` and the
//! modules it imports. Imported modules are compiled first, in dependency order, into
//! the same compilation context. The first line of the tested file is one of
//!
//! ```text
//! // expect: compiles
//! // expect: fatal
//! // expect: errors 3
//! ```
//!
//! and any `// check: <text>` line requires `<text>` to appear in the diagnostics.

use crate::{FilterConfig, RunConfig};
use anyhow::{anyhow, bail, Context, Result};
use colored::Colorize;
use quill_core::{compile_to_ast, language::Module, BuildConfig, CompilationContext, CompileResult};
use quill_types::constants::DEFAULT_FILE_EXTENSION;
use rayon::prelude::*;
use regex::Regex;
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

const ENTRY_FILE_NAME: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expectation {
    /// Compiles without fatal or collected errors.
    Compiles,
    /// Stops at a fatal error.
    Fatal,
    /// Compiles, with exactly this many collected errors.
    Errors(usize),
}

#[derive(Debug)]
struct TestDescription {
    name: String,
    entry: PathBuf,
    expectation: Expectation,
    checks: Vec<String>,
}

pub(super) fn run(filter_config: &FilterConfig, run_config: &RunConfig) -> Result<()> {
    let all_tests = discover_tests()?;
    let total_test_count = all_tests.len();
    let tests: Vec<_> = all_tests
        .into_iter()
        .filter(|test| filter_config.admits(&test.name))
        .collect();

    if tests.is_empty() {
        tracing::warn!(
            "No tests were run. Regex filter \"{}\" filtered out all {} tests.",
            filter_config
                .include
                .as_ref()
                .map(|regex| regex.to_string())
                .unwrap_or_default(),
            total_test_count,
        );
        return Ok(());
    }

    // Each test gets its own context, so they can run in parallel.
    let results: Vec<(&TestDescription, Result<()>)> = tests
        .par_iter()
        .map(|test| (test, run_test(test, run_config)))
        .collect();

    let mut failed = Vec::new();
    for (test, result) in &results {
        match result {
            Ok(()) => tracing::info!("Testing {} ... {}", test.name.bold(), "ok".green().bold()),
            Err(e) => {
                tracing::info!("Testing {} ... {}", test.name.bold(), "failed".red().bold());
                quill_tracing::println_error(&format!("{}: {e:?}", test.name));
                failed.push(test.name.as_str());
            }
        }
    }

    tracing::info!("_________________________________");
    let outcome = if failed.is_empty() {
        "ok".green().bold()
    } else {
        "failed".red().bold()
    };
    tracing::info!(
        "E2E tests result: {}. {} total, {} passed; {} failed; {} disabled",
        outcome,
        total_test_count,
        tests.len() - failed.len(),
        failed.len(),
        total_test_count - tests.len(),
    );

    if failed.is_empty() {
        Ok(())
    } else {
        bail!("{} test(s) failed: {}", failed.len(), failed.join(", "))
    }
}

fn run_test(test: &TestDescription, run_config: &RunConfig) -> Result<()> {
    let ctx = CompilationContext::new();
    let dir = test
        .entry
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", test.entry.display()))?;
    let source = fs::read_to_string(&test.entry)
        .with_context(|| format!("failed to read {}", test.entry.display()))?;

    let mut visiting = HashSet::from([module_name(&test.entry)?]);
    compile_imports(&ctx, dir, &source, &mut visiting, run_config)?;
    let res = compile_source(&ctx, &test.entry, source, run_config)?;

    let diagnostics = diagnostics(&res);
    match (&test.expectation, &res.value) {
        (Expectation::Compiles, Some(module)) if res.errors.is_empty() && module.is_valid() => (),
        (Expectation::Fatal, None) if !res.errors.is_empty() => (),
        (Expectation::Errors(count), Some(module))
            if res.errors.is_empty() && module.errors.len() == *count => {}
        (expectation, _) => bail!(
            "expected {expectation:?}, compiler reported:\n{}",
            diagnostics.join("\n")
        ),
    }

    let missing: Vec<_> = test
        .checks
        .iter()
        .filter(|check| !diagnostics.iter().any(|line| line.contains(check.as_str())))
        .collect();
    if !missing.is_empty() {
        bail!(
            "diagnostics do not mention {missing:?}:\n{}",
            diagnostics.join("\n")
        );
    }
    Ok(())
}

/// Compiles the modules `source` imports, and theirs before them, from files next to it.
///
/// Imports with no file are left for the compiler to report.
fn compile_imports(
    ctx: &CompilationContext,
    dir: &Path,
    source: &str,
    visiting: &mut HashSet<String>,
    run_config: &RunConfig,
) -> Result<()> {
    for import in imports_of(source) {
        if !visiting.insert(import.clone()) {
            continue;
        }
        let path = dir.join(format!("{import}.{DEFAULT_FILE_EXTENSION}"));
        if !path.is_file() {
            continue;
        }
        let imported_source = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        compile_imports(ctx, dir, &imported_source, visiting, run_config)?;
        let res = compile_source(ctx, &path, imported_source, run_config)?;
        if res.value.is_none() {
            bail!(
                "imported module \"{import}\" failed to compile:\n{}",
                diagnostics(&res).join("\n")
            );
        }
    }
    Ok(())
}

fn compile_source(
    ctx: &CompilationContext,
    path: &Path,
    source: String,
    run_config: &RunConfig,
) -> Result<CompileResult<Module>> {
    let config = BuildConfig::root_from_file_path(path.to_path_buf())
        .print_ast(run_config.print_ast)
        .print_passes(run_config.print_passes);
    Ok(compile_to_ast(
        ctx,
        Arc::from(source),
        &module_name(path)?,
        &config,
    ))
}

fn diagnostics(res: &CompileResult<Module>) -> Vec<String> {
    let collected = res.value.iter().flat_map(|module| module.errors.iter());
    res.errors
        .iter()
        .chain(collected)
        .map(|e| e.to_friendly_error_string())
        .chain(res.warnings.iter().map(|w| w.to_friendly_warning_string()))
        .collect()
}

fn module_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("{} is not a valid module file name", path.display()))
}

fn imports_of(source: &str) -> Vec<String> {
    let Ok(import) = Regex::new(r"^\s*import\s+([A-Za-z_][A-Za-z0-9_]*)\s*;") else {
        return vec![];
    };
    source
        .lines()
        .filter_map(|line| import.captures(line))
        .map(|caps| caps[1].to_string())
        .collect()
}

fn parse_header(source: &str) -> Result<(Expectation, Vec<String>)> {
    let expect = Regex::new(r"^//\s*expect:\s*(compiles|fatal|errors\s+(\d+))\s*$")?;
    let check = Regex::new(r"^//\s*check:\s*(.+?)\s*$")?;

    let first_line = source.lines().next().unwrap_or_default().trim();
    let caps = expect
        .captures(first_line)
        .ok_or_else(|| anyhow!("missing `// expect:` header, found \"{first_line}\""))?;
    let expectation = match (&caps[1], caps.get(2)) {
        ("compiles", _) => Expectation::Compiles,
        ("fatal", _) => Expectation::Fatal,
        (_, Some(count)) => Expectation::Errors(count.as_str().parse()?),
        (other, None) => bail!("unknown expectation \"{other}\""),
    };
    let checks = source
        .lines()
        .filter_map(|line| check.captures(line.trim()))
        .map(|caps| caps[1].to_string())
        .collect();
    Ok((expectation, checks))
}

fn discover_tests() -> Result<Vec<TestDescription>> {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let tests_root_dir = PathBuf::from(format!("{manifest_dir}/src/e2e_tests/test_programs"));

    let mut entries = fs::read_dir(&tests_root_dir)
        .with_context(|| format!("failed to read {}", tests_root_dir.display()))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    let mut tests = Vec::new();
    for path in entries {
        let entry = if path.is_dir() {
            path.join(format!("{ENTRY_FILE_NAME}.{DEFAULT_FILE_EXTENSION}"))
        } else if path.extension().map_or(false, |ext| ext == DEFAULT_FILE_EXTENSION) {
            path.clone()
        } else {
            continue;
        };
        let source = fs::read_to_string(&entry)
            .with_context(|| format!("failed to read {}", entry.display()))?;
        let (expectation, checks) =
            parse_header(&source).with_context(|| format!("in {}", entry.display()))?;
        tests.push(TestDescription {
            name: module_name(&path)?,
            entry,
            expectation,
            checks,
        });
    }
    Ok(tests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headers_are_parsed() {
        let (expectation, checks) = parse_header(
            "// expect: errors 3\n// check: needs to be a constant\nlet a = 1;\n// check:  Copy ",
        )
        .unwrap();
        assert_eq!(expectation, Expectation::Errors(3));
        assert_eq!(checks, vec!["needs to be a constant", "Copy"]);

        assert_eq!(parse_header("// expect: fatal\n").unwrap().0, Expectation::Fatal);
        assert_eq!(parse_header("//expect:compiles").unwrap().0, Expectation::Compiles);
        assert!(parse_header("let a = 1;").is_err());
    }

    #[test]
    fn imports_are_found_line_by_line() {
        let source = "import geometry;\n  import shapes ;\n// import commented;\nfn f() {}";
        let imports = imports_of(source);
        assert_eq!(imports, vec!["geometry", "shapes"]);
    }

    #[test]
    fn every_program_meets_its_expectation() {
        let tests = discover_tests().unwrap();
        assert!(!tests.is_empty());
        let failures: Vec<_> = tests
            .iter()
            .filter_map(|test| {
                run_test(test, &RunConfig::default())
                    .err()
                    .map(|e| format!("{}: {e:?}", test.name))
            })
            .collect();
        assert!(failures.is_empty(), "{}", failures.join("\n\n"));
    }
}
