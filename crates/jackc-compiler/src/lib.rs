//! Single-pass compiler from Jack source to Hack VM instructions.
//!
//! The pipeline is tokenize -> (symbol-resolve + emit) in one
//! recursive-descent pass, with no intermediate AST. [`compile_source`]
//! and [`compile_file`] compile a single class; [`compile_directory`]
//! drives a whole `.jack` directory the way `Main.jack` projects expect,
//! producing one `.vm` file per `.jack` file.

pub mod compiler;
pub mod config;
pub mod error;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;
pub mod vm_writer;

#[cfg(feature = "xml-debug")]
pub mod xml_debug;

use std::fs;
use std::path::{Path, PathBuf};

pub use compiler::CompilerEngine;
pub use config::CompilerConfig;
pub use error::{CompileError, FileCompileError};

/// Compiles a single class's Jack source text to VM instruction text.
pub fn compile_source(source: &str) -> Result<String, CompileError> {
    compile_source_with_config(source, CompilerConfig::default())
}

pub fn compile_source_with_config(
    source: &str,
    config: CompilerConfig,
) -> Result<String, CompileError> {
    let engine = CompilerEngine::with_config(source, Vec::new(), config);
    let bytes = engine.compile()?;
    Ok(String::from_utf8(bytes).expect("VM writer only ever emits ASCII/UTF-8 text"))
}

/// Compiles the `.jack` file at `path`, writing a sibling `.vm` file with
/// the same stem.
pub fn compile_file(path: &Path) -> Result<PathBuf, FileCompileError> {
    compile_file_with_config(path, CompilerConfig::default())
}

pub fn compile_file_with_config(
    path: &Path,
    config: CompilerConfig,
) -> Result<PathBuf, FileCompileError> {
    let do_compile = || -> Result<PathBuf, CompileError> {
        let source = fs::read_to_string(path)?;
        let vm_text = compile_source_with_config(&source, config)?;
        let out_path = path.with_extension("vm");
        fs::write(&out_path, vm_text)?;
        Ok(out_path)
    };
    do_compile().map_err(|source| FileCompileError {
        path: path.to_path_buf(),
        source,
    })
}

/// Compiles every `.jack` file directly inside `dir` (non-recursive,
/// matching the reference driver's scope), honoring
/// `config.continue_on_error`.
///
/// Returns the paths of the `.vm` files successfully written. When
/// `continue_on_error` is `false` (the default), the first failure stops
/// the run and is returned as `Err`; otherwise every file is attempted
/// and all failures are collected.
pub fn compile_directory(
    dir: &Path,
    config: CompilerConfig,
) -> Result<Vec<PathBuf>, Vec<FileCompileError>> {
    let mut jack_files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jack"))
            .collect(),
        Err(e) => {
            return Err(vec![FileCompileError {
                path: dir.to_path_buf(),
                source: CompileError::Io(e),
            }])
        }
    };
    jack_files.sort();

    let mut written = Vec::new();
    let mut failures = Vec::new();

    for path in jack_files {
        match compile_file_with_config(&path, config) {
            Ok(out) => written.push(out),
            Err(err) => {
                failures.push(err);
                if !config.continue_on_error {
                    return Err(failures);
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(written)
    } else {
        Err(failures)
    }
}
