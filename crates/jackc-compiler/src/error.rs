//! Compiler error types.
//!
//! Grounded on the teacher's `codegen/error.rs::CodeGenError`: a small
//! hand-rolled enum with `Display`/`std::error::Error` and `From`
//! conversions, rather than pulling in `anyhow`/`thiserror` — the
//! teacher's compiler crate uses neither.

use std::fmt;
use std::path::PathBuf;

use crate::token::{Token, TokenKind};

/// Everything that can make compilation of a single file fail.
#[derive(Debug)]
pub enum CompileError {
    /// Tokenization ran off the end of the input inside a string or a
    /// block comment.
    Lex { line: usize, column: usize },
    /// The current token did not match the expected grammar production.
    Parse {
        expected: String,
        found: Option<TokenKind>,
        /// Name of the subroutine being compiled when the mismatch was
        /// hit, if parsing had gotten that far. `None` for errors at
        /// class scope, before any subroutine has been entered.
        subroutine: Option<String>,
        line: usize,
        column: usize,
    },
    /// An identifier used as a value or assignment target resolved in
    /// neither scope and was not a qualified-call receiver.
    Resolution {
        name: String,
        /// Name of the subroutine the unresolved reference appeared in.
        subroutine: Option<String>,
        line: usize,
        column: usize,
    },
    /// Propagated unchanged from the character source or instruction sink.
    Io(std::io::Error),
}

impl CompileError {
    /// Builds a `Parse` error from the token actually found (or `None`
    /// at end of input).
    pub fn parse(
        expected: impl Into<String>,
        found: Option<&Token>,
        subroutine: Option<String>,
    ) -> Self {
        let (line, column) = found.map(|t| (t.line, t.column)).unwrap_or((0, 0));
        CompileError::Parse {
            expected: expected.into(),
            found: found.map(|t| t.kind.clone()),
            subroutine,
            line,
            column,
        }
    }
}

/// Renders " in <name>" for an error diagnostic, or nothing if the
/// failure happened before any subroutine was entered.
fn subroutine_suffix(subroutine: Option<&str>) -> String {
    match subroutine {
        Some(name) => format!(" in {}", name),
        None => String::new(),
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex { line, column } => write!(
                f,
                "unterminated string or comment at {}:{}",
                line + 1,
                column + 1
            ),
            CompileError::Parse {
                expected,
                found,
                subroutine,
                line,
                column,
            } => {
                let actual = match found {
                    Some(kind) => kind.to_string(),
                    None => "end of input".to_string(),
                };
                write!(
                    f,
                    "parse error{} at {}:{}: expected {}, found {}",
                    subroutine_suffix(subroutine.as_deref()),
                    line + 1,
                    column + 1,
                    expected,
                    actual
                )
            }
            CompileError::Resolution {
                name,
                subroutine,
                line,
                column,
            } => write!(
                f,
                "unresolved identifier '{}'{} at {}:{}",
                name,
                subroutine_suffix(subroutine.as_deref()),
                line + 1,
                column + 1
            ),
            CompileError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        CompileError::Io(e)
    }
}

/// A `CompileError` together with the file it occurred in, so the
/// directory driver can report failures without losing per-file context.
#[derive(Debug)]
pub struct FileCompileError {
    pub path: PathBuf,
    pub source: CompileError,
}

impl fmt::Display for FileCompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for FileCompileError {}
