//! Compilation options threaded from the CLI into the library entry
//! points.

/// Tunables that change how a directory (or batch of files) is compiled,
/// independent of any single file's Jack semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompilerConfig {
    /// When compiling a directory, keep going after a file fails instead
    /// of stopping at the first error. Off by default: a single bad file
    /// in a directory aborts the whole run, matching the reference
    /// driver's behaviour in `examples/original_source/JackAnalyzer.py`.
    pub continue_on_error: bool,

    /// Interleave human-readable `// ...` comments and blank lines
    /// between subroutines in the emitted `.vm` text. A consumer is free
    /// to ignore them; off by default to match the reference's plain
    /// instruction-only output.
    pub emit_comments: bool,
}
