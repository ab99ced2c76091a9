//! Jack compiler CLI
//!
//! Command-line driver that compiles a single `.jack` file or every
//! `.jack` file in a directory to Hack VM instructions.

use clap::Parser as ClapParser;
use std::path::{Path, PathBuf};
use std::process;

use jackc::{compile_directory, compile_file_with_config, CompilerConfig};

#[derive(ClapParser)]
#[command(name = "jackc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Jack compiler - compile .jack sources to Hack VM instructions", long_about = None)]
struct Cli {
    /// A single .jack file, or a directory containing .jack files.
    /// Defaults to the current directory.
    input: Option<PathBuf>,

    /// Keep compiling remaining files in a directory after one fails
    #[arg(long)]
    continue_on_error: bool,

    /// Interleave human-readable comments in the emitted .vm text
    #[arg(long)]
    emit_comments: bool,

    /// Also write an annotated token-stream .xml file next to each .vm
    /// file (requires the `xml-debug` feature)
    #[arg(long)]
    emit_xml: bool,
}

fn main() {
    let cli = Cli::parse();
    let input = cli.input.unwrap_or_else(|| PathBuf::from("."));

    if !input.exists() {
        eprintln!("Error: {} does not exist", input.display());
        process::exit(2);
    }

    let config = CompilerConfig {
        continue_on_error: cli.continue_on_error,
        emit_comments: cli.emit_comments,
    };

    if input.is_dir() {
        run_directory(&input, config, cli.emit_xml);
    } else {
        run_file(&input, config, cli.emit_xml);
    }
}

fn run_file(input: &Path, config: CompilerConfig, emit_xml: bool) {
    match compile_file_with_config(input, config) {
        Ok(out) => {
            println!("Compiled {} -> {}", input.display(), out.display());
            if emit_xml {
                emit_xml_sibling(input);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_directory(input: &Path, config: CompilerConfig, emit_xml: bool) {
    match compile_directory(input, config) {
        Ok(written) => {
            for path in &written {
                println!("Compiled -> {}", path.display());
                if emit_xml {
                    emit_xml_sibling(&path.with_extension("jack"));
                }
            }
            println!("Compiled {} file(s)", written.len());
        }
        Err(failures) => {
            for failure in &failures {
                eprintln!("Error: {}", failure);
            }
            process::exit(1);
        }
    }
}

#[cfg(feature = "xml-debug")]
fn emit_xml_sibling(jack_path: &Path) {
    use std::fs;

    let source = match fs::read_to_string(jack_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", jack_path.display(), e);
            return;
        }
    };
    let xml_path = jack_path.with_extension("xml");
    match fs::File::create(&xml_path) {
        Ok(f) => {
            if let Err(e) = jackc::xml_debug::dump_tokens(&source, f) {
                eprintln!("Error writing {}: {}", xml_path.display(), e);
            } else {
                println!("Wrote {}", xml_path.display());
            }
        }
        Err(e) => eprintln!("Error creating {}: {}", xml_path.display(), e),
    }
}

#[cfg(not(feature = "xml-debug"))]
fn emit_xml_sibling(_jack_path: &Path) {
    eprintln!("jackc was built without the `xml-debug` feature; --emit-xml is unavailable");
}
