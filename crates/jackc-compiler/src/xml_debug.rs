//! Token-stream XML dump, gated behind the `xml-debug` feature. A prior
//! variant of this tool emitted an annotated XML parse tree as its
//! primary output; here that's kept around only as an opt-in debug sink,
//! not a primary output format.
//!
//! Grounded on the reference analyzer's token-XML output
//! (`examples/original_source/JackAnalyzer.py`), kept here only as an
//! opt-in diagnostic aid; it plays no part in VM code generation.

use std::io::{self, Write};

use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn element(tag: &str, body: &str) -> String {
    format!("<{}> {} </{}>", tag, body, tag)
}

fn token_line(token: &Token) -> String {
    match &token.kind {
        TokenKind::Keyword(k) => element("keyword", k.as_str()),
        TokenKind::Symbol(c) => element("symbol", &escape(&c.to_string())),
        TokenKind::Identifier(s) => element("identifier", &escape(s)),
        TokenKind::IntConst(n) => element("integerConstant", &n.to_string()),
        TokenKind::StringConst(s) => element("stringConstant", &escape(s)),
    }
}

/// Writes every token in `source` as one `<tokens>...</tokens>` document,
/// one element per line, ignoring any lex-truncation position (the debug
/// dump simply stops where the token stream stops).
pub fn dump_tokens<W: Write>(source: &str, mut out: W) -> io::Result<()> {
    let mut tokenizer = Tokenizer::new(source);
    writeln!(out, "<tokens>")?;
    while let Some(token) = tokenizer.current() {
        writeln!(out, "{}", token_line(token))?;
        tokenizer.advance();
    }
    writeln!(out, "</tokens>")
}
