//! Character-stream tokenizer for Jack source.
//!
//! Produces a one-token-lookahead cursor over the tokens in `token.rs`.
//! The reference lexer (`examples/original_source/JackTokenizer.py`) reads
//! a file one character at a time and relies on `tell()`/`seek()` to undo
//! overshoot; here the whole source is held as a `Vec<char>` with a
//! movable read position, which gives the same one-character push-back
//! behaviour without needing a real seekable stream.

use crate::token::{Keyword, Token, TokenKind, SYMBOLS};

/// Maps every character position in the source to its 0-indexed
/// `(line, column)`, precomputed once so that resetting the read
/// position after an overshoot doesn't need to re-walk the source to
/// recover where we are.
pub struct Tokenizer {
    chars: Vec<char>,
    positions: Vec<(usize, usize)>,
    pos: usize,
    current: Option<Token>,
    /// Set when scanning ran off the end of the input inside a string or
    /// block comment. Premature end of input inside either terminates
    /// tokenization silently; this records where, so the compiler can
    /// report it as a lex error rather than a bare "unexpected end of
    /// input".
    truncated_at: Option<(usize, usize)>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        let mut chars = Vec::new();
        let mut positions = Vec::new();
        let (mut line, mut col) = (0usize, 0usize);
        for c in source.chars() {
            chars.push(c);
            positions.push((line, col));
            if c == '\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        // One extra slot so `pos == chars.len()` (end of input) still has
        // a position to report.
        positions.push((line, col));

        let mut tokenizer = Tokenizer {
            chars,
            positions,
            pos: 0,
            current: None,
            truncated_at: None,
        };
        tokenizer.advance();
        tokenizer
    }

    pub fn has_more(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Position at which tokenization was cut short by EOF inside a
    /// string or block comment, if that happened.
    pub fn truncation(&self) -> Option<(usize, usize)> {
        self.truncated_at
    }

    /// Reads ahead, skipping whitespace and comments, and installs the
    /// next token as current.
    pub fn advance(&mut self) {
        self.current = self.scan_next();
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn here(&self) -> (usize, usize) {
        self.positions[self.pos]
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }

            if self.peek() != Some('/') {
                return;
            }

            match self.peek_at(1) {
                Some('/') => {
                    self.bump();
                    self.bump();
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.bump();
                    }
                }
                Some('*') => {
                    let start = self.here();
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => {
                                self.truncated_at = Some(start);
                                return;
                            }
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                // A `/` that is neither `//` nor `/*` is the division
                // symbol; restore the unconsumed lookahead character
                // (here: simply don't consume it) and stop skipping.
                _ => return,
            }
        }
    }

    fn scan_next(&mut self) -> Option<Token> {
        self.skip_whitespace_and_comments();
        let (line, column) = self.here();
        let c = self.peek()?;

        if SYMBOLS.contains(c) {
            self.bump();
            return Some(Token::new(TokenKind::Symbol(c), line, column));
        }

        if c == '"' {
            self.bump();
            let mut s = String::new();
            loop {
                match self.peek() {
                    None => {
                        self.truncated_at = Some((line, column));
                        return None;
                    }
                    Some('"') => {
                        self.bump();
                        break;
                    }
                    Some(ch) => {
                        // A raw newline here is malformed Jack source (a
                        // string constant is never supposed to span
                        // lines), but the reference scanner just keeps
                        // consuming characters until it sees a closing
                        // quote or runs off the end of the file, so we
                        // match that rather than invent a stricter rule.
                        s.push(ch);
                        self.bump();
                    }
                }
            }
            return Some(Token::new(TokenKind::StringConst(s), line, column));
        }

        if c.is_ascii_digit() {
            let mut s = String::new();
            while matches!(self.peek(), Some(d) if d.is_ascii_digit()) {
                s.push(self.bump().expect("peek just confirmed a digit"));
            }
            let n: u16 = s.parse().unwrap_or(u16::MAX);
            return Some(Token::new(TokenKind::IntConst(n), line, column));
        }

        // Keyword-or-identifier: a maximal run of characters that are
        // neither whitespace, a symbol, nor a string delimiter.
        let mut s = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || SYMBOLS.contains(ch) || ch == '"' {
                break;
            }
            s.push(ch);
            self.bump();
        }

        match Keyword::from_str(&s) {
            Some(kw) => Some(Token::new(TokenKind::Keyword(kw), line, column)),
            None => Some(Token::new(TokenKind::Identifier(s), line, column)),
        }
    }
}
