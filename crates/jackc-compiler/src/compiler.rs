//! Recursive-descent compiler for the Jack grammar.
//!
//! One routine per non-terminal, interleaving parsing and VM emission
//! with no persistent AST. Mutable compilation state — the current
//! class name, the current subroutine name (surfaced in diagnostics),
//! and a per-class label counter — lives on `CompilerEngine` itself and
//! is threaded through by `&mut self` rather than a global.

use std::io::Write;

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::token::{Keyword, Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::vm_writer::{ArithCommand, Segment, VmWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

pub struct CompilerEngine<W: Write> {
    tokenizer: Tokenizer,
    symbols: SymbolTable,
    writer: VmWriter<W>,
    class_name: String,
    current_subroutine: String,
    label_counter: usize,
    emit_comments: bool,
}

impl<W: Write> CompilerEngine<W> {
    pub fn new(source: &str, sink: W) -> Self {
        Self::with_config(source, sink, CompilerConfig::default())
    }

    pub fn with_config(source: &str, sink: W, config: CompilerConfig) -> Self {
        CompilerEngine {
            tokenizer: Tokenizer::new(source),
            symbols: SymbolTable::new(),
            writer: VmWriter::new(sink),
            class_name: String::new(),
            current_subroutine: String::new(),
            label_counter: 0,
            emit_comments: config.emit_comments,
        }
    }

    /// Compiles the single class this source file contains, returning the
    /// sink with the emitted VM text written to it.
    pub fn compile(mut self) -> Result<W, CompileError> {
        self.compile_class()?;
        Ok(self.writer.into_inner())
    }

    // -- token-stream helpers -------------------------------------------------

    fn current_token(&self) -> Option<&Token> {
        self.tokenizer.current()
    }

    fn advance(&mut self) {
        self.tokenizer.advance();
    }

    /// The subroutine currently being parsed, for attaching to
    /// diagnostics; `None` before the first subroutine is entered.
    fn subroutine_context(&self) -> Option<String> {
        if self.current_subroutine.is_empty() {
            None
        } else {
            Some(self.current_subroutine.clone())
        }
    }

    /// Builds a diagnostic for the current position, preferring a lex
    /// error (truncated string/comment) over a generic "end of input"
    /// parse error when both would otherwise apply.
    fn unexpected(&self, expected: impl Into<String>) -> CompileError {
        if self.current_token().is_none() {
            if let Some((line, column)) = self.tokenizer.truncation() {
                return CompileError::Lex { line, column };
            }
        }
        CompileError::parse(expected, self.current_token(), self.subroutine_context())
    }

    fn check_symbol(&self, c: char) -> bool {
        matches!(self.current_token(), Some(Token { kind: TokenKind::Symbol(s), .. }) if *s == c)
    }

    fn check_keyword(&self, kw: Keyword) -> bool {
        matches!(self.current_token(), Some(Token { kind: TokenKind::Keyword(k), .. }) if *k == kw)
    }

    fn expect_symbol(&mut self, c: char) -> Result<(), CompileError> {
        if self.check_symbol(c) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(format!("'{}'", c)))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword) -> Result<(), CompileError> {
        if self.check_keyword(kw) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(format!("'{}'", kw)))
        }
    }

    fn expect_identifier_located(&mut self) -> Result<(String, usize, usize), CompileError> {
        match self.current_token().cloned() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                line,
                column,
            }) => {
                self.advance();
                Ok((name, line, column))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, CompileError> {
        self.expect_identifier_located().map(|(name, ..)| name)
    }

    /// A primitive keyword (`int|char|boolean`) or a class name.
    fn parse_type(&mut self) -> Result<String, CompileError> {
        match self.current_token().map(|t| t.kind.clone()) {
            Some(TokenKind::Keyword(Keyword::Int)) => {
                self.advance();
                Ok("int".to_string())
            }
            Some(TokenKind::Keyword(Keyword::Char)) => {
                self.advance();
                Ok("char".to_string())
            }
            Some(TokenKind::Keyword(Keyword::Boolean)) => {
                self.advance();
                Ok("boolean".to_string())
            }
            Some(TokenKind::Identifier(name)) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("a type (int, char, boolean, or class name)")),
        }
    }

    fn resolve_segment(&self, name: &str, line: usize, column: usize) -> Result<Segment, CompileError> {
        self.symbols
            .segment_of(name)
            .ok_or_else(|| CompileError::Resolution {
                name: name.to_string(),
                subroutine: self.subroutine_context(),
                line,
                column,
            })
    }

    fn next_label(&mut self) -> usize {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    // -- grammar productions --------------------------------------------------

    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        while self.check_keyword(Keyword::Static) || self.check_keyword(Keyword::Field) {
            self.compile_class_var_dec()?;
        }

        while self.check_keyword(Keyword::Constructor)
            || self.check_keyword(Keyword::Function)
            || self.check_keyword(Keyword::Method)
        {
            self.compile_subroutine()?;
        }

        self.expect_symbol('}')?;
        Ok(())
    }

    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = if self.check_keyword(Keyword::Static) {
            self.advance();
            Kind::Static
        } else {
            self.expect_keyword(Keyword::Field)?;
            Kind::Field
        };

        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.symbols.define(&name, &ty, kind);

        while self.check_symbol(',') {
            self.advance();
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &ty, kind);
        }

        self.expect_symbol(';')?;
        Ok(())
    }

    fn compile_subroutine(&mut self) -> Result<(), CompileError> {
        let kind = match self.current_token().map(|t| t.kind.clone()) {
            Some(TokenKind::Keyword(Keyword::Constructor)) => SubroutineKind::Constructor,
            Some(TokenKind::Keyword(Keyword::Function)) => SubroutineKind::Function,
            Some(TokenKind::Keyword(Keyword::Method)) => SubroutineKind::Method,
            _ => return Err(self.unexpected("constructor, function, or method")),
        };
        self.advance();

        self.symbols.start_subroutine();
        if kind == SubroutineKind::Method {
            // Bound as argument 0 before the user parameter list is
            // consumed, so user parameters land at argument 1 and up.
            let class_name = self.class_name.clone();
            self.symbols.define("this", &class_name, Kind::Arg);
        }

        if self.check_keyword(Keyword::Void) {
            self.advance();
        } else {
            self.parse_type()?;
        }

        let name = self.expect_identifier()?;
        self.current_subroutine = name.clone();

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.expect_symbol('{')?;
        while self.check_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let n_vars = self.symbols.var_count(Kind::Var);
        if self.emit_comments {
            self.writer.write_comment(&format!("{:?} {}.{}", kind, self.class_name, name))?;
        }
        self.writer
            .write_function(&format!("{}.{}", self.class_name, name), n_vars)?;

        match kind {
            SubroutineKind::Constructor => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.writer.write_push(Segment::Constant, n_fields)?;
                self.writer.write_call("Memory.alloc", 1)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0)?;
                self.writer.write_pop(Segment::Pointer, 0)?;
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.expect_symbol('}')?;
        if self.emit_comments {
            self.writer.write_blank_line()?;
        }
        Ok(())
    }

    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if self.check_symbol(')') {
            return Ok(());
        }
        loop {
            let ty = self.parse_type()?;
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &ty, Kind::Arg);
            if self.check_symbol(',') {
                self.advance();
                continue;
            }
            break;
        }
        Ok(())
    }

    fn compile_var_dec(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.parse_type()?;
        let name = self.expect_identifier()?;
        self.symbols.define(&name, &ty, Kind::Var);

        while self.check_symbol(',') {
            self.advance();
            let name = self.expect_identifier()?;
            self.symbols.define(&name, &ty, Kind::Var);
        }

        self.expect_symbol(';')?;
        Ok(())
    }

    fn compile_statements(&mut self) -> Result<(), CompileError> {
        loop {
            match self.current_token().map(|t| t.kind.clone()) {
                Some(TokenKind::Keyword(Keyword::Let)) => self.compile_let()?,
                Some(TokenKind::Keyword(Keyword::If)) => self.compile_if()?,
                Some(TokenKind::Keyword(Keyword::While)) => self.compile_while()?,
                Some(TokenKind::Keyword(Keyword::Do)) => self.compile_do()?,
                Some(TokenKind::Keyword(Keyword::Return)) => self.compile_return()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;
        let (name, line, column) = self.expect_identifier_located()?;

        if self.check_symbol('[') {
            self.advance();
            let segment = self.resolve_segment(&name, line, column)?;
            let index = self
                .symbols
                .index_of(&name)
                .expect("segment resolved implies index resolved");
            self.writer.write_push(segment, index)?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.write_arithmetic(ArithCommand::Add)?;

            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;

            // Base-plus-offset array store: stash the value in temp 0,
            // repoint `that` at the computed address, then move the
            // value from temp into `that 0`. The reference implementation
            // computes the address but never emits this store sequence,
            // which is a bug left in it — arrays can never be written to.
            self.writer.write_pop(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_pop(Segment::That, 0)?;
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            let segment = self.resolve_segment(&name, line, column)?;
            let index = self
                .symbols
                .index_of(&name)
                .expect("segment resolved implies index resolved");
            self.writer.write_pop(segment, index)?;
        }
        Ok(())
    }

    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::If)?;
        let n = self.next_label();
        let if_false = format!("IF_FALSE{}", n);
        let if_end = format!("IF_END{}", n);

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(ArithCommand::Not)?;
        self.writer.write_if_goto(&if_false)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&if_end)?;
        self.writer.write_label(&if_false)?;

        if self.check_keyword(Keyword::Else) {
            self.advance();
            self.expect_symbol('{')?;
            self.compile_statements()?;
            self.expect_symbol('}')?;
        }
        self.writer.write_label(&if_end)?;
        Ok(())
    }

    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::While)?;
        let n = self.next_label();
        let start = format!("WHILE_START{}", n);
        let end = format!("WHILE_END{}", n);

        self.writer.write_label(&start)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;
        self.writer.write_arithmetic(ArithCommand::Not)?;
        self.writer.write_if_goto(&end)?;

        self.expect_symbol('{')?;
        self.compile_statements()?;
        self.expect_symbol('}')?;
        self.writer.write_goto(&start)?;
        self.writer.write_label(&end)?;
        Ok(())
    }

    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;
        // Restricted to a subroutine-call term exclusively: `compile_call`
        // errors if neither '.' nor '(' follows rather than falling
        // through to the general term grammar, which `do` never allows.
        let (name, ..) = self.expect_identifier_located()?;
        self.compile_call(&name)?;
        self.expect_symbol(';')?;
        self.writer.write_pop(Segment::Temp, 0)?;
        Ok(())
    }

    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;
        if self.check_symbol(';') {
            self.writer.write_push(Segment::Constant, 0)?;
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.write_return()?;
        Ok(())
    }

    fn compile_expression(&mut self) -> Result<(), CompileError> {
        self.compile_term()?;
        loop {
            let op = match self.current_token().map(|t| t.kind.clone()) {
                Some(TokenKind::Symbol(c)) if "+-*/&|<>=".contains(c) => c,
                _ => break,
            };
            self.advance();
            self.compile_term()?;
            match op {
                '+' => self.writer.write_arithmetic(ArithCommand::Add)?,
                '-' => self.writer.write_arithmetic(ArithCommand::Sub)?,
                '&' => self.writer.write_arithmetic(ArithCommand::And)?,
                '|' => self.writer.write_arithmetic(ArithCommand::Or)?,
                '<' => self.writer.write_arithmetic(ArithCommand::Lt)?,
                '>' => self.writer.write_arithmetic(ArithCommand::Gt)?,
                '=' => self.writer.write_arithmetic(ArithCommand::Eq)?,
                '*' => self.writer.write_call("Math.multiply", 2)?,
                '/' => self.writer.write_call("Math.divide", 2)?,
                _ => unreachable!("filtered by the match guard above"),
            }
        }
        Ok(())
    }

    fn compile_term(&mut self) -> Result<(), CompileError> {
        match self.current_token().cloned() {
            Some(Token { kind: TokenKind::IntConst(n), .. }) => {
                self.advance();
                self.writer.write_push(Segment::Constant, n)?;
            }
            Some(Token { kind: TokenKind::StringConst(s), .. }) => {
                self.advance();
                self.compile_string_constant(&s)?;
            }
            Some(Token { kind: TokenKind::Keyword(Keyword::True), .. }) => {
                self.advance();
                self.writer.write_push(Segment::Constant, 1)?;
                self.writer.write_arithmetic(ArithCommand::Neg)?;
            }
            Some(Token { kind: TokenKind::Keyword(Keyword::False), .. })
            | Some(Token { kind: TokenKind::Keyword(Keyword::Null), .. }) => {
                self.advance();
                self.writer.write_push(Segment::Constant, 0)?;
            }
            Some(Token { kind: TokenKind::Keyword(Keyword::This), .. }) => {
                self.advance();
                self.writer.write_push(Segment::Pointer, 0)?;
            }
            Some(Token { kind: TokenKind::Symbol('-'), .. }) => {
                self.advance();
                self.compile_term()?;
                self.writer.write_arithmetic(ArithCommand::Neg)?;
            }
            Some(Token { kind: TokenKind::Symbol('~'), .. }) => {
                self.advance();
                self.compile_term()?;
                self.writer.write_arithmetic(ArithCommand::Not)?;
            }
            Some(Token { kind: TokenKind::Symbol('('), .. }) => {
                self.advance();
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            Some(Token { kind: TokenKind::Identifier(_), .. }) => {
                self.compile_identifier_term()?;
            }
            _ => return Err(self.unexpected("a term")),
        }
        Ok(())
    }

    /// An identifier appearing as a term: array read, qualified or
    /// unqualified call, or a plain variable read, disambiguated by the
    /// symbol immediately following the identifier.
    fn compile_identifier_term(&mut self) -> Result<(), CompileError> {
        let (name, line, column) = self.expect_identifier_located()?;

        if self.check_symbol('[') {
            self.advance();
            let segment = self.resolve_segment(&name, line, column)?;
            let index = self
                .symbols
                .index_of(&name)
                .expect("segment resolved implies index resolved");
            self.writer.write_push(segment, index)?;
            self.compile_expression()?;
            self.expect_symbol(']')?;
            // Base-plus-offset array read: point `that` at the computed
            // address and push what it holds. The reference
            // implementation parses the index expression but never emits
            // this read sequence either, same bug as the store case above.
            self.writer.write_arithmetic(ArithCommand::Add)?;
            self.writer.write_pop(Segment::Pointer, 1)?;
            self.writer.write_push(Segment::That, 0)?;
            return Ok(());
        }

        if self.check_symbol('.') || self.check_symbol('(') {
            return self.compile_call(&name);
        }

        let segment = self.resolve_segment(&name, line, column)?;
        let index = self
            .symbols
            .index_of(&name)
            .expect("segment resolved implies index resolved");
        self.writer.write_push(segment, index)?;
        Ok(())
    }

    /// Compiles a subroutine-call shape starting right after `name` was
    /// consumed: either `.sub(args)` (qualified) or `(args)` (unqualified,
    /// an implicit method call on `this`). Shared by `do` statements and
    /// by calls appearing as a term.
    fn compile_call(&mut self, name: &str) -> Result<(), CompileError> {
        if self.check_symbol('.') {
            self.advance();
            let sub_name = self.expect_identifier()?;

            if let Some(segment) = self.symbols.segment_of(name) {
                // `name` resolves in scope: it's an object reference.
                let index = self
                    .symbols
                    .index_of(name)
                    .expect("index resolved alongside segment");
                let recv_type = self
                    .symbols
                    .type_of(name)
                    .expect("type resolved alongside segment")
                    .to_string();
                self.writer.write_push(segment, index)?;
                self.expect_symbol('(')?;
                let n_args = self.compile_expression_list()?;
                self.expect_symbol(')')?;
                self.writer
                    .write_call(&format!("{}.{}", recv_type, sub_name), n_args + 1)?;
            } else {
                // `name` is a class name.
                self.expect_symbol('(')?;
                let n_args = self.compile_expression_list()?;
                self.expect_symbol(')')?;
                self.writer
                    .write_call(&format!("{}.{}", name, sub_name), n_args)?;
            }
            Ok(())
        } else if self.check_symbol('(') {
            self.advance();
            self.writer.write_push(Segment::Pointer, 0)?;
            let n_args = self.compile_expression_list()?;
            self.expect_symbol(')')?;
            self.writer
                .write_call(&format!("{}.{}", self.class_name, name), n_args + 1)?;
            Ok(())
        } else {
            Err(self.unexpected("'(' or '.' to form a subroutine call"))
        }
    }

    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        if self.check_symbol(')') {
            return Ok(0);
        }
        let mut count: u16 = 1;
        self.compile_expression()?;
        while self.check_symbol(',') {
            self.advance();
            self.compile_expression()?;
            count += 1;
        }
        Ok(count)
    }

    /// Lowers a string literal to the `String.new`/`String.appendChar`
    /// sequence. Stashes the string reference in `temp 0` between calls
    /// so each `appendChar` has something to reload onto the stack,
    /// since we don't assume `appendChar` returns its receiver.
    fn compile_string_constant(&mut self, s: &str) -> Result<(), CompileError> {
        self.writer
            .write_push(Segment::Constant, s.chars().count() as u16)?;
        self.writer.write_call("String.new", 1)?;
        self.writer.write_pop(Segment::Temp, 0)?;
        for c in s.chars() {
            self.writer.write_push(Segment::Temp, 0)?;
            self.writer.write_push(Segment::Constant, c as u16)?;
            self.writer.write_call("String.appendChar", 2)?;
            self.writer.write_pop(Segment::Temp, 0)?;
        }
        self.writer.write_push(Segment::Temp, 0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> String {
        let engine = CompilerEngine::new(source, Vec::new());
        let bytes = engine.compile().expect("compilation should succeed");
        String::from_utf8(bytes).unwrap()
    }

    fn compile_err(source: &str) -> CompileError {
        let engine = CompilerEngine::new(source, Vec::new());
        engine.compile().expect_err("compilation should fail")
    }

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn static_function_add_two_constants() {
        let vm = compile("class C { function int f() { return 1 + 2; } }");
        assert_eq!(
            lines(&vm),
            vec!["function C.f 0", "push constant 1", "push constant 2", "add", "return"]
        );
    }

    #[test]
    fn method_with_parameter() {
        let vm = compile(
            "class C { field int x; method int inc(int d) { let x = x + d; return x; } }",
        );
        assert_eq!(
            lines(&vm),
            vec![
                "function C.inc 0",
                "push argument 0",
                "pop pointer 0",
                "push this 0",
                "push argument 1",
                "add",
                "pop this 0",
                "push this 0",
                "return",
            ]
        );
    }

    #[test]
    fn constructor_with_one_field() {
        let vm =
            compile("class C { field int x; constructor C new() { let x = 0; return this; } }");
        assert_eq!(
            lines(&vm),
            vec![
                "function C.new 0",
                "push constant 1",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push constant 0",
                "pop this 0",
                "push pointer 0",
                "return",
            ]
        );
    }

    #[test]
    fn constructor_with_no_fields_allocates_zero() {
        let vm = compile("class C { constructor C new() { return this; } }");
        assert_eq!(
            lines(&vm),
            vec![
                "function C.new 0",
                "push constant 0",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push pointer 0",
                "return",
            ]
        );
    }

    #[test]
    fn while_loop_over_a_field() {
        let vm = compile(
            "class C { field int x; method void m() { while (x > 0) { let x = x - 1; } return; } }",
        );
        let body = lines(&vm);
        assert!(body.contains(&"label WHILE_START0"));
        assert!(body.contains(&"push this 0"));
        assert!(body.contains(&"push constant 0"));
        assert!(body.contains(&"gt"));
        assert!(body.contains(&"not"));
        assert!(body.contains(&"if-goto WHILE_END0"));
        assert!(body.contains(&"goto WHILE_START0"));
        assert!(body.contains(&"label WHILE_END0"));
    }

    #[test]
    fn qualified_static_call() {
        let vm = compile(
            "class C { function void m() { do Output.printInt(42); return; } }",
        );
        let body = lines(&vm);
        let start = body.iter().position(|l| *l == "push constant 42").unwrap();
        assert_eq!(body[start + 1], "call Output.printInt 1");
        assert_eq!(body[start + 2], "pop temp 0");
    }

    #[test]
    fn unqualified_call_is_a_method_call_on_this() {
        let vm = compile(
            "class C { function void helper(int n) { return; } function void m() { do helper(1); return; } }",
        );
        let body = lines(&vm);
        let start = body.iter().position(|l| *l == "push pointer 0").unwrap();
        assert_eq!(body[start + 1], "push constant 1");
        assert_eq!(body[start + 2], "call C.helper 2");
        assert_eq!(body[start + 3], "pop temp 0");
    }

    #[test]
    fn if_else_uses_fresh_labels_per_class() {
        let vm = compile(
            "class C { function void m(boolean b) { if (b) { return; } else { return; } if (b) { return; } } }",
        );
        let body = lines(&vm);
        assert!(body.contains(&"label IF_FALSE0"));
        assert!(body.contains(&"label IF_END0"));
        assert!(body.contains(&"label IF_FALSE1"));
        assert!(body.contains(&"label IF_END1"));
    }

    #[test]
    fn array_store_emits_base_plus_offset_sequence() {
        let vm = compile(
            "class C { function void m(Array a, int i, int v) { let a[i] = v; return; } }",
        );
        let body = lines(&vm);
        assert_eq!(
            body,
            vec![
                "function C.m 0",
                "push argument 0",
                "push argument 1",
                "add",
                "push argument 2",
                "pop temp 0",
                "pop pointer 1",
                "push temp 0",
                "pop that 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn array_read_emits_base_plus_offset_sequence() {
        let vm =
            compile("class C { function int m(Array a, int i) { return a[i]; } }");
        let body = lines(&vm);
        assert_eq!(
            body,
            vec![
                "function C.m 0",
                "push argument 0",
                "push argument 1",
                "add",
                "pop pointer 1",
                "push that 0",
                "return",
            ]
        );
    }

    #[test]
    fn empty_parameter_and_expression_lists() {
        let vm = compile(
            "class C { function void m() { do Sys.wait(); return; } }",
        );
        assert!(vm.contains("call Sys.wait 0"));
    }

    #[test]
    fn empty_string_constant() {
        let vm = compile(r#"class C { function void m() { do Output.printString(""); return; } }"#);
        let body = lines(&vm);
        assert!(body.contains(&"push constant 0"));
        assert!(body.contains(&"call String.new 1"));
    }

    #[test]
    fn boolean_and_null_literals() {
        let vm = compile(
            "class C { function boolean m() { return true; } } ",
        );
        let body = lines(&vm);
        assert_eq!(&body[1..3], ["push constant 1", "neg"]);
    }

    #[test]
    fn do_statement_rejects_non_call_terms() {
        let err = compile_err("class C { function void m() { do 1; return; } }");
        assert!(matches!(err, CompileError::Parse { .. }));
    }

    #[test]
    fn unresolved_variable_is_a_resolution_error() {
        let err = compile_err("class C { function void m() { let q = 1; return; } }");
        match err {
            CompileError::Resolution { name, subroutine, .. } => {
                assert_eq!(name, "q");
                assert_eq!(subroutine.as_deref(), Some("m"));
            }
            other => panic!("expected Resolution error, got {:?}", other),
        }
    }

    #[test]
    fn resolution_error_message_names_the_enclosing_subroutine() {
        let err = compile_err("class C { function void m() { let q = 1; return; } }");
        assert!(err.to_string().contains("in m"));
    }

    #[test]
    fn parse_error_before_any_subroutine_has_no_subroutine_context() {
        let err = compile_err("class C static int x; }");
        match err {
            CompileError::Parse { subroutine, .. } => assert_eq!(subroutine, None),
            other => panic!("expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn idempotent_compilation() {
        let source = "class C { field int x; constructor C new() { let x = 0; return this; } }";
        assert_eq!(compile(source), compile(source));
    }

    #[test]
    fn emit_comments_adds_a_header_and_trailing_blank_line() {
        let config = CompilerConfig {
            emit_comments: true,
            ..CompilerConfig::default()
        };
        let engine = CompilerEngine::with_config(
            "class C { function void m() { return; } }",
            Vec::new(),
            config,
        );
        let vm = String::from_utf8(engine.compile().unwrap()).unwrap();
        let body = lines(&vm);
        assert_eq!(body[0], "// Function C.m");
        assert_eq!(body.last(), Some(&""));
    }

    #[test]
    fn subroutine_named_like_a_field_is_disambiguated_by_context() {
        let vm = compile(
            "class C { field int area; method int area() { return area; } }",
        );
        let body = lines(&vm);
        assert_eq!(body[0], "function C.area 0");
        assert!(body.contains(&"push this 0"));
    }
}
