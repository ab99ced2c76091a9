//! Append-only, line-oriented VM instruction emitter.
//!
//! Grounded on `examples/original_source/VMWriter.py`'s one-method-per-
//! instruction shape, and on the teacher's `codegen.rs` style of building
//! output with repeated `writeln!` calls into a `Write` sink rather than
//! manual string concatenation.

use std::fmt;
use std::io::{self, Write};

/// Hack VM memory segments addressable by `push`/`pop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Argument,
    Local,
    Static,
    This,
    That,
    Pointer,
    Temp,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Segment::Constant => "constant",
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        f.write_str(s)
    }
}

/// The nine stack arithmetic/logic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithCommand {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithCommand::Add => "add",
            ArithCommand::Sub => "sub",
            ArithCommand::Neg => "neg",
            ArithCommand::Eq => "eq",
            ArithCommand::Gt => "gt",
            ArithCommand::Lt => "lt",
            ArithCommand::And => "and",
            ArithCommand::Or => "or",
            ArithCommand::Not => "not",
        };
        f.write_str(s)
    }
}

/// Writes one VM instruction per line to any `io::Write` sink.
pub struct VmWriter<W: Write> {
    out: W,
}

impl<W: Write> VmWriter<W> {
    pub fn new(out: W) -> Self {
        VmWriter { out }
    }

    pub fn write_push(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.out, "push {} {}", segment, index)
    }

    pub fn write_pop(&mut self, segment: Segment, index: u16) -> io::Result<()> {
        writeln!(self.out, "pop {} {}", segment, index)
    }

    pub fn write_arithmetic(&mut self, command: ArithCommand) -> io::Result<()> {
        writeln!(self.out, "{}", command)
    }

    pub fn write_label(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "label {}", label)
    }

    pub fn write_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "goto {}", label)
    }

    pub fn write_if_goto(&mut self, label: &str) -> io::Result<()> {
        writeln!(self.out, "if-goto {}", label)
    }

    pub fn write_call(&mut self, name: &str, n_args: u16) -> io::Result<()> {
        writeln!(self.out, "call {} {}", name, n_args)
    }

    pub fn write_function(&mut self, name: &str, n_vars: u16) -> io::Result<()> {
        writeln!(self.out, "function {} {}", name, n_vars)
    }

    pub fn write_return(&mut self) -> io::Result<()> {
        writeln!(self.out, "return")
    }

    /// Human-readable padding a consumer is free to ignore.
    pub fn write_comment(&mut self, comment: &str) -> io::Result<()> {
        writeln!(self.out, "// {}", comment)
    }

    pub fn write_blank_line(&mut self) -> io::Result<()> {
        writeln!(self.out)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_exact_line_forms() {
        let mut buf = Vec::new();
        {
            let mut w = VmWriter::new(&mut buf);
            w.write_push(Segment::Constant, 7).unwrap();
            w.write_pop(Segment::Local, 2).unwrap();
            w.write_arithmetic(ArithCommand::Add).unwrap();
            w.write_label("IF_TRUE0").unwrap();
            w.write_goto("IF_END0").unwrap();
            w.write_if_goto("WHILE_END0").unwrap();
            w.write_call("Math.multiply", 2).unwrap();
            w.write_function("Main.main", 3).unwrap();
            w.write_return().unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "push constant 7\n\
             pop local 2\n\
             add\n\
             label IF_TRUE0\n\
             goto IF_END0\n\
             if-goto WHILE_END0\n\
             call Math.multiply 2\n\
             function Main.main 3\n\
             return\n"
        );
    }

    #[test]
    fn comments_and_blank_lines_are_human_padding() {
        let mut buf = Vec::new();
        {
            let mut w = VmWriter::new(&mut buf);
            w.write_comment("hello").unwrap();
            w.write_blank_line().unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "// hello\n\n");
    }
}
