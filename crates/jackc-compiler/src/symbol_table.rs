//! Two-scope symbol table mapping identifiers to `(type, kind, index)`.
//!
//! Grounded on `examples/original_source/SymbolTable.py`: a class scope
//! (`static`/`field`) and a subroutine scope (`arg`/`var`), each with its
//! own per-kind counter. Unlike the reference's `var_count`, which
//! mistakenly indexes into the scope dict for `arg`/`var` (a bug spotted
//! while reading the reference implementation), ours always returns the
//! counter.

use std::collections::HashMap;

use crate::vm_writer::Segment;

/// The four declaration kinds Jack recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    /// Fixed kind -> VM segment mapping.
    pub fn segment(self) -> Segment {
        match self {
            Kind::Static => Segment::Static,
            Kind::Field => Segment::This,
            Kind::Arg => Segment::Argument,
            Kind::Var => Segment::Local,
        }
    }

    fn is_class_scoped(self) -> bool {
        matches!(self, Kind::Static | Kind::Field)
    }
}

#[derive(Debug, Clone)]
struct Symbol {
    declared_type: String,
    kind: Kind,
    index: u16,
}

/// `name -> (type, kind, index)` over two scopes, with no nested block
/// scoping — Jack declares all locals at the top of a subroutine body.
#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Symbol>,
    class_counts: [u16; 2], // [Static, Field]
    subroutine_scope: HashMap<String, Symbol>,
    subroutine_counts: [u16; 2], // [Arg, Var]
}

fn class_slot(kind: Kind) -> usize {
    match kind {
        Kind::Static => 0,
        Kind::Field => 1,
        _ => unreachable!("class_slot called with a subroutine-scoped kind"),
    }
}

fn subroutine_slot(kind: Kind) -> usize {
    match kind {
        Kind::Arg => 0,
        Kind::Var => 1,
        _ => unreachable!("subroutine_slot called with a class-scoped kind"),
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears subroutine scope and resets the `arg`/`var` counters.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.subroutine_counts = [0, 0];
    }

    /// Inserts `name` in the scope indicated by `kind` and advances that
    /// kind's counter. Called exactly once per name per scope;
    /// redefinition is undefined and not guarded.
    pub fn define(&mut self, name: &str, declared_type: &str, kind: Kind) {
        let symbol = Symbol {
            declared_type: declared_type.to_string(),
            kind,
            index: 0, // filled in below
        };
        if kind.is_class_scoped() {
            let slot = class_slot(kind);
            let index = self.class_counts[slot];
            self.class_counts[slot] += 1;
            self.class_scope
                .insert(name.to_string(), Symbol { index, ..symbol });
        } else {
            let slot = subroutine_slot(kind);
            let index = self.subroutine_counts[slot];
            self.subroutine_counts[slot] += 1;
            self.subroutine_scope
                .insert(name.to_string(), Symbol { index, ..symbol });
        }
    }

    /// Number of slots defined for `kind` in its scope.
    pub fn var_count(&self, kind: Kind) -> u16 {
        if kind.is_class_scoped() {
            self.class_counts[class_slot(kind)]
        } else {
            self.subroutine_counts[subroutine_slot(kind)]
        }
    }

    fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }

    pub fn kind_of(&self, name: &str) -> Option<Kind> {
        self.lookup(name).map(|s| s.kind)
    }

    pub fn type_of(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|s| s.declared_type.as_str())
    }

    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup(name).map(|s| s.index)
    }

    pub fn segment_of(&self, name: &str) -> Option<Segment> {
        self.kind_of(name).map(Kind::segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_scope_tracks_static_and_field_independently() {
        let mut t = SymbolTable::new();
        t.define("x", "int", Kind::Field);
        t.define("y", "int", Kind::Field);
        t.define("count", "int", Kind::Static);

        assert_eq!(t.var_count(Kind::Field), 2);
        assert_eq!(t.var_count(Kind::Static), 1);
        assert_eq!(t.index_of("x"), Some(0));
        assert_eq!(t.index_of("y"), Some(1));
        assert_eq!(t.index_of("count"), Some(0));
        assert_eq!(t.segment_of("x"), Some(Segment::This));
        assert_eq!(t.segment_of("count"), Some(Segment::Static));
    }

    #[test]
    fn start_subroutine_resets_only_subroutine_scope() {
        let mut t = SymbolTable::new();
        t.define("field_a", "int", Kind::Field);
        t.define("d", "int", Kind::Arg);
        t.define("i", "int", Kind::Var);
        assert_eq!(t.var_count(Kind::Arg), 1);
        assert_eq!(t.var_count(Kind::Var), 1);

        t.start_subroutine();

        assert_eq!(t.var_count(Kind::Arg), 0);
        assert_eq!(t.var_count(Kind::Var), 0);
        assert_eq!(t.var_count(Kind::Field), 1);
        assert_eq!(t.kind_of("field_a"), Some(Kind::Field));
        assert_eq!(t.kind_of("d"), None);
    }

    #[test]
    fn subroutine_scope_shadows_class_scope() {
        let mut t = SymbolTable::new();
        t.define("x", "int", Kind::Field);
        t.start_subroutine();
        t.define("x", "char", Kind::Var);

        assert_eq!(t.kind_of("x"), Some(Kind::Var));
        assert_eq!(t.type_of("x"), Some("char"));
    }

    #[test]
    fn unresolved_name_is_none() {
        let t = SymbolTable::new();
        assert_eq!(t.kind_of("mystery"), None);
        assert_eq!(t.segment_of("mystery"), None);
    }

    #[test]
    fn var_count_is_always_the_counter_not_the_scope_map() {
        // One reference variant mistakenly returns the scope map for
        // arg/var instead of the counter. Defining two vars with
        // different names must report a count of 2 either way.
        let mut t = SymbolTable::new();
        t.define("a", "int", Kind::Var);
        t.define("b", "int", Kind::Var);
        assert_eq!(t.var_count(Kind::Var), 2);
    }
}
