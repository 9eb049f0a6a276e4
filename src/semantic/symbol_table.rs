//! Scoped symbol table, dual-indexed by name hash and by scope.
//!
//! A single arena owns every symbol; the hash buckets (name lookup) and the
//! scope chains (bulk teardown) both store arena indices. Bucket insertion
//! is newest-first, so a lookup that scans front to back always returns the
//! innermost binding of a name, and exiting a scope makes the shadowed outer
//! binding visible again.

use super::types::{Field, SType};

const BUCKET_COUNT: usize = 16384;

pub type SymbolId = usize;

#[derive(Debug, Clone)]
pub struct Symbol {
    pub depth: usize,
    pub field: Field,
    /// Struct-tag registry entries share the namespace with variables; this
    /// flag tells them apart from variables of struct type.
    pub is_struct_tag: bool,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn ty(&self) -> &SType {
        &self.field.ty
    }
}

#[derive(Debug)]
pub struct SymbolTable {
    arena: Vec<Option<Symbol>>,
    buckets: Vec<Vec<SymbolId>>,
    scopes: Vec<Vec<SymbolId>>,
    anon_struct_count: u32,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            arena: Vec::new(),
            buckets: vec![Vec::new(); BUCKET_COUNT],
            scopes: vec![Vec::new()],
            anon_struct_count: 0,
        }
    }

    /// Current scope depth; the global scope is depth 0.
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Inserts a symbol into the current scope and returns its id.
    pub fn insert(&mut self, field: Field, is_struct_tag: bool) -> SymbolId {
        let id = self.arena.len();
        let bucket = hash_pjw(&field.name);
        let depth = self.depth();
        self.arena.push(Some(Symbol {
            depth,
            field,
            is_struct_tag,
        }));
        // newest first: lookup must see the innermost binding
        self.buckets[bucket].insert(0, id);
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .push(id);
        id
    }

    /// Finds the innermost live symbol with the given name.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.buckets[hash_pjw(name)]
            .iter()
            .filter_map(|&id| self.arena[id].as_ref())
            .find(|symbol| symbol.field.name == name)
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Tears down the innermost scope: every symbol it owns is unlinked
    /// from its bucket by identity and its arena slot is tombstoned. The
    /// global scope is never torn down.
    pub fn exit_scope(&mut self) {
        assert!(self.scopes.len() > 1, "cannot exit the global scope");
        let closing = self.scopes.pop().expect("scope stack is never empty");
        for id in closing {
            if let Some(symbol) = self.arena[id].take() {
                let bucket = &mut self.buckets[hash_pjw(&symbol.field.name)];
                bucket.retain(|&other| other != id);
            }
        }
    }

    /// Fresh synthetic tag for an anonymous struct. Numeric, so it can
    /// never collide with a user identifier.
    pub fn next_anon_struct(&mut self) -> String {
        self.anon_struct_count += 1;
        self.anon_struct_count.to_string()
    }

    /// Number of live symbols.
    pub fn len(&self) -> usize {
        self.arena.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}

/// P. J. Weinberger string hash, folded into the bucket range.
fn hash_pjw(name: &str) -> usize {
    let mask = BUCKET_COUNT as u32 - 1;
    let mut val: u32 = 0;
    for byte in name.bytes() {
        val = (val << 2).wrapping_add(byte as u32);
        let overflow = val & !mask;
        if overflow != 0 {
            val = (val ^ (overflow >> 12)) & mask;
        }
    }
    val as usize
}
