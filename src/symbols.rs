//! Lexically scoped bindings.
//!
//! Scopes live in an arena and refer to their parent by index. Scopes are
//! strictly nested in time: the newest scope is always the first to go.

use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Function,
}

impl SymbolKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Function => "func",
        }
    }
}

/// For `Function` symbols `value` belongs to the owning back-end: the
/// interpreter keeps a registry index there, the emitter a result count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub value: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("'{name}' is already declared in this scope")]
    Redeclaration { name: String },
    #[error("Undefined reference to '{name}'")]
    UndefinedReference { name: String },
    #[error("'{name}' is a {found}, expected a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

pub type SymbolResult<T> = Result<T, SymbolError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);
}

#[derive(Debug, Default)]
struct Scope {
    bindings: FxHashMap<String, Symbol>,
    parent: Option<ScopeId>,
}

#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
            current: ScopeId::ROOT,
        }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Opens a child of the current scope and returns the cursor to restore
    /// with [`SymbolTable::exit_scope`].
    pub fn enter_scope(&mut self) -> ScopeId {
        self.enter_scope_under(self.current)
    }

    /// Opens a child of `parent`, which must still be live.
    pub fn enter_scope_under(&mut self, parent: ScopeId) -> ScopeId {
        debug_assert!(parent.0 < self.scopes.len(), "parent scope already discarded");
        self.scopes.push(Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        });
        std::mem::replace(&mut self.current, ScopeId(self.scopes.len() - 1))
    }

    /// Discards the newest scope and moves the cursor back to `previous`.
    pub fn exit_scope(&mut self, previous: ScopeId) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
        self.current = previous;
    }

    pub fn declare(&mut self, name: &str, value: i64) -> SymbolResult<()> {
        self.insert(name, SymbolKind::Var, value)
    }

    pub fn declare_function(&mut self, name: &str, value: usize) -> SymbolResult<()> {
        self.insert(name, SymbolKind::Function, value as i64)
    }

    pub fn set(&mut self, name: &str, value: i64) -> SymbolResult<()> {
        let scope = self
            .resolve(name)
            .ok_or_else(|| SymbolError::UndefinedReference {
                name: name.to_string(),
            })?;
        self.write_var(scope, name, value)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.resolve(name)
            .and_then(|scope| self.scopes[scope.0].bindings.get(name))
    }

    pub fn declare_or_set(&mut self, name: &str, value: i64) -> SymbolResult<()> {
        match self.resolve(name) {
            Some(scope) => self.write_var(scope, name, value),
            None => self.declare(name, value),
        }
    }

    /// Reads a plain variable through the scope chain.
    pub fn lookup_var(&self, name: &str) -> SymbolResult<i64> {
        let symbol = self.get(name).ok_or_else(|| SymbolError::UndefinedReference {
            name: name.to_string(),
        })?;
        expect_kind(symbol, SymbolKind::Var)?;
        Ok(symbol.value)
    }

    /// Snapshot of the plain variables bound directly in the root scope.
    pub fn root_vars(&self) -> Vec<(String, i64)> {
        let mut vars = self.scopes[ScopeId::ROOT.0]
            .bindings
            .values()
            .filter(|symbol| symbol.kind == SymbolKind::Var)
            .map(|symbol| (symbol.name.clone(), symbol.value))
            .collect::<Vec<_>>();
        vars.sort();
        vars
    }

    fn insert(&mut self, name: &str, kind: SymbolKind, value: i64) -> SymbolResult<()> {
        let bindings = &mut self.scopes[self.current.0].bindings;
        if bindings.contains_key(name) {
            return Err(SymbolError::Redeclaration {
                name: name.to_string(),
            });
        }
        bindings.insert(
            name.to_string(),
            Symbol {
                name: name.to_string(),
                kind,
                value,
            },
        );
        Ok(())
    }

    fn write_var(&mut self, scope: ScopeId, name: &str, value: i64) -> SymbolResult<()> {
        let symbol = self.scopes[scope.0]
            .bindings
            .get_mut(name)
            .ok_or_else(|| SymbolError::UndefinedReference {
                name: name.to_string(),
            })?;
        expect_kind(symbol, SymbolKind::Var)?;
        symbol.value = value;
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<ScopeId> {
        let mut cursor = Some(self.current);
        while let Some(scope) = cursor {
            let entry = &self.scopes[scope.0];
            if entry.bindings.contains_key(name) {
                return Some(scope);
            }
            cursor = entry.parent;
        }
        None
    }
}

fn expect_kind(symbol: &Symbol, expected: SymbolKind) -> SymbolResult<()> {
    if symbol.kind != expected {
        return Err(SymbolError::KindMismatch {
            name: symbol.name.clone(),
            expected: expected.name(),
            found: symbol.kind.name(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_and_reads_in_root() {
        let mut table = SymbolTable::new();
        table.declare("a", 1).expect("declare");
        assert_eq!(table.lookup_var("a"), Ok(1));
        assert_eq!(
            table.get("a"),
            Some(&Symbol {
                name: "a".to_string(),
                kind: SymbolKind::Var,
                value: 1,
            })
        );
    }

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut table = SymbolTable::new();
        table.declare("a", 1).expect("declare");
        assert_eq!(
            table.declare("a", 2),
            Err(SymbolError::Redeclaration {
                name: "a".to_string()
            })
        );
        assert_eq!(table.lookup_var("a"), Ok(1));
    }

    #[test]
    fn inner_scope_may_shadow() {
        let mut table = SymbolTable::new();
        table.declare("a", 1).expect("declare");
        let outer = table.enter_scope();
        table.declare("a", 2).expect("shadowing declare");
        assert_eq!(table.lookup_var("a"), Ok(2));
        table.exit_scope(outer);
        assert_eq!(table.lookup_var("a"), Ok(1));
    }

    #[test]
    fn set_mutates_enclosing_binding() {
        let mut table = SymbolTable::new();
        table.declare("a", 1).expect("declare");
        let outer = table.enter_scope();
        table.set("a", 3).expect("set");
        table.exit_scope(outer);
        assert_eq!(table.lookup_var("a"), Ok(3));
    }

    #[test]
    fn set_requires_existing_binding() {
        let mut table = SymbolTable::new();
        assert_eq!(
            table.set("missing", 1),
            Err(SymbolError::UndefinedReference {
                name: "missing".to_string()
            })
        );
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn scoped_bindings_vanish_on_exit() {
        let mut table = SymbolTable::new();
        let outer = table.enter_scope();
        table.declare("inner", 5).expect("declare");
        table.exit_scope(outer);
        assert!(table.get("inner").is_none());
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn declare_or_set_declares_then_mutates() {
        let mut table = SymbolTable::new();
        let outer = table.enter_scope();
        table.declare_or_set("x", 1).expect("declare");
        table.declare_or_set("x", 2).expect("set");
        assert_eq!(table.lookup_var("x"), Ok(2));
        table.exit_scope(outer);
        assert!(table.get("x").is_none());
    }

    #[test]
    fn function_symbols_are_not_variables() {
        let mut table = SymbolTable::new();
        table.declare_function("f", 0).expect("declare function");
        let mismatch = SymbolError::KindMismatch {
            name: "f".to_string(),
            expected: "var",
            found: "func",
        };
        assert_eq!(table.set("f", 1), Err(mismatch.clone()));
        assert_eq!(table.declare_or_set("f", 1), Err(mismatch.clone()));
        assert_eq!(table.lookup_var("f"), Err(mismatch));
    }

    #[test]
    fn frames_hang_off_an_explicit_parent() {
        let mut table = SymbolTable::new();
        table.declare("global", 1).expect("declare");
        let block = table.enter_scope();
        table.declare("hidden", 2).expect("declare");
        let defining = table.current();

        let caller = table.enter_scope();
        table.declare("caller_local", 3).expect("declare");
        let frame = table.enter_scope_under(defining);
        assert_eq!(table.lookup_var("hidden"), Ok(2));
        assert_eq!(table.lookup_var("global"), Ok(1));
        assert!(table.get("caller_local").is_none());
        table.exit_scope(frame);
        assert_eq!(table.lookup_var("caller_local"), Ok(3));
        table.exit_scope(caller);
        table.exit_scope(block);
        assert_eq!(table.current(), ScopeId::ROOT);
    }

    #[test]
    fn root_vars_are_sorted_and_skip_functions() {
        let mut table = SymbolTable::new();
        table.declare("b", 2).expect("declare");
        table.declare("a", 1).expect("declare");
        table.declare_function("f", 0).expect("declare function");
        assert_eq!(
            table.root_vars(),
            vec![("a".to_string(), 1), ("b".to_string(), 2)]
        );
    }
}
