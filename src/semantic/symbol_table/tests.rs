#![allow(clippy::unwrap_used)]

use super::*;
use crate::base::Span;

#[test]
fn test_define_and_resolve_local() {
    let mut table = SymbolTable::new("T", DuplicatePolicy::Reject);
    let id = table.define(SymbolKind::Rule, None, "expr").unwrap();
    let found = table.resolve_local("expr").unwrap();
    assert_eq!(found.id, id);
    assert_eq!(found.kind, SymbolKind::Rule);
    assert!(table.resolve_local("missing").is_none());
}

#[test]
fn test_duplicate_rejected_with_previous_span() {
    let mut table = SymbolTable::new("T", DuplicatePolicy::Reject);
    let span = Span::from_coords(1, 0, 1, 4);
    table
        .define_at(SymbolKind::Rule, None, "expr", span)
        .unwrap();
    let err = table.define(SymbolKind::Rule, None, "expr").unwrap_err();
    assert_eq!(
        err,
        DefineError::Duplicate {
            name: "expr".into(),
            previous: Some(span),
        }
    );
}

#[test]
fn test_duplicate_allowed_for_lexer_tables() {
    let mut table = SymbolTable::new("L", DuplicatePolicy::Allow);
    table.define(SymbolKind::LexerRule, None, "ID").unwrap();
    table.define(SymbolKind::LexerRule, None, "ID").unwrap();
    assert_eq!(table.local_symbols().len(), 2);
}

#[test]
fn test_references_never_count_as_duplicates() {
    let mut table = SymbolTable::new("T", DuplicatePolicy::Reject);
    table.define(SymbolKind::Rule, None, "expr").unwrap();
    table
        .define(SymbolKind::RuleReference, None, "expr")
        .unwrap();
    table
        .define(SymbolKind::RuleReference, None, "expr")
        .unwrap();
    assert_eq!(table.local_reference_count("expr"), 2);
    // Definitions still win on resolution
    assert_eq!(
        table.resolve_local("expr").unwrap().kind,
        SymbolKind::Rule
    );
}

#[test]
fn test_resolution_through_dependencies() {
    let parser = SymbolTable::new_ref("P", DuplicatePolicy::Reject);
    let lexer = SymbolTable::new_ref("L", DuplicatePolicy::Allow);
    lexer
        .write()
        .define(SymbolKind::LexerRule, None, "ID")
        .unwrap();
    parser.write().add_dependency(lexer.clone());

    let found = SymbolTable::resolve_in(&parser, "ID", false).unwrap();
    assert_eq!(found.kind, SymbolKind::LexerRule);
    // local_only stops at the first table
    assert!(SymbolTable::resolve_in(&parser, "ID", true).is_none());
}

#[test]
fn test_resolution_survives_dependency_cycles() {
    let a = SymbolTable::new_ref("A", DuplicatePolicy::Reject);
    let b = SymbolTable::new_ref("B", DuplicatePolicy::Reject);
    a.write().add_dependency(b.clone());
    b.write().add_dependency(a.clone());
    b.write().define(SymbolKind::Rule, None, "inner").unwrap();

    let found = SymbolTable::resolve_in(&a, "inner", false).unwrap();
    assert_eq!(found.name, "inner");
    // A name defined nowhere terminates despite the cycle
    assert!(SymbolTable::resolve_in(&a, "nowhere", false).is_none());
}

#[test]
fn test_add_dependency_is_idempotent() {
    let a = SymbolTable::new_ref("A", DuplicatePolicy::Reject);
    let b = SymbolTable::new_ref("B", DuplicatePolicy::Reject);
    a.write().add_dependency(b.clone());
    a.write().add_dependency(b.clone());
    assert_eq!(a.read().dependencies().len(), 1);
}

#[test]
fn test_remove_dependency_leaves_others() {
    let a = SymbolTable::new_ref("A", DuplicatePolicy::Reject);
    let b = SymbolTable::new_ref("B", DuplicatePolicy::Reject);
    let c = SymbolTable::new_ref("C", DuplicatePolicy::Reject);
    a.write().add_dependency(b.clone());
    a.write().add_dependency(c.clone());
    a.write().remove_dependency(&b);
    let guard = a.read();
    assert_eq!(guard.dependencies().len(), 1);
    assert_eq!(
        std::sync::Arc::as_ptr(&guard.dependencies()[0]),
        std::sync::Arc::as_ptr(&c)
    );
}

#[test]
fn test_all_symbols_aggregates_with_dedup() {
    let a = SymbolTable::new_ref("A", DuplicatePolicy::Reject);
    let b = SymbolTable::new_ref("B", DuplicatePolicy::Reject);
    // Diamond back to b: a -> b, a -> b again via idempotence check
    a.write().define(SymbolKind::Rule, None, "top").unwrap();
    b.write().define(SymbolKind::Rule, None, "sub").unwrap();
    a.write().add_dependency(b.clone());
    b.write().add_dependency(a.clone());

    let all = SymbolTable::all_symbols_in(&a, None, false);
    let names: Vec<_> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(all.len(), 2);
    assert!(names.contains(&"top") && names.contains(&"sub"));

    let rules = SymbolTable::all_symbols_in(&a, Some(SymbolKind::Rule), true);
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "top");
}

#[test]
fn test_clear_keeps_identity_and_edges() {
    let a = SymbolTable::new_ref("A", DuplicatePolicy::Reject);
    let b = SymbolTable::new_ref("B", DuplicatePolicy::Reject);
    a.write().add_dependency(b.clone());
    a.write().define(SymbolKind::Rule, None, "r").unwrap();
    a.write().clear();
    let guard = a.read();
    assert!(guard.local_symbols().is_empty());
    assert_eq!(guard.dependencies().len(), 1);
}

#[test]
fn test_unreferenced_symbols() {
    let mut table = SymbolTable::new("T", DuplicatePolicy::Reject);
    table.define(SymbolKind::Rule, None, "r").unwrap();
    table.define(SymbolKind::Rule, None, "s").unwrap();
    table
        .define(SymbolKind::RuleReference, None, "s")
        .unwrap();
    let unreferenced = table.unreferenced_symbols();
    assert_eq!(unreferenced.len(), 1);
    assert_eq!(unreferenced[0].name, "r");
}

#[test]
fn test_global_table_builtins_defined_once() {
    let first = global_table();
    let second = global_table();
    assert_eq!(
        std::sync::Arc::as_ptr(&first),
        std::sync::Arc::as_ptr(&second)
    );
    let guard = first.read();
    for name in ["EOF", "DEFAULT_MODE", "HIDDEN", "DEFAULT_TOKEN_CHANNEL"] {
        let matches = guard
            .local_symbols()
            .iter()
            .filter(|s| s.name == name)
            .count();
        assert_eq!(matches, 1, "{name} must be defined exactly once");
    }
    assert_eq!(
        guard.resolve_local("EOF").unwrap().kind,
        SymbolKind::VirtualToken
    );
}

#[test]
fn test_resolution_finds_builtins_through_global_dependency() {
    let table = SymbolTable::new_ref("G", DuplicatePolicy::Reject);
    table.write().add_dependency(global_table());
    for name in ["EOF", "DEFAULT_MODE", "HIDDEN", "DEFAULT_TOKEN_CHANNEL"] {
        assert!(
            SymbolTable::resolve_in(&table, name, false).is_some(),
            "{name} must resolve via the global table"
        );
    }
}
