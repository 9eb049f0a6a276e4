//! Unit tests for the semantic module: type equality quirks, symbol table
//! scoping, and one scenario per diagnostic code.

use super::analyzer::analyze;
use super::symbol_table::SymbolTable;
use super::types::{BasicType, Field, FieldList, SType};
use crate::errors::errors::SemanticError;
use crate::lexer::lexer::tokenize;
use crate::parser::parser::parse;

fn analyze_source(source: &str) -> (SymbolTable, Vec<SemanticError>) {
    let tokens = tokenize(source).unwrap();
    let program = parse(tokens).unwrap();
    analyze(&program)
}

fn error_codes(source: &str) -> Vec<u32> {
    let (_, errors) = analyze_source(source);
    errors.iter().map(|error| error.code()).collect()
}

fn int() -> SType {
    SType::Basic(BasicType::Int)
}

fn float() -> SType {
    SType::Basic(BasicType::Float)
}

// --- type equality ---

#[test]
fn test_basic_equality() {
    assert_eq!(int(), int());
    assert_ne!(int(), float());
}

#[test]
fn test_array_equality_ignores_length() {
    assert_eq!(SType::array(int(), 10), SType::array(int(), 3));
    assert_ne!(SType::array(int(), 10), SType::array(float(), 10));
    assert_ne!(SType::array(int(), 10), int());
}

#[test]
fn test_struct_equality_by_tag() {
    let mut fields_a = FieldList::new();
    fields_a.push(Field::new("x", int()));
    let mut fields_b = FieldList::new();
    fields_b.push(Field::new("y", float()));

    // same tag, different fields: still equal
    assert_eq!(
        SType::structure("S".to_string(), fields_a.clone()),
        SType::structure("S".to_string(), fields_b)
    );
    assert_ne!(
        SType::structure("S".to_string(), fields_a.clone()),
        SType::structure("T".to_string(), fields_a)
    );
}

#[test]
fn test_func_equals_nothing_including_itself() {
    let func = SType::func(FieldList::new(), int());
    assert_ne!(func, func.clone());
    assert_ne!(func, int());
}

#[test]
fn test_error_equals_everything() {
    assert_eq!(SType::Error, int());
    assert_eq!(float(), SType::Error);
    assert_eq!(SType::Error, SType::Error);
    assert_eq!(SType::Error, SType::array(int(), 5));
}

#[test]
fn test_reflexivity_except_func() {
    let mut fields = FieldList::new();
    fields.push(Field::new("x", int()));
    let samples = vec![
        int(),
        float(),
        SType::array(float(), 7),
        SType::structure("S".to_string(), fields),
        SType::Error,
    ];
    for ty in &samples {
        assert_eq!(ty, &ty.clone());
    }
}

#[test]
fn test_clone_is_deep_and_independent() {
    let mut fields = FieldList::new();
    fields.push(Field::new("a", SType::array(int(), 4)));
    let original = SType::structure("S".to_string(), fields);
    let cloned = original.clone();
    drop(original);
    assert_eq!(cloned, SType::structure("S".to_string(), FieldList::new()));
}

// --- symbol table ---

#[test]
fn test_scope_teardown_removes_only_inner_symbols() {
    let mut table = SymbolTable::new();
    table.insert(Field::new("g", int()), false);
    table.enter_scope();
    table.insert(Field::new("a", int()), false);
    table.enter_scope();
    table.insert(Field::new("b", int()), false);

    assert!(table.lookup("g").is_some());
    assert!(table.lookup("a").is_some());
    assert!(table.lookup("b").is_some());
    assert_eq!(table.depth(), 2);

    table.exit_scope();
    assert!(table.lookup("b").is_none());
    assert!(table.lookup("a").is_some());

    table.exit_scope();
    assert!(table.lookup("a").is_none());
    assert!(table.lookup("g").is_some());
    assert_eq!(table.len(), 1);
}

#[test]
fn test_shadowed_binding_reappears() {
    let mut table = SymbolTable::new();
    table.insert(Field::new("x", int()), false);
    table.enter_scope();
    table.insert(Field::new("x", float()), false);

    assert_eq!(table.lookup("x").unwrap().ty(), &float());
    assert_eq!(table.lookup("x").unwrap().depth, 1);

    table.exit_scope();
    assert_eq!(table.lookup("x").unwrap().ty(), &int());
    assert_eq!(table.lookup("x").unwrap().depth, 0);
}

#[test]
fn test_anon_struct_tags_are_numeric_and_fresh() {
    let mut table = SymbolTable::new();
    let first = table.next_anon_struct();
    let second = table.next_anon_struct();
    assert_ne!(first, second);
    assert!(first.chars().all(|c| c.is_ascii_digit()));
}

// --- analyzer: clean programs ---

#[test]
fn test_clean_program_has_no_diagnostics() {
    let source = "
        struct Point { int x; int y; };
        int dist(struct Point p) { return p.x + p.y; }
        int main() {
            struct Point p;
            p.x = 1;
            p.y = 2;
            return dist(p);
        }
    ";
    assert_eq!(error_codes(source), Vec::<u32>::new());
}

#[test]
fn test_read_write_builtins() {
    let source = "int main() { int x; x = read(); write(x + 1); return 0; }";
    assert_eq!(error_codes(source), Vec::<u32>::new());
}

#[test]
fn test_anonymous_struct_variable() {
    let source = "struct { int a; } s;\nint main() { s.a = 1; return s.a; }";
    assert_eq!(error_codes(source), Vec::<u32>::new());
}

// --- analyzer: one scenario per diagnostic code ---

#[test]
fn test_code_1_undefined_variable() {
    assert_eq!(error_codes("int main() { x = 1; return 0; }"), vec![1]);
}

#[test]
fn test_code_1_struct_tag_is_not_a_variable() {
    let source = "struct S { int a; };\nint main() { S = 1; return 0; }";
    assert_eq!(error_codes(source), vec![1]);
}

#[test]
fn test_code_2_undefined_function() {
    assert_eq!(error_codes("int main() { return f(); }"), vec![2]);
}

#[test]
fn test_code_3_redefined_variable() {
    let (table, errors) = analyze_source("int x;\nint x;");
    let codes: Vec<u32> = errors.iter().map(|error| error.code()).collect();
    assert_eq!(codes, vec![3]);
    // read, write, and exactly one x survive
    assert_eq!(table.len(), 3);
    assert_eq!(table.lookup("x").unwrap().ty(), &SType::Basic(BasicType::Int));
}

#[test]
fn test_code_3_variable_collides_with_struct_tag() {
    let source = "struct S { int a; };\nint S;";
    assert_eq!(error_codes(source), vec![3]);
}

#[test]
fn test_code_3_duplicate_parameter() {
    let source = "int f(int a, int a) { return a; }";
    assert_eq!(error_codes(source), vec![3]);
}

#[test]
fn test_code_4_redefined_function() {
    let source = "int main() { return 0; }\nint main() { return 1; }";
    assert_eq!(error_codes(source), vec![4]);
}

#[test]
fn test_code_5_assignment_mismatch() {
    let source = "int main() { int x; float y; y = 0.5; x = y; return 0; }";
    assert_eq!(error_codes(source), vec![5]);
}

#[test]
fn test_code_5_array_initializer() {
    let source = "int main() { int a[3] = 0; return 0; }";
    assert_eq!(error_codes(source), vec![5]);
}

#[test]
fn test_code_6_non_lvalue_assignment() {
    assert_eq!(error_codes("int main() { 1 = 2; return 0; }"), vec![6]);
    assert_eq!(
        error_codes("int main() { int x; x + 1 = 2; return 0; }"),
        vec![6]
    );
}

#[test]
fn test_code_7_operand_mismatch() {
    let source = "int main() { int x; float y; y = 0.5; x = x + y; return 0; }";
    assert_eq!(error_codes(source), vec![7]);
}

#[test]
fn test_code_7_array_operand() {
    let source = "int main() { int a[10]; int x; x = a + 1; return 0; }";
    assert_eq!(error_codes(source), vec![7]);
}

#[test]
fn test_code_7_unary_on_non_basic() {
    let source = "struct S { int a; };\nint main() { struct S s; int x; x = -s; return 0; }";
    assert_eq!(error_codes(source), vec![7]);
}

#[test]
fn test_code_7_non_scalar_condition() {
    let source = "int main() { int a[3]; if (a) return 1; return 0; }";
    assert_eq!(error_codes(source), vec![7]);
}

#[test]
fn test_code_8_return_mismatch() {
    let source = "float f() { return 1; }";
    assert_eq!(error_codes(source), vec![8]);
}

#[test]
fn test_code_9_too_many_arguments() {
    let source = "int f(int a) { return a; }\nint main() { return f(1, 2); }";
    assert_eq!(error_codes(source), vec![9]);
}

#[test]
fn test_code_9_too_few_arguments() {
    let source = "int f(int a, int b) { return a + b; }\nint main() { return f(1); }";
    assert_eq!(error_codes(source), vec![9]);
}

#[test]
fn test_code_9_argument_type_mismatch() {
    let source = "int f(int a) { return a; }\nint main() { float y; y = 0.5; return f(y); }";
    assert_eq!(error_codes(source), vec![9]);
}

#[test]
fn test_code_10_index_on_non_array() {
    let source = "int main() { int x; x[1] = 1; return 0; }";
    assert_eq!(error_codes(source), vec![10]);
}

#[test]
fn test_code_11_call_on_non_function() {
    let source = "int main() { int x; return x(); }";
    assert_eq!(error_codes(source), vec![11]);
}

#[test]
fn test_code_12_non_integer_index() {
    let source = "int main() { int a[5]; float f; f = 0.5; return a[f]; }";
    assert_eq!(error_codes(source), vec![12]);
}

#[test]
fn test_code_13_member_on_non_struct() {
    let source = "int main() { int x; x.a = 1; return 0; }";
    assert_eq!(error_codes(source), vec![13]);
}

#[test]
fn test_code_14_nonexistent_field() {
    let source = "struct S { int a; };\nint main() { struct S s; return s.b; }";
    assert_eq!(error_codes(source), vec![14]);
}

#[test]
fn test_code_15_redefined_field() {
    let source = "struct S { int a; int a; };";
    assert_eq!(error_codes(source), vec![15]);
}

#[test]
fn test_code_15_field_initializer() {
    let source = "struct S { int a = 1; };";
    assert_eq!(error_codes(source), vec![15]);
}

#[test]
fn test_code_16_redefined_struct() {
    let source = "struct S { int a; };\nstruct S { int b; };";
    assert_eq!(error_codes(source), vec![16]);
}

#[test]
fn test_code_17_undefined_struct_reference() {
    let source = "int main() { struct T t; return 0; }";
    assert_eq!(error_codes(source), vec![17]);
}

#[test]
fn test_logical_not_yields_int() {
    // `!` produces an int like the other logical operators
    let source = "int main() { int x; float f; f = 0.5; x = !f; return x; }";
    assert_eq!(error_codes(source), Vec::<u32>::new());
    // arithmetic negation keeps the operand's type
    let source = "int main() { int x; float f; f = 0.5; x = -f; return 0; }";
    assert_eq!(error_codes(source), vec![5]);
}

// --- recovery semantics ---

#[test]
fn test_error_type_suppresses_cascades() {
    // one undefined variable, used repeatedly: exactly one diagnostic per use
    let source = "int main() { int x; x = y + 1; return x; }";
    assert_eq!(error_codes(source), vec![1]);
}

#[test]
fn test_line_numbers_in_diagnostics() {
    let (_, errors) = analyze_source("int x;\n\nint main() { y = 1; return 0; }");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].line, 3);
    assert_eq!(
        errors[0].to_string(),
        "Error type 1 at Line 3: Undefined variable \"y\"."
    );
}

#[test]
fn test_analysis_continues_after_errors() {
    // two independent faults on different lines are both reported
    let source = "int main() {\n a = 1;\n b = 2;\n return 0;\n}";
    assert_eq!(error_codes(source), vec![1, 1]);
}

#[test]
fn test_locals_do_not_shadow_globals() {
    // single namespace with whole-table duplicate rule
    let source = "int x;\nint main() { int x; return 0; }";
    assert_eq!(error_codes(source), vec![3]);
}

#[test]
fn test_globals_survive_analysis() {
    let (table, errors) = analyze_source(
        "int g;\nstruct S { int a; };\nint main() { int local; local = 1; return local; }",
    );
    assert!(errors.is_empty());
    assert!(table.lookup("g").is_some());
    assert!(table.lookup("S").unwrap().is_struct_tag);
    assert!(table.lookup("main").is_some());
    // locals were torn down with their scope
    assert!(table.lookup("local").is_none());
}
