//! Unit tests for error handling.
//!
//! This module contains tests for the diagnostic codes and their rendering.

use crate::errors::errors::{SemanticError, SemanticErrorKind, SyntaxError};

#[test]
fn test_error_codes_cover_one_to_seventeen() {
    use SemanticErrorKind::*;
    let kinds = vec![
        UndefVar("x".to_string()),
        UndefFunc("f".to_string()),
        RedefVar("x".to_string()),
        RedefFunc("f".to_string()),
        AssignMismatch,
        NotAssignable,
        OperandMismatch,
        ReturnMismatch,
        TooManyArgs {
            func: "f".to_string(),
            expected: 1,
        },
        NotAnArray,
        NotAFunc("x".to_string()),
        NonIntIndex,
        NotAStruct,
        UndefField("a".to_string()),
        RedefField("a".to_string()),
        RedefStruct("S".to_string()),
        UndefStruct("S".to_string()),
    ];

    let codes: Vec<u32> = kinds.iter().map(|kind| kind.code()).collect();
    assert_eq!(codes, (1..=17).collect::<Vec<u32>>());
}

#[test]
fn test_shared_codes() {
    assert_eq!(SemanticErrorKind::AssignMismatch.code(), 5);
    assert_eq!(SemanticErrorKind::ArrayInitializer.code(), 5);
    assert_eq!(
        SemanticErrorKind::TooFewArgs {
            func: "f".to_string(),
            expected: 2,
        }
        .code(),
        9
    );
    assert_eq!(
        SemanticErrorKind::ArgTypeMismatch {
            func: "f".to_string(),
        }
        .code(),
        9
    );
    assert_eq!(SemanticErrorKind::FieldInitializer.code(), 15);
}

#[test]
fn test_semantic_error_display_format() {
    let error = SemanticError::new(SemanticErrorKind::UndefVar("x".to_string()), 4);
    assert_eq!(
        error.to_string(),
        "Error type 1 at Line 4: Undefined variable \"x\"."
    );
}

#[test]
fn test_redef_struct_display() {
    let error = SemanticError::new(SemanticErrorKind::RedefStruct("S".to_string()), 2);
    assert_eq!(
        error.to_string(),
        "Error type 16 at Line 2: Duplicated struct name \"S\"."
    );
}

#[test]
fn test_syntax_error_display() {
    let error = SyntaxError::UnrecognisedToken {
        token: "@".to_string(),
        line: 3,
    };
    assert_eq!(error.to_string(), "unrecognised character \"@\" at line 3");
}
