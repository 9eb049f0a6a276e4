use std::fmt;

use thiserror::Error;

/// Lexical and syntactic failures. These abort the run before semantic
/// analysis starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("unrecognised character {token:?} at line {line}")]
    UnrecognisedToken { token: String, line: u32 },
    #[error("unexpected token {token:?} at line {line}")]
    UnexpectedToken { token: String, line: u32 },
    #[error("invalid number literal {token:?} at line {line}")]
    NumberParseError { token: String, line: u32 },
}

/// The recoverable diagnostics of the semantic analyzer.
///
/// Each variant maps to one of the 17 numbered error codes through
/// [`SemanticErrorKind::code`]. A few codes cover more than one condition
/// (5, 9 and 15), so several variants may share a code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    #[error("Undefined variable \"{0}\".")]
    UndefVar(String),
    #[error("Undefined function \"{0}\".")]
    UndefFunc(String),
    #[error("Redefined variable \"{0}\".")]
    RedefVar(String),
    #[error("Redefined function \"{0}\".")]
    RedefFunc(String),
    #[error("Type mismatched for assignment.")]
    AssignMismatch,
    #[error("Illegal initialization for an array variable.")]
    ArrayInitializer,
    #[error("The left-hand side of an assignment must be a variable.")]
    NotAssignable,
    #[error("Type mismatched for operands.")]
    OperandMismatch,
    #[error("Type mismatched for return.")]
    ReturnMismatch,
    #[error("Too few arguments for function \"{func}\"; expected {expected}.")]
    TooFewArgs { func: String, expected: usize },
    #[error("Too many arguments for function \"{func}\"; expected {expected}.")]
    TooManyArgs { func: String, expected: usize },
    #[error("Mismatched argument types for function \"{func}\".")]
    ArgTypeMismatch { func: String },
    #[error("The operand is not an array.")]
    NotAnArray,
    #[error("\"{0}\" is not a function.")]
    NotAFunc(String),
    #[error("The index of an array must be an integer.")]
    NonIntIndex,
    #[error("Illegal use of \".\" on a non-struct operand.")]
    NotAStruct,
    #[error("Non-existent field \"{0}\".")]
    UndefField(String),
    #[error("Redefined field \"{0}\".")]
    RedefField(String),
    #[error("Illegal initialization inside a struct definition.")]
    FieldInitializer,
    #[error("Duplicated struct name \"{0}\".")]
    RedefStruct(String),
    #[error("Undefined structure \"{0}\".")]
    UndefStruct(String),
}

impl SemanticErrorKind {
    /// The numbered error code reported to the user.
    pub fn code(&self) -> u32 {
        use SemanticErrorKind::*;
        match self {
            UndefVar(_) => 1,
            UndefFunc(_) => 2,
            RedefVar(_) => 3,
            RedefFunc(_) => 4,
            AssignMismatch | ArrayInitializer => 5,
            NotAssignable => 6,
            OperandMismatch => 7,
            ReturnMismatch => 8,
            TooFewArgs { .. } | TooManyArgs { .. } | ArgTypeMismatch { .. } => 9,
            NotAnArray => 10,
            NotAFunc(_) => 11,
            NonIntIndex => 12,
            NotAStruct => 13,
            UndefField(_) => 14,
            RedefField(_) | FieldInitializer => 15,
            RedefStruct(_) => 16,
            UndefStruct(_) => 17,
        }
    }
}

/// One semantic diagnostic. Analysis never aborts on these; it collects
/// every diagnostic and runs to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    pub kind: SemanticErrorKind,
    pub line: u32,
}

impl SemanticError {
    pub fn new(kind: SemanticErrorKind, line: u32) -> SemanticError {
        SemanticError { kind, line }
    }

    pub fn code(&self) -> u32 {
        self.kind.code()
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error type {} at Line {}: {}",
            self.kind.code(),
            self.line,
            self.kind
        )
    }
}

impl std::error::Error for SemanticError {}
