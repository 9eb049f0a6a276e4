use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    /// Reserved words of the language. `int` and `float` collapse into the
    /// single TYPE token class; the token value keeps the spelling.
    pub static ref RESERVED_LOOKUP: HashMap<String, TokenKind> = {
        let mut map = HashMap::new();
        map.insert(String::from("int"), TokenKind::Type);
        map.insert(String::from("float"), TokenKind::Type);
        map.insert(String::from("struct"), TokenKind::Struct);
        map.insert(String::from("return"), TokenKind::Return);
        map.insert(String::from("if"), TokenKind::If);
        map.insert(String::from("else"), TokenKind::Else);
        map.insert(String::from("while"), TokenKind::While);
        map
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Type,
    Id,
    Int,
    Float,
    Struct,
    Return,
    If,
    Else,
    While,
    /// One class for `< <= > >= == !=`; the token value carries the text.
    Relop,
    Assign,
    Plus,
    Minus,
    Star,
    Div,
    And,
    Or,
    Not,
    Dot,
    Semi,
    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: u32,
}
