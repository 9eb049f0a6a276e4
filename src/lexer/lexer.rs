use regex::Regex;

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};
use crate::errors::errors::SyntaxError;
use crate::{MK_DEFAULT_HANDLER, MK_TOKEN};

pub type RegexHandler = fn(&mut Lexer, &Regex);

/// One token class: an anchored pattern and the handler that consumes it.
pub struct LexPattern {
    regex: Regex,
    handler: RegexHandler,
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    pub line: u32,
}

impl Lexer {
    fn new(source: String) -> Lexer {
        Lexer {
            tokens: Vec::new(),
            source,
            pos: 0,
            line: 1,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.source[self.pos..].chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }
}

/// Pattern table. Order matters: comments before `/`, two-character
/// operators before their one-character prefixes, float before int.
fn patterns() -> Vec<LexPattern> {
    vec![
        LexPattern {
            regex: Regex::new(r"^\s+").unwrap(),
            handler: skip_handler,
        },
        LexPattern {
            regex: Regex::new(r"^//.*").unwrap(),
            handler: skip_handler,
        },
        LexPattern {
            regex: Regex::new(r"^(?s)/\*.*?\*/").unwrap(),
            handler: skip_handler,
        },
        LexPattern {
            regex: Regex::new(r"^[0-9]+\.[0-9]+").unwrap(),
            handler: float_handler,
        },
        LexPattern {
            regex: Regex::new(r"^[0-9]+").unwrap(),
            handler: int_handler,
        },
        LexPattern {
            regex: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap(),
            handler: symbol_handler,
        },
        LexPattern {
            regex: Regex::new(r"^(==|!=|<=|>=|<|>)").unwrap(),
            handler: relop_handler,
        },
        LexPattern {
            regex: Regex::new(r"^&&").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::And, "&&"),
        },
        LexPattern {
            regex: Regex::new(r"^\|\|").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Or, "||"),
        },
        LexPattern {
            regex: Regex::new(r"^=").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Assign, "="),
        },
        LexPattern {
            regex: Regex::new(r"^!").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Not, "!"),
        },
        LexPattern {
            regex: Regex::new(r"^\+").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Plus, "+"),
        },
        LexPattern {
            regex: Regex::new(r"^-").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Minus, "-"),
        },
        LexPattern {
            regex: Regex::new(r"^\*").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Star, "*"),
        },
        LexPattern {
            regex: Regex::new(r"^/").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Div, "/"),
        },
        LexPattern {
            regex: Regex::new(r"^\.").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Dot, "."),
        },
        LexPattern {
            regex: Regex::new(r"^;").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Semi, ";"),
        },
        LexPattern {
            regex: Regex::new(r"^,").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::Comma, ","),
        },
        LexPattern {
            regex: Regex::new(r"^\(").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::LParen, "("),
        },
        LexPattern {
            regex: Regex::new(r"^\)").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::RParen, ")"),
        },
        LexPattern {
            regex: Regex::new(r"^\[").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::LBracket, "["),
        },
        LexPattern {
            regex: Regex::new(r"^\]").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::RBracket, "]"),
        },
        LexPattern {
            regex: Regex::new(r"^\{").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::LBrace, "{"),
        },
        LexPattern {
            regex: Regex::new(r"^\}").unwrap(),
            handler: MK_DEFAULT_HANDLER!(TokenKind::RBrace, "}"),
        },
    ]
}

// Handlers copy the match out before touching the lexer: `Match` borrows
// the remainder, which borrows the lexer itself.

fn skip_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = regex.find(lexer.remainder()).unwrap();
    let end = matched.end();
    let newlines = matched.as_str().matches('\n').count() as u32;
    lexer.line += newlines;
    lexer.advance_n(end);
}

fn int_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = regex.find(lexer.remainder()).unwrap();
    let end = matched.end();
    let text = matched.as_str().to_string();
    let line = lexer.line;
    lexer.push(MK_TOKEN!(TokenKind::Int, text, line));
    lexer.advance_n(end);
}

fn float_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = regex.find(lexer.remainder()).unwrap();
    let end = matched.end();
    let text = matched.as_str().to_string();
    let line = lexer.line;
    lexer.push(MK_TOKEN!(TokenKind::Float, text, line));
    lexer.advance_n(end);
}

fn symbol_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = regex.find(lexer.remainder()).unwrap();
    let end = matched.end();
    let text = matched.as_str().to_string();
    let kind = RESERVED_LOOKUP.get(&text).copied().unwrap_or(TokenKind::Id);
    let line = lexer.line;
    lexer.push(MK_TOKEN!(kind, text, line));
    lexer.advance_n(end);
}

fn relop_handler(lexer: &mut Lexer, regex: &Regex) {
    let matched = regex.find(lexer.remainder()).unwrap();
    let end = matched.end();
    let text = matched.as_str().to_string();
    let line = lexer.line;
    lexer.push(MK_TOKEN!(TokenKind::Relop, text, line));
    lexer.advance_n(end);
}

/// Turns source text into a token stream terminated by an EOF token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = Lexer::new(source.to_string());
    let patterns = patterns();

    while !lexer.at_eof() {
        let mut matched = false;

        for pattern in patterns.iter() {
            if pattern.regex.is_match(lexer.remainder()) {
                (pattern.handler)(&mut lexer, &pattern.regex);
                matched = true;
                break;
            }
        }

        if !matched {
            return Err(SyntaxError::UnrecognisedToken {
                token: lexer.at().to_string(),
                line: lexer.line,
            });
        }
    }

    let line = lexer.line;
    lexer.push(MK_TOKEN!(TokenKind::Eof, String::from("EOF"), line));
    Ok(lexer.tokens)
}
