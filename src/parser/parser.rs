//! Recursive-descent parser for C--.
//!
//! Consumes the token stream produced by the lexer and builds the parse
//! tree defined in [`crate::ast::tree`]. Expressions use precedence
//! climbing: assignment (right-associative, loosest), `||`, `&&`,
//! relational, additive, multiplicative, unary `-`/`!`, then postfix
//! indexing / member access / calls. There is no error recovery; the first
//! syntax error aborts the parse.

use crate::ast::tree::*;
use crate::errors::errors::SyntaxError;
use crate::lexer::tokens::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// Parses a whole translation unit.
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut ext_defs = Vec::new();

    while parser.current().kind != TokenKind::Eof {
        ext_defs.push(parser.parse_ext_def()?);
    }

    Ok(Program { ext_defs })
}

impl Parser {
    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    /// Consumes the current token if it matches.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the current token or fails the parse.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            token: self.current().value.clone(),
            line: self.current().line,
        }
    }

    fn parse_ext_def(&mut self) -> Result<ExtDef, SyntaxError> {
        let line = self.current().line;
        let specifier = self.parse_specifier()?;

        // `struct S { ... };` or `int;` — a specifier with no declarators
        if self.eat(TokenKind::Semi) {
            return Ok(ExtDef::Declaration {
                specifier,
                dec_list: Vec::new(),
                line,
            });
        }

        let name = self.expect(TokenKind::Id)?;
        if self.check(TokenKind::LParen) {
            let fun_dec = self.parse_fun_dec(name)?;
            let body = self.parse_comp_st()?;
            return Ok(ExtDef::Function {
                specifier,
                fun_dec,
                body,
                line,
            });
        }

        let mut dec_list = vec![self.parse_var_dec_rest(name)?];
        while self.eat(TokenKind::Comma) {
            dec_list.push(self.parse_var_dec()?);
        }
        self.expect(TokenKind::Semi)?;
        Ok(ExtDef::Declaration {
            specifier,
            dec_list,
            line,
        })
    }

    fn parse_specifier(&mut self) -> Result<Specifier, SyntaxError> {
        match self.current().kind {
            TokenKind::Type => {
                let token = self.advance();
                let ty = if token.value == "float" {
                    TypeSpec::Float
                } else {
                    TypeSpec::Int
                };
                Ok(Specifier::Basic {
                    ty,
                    line: token.line,
                })
            }
            TokenKind::Struct => Ok(Specifier::Struct(self.parse_struct_specifier()?)),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_struct_specifier(&mut self) -> Result<StructSpecifier, SyntaxError> {
        let line = self.expect(TokenKind::Struct)?.line;
        let tag = if self.check(TokenKind::Id) {
            Some(self.advance().value)
        } else {
            None
        };

        if self.eat(TokenKind::LBrace) {
            let defs = self.parse_def_list()?;
            self.expect(TokenKind::RBrace)?;
            Ok(StructSpecifier::Definition { tag, defs, line })
        } else {
            match tag {
                Some(tag) => Ok(StructSpecifier::Reference { tag, line }),
                None => Err(self.unexpected()),
            }
        }
    }

    fn parse_var_dec(&mut self) -> Result<VarDec, SyntaxError> {
        let name = self.expect(TokenKind::Id)?;
        self.parse_var_dec_rest(name)
    }

    /// Finishes a VarDec whose ID has already been consumed.
    fn parse_var_dec_rest(&mut self, name: Token) -> Result<VarDec, SyntaxError> {
        let mut dims = Vec::new();
        while self.eat(TokenKind::LBracket) {
            let length = self.expect(TokenKind::Int)?;
            let value = length
                .value
                .parse::<i32>()
                .map_err(|_| SyntaxError::NumberParseError {
                    token: length.value.clone(),
                    line: length.line,
                })?;
            dims.push(value);
            self.expect(TokenKind::RBracket)?;
        }
        Ok(VarDec {
            name: name.value,
            dims,
            line: name.line,
        })
    }

    fn parse_fun_dec(&mut self, name: Token) -> Result<FunDec, SyntaxError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_param_dec()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(FunDec {
            name: name.value,
            params,
            line: name.line,
        })
    }

    fn parse_param_dec(&mut self) -> Result<ParamDec, SyntaxError> {
        let line = self.current().line;
        let specifier = self.parse_specifier()?;
        let var_dec = self.parse_var_dec()?;
        Ok(ParamDec {
            specifier,
            var_dec,
            line,
        })
    }

    fn parse_comp_st(&mut self) -> Result<CompSt, SyntaxError> {
        let line = self.expect(TokenKind::LBrace)?.line;
        let defs = self.parse_def_list()?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(CompSt { defs, stmts, line })
    }

    /// Definitions always precede statements inside a block.
    fn parse_def_list(&mut self) -> Result<Vec<Def>, SyntaxError> {
        let mut defs = Vec::new();
        while self.check(TokenKind::Type) || self.check(TokenKind::Struct) {
            defs.push(self.parse_def()?);
        }
        Ok(defs)
    }

    fn parse_def(&mut self) -> Result<Def, SyntaxError> {
        let line = self.current().line;
        let specifier = self.parse_specifier()?;
        let mut decs = vec![self.parse_dec()?];
        while self.eat(TokenKind::Comma) {
            decs.push(self.parse_dec()?);
        }
        self.expect(TokenKind::Semi)?;
        Ok(Def {
            specifier,
            decs,
            line,
        })
    }

    fn parse_dec(&mut self) -> Result<Dec, SyntaxError> {
        let line = self.current().line;
        let var_dec = self.parse_var_dec()?;
        let init = if self.eat(TokenKind::Assign) {
            Some(self.parse_exp()?)
        } else {
            None
        };
        Ok(Dec {
            var_dec,
            init,
            line,
        })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, SyntaxError> {
        match self.current().kind {
            TokenKind::LBrace => Ok(Stmt::Comp(self.parse_comp_st()?)),
            TokenKind::Return => {
                let line = self.advance().line;
                let exp = self.parse_exp()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Return { exp, line })
            }
            TokenKind::If => {
                let line = self.advance().line;
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_exp()?;
                self.expect(TokenKind::RParen)?;
                let then = Box::new(self.parse_stmt()?);
                // `else` binds to the nearest `if`
                let otherwise = if self.eat(TokenKind::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    cond,
                    then,
                    otherwise,
                    line,
                })
            }
            TokenKind::While => {
                let line = self.advance().line;
                self.expect(TokenKind::LParen)?;
                let cond = self.parse_exp()?;
                self.expect(TokenKind::RParen)?;
                let body = Box::new(self.parse_stmt()?);
                Ok(Stmt::While { cond, body, line })
            }
            _ => {
                let exp = self.parse_exp()?;
                self.expect(TokenKind::Semi)?;
                Ok(Stmt::Exp(exp))
            }
        }
    }

    fn parse_exp(&mut self) -> Result<Exp, SyntaxError> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<Exp, SyntaxError> {
        let left = self.parse_or()?;
        if self.check(TokenKind::Assign) {
            let line = self.advance().line;
            let right = self.parse_assign()?;
            return Ok(Exp::Assign {
                left: Box::new(left),
                right: Box::new(right),
                line,
            });
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Exp, SyntaxError> {
        let mut left = self.parse_and()?;
        while self.check(TokenKind::Or) {
            let line = self.advance().line;
            let right = self.parse_and()?;
            left = Exp::Binary {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Exp, SyntaxError> {
        let mut left = self.parse_rel()?;
        while self.check(TokenKind::And) {
            let line = self.advance().line;
            let right = self.parse_rel()?;
            left = Exp::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_rel(&mut self) -> Result<Exp, SyntaxError> {
        let mut left = self.parse_add()?;
        while self.check(TokenKind::Relop) {
            let token = self.advance();
            let relop = RelOp::from_text(&token.value).ok_or(SyntaxError::UnexpectedToken {
                token: token.value.clone(),
                line: token.line,
            })?;
            let right = self.parse_add()?;
            left = Exp::Binary {
                op: BinOp::Relop(relop),
                left: Box::new(left),
                right: Box::new(right),
                line: token.line,
            };
        }
        Ok(left)
    }

    fn parse_add(&mut self) -> Result<Exp, SyntaxError> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinOp::Plus,
                TokenKind::Minus => BinOp::Minus,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_mul()?;
            left = Exp::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<Exp, SyntaxError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinOp::Star,
                TokenKind::Div => BinOp::Div,
                _ => break,
            };
            let line = self.advance().line;
            let right = self.parse_unary()?;
            left = Exp::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                line,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Exp, SyntaxError> {
        let op = match self.current().kind {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Not => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let line = self.advance().line;
        let operand = self.parse_unary()?;
        Ok(Exp::Unary {
            op,
            operand: Box::new(operand),
            line,
        })
    }

    fn parse_postfix(&mut self) -> Result<Exp, SyntaxError> {
        let mut exp = self.parse_primary()?;
        loop {
            if self.check(TokenKind::LBracket) {
                let line = self.advance().line;
                let index = self.parse_exp()?;
                self.expect(TokenKind::RBracket)?;
                exp = Exp::Index {
                    base: Box::new(exp),
                    index: Box::new(index),
                    line,
                };
            } else if self.check(TokenKind::Dot) {
                let line = self.advance().line;
                let field = self.expect(TokenKind::Id)?;
                exp = Exp::Member {
                    base: Box::new(exp),
                    field: field.value,
                    line,
                };
            } else {
                break;
            }
        }
        Ok(exp)
    }

    fn parse_primary(&mut self) -> Result<Exp, SyntaxError> {
        match self.current().kind {
            TokenKind::Int => {
                let token = self.advance();
                let value =
                    token
                        .value
                        .parse::<i32>()
                        .map_err(|_| SyntaxError::NumberParseError {
                            token: token.value.clone(),
                            line: token.line,
                        })?;
                Ok(Exp::Int {
                    value,
                    line: token.line,
                })
            }
            TokenKind::Float => {
                let token = self.advance();
                let value =
                    token
                        .value
                        .parse::<f32>()
                        .map_err(|_| SyntaxError::NumberParseError {
                            token: token.value.clone(),
                            line: token.line,
                        })?;
                Ok(Exp::Float {
                    value,
                    line: token.line,
                })
            }
            TokenKind::Id => {
                let token = self.advance();
                if self.check(TokenKind::LParen) {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_exp()?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    Ok(Exp::Call {
                        callee: token.value,
                        args,
                        line: token.line,
                    })
                } else {
                    Ok(Exp::Id {
                        name: token.value,
                        line: token.line,
                    })
                }
            }
            TokenKind::LParen => {
                self.advance();
                let exp = self.parse_exp()?;
                self.expect(TokenKind::RParen)?;
                Ok(exp)
            }
            _ => Err(self.unexpected()),
        }
    }
}
