//! Semantic analysis: a single walk over the parse tree that builds the
//! symbol table and collects diagnostics.
//!
//! Recovery, not abort: every fault appends one [`SemanticError`] and the
//! walk continues with [`SType::Error`] standing in for the faulty type.
//! `SType::Error` compares equal to everything, so a reported fault never
//! cascades into follow-on diagnostics.
//!
//! The table that comes back keeps its global scope intact (variables,
//! functions, struct tags), which is exactly what the IR generator needs to
//! start its own walk.

use crate::ast::tree::*;
use crate::errors::errors::{SemanticError, SemanticErrorKind};

use super::symbol_table::SymbolTable;
use super::types::{BasicType, Field, FieldList, SType};

pub struct Analyzer {
    table: SymbolTable,
    errors: Vec<SemanticError>,
}

/// Analyzes a whole program. Always runs to completion.
pub fn analyze(program: &Program) -> (SymbolTable, Vec<SemanticError>) {
    let mut analyzer = Analyzer::new();
    for ext_def in &program.ext_defs {
        analyzer.ext_def(ext_def);
    }
    (analyzer.table, analyzer.errors)
}

impl Analyzer {
    fn new() -> Analyzer {
        let mut table = SymbolTable::new();
        // library routines: read : () -> int, write : (int) -> int
        table.insert(
            Field::new("read", SType::func(FieldList::new(), SType::Basic(BasicType::Int))),
            false,
        );
        let mut write_params = FieldList::new();
        write_params.push(Field::new("value", SType::Basic(BasicType::Int)));
        table.insert(
            Field::new("write", SType::func(write_params, SType::Basic(BasicType::Int))),
            false,
        );
        Analyzer {
            table,
            errors: Vec::new(),
        }
    }

    fn error(&mut self, line: u32, kind: SemanticErrorKind) {
        self.errors.push(SemanticError::new(kind, line));
    }

    fn ext_def(&mut self, ext_def: &ExtDef) {
        match ext_def {
            ExtDef::Declaration {
                specifier,
                dec_list,
                ..
            } => {
                let base = self.specifier(specifier);
                for var_dec in dec_list {
                    let field = build_field(var_dec, &base);
                    if self.table.lookup(&field.name).is_some() {
                        self.error(var_dec.line, SemanticErrorKind::RedefVar(field.name.clone()));
                    } else {
                        self.table.insert(field, false);
                    }
                }
            }
            ExtDef::Function {
                specifier,
                fun_dec,
                body,
                ..
            } => self.function(specifier, fun_dec, body),
        }
    }

    fn specifier(&mut self, specifier: &Specifier) -> SType {
        match specifier {
            Specifier::Basic {
                ty: TypeSpec::Int, ..
            } => SType::Basic(BasicType::Int),
            Specifier::Basic {
                ty: TypeSpec::Float,
                ..
            } => SType::Basic(BasicType::Float),
            Specifier::Struct(spec) => self.struct_specifier(spec),
        }
    }

    fn struct_specifier(&mut self, spec: &StructSpecifier) -> SType {
        match spec {
            StructSpecifier::Definition { tag, defs, line } => {
                let mut fields = FieldList::new();
                for def in defs {
                    let base = self.specifier(&def.specifier);
                    for dec in &def.decs {
                        if dec.init.is_some() {
                            self.error(dec.line, SemanticErrorKind::FieldInitializer);
                            continue;
                        }
                        let field = build_field(&dec.var_dec, &base);
                        if fields.find(&field.name).is_some() {
                            self.error(dec.line, SemanticErrorKind::RedefField(field.name.clone()));
                        } else {
                            fields.push(field);
                        }
                    }
                }
                let tag_name = match tag {
                    Some(name) => name.clone(),
                    None => self.table.next_anon_struct(),
                };
                if self.table.lookup(&tag_name).is_some() {
                    self.error(*line, SemanticErrorKind::RedefStruct(tag_name));
                    return SType::Error;
                }
                let ty = SType::structure(tag_name.clone(), fields);
                if tag.is_some() {
                    self.table.insert(Field::new(tag_name, ty.clone()), true);
                }
                ty
            }
            StructSpecifier::Reference { tag, line } => {
                let resolved = self.table.lookup(tag).and_then(|symbol| {
                    if symbol.is_struct_tag {
                        Some(symbol.ty().clone())
                    } else {
                        None
                    }
                });
                match resolved {
                    Some(ty) => ty,
                    None => {
                        self.error(*line, SemanticErrorKind::UndefStruct(tag.clone()));
                        SType::Error
                    }
                }
            }
        }
    }

    fn function(&mut self, specifier: &Specifier, fun_dec: &FunDec, body: &CompSt) {
        let ret = self.specifier(specifier);

        // Parameter fields are collected up front; the function symbol
        // itself lives in the enclosing scope, the parameters in their own
        // scope wrapping the body.
        let mut params = FieldList::new();
        let mut param_fields = Vec::new();
        for param in &fun_dec.params {
            let base = self.specifier(&param.specifier);
            let field = build_field(&param.var_dec, &base);
            if self.table.lookup(&field.name).is_some() || params.find(&field.name).is_some() {
                self.error(param.line, SemanticErrorKind::RedefVar(field.name.clone()));
            } else {
                params.push(field.clone());
                param_fields.push(field);
            }
        }

        let func_ty = SType::func(params, ret.clone());
        if self.table.lookup(&fun_dec.name).is_some() {
            self.error(fun_dec.line, SemanticErrorKind::RedefFunc(fun_dec.name.clone()));
        } else {
            self.table.insert(Field::new(fun_dec.name.clone(), func_ty), false);
        }

        // the body is analyzed even when the name was a duplicate
        self.table.enter_scope();
        for field in param_fields {
            self.table.insert(field, false);
        }
        self.comp_st(body, &ret);
        self.table.exit_scope();
    }

    fn comp_st(&mut self, comp_st: &CompSt, ret: &SType) {
        self.table.enter_scope();
        for def in &comp_st.defs {
            self.def(def);
        }
        for stmt in &comp_st.stmts {
            self.stmt(stmt, ret);
        }
        self.table.exit_scope();
    }

    fn def(&mut self, def: &Def) {
        let base = self.specifier(&def.specifier);
        for dec in &def.decs {
            let field = build_field(&dec.var_dec, &base);
            if self.table.lookup(&field.name).is_some() {
                self.error(dec.line, SemanticErrorKind::RedefVar(field.name.clone()));
                // the initializer is still checked for its own faults
                if let Some(init) = &dec.init {
                    self.exp(init);
                }
                continue;
            }
            if let Some(init) = &dec.init {
                let init_ty = self.exp(init);
                if matches!(field.ty, SType::Array { .. }) {
                    self.error(dec.line, SemanticErrorKind::ArrayInitializer);
                } else if field.ty != init_ty {
                    self.error(dec.line, SemanticErrorKind::AssignMismatch);
                }
            }
            self.table.insert(field, false);
        }
    }

    fn stmt(&mut self, stmt: &Stmt, ret: &SType) {
        match stmt {
            Stmt::Exp(exp) => {
                self.exp(exp);
            }
            Stmt::Comp(comp_st) => self.comp_st(comp_st, ret),
            Stmt::Return { exp, line } => {
                let ty = self.exp(exp);
                if *ret != ty {
                    self.error(*line, SemanticErrorKind::ReturnMismatch);
                }
            }
            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                self.condition(cond);
                self.stmt(then, ret);
                if let Some(otherwise) = otherwise {
                    self.stmt(otherwise, ret);
                }
            }
            Stmt::While { cond, body, .. } => {
                self.condition(cond);
                self.stmt(body, ret);
            }
        }
    }

    /// `if`/`while` conditions must be scalar.
    fn condition(&mut self, cond: &Exp) {
        let ty = self.exp(cond);
        if !matches!(ty, SType::Basic(_) | SType::Error) {
            self.error(cond.line(), SemanticErrorKind::OperandMismatch);
        }
    }

    /// Bottom-up type synthesis for expressions.
    fn exp(&mut self, exp: &Exp) -> SType {
        match exp {
            Exp::Assign { left, right, line } => {
                let left_ty = self.exp(left);
                let right_ty = self.exp(right);
                if !is_lvalue(left) {
                    self.error(*line, SemanticErrorKind::NotAssignable);
                    return SType::Error;
                }
                if left_ty != right_ty {
                    self.error(*line, SemanticErrorKind::AssignMismatch);
                    return SType::Error;
                }
                left_ty
            }
            Exp::Binary {
                op,
                left,
                right,
                line,
            } => {
                let left_ty = self.exp(left);
                let right_ty = self.exp(right);
                if matches!(left_ty, SType::Array { .. })
                    || matches!(right_ty, SType::Array { .. })
                {
                    self.error(*line, SemanticErrorKind::OperandMismatch);
                    return SType::Error;
                }
                if left_ty != right_ty {
                    self.error(*line, SemanticErrorKind::OperandMismatch);
                    return SType::Error;
                }
                if left_ty.is_error() || right_ty.is_error() {
                    return SType::Error;
                }
                match op {
                    BinOp::And | BinOp::Or | BinOp::Relop(_) => SType::Basic(BasicType::Int),
                    _ => left_ty,
                }
            }
            Exp::Unary { op, operand, line } => {
                let ty = self.exp(operand);
                match ty {
                    SType::Error => SType::Error,
                    // logical negation yields int regardless of operand type
                    SType::Basic(_) => match op {
                        UnaryOp::Not => SType::Basic(BasicType::Int),
                        UnaryOp::Neg => ty,
                    },
                    _ => {
                        self.error(*line, SemanticErrorKind::OperandMismatch);
                        SType::Error
                    }
                }
            }
            Exp::Index { base, index, line } => {
                let base_ty = self.exp(base);
                let index_ty = self.exp(index);
                let elem = match base_ty {
                    SType::Error => return SType::Error,
                    SType::Array { elem, .. } => *elem,
                    _ => {
                        self.error(*line, SemanticErrorKind::NotAnArray);
                        return SType::Error;
                    }
                };
                if !matches!(index_ty, SType::Basic(BasicType::Int) | SType::Error) {
                    self.error(*line, SemanticErrorKind::NonIntIndex);
                }
                elem
            }
            Exp::Member { base, field, line } => {
                let base_ty = self.exp(base);
                match base_ty {
                    SType::Error => SType::Error,
                    SType::Struct { fields, .. } => match fields.find(field) {
                        Some(found) => found.ty.clone(),
                        None => {
                            self.error(*line, SemanticErrorKind::UndefField(field.clone()));
                            SType::Error
                        }
                    },
                    _ => {
                        self.error(*line, SemanticErrorKind::NotAStruct);
                        SType::Error
                    }
                }
            }
            Exp::Call { callee, args, line } => {
                let looked = self.table.lookup(callee).map(|symbol| symbol.ty().clone());
                match looked {
                    None => {
                        self.error(*line, SemanticErrorKind::UndefFunc(callee.clone()));
                        SType::Error
                    }
                    Some(SType::Func { params, ret }) => {
                        self.call_args(callee, &params, args, *line);
                        *ret
                    }
                    Some(_) => {
                        self.error(*line, SemanticErrorKind::NotAFunc(callee.clone()));
                        SType::Error
                    }
                }
            }
            Exp::Id { name, line } => {
                let looked = self
                    .table
                    .lookup(name)
                    .map(|symbol| (symbol.ty().clone(), symbol.is_struct_tag));
                match looked {
                    Some((ty, false)) => ty,
                    // a struct tag is not a variable
                    _ => {
                        self.error(*line, SemanticErrorKind::UndefVar(name.clone()));
                        SType::Error
                    }
                }
            }
            Exp::Int { .. } => SType::Basic(BasicType::Int),
            Exp::Float { .. } => SType::Basic(BasicType::Float),
        }
    }

    fn call_args(&mut self, callee: &str, params: &FieldList, args: &[Exp], line: u32) {
        let expected = params.len();
        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.exp(arg);
            match params.get(i) {
                None => {
                    self.error(
                        line,
                        SemanticErrorKind::TooManyArgs {
                            func: callee.to_string(),
                            expected,
                        },
                    );
                    return;
                }
                Some(param) => {
                    if param.ty != arg_ty {
                        self.error(
                            line,
                            SemanticErrorKind::ArgTypeMismatch {
                                func: callee.to_string(),
                            },
                        );
                        return;
                    }
                }
            }
        }
        if args.len() < expected {
            self.error(
                line,
                SemanticErrorKind::TooFewArgs {
                    func: callee.to_string(),
                    expected,
                },
            );
        }
    }
}

/// Wraps a base type in the declarator's array dimensions, outermost first.
pub fn build_field(var_dec: &VarDec, base: &SType) -> Field {
    let mut ty = base.clone();
    for dim in var_dec.dims.iter().rev() {
        ty = SType::array(ty, *dim);
    }
    Field::new(var_dec.name.clone(), ty)
}

fn is_lvalue(exp: &Exp) -> bool {
    matches!(exp, Exp::Id { .. } | Exp::Index { .. } | Exp::Member { .. })
}
