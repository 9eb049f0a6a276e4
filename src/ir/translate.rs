//! Lowering from the analyzed parse tree to three-address code.
//!
//! Runs only on programs that analyzed cleanly. The generator takes over
//! the analyzer's symbol table — global variables, functions and struct
//! tags are still live — and rebuilds local scopes during its own walk.
//!
//! Expression translation follows the place convention: the caller hands in
//! a mutable destination operand, and leaf expressions *retag* it
//! (identifier to `Variable`, literal to `Constant`) instead of emitting a
//! copy. Booleans are jump code: conditions translate against a true/false
//! label pair and never materialize a value unless one is demanded.

use std::collections::HashSet;

use thiserror::Error;

use crate::ast::tree::*;
use crate::semantic::analyzer::build_field;
use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::types::{BasicType, Field, FieldList, SType};

use super::ir::{InterCode, IrList, Operand};

/// Constructs the translator cannot lower. These are language features the
/// IR has no encoding for; hitting one fails the whole translation rather
/// than emitting wrong code.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("variables of multi-dimensional array type are not supported")]
    MultiDimArray,
    #[error("parameters and arguments of array type are not supported")]
    ArrayParam,
    #[error("floating point values are not supported")]
    FloatUnsupported,
    #[error("cannot take the address of this expression")]
    NotAddressable,
}

/// Lowers a whole program. `table` is the analyzer's symbol table.
pub fn generate(program: &Program, table: SymbolTable) -> Result<IrList, TranslateError> {
    let mut generator = Generator {
        table,
        code: IrList::new(),
        address_params: HashSet::new(),
    };
    for ext_def in &program.ext_defs {
        generator.ext_def(ext_def)?;
    }
    Ok(generator.code)
}

struct Generator {
    table: SymbolTable,
    code: IrList,
    /// Parameters of struct type hold the address of the caller's value.
    address_params: HashSet<String>,
}

impl Generator {
    fn ext_def(&mut self, ext_def: &ExtDef) -> Result<(), TranslateError> {
        match ext_def {
            // global declarations carry no code of their own
            ExtDef::Declaration { .. } => Ok(()),
            ExtDef::Function { fun_dec, body, .. } => self.function(fun_dec, body),
        }
    }

    fn function(&mut self, fun_dec: &FunDec, body: &CompSt) -> Result<(), TranslateError> {
        self.code.push(InterCode::Function(fun_dec.name.clone()));

        let params = match self.table.lookup(&fun_dec.name).map(|sym| sym.ty().clone()) {
            Some(SType::Func { params, .. }) => params,
            _ => FieldList::new(),
        };

        self.address_params.clear();
        self.table.enter_scope();
        for field in params.iter() {
            match &field.ty {
                SType::Array { .. } => return Err(TranslateError::ArrayParam),
                SType::Struct { .. } => {
                    self.address_params.insert(field.name.clone());
                }
                _ => {}
            }
            self.code
                .push(InterCode::Param(Operand::Variable(field.name.clone())));
            self.table.insert(field.clone(), false);
        }
        self.comp_st(body)?;
        self.table.exit_scope();
        Ok(())
    }

    fn comp_st(&mut self, comp_st: &CompSt) -> Result<(), TranslateError> {
        self.table.enter_scope();
        for def in &comp_st.defs {
            self.def(def)?;
        }
        for stmt in &comp_st.stmts {
            self.stmt(stmt)?;
        }
        self.table.exit_scope();
        Ok(())
    }

    fn def(&mut self, def: &Def) -> Result<(), TranslateError> {
        let base = self.resolve_specifier(&def.specifier);
        for dec in &def.decs {
            let field = build_field(&dec.var_dec, &base);
            if let SType::Array { elem, .. } = &field.ty {
                if matches!(**elem, SType::Array { .. }) {
                    return Err(TranslateError::MultiDimArray);
                }
            }
            match &field.ty {
                SType::Array { .. } | SType::Struct { .. } => {
                    self.code.push(InterCode::Dec {
                        var: Operand::Variable(field.name.clone()),
                        size: size_of(&field.ty),
                    });
                }
                _ => {}
            }
            let name = field.name.clone();
            self.table.insert(field, false);
            if let Some(init) = &dec.init {
                let mut value = self.code.new_temp();
                self.exp(init, &mut value)?;
                self.code.push(InterCode::Assign {
                    left: Operand::Variable(name),
                    right: value,
                });
            }
        }
        Ok(())
    }

    /// Resolves a specifier against the live table. Struct references must
    /// resolve: the analyzer already rejected undefined tags.
    fn resolve_specifier(&mut self, specifier: &Specifier) -> SType {
        match specifier {
            Specifier::Basic {
                ty: TypeSpec::Int, ..
            } => SType::Basic(BasicType::Int),
            Specifier::Basic {
                ty: TypeSpec::Float,
                ..
            } => SType::Basic(BasicType::Float),
            Specifier::Struct(StructSpecifier::Reference { tag, .. }) => self
                .table
                .lookup(tag)
                .map(|sym| sym.ty().clone())
                .expect("struct tag was resolved during semantic analysis"),
            Specifier::Struct(StructSpecifier::Definition { tag, defs, .. }) => {
                let mut fields = FieldList::new();
                for def in defs {
                    let base = self.resolve_specifier(&def.specifier);
                    for dec in &def.decs {
                        fields.push(build_field(&dec.var_dec, &base));
                    }
                }
                let tag_name = match tag {
                    Some(name) => name.clone(),
                    None => self.table.next_anon_struct(),
                };
                let ty = SType::structure(tag_name.clone(), fields);
                // local struct definitions were torn down with their scope
                // during analysis; re-register so later references resolve
                if tag.is_some() && self.table.lookup(&tag_name).is_none() {
                    self.table.insert(Field::new(tag_name, ty.clone()), true);
                }
                ty
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), TranslateError> {
        match stmt {
            Stmt::Exp(exp) => {
                let mut scratch = self.code.new_temp();
                self.exp(exp, &mut scratch)
            }
            Stmt::Comp(comp_st) => self.comp_st(comp_st),
            Stmt::Return { exp, .. } => {
                let mut value = self.code.new_temp();
                self.exp(exp, &mut value)?;
                self.code.push(InterCode::Return(value));
                Ok(())
            }
            Stmt::If {
                cond,
                then,
                otherwise,
                ..
            } => {
                let label_true = self.code.new_label();
                let label_false = self.code.new_label();
                self.cond(cond, &label_true, &label_false)?;
                self.code.push(InterCode::Label(label_true));
                self.stmt(then)?;
                match otherwise {
                    None => self.code.push(InterCode::Label(label_false)),
                    Some(else_stmt) => {
                        let label_end = self.code.new_label();
                        self.code.push(InterCode::Goto(label_end.clone()));
                        self.code.push(InterCode::Label(label_false));
                        self.stmt(else_stmt)?;
                        self.code.push(InterCode::Label(label_end));
                    }
                }
                Ok(())
            }
            Stmt::While { cond, body, .. } => {
                let label_test = self.code.new_label();
                let label_body = self.code.new_label();
                let label_exit = self.code.new_label();
                self.code.push(InterCode::Label(label_test.clone()));
                self.cond(cond, &label_body, &label_exit)?;
                self.code.push(InterCode::Label(label_body));
                self.stmt(body)?;
                self.code.push(InterCode::Goto(label_test));
                self.code.push(InterCode::Label(label_exit));
                Ok(())
            }
        }
    }

    /// Translates an expression into `place` (retagging it where a leaf
    /// suffices).
    fn exp(&mut self, exp: &Exp, place: &mut Operand) -> Result<(), TranslateError> {
        match exp {
            Exp::Int { value, .. } => {
                *place = Operand::Constant(*value);
                Ok(())
            }
            Exp::Float { .. } => Err(TranslateError::FloatUnsupported),
            Exp::Id { name, .. } => {
                let is_array = self
                    .table
                    .lookup(name)
                    .map(|sym| matches!(sym.ty(), SType::Array { .. }))
                    .unwrap_or(false);
                if is_array {
                    self.code.last_array = Some(name.clone());
                }
                if self.address_params.contains(name) {
                    *place = Operand::Address(name.clone());
                } else {
                    *place = Operand::Variable(name.clone());
                }
                Ok(())
            }
            Exp::Assign { left, right, .. } => {
                // arrays and structs copy word by word, not as one move
                if matches!(
                    self.exp_type(left),
                    Some(SType::Array { .. } | SType::Struct { .. })
                ) {
                    return self.copy_aggregate(left, right, place);
                }
                match &**left {
                    Exp::Id { name, .. } => {
                        let mut value = self.code.new_temp();
                        self.exp(right, &mut value)?;
                        self.code.push(InterCode::Assign {
                            left: Operand::Variable(name.clone()),
                            right: value,
                        });
                        *place = Operand::Variable(name.clone());
                        Ok(())
                    }
                    Exp::Index { .. } | Exp::Member { .. } => {
                        let mut value = self.code.new_temp();
                        self.exp(right, &mut value)?;
                        let addr = self.addr(left)?;
                        self.code.push(InterCode::WriteAddr {
                            left: addr,
                            right: value.clone(),
                        });
                        *place = value;
                        Ok(())
                    }
                    _ => Err(TranslateError::NotAddressable),
                }
            }
            Exp::Binary {
                op, left, right, ..
            } => match op {
                BinOp::And | BinOp::Or | BinOp::Relop(_) => self.cond_value(exp, place),
                _ => {
                    let mut left_op = self.code.new_temp();
                    self.exp(left, &mut left_op)?;
                    let mut right_op = self.code.new_temp();
                    self.exp(right, &mut right_op)?;
                    let code = match op {
                        BinOp::Plus => InterCode::Add {
                            result: place.clone(),
                            left: left_op,
                            right: right_op,
                        },
                        BinOp::Minus => InterCode::Sub {
                            result: place.clone(),
                            left: left_op,
                            right: right_op,
                        },
                        BinOp::Star => InterCode::Mul {
                            result: place.clone(),
                            left: left_op,
                            right: right_op,
                        },
                        BinOp::Div => InterCode::Div {
                            result: place.clone(),
                            left: left_op,
                            right: right_op,
                        },
                        _ => unreachable!("logical operators handled above"),
                    };
                    self.code.push(code);
                    Ok(())
                }
            },
            Exp::Unary {
                op: UnaryOp::Not, ..
            } => self.cond_value(exp, place),
            Exp::Unary {
                op: UnaryOp::Neg,
                operand,
                ..
            } => {
                let mut value = self.code.new_temp();
                self.exp(operand, &mut value)?;
                self.code.push(InterCode::Sub {
                    result: place.clone(),
                    left: Operand::Constant(0),
                    right: value,
                });
                Ok(())
            }
            Exp::Index { .. } | Exp::Member { .. } => {
                let addr = self.addr(exp)?;
                match self.exp_type(exp) {
                    Some(SType::Basic(_)) => {
                        self.code.push(InterCode::ReadAddr {
                            left: place.clone(),
                            right: addr,
                        });
                    }
                    // aggregates stay as addresses
                    _ => *place = addr,
                }
                Ok(())
            }
            Exp::Call { callee, args, .. } => {
                if callee == "read" {
                    self.code.push(InterCode::Read(place.clone()));
                    return Ok(());
                }
                if callee == "write" {
                    let arg = args.first().expect("write takes exactly one argument");
                    let mut value = self.code.new_temp();
                    self.exp(arg, &mut value)?;
                    self.code.push(InterCode::Write(value));
                    *place = Operand::Constant(0);
                    return Ok(());
                }
                let mut arg_ops = Vec::new();
                for arg in args {
                    match self.exp_type(arg) {
                        // structs pass by reference
                        Some(SType::Struct { .. }) => arg_ops.push(self.addr(arg)?),
                        Some(SType::Array { .. }) => return Err(TranslateError::ArrayParam),
                        _ => {
                            let mut value = self.code.new_temp();
                            self.exp(arg, &mut value)?;
                            arg_ops.push(value);
                        }
                    }
                }
                for arg_op in arg_ops.into_iter().rev() {
                    self.code.push(InterCode::Arg(arg_op));
                }
                self.code.push(InterCode::Call {
                    result: place.clone(),
                    function: Operand::Function(callee.clone()),
                });
                Ok(())
            }
        }
    }

    /// A boolean demanded in value position: `place := #0`, run the jump
    /// code, and flip to `#1` on the true path.
    fn cond_value(&mut self, exp: &Exp, place: &mut Operand) -> Result<(), TranslateError> {
        let label_true = self.code.new_label();
        let label_false = self.code.new_label();
        self.code.push(InterCode::Assign {
            left: place.clone(),
            right: Operand::Constant(0),
        });
        self.cond(exp, &label_true, &label_false)?;
        self.code.push(InterCode::Label(label_true));
        self.code.push(InterCode::Assign {
            left: place.clone(),
            right: Operand::Constant(1),
        });
        self.code.push(InterCode::Label(label_false));
        Ok(())
    }

    /// Assignment between two aggregates: an unrolled word-by-word copy
    /// through the operands' addresses. When the array lengths differ the
    /// shorter side bounds the copy.
    fn copy_aggregate(
        &mut self,
        left: &Exp,
        right: &Exp,
        place: &mut Operand,
    ) -> Result<(), TranslateError> {
        let dst_size = self.exp_type(left).map(|ty| size_of(&ty)).unwrap_or(0);
        let src_size = self
            .exp_type(right)
            .map(|ty| size_of(&ty))
            .unwrap_or(dst_size);
        let size = dst_size.min(src_size);

        let src = self.addr(right)?;
        let dst = self.addr(left)?;
        let word = self.code.new_temp();
        for offset in (0..size).step_by(4) {
            let (src_slot, dst_slot) = if offset == 0 {
                (src.clone(), dst.clone())
            } else {
                let src_slot = Operand::Address(self.code.new_temp_name());
                self.code.push(InterCode::Add {
                    result: src_slot.clone(),
                    left: src.clone(),
                    right: Operand::Constant(offset as i32),
                });
                let dst_slot = Operand::Address(self.code.new_temp_name());
                self.code.push(InterCode::Add {
                    result: dst_slot.clone(),
                    left: dst.clone(),
                    right: Operand::Constant(offset as i32),
                });
                (src_slot, dst_slot)
            };
            self.code.push(InterCode::ReadAddr {
                left: word.clone(),
                right: src_slot,
            });
            self.code.push(InterCode::WriteAddr {
                left: dst_slot,
                right: word.clone(),
            });
        }
        *place = dst;
        Ok(())
    }

    /// Translates a condition as jump code against a true/false label pair.
    fn cond(
        &mut self,
        exp: &Exp,
        label_true: &Operand,
        label_false: &Operand,
    ) -> Result<(), TranslateError> {
        match exp {
            Exp::Binary {
                op: BinOp::Relop(relop),
                left,
                right,
                ..
            } => {
                let mut left_op = self.code.new_temp();
                self.exp(left, &mut left_op)?;
                let mut right_op = self.code.new_temp();
                self.exp(right, &mut right_op)?;
                self.code.push(InterCode::IfGoto {
                    x: left_op,
                    relop: Operand::Relop(relop.as_str().to_string()),
                    y: right_op,
                    target: label_true.clone(),
                });
                self.code.push(InterCode::Goto(label_false.clone()));
                Ok(())
            }
            Exp::Binary {
                op: BinOp::And,
                left,
                right,
                ..
            } => {
                let label_next = self.code.new_label();
                self.cond(left, &label_next, label_false)?;
                self.code.push(InterCode::Label(label_next));
                self.cond(right, label_true, label_false)
            }
            Exp::Binary {
                op: BinOp::Or,
                left,
                right,
                ..
            } => {
                let label_next = self.code.new_label();
                self.cond(left, label_true, &label_next)?;
                self.code.push(InterCode::Label(label_next));
                self.cond(right, label_true, label_false)
            }
            Exp::Unary {
                op: UnaryOp::Not,
                operand,
                ..
            } => self.cond(operand, label_false, label_true),
            _ => {
                let mut value = self.code.new_temp();
                self.exp(exp, &mut value)?;
                self.code.push(InterCode::IfGoto {
                    x: value,
                    relop: Operand::Relop("!=".to_string()),
                    y: Operand::Constant(0),
                    target: label_true.clone(),
                });
                self.code.push(InterCode::Goto(label_false.clone()));
                Ok(())
            }
        }
    }

    /// Computes the address of an lvalue-shaped expression.
    fn addr(&mut self, exp: &Exp) -> Result<Operand, TranslateError> {
        match exp {
            Exp::Id { name, .. } => {
                let ty = self.table.lookup(name).map(|sym| sym.ty().clone());
                let Some(ty) = ty else {
                    return Err(TranslateError::NotAddressable);
                };
                if matches!(ty, SType::Array { .. }) {
                    self.code.last_array = Some(name.clone());
                }
                if self.address_params.contains(name) {
                    // the parameter already holds the address
                    Ok(Operand::Address(name.clone()))
                } else {
                    let addr = Operand::Address(self.code.new_temp_name());
                    self.code.push(InterCode::GetAddr {
                        left: addr.clone(),
                        right: Operand::Variable(name.clone()),
                    });
                    Ok(addr)
                }
            }
            Exp::Index { base, index, .. } => {
                let base_addr = self.addr(base)?;
                // the element width comes from the base's static type;
                // the remembered array name covers bases the type walk
                // cannot resolve
                let elem = match self.exp_type(base) {
                    Some(SType::Array { elem, .. }) => *elem,
                    _ => self.last_array_elem()?,
                };
                if matches!(elem, SType::Array { .. }) {
                    return Err(TranslateError::MultiDimArray);
                }
                let width = size_of(&elem);
                let mut index_op = self.code.new_temp();
                self.exp(index, &mut index_op)?;
                let offset = self.code.new_temp();
                self.code.push(InterCode::Mul {
                    result: offset.clone(),
                    left: index_op,
                    right: Operand::Constant(width as i32),
                });
                let addr = Operand::Address(self.code.new_temp_name());
                self.code.push(InterCode::Add {
                    result: addr.clone(),
                    left: base_addr,
                    right: offset,
                });
                Ok(addr)
            }
            Exp::Member { base, field, .. } => {
                let base_addr = self.addr(base)?;
                let fields = match self.exp_type(base) {
                    Some(SType::Struct { fields, .. }) => fields,
                    _ => return Err(TranslateError::NotAddressable),
                };
                let offset =
                    field_offset(&fields, field).ok_or(TranslateError::NotAddressable)?;
                if offset == 0 {
                    return Ok(base_addr);
                }
                let addr = Operand::Address(self.code.new_temp_name());
                self.code.push(InterCode::Add {
                    result: addr.clone(),
                    left: base_addr,
                    right: Operand::Constant(offset as i32),
                });
                Ok(addr)
            }
            _ => Err(TranslateError::NotAddressable),
        }
    }

    /// Element type of the array named by `last_array`.
    fn last_array_elem(&self) -> Result<SType, TranslateError> {
        let name = self
            .code
            .last_array
            .as_ref()
            .ok_or(TranslateError::NotAddressable)?;
        match self.table.lookup(name).map(|sym| sym.ty().clone()) {
            Some(SType::Array { elem, .. }) => Ok(*elem),
            _ => Err(TranslateError::NotAddressable),
        }
    }

    /// Static type of an analyzed expression, looked up in the live table.
    fn exp_type(&self, exp: &Exp) -> Option<SType> {
        match exp {
            Exp::Id { name, .. } => self.table.lookup(name).map(|sym| sym.ty().clone()),
            Exp::Int { .. } => Some(SType::Basic(BasicType::Int)),
            Exp::Float { .. } => Some(SType::Basic(BasicType::Float)),
            Exp::Assign { left, .. } => self.exp_type(left),
            Exp::Binary { op, left, .. } => match op {
                BinOp::And | BinOp::Or | BinOp::Relop(_) => Some(SType::Basic(BasicType::Int)),
                _ => self.exp_type(left),
            },
            Exp::Unary { op, operand, .. } => match op {
                UnaryOp::Not => Some(SType::Basic(BasicType::Int)),
                UnaryOp::Neg => self.exp_type(operand),
            },
            Exp::Index { base, .. } => match self.exp_type(base) {
                Some(SType::Array { elem, .. }) => Some(*elem),
                _ => None,
            },
            Exp::Member { base, field, .. } => match self.exp_type(base) {
                Some(SType::Struct { fields, .. }) => {
                    fields.find(field).map(|found| found.ty.clone())
                }
                _ => None,
            },
            Exp::Call { callee, .. } => match self.table.lookup(callee).map(|sym| sym.ty().clone())
            {
                Some(SType::Func { ret, .. }) => Some(*ret),
                _ => None,
            },
        }
    }
}

/// Byte size of a type: 4 for scalars, element size times length for
/// arrays, field-size sum for structs.
pub fn size_of(ty: &SType) -> u32 {
    match ty {
        SType::Basic(_) => 4,
        SType::Array { elem, length } => size_of(elem) * (*length as u32),
        SType::Struct { fields, .. } => fields.iter().map(|field| size_of(&field.ty)).sum(),
        SType::Func { .. } | SType::Error => 0,
    }
}

fn field_offset(fields: &FieldList, name: &str) -> Option<u32> {
    let mut offset = 0;
    for field in fields.iter() {
        if field.name == name {
            return Some(offset);
        }
        offset += size_of(&field.ty);
    }
    None
}
