//! Concrete parse tree for C--.
//!
//! One enum or struct per grammar production; the grammar is closed, so the
//! tree is a closed set of variants rather than trait objects. Every node
//! carries the 1-based source line it started on.

/// Program -> ExtDef*
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub ext_defs: Vec<ExtDef>,
}

/// ExtDef -> Specifier ExtDecList? SEMI | Specifier FunDec CompSt
#[derive(Debug, Clone, PartialEq)]
pub enum ExtDef {
    /// Global variables, or a bare specifier such as `struct S { ... };`
    /// (empty `dec_list`).
    Declaration {
        specifier: Specifier,
        dec_list: Vec<VarDec>,
        line: u32,
    },
    Function {
        specifier: Specifier,
        fun_dec: FunDec,
        body: CompSt,
        line: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Int,
    Float,
}

/// Specifier -> TYPE | StructSpecifier
#[derive(Debug, Clone, PartialEq)]
pub enum Specifier {
    Basic { ty: TypeSpec, line: u32 },
    Struct(StructSpecifier),
}

/// StructSpecifier -> STRUCT Tag? LC DefList RC | STRUCT Tag
#[derive(Debug, Clone, PartialEq)]
pub enum StructSpecifier {
    Definition {
        tag: Option<String>,
        defs: Vec<Def>,
        line: u32,
    },
    Reference {
        tag: String,
        line: u32,
    },
}

/// VarDec -> ID (LB INT RB)*
///
/// Dimensions are listed source order, outermost first: `a[3][2]` has
/// `dims == [3, 2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDec {
    pub name: String,
    pub dims: Vec<i32>,
    pub line: u32,
}

/// FunDec -> ID LP VarList? RP
#[derive(Debug, Clone, PartialEq)]
pub struct FunDec {
    pub name: String,
    pub params: Vec<ParamDec>,
    pub line: u32,
}

/// ParamDec -> Specifier VarDec
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDec {
    pub specifier: Specifier,
    pub var_dec: VarDec,
    pub line: u32,
}

/// CompSt -> LC DefList StmtList RC
#[derive(Debug, Clone, PartialEq)]
pub struct CompSt {
    pub defs: Vec<Def>,
    pub stmts: Vec<Stmt>,
    pub line: u32,
}

/// Def -> Specifier DecList SEMI
#[derive(Debug, Clone, PartialEq)]
pub struct Def {
    pub specifier: Specifier,
    pub decs: Vec<Dec>,
    pub line: u32,
}

/// Dec -> VarDec (ASSIGNOP Exp)?
#[derive(Debug, Clone, PartialEq)]
pub struct Dec {
    pub var_dec: VarDec,
    pub init: Option<Exp>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Exp(Exp),
    Comp(CompSt),
    Return {
        exp: Exp,
        line: u32,
    },
    If {
        cond: Exp,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
        line: u32,
    },
    While {
        cond: Exp,
        body: Box<Stmt>,
        line: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl RelOp {
    pub fn from_text(text: &str) -> Option<RelOp> {
        match text {
            "<" => Some(RelOp::Lt),
            "<=" => Some(RelOp::Le),
            ">" => Some(RelOp::Gt),
            ">=" => Some(RelOp::Ge),
            "==" => Some(RelOp::Eq),
            "!=" => Some(RelOp::Ne),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    And,
    Or,
    Relop(RelOp),
    Plus,
    Minus,
    Star,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Exp {
    Assign {
        left: Box<Exp>,
        right: Box<Exp>,
        line: u32,
    },
    Binary {
        op: BinOp,
        left: Box<Exp>,
        right: Box<Exp>,
        line: u32,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Exp>,
        line: u32,
    },
    Index {
        base: Box<Exp>,
        index: Box<Exp>,
        line: u32,
    },
    Member {
        base: Box<Exp>,
        field: String,
        line: u32,
    },
    Call {
        callee: String,
        args: Vec<Exp>,
        line: u32,
    },
    Id {
        name: String,
        line: u32,
    },
    Int {
        value: i32,
        line: u32,
    },
    Float {
        value: f32,
        line: u32,
    },
}

impl Exp {
    pub fn line(&self) -> u32 {
        match self {
            Exp::Assign { line, .. }
            | Exp::Binary { line, .. }
            | Exp::Unary { line, .. }
            | Exp::Index { line, .. }
            | Exp::Member { line, .. }
            | Exp::Call { line, .. }
            | Exp::Id { line, .. }
            | Exp::Int { line, .. }
            | Exp::Float { line, .. } => *line,
        }
    }
}
