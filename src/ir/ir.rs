//! Three-address intermediate representation.
//!
//! Instructions are stored in an append-only list and render one per line
//! through `Display` in the canonical text format: constants as `#n`,
//! labels as `label<n>`, `LABEL l :` / `FUNCTION f :` with the trailing
//! colon.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Variable(String),
    Constant(i32),
    /// A variable holding an address; dereferenced by READ_ADDR/WRITE_ADDR.
    Address(String),
    Label(u32),
    Function(String),
    Relop(String),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Variable(name) | Operand::Address(name) | Operand::Function(name) => {
                write!(f, "{}", name)
            }
            Operand::Constant(value) => write!(f, "#{}", value),
            Operand::Label(id) => write!(f, "label{}", id),
            Operand::Relop(text) => write!(f, "{}", text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterCode {
    Label(Operand),
    Function(String),
    Assign {
        left: Operand,
        right: Operand,
    },
    Add {
        result: Operand,
        left: Operand,
        right: Operand,
    },
    Sub {
        result: Operand,
        left: Operand,
        right: Operand,
    },
    Mul {
        result: Operand,
        left: Operand,
        right: Operand,
    },
    Div {
        result: Operand,
        left: Operand,
        right: Operand,
    },
    /// `left := &right`
    GetAddr {
        left: Operand,
        right: Operand,
    },
    /// `left := *right`
    ReadAddr {
        left: Operand,
        right: Operand,
    },
    /// `*left := right`
    WriteAddr {
        left: Operand,
        right: Operand,
    },
    Goto(Operand),
    IfGoto {
        x: Operand,
        relop: Operand,
        y: Operand,
        target: Operand,
    },
    Return(Operand),
    /// Stack space for an aggregate local, in bytes.
    Dec {
        var: Operand,
        size: u32,
    },
    Arg(Operand),
    Call {
        result: Operand,
        function: Operand,
    },
    Param(Operand),
    Read(Operand),
    Write(Operand),
}

impl fmt::Display for InterCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterCode::Label(label) => write!(f, "LABEL {} :", label),
            InterCode::Function(name) => write!(f, "FUNCTION {} :", name),
            InterCode::Assign { left, right } => write!(f, "{} := {}", left, right),
            InterCode::Add {
                result,
                left,
                right,
            } => write!(f, "{} := {} + {}", result, left, right),
            InterCode::Sub {
                result,
                left,
                right,
            } => write!(f, "{} := {} - {}", result, left, right),
            InterCode::Mul {
                result,
                left,
                right,
            } => write!(f, "{} := {} * {}", result, left, right),
            InterCode::Div {
                result,
                left,
                right,
            } => write!(f, "{} := {} / {}", result, left, right),
            InterCode::GetAddr { left, right } => write!(f, "{} := &{}", left, right),
            InterCode::ReadAddr { left, right } => write!(f, "{} := *{}", left, right),
            InterCode::WriteAddr { left, right } => write!(f, "*{} := {}", left, right),
            InterCode::Goto(target) => write!(f, "GOTO {}", target),
            InterCode::IfGoto {
                x,
                relop,
                y,
                target,
            } => write!(f, "IF {} {} {} GOTO {}", x, relop, y, target),
            InterCode::Return(value) => write!(f, "RETURN {}", value),
            InterCode::Dec { var, size } => write!(f, "DEC {} {}", var, size),
            InterCode::Arg(value) => write!(f, "ARG {}", value),
            InterCode::Call { result, function } => write!(f, "{} := CALL {}", result, function),
            InterCode::Param(value) => write!(f, "PARAM {}", value),
            InterCode::Read(value) => write!(f, "READ {}", value),
            InterCode::Write(value) => write!(f, "WRITE {}", value),
        }
    }
}

/// Append-only instruction list with fresh-name counters.
#[derive(Debug, Default, PartialEq)]
pub struct IrList {
    codes: Vec<InterCode>,
    temp_count: u32,
    label_count: u32,
    /// Name of the most recently translated array variable; resolves the
    /// element width of the array currently being indexed.
    pub last_array: Option<String>,
}

impl IrList {
    pub fn new() -> IrList {
        IrList::default()
    }

    pub fn push(&mut self, code: InterCode) {
        self.codes.push(code);
    }

    pub fn new_temp_name(&mut self) -> String {
        self.temp_count += 1;
        format!("t{}", self.temp_count)
    }

    pub fn new_temp(&mut self) -> Operand {
        Operand::Variable(self.new_temp_name())
    }

    pub fn new_label(&mut self) -> Operand {
        self.label_count += 1;
        Operand::Label(self.label_count)
    }

    pub fn codes(&self) -> &[InterCode] {
        &self.codes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl fmt::Display for IrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in &self.codes {
            writeln!(f, "{}", code)?;
        }
        Ok(())
    }
}
