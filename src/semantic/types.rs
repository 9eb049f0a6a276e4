//! Structural type representation for the analyzer and the IR generator.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Int,
    Float,
}

/// A semantic type.
///
/// `Error` stands in for the type of anything a diagnostic has already been
/// reported for; it compares equal to every type so one fault is reported
/// exactly once. Equality is deliberately partial: `Func` compares equal to
/// nothing, not even itself, so `SType` is `PartialEq` but not `Eq`.
#[derive(Debug, Clone)]
pub enum SType {
    Error,
    Basic(BasicType),
    Array { elem: Box<SType>, length: i32 },
    Struct { tag: String, fields: FieldList },
    Func { params: FieldList, ret: Box<SType> },
}

impl SType {
    pub fn array(elem: SType, length: i32) -> SType {
        assert!(length >= 0, "array length must be non-negative");
        assert!(
            !matches!(elem, SType::Func { .. }),
            "functions are not first-class values"
        );
        SType::Array {
            elem: Box::new(elem),
            length,
        }
    }

    pub fn structure(tag: String, fields: FieldList) -> SType {
        SType::Struct { tag, fields }
    }

    pub fn func(params: FieldList, ret: SType) -> SType {
        SType::Func {
            params,
            ret: Box::new(ret),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SType::Error)
    }
}

impl PartialEq for SType {
    fn eq(&self, other: &SType) -> bool {
        match (self, other) {
            // one reported fault must not cascade
            (SType::Error, _) | (_, SType::Error) => true,
            // functions are never equal, not even to themselves
            (SType::Func { .. }, _) | (_, SType::Func { .. }) => false,
            (SType::Basic(a), SType::Basic(b)) => a == b,
            // lengths are ignored; only element types matter
            (SType::Array { elem: a, .. }, SType::Array { elem: b, .. }) => a == b,
            // structs compare by tag alone
            (SType::Struct { tag: a, .. }, SType::Struct { tag: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for SType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SType::Error => write!(f, "<error>"),
            SType::Basic(BasicType::Int) => write!(f, "int"),
            SType::Basic(BasicType::Float) => write!(f, "float"),
            SType::Array { elem, length } => write!(f, "{}[{}]", elem, length),
            SType::Struct { tag, .. } => write!(f, "struct {}", tag),
            SType::Func { params, ret } => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", param.ty)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}

/// A named slot: a struct member or a function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: SType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: SType) -> Field {
        Field {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered field list, used for struct members and parameter lists alike.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList {
    fields: Vec<Field>,
}

impl FieldList {
    pub fn new() -> FieldList {
        FieldList::default()
    }

    pub fn push(&mut self, field: Field) {
        assert!(
            !matches!(field.ty, SType::Func { .. }),
            "functions are not first-class values"
        );
        self.fields.push(field);
    }

    pub fn find(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
