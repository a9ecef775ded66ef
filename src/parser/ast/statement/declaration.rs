use crate::value::{PrimitiveType, Type};

use super::super::Expression;

/// Maximum number of fields a single declaration statement may introduce.
pub const MAX_DECLARATION_FIELDS: usize = 16;

/// A declaration statement: one primitive type shared by up to
/// [`MAX_DECLARATION_FIELDS`] comma-separated fields, each with its own
/// indirection level and optional initializer.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Declaration {
    pub primitive: PrimitiveType,
    pub fields: Vec<DeclarationField>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeclarationField {
    pub name: String,
    pub indirection: u32,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FieldKind {
    Scalar {
        initializer: Option<Expression>,
    },
    /// An array field. `size` 0 means the length is inferred from the
    /// initializer list.
    Array {
        size: usize,
        initializers: Vec<Expression>,
    },
}

impl DeclarationField {
    /// The type of a single element of this field (for arrays) or of the
    /// variable itself (for scalars), given the statement's primitive.
    pub fn field_type(&self, primitive: PrimitiveType) -> Type {
        Type {
            primitive,
            indirection: self.indirection,
        }
    }
}
