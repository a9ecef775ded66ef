use crate::value::Type;

use super::Expression;

/// An explicit `(type)` conversion.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CastExpression {
    pub target: Type,
    pub inner: Box<Expression>,
}

impl CastExpression {
    pub fn new(target: Type, inner: Expression) -> CastExpression {
        CastExpression {
            target,
            inner: Box::new(inner),
        }
    }
}
