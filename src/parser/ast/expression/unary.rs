use crate::parser::ast::UnaryOperator;

use super::Expression;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnaryExpression {
    pub op: UnaryOperator,
    pub inner: Box<Expression>,
}

impl UnaryExpression {
    pub fn new(op: UnaryOperator, inner: Expression) -> UnaryExpression {
        UnaryExpression {
            op,
            inner: Box::new(inner),
        }
    }
}
