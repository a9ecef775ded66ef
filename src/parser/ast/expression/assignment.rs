use crate::parser::ast::AssignmentOperator;

use super::Expression;

/// A plain or compound assignment. The target must evaluate to an lvalue at
/// run time; the parser does not reject non-lvalue targets.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AssignmentExpression {
    pub op: AssignmentOperator,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
}

impl AssignmentExpression {
    pub fn new(op: AssignmentOperator, target: Expression, value: Expression) -> Self {
        AssignmentExpression {
            op,
            target: Box::new(target),
            value: Box::new(value),
        }
    }
}
