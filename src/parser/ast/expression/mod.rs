mod assignment;
mod binary;
mod cast;
mod comma;
mod unary;
mod variable;

pub use self::assignment::*;
pub use self::binary::*;
pub use self::cast::*;
pub use self::comma::*;
pub use self::unary::*;
pub use self::variable::*;

use crate::value::Value;

/// A parsed expression tree. Every node exclusively owns its children.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expression {
    Value(Value),
    Variable(Variable),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Assignment(AssignmentExpression),
    Cast(CastExpression),
    Comma(CommaExpression),
}
