mod expression;
mod operator;
mod statement;

pub use self::expression::*;
pub use self::operator::*;
pub use self::statement::*;
