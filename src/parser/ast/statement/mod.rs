mod declaration;
mod expression;
mod print;

pub use self::declaration::*;
pub use self::expression::*;
pub use self::print::*;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Statement {
    Declaration(Declaration),
    Expression(ExpressionStatement),
    Print(PrintStatement),
}
