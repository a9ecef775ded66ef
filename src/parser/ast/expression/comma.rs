use super::Expression;

/// A comma sequence. All members are evaluated in order; the value of the
/// whole expression is the value of the last member. The parser only builds
/// this node for two or more members.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommaExpression {
    pub expressions: Vec<Expression>,
}
