use super::super::Expression;

/// An expression evaluated for its side effects; the value is discarded.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expression,
}
