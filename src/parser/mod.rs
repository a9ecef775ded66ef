//! Statement and expression parsing.
//!
//! A statement is parsed from the token stream of a single `;`-terminated
//! chunk of input. Expressions go through a Shunting-Yard translation with
//! two operator stacks (prefix markers and binary/assignment operators) and
//! one operand stack; both operator stacks are fully drained before an
//! expression is returned.

pub mod ast;
mod parse_state;

pub use parse_state::ParseState;

use std::{error::Error, fmt::Display};

use crate::{
    lexer::{LexError, Token},
    value::{PrimitiveType, Type, Value},
};

use self::ast::{
    AssignmentExpression, AssignmentOperator, BinaryExpression, BinaryOperator, CastExpression,
    CommaExpression, Declaration, DeclarationField, Expression, ExpressionStatement, FieldKind,
    OperatorPriority, PrintStatement, Statement, UnaryExpression, UnaryOperator, Variable,
    MAX_DECLARATION_FIELDS,
};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
        }
    }

    pub fn eof(item: &str) -> ParseError {
        ParseError {
            message: format!("hit end of statement while parsing {item}"),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        ParseError::new(error.to_string())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// An operator waiting on the binary/assignment stack.
#[derive(Debug, Clone, Copy)]
enum PendingOperator {
    Binary(BinaryOperator),
    Assignment(AssignmentOperator),
}

impl PendingOperator {
    fn priority(&self) -> OperatorPriority {
        match self {
            PendingOperator::Binary(op) => op.priority(),
            PendingOperator::Assignment(op) => op.priority(),
        }
    }
}

/// An operator waiting on the prefix stack.
#[derive(Debug, Clone, Copy)]
enum PrefixMarker {
    Unary(UnaryOperator),
    Cast(Type),
}

fn is_type_beginning(token: &Token) -> bool {
    matches!(
        token,
        Token::Void
            | Token::Char
            | Token::Short
            | Token::Int
            | Token::Long
            | Token::Float
            | Token::Double
            | Token::Signed
            | Token::Unsigned
    )
}

fn prefix_operator(token: &Token) -> Option<UnaryOperator> {
    Some(match token {
        Token::PlusPlus => UnaryOperator::Increment,
        Token::MinusMinus => UnaryOperator::Decrement,
        Token::Plus => UnaryOperator::Plus,
        Token::Minus => UnaryOperator::Minus,
        Token::ExclamationMark => UnaryOperator::LogicalNot,
        Token::Tilde => UnaryOperator::BitwiseNot,
        Token::Star => UnaryOperator::Dereference,
        Token::Ampersand => UnaryOperator::AddressOf,
        _ => return None,
    })
}

fn postfix_operator(token: &Token) -> Option<UnaryOperator> {
    Some(match token {
        Token::PlusPlus => UnaryOperator::PostfixIncrement,
        Token::MinusMinus => UnaryOperator::PostfixDecrement,
        _ => return None,
    })
}

fn binary_or_assignment_operator(token: &Token) -> Option<PendingOperator> {
    use PendingOperator::{Assignment, Binary};

    Some(match token {
        Token::Star => Binary(BinaryOperator::Multiply),
        Token::Slash => Binary(BinaryOperator::Divide),
        Token::Percent => Binary(BinaryOperator::Modulo),
        Token::Plus => Binary(BinaryOperator::Add),
        Token::Minus => Binary(BinaryOperator::Subtract),
        Token::ShiftLeft => Binary(BinaryOperator::ShiftLeft),
        Token::ShiftRight => Binary(BinaryOperator::ShiftRight),
        Token::LessThan => Binary(BinaryOperator::LessThan),
        Token::GreaterThan => Binary(BinaryOperator::GreaterThan),
        Token::LessOrEqual => Binary(BinaryOperator::LessOrEqual),
        Token::GreaterOrEqual => Binary(BinaryOperator::GreaterOrEqual),
        Token::Equal => Binary(BinaryOperator::Equal),
        Token::NotEqual => Binary(BinaryOperator::NotEqual),
        Token::Ampersand => Binary(BinaryOperator::BitwiseAnd),
        Token::Caret => Binary(BinaryOperator::BitwiseXor),
        Token::Pipe => Binary(BinaryOperator::BitwiseOr),
        Token::AmpersandAmpersand => Binary(BinaryOperator::LogicalAnd),
        Token::PipePipe => Binary(BinaryOperator::LogicalOr),
        Token::Assign => Assignment(AssignmentOperator::Assign),
        Token::PlusAssign => Assignment(AssignmentOperator::AddAssign),
        Token::MinusAssign => Assignment(AssignmentOperator::SubtractAssign),
        Token::StarAssign => Assignment(AssignmentOperator::MultiplyAssign),
        Token::SlashAssign => Assignment(AssignmentOperator::DivideAssign),
        Token::PercentAssign => Assignment(AssignmentOperator::ModuloAssign),
        Token::ShiftLeftAssign => Assignment(AssignmentOperator::ShiftLeftAssign),
        Token::ShiftRightAssign => Assignment(AssignmentOperator::ShiftRightAssign),
        Token::AmpersandAssign => Assignment(AssignmentOperator::BitwiseAndAssign),
        Token::PipeAssign => Assignment(AssignmentOperator::BitwiseOrAssign),
        Token::CaretAssign => Assignment(AssignmentOperator::BitwiseXorAssign),
        _ => return None,
    })
}

/// Parse one complete statement; the token stream must be fully consumed.
pub fn parse_statement(tokens: &mut ParseState<Token>) -> ParseResult<Statement> {
    let statement = if tokens.peek().is_some_and(is_type_beginning) {
        parse_declaration(tokens)?
    } else if tokens.eat(&Token::Print) {
        Statement::Print(PrintStatement {
            expression: parse_expression(tokens)?,
        })
    } else {
        Statement::Expression(ExpressionStatement {
            expression: parse_expression(tokens)?,
        })
    };

    if let Some(trailing) = tokens.peek() {
        return Err(ParseError::new(format!(
            "unexpected `{trailing}` after statement"
        )));
    }

    Ok(statement)
}

fn parse_declaration(tokens: &mut ParseState<Token>) -> ParseResult<Statement> {
    let primitive = parse_declaration_type(tokens)?;
    let mut fields = vec![];

    loop {
        if fields.len() == MAX_DECLARATION_FIELDS {
            return Err(ParseError::new(format!(
                "more than {MAX_DECLARATION_FIELDS} variables in one declaration"
            )));
        }

        let mut indirection = 0;
        while tokens.eat(&Token::Star) {
            indirection += 1;
        }

        let name = match tokens.next() {
            Some(Token::Id(name)) => name,
            Some(other) => {
                return Err(ParseError::new(format!(
                    "expected identifier, got `{other}`"
                )))
            }
            None => return Err(ParseError::eof("a variable name")),
        };

        let kind = if tokens.eat(&Token::LBracket) {
            let size = parse_array_size(tokens)?;
            let initializers = if tokens.eat(&Token::Assign) {
                parse_array_initializers(tokens)?
            } else {
                vec![]
            };
            FieldKind::Array { size, initializers }
        } else if tokens.eat(&Token::Assign) {
            FieldKind::Scalar {
                initializer: Some(parse_expression_without_comma(tokens)?),
            }
        } else {
            FieldKind::Scalar { initializer: None }
        };

        fields.push(DeclarationField {
            name,
            indirection,
            kind,
        });

        if tokens.eat(&Token::Comma) {
            continue;
        }
        if let Some(trailing) = tokens.peek() {
            return Err(ParseError::new(format!(
                "expected `,` or end of statement, got `{trailing}`"
            )));
        }
        break;
    }

    Ok(Statement::Declaration(Declaration { primitive, fields }))
}

fn parse_array_size(tokens: &mut ParseState<Token>) -> ParseResult<usize> {
    if tokens.eat(&Token::RBracket) {
        return Ok(0);
    }

    match tokens.next() {
        Some(Token::Integer(size)) => {
            if size < 0 {
                return Err(ParseError::new("array size cannot be negative"));
            }
            if !tokens.eat(&Token::RBracket) {
                return Err(ParseError::new("expected `]` after array size"));
            }
            Ok(size as usize)
        }
        Some(other) => Err(ParseError::new(format!(
            "cannot parse `[]` after variable name: got `{other}`"
        ))),
        None => Err(ParseError::eof("an array size")),
    }
}

fn parse_array_initializers(tokens: &mut ParseState<Token>) -> ParseResult<Vec<Expression>> {
    if !tokens.eat(&Token::LBrace) {
        return Err(ParseError::new("expected `{` to begin an array initializer"));
    }

    let mut initializers = vec![];

    loop {
        if tokens.peek() == Some(&Token::RBrace) {
            break;
        }
        initializers.push(parse_expression_without_comma(tokens)?);
        if !tokens.eat(&Token::Comma) {
            break;
        }
    }

    if !tokens.eat(&Token::RBrace) {
        return Err(ParseError::new("expected `}` to close an array initializer"));
    }

    Ok(initializers)
}

/// Consume a run of type specifier tokens and resolve them to a primitive
/// type. The specifiers may appear in any order; contradictory combinations
/// are rejected.
fn parse_declaration_type(tokens: &mut ParseState<Token>) -> ParseResult<PrimitiveType> {
    fn contradiction() -> ParseError {
        ParseError::new("contradictory combination of type specifiers")
    }

    let mut is_void = false;
    let mut is_char = false;
    let mut is_short = false;
    let mut is_float = false;
    let mut is_double = false;
    let mut is_int = false;
    let mut is_unsigned = false;
    let mut is_signed = false;
    let mut long_count = 0u32;

    loop {
        let base_taken = is_void || is_char || is_short || is_float || is_double;
        match tokens.peek() {
            Some(Token::Void) => {
                if base_taken {
                    return Err(contradiction());
                }
                is_void = true;
            }
            Some(Token::Char) => {
                if base_taken {
                    return Err(contradiction());
                }
                is_char = true;
            }
            Some(Token::Short) => {
                if base_taken {
                    return Err(contradiction());
                }
                is_short = true;
            }
            Some(Token::Int) => {
                if is_char || is_float || is_double || is_int {
                    return Err(contradiction());
                }
                is_int = true;
            }
            Some(Token::Float) => {
                if base_taken || is_int {
                    return Err(contradiction());
                }
                is_float = true;
            }
            Some(Token::Double) => {
                if base_taken || is_int {
                    return Err(contradiction());
                }
                is_double = true;
            }
            Some(Token::Unsigned) => {
                if is_unsigned || is_signed {
                    return Err(contradiction());
                }
                is_unsigned = true;
            }
            Some(Token::Signed) => {
                if is_signed || is_unsigned {
                    return Err(contradiction());
                }
                is_signed = true;
            }
            Some(Token::Long) => long_count += 1,
            _ => break,
        }
        tokens.next();
    }

    if is_void {
        if long_count != 0 || is_unsigned || is_signed || is_int {
            return Err(contradiction());
        }
        return Ok(PrimitiveType::Void);
    }
    if is_char {
        if long_count != 0 {
            return Err(contradiction());
        }
        return Ok(if is_unsigned {
            PrimitiveType::UChar
        } else {
            PrimitiveType::Char
        });
    }
    if is_short {
        if long_count != 0 {
            return Err(contradiction());
        }
        return Ok(if is_unsigned {
            PrimitiveType::UShort
        } else {
            PrimitiveType::Short
        });
    }
    if is_float {
        if is_unsigned || is_signed {
            return Err(contradiction());
        }
        return Ok(if long_count == 0 {
            PrimitiveType::Float
        } else {
            PrimitiveType::Double
        });
    }
    if is_double {
        if is_unsigned || is_signed {
            return Err(contradiction());
        }
        return Ok(PrimitiveType::Double);
    }

    Ok(match long_count {
        0 => {
            if is_unsigned {
                PrimitiveType::UInt
            } else {
                PrimitiveType::Int
            }
        }
        1 => {
            if is_unsigned {
                PrimitiveType::ULong
            } else {
                PrimitiveType::Long
            }
        }
        _ => {
            if is_unsigned {
                PrimitiveType::ULongLong
            } else {
                PrimitiveType::LongLong
            }
        }
    })
}

/// A primitive type followed by any number of pointer stars, as it appears
/// in a cast.
fn parse_type(tokens: &mut ParseState<Token>) -> ParseResult<Type> {
    let primitive = parse_declaration_type(tokens)?;

    let mut indirection = 0;
    while tokens.eat(&Token::Star) {
        indirection += 1;
    }

    Ok(Type {
        primitive,
        indirection,
    })
}

/// Parse a full expression, including the comma operator at the top level.
pub fn parse_expression(tokens: &mut ParseState<Token>) -> ParseResult<Expression> {
    let first = parse_expression_without_comma(tokens)?;

    if tokens.peek() != Some(&Token::Comma) {
        return Ok(first);
    }

    let mut expressions = vec![first];
    while tokens.eat(&Token::Comma) {
        expressions.push(parse_expression_without_comma(tokens)?);
    }

    Ok(Expression::Comma(CommaExpression { expressions }))
}

/// The Shunting-Yard core: operands and binary/assignment operators are
/// collected onto two stacks, reducing according to priority and
/// associativity. A smaller priority number binds tighter, so a *left*
/// associative incoming operator reduces while its priority is greater or
/// equal to the one on top of the stack.
fn parse_expression_without_comma(tokens: &mut ParseState<Token>) -> ParseResult<Expression> {
    let mut operands: Vec<Expression> = vec![];
    let mut operators: Vec<PendingOperator> = vec![];

    loop {
        if matches!(
            tokens.peek(),
            None | Some(Token::RParen) | Some(Token::Comma)
        ) {
            break;
        }

        operands.push(parse_unary_expression(tokens)?);

        if matches!(
            tokens.peek(),
            None | Some(Token::RParen)
                | Some(Token::Comma)
                | Some(Token::RBracket)
                | Some(Token::RBrace)
        ) {
            break;
        }

        let incoming = match tokens.peek() {
            Some(token) => binary_or_assignment_operator(token)
                .ok_or_else(|| ParseError::new(format!("bad binary operator `{token}`")))?,
            None => break,
        };
        tokens.next();

        while let Some(top) = operators.last() {
            let incoming_priority = incoming.priority();
            let top_priority = top.priority();
            let reduces = (incoming_priority.left_assoc
                && incoming_priority.priority >= top_priority.priority)
                || (!incoming_priority.left_assoc
                    && incoming_priority.priority > top_priority.priority);
            if !reduces {
                break;
            }
            let top = operators.pop().expect("operator stack was just probed");
            reduce(&mut operands, top)?;
        }
        operators.push(incoming);
    }

    while let Some(operator) = operators.pop() {
        reduce(&mut operands, operator)?;
    }

    let Some(result) = operands.pop() else {
        return Err(ParseError::new("expected an expression"));
    };
    if !operands.is_empty() {
        return Err(ParseError::new("malformed expression"));
    }

    Ok(result)
}

fn reduce(operands: &mut Vec<Expression>, operator: PendingOperator) -> ParseResult<()> {
    let right = operands
        .pop()
        .ok_or_else(|| ParseError::new("no expression to reduce"))?;
    let left = operands
        .pop()
        .ok_or_else(|| ParseError::new("no expression to reduce"))?;

    operands.push(match operator {
        PendingOperator::Binary(op) => Expression::Binary(BinaryExpression::new(op, left, right)),
        PendingOperator::Assignment(op) => {
            Expression::Assignment(AssignmentExpression::new(op, left, right))
        }
    });

    Ok(())
}

/// Parse one operand: prefix operators and casts, a simple or parenthesized
/// expression, an optional subscript, and postfix operators. The postfix
/// markers wrap the operand before the prefix markers do.
fn parse_unary_expression(tokens: &mut ParseState<Token>) -> ParseResult<Expression> {
    let mut prefixes: Vec<PrefixMarker> = vec![];
    let mut operand = None;

    loop {
        if tokens.eat(&Token::LParen) {
            if tokens.peek().is_some_and(is_type_beginning) {
                let target = parse_type(tokens)?;
                if !tokens.eat(&Token::RParen) {
                    return Err(ParseError::new("expected `)` after cast type"));
                }
                prefixes.push(PrefixMarker::Cast(target));
            } else {
                let inner = parse_expression(tokens)?;
                if !tokens.eat(&Token::RParen) {
                    return Err(ParseError::new("expected `)`"));
                }
                operand = Some(inner);
                break;
            }
            continue;
        }

        match tokens.peek().and_then(prefix_operator) {
            Some(op) => {
                prefixes.push(PrefixMarker::Unary(op));
                tokens.next();
            }
            None => break,
        }
    }

    let mut expression = match operand {
        Some(expression) => expression,
        None => parse_simple_expression(tokens)?,
    };

    if tokens.eat(&Token::LBracket) {
        let index = parse_expression(tokens)?;
        if !tokens.eat(&Token::RBracket) {
            return Err(ParseError::new("expected `]` after subscript"));
        }
        expression = Expression::Binary(BinaryExpression::new(
            BinaryOperator::Subscript,
            expression,
            index,
        ));
    }

    let mut postfixes = vec![];
    while let Some(op) = tokens.peek().and_then(postfix_operator) {
        postfixes.push(op);
        tokens.next();
    }

    for op in postfixes.into_iter().rev() {
        expression = Expression::Unary(UnaryExpression::new(op, expression));
    }
    while let Some(marker) = prefixes.pop() {
        expression = match marker {
            PrefixMarker::Unary(op) => Expression::Unary(UnaryExpression::new(op, expression)),
            PrefixMarker::Cast(target) => Expression::Cast(CastExpression::new(target, expression)),
        };
    }

    Ok(expression)
}

/// An identifier or a numeric literal. Integer literals carry the widest
/// signed integer type, floating point literals are doubles.
fn parse_simple_expression(tokens: &mut ParseState<Token>) -> ParseResult<Expression> {
    let expression = match tokens.peek() {
        Some(Token::Id(name)) => Expression::Variable(Variable::new(name.clone())),
        Some(Token::Integer(value)) => Expression::Value(Value::long_long(*value)),
        Some(Token::FloatingPoint(value)) => Expression::Value(Value::double(*value)),
        Some(other) => {
            return Err(ParseError::new(format!(
                "expected an expression, got `{other}`"
            )))
        }
        None => return Err(ParseError::eof("an expression")),
    };
    tokens.next();

    Ok(expression)
}
