use std::collections::HashMap;
use std::fmt::Display;

use once_cell::sync::Lazy;

macro_rules! keyword {
    ($map:ident, $name:ident, $value:expr) => {
        $map.insert($value, Token::$name);
    };
}

/// Reserved words of the language. Every other word is an identifier.
pub(super) static KEYWORDS: Lazy<HashMap<&'static str, Token>> = Lazy::new(|| {
    let mut m = HashMap::new();

    keyword!(m, Void, "void");
    keyword!(m, Char, "char");
    keyword!(m, Short, "short");
    keyword!(m, Int, "int");
    keyword!(m, Long, "long");
    keyword!(m, Float, "float");
    keyword!(m, Double, "double");
    keyword!(m, Signed, "signed");
    keyword!(m, Unsigned, "unsigned");
    keyword!(m, Print, "print");

    m
});

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Id(String),
    Integer(i64),
    FloatingPoint(f64),

    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Print,

    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    AmpersandAssign,
    PipeAssign,
    CaretAssign,

    Comma,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    AmpersandAmpersand,
    PipePipe,
    Ampersand,
    Pipe,
    Caret,
    ShiftLeft,
    ShiftRight,
    PlusPlus,
    MinusMinus,
    ExclamationMark,
    Tilde,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Id(value) => write!(f, "{value}"),
            Token::Integer(value) => write!(f, "{value}"),
            Token::FloatingPoint(value) => write!(f, "{value}"),
            Token::Void => write!(f, "void"),
            Token::Char => write!(f, "char"),
            Token::Short => write!(f, "short"),
            Token::Int => write!(f, "int"),
            Token::Long => write!(f, "long"),
            Token::Float => write!(f, "float"),
            Token::Double => write!(f, "double"),
            Token::Signed => write!(f, "signed"),
            Token::Unsigned => write!(f, "unsigned"),
            Token::Print => write!(f, "print"),
            Token::Assign => write!(f, "="),
            Token::PlusAssign => write!(f, "+="),
            Token::MinusAssign => write!(f, "-="),
            Token::StarAssign => write!(f, "*="),
            Token::SlashAssign => write!(f, "/="),
            Token::PercentAssign => write!(f, "%="),
            Token::ShiftLeftAssign => write!(f, "<<="),
            Token::ShiftRightAssign => write!(f, ">>="),
            Token::AmpersandAssign => write!(f, "&="),
            Token::PipeAssign => write!(f, "|="),
            Token::CaretAssign => write!(f, "^="),
            Token::Comma => write!(f, ","),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Equal => write!(f, "=="),
            Token::NotEqual => write!(f, "!="),
            Token::GreaterThan => write!(f, ">"),
            Token::LessThan => write!(f, "<"),
            Token::GreaterOrEqual => write!(f, ">="),
            Token::LessOrEqual => write!(f, "<="),
            Token::AmpersandAmpersand => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::Ampersand => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::ShiftLeft => write!(f, "<<"),
            Token::ShiftRight => write!(f, ">>"),
            Token::PlusPlus => write!(f, "++"),
            Token::MinusMinus => write!(f, "--"),
            Token::ExclamationMark => write!(f, "!"),
            Token::Tilde => write!(f, "~"),
        }
    }
}
