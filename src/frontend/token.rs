//! Token definitions for Go source

use std::fmt;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    // ============ Identifiers and Literals ============
    /// Identifier (including predeclared names such as `int` or `error`)
    Ident(String),
    /// Integer literal, as written
    IntLit(String),
    /// Floating-point literal, as written
    FloatLit(String),
    /// Imaginary literal, as written
    ImagLit(String),
    /// Rune literal, including quotes
    RuneLit(String),
    /// Interpreted or raw string literal, including quotes
    StringLit(String),

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// &
    And,
    /// |
    Or,
    /// ^
    Caret,
    /// <<
    Shl,
    /// >>
    Shr,
    /// &^
    AndNot,
    /// +=, -=, <<=, &^= and the other compound assignments
    AssignOp(&'static str),
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// <-
    Arrow,
    /// ++
    Inc,
    /// --
    Dec,
    /// ==
    EqEq,
    /// <
    Lt,
    /// >
    Gt,
    /// =
    Eq,
    /// !
    Not,
    /// ~
    Tilde,
    /// !=
    Ne,
    /// <=
    Le,
    /// >=
    Ge,
    /// :=
    Define,
    /// ...
    Ellipsis,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// {
    LBrace,
    /// }
    RBrace,
    /// ,
    Comma,
    /// .
    Dot,
    /// ;
    Semicolon,
    /// Semicolon inserted at a line end
    AutoSemicolon,
    /// :
    Colon,

    // ============ Special ============
    /// End of file
    Eof,
    /// Unknown/invalid character
    Unknown(char),
    /// Literal cut off by a line break or the end of input
    Unterminated(&'static str),
}

impl TokenKind {
    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "break" => Some(TokenKind::Break),
            "case" => Some(TokenKind::Case),
            "chan" => Some(TokenKind::Chan),
            "const" => Some(TokenKind::Const),
            "continue" => Some(TokenKind::Continue),
            "default" => Some(TokenKind::Default),
            "defer" => Some(TokenKind::Defer),
            "else" => Some(TokenKind::Else),
            "fallthrough" => Some(TokenKind::Fallthrough),
            "for" => Some(TokenKind::For),
            "func" => Some(TokenKind::Func),
            "go" => Some(TokenKind::Go),
            "goto" => Some(TokenKind::Goto),
            "if" => Some(TokenKind::If),
            "import" => Some(TokenKind::Import),
            "interface" => Some(TokenKind::Interface),
            "map" => Some(TokenKind::Map),
            "package" => Some(TokenKind::Package),
            "range" => Some(TokenKind::Range),
            "return" => Some(TokenKind::Return),
            "select" => Some(TokenKind::Select),
            "struct" => Some(TokenKind::Struct),
            "switch" => Some(TokenKind::Switch),
            "type" => Some(TokenKind::Type),
            "var" => Some(TokenKind::Var),
            _ => None,
        }
    }

    /// Whether a newline directly after this token terminates the statement
    pub fn ends_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Ident(_)
                | TokenKind::IntLit(_)
                | TokenKind::FloatLit(_)
                | TokenKind::ImagLit(_)
                | TokenKind::RuneLit(_)
                | TokenKind::StringLit(_)
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Fallthrough
                | TokenKind::Return
                | TokenKind::Inc
                | TokenKind::Dec
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
        )
    }

    /// Either an explicit or an inserted semicolon
    pub fn is_semicolon(&self) -> bool {
        matches!(self, TokenKind::Semicolon | TokenKind::AutoSemicolon)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: &str = match self {
            TokenKind::Break => "break",
            TokenKind::Case => "case",
            TokenKind::Chan => "chan",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Default => "default",
            TokenKind::Defer => "defer",
            TokenKind::Else => "else",
            TokenKind::Fallthrough => "fallthrough",
            TokenKind::For => "for",
            TokenKind::Func => "func",
            TokenKind::Go => "go",
            TokenKind::Goto => "goto",
            TokenKind::If => "if",
            TokenKind::Import => "import",
            TokenKind::Interface => "interface",
            TokenKind::Map => "map",
            TokenKind::Package => "package",
            TokenKind::Range => "range",
            TokenKind::Return => "return",
            TokenKind::Select => "select",
            TokenKind::Struct => "struct",
            TokenKind::Switch => "switch",
            TokenKind::Type => "type",
            TokenKind::Var => "var",
            TokenKind::Ident(s)
            | TokenKind::IntLit(s)
            | TokenKind::FloatLit(s)
            | TokenKind::ImagLit(s)
            | TokenKind::RuneLit(s)
            | TokenKind::StringLit(s) => s.as_str(),
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::And => "&",
            TokenKind::Or => "|",
            TokenKind::Caret => "^",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::AndNot => "&^",
            TokenKind::AssignOp(op) => *op,
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Arrow => "<-",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::EqEq => "==",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "=",
            TokenKind::Not => "!",
            TokenKind::Tilde => "~",
            TokenKind::Ne => "!=",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Define => ":=",
            TokenKind::Ellipsis => "...",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Semicolon => ";",
            TokenKind::AutoSemicolon => "newline",
            TokenKind::Colon => ":",
            TokenKind::Eof => "EOF",
            TokenKind::Unknown(c) => return write!(f, "{}", c),
            TokenKind::Unterminated(what) => return write!(f, "unterminated {}", what),
        };
        f.write_str(text)
    }
}
