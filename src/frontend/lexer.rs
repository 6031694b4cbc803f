//! Lexer for Go source
//!
//! Converts source code into a stream of tokens, inserting semicolons at
//! line ends the way the Go grammar requires.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::Span;

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// File ID for span tracking
    file_id: usize,
    /// Whether a line break after the previous token ends a statement
    insert_semi: bool,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str, file_id: usize) -> Self {
        // A leading byte-order mark is skipped but keeps its offset
        let pos = usize::from(source.starts_with('\u{feff}'));
        Self {
            source: source.chars().collect(),
            pos,
            start: pos,
            file_id,
            insert_semi: false,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character; a no-op at the end of input
    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    /// Consume `expected` if it is the current character
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.file_id)
    }

    /// Create a token with the current span
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    /// Skip whitespace and comments.
    ///
    /// Returns true when a line break was reached while a semicolon is
    /// pending; the break itself is left unconsumed.
    fn skip_whitespace(&mut self) -> bool {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    if self.insert_semi {
                        return true;
                    }
                    self.advance();
                }
                // Line comment
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                // Block comment, which acts as a newline if it spans lines
                '/' if self.peek_next() == Some('*') => {
                    self.advance();
                    self.advance();
                    let mut spans_lines = false;
                    while !self.is_at_end() {
                        if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        if self.advance() == Some('\n') {
                            spans_lines = true;
                        }
                    }
                    if spans_lines && self.insert_semi {
                        return true;
                    }
                }
                _ => break,
            }
        }
        false
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();
        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident(text));
        self.make_token(kind)
    }

    /// Read a number literal. The text is kept as written; only its
    /// category matters to the parser.
    fn read_number(&mut self) -> Token {
        let hex = self.peek() == Some('0') && matches!(self.peek_next(), Some('x') | Some('X'));
        let mut is_float = false;

        while let Some(c) = self.peek() {
            if c == '.' {
                is_float = true;
                self.advance();
            } else if (!hex && matches!(c, 'e' | 'E')) || (hex && matches!(c, 'p' | 'P')) {
                is_float = true;
                self.advance();
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
            } else if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();
        let kind = if text.ends_with('i') {
            TokenKind::ImagLit(text)
        } else if is_float {
            TokenKind::FloatLit(text)
        } else {
            TokenKind::IntLit(text)
        };
        self.make_token(kind)
    }

    /// Read an interpreted string or rune literal up to the closing `quote`.
    ///
    /// A line break or the end of input before the closing quote yields an
    /// `Unterminated` token.
    fn read_quoted(
        &mut self,
        quote: char,
        literal: fn(String) -> TokenKind,
        what: &'static str,
    ) -> Token {
        self.advance(); // opening quote
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.advance();
                    let text = self.lexeme();
                    return self.make_token(literal(text));
                }
                Some('\\') => {
                    self.advance();
                    if matches!(self.peek(), None | Some('\n')) {
                        break;
                    }
                    self.advance();
                }
                None | Some('\n') => break,
                Some(_) => {
                    self.advance();
                }
            }
        }
        self.make_token(TokenKind::Unterminated(what))
    }

    /// Read a raw string literal, which may span lines
    fn read_raw_string(&mut self) -> Token {
        self.advance(); // opening backquote
        while let Some(c) = self.advance() {
            if c == '`' {
                let text = self.lexeme();
                return self.make_token(TokenKind::StringLit(text));
            }
        }
        self.make_token(TokenKind::Unterminated("raw string literal"))
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        let line_break = self.skip_whitespace();
        self.start = self.pos;

        if self.insert_semi && (line_break || self.is_at_end()) {
            self.insert_semi = false;
            return self.make_token(TokenKind::AutoSemicolon);
        }

        if self.is_at_end() {
            return Token::eof(self.make_span());
        }

        let token = self.scan_token();
        self.insert_semi = token.kind.ends_statement();
        token
    }

    fn scan_token(&mut self) -> Token {
        let c = match self.peek() {
            Some(c) => c,
            None => return Token::eof(self.make_span()),
        };

        // Identifiers and keywords
        if c.is_alphabetic() || c == '_' {
            return self.read_identifier();
        }

        // Numbers, including `.5`
        if c.is_ascii_digit() || (c == '.' && self.peek_next().map_or(false, |n| n.is_ascii_digit())) {
            return self.read_number();
        }

        match c {
            '"' => return self.read_quoted('"', TokenKind::StringLit, "string literal"),
            '\'' => return self.read_quoted('\'', TokenKind::RuneLit, "rune literal"),
            '`' => return self.read_raw_string(),
            _ => {}
        }

        self.advance();

        // Operators and punctuation
        let kind = match c {
            '+' => {
                if self.eat('+') {
                    TokenKind::Inc
                } else if self.eat('=') {
                    TokenKind::AssignOp("+=")
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::Dec
                } else if self.eat('=') {
                    TokenKind::AssignOp("-=")
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    TokenKind::AssignOp("*=")
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    TokenKind::AssignOp("/=")
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::AssignOp("%=")
                } else {
                    TokenKind::Percent
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else if self.eat('^') {
                    if self.eat('=') {
                        TokenKind::AssignOp("&^=")
                    } else {
                        TokenKind::AndNot
                    }
                } else if self.eat('=') {
                    TokenKind::AssignOp("&=")
                } else {
                    TokenKind::And
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else if self.eat('=') {
                    TokenKind::AssignOp("|=")
                } else {
                    TokenKind::Or
                }
            }
            '^' => {
                if self.eat('=') {
                    TokenKind::AssignOp("^=")
                } else {
                    TokenKind::Caret
                }
            }
            '<' => {
                if self.eat('-') {
                    TokenKind::Arrow
                } else if self.eat('<') {
                    if self.eat('=') {
                        TokenKind::AssignOp("<<=")
                    } else {
                        TokenKind::Shl
                    }
                } else if self.eat('=') {
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('>') {
                    if self.eat('=') {
                        TokenKind::AssignOp(">>=")
                    } else {
                        TokenKind::Shr
                    }
                } else if self.eat('=') {
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::Ne
                } else {
                    TokenKind::Not
                }
            }
            ':' => {
                if self.eat('=') {
                    TokenKind::Define
                } else {
                    TokenKind::Colon
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '~' => TokenKind::Tilde,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            _ => TokenKind::Unknown(c),
        };

        self.make_token(kind)
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
