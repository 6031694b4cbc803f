//! Parser for Go source
//!
//! Recursive descent over the token stream. Declarations and type
//! expressions are parsed in full; function bodies and `const`/`var`
//! declarations are skipped by delimiter matching.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// A parameter list entry before grouping: `a int`, or a lone `int` / `a`
enum ParamEntry {
    Named(Ident, TypeExpr),
    Bare(TypeExpr),
}

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from a lexer
    pub fn new(mut lexer: Lexer) -> Self {
        Self {
            tokens: lexer.tokenize(),
            pos: 0,
        }
    }

    /// Create a parser from pre-tokenized input
    #[cfg(test)]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // The token stream always ends with Eof and `advance` never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            got: self.current_kind().to_string(),
            span: self.current().span,
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_semicolons(&mut self) {
        while self.current_kind().is_semicolon() {
            self.advance();
        }
    }

    /// A declaration or list element must end in a semicolon unless the
    /// enclosing list closes on the same line.
    fn expect_terminator(&mut self, close: &TokenKind) -> Result<()> {
        if self.current_kind().is_semicolon() {
            self.advance();
            Ok(())
        } else if self.check(close) || self.is_at_end() {
            Ok(())
        } else {
            Err(self.unexpected("';' or newline"))
        }
    }

    /// Skip a balanced `open ... close` run starting at `open`
    fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) -> Result<()> {
        let start = self.expect(open.clone())?.span;
        let mut depth = 1usize;
        while depth > 0 {
            if self.is_at_end() {
                return Err(Error::Unbalanced { open: format!("'{}'", open), span: start });
            }
            let token = self.advance();
            if token.kind == open {
                depth += 1;
            } else if token.kind == close {
                depth -= 1;
            }
        }
        Ok(())
    }

    // ==================== Parsing Methods ====================

    /// Literals are checked up front, since bodies are skipped unparsed
    fn check_literals(&self) -> Result<()> {
        for token in &self.tokens {
            if let TokenKind::Unterminated(what) = token.kind {
                return Err(Error::Unterminated {
                    what: what.to_string(),
                    span: token.span,
                });
            }
        }
        Ok(())
    }

    /// Parse a complete source file
    pub fn parse_file(&mut self) -> Result<SourceFile> {
        self.check_literals()?;
        self.skip_semicolons();
        self.expect(TokenKind::Package)?;
        let package = self.parse_ident()?;
        self.expect_terminator(&TokenKind::Eof)?;

        let mut imports = Vec::new();
        self.skip_semicolons();
        while self.check(&TokenKind::Import) {
            self.parse_import_decl(&mut imports)?;
            self.skip_semicolons();
        }

        let mut decls = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_at_end() {
                break;
            }
            match self.current_kind() {
                TokenKind::Type => decls.push(Decl::Type(self.parse_type_decl()?)),
                TokenKind::Func => decls.push(Decl::Func(self.parse_func_decl()?)),
                TokenKind::Const | TokenKind::Var => self.skip_value_decl()?,
                TokenKind::Unknown(c) => {
                    return Err(Error::InvalidChar(*c, self.current().span));
                }
                _ => return Err(self.unexpected("declaration (type, func, const, var)")),
            }
            self.expect_terminator(&TokenKind::Eof)?;
        }

        Ok(SourceFile { package, imports, decls })
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.current().clone();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident {
                    name: name.clone(),
                    span: token.span,
                })
            }
            other => Err(Error::ExpectedIdent {
                got: other.to_string(),
                span: token.span,
            }),
        }
    }

    /// `import "path"` or `import ( ... )`
    fn parse_import_decl(&mut self, imports: &mut Vec<Import>) -> Result<()> {
        self.expect(TokenKind::Import)?;
        if self.consume(&TokenKind::LParen) {
            loop {
                self.skip_semicolons();
                if self.consume(&TokenKind::RParen) {
                    break;
                }
                imports.push(self.parse_import_spec()?);
                self.expect_terminator(&TokenKind::RParen)?;
            }
        } else {
            imports.push(self.parse_import_spec()?);
        }
        self.expect_terminator(&TokenKind::Eof)
    }

    fn parse_import_spec(&mut self) -> Result<Import> {
        let start = self.current().span;
        let alias = match self.current_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Some(name)
            }
            TokenKind::Dot => {
                self.advance();
                Some(".".to_string())
            }
            _ => None,
        };
        let path = match self.current_kind().clone() {
            TokenKind::StringLit(text) => {
                self.advance();
                text.trim_matches(|c| c == '"' || c == '`').to_string()
            }
            _ => return Err(self.unexpected("import path")),
        };
        Ok(Import {
            alias,
            path,
            span: start.merge(&self.previous_span()),
        })
    }

    /// `const`/`var` declarations carry no type definitions; skip them.
    fn skip_value_decl(&mut self) -> Result<()> {
        self.advance();
        if self.check(&TokenKind::LParen) {
            return self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
        }
        let start = self.current().span;
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof if depth > 0 => {
                    return Err(Error::Unbalanced { open: "declaration".to_string(), span: start });
                }
                TokenKind::Eof => return Ok(()),
                kind if kind.is_semicolon() && depth == 0 => return Ok(()),
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// `type X ...` or `type ( ... )`
    fn parse_type_decl(&mut self) -> Result<Vec<TypeSpec>> {
        self.expect(TokenKind::Type)?;
        let mut specs = Vec::new();
        if self.consume(&TokenKind::LParen) {
            loop {
                self.skip_semicolons();
                if self.consume(&TokenKind::RParen) {
                    break;
                }
                specs.push(self.parse_type_spec()?);
                self.expect_terminator(&TokenKind::RParen)?;
            }
        } else {
            specs.push(self.parse_type_spec()?);
        }
        Ok(specs)
    }

    fn parse_type_spec(&mut self) -> Result<TypeSpec> {
        let name = self.parse_ident()?;
        let type_params = if self.check(&TokenKind::LBracket) && self.at_type_params() {
            self.advance();
            self.parse_param_list(TokenKind::RBracket, true)?
        } else {
            Vec::new()
        };
        // `type A = B` and `type A B` resolve alike
        self.consume(&TokenKind::Eq);
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            span: name.span.merge(&self.previous_span()),
            name,
            type_params,
            ty,
        })
    }

    /// Distinguish `type T[P any] ...` from the array type `type T [N]int`.
    /// `[P *C]` is read as an array length, as the Go grammar does.
    fn at_type_params(&self) -> bool {
        matches!(self.peek_kind(1), TokenKind::Ident(_))
            && matches!(
                self.peek_kind(2),
                TokenKind::Ident(_)
                    | TokenKind::Comma
                    | TokenKind::Tilde
                    | TokenKind::Interface
                    | TokenKind::Func
                    | TokenKind::Map
                    | TokenKind::Chan
                    | TokenKind::Arrow
                    | TokenKind::LBracket
                    | TokenKind::LParen
            )
    }

    /// Parse a function or method declaration
    fn parse_func_decl(&mut self) -> Result<FuncDecl> {
        let start = self.expect(TokenKind::Func)?.span;

        let recv = if self.check(&TokenKind::LParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let name = self.parse_ident()?;

        let type_params = if self.consume(&TokenKind::LBracket) {
            self.parse_param_list(TokenKind::RBracket, true)?
        } else {
            Vec::new()
        };

        let mut signature = self.parse_signature()?;
        signature.type_params = type_params;

        if self.check(&TokenKind::LBrace) {
            self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace)?;
        }

        Ok(FuncDecl {
            recv,
            name,
            signature,
            span: start.merge(&self.previous_span()),
        })
    }

    fn parse_receiver(&mut self) -> Result<ParamGroup> {
        let open = self.expect(TokenKind::LParen)?.span;
        let mut groups = self.parse_param_list(TokenKind::RParen, false)?;
        if groups.len() != 1 {
            return Err(Error::UnexpectedToken {
                expected: "exactly one receiver".to_string(),
                got: format!("{} receivers", groups.len()),
                span: open,
            });
        }
        Ok(groups.remove(0))
    }

    /// Parameters and results, starting at `(`
    fn parse_signature(&mut self) -> Result<Signature> {
        self.expect(TokenKind::LParen)?;
        let params = self.parse_param_list(TokenKind::RParen, false)?;
        let results = self.parse_results()?;
        Ok(Signature {
            type_params: Vec::new(),
            params,
            results,
        })
    }

    fn parse_results(&mut self) -> Result<Vec<ParamGroup>> {
        if self.consume(&TokenKind::LParen) {
            return self.parse_param_list(TokenKind::RParen, false);
        }
        if self.at_type_start() {
            let ty = self.parse_type()?;
            return Ok(vec![ParamGroup { names: Vec::new(), ty }]);
        }
        Ok(Vec::new())
    }

    fn at_type_start(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Ident(_)
                | TokenKind::Star
                | TokenKind::LBracket
                | TokenKind::LParen
                | TokenKind::Func
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Arrow
                | TokenKind::Struct
                | TokenKind::Interface
        )
    }

    /// Parse a parameter list after its opening delimiter, consuming `close`.
    ///
    /// Follows the Go rule that either every entry is named or none is:
    /// in `(a, b int)` the bare `a` takes the type of the next named entry.
    fn parse_param_list(&mut self, close: TokenKind, constraints: bool) -> Result<Vec<ParamGroup>> {
        let mut entries = Vec::new();
        loop {
            if self.consume(&close) {
                break;
            }
            entries.push(self.parse_param_entry(&close, constraints)?);
            if !self.consume(&TokenKind::Comma) {
                self.expect(close.clone())?;
                break;
            }
        }

        let named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));
        if !named {
            return Ok(entries
                .into_iter()
                .map(|entry| match entry {
                    ParamEntry::Bare(ty) | ParamEntry::Named(_, ty) => ParamGroup { names: Vec::new(), ty },
                })
                .collect());
        }

        let mut groups = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        for entry in entries {
            match entry {
                ParamEntry::Named(name, ty) => {
                    pending.push(name);
                    groups.push(ParamGroup { names: std::mem::take(&mut pending), ty });
                }
                ParamEntry::Bare(TypeExpr::Name(name)) => pending.push(name),
                ParamEntry::Bare(_) => {
                    return Err(Error::UnexpectedToken {
                        expected: "parameter name".to_string(),
                        got: "type".to_string(),
                        span: self.previous_span(),
                    });
                }
            }
        }
        if let Some(last) = pending.last() {
            return Err(Error::ExpectedType {
                got: close.to_string(),
                span: last.span,
            });
        }
        Ok(groups)
    }

    fn parse_param_entry(&mut self, close: &TokenKind, constraints: bool) -> Result<ParamEntry> {
        if !matches!(self.current_kind(), TokenKind::Ident(_)) {
            return Ok(ParamEntry::Bare(self.parse_param_type(constraints)?));
        }

        // A leading identifier is either a type (`int`, `pkg.T`, `List[T]`)
        // or a name followed by a type.
        let save = self.pos;
        if let Ok(ty) = self.parse_param_type(constraints) {
            if self.check(&TokenKind::Comma) || self.check(close) {
                return Ok(ParamEntry::Bare(ty));
            }
        }
        self.pos = save;

        let name = self.parse_ident()?;
        let ty = self.parse_param_type(constraints)?;
        Ok(ParamEntry::Named(name, ty))
    }

    fn parse_param_type(&mut self, constraints: bool) -> Result<TypeExpr> {
        if self.consume(&TokenKind::Ellipsis) {
            Ok(TypeExpr::Ellipsis(Box::new(self.parse_type()?)))
        } else if constraints {
            self.parse_constraint()
        } else {
            self.parse_type()
        }
    }

    /// `~int | string`, or any plain type
    fn parse_constraint(&mut self) -> Result<TypeExpr> {
        let mut terms = vec![self.parse_constraint_term()?];
        while self.consume(&TokenKind::Or) {
            terms.push(self.parse_constraint_term()?);
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(TypeExpr::Union(terms))
        }
    }

    fn parse_constraint_term(&mut self) -> Result<TypeExpr> {
        if self.consume(&TokenKind::Tilde) {
            Ok(TypeExpr::Tilde(Box::new(self.parse_type()?)))
        } else {
            self.parse_type()
        }
    }

    // ==================== Types ====================

    fn parse_type(&mut self) -> Result<TypeExpr> {
        match self.current_kind() {
            TokenKind::Ident(_) => self.parse_type_name(),
            TokenKind::Star => {
                self.advance();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::LBracket => {
                self.advance();
                if self.consume(&TokenKind::RBracket) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len = self.collect_array_len()?;
                let elem = Box::new(self.parse_type()?);
                Ok(TypeExpr::Array { len, elem })
            }
            TokenKind::Map => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let key = Box::new(self.parse_type()?);
                self.expect(TokenKind::RBracket)?;
                let value = Box::new(self.parse_type()?);
                Ok(TypeExpr::Map { key, value })
            }
            TokenKind::Chan => {
                self.advance();
                let dir = if self.consume(&TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan { dir, elem: Box::new(self.parse_type()?) })
            }
            TokenKind::Arrow => {
                self.advance();
                self.expect(TokenKind::Chan)?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Func => {
                self.advance();
                Ok(TypeExpr::Func(Box::new(self.parse_signature()?)))
            }
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            other => Err(Error::ExpectedType {
                got: other.to_string(),
                span: self.current().span,
            }),
        }
    }

    /// `T`, `pkg.T`, and either followed by type arguments
    fn parse_type_name(&mut self) -> Result<TypeExpr> {
        let first = self.parse_ident()?;
        let base = if self.check(&TokenKind::Dot) && matches!(self.peek_kind(1), TokenKind::Ident(_)) {
            self.advance();
            let name = self.parse_ident()?;
            TypeExpr::Qualified { package: first, name }
        } else {
            TypeExpr::Name(first)
        };

        if !self.consume(&TokenKind::LBracket) {
            return Ok(base);
        }
        let mut args = Vec::new();
        loop {
            if self.consume(&TokenKind::RBracket) {
                break;
            }
            args.push(self.parse_type()?);
            if !self.consume(&TokenKind::Comma) {
                self.expect(TokenKind::RBracket)?;
                break;
            }
        }
        if args.is_empty() {
            return Err(self.unexpected("type argument"));
        }
        Ok(TypeExpr::Generic { base: Box::new(base), args })
    }

    /// Array length tokens up to the matching `]`, kept as text
    fn collect_array_len(&mut self) -> Result<String> {
        let start = self.previous_span();
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::Eof => {
                    return Err(Error::Unbalanced { open: "'['".to_string(), span: start });
                }
                TokenKind::RBracket if depth == 0 => {
                    self.advance();
                    return Ok(text);
                }
                TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBracket | TokenKind::RParen => depth = depth.saturating_sub(1),
                _ => {}
            }
            text.push_str(&self.advance().kind.to_string());
        }
    }

    fn parse_struct_type(&mut self) -> Result<TypeExpr> {
        self.expect(TokenKind::Struct)?;
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            self.skip_semicolons();
            if self.consume(&TokenKind::RBrace) {
                break;
            }
            fields.push(self.parse_field_decl()?);
            self.expect_terminator(&TokenKind::RBrace)?;
        }
        Ok(TypeExpr::Struct(fields))
    }

    fn parse_field_decl(&mut self) -> Result<FieldDecl> {
        let (names, ty) = if self.consume(&TokenKind::Star) {
            (Vec::new(), TypeExpr::Pointer(Box::new(self.parse_type_name()?)))
        } else {
            // Embedded `T`, `pkg.T`, `List[T]` versus `Name Type`
            let save = self.pos;
            match self.parse_type_name() {
                Ok(ty) if self.at_field_end() => (Vec::new(), ty),
                _ => {
                    self.pos = save;
                    let mut names = vec![self.parse_ident()?];
                    while self.consume(&TokenKind::Comma) {
                        names.push(self.parse_ident()?);
                    }
                    (names, self.parse_type()?)
                }
            }
        };

        let tag = match self.current_kind() {
            TokenKind::StringLit(text) => {
                let text = text.clone();
                self.advance();
                Some(text)
            }
            _ => None,
        };

        Ok(FieldDecl { names, ty, tag })
    }

    fn at_field_end(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Semicolon | TokenKind::AutoSemicolon | TokenKind::RBrace | TokenKind::StringLit(_)
        )
    }

    fn parse_interface_type(&mut self) -> Result<TypeExpr> {
        self.expect(TokenKind::Interface)?;
        self.expect(TokenKind::LBrace)?;
        let mut elems = Vec::new();
        loop {
            self.skip_semicolons();
            if self.consume(&TokenKind::RBrace) {
                break;
            }
            let is_method = matches!(self.current_kind(), TokenKind::Ident(_))
                && matches!(self.peek_kind(1), TokenKind::LParen);
            if is_method {
                let name = self.parse_ident()?;
                let signature = self.parse_signature()?;
                elems.push(InterfaceElem::Method { name, signature });
            } else {
                elems.push(InterfaceElem::Embed(self.parse_constraint()?));
            }
            self.expect_terminator(&TokenKind::RBrace)?;
        }
        Ok(TypeExpr::Interface(elems))
    }
}
