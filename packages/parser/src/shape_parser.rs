//! Prop-shape parsing from interface and type-alias bodies
//!
//! Turns declared member types into [`PropShape`] metadata. Members
//! whose types fall outside the supported set are skipped with a
//! warning rather than failing the whole shape; unions are the one
//! hard error, since a union of anything but string literals cannot
//! be represented.

use crate::error::{ParseError, ParseResult};
use crate::literal::unescape;
use crate::source_file::SourceFile;
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;
use tracery_model::{PropMetadata, PropShape, PropType, PropValueType};

/// Parse the declared shape of `type_name` within `file`.
///
/// Returns `Ok(None)` when no interface or object type alias of that
/// name exists.
pub fn parse_prop_shape(file: &SourceFile, type_name: &str) -> ParseResult<Option<PropShape>> {
    let Some(body_span) = file.declared_type_body(type_name) else {
        return Ok(None);
    };
    parse_shape_body(file.slice(&body_span)).map(Some)
}

/// Parse `{ ... }` member text into a [`PropShape`].
pub fn parse_shape_body(text: &str) -> ParseResult<PropShape> {
    let tokens = tokenize(text);
    let mut cursor = ShapeCursor {
        tokens: &tokens,
        pos: 0,
    };
    cursor.parse_object_shape()
}

struct ShapeCursor<'a, 'src> {
    tokens: &'a [(Token<'src>, Range<usize>)],
    pos: usize,
}

impl<'a, 'src> ShapeCursor<'a, 'src> {
    fn parse_object_shape(&mut self) -> ParseResult<PropShape> {
        self.expect(Token::LBrace)?;
        let mut shape = PropShape::new();
        while !self.check(Token::RBrace) && !self.is_at_end() {
            let doc = self.take_doc_comment();
            let name = self.parse_member_name()?;
            let optional = self.match_token(Token::Question);
            self.expect(Token::Colon)?;

            let prop_type = self.parse_type(&name)?;
            self.skip_member_rest();

            match prop_type {
                Some(prop_type) => {
                    let mut metadata = if optional {
                        PropMetadata::optional(prop_type)
                    } else {
                        PropMetadata::required(prop_type)
                    };
                    if let Some(doc) = doc {
                        metadata = metadata.with_doc(doc);
                    }
                    shape.insert(name, metadata);
                }
                None => {
                    tracing::warn!(
                        prop = %name,
                        "Prop type is not one of the supported types. Skipping gracefully."
                    );
                }
            }
        }
        self.expect(Token::RBrace)?;
        Ok(shape)
    }

    fn parse_type(&mut self, prop_name: &str) -> ParseResult<Option<PropType>> {
        if self.at_literal() {
            return self.parse_literal_union(prop_name);
        }

        let mut prop_type = self.parse_nonliteral_type(prop_name)?;
        while self.check(Token::LBracket) {
            self.advance();
            self.expect(Token::RBracket)?;
            prop_type = prop_type.map(|t| PropType::Array(Box::new(t)));
        }
        if self.check(Token::Pipe) {
            // Unions of non-literal types are not representable
            return Ok(None);
        }
        Ok(prop_type)
    }

    /// `"a" | "b" | ...`; every member must be a string literal.
    fn parse_literal_union(&mut self, prop_name: &str) -> ParseResult<Option<PropType>> {
        // A lone non-string literal type is skipped; inside a union it
        // is an error, matching the message callers rely on.
        if !self.at_string_literal() {
            if self.peek_ahead_is(1, Token::Pipe) {
                let kind = self.peek_literal_kind();
                return Err(ParseError::UnsupportedUnionMember {
                    kind,
                    prop_name: prop_name.to_string(),
                });
            }
            self.advance();
            return Ok(None);
        }

        let mut values = Vec::new();
        loop {
            match self.peek() {
                Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                    values.push(unescape(s));
                    self.advance();
                }
                _ => {
                    return Err(ParseError::UnsupportedUnionMember {
                        kind: self.peek_literal_kind(),
                        prop_name: prop_name.to_string(),
                    })
                }
            }
            if !self.match_token(Token::Pipe) {
                break;
            }
        }
        Ok(Some(PropType::StringUnion(values)))
    }

    fn parse_nonliteral_type(&mut self, prop_name: &str) -> ParseResult<Option<PropType>> {
        match self.peek() {
            Some((Token::LBrace, _)) => {
                let shape = self.parse_object_shape()?;
                Ok(Some(PropType::Object(shape)))
            }
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                self.advance();
                match name.as_str() {
                    "Record" => {
                        self.skip_generic_args();
                        Ok(Some(PropType::Record))
                    }
                    "Array" => {
                        self.expect(Token::Lt)?;
                        let inner = self.parse_type(prop_name)?;
                        self.expect(Token::Gt)?;
                        Ok(inner.map(|t| PropType::Array(Box::new(t))))
                    }
                    "React" if self.check(Token::Dot) => {
                        self.advance();
                        let member = self.parse_member_name()?;
                        if member == "ReactNode" {
                            Ok(Some(PropType::Simple(PropValueType::ReactNode)))
                        } else {
                            Ok(None)
                        }
                    }
                    "ReactNode" => Ok(Some(PropType::Simple(PropValueType::ReactNode))),
                    _ => match PropValueType::from_type_name(&name) {
                        Some(value_type) => Ok(Some(PropType::Simple(value_type))),
                        None => {
                            // Consume any dotted chain and generic args
                            while self.match_token(Token::Dot) {
                                self.advance();
                            }
                            if self.check(Token::Lt) {
                                self.skip_generic_args();
                            }
                            Ok(None)
                        }
                    },
                }
            }
            _ => {
                self.advance();
                Ok(None)
            }
        }
    }

    /// From a `<`, consume through the matching `>`
    fn skip_generic_args(&mut self) {
        if !self.check(Token::Lt) {
            return;
        }
        let mut depth = 0i32;
        while let Some((token, _)) = self.peek() {
            match token {
                Token::Lt => depth += 1,
                Token::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Consume through the member terminator: `;`, `,`, or the closing
    /// brace of the enclosing shape.
    fn skip_member_rest(&mut self) {
        let mut depth = 0i32;
        while let Some((token, _)) = self.peek() {
            if depth == 0 {
                match token {
                    Token::Semi | Token::Comma => {
                        self.advance();
                        return;
                    }
                    Token::RBrace => return,
                    _ => {}
                }
            }
            if token.is_open_delim() {
                depth += 1;
            } else if token.is_close_delim() {
                depth -= 1;
            }
            self.advance();
        }
    }

    fn take_doc_comment(&mut self) -> Option<String> {
        match self.peek() {
            Some((Token::DocComment(raw), _)) => {
                let doc = clean_doc(raw);
                self.advance();
                Some(doc)
            }
            _ => None,
        }
    }

    fn parse_member_name(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let name = s.to_string();
                self.advance();
                Ok(name)
            }
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                let name = unescape(s);
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_start(),
                "member name",
                self.peek_debug(),
            )),
        }
    }

    fn at_literal(&self) -> bool {
        matches!(
            self.peek(),
            Some((Token::String(_), _))
                | Some((Token::SingleQuoteString(_), _))
                | Some((Token::Number(_), _))
                | Some((Token::True, _))
                | Some((Token::False, _))
        )
    }

    fn at_string_literal(&self) -> bool {
        matches!(
            self.peek(),
            Some((Token::String(_), _)) | Some((Token::SingleQuoteString(_), _))
        )
    }

    fn peek_literal_kind(&self) -> String {
        match self.peek() {
            Some((Token::Number(_), _)) => "NumericLiteral".to_string(),
            Some((Token::True, _)) => "TrueKeyword".to_string(),
            Some((Token::False, _)) => "FalseKeyword".to_string(),
            Some((Token::Null, _)) => "NullKeyword".to_string(),
            Some((Token::Undefined, _)) => "UndefinedKeyword".to_string(),
            Some((Token::Ident(_), _)) => "Identifier".to_string(),
            Some((token, _)) => format!("{:?}", token),
            None => "end of file".to_string(),
        }
    }

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_ahead_is(&self, offset: usize, token: Token) -> bool {
        match self.tokens.get(self.pos + offset) {
            Some((t, _)) => std::mem::discriminant(t) == std::mem::discriminant(&token),
            None => false,
        }
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        match self.peek() {
            Some((t, _)) => std::mem::discriminant(t) == std::mem::discriminant(&token),
            None => false,
        }
    }

    fn match_token(&mut self, token: Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token) -> ParseResult<()> {
        if self.match_token(token.clone()) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(
                self.peek_start(),
                format!("{:?}", token),
                self.peek_debug(),
            ))
        }
    }

    fn peek_start(&self) -> usize {
        self.peek().map(|(_, span)| span.start).unwrap_or_default()
    }

    fn peek_debug(&self) -> String {
        match self.peek() {
            Some((token, _)) => format!("{:?}", token),
            None => "end of file".to_string(),
        }
    }
}

/// Strip comment markers and per-line asterisks from a doc comment
fn clean_doc(raw: &str) -> String {
    let inner = raw
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    if !inner.contains('\n') {
        return inner.trim().to_string();
    }
    let mut lines: Vec<&str> = inner
        .lines()
        .map(|line| {
            line.trim_start()
                .trim_start_matches('*')
                .trim_start_matches(' ')
        })
        .collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
