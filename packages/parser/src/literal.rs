//! Restricted literal evaluation
//!
//! Initializers are never executed. An object literal made of string,
//! number, boolean, null, array, and object parts evaluates to a
//! [`serde_json::Value`]; anything with behavior (calls, identifiers,
//! arithmetic) is rejected. Prop initializers get a looser treatment
//! where non-literal values are captured verbatim as expressions.

use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{tokenize, Token};
use serde_json::Value;
use std::ops::Range;
use tracery_model::{LiteralProp, PropType, PropVal, PropValueType, PropValues, PropShape};

/// Evaluate `{ ... }` text as a pure literal value.
pub fn evaluate_object_literal(text: &str) -> ParseResult<Value> {
    let tokens = tokenize(text);
    let mut cursor = Cursor::new(&tokens, text);
    let value = cursor.parse_literal_value()?;
    if !value.is_object() {
        return Err(ParseError::non_literal(text.trim()));
    }
    Ok(value)
}

/// Parse `{ ... }` prop-initializer text into [`PropValues`].
///
/// Literal members become literal props; members the literal grammar
/// cannot evaluate are captured as expression props with their source
/// text verbatim. `shape` supplies declared types, which decide hex
/// color literals and expression prop types.
pub fn parse_prop_values(text: &str, shape: Option<&PropShape>) -> ParseResult<PropValues> {
    let tokens = tokenize(text);
    let mut cursor = Cursor::new(&tokens, text);
    cursor.parse_prop_object(shape)
}

/// Parse the text of a braced JSX attribute value into a [`PropVal`].
///
/// Falls back to an opaque expression whenever the text is not wholly
/// a supported literal.
pub(crate) fn parse_prop_val_text(text: &str, declared: Option<&PropType>) -> PropVal {
    let fallback = || {
        let value_type = declared
            .map(PropType::value_type)
            .unwrap_or(PropValueType::String);
        PropVal::expression(value_type, text.trim())
    };
    let tokens = tokenize(text);
    let mut cursor = Cursor::new(&tokens, text);
    match cursor.parse_prop_val(declared) {
        Ok(value) if cursor.peek().is_none() => value,
        _ => fallback(),
    }
}

struct Cursor<'a, 'src> {
    tokens: &'a [(Token<'src>, Range<usize>)],
    pos: usize,
    text: &'src str,
}

impl<'a, 'src> Cursor<'a, 'src> {
    fn new(tokens: &'a [(Token<'src>, Range<usize>)], text: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            text,
        }
    }

    fn parse_literal_value(&mut self) -> ParseResult<Value> {
        match self.peek() {
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                let value = Value::String(unescape(s));
                self.advance();
                Ok(value)
            }
            Some((Token::TemplateString(s), _)) => {
                // Kept verbatim, backticks included, so stream field
                // extraction sees the interpolations.
                let value = Value::String(s.to_string());
                self.advance();
                Ok(value)
            }
            Some((Token::Number(s), _)) => {
                let value = parse_number(s)?;
                self.advance();
                Ok(value)
            }
            Some((Token::True, _)) => {
                self.advance();
                Ok(Value::Bool(true))
            }
            Some((Token::False, _)) => {
                self.advance();
                Ok(Value::Bool(false))
            }
            Some((Token::Null, _)) | Some((Token::Undefined, _)) => {
                self.advance();
                Ok(Value::Null)
            }
            Some((Token::LBracket, _)) => {
                self.advance();
                let mut items = Vec::new();
                while !self.check(Token::RBracket) {
                    items.push(self.parse_literal_value()?);
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(Value::Array(items))
            }
            Some((Token::LBrace, _)) => {
                self.advance();
                let mut map = serde_json::Map::new();
                while !self.check(Token::RBrace) {
                    let key = self.parse_member_key()?;
                    self.expect(Token::Colon)?;
                    let value = self.parse_literal_value()?;
                    map.insert(key, value);
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBrace)?;
                Ok(Value::Object(map))
            }
            _ => Err(ParseError::non_literal(self.text.trim())),
        }
    }

    fn parse_prop_object(&mut self, shape: Option<&PropShape>) -> ParseResult<PropValues> {
        self.expect(Token::LBrace)?;
        let mut values = PropValues::new();
        while !self.check(Token::RBrace) {
            let key = self.parse_member_key()?;
            self.expect(Token::Colon)?;
            let declared = shape.and_then(|s| s.get(&key)).map(|meta| &meta.prop_type);
            let value = self.parse_prop_val(declared)?;
            values.insert(key, value);
            if !self.match_token(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace)?;
        Ok(values)
    }

    fn parse_prop_val(&mut self, declared: Option<&PropType>) -> ParseResult<PropVal> {
        match self.peek() {
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                let text = unescape(s);
                self.advance();
                let literal = match declared.map(PropType::value_type) {
                    Some(PropValueType::HexColor) => LiteralProp::HexColor(text),
                    _ => LiteralProp::String(text),
                };
                Ok(PropVal::Literal(literal))
            }
            Some((Token::Number(s), _)) => {
                let number: f64 = s
                    .parse()
                    .map_err(|_| ParseError::non_literal(s.to_string()))?;
                self.advance();
                Ok(PropVal::Literal(LiteralProp::Number(number)))
            }
            Some((Token::True, _)) => {
                self.advance();
                Ok(PropVal::Literal(LiteralProp::Boolean(true)))
            }
            Some((Token::False, _)) => {
                self.advance();
                Ok(PropVal::Literal(LiteralProp::Boolean(false)))
            }
            Some((Token::TemplateString(s), _)) => {
                let value_type = declared
                    .map(PropType::value_type)
                    .unwrap_or(PropValueType::String);
                let value = s.to_string();
                self.advance();
                Ok(PropVal::expression(value_type, value))
            }
            Some((Token::LBrace, _)) => {
                let nested_shape = declared.and_then(PropType::object_shape);
                let values = self.parse_prop_object(nested_shape)?;
                Ok(PropVal::Literal(LiteralProp::Object(values)))
            }
            Some((Token::LBracket, _)) => {
                let item_type = match declared {
                    Some(PropType::Array(item)) => Some(item.as_ref()),
                    _ => None,
                };
                self.advance();
                let mut items = Vec::new();
                while !self.check(Token::RBracket) {
                    items.push(self.parse_prop_val(item_type)?);
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBracket)?;
                Ok(PropVal::Literal(LiteralProp::Array(items)))
            }
            Some(_) => {
                let span = self.capture_expression();
                let value_type = declared
                    .map(PropType::value_type)
                    .unwrap_or(PropValueType::String);
                Ok(PropVal::expression(
                    value_type,
                    self.text[span].trim().to_string(),
                ))
            }
            None => Err(ParseError::unexpected_eof(self.text.len())),
        }
    }

    /// Capture raw source through the end of the current member value:
    /// until `,`, `}`, or `]` at delimiter depth zero.
    fn capture_expression(&mut self) -> Range<usize> {
        let start = match self.peek() {
            Some((_, span)) => span.start,
            None => self.text.len(),
        };
        let mut end = start;
        let mut depth = 0i32;
        while let Some((token, span)) = self.peek() {
            if depth == 0
                && matches!(token, Token::Comma | Token::RBrace | Token::RBracket)
            {
                break;
            }
            if token.is_open_delim() {
                depth += 1;
            } else if token.is_close_delim() {
                depth -= 1;
            }
            end = span.end;
            self.advance();
        }
        start..end
    }

    fn parse_member_key(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let key = s.to_string();
                self.advance();
                Ok(key)
            }
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                let key = unescape(s);
                self.advance();
                Ok(key)
            }
            _ => Err(ParseError::non_literal(self.text.trim())),
        }
    }

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) {
        self.pos += 1;
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
        if self.match_token(token) {
            Ok(())
        } else {
            Err(ParseError::non_literal(self.text.trim()))
        }
    }
}

fn parse_number(slice: &str) -> ParseResult<Value> {
    if slice.contains('.') {
        let number: f64 = slice
            .parse()
            .map_err(|_| ParseError::non_literal(slice.to_string()))?;
        serde_json::Number::from_f64(number)
            .map(Value::Number)
            .ok_or_else(|| ParseError::non_literal(slice.to_string()))
    } else {
        let number: i64 = slice
            .parse()
            .map_err(|_| ParseError::non_literal(slice.to_string()))?;
        Ok(Value::Number(number.into()))
    }
}

/// Minimal string unescaping for quoted source literals
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracery_model::PropMetadata;

    #[test]
    fn test_evaluates_nested_literal() {
        let value = evaluate_object_literal(
            "{\n  stream: {\n    $id: \"my-stream\",\n    fields: [\"title\", \"slug\"],\n    localization: { locales: [\"en\"], primary: false },\n  },\n}",
        )
        .unwrap();

        assert_eq!(value["stream"]["$id"], "my-stream");
        assert_eq!(value["stream"]["fields"][1], "slug");
        assert_eq!(value["stream"]["localization"]["primary"], false);
    }

    #[test]
    fn test_rejects_function_call() {
        let err = evaluate_object_literal("{ a: getValue() }").unwrap_err();
        assert!(err.to_string().contains("literal"));
    }

    #[test]
    fn test_rejects_identifier_value() {
        assert!(evaluate_object_literal("{ a: someVar }").is_err());
    }

    #[test]
    fn test_integer_numbers_stay_integral() {
        let value = evaluate_object_literal("{ n: 3, f: 1.5 }").unwrap();
        assert_eq!(value["n"], 3);
        assert_eq!(value["f"], 1.5);
    }

    #[test]
    fn test_prop_values_literals_and_expressions() {
        let values = parse_prop_values(
            "{\n  title: \"hello\",\n  num: 5,\n  onDark: true,\n  greeting: `hi ${document.name}`,\n}",
            None,
        )
        .unwrap();

        assert_eq!(values["title"], PropVal::literal_string("hello"));
        assert_eq!(values["num"], PropVal::literal_number(5.0));
        assert_eq!(values["onDark"], PropVal::literal_boolean(true));
        assert_eq!(
            values["greeting"],
            PropVal::expression(PropValueType::String, "`hi ${document.name}`")
        );
    }

    #[test]
    fn test_shape_drives_hex_color() {
        let mut shape = PropShape::new();
        shape.insert(
            "bgColor".to_string(),
            PropMetadata::optional(PropType::Simple(PropValueType::HexColor)),
        );
        let values = parse_prop_values("{ bgColor: \"#ffffff\" }", Some(&shape)).unwrap();

        assert_eq!(
            values["bgColor"],
            PropVal::Literal(LiteralProp::HexColor("#ffffff".to_string()))
        );
    }

    #[test]
    fn test_nested_object_and_array_props() {
        let values =
            parse_prop_values("{ meta: { sub: \"x\" }, items: [1, 2] }", None).unwrap();

        match &values["meta"] {
            PropVal::Literal(LiteralProp::Object(nested)) => {
                assert_eq!(nested["sub"], PropVal::literal_string("x"));
            }
            other => panic!("expected object literal, got {:?}", other),
        }
        match &values["items"] {
            PropVal::Literal(LiteralProp::Array(items)) => assert_eq!(items.len(), 2),
            other => panic!("expected array literal, got {:?}", other),
        }
    }

    #[test]
    fn test_opaque_expression_captured_verbatim() {
        let values = parse_prop_values("{ label: document.title }", None).unwrap();

        assert_eq!(
            values["label"],
            PropVal::expression(PropValueType::String, "document.title")
        );
    }
}
