//! Component-tree extraction from a file's returned markup
//!
//! Walks the JSX expression returned by the default-exported component
//! and flattens it into a [`ComponentTree`]: nodes in document order,
//! children linked to parents by uuid. Classification of each tag runs
//! against a read-only [`MetadataSnapshot`]; a tag the snapshot cannot
//! resolve becomes an error node instead of failing the parse.

use crate::error::{ParseError, ParseResult};
use crate::literal;
use crate::source_file::SourceFile;
use crate::tokenizer::{tokenize, Token};
use std::ops::Range;
use tracery_model::{
    BuiltInState, ComponentState, ComponentTree, ErrorComponentState, FileMetadataKind,
    FragmentState, IdGenerator, MetadataSnapshot, PropShape, PropVal, PropValues, RepeatedComponent,
    RepeatedComponentKind, RepeaterState, StandardComponentState,
};

/// Parse the component tree of `file`'s default export.
///
/// A component function with no return statement yields an empty tree.
pub fn parse_component_tree(
    file: &SourceFile,
    snapshot: &MetadataSnapshot,
) -> ParseResult<ComponentTree> {
    let func = file.default_exported_component()?;
    let Some(ret) = file.return_statement(&func) else {
        return Ok(Vec::new());
    };
    let expr_text = file.slice(&ret.expr_span);
    let tokens = tokenize(expr_text);
    let mut parser = ComponentTreeParser {
        expr_text,
        tokens: &tokens,
        pos: 0,
        ids: IdGenerator::new(&file.filepath().display().to_string()),
        snapshot,
        filepath: file.filepath().display().to_string(),
        tree: Vec::new(),
    };
    parser.parse()
}

struct ComponentTreeParser<'a, 'src> {
    expr_text: &'src str,
    tokens: &'a [(Token<'src>, Range<usize>)],
    pos: usize,
    ids: IdGenerator,
    snapshot: &'a MetadataSnapshot,
    filepath: String,
    tree: ComponentTree,
}

enum RawAttr {
    Bare,
    Quoted(String),
    Braced(Range<usize>),
}

impl<'a, 'src> ComponentTreeParser<'a, 'src> {
    fn parse(mut self) -> ParseResult<ComponentTree> {
        while self.check(Token::LParen) {
            self.advance();
        }
        if !self.check(Token::Lt) {
            return Err(ParseError::MissingTopLevelJsx {
                filepath: self.filepath.clone(),
            });
        }
        self.parse_element(None)?;
        Ok(self.tree)
    }

    fn parse_element(&mut self, parent_uuid: Option<String>) -> ParseResult<()> {
        self.expect(Token::Lt)?;

        // Short fragment syntax `<>`
        if self.match_token(Token::Gt) {
            let uuid = self.ids.next_id();
            self.tree.push(ComponentState::Fragment(FragmentState {
                uuid: uuid.clone(),
                parent_uuid,
            }));
            return self.parse_children(&uuid);
        }

        let name = self.parse_tag_name()?;

        if name == "Fragment" || name == "React.Fragment" {
            let uuid = self.ids.next_id();
            self.tree.push(ComponentState::Fragment(FragmentState {
                uuid: uuid.clone(),
                parent_uuid,
            }));
            if self.match_token(Token::Slash) {
                self.expect(Token::Gt)?;
                return Ok(());
            }
            self.expect(Token::Gt)?;
            return self.parse_children(&uuid);
        }

        let (attrs, self_closing) = self.parse_attributes()?;
        let uuid = self.ids.next_id();

        let state = self.classify(&name, attrs, uuid.clone(), parent_uuid)?;
        self.tree.push(state);

        if self_closing {
            return Ok(());
        }
        self.parse_children(&uuid)
    }

    fn classify(
        &mut self,
        name: &str,
        attrs: Vec<(String, RawAttr)>,
        uuid: String,
        parent_uuid: Option<String>,
    ) -> ParseResult<ComponentState> {
        if name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
        {
            if !attrs.is_empty() {
                tracing::warn!(
                    "Props for builtIn element: '{}' are currently not supported.",
                    name
                );
            }
            return Ok(ComponentState::BuiltIn(BuiltInState {
                component_name: name.to_string(),
                uuid,
                parent_uuid,
            }));
        }

        match self.snapshot.resolve(name) {
            Some(metadata) => {
                let props = self.convert_attrs(attrs, &metadata.prop_shape);
                let state = StandardComponentState {
                    component_name: name.to_string(),
                    props,
                    uuid,
                    parent_uuid,
                    metadata_uuid: metadata.metadata_uuid.clone(),
                };
                Ok(match metadata.kind {
                    FileMetadataKind::Component => ComponentState::Standard(state),
                    FileMetadataKind::Module => ComponentState::Module(state),
                })
            }
            None => Ok(ComponentState::Error(ErrorComponentState {
                component_name: name.to_string(),
                message: format!("Unable to resolve metadata for component \"{}\".", name),
                uuid,
                parent_uuid,
            })),
        }
    }

    fn convert_attrs(&self, attrs: Vec<(String, RawAttr)>, shape: &PropShape) -> PropValues {
        let mut props = PropValues::new();
        for (name, raw) in attrs {
            let declared = shape.get(&name).map(|meta| &meta.prop_type);
            let value = match raw {
                RawAttr::Bare => PropVal::literal_boolean(true),
                RawAttr::Quoted(text) => match declared.map(|t| t.value_type()) {
                    Some(tracery_model::PropValueType::HexColor) => {
                        PropVal::Literal(tracery_model::LiteralProp::HexColor(text))
                    }
                    _ => PropVal::literal_string(text),
                },
                RawAttr::Braced(span) => {
                    literal::parse_prop_val_text(&self.expr_text[span], declared)
                }
            };
            props.insert(name, value);
        }
        props
    }

    fn parse_attributes(&mut self) -> ParseResult<(Vec<(String, RawAttr)>, bool)> {
        let mut attrs = Vec::new();
        loop {
            match self.peek() {
                Some((Token::Slash, _)) => {
                    self.advance();
                    self.expect(Token::Gt)?;
                    return Ok((attrs, true));
                }
                Some((Token::Gt, _)) => {
                    self.advance();
                    return Ok((attrs, false));
                }
                Some((Token::Ident(name), _)) => {
                    let mut name = name.to_string();
                    self.advance();
                    // dashed attribute names (aria-*, data-*)
                    while self.check(Token::Minus) {
                        self.advance();
                        name.push('-');
                        name.push_str(&self.expect_ident()?);
                    }
                    let value = if self.match_token(Token::Eq) {
                        self.parse_attr_value()?
                    } else {
                        RawAttr::Bare
                    };
                    attrs.push((name, value));
                }
                Some((Token::LBrace, _)) => {
                    let span = self.balanced_span()?;
                    return Err(ParseError::SpreadAttribute {
                        text: self.expr_text[span].to_string(),
                    });
                }
                Some((_, span)) => {
                    let pos = span.start;
                    let found = self.peek_debug();
                    return Err(ParseError::unexpected_token(pos, "attribute", found));
                }
                None => return Err(ParseError::unexpected_eof(self.expr_text.len())),
            }
        }
    }

    fn parse_attr_value(&mut self) -> ParseResult<RawAttr> {
        match self.peek() {
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                let value = literal::unescape(s);
                self.advance();
                Ok(RawAttr::Quoted(value))
            }
            Some((Token::LBrace, _)) => {
                let span = self.balanced_span()?;
                // Inner span, braces excluded
                Ok(RawAttr::Braced(span.start + 1..span.end - 1))
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_start(),
                "attribute value",
                self.peek_debug(),
            )),
        }
    }

    fn parse_children(&mut self, parent_uuid: &str) -> ParseResult<()> {
        loop {
            match self.peek() {
                Some((Token::Lt, _)) => {
                    if self.peek_ahead_is(1, Token::Slash) {
                        self.advance();
                        self.advance();
                        // Closing tag name, if any, is not re-validated
                        while !self.check(Token::Gt) && !self.is_at_end() {
                            self.advance();
                        }
                        self.expect(Token::Gt)?;
                        return Ok(());
                    }
                    self.parse_element(Some(parent_uuid.to_string()))?;
                }
                Some((Token::LBrace, _)) => {
                    self.parse_jsx_expression(parent_uuid)?;
                }
                Some((_, span)) => {
                    let content = self.text_run_from(span.start);
                    return Err(ParseError::JsxText { content });
                }
                None => return Err(ParseError::unexpected_eof(self.expr_text.len())),
            }
        }
    }

    /// A braced child is supported only as a repeater:
    /// `{listExpr.map((item) => <Component ... />)}`.
    fn parse_jsx_expression(&mut self, parent_uuid: &str) -> ParseResult<()> {
        let open_span = self.peek_start();
        self.expect(Token::LBrace)?;

        let Some(map_pos) = self.find_map_call() else {
            return Err(ParseError::UnsupportedJsxNode {
                kind: "JsxExpression".to_string(),
            });
        };

        // Everything before `.map` is the list expression
        let list_start = self.peek_start();
        let list_end = self.tokens[map_pos].1.start;
        let list_expression = self.expr_text[list_start..list_end].trim().to_string();
        self.pos = map_pos;
        self.expect(Token::Dot)?;
        self.expect_ident()?; // map
        self.expect(Token::LParen)?;

        // Arrow parameters: `(item)`, `(item, index)`, or bare `item`
        if self.check(Token::LParen) {
            self.balanced_span()?;
        } else {
            self.expect_ident()?;
        }
        self.expect(Token::FatArrow)?;
        let wrapped = self.match_token(Token::LParen);

        if !self.check(Token::Lt) {
            return Err(ParseError::UnsupportedJsxNode {
                kind: "JsxExpression".to_string(),
            });
        }
        let before = self.tree.len();
        self.parse_element(None)?;
        let mut repeated: Vec<ComponentState> = self.tree.split_off(before);
        if repeated.len() != 1 {
            return Err(ParseError::invalid_syntax(
                open_span,
                "A repeated component may not have children.",
            ));
        }
        let (kind, mut state) = match repeated.pop() {
            Some(ComponentState::Standard(state)) => (RepeatedComponentKind::Standard, state),
            Some(ComponentState::Module(state)) => (RepeatedComponentKind::Module, state),
            _ => {
                return Err(ParseError::invalid_syntax(
                    open_span,
                    "Only components may be repeated in a list.",
                ))
            }
        };
        // The writer regenerates `key` for repeated nodes
        state.props.shift_remove("key");

        if wrapped {
            self.expect(Token::RParen)?;
        }
        self.expect(Token::RParen)?;
        self.expect(Token::RBrace)?;

        let uuid = self.ids.next_id();
        self.tree.push(ComponentState::Repeater(RepeaterState {
            uuid,
            parent_uuid: Some(parent_uuid.to_string()),
            list_expression,
            repeated_component: RepeatedComponent {
                kind,
                component_name: state.component_name,
                props: state.props,
                metadata_uuid: state.metadata_uuid,
            },
        }));
        Ok(())
    }

    /// Position of the first `.map(` at depth zero inside the current
    /// braced expression, if any.
    fn find_map_call(&self) -> Option<usize> {
        let mut depth = 0i32;
        let mut i = self.pos;
        while let Some((token, _)) = self.tokens.get(i) {
            if depth == 0 && *token == Token::RBrace {
                return None;
            }
            if depth == 0 && *token == Token::Dot {
                if let (Some((Token::Ident("map"), _)), Some((Token::LParen, _))) =
                    (self.tokens.get(i + 1), self.tokens.get(i + 2))
                {
                    return Some(i);
                }
            }
            if token.is_open_delim() {
                depth += 1;
            } else if token.is_close_delim() {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            i += 1;
        }
        None
    }

    fn parse_tag_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_ident()?;
        while self.check(Token::Dot) {
            self.advance();
            name.push('.');
            name.push_str(&self.expect_ident()?);
        }
        Ok(name)
    }

    /// Raw source from `start` to the next JSX boundary token
    fn text_run_from(&self, start: usize) -> String {
        let mut i = self.pos;
        let mut end = start;
        while let Some((token, span)) = self.tokens.get(i) {
            if matches!(token, Token::Lt | Token::LBrace) {
                break;
            }
            end = span.end;
            i += 1;
        }
        self.expr_text[start..end].to_string()
    }

    // Cursor helpers

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

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let name = s.to_string();
                self.advance();
                Ok(name)
            }
            _ => Err(ParseError::unexpected_token(
                self.peek_start(),
                "identifier",
                self.peek_debug(),
            )),
        }
    }

    /// From an opening delimiter, consume through its matching closer
    fn balanced_span(&mut self) -> ParseResult<Range<usize>> {
        let start = self.peek_start();
        let mut depth = 0i32;
        while let Some((token, span)) = self.peek() {
            if token.is_open_delim() {
                depth += 1;
            } else if token.is_close_delim() {
                depth -= 1;
                if depth == 0 {
                    let end = span.end;
                    self.advance();
                    return Ok(start..end);
                }
            }
            self.advance();
        }
        Err(ParseError::unexpected_eof(self.expr_text.len()))
    }

    fn peek_start(&self) -> usize {
        self.peek()
            .map(|(_, span)| span.start)
            .unwrap_or(self.expr_text.len())
    }

    fn peek_debug(&self) -> String {
        match self.peek() {
            Some((token, _)) => format!("{:?}", token),
            None => "end of file".to_string(),
        }
    }
}
