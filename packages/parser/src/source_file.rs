//! Statement-level reader for component source files
//!
//! A [`SourceFile`] scans the top level of a file into a flat list of
//! spanned statements. Only the statement forms the sync engine cares
//! about are modeled; everything else is kept as an opaque [`StatementKind::Other`]
//! with its span intact, so unrecognized developer code survives
//! read-modify-write untouched.
//!
//! Scanning never fails. A statement that starts with a recognized
//! keyword but does not fit the expected form downgrades to `Other`
//! rather than poisoning the whole file. Errors are reserved for
//! queries, where a caller asked for something the file does not have.

use crate::error::{ParseError, ParseResult};
use crate::literal;
use crate::tokenizer::{tokenize, Token};
use indexmap::IndexMap;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub span: Range<usize>,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Import(ImportDecl),
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Var(VarDecl),
    Function(FunctionDecl),
    ExportDefault(ExportDefaultDecl),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub source: String,
    pub default_import: Option<String>,
    /// Imported names, pre-alias (`B` in `import { B as C }`)
    pub named_imports: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: String,
    pub exported: bool,
    /// Span of the `{ ... }` body, braces included
    pub body_span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub name: String,
    pub exported: bool,
    /// Present only when the alias is to an object literal type
    pub body_span: Option<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub exported: bool,
    /// Span of the type annotation text, colon excluded
    pub type_annotation_span: Option<Range<usize>>,
    pub initializer: Initializer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    /// `{ ... }` span, braces included
    ObjectLiteral(Range<usize>),
    ArrowFunction(FunctionBody),
    Other(Range<usize>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Option<String>,
    pub export_default: bool,
    pub body: FunctionBody,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    /// Parameter list span, parentheses included
    pub params_span: Range<usize>,
    /// Body span; braces included when `braced`
    pub body_span: Range<usize>,
    /// False for concise arrow bodies (`=> expr`)
    pub braced: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDefaultDecl {
    Identifier(String),
    ObjectLiteral(Range<usize>),
    ArrayLiteral(Range<usize>),
    Other,
}

/// The function a file's default export resolves to
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentFunction {
    pub name: Option<String>,
    pub params_span: Range<usize>,
    pub body_span: Range<usize>,
    pub braced: bool,
    /// Span of the whole declaring statement
    pub statement_span: Range<usize>,
}

/// A `return` statement located inside a component function
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// `return` keyword through trailing semicolon
    pub span: Range<usize>,
    /// The returned expression only
    pub expr_span: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    filepath: PathBuf,
    text: String,
    statements: Vec<Statement>,
}

impl SourceFile {
    pub fn parse(filepath: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let statements = {
            let tokens = tokenize(&text);
            Scanner::new(&tokens).scan()
        };
        Self {
            filepath: filepath.into(),
            text,
            statements,
        }
    }

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn slice(&self, span: &Range<usize>) -> &str {
        &self.text[span.clone()]
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn imports(&self) -> impl Iterator<Item = (&ImportDecl, &Statement)> {
        self.statements.iter().filter_map(|stmt| match &stmt.kind {
            StatementKind::Import(decl) => Some((decl, stmt)),
            _ => None,
        })
    }

    /// Named imports grouped by module specifier, in source order
    pub fn named_imports(&self) -> IndexMap<String, Vec<String>> {
        let mut out: IndexMap<String, Vec<String>> = IndexMap::new();
        for (decl, _) in self.imports() {
            if !decl.named_imports.is_empty() {
                out.entry(decl.source.clone())
                    .or_default()
                    .extend(decl.named_imports.iter().cloned());
            }
        }
        out
    }

    /// Default imports keyed by module specifier
    pub fn default_imports(&self) -> IndexMap<String, String> {
        self.imports()
            .filter_map(|(decl, _)| {
                decl.default_import
                    .as_ref()
                    .map(|name| (decl.source.clone(), name.clone()))
            })
            .collect()
    }

    /// Default imports from relative specifiers, resolved to absolute
    /// paths against this file's directory. Extensionless specifiers
    /// get `.tsx` appended.
    pub fn absolute_default_imports(&self) -> IndexMap<PathBuf, String> {
        let parent = self.filepath.parent().unwrap_or_else(|| Path::new(""));
        self.imports()
            .filter_map(|(decl, _)| {
                let name = decl.default_import.as_ref()?;
                if !decl.source.starts_with("./") && !decl.source.starts_with("../") {
                    return None;
                }
                let mut resolved = normalize_path(&parent.join(&decl.source));
                if resolved.extension().is_none() {
                    resolved.set_extension("tsx");
                }
                Some((resolved, name.clone()))
            })
            .collect()
    }

    /// Relative specifiers of imported stylesheets, in source order
    pub fn css_imports(&self) -> Vec<String> {
        self.imports()
            .filter(|(decl, _)| decl.source.ends_with(".css"))
            .map(|(decl, _)| decl.source.clone())
            .collect()
    }

    pub fn import_of(&self, source: &str) -> Option<(&ImportDecl, &Statement)> {
        self.imports().find(|(decl, _)| decl.source == source)
    }

    pub fn var_statement(&self, name: &str) -> Option<(&VarDecl, &Statement)> {
        self.statements.iter().find_map(|stmt| match &stmt.kind {
            StatementKind::Var(decl) if decl.name == name => Some((decl, stmt)),
            _ => None,
        })
    }

    /// Body span of a named interface, or of a type alias to an object
    /// literal with that name.
    pub fn declared_type_body(&self, name: &str) -> Option<Range<usize>> {
        self.statements.iter().find_map(|stmt| match &stmt.kind {
            StatementKind::Interface(decl) if decl.name == name => Some(decl.body_span.clone()),
            StatementKind::TypeAlias(decl) if decl.name == name => decl.body_span.clone(),
            _ => None,
        })
    }

    pub fn interface_statement(&self, name: &str) -> Option<&Statement> {
        self.statements.iter().find(|stmt| {
            matches!(&stmt.kind, StatementKind::Interface(decl) if decl.name == name)
        })
    }

    /// Evaluate the initializer of an exported `const` as a literal
    /// value. Returns `None` when no variable of that name exists.
    pub fn exported_object_literal(&self, name: &str) -> ParseResult<Option<serde_json::Value>> {
        let Some((decl, stmt)) = self.var_statement(name) else {
            return Ok(None);
        };
        match &decl.initializer {
            Initializer::ObjectLiteral(span) => {
                let value = literal::evaluate_object_literal(self.slice(span))?;
                Ok(Some(value))
            }
            _ => Err(ParseError::ExpectedObjectLiteral {
                statement: self.slice(&stmt.span).to_string(),
            }),
        }
    }

    pub fn default_export(&self) -> Option<(&ExportDefaultDecl, &Statement)> {
        self.statements.iter().find_map(|stmt| match &stmt.kind {
            StatementKind::ExportDefault(decl) => Some((decl, stmt)),
            _ => None,
        })
    }

    /// Resolve the file's default export to its component function.
    ///
    /// `export default function` is taken directly. An identifier
    /// export is chased to a `const` arrow function or a named
    /// function declaration. Anything else is unsupported.
    pub fn default_exported_component(&self) -> ParseResult<ComponentFunction> {
        for stmt in &self.statements {
            if let StatementKind::Function(decl) = &stmt.kind {
                if decl.export_default {
                    return Ok(ComponentFunction {
                        name: decl.name.clone(),
                        params_span: decl.body.params_span.clone(),
                        body_span: decl.body.body_span.clone(),
                        braced: decl.body.braced,
                        statement_span: stmt.span.clone(),
                    });
                }
            }
        }

        let Some((export, _)) = self.default_export() else {
            return Err(ParseError::MissingDefaultExport {
                filepath: self.filepath.display().to_string(),
            });
        };
        let name = match export {
            ExportDefaultDecl::Identifier(name) => name,
            _ => return Err(ParseError::IndirectDefaultExport),
        };

        for stmt in &self.statements {
            match &stmt.kind {
                StatementKind::Var(decl) if decl.name == *name => {
                    if let Initializer::ArrowFunction(body) = &decl.initializer {
                        return Ok(ComponentFunction {
                            name: Some(decl.name.clone()),
                            params_span: body.params_span.clone(),
                            body_span: body.body_span.clone(),
                            braced: body.braced,
                            statement_span: stmt.span.clone(),
                        });
                    }
                }
                StatementKind::Function(decl) if decl.name.as_deref() == Some(name) => {
                    return Ok(ComponentFunction {
                        name: decl.name.clone(),
                        params_span: decl.body.params_span.clone(),
                        body_span: decl.body.body_span.clone(),
                        braced: decl.body.braced,
                        statement_span: stmt.span.clone(),
                    });
                }
                _ => {}
            }
        }

        Err(ParseError::MissingDefaultExport {
            filepath: self.filepath.display().to_string(),
        })
    }

    /// Locate the top-level `return` statement of a component function.
    /// A concise arrow body counts as its own return expression.
    pub fn return_statement(&self, func: &ComponentFunction) -> Option<ReturnStatement> {
        if !func.braced {
            return Some(ReturnStatement {
                span: func.body_span.clone(),
                expr_span: func.body_span.clone(),
            });
        }

        let body_text = &self.text[func.body_span.clone()];
        let tokens = tokenize(body_text);
        let mut depth = 0i32;
        let mut i = 0;
        while i < tokens.len() {
            let (token, span) = &tokens[i];
            if token.is_open_delim() {
                depth += 1;
            } else if token.is_close_delim() {
                depth -= 1;
            } else if *token == Token::Return && depth == 1 {
                // depth 1: directly inside the function's braces
                let return_start = func.body_span.start + span.start;
                let mut expr_depth = 0i32;
                let mut j = i + 1;
                let mut expr_start = None;
                let mut end = span.end;
                while j < tokens.len() {
                    let (t, s) = &tokens[j];
                    if expr_depth == 0 && (*t == Token::Semi || *t == Token::RBrace) {
                        break;
                    }
                    if t.is_open_delim() {
                        expr_depth += 1;
                    } else if t.is_close_delim() {
                        expr_depth -= 1;
                    }
                    expr_start.get_or_insert(s.start);
                    end = s.end;
                    j += 1;
                }
                let expr_start = expr_start?;
                let mut stmt_end = func.body_span.start + end;
                if let Some((Token::Semi, s)) = tokens.get(j) {
                    stmt_end = func.body_span.start + s.end;
                }
                return Some(ReturnStatement {
                    span: return_start..stmt_end,
                    expr_span: func.body_span.start + expr_start..func.body_span.start + end,
                });
            }
            i += 1;
        }
        None
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Top-level statement scanner
struct Scanner<'a, 'src> {
    tokens: &'a [(Token<'src>, Range<usize>)],
    pos: usize,
}

impl<'a, 'src> Scanner<'a, 'src> {
    fn new(tokens: &'a [(Token<'src>, Range<usize>)]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn scan(mut self) -> Vec<Statement> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            // Doc comments belong to whatever follows; they are not
            // statements of their own.
            if matches!(self.peek(), Some((Token::DocComment(_), _))) {
                self.advance();
                continue;
            }
            let start_pos = self.pos;
            let start = self.peek_span().start;
            let kind = match self.parse_statement() {
                Ok(kind) => kind,
                Err(_) => {
                    self.pos = start_pos;
                    self.skip_statement();
                    StatementKind::Other
                }
            };
            // A statement always consumes at least one token.
            if self.pos == start_pos {
                self.advance();
            }
            statements.push(Statement {
                span: start..self.prev_end(),
                kind,
            });
        }
        statements
    }

    fn parse_statement(&mut self) -> ParseResult<StatementKind> {
        match self.peek() {
            Some((Token::Import, _)) => self.parse_import(),
            Some((Token::Export, _)) => self.parse_export(),
            Some((Token::Const, _)) => Ok(StatementKind::Var(self.parse_var(false)?)),
            Some((Token::Function, _)) => {
                Ok(StatementKind::Function(self.parse_function(false)?))
            }
            Some((Token::Interface, _)) => {
                Ok(StatementKind::Interface(self.parse_interface(false)?))
            }
            Some((Token::TypeKw, _)) => self.parse_type_alias(false),
            _ => {
                self.skip_statement();
                Ok(StatementKind::Other)
            }
        }
    }

    fn parse_import(&mut self) -> ParseResult<StatementKind> {
        self.expect(Token::Import)?;
        let mut default_import = None;
        let mut named_imports = Vec::new();

        // Bare import: `import "./styles.css";`
        if let Some(source) = self.match_string() {
            self.match_token(Token::Semi);
            return Ok(StatementKind::Import(ImportDecl {
                source,
                default_import: None,
                named_imports: Vec::new(),
            }));
        }

        if self.check(Token::Star) {
            // Namespace import: source recorded, no usable names
            self.advance();
            self.expect(Token::As)?;
            self.expect_ident()?;
        } else {
            if let Some((Token::Ident(name), _)) = self.peek() {
                default_import = Some(name.to_string());
                self.advance();
                self.match_token(Token::Comma);
            }
            if self.match_token(Token::LBrace) {
                while !self.check(Token::RBrace) {
                    let name = self.expect_ident()?;
                    if self.match_token(Token::As) {
                        self.expect_ident()?;
                    }
                    named_imports.push(name);
                    if !self.match_token(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RBrace)?;
            }
        }

        self.expect(Token::From)?;
        let source = self
            .match_string()
            .ok_or_else(|| self.err_expected("module specifier"))?;
        self.match_token(Token::Semi);
        Ok(StatementKind::Import(ImportDecl {
            source,
            default_import,
            named_imports,
        }))
    }

    fn parse_export(&mut self) -> ParseResult<StatementKind> {
        self.expect(Token::Export)?;
        match self.peek() {
            Some((Token::Default, _)) => {
                self.advance();
                if self.check(Token::Function) {
                    return Ok(StatementKind::Function(self.parse_function(true)?));
                }
                self.parse_export_default_expr()
            }
            Some((Token::Const, _)) => Ok(StatementKind::Var(self.parse_var(true)?)),
            Some((Token::Interface, _)) => {
                Ok(StatementKind::Interface(self.parse_interface(true)?))
            }
            Some((Token::TypeKw, _)) => self.parse_type_alias(true),
            Some((Token::Function, _)) => Ok(StatementKind::Function(self.parse_function(false)?)),
            _ => Err(self.err_expected("export declaration")),
        }
    }

    fn parse_export_default_expr(&mut self) -> ParseResult<StatementKind> {
        // Unwrap any parenthesization around the exported expression
        let mut parens = 0;
        while self.match_token(Token::LParen) {
            parens += 1;
        }
        let decl = match self.peek() {
            Some((Token::LBrace, _)) => {
                ExportDefaultDecl::ObjectLiteral(self.skip_balanced()?)
            }
            Some((Token::LBracket, _)) => {
                ExportDefaultDecl::ArrayLiteral(self.skip_balanced()?)
            }
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                self.advance();
                // `export default Page as SomeType;` still names Page
                if self.check(Token::Dot) || self.check(Token::LParen) {
                    ExportDefaultDecl::Other
                } else {
                    ExportDefaultDecl::Identifier(name)
                }
            }
            _ => ExportDefaultDecl::Other,
        };
        for _ in 0..parens {
            self.skip_until_depth_zero(Token::RParen);
            self.match_token(Token::RParen);
        }
        self.skip_to_semi();
        Ok(StatementKind::ExportDefault(decl))
    }

    fn parse_var(&mut self, exported: bool) -> ParseResult<VarDecl> {
        self.expect(Token::Const)?;
        let name = self.expect_ident()?;

        let type_annotation_span = if self.match_token(Token::Colon) {
            let start = self.peek_span().start;
            self.skip_until_depth_zero(Token::Eq);
            Some(start..self.prev_end())
        } else {
            None
        };
        self.expect(Token::Eq)?;

        let initializer = match self.peek() {
            Some((Token::LBrace, _)) => Initializer::ObjectLiteral(self.skip_balanced()?),
            Some((Token::LParen, _)) if self.arrow_follows_parens() => {
                let params_span = self.skip_balanced()?;
                self.expect(Token::FatArrow)?;
                let (body_span, braced) = self.parse_function_body()?;
                Initializer::ArrowFunction(FunctionBody {
                    params_span,
                    body_span,
                    braced,
                })
            }
            Some((Token::Ident(_), span)) if self.peek_ahead_is(1, Token::FatArrow) => {
                let params_span = span.clone();
                self.advance();
                self.advance();
                let (body_span, braced) = self.parse_function_body()?;
                Initializer::ArrowFunction(FunctionBody {
                    params_span,
                    body_span,
                    braced,
                })
            }
            Some((_, span)) => {
                let start = span.start;
                self.skip_to_semi_no_consume();
                Initializer::Other(start..self.prev_end())
            }
            None => return Err(self.err_eof()),
        };

        self.skip_to_semi();
        Ok(VarDecl {
            name,
            exported,
            type_annotation_span,
            initializer,
        })
    }

    fn parse_function(&mut self, export_default: bool) -> ParseResult<FunctionDecl> {
        self.expect(Token::Function)?;
        let name = match self.peek() {
            Some((Token::Ident(name), _)) => {
                let name = name.to_string();
                self.advance();
                Some(name)
            }
            _ => None,
        };
        if !self.check(Token::LParen) {
            return Err(self.err_expected("parameter list"));
        }
        let params_span = self.skip_balanced()?;
        if self.match_token(Token::Colon) {
            // Return type annotation; object literal types are not
            // expected here.
            while !self.check(Token::LBrace) && !self.is_at_end() {
                self.advance();
            }
        }
        if !self.check(Token::LBrace) {
            return Err(self.err_expected("function body"));
        }
        let body_span = self.skip_balanced()?;
        Ok(FunctionDecl {
            name,
            export_default,
            body: FunctionBody {
                params_span,
                body_span,
                braced: true,
            },
        })
    }

    fn parse_function_body(&mut self) -> ParseResult<(Range<usize>, bool)> {
        if self.check(Token::LBrace) {
            Ok((self.skip_balanced()?, true))
        } else {
            let start = self.peek_span().start;
            self.skip_to_semi_no_consume();
            Ok((start..self.prev_end(), false))
        }
    }

    fn parse_interface(&mut self, exported: bool) -> ParseResult<InterfaceDecl> {
        self.expect(Token::Interface)?;
        let name = self.expect_ident()?;
        while !self.check(Token::LBrace) && !self.is_at_end() {
            self.advance(); // extends clause
        }
        if !self.check(Token::LBrace) {
            return Err(self.err_expected("interface body"));
        }
        let body_span = self.skip_balanced()?;
        Ok(InterfaceDecl {
            name,
            exported,
            body_span,
        })
    }

    fn parse_type_alias(&mut self, exported: bool) -> ParseResult<StatementKind> {
        self.expect(Token::TypeKw)?;
        let name = self.expect_ident()?;
        self.expect(Token::Eq)?;
        let body_span = if self.check(Token::LBrace) {
            Some(self.skip_balanced()?)
        } else {
            None
        };
        self.skip_to_semi();
        Ok(StatementKind::TypeAlias(TypeAliasDecl {
            name,
            exported,
            body_span,
        }))
    }

    /// Consume an opaque statement: through a top-level semicolon, or
    /// past a top-level block when the next token starts a new
    /// statement.
    fn skip_statement(&mut self) {
        while let Some((token, _)) = self.peek() {
            if *token == Token::Semi {
                self.advance();
                return;
            }
            if token.is_open_delim() {
                if self.skip_balanced().is_err() {
                    self.pos = self.tokens.len();
                    return;
                }
                match self.peek() {
                    None
                    | Some((Token::Import, _))
                    | Some((Token::Export, _))
                    | Some((Token::Const, _))
                    | Some((Token::Function, _))
                    | Some((Token::Interface, _))
                    | Some((Token::TypeKw, _))
                    | Some((Token::DocComment(_), _)) => return,
                    _ => continue,
                }
            }
            self.advance();
        }
    }

    // Helper methods

    fn peek(&self) -> Option<&(Token<'src>, Range<usize>)> {
        self.tokens.get(self.pos)
    }

    fn peek_ahead_is(&self, offset: usize, token: Token) -> bool {
        match self.tokens.get(self.pos + offset) {
            Some((t, _)) => std::mem::discriminant(t) == std::mem::discriminant(&token),
            None => false,
        }
    }

    fn advance(&mut self) -> Option<&(Token<'src>, Range<usize>)> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn check(&self, token: Token) -> bool {
        if let Some((t, _)) = self.peek() {
            std::mem::discriminant(t) == std::mem::discriminant(&token)
        } else {
            false
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
        if self.check(token.clone()) {
            self.advance();
            Ok(())
        } else {
            Err(self.err_expected(&format!("{:?}", token)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some((Token::Ident(s), _)) => {
                let val = s.to_string();
                self.advance();
                Ok(val)
            }
            _ => Err(self.err_expected("identifier")),
        }
    }

    fn match_string(&mut self) -> Option<String> {
        match self.peek() {
            Some((Token::String(s), _)) | Some((Token::SingleQuoteString(s), _)) => {
                let val = s.to_string();
                self.advance();
                Some(val)
            }
            _ => None,
        }
    }

    /// From an opening delimiter, consume through its matching closer.
    /// Returns the covered span, delimiters included.
    fn skip_balanced(&mut self) -> ParseResult<Range<usize>> {
        let start = self.peek_span().start;
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
        Err(self.err_eof())
    }

    /// Advance until `stop` is next at delimiter depth zero
    fn skip_until_depth_zero(&mut self, stop: Token) {
        let mut depth = 0i32;
        while let Some((token, _)) = self.peek() {
            if depth == 0 && std::mem::discriminant(token) == std::mem::discriminant(&stop) {
                return;
            }
            if token.is_open_delim() {
                depth += 1;
            } else if token.is_close_delim() {
                depth -= 1;
            }
            self.advance();
        }
    }

    fn skip_to_semi_no_consume(&mut self) {
        self.skip_until_depth_zero(Token::Semi);
    }

    fn skip_to_semi(&mut self) {
        self.skip_until_depth_zero(Token::Semi);
        self.match_token(Token::Semi);
    }

    /// Arrow-function lookahead: does `=>` follow the parenthesized
    /// group starting here?
    fn arrow_follows_parens(&self) -> bool {
        let mut depth = 0i32;
        let mut i = self.pos;
        while let Some((token, _)) = self.tokens.get(i) {
            if token.is_open_delim() {
                depth += 1;
            } else if token.is_close_delim() {
                depth -= 1;
                if depth == 0 {
                    return matches!(self.tokens.get(i + 1), Some((Token::FatArrow, _)));
                }
            }
            i += 1;
        }
        false
    }

    fn peek_span(&self) -> Range<usize> {
        match self.peek() {
            Some((_, span)) => span.clone(),
            None => self.prev_end()..self.prev_end(),
        }
    }

    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].1.end
        }
    }

    fn err_expected(&self, expected: &str) -> ParseError {
        let found = match self.peek() {
            Some((token, _)) => format!("{:?}", token),
            None => "end of file".to_string(),
        };
        ParseError::unexpected_token(self.peek_span().start, expected, found)
    }

    fn err_eof(&self) -> ParseError {
        ParseError::unexpected_eof(self.prev_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SourceFile {
        SourceFile::parse("/pages/Test.tsx", src)
    }

    #[test]
    fn test_scans_imports() {
        let file = parse(concat!(
            "import Banner from \"../components/Banner\";\n",
            "import { TemplateConfig, TemplateProps } from \"@tracery/pages\";\n",
            "import \"./index.css\";\n",
        ));

        let imports: Vec<_> = file.imports().map(|(d, _)| d.clone()).collect();
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].default_import.as_deref(), Some("Banner"));
        assert_eq!(
            imports[1].named_imports,
            vec!["TemplateConfig", "TemplateProps"]
        );
        assert_eq!(imports[2].source, "./index.css");
        assert_eq!(file.css_imports(), vec!["./index.css"]);
    }

    #[test]
    fn test_absolute_default_imports() {
        let file = SourceFile::parse(
            "/project/src/pages/Universal.tsx",
            "import Banner from \"../components/Banner\";\n",
        );

        let abs = file.absolute_default_imports();
        assert_eq!(
            abs.get(Path::new("/project/src/components/Banner.tsx")),
            Some(&"Banner".to_string())
        );
    }

    #[test]
    fn test_aliased_named_import_records_source_name() {
        let file = parse("import { Card as MyCard } from \"./Card\";\n");

        assert_eq!(file.named_imports()["./Card"], vec!["Card"]);
    }

    #[test]
    fn test_scans_interface_and_var() {
        let file = parse(concat!(
            "export interface BannerProps {\n  title?: string;\n}\n\n",
            "export const initialProps: BannerProps = {\n  title: \"hi\",\n};\n",
        ));

        assert!(file.interface_statement("BannerProps").is_some());
        let (decl, _) = file.var_statement("initialProps").unwrap();
        assert!(decl.exported);
        assert!(matches!(decl.initializer, Initializer::ObjectLiteral(_)));
    }

    #[test]
    fn test_default_exported_arrow_component() {
        let file = parse(concat!(
            "const Page = ({ document }: TemplateProps) => {\n",
            "  return (\n    <Banner />\n  );\n",
            "};\n\n",
            "export default Page;\n",
        ));

        let func = file.default_exported_component().unwrap();
        assert_eq!(func.name.as_deref(), Some("Page"));
        assert!(func.braced);
        assert_eq!(file.slice(&func.params_span), "({ document }: TemplateProps)");

        let ret = file.return_statement(&func).unwrap();
        assert_eq!(file.slice(&ret.expr_span), "(\n    <Banner />\n  )");
        assert!(file.slice(&ret.span).starts_with("return"));
        assert!(file.slice(&ret.span).ends_with(";"));
    }

    #[test]
    fn test_export_default_function_declaration() {
        let file = parse("export default function Banner() {\n  return <div />;\n}\n");

        let func = file.default_exported_component().unwrap();
        assert_eq!(func.name.as_deref(), Some("Banner"));
        assert!(file.return_statement(&func).is_some());
    }

    #[test]
    fn test_concise_arrow_body_is_return_expression() {
        let file = parse("const Chip = () => <span />;\nexport default Chip;\n");

        let func = file.default_exported_component().unwrap();
        assert!(!func.braced);
        let ret = file.return_statement(&func).unwrap();
        assert_eq!(file.slice(&ret.expr_span), "<span />");
    }

    #[test]
    fn test_missing_default_export() {
        let file = parse("const x = 1;\n");

        let err = file.default_exported_component().unwrap_err();
        assert!(err.to_string().contains("No declaration node found"));
    }

    #[test]
    fn test_object_default_export_rejected() {
        let file = parse("export default { a: 1 };\n");

        let err = file.default_exported_component().unwrap_err();
        assert!(err.to_string().contains("direct Identifier"));
    }

    #[test]
    fn test_parenthesized_identifier_export() {
        let file = parse("const Page = () => <div />;\nexport default (Page);\n");

        assert!(file.default_exported_component().is_ok());
    }

    #[test]
    fn test_exported_object_literal() {
        let file = parse("export const config = {\n  stream: { $id: \"my-stream\" },\n};\n");

        let value = file.exported_object_literal("config").unwrap().unwrap();
        assert_eq!(value["stream"]["$id"], "my-stream");
        assert!(file.exported_object_literal("missing").unwrap().is_none());
    }

    #[test]
    fn test_non_object_config_errors() {
        let file = parse("export const config = getConfig();\n");

        let err = file.exported_object_literal("config").unwrap_err();
        assert!(err.to_string().contains("ObjectLiteralExpression"));
    }

    #[test]
    fn test_unrecognized_statements_are_opaque() {
        let file = parse(concat!(
            "const Page = () => <div />;\n",
            "window.addEventListener(\"load\", () => {\n  console.log(\"hi\");\n});\n",
            "export default Page;\n",
        ));

        assert!(file
            .statements()
            .iter()
            .any(|s| s.kind == StatementKind::Other));
        assert!(file.default_exported_component().is_ok());
    }

    #[test]
    fn test_statement_spans_cover_source(){
        let src = "import A from \"./A\";\nconst x = 1;\n";
        let file = parse(src);

        for window in file.statements().windows(2) {
            assert!(window[0].span.end <= window[1].span.start);
        }
    }
}
