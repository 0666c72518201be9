use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone)]
pub enum ParseError {
    #[error("Unexpected token at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        pos: usize,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of file at {pos}")]
    UnexpectedEof { pos: usize },

    #[error("Invalid syntax at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },

    #[error("Unable to find top-level JSX element or JSX fragment type in the default export at path: {filepath}")]
    MissingTopLevelJsx { filepath: String },

    #[error("Error getting default export: No declaration node found in {filepath}.")]
    MissingDefaultExport { filepath: String },

    #[error("Error getting default export React component: Only a direct Identifier is supported for ExportAssignment.")]
    IndirectDefaultExport,

    #[error("Error parsing `{text}`: JsxSpreadAttribute is not currently supported.")]
    SpreadAttribute { text: String },

    #[error("Found JsxText with content \"{content}\". JsxText is not currently supported.")]
    JsxText { content: String },

    #[error("Jsx nodes of kind \"{kind}\" are not supported for direct use in page files.")]
    UnsupportedJsxNode { kind: String },

    #[error("Union types only support strings. Found a {kind} within \"{prop_name}\".")]
    UnsupportedUnionMember { kind: String, prop_name: String },

    #[error("Could not find an ObjectLiteralExpression within `{statement}`.")]
    ExpectedObjectLiteral { statement: String },

    #[error("Failed to evaluate expression as a literal value: `{text}`")]
    NonLiteralValue { text: String },
}

impl ParseError {
    pub fn unexpected_token(
        pos: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            pos,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(pos: usize) -> Self {
        Self::UnexpectedEof { pos }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }

    pub fn non_literal(text: impl Into<String>) -> Self {
        Self::NonLiteralValue { text: text.into() }
    }
}
