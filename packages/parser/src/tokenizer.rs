//! Lexer for Tracery component files using logos
//!
//! Logos provides extremely fast lexing via compile-time DFA generation.
//! The token set covers the subset of TSX that component files are made
//! of; anything the lexer does not know surfaces as an error span and is
//! treated as opaque text by the statement scanner.

use logos::Logos;

/// Token types for the supported TSX subset
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]  // Skip whitespace
pub enum Token<'src> {
    // Keywords
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("export")]
    Export,
    #[token("default")]
    Default,
    #[token("const")]
    Const,
    #[token("function")]
    Function,
    #[token("return")]
    Return,
    #[token("interface")]
    Interface,
    #[token("type")]
    TypeKw,
    #[token("as")]
    As,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("undefined")]
    Undefined,

    // Identifiers
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice())]
    Ident(&'src str),

    // Literals
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]  // Strip quotes
    })]
    String(&'src str),

    #[regex(r"'([^'\\]|\\.)*'", |lex| {
        let s = lex.slice();
        &s[1..s.len()-1]  // Strip quotes
    })]
    SingleQuoteString(&'src str),

    // Kept whole, backticks included, so interpolation segments stay intact
    #[regex(r"`([^`\\]|\\.)*`", |lex| lex.slice())]
    TemplateString(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),

    // Operators
    #[token("=>")]
    FatArrow,
    #[token("...")]
    Spread,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,

    // Punctuation
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,

    // Comments
    #[regex(r"//[^\n]*", |lex| lex.slice())]
    LineComment(&'src str),

    #[regex(r"/\*\*[^*]*\*+(?:[^/*][^*]*\*+)*/", |lex| lex.slice())]
    DocComment(&'src str),

    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/", |lex| lex.slice())]
    BlockComment(&'src str),
}

impl<'src> Token<'src> {
    pub fn is_open_delim(&self) -> bool {
        matches!(self, Token::LBrace | Token::LParen | Token::LBracket)
    }

    pub fn is_close_delim(&self) -> bool {
        matches!(self, Token::RBrace | Token::RParen | Token::RBracket)
    }
}

/// Tokenize a source string, dropping non-doc comments and characters
/// the lexer does not recognize.
///
/// Unknown characters only ever appear inside statements the scanner
/// treats as opaque; their original text is always recoverable through
/// spans, so dropping the tokens never loses tracked syntax.
pub fn tokenize(source: &str) -> Vec<(Token, std::ops::Range<usize>)> {
    let lexer = Token::lexer(source);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, span)))
        .filter(|(token, _)| !matches!(token, Token::LineComment(_) | Token::BlockComment(_)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let source = "import export default const function return interface";
        let tokens = tokenize(source);

        assert_eq!(tokens[0].0, Token::Import);
        assert_eq!(tokens[1].0, Token::Export);
        assert_eq!(tokens[2].0, Token::Default);
        assert_eq!(tokens[3].0, Token::Const);
        assert_eq!(tokens[4].0, Token::Function);
        assert_eq!(tokens[5].0, Token::Return);
        assert_eq!(tokens[6].0, Token::Interface);
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#""hello world" 'single'"#);

        assert_eq!(tokens[0].0, Token::String("hello world"));
        assert_eq!(tokens[1].0, Token::SingleQuoteString("single"));
    }

    #[test]
    fn test_template_string_kept_whole() {
        let tokens = tokenize(r"`hello ${document.name}`");

        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].0,
            Token::TemplateString("`hello ${document.name}`")
        );
    }

    #[test]
    fn test_jsx_punctuation() {
        let tokens = tokenize("<Banner title=\"hi\" num={3} />");

        assert_eq!(tokens[0].0, Token::Lt);
        assert_eq!(tokens[1].0, Token::Ident("Banner"));
        assert_eq!(tokens[2].0, Token::Ident("title"));
        assert_eq!(tokens[3].0, Token::Eq);
        assert_eq!(tokens[4].0, Token::String("hi"));
        assert_eq!(tokens[5].0, Token::Ident("num"));
        assert_eq!(tokens[6].0, Token::Eq);
        assert_eq!(tokens[7].0, Token::LBrace);
        assert_eq!(tokens[8].0, Token::Number("3"));
        assert_eq!(tokens[9].0, Token::RBrace);
        assert_eq!(tokens[10].0, Token::Slash);
        assert_eq!(tokens[11].0, Token::Gt);
    }

    #[test]
    fn test_fat_arrow_and_spread() {
        let tokens = tokenize("(item) => ({ ...item })");

        assert!(tokens.iter().any(|(t, _)| *t == Token::FatArrow));
        assert!(tokens.iter().any(|(t, _)| *t == Token::Spread));
    }

    #[test]
    fn test_plain_comments_dropped_doc_kept() {
        let tokens = tokenize("// line\n/* block */\n/** doc */\nconst x = 1;");

        assert!(matches!(tokens[0].0, Token::DocComment(_)));
        assert_eq!(tokens[1].0, Token::Const);
    }

    #[test]
    fn test_negative_number() {
        let tokens = tokenize("{-5.5}");

        assert_eq!(tokens[1].0, Token::Number("-5.5"));
    }

    #[test]
    fn test_unknown_characters_skipped() {
        let tokens = tokenize("@decorator const x");

        assert_eq!(tokens[0].0, Token::Ident("decorator"));
        assert_eq!(tokens[1].0, Token::Const);
    }
}
