pub mod component_tree;
pub mod error;
pub mod literal;
pub mod shape_parser;
pub mod source_file;
pub mod tokenizer;

pub use component_tree::parse_component_tree;
pub use error::{ParseError, ParseResult};
pub use literal::{evaluate_object_literal, parse_prop_values};
pub use shape_parser::{parse_prop_shape, parse_shape_body};
pub use source_file::{
    ComponentFunction, ExportDefaultDecl, FunctionBody, FunctionDecl, ImportDecl, Initializer,
    InterfaceDecl, ReturnStatement, SourceFile, Statement, StatementKind, TypeAliasDecl, VarDecl,
};
pub use tokenizer::{tokenize, Token};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_basic() {
        let source = "import Banner";
        let tokens = tokenize(source);
        assert_eq!(tokens.len(), 2);
    }
}
