//! # roc-syntax
//!
//! Abstract syntax tree and recursive-descent parser for the roc surface
//! language.
//!
//! ```
//! use roc_base::{Interner, Symbol};
//! use roc_syntax::ast::Ast;
//! use roc_syntax::parser::Parser;
//!
//! let mut interner = Interner::new();
//! let ast = Ast::new();
//! let mut parser = Parser::new("package main\nfun main() -> Int32 {\nret 0\n}", Symbol::EMPTY, &ast);
//! let module = parser.parse_module(&mut interner).unwrap();
//! assert_eq!(module.functions.len(), 1);
//! ```

pub mod ast;
pub mod parser;

pub use ast::{Ast, BinOp, Expr, FunctionDecl, Import, Module, Param, Stmt, TypeExpr, UnOp};
pub use parser::Parser;

#[cfg(test)]
mod tests {
    use super::*;
    use roc_base::Interner;

    fn parse(src: &str) -> Result<usize, String> {
        let mut interner = Interner::new();
        let ast = Ast::new();
        let mut parser = Parser::new(src, roc_base::Symbol::EMPTY, &ast);
        parser
            .parse_module(&mut interner)
            .map(|m| m.functions.len())
            .map_err(|e| e.message)
    }

    #[test]
    fn requires_leading_package_declaration() {
        let mut interner = Interner::new();
        let ast = Ast::new();
        let mut parser = Parser::new("fun main() {\nret\n}", roc_base::Symbol::EMPTY, &ast);
        assert!(parser.parse_module(&mut interner).is_err());
    }

    #[test]
    fn parses_literal_returning_function() {
        let count = parse("package main\nfun answer() -> Int32 {\nret 42\n}").unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn parses_two_parameter_function() {
        let count =
            parse("package main\nfun add(a: Int32, b: Int32) -> Int32 {\nret a + b\n}").unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn parses_if_else_and_while() {
        let src = "package main\nfun run() -> Int32 {\nif true {\nret 1\n} else {\nret 0\n}\n}";
        assert!(parse(src).is_ok());
    }

    #[test]
    fn parses_for_in_loop() {
        let src = "package main\nfun run() {\nfor x in xs {\nret\n}\n}";
        assert!(parse(src).is_ok());
    }

    #[test]
    fn ret_without_preceding_newline_is_a_syntax_error() {
        let src = "package main\nfun run() -> Int32 {\nif true { ret 1 } ret 0\n}";
        assert!(parse(src).is_err());
    }

    #[test]
    fn method_call_chain_parses() {
        let src = "package main\nfun run() {\nprintln(a.toString())\n}";
        assert!(parse(src).is_ok());
    }

    #[test]
    fn generic_call_does_not_swallow_relational_expression() {
        let src = "package main\nfun run() -> Bool {\nret a < b\n}";
        assert!(parse(src).is_ok());
    }

    #[test]
    fn bare_call_with_generic_type_argument_parses() {
        let src = "package main\nfun run() -> Int32 {\nret ccall<Int32>(\"helper\")\n}";
        assert!(parse(src).is_ok());
    }

    #[test]
    fn bare_relational_comparison_is_not_swallowed_by_generic_call_parsing() {
        let src = "package main\nfun run(a: Int32, b: Int32) -> Bool {\nret a < b\n}";
        assert!(parse(src).is_ok());
    }

    #[test]
    fn array_literal_parses() {
        let src = "package main\nfun run() {\nret [1, 2, 3]\n}";
        assert!(parse(src).is_ok());
    }

    #[test]
    fn assignment_expression_parses() {
        let src = "package main\nfun run() {\nx = 5\n}";
        assert!(parse(src).is_ok());
    }
}
