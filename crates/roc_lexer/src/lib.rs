//! # roc-lexer
//!
//! Tokenizer for the roc surface language.
//!
//! Converts raw source bytes into a stream of [`Token`]s via [`Lexer`]. The
//! lexer is pull-based: `peek`/`advance` scan one token at a time and cache
//! at most one token of lookahead, so parsing never waits on a full
//! pre-scanned vector.
//!
//! ```
//! use roc_base::{Interner, Symbol};
//! use roc_lexer::{Lexer, TokenKind};
//!
//! let mut interner = Interner::new();
//! let mut lexer = Lexer::new("fun main", Symbol::EMPTY);
//! let first = lexer.advance(&mut interner).unwrap();
//! assert!(matches!(first.kind, TokenKind::Keyword(_)));
//! ```

pub mod lexer;
pub mod token;

pub use lexer::{Lexer, LexerCheckpoint};
pub use token::{Float64Bits, Keyword, Punct, Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use roc_base::{Interner, Symbol};

    fn tokens(src: &str) -> Vec<TokenKind> {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(src, Symbol::EMPTY);
        let mut out = Vec::new();
        loop {
            let tok = lexer.advance(&mut interner).unwrap();
            let done = matches!(tok.kind, TokenKind::Eof);
            out.push(tok.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_function_header() {
        let toks = tokens("fun add(a: Int32) -> Int32 {");
        assert!(matches!(toks[0], TokenKind::Keyword(Keyword::Fun)));
        assert!(matches!(toks.last().unwrap(), TokenKind::Eof));
    }

    #[test]
    fn two_char_operators_are_not_split() {
        let toks = tokens("a == b != c <= d >= e");
        let puncts: Vec<_> = toks
            .iter()
            .filter_map(|t| match t {
                TokenKind::Punct(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(
            puncts,
            vec![Punct::EqEq, Punct::NotEq, Punct::LtEq, Punct::GtEq]
        );
    }

    #[test]
    fn arrow_is_single_token() {
        let toks = tokens("->");
        assert!(matches!(toks[0], TokenKind::Punct(Punct::Arrow)));
    }

    #[test]
    fn integer_literal() {
        let toks = tokens("42");
        assert!(matches!(toks[0], TokenKind::Int(42)));
    }

    #[test]
    fn float_literal_from_decimal_point() {
        let toks = tokens("3.5");
        match toks[0] {
            TokenKind::Float(bits) => assert_eq!(bits.0, 3.5),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn float_literal_from_trailing_d_suffix() {
        let toks = tokens("3d");
        match toks[0] {
            TokenKind::Float(bits) => assert_eq!(bits.0, 3.0),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn float_literal_with_scientific_notation() {
        let toks = tokens("1e10");
        match toks[0] {
            TokenKind::Float(bits) => assert_eq!(bits.0, 1e10),
            other => panic!("expected float, got {other:?}"),
        }
    }

    #[test]
    fn malformed_exponent_is_an_error() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("1e", Symbol::EMPTY);
        assert!(lexer.advance(&mut interner).is_err());
    }

    #[test]
    fn string_fragment_keeps_interior_text() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("\"hi there\"", Symbol::EMPTY);
        let tok = lexer.advance(&mut interner).unwrap();
        match tok.kind {
            TokenKind::StringFragment(sym) => assert_eq!(interner.resolve(sym), "hi there"),
            other => panic!("expected string fragment, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("\"abc", Symbol::EMPTY);
        assert!(lexer.advance(&mut interner).is_err());
    }

    #[test]
    fn newline_is_its_own_token() {
        let toks = tokens("a\nb");
        assert!(matches!(toks[1], TokenKind::Newline));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("fun", Symbol::EMPTY);
        let peeked = lexer.peek(&mut interner).unwrap();
        let advanced = lexer.advance(&mut interner).unwrap();
        assert_eq!(peeked.span, advanced.span);
    }

    #[test]
    fn spans_are_monotonic() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("fun add ( )", Symbol::EMPTY);
        let mut last_end = 0usize;
        loop {
            let tok = lexer.advance(&mut interner).unwrap();
            assert!(tok.span.start >= last_end || tok.span.start == last_end);
            last_end = tok.span.end;
            if matches!(tok.kind, TokenKind::Eof) {
                break;
            }
        }
    }
}
