use roc_base::{Interner, Result, Span, SpannedError, Symbol};

use crate::token::{Float64Bits, Keyword, Punct, Token, TokenKind};

fn resolve_word(word: &str) -> Option<Keyword> {
    Some(match word {
        "fun" => Keyword::Fun,
        "ret" => Keyword::Ret,
        "if" => Keyword::If,
        "else" => Keyword::Else,
        "while" => Keyword::While,
        "for" => Keyword::For,
        "in" => Keyword::In,
        "true" => Keyword::True,
        "false" => Keyword::False,
        "and" => Keyword::And,
        "or" => Keyword::Or,
        "import" => Keyword::Import,
        "package" => Keyword::Package,
        "struct" => Keyword::Struct,
        "trait" => Keyword::Trait,
        "enum" => Keyword::Enum,
        "match" => Keyword::Match,
        "var" => Keyword::Var,
        "val" => Keyword::Val,
        _ => return None,
    })
}

/// Pull-based tokenizer over one source file's bytes.
///
/// `peek` and `advance` are the only two operations the parser needs: `peek`
/// scans and caches the next token without consuming it, `advance` returns
/// the cached token (scanning one if nothing is cached) and clears the
/// cache. Whitespace and newline tokens are produced like any other token —
/// the parser decides which of those to skip.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    file: Symbol,
    lookahead: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: Symbol) -> Self {
        Lexer {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            file,
            lookahead: None,
        }
    }

    pub fn peek(&mut self, interner: &mut Interner) -> Result<Token> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.scan_one(interner)?);
        }
        Ok(self.lookahead.unwrap())
    }

    pub fn advance(&mut self, interner: &mut Interner) -> Result<Token> {
        if let Some(tok) = self.lookahead.take() {
            return Ok(tok);
        }
        self.scan_one(interner)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        Some(b)
    }

    fn scan_one(&mut self, interner: &mut Interner) -> Result<Token> {
        let start = self.pos;
        let Some(b) = self.peek_byte() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
            });
        };

        if b == b'\n' {
            self.pos += 1;
            return Ok(self.tok(TokenKind::Newline, start));
        }
        if b == b' ' || b == b'\t' || b == b'\r' {
            while matches!(self.peek_byte(), Some(b' ') | Some(b'\t') | Some(b'\r')) {
                self.pos += 1;
            }
            return Ok(self.tok(TokenKind::Whitespace, start));
        }
        if b == b'"' {
            return self.scan_string(interner, start);
        }
        if b.is_ascii_digit() {
            return self.scan_number(start);
        }
        if b.is_ascii_alphabetic() || b == b'_' {
            return self.scan_word(interner, start);
        }

        self.scan_punct(start)
    }

    fn tok(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    fn scan_word(&mut self, interner: &mut Interner, start: usize) -> Result<Token> {
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];
        let kind = match resolve_word(text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(interner.intern(text)),
        };
        Ok(self.tok(kind, start))
    }

    fn scan_number(&mut self, start: usize) -> Result<Token> {
        while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        if self.peek_byte() == Some(b'.') && matches!(self.peek_byte_at(1), Some(b) if b.is_ascii_digit())
        {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if !matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                return Err(SpannedError::new(
                    "malformed scientific-notation literal: expected digits after exponent marker",
                    Span::new(start, self.pos),
                ));
            }
            is_float = true;
            while matches!(self.peek_byte(), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
            let _ = mark;
        }
        if self.peek_byte() == Some(b'd') || self.peek_byte() == Some(b'D') {
            is_float = true;
            self.pos += 1;
        }

        let text = &self.source[start..self.pos];
        let trimmed = text.trim_end_matches(['d', 'D']);
        if is_float {
            let value: f64 = trimmed.parse().map_err(|_| {
                SpannedError::new(
                    format!("malformed floating-point literal `{text}`"),
                    Span::new(start, self.pos),
                )
            })?;
            Ok(self.tok(TokenKind::Float(Float64Bits(value)), start))
        } else {
            let value: i64 = trimmed.parse().map_err(|_| {
                SpannedError::new(
                    format!("integer literal `{text}` out of range"),
                    Span::new(start, self.pos),
                )
            })?;
            Ok(self.tok(TokenKind::Int(value), start))
        }
    }

    fn scan_string(&mut self, interner: &mut Interner, start: usize) -> Result<Token> {
        self.pos += 1; // opening quote
        let content_start = self.pos;
        loop {
            match self.bump() {
                Some(b'"') => break,
                Some(_) => continue,
                None => {
                    return Err(SpannedError::new(
                        "unterminated string literal",
                        Span::new(start, self.pos),
                    ))
                }
            }
        }
        let content_end = self.pos - 1;
        let text = &self.source[content_start..content_end];
        let sym = interner.intern(text);
        Ok(self.tok(TokenKind::StringFragment(sym), start))
    }

    fn scan_punct(&mut self, start: usize) -> Result<Token> {
        let b = self.bump().expect("checked by caller");
        let two = |this: &mut Self, second: u8, then: Punct, otherwise: Punct| {
            if this.peek_byte() == Some(second) {
                this.pos += 1;
                then
            } else {
                otherwise
            }
        };
        let punct = match b {
            b'(' => Punct::LParen,
            b')' => Punct::RParen,
            b'{' => Punct::LBrace,
            b'}' => Punct::RBrace,
            b'[' => Punct::LBracket,
            b']' => Punct::RBracket,
            b',' => Punct::Comma,
            b'.' => Punct::Dot,
            b':' => Punct::Colon,
            b';' => Punct::Semicolon,
            b'=' => two(self, b'=', Punct::EqEq, Punct::Eq),
            b'!' => two(self, b'=', Punct::NotEq, Punct::Bang),
            b'<' => two(self, b'=', Punct::LtEq, Punct::Lt),
            b'>' => two(self, b'=', Punct::GtEq, Punct::Gt),
            b'+' => Punct::Plus,
            b'-' => {
                if self.peek_byte() == Some(b'>') {
                    self.pos += 1;
                    Punct::Arrow
                } else {
                    Punct::Minus
                }
            }
            b'*' => Punct::Star,
            b'/' => Punct::Slash,
            b'%' => Punct::Percent,
            b'^' => Punct::Caret,
            other => {
                return Err(SpannedError::new(
                    format!("unexpected character `{}`", other as char),
                    Span::new(start, self.pos),
                ))
            }
        };
        Ok(self.tok(TokenKind::Punct(punct), start))
    }

    pub fn file(&self) -> Symbol {
        self.file
    }

    /// Snapshot of cursor state for speculative parsing (the generic-call
    /// vs. relational-operator ambiguity is resolved by trying one path and
    /// rewinding to this checkpoint if it fails).
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            pos: self.pos,
            lookahead: self.lookahead,
        }
    }

    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.pos = checkpoint.pos;
        self.lookahead = checkpoint.lookahead;
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LexerCheckpoint {
    pos: usize,
    lookahead: Option<Token>,
}
