//! Recursive-descent, operator-precedence-climbing parser.
//!
//! The first syntax error aborts parsing of the current module; the caller
//! (typically the compile driver, one invocation per source file) decides
//! how to accumulate results across modules.

use roc_base::{Interner, Result, Span, SpannedError, Symbol};
use roc_lexer::{Keyword, Lexer, Punct, Token, TokenKind};

use crate::ast::{Ast, BinOp, Expr, FunctionDecl, Import, Module, Param, Stmt, TypeExpr, UnOp};

pub struct Parser<'src, 'ast> {
    lexer: Lexer<'src>,
    ast: &'ast Ast<'ast>,
    lookahead: Option<(Token, bool)>,
}

impl<'src, 'ast> Parser<'src, 'ast> {
    pub fn new(source: &'src str, file: Symbol, ast: &'ast Ast<'ast>) -> Self {
        Parser {
            lexer: Lexer::new(source, file),
            ast,
            lookahead: None,
        }
    }

    fn fill(&mut self, interner: &mut Interner) -> Result<()> {
        if self.lookahead.is_some() {
            return Ok(());
        }
        let mut newline_before = false;
        loop {
            let tok = self.lexer.advance(interner)?;
            match tok.kind {
                TokenKind::Whitespace => continue,
                TokenKind::Newline => {
                    newline_before = true;
                    continue;
                }
                _ => {
                    self.lookahead = Some((tok, newline_before));
                    return Ok(());
                }
            }
        }
    }

    fn peek(&mut self, interner: &mut Interner) -> Result<Token> {
        self.fill(interner)?;
        Ok(self.lookahead.unwrap().0)
    }

    fn newline_before_peek(&mut self, interner: &mut Interner) -> Result<bool> {
        self.fill(interner)?;
        Ok(self.lookahead.unwrap().1)
    }

    fn bump(&mut self, interner: &mut Interner) -> Result<Token> {
        self.fill(interner)?;
        Ok(self.lookahead.take().unwrap().0)
    }

    fn expect_punct(&mut self, p: Punct, interner: &mut Interner) -> Result<Token> {
        let tok = self.bump(interner)?;
        if tok.kind == TokenKind::Punct(p) {
            Ok(tok)
        } else {
            Err(SpannedError::new(
                format!("expected `{}`, found {:?}", punct_text(p), tok.kind),
                tok.span,
            ))
        }
    }

    fn expect_keyword(&mut self, k: Keyword, interner: &mut Interner) -> Result<Token> {
        let tok = self.bump(interner)?;
        if tok.kind == TokenKind::Keyword(k) {
            Ok(tok)
        } else {
            Err(SpannedError::new(
                format!("expected `{}`, found {:?}", k.text(), tok.kind),
                tok.span,
            ))
        }
    }

    fn expect_ident(&mut self, interner: &mut Interner) -> Result<(Symbol, Span)> {
        let tok = self.bump(interner)?;
        match tok.kind {
            TokenKind::Ident(sym) => Ok((sym, tok.span)),
            other => Err(SpannedError::new(
                format!("expected identifier, found {other:?}"),
                tok.span,
            )),
        }
    }

    fn at_punct(&mut self, p: Punct, interner: &mut Interner) -> Result<bool> {
        Ok(self.peek(interner)?.kind == TokenKind::Punct(p))
    }

    fn at_keyword(&mut self, k: Keyword, interner: &mut Interner) -> Result<bool> {
        Ok(self.peek(interner)?.kind == TokenKind::Keyword(k))
    }

    // ---- module ----

    pub fn parse_module(&mut self, interner: &mut Interner) -> Result<Module<'ast>> {
        let start = self.peek(interner)?.span;
        self.expect_keyword(Keyword::Package, interner)?;
        let (package, _) = self.expect_ident(interner)?;

        let mut imports = Vec::new();
        while self.at_keyword(Keyword::Import, interner)? {
            imports.push(self.parse_import(interner)?);
        }

        let mut functions = Vec::new();
        loop {
            if self.peek(interner)?.kind == TokenKind::Eof {
                break;
            }
            functions.push(self.parse_function(interner)?);
        }
        let end = imports
            .last()
            .map(|i| i.span)
            .into_iter()
            .chain(functions.last().map(|f| f.span))
            .last()
            .unwrap_or(start);

        Ok(Module {
            package,
            imports,
            functions,
            span: start.merge(end),
        })
    }

    fn parse_import(&mut self, interner: &mut Interner) -> Result<Import> {
        let start = self.expect_keyword(Keyword::Import, interner)?.span;
        let mut parts = Vec::new();
        let (first, first_span) = self.expect_ident(interner)?;
        parts.push(interner.resolve(first).to_string());
        let mut end = first_span;
        while self.at_punct(Punct::Dot, interner)? {
            self.bump(interner)?;
            let (sym, span) = self.expect_ident(interner)?;
            parts.push(interner.resolve(sym).to_string());
            end = span;
        }
        let joined = parts.join(".");
        Ok(Import {
            path: interner.intern(&joined),
            span: start.merge(end),
        })
    }

    // ---- functions ----

    fn parse_function(&mut self, interner: &mut Interner) -> Result<FunctionDecl<'ast>> {
        let start = self.expect_keyword(Keyword::Fun, interner)?.span;
        let (name, _) = self.expect_ident(interner)?;

        self.expect_punct(Punct::LParen, interner)?;
        let mut params = Vec::new();
        if !self.at_punct(Punct::RParen, interner)? {
            loop {
                params.push(self.parse_param(interner)?);
                if self.at_punct(Punct::Comma, interner)? {
                    self.bump(interner)?;
                    continue;
                }
                break;
            }
        }
        self.expect_punct(Punct::RParen, interner)?;

        let return_type = if self.at_punct(Punct::Arrow, interner)? {
            self.bump(interner)?;
            Some(self.parse_type_expr(interner)?)
        } else {
            None
        };

        let body = self.parse_block(interner)?;
        let end = body.last().map(|s| s.span()).unwrap_or(start);
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            span: start.merge(end),
        })
    }

    fn parse_param(&mut self, interner: &mut Interner) -> Result<Param> {
        let (name, start) = self.expect_ident(interner)?;
        self.expect_punct(Punct::Colon, interner)?;
        let ty = self.parse_type_expr(interner)?;
        Ok(Param {
            name,
            ty,
            span: start,
        })
    }

    fn parse_type_expr(&mut self, interner: &mut Interner) -> Result<TypeExpr> {
        if self.at_punct(Punct::LBracket, interner)? {
            self.bump(interner)?;
            self.expect_punct(Punct::RBracket, interner)?;
            let inner = self.parse_type_expr(interner)?;
            return Ok(TypeExpr::Array(Box::new(inner)));
        }
        let (name, _) = self.expect_ident(interner)?;
        Ok(TypeExpr::Named(name))
    }

    // ---- statements ----

    fn parse_block(&mut self, interner: &mut Interner) -> Result<Vec<&'ast Stmt<'ast>>> {
        self.expect_punct(Punct::LBrace, interner)?;
        let mut stmts = Vec::new();
        let mut is_first = true;
        loop {
            if self.at_punct(Punct::RBrace, interner)? {
                break;
            }
            stmts.push(self.parse_stmt(interner, is_first)?);
            is_first = false;
        }
        self.expect_punct(Punct::RBrace, interner)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self, interner: &mut Interner, is_first: bool) -> Result<&'ast Stmt<'ast>> {
        let tok = self.peek(interner)?;
        match tok.kind {
            TokenKind::Keyword(Keyword::Ret) => self.parse_return(interner, is_first),
            TokenKind::Keyword(Keyword::If) => self.parse_if(interner),
            TokenKind::Keyword(Keyword::While) => self.parse_while(interner),
            TokenKind::Keyword(Keyword::For) => self.parse_for(interner),
            _ => {
                let expr = self.parse_expr(interner)?;
                Ok(self.ast.alloc_stmt(Stmt::Expr(expr)))
            }
        }
    }

    fn parse_return(&mut self, interner: &mut Interner, is_first: bool) -> Result<&'ast Stmt<'ast>> {
        if !is_first && !self.newline_before_peek(interner)? {
            let span = self.peek(interner)?.span;
            return Err(SpannedError::new(
                "`ret` must be the first token on its line",
                span,
            ));
        }
        let start = self.bump(interner)?.span; // `ret`
        let at_block_end = self.at_punct(Punct::RBrace, interner)?;
        if at_block_end {
            return Ok(self.ast.alloc_stmt(Stmt::Return(None, start)));
        }
        let expr = self.parse_expr(interner)?;
        let span = start.merge(expr.span());
        Ok(self.ast.alloc_stmt(Stmt::Return(Some(expr), span)))
    }

    fn parse_if(&mut self, interner: &mut Interner) -> Result<&'ast Stmt<'ast>> {
        let start = self.expect_keyword(Keyword::If, interner)?.span;
        let cond = self.parse_expr(interner)?;
        let then_branch = self.parse_block(interner)?;
        let mut end = then_branch.last().map(|s| s.span()).unwrap_or(start);

        let else_branch = if self.at_keyword(Keyword::Else, interner)? {
            self.bump(interner)?;
            let branch = if self.at_keyword(Keyword::If, interner)? {
                vec![self.parse_if(interner)?]
            } else {
                self.parse_block(interner)?
            };
            end = branch.last().map(|s| s.span()).unwrap_or(end);
            Some(branch)
        } else {
            None
        };

        Ok(self.ast.alloc_stmt(Stmt::If {
            cond,
            then_branch,
            else_branch,
            span: start.merge(end),
        }))
    }

    fn parse_while(&mut self, interner: &mut Interner) -> Result<&'ast Stmt<'ast>> {
        let start = self.expect_keyword(Keyword::While, interner)?.span;
        let cond = self.parse_expr(interner)?;
        let body = self.parse_block(interner)?;
        let end = body.last().map(|s| s.span()).unwrap_or(start);
        Ok(self.ast.alloc_stmt(Stmt::While {
            cond,
            body,
            span: start.merge(end),
        }))
    }

    fn parse_for(&mut self, interner: &mut Interner) -> Result<&'ast Stmt<'ast>> {
        let start = self.expect_keyword(Keyword::For, interner)?.span;
        let (binding, _) = self.expect_ident(interner)?;
        self.expect_keyword(Keyword::In, interner)?;
        let iterable = self.parse_expr(interner)?;
        let body = self.parse_block(interner)?;
        let end = body.last().map(|s| s.span()).unwrap_or(start);
        Ok(self.ast.alloc_stmt(Stmt::For {
            binding,
            iterable,
            body,
            span: start.merge(end),
        }))
    }

    // ---- expressions ----
    //
    // Precedence climbing, lowest to highest: assignment, logical-or,
    // logical-and, equality, relational, additive, multiplicative (incl.
    // modulus), then unary-not/exponent sharing the top level. Everything
    // is left-associative except exponentiation.

    pub fn parse_expr(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        self.parse_assignment(interner)
    }

    fn parse_assignment(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let checkpoint = self.lexer.checkpoint();
        let saved_lookahead = self.lookahead;
        if let TokenKind::Ident(name) = self.peek(interner)?.kind {
            let start = self.bump(interner)?.span;
            if self.at_punct(Punct::Eq, interner)? {
                self.bump(interner)?;
                let value = self.parse_assignment(interner)?;
                let span = start.merge(value.span());
                return Ok(self.ast.alloc_expr(Expr::Assign { name, value, span }));
            }
            self.lexer.restore(checkpoint);
            self.lookahead = saved_lookahead;
        }
        self.parse_or(interner)
    }

    fn parse_or(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let mut lhs = self.parse_and(interner)?;
        while self.at_keyword(Keyword::Or, interner)? {
            self.bump(interner)?;
            let rhs = self.parse_and(interner)?;
            let span = lhs.span().merge(rhs.span());
            lhs = self.ast.alloc_expr(Expr::Binary {
                op: BinOp::Or,
                lhs,
                rhs,
                span,
            });
        }
        Ok(lhs)
    }

    fn parse_and(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let mut lhs = self.parse_equality(interner)?;
        while self.at_keyword(Keyword::And, interner)? {
            self.bump(interner)?;
            let rhs = self.parse_equality(interner)?;
            let span = lhs.span().merge(rhs.span());
            lhs = self.ast.alloc_expr(Expr::Binary {
                op: BinOp::And,
                lhs,
                rhs,
                span,
            });
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let mut lhs = self.parse_relational(interner)?;
        loop {
            let op = match self.peek(interner)?.kind {
                TokenKind::Punct(Punct::EqEq) => BinOp::Eq,
                TokenKind::Punct(Punct::NotEq) => BinOp::NotEq,
                _ => break,
            };
            self.bump(interner)?;
            let rhs = self.parse_relational(interner)?;
            let span = lhs.span().merge(rhs.span());
            lhs = self.ast.alloc_expr(Expr::Binary { op, lhs, rhs, span });
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let mut lhs = self.parse_additive(interner)?;
        loop {
            let op = match self.peek(interner)?.kind {
                TokenKind::Punct(Punct::Lt) => BinOp::Lt,
                TokenKind::Punct(Punct::LtEq) => BinOp::Le,
                TokenKind::Punct(Punct::Gt) => BinOp::Gt,
                TokenKind::Punct(Punct::GtEq) => BinOp::Ge,
                _ => break,
            };
            self.bump(interner)?;
            let rhs = self.parse_additive(interner)?;
            let span = lhs.span().merge(rhs.span());
            lhs = self.ast.alloc_expr(Expr::Binary { op, lhs, rhs, span });
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let mut lhs = self.parse_multiplicative(interner)?;
        loop {
            let op = match self.peek(interner)?.kind {
                TokenKind::Punct(Punct::Plus) => BinOp::Add,
                TokenKind::Punct(Punct::Minus) => BinOp::Sub,
                _ => break,
            };
            self.bump(interner)?;
            let rhs = self.parse_multiplicative(interner)?;
            let span = lhs.span().merge(rhs.span());
            lhs = self.ast.alloc_expr(Expr::Binary { op, lhs, rhs, span });
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let mut lhs = self.parse_unary(interner)?;
        loop {
            let op = match self.peek(interner)?.kind {
                TokenKind::Punct(Punct::Star) => BinOp::Mul,
                TokenKind::Punct(Punct::Slash) => BinOp::Div,
                TokenKind::Punct(Punct::Percent) => BinOp::Mod,
                _ => break,
            };
            self.bump(interner)?;
            let rhs = self.parse_unary(interner)?;
            let span = lhs.span().merge(rhs.span());
            lhs = self.ast.alloc_expr(Expr::Binary { op, lhs, rhs, span });
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        match self.peek(interner)?.kind {
            TokenKind::Punct(Punct::Bang) => {
                let start = self.bump(interner)?.span;
                let expr = self.parse_unary(interner)?;
                let span = start.merge(expr.span());
                Ok(self.ast.alloc_expr(Expr::Unary {
                    op: UnOp::Not,
                    expr,
                    span,
                }))
            }
            TokenKind::Punct(Punct::Minus) => {
                let start = self.bump(interner)?.span;
                let expr = self.parse_unary(interner)?;
                let span = start.merge(expr.span());
                Ok(self.ast.alloc_expr(Expr::Unary {
                    op: UnOp::Neg,
                    expr,
                    span,
                }))
            }
            _ => self.parse_exponent(interner),
        }
    }

    fn parse_exponent(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let base = self.parse_postfix(interner)?;
        if self.at_punct(Punct::Caret, interner)? {
            self.bump(interner)?;
            let exponent = self.parse_unary(interner)?; // right-associative
            let span = base.span().merge(exponent.span());
            return Ok(self.ast.alloc_expr(Expr::Binary {
                op: BinOp::Pow,
                lhs: base,
                rhs: exponent,
                span,
            }));
        }
        Ok(base)
    }

    fn parse_postfix(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let mut expr = self.parse_primary(interner)?;
        loop {
            if self.at_punct(Punct::Dot, interner)? {
                self.bump(interner)?;
                let (name, name_span) = self.expect_ident(interner)?;
                let type_args = self.try_parse_generic_args(interner)?;
                self.expect_punct(Punct::LParen, interner)?;
                let args = self.parse_call_args(interner)?;
                let end = self.expect_punct(Punct::RParen, interner)?.span;
                let span = expr.span().merge(name_span).merge(end);
                expr = self.ast.alloc_expr(Expr::Call {
                    receiver: Some(expr),
                    name,
                    type_args,
                    args,
                    span,
                });
                continue;
            }
            break;
        }
        Ok(expr)
    }

    /// Attempts to parse `<Type, Type, ...>` as call-site generic
    /// arguments. Committing requires the token right after the matching
    /// `>` to be `(` — otherwise `<` is backtracked and left for the
    /// relational-operator parser to consume instead.
    fn try_parse_generic_args(&mut self, interner: &mut Interner) -> Result<Vec<TypeExpr>> {
        if !self.at_punct(Punct::Lt, interner)? {
            return Ok(Vec::new());
        }
        let checkpoint = self.lexer.checkpoint();
        let saved_lookahead = self.lookahead;

        let attempt = (|| -> Result<Vec<TypeExpr>> {
            self.bump(interner)?; // `<`
            let mut args = Vec::new();
            if !self.at_punct(Punct::Gt, interner)? {
                loop {
                    args.push(self.parse_type_expr(interner)?);
                    if self.at_punct(Punct::Comma, interner)? {
                        self.bump(interner)?;
                        continue;
                    }
                    break;
                }
            }
            self.expect_punct(Punct::Gt, interner)?;
            Ok(args)
        })();

        match attempt {
            Ok(args) if self.at_punct(Punct::LParen, interner).unwrap_or(false) => Ok(args),
            _ => {
                self.lexer.restore(checkpoint);
                self.lookahead = saved_lookahead;
                Ok(Vec::new())
            }
        }
    }

    fn parse_call_args(&mut self, interner: &mut Interner) -> Result<Vec<&'ast Expr<'ast>>> {
        let mut args = Vec::new();
        if self.at_punct(Punct::RParen, interner)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(interner)?);
            if self.at_punct(Punct::Comma, interner)? {
                self.bump(interner)?;
                continue;
            }
            break;
        }
        Ok(args)
    }

    fn parse_primary(&mut self, interner: &mut Interner) -> Result<&'ast Expr<'ast>> {
        let tok = self.bump(interner)?;
        match tok.kind {
            TokenKind::Int(v) => Ok(self.ast.alloc_expr(Expr::IntLit(v, tok.span))),
            TokenKind::Float(bits) => Ok(self.ast.alloc_expr(Expr::FloatLit(bits.0, tok.span))),
            TokenKind::Keyword(Keyword::True) => {
                Ok(self.ast.alloc_expr(Expr::BoolLit(true, tok.span)))
            }
            TokenKind::Keyword(Keyword::False) => {
                Ok(self.ast.alloc_expr(Expr::BoolLit(false, tok.span)))
            }
            TokenKind::StringFragment(sym) => {
                Ok(self.ast.alloc_expr(Expr::StringLit(sym, tok.span)))
            }
            TokenKind::Punct(Punct::LParen) => {
                let inner = self.parse_expr(interner)?;
                self.expect_punct(Punct::RParen, interner)?;
                Ok(inner)
            }
            TokenKind::Punct(Punct::LBracket) => self.parse_array_lit(interner, tok.span),
            TokenKind::Ident(name) => {
                let type_args = self.try_parse_generic_args(interner)?;
                if !type_args.is_empty() || self.at_punct(Punct::LParen, interner)? {
                    self.expect_punct(Punct::LParen, interner)?;
                    let args = self.parse_call_args(interner)?;
                    let end = self.expect_punct(Punct::RParen, interner)?.span;
                    Ok(self.ast.alloc_expr(Expr::Call {
                        receiver: None,
                        name,
                        type_args,
                        args,
                        span: tok.span.merge(end),
                    }))
                } else {
                    Ok(self.ast.alloc_expr(Expr::Ident(name, tok.span)))
                }
            }
            other => Err(SpannedError::new(
                format!("unexpected token in expression: {other:?}"),
                tok.span,
            )),
        }
    }

    fn parse_array_lit(&mut self, interner: &mut Interner, start: Span) -> Result<&'ast Expr<'ast>> {
        let mut elements = Vec::new();
        if !self.at_punct(Punct::RBracket, interner)? {
            loop {
                elements.push(self.parse_expr(interner)?);
                if self.at_punct(Punct::Comma, interner)? {
                    self.bump(interner)?;
                    continue;
                }
                break;
            }
        }
        let end = self.expect_punct(Punct::RBracket, interner)?.span;
        Ok(self.ast.alloc_expr(Expr::ArrayLit {
            elements,
            span: start.merge(end),
        }))
    }
}

fn punct_text(p: Punct) -> &'static str {
    match p {
        Punct::LParen => "(",
        Punct::RParen => ")",
        Punct::LBrace => "{",
        Punct::RBrace => "}",
        Punct::LBracket => "[",
        Punct::RBracket => "]",
        Punct::Comma => ",",
        Punct::Dot => ".",
        Punct::Colon => ":",
        Punct::Semicolon => ";",
        Punct::Arrow => "->",
        Punct::Eq => "=",
        Punct::EqEq => "==",
        Punct::NotEq => "!=",
        Punct::Lt => "<",
        Punct::LtEq => "<=",
        Punct::Gt => ">",
        Punct::GtEq => ">=",
        Punct::Plus => "+",
        Punct::Minus => "-",
        Punct::Star => "*",
        Punct::Slash => "/",
        Punct::Percent => "%",
        Punct::Bang => "!",
        Punct::Caret => "^",
    }
}
