//! Pass A: symbol resolution.
//!
//! Binds every identifier expression to a slot in its function's local
//! table. Parameters seed the table; an assignment to a name not yet in the
//! table declares it (there is no separate `var`/`val` declaration syntax
//! today — assignment is how a local comes into existence). Reading a name
//! that has never been declared or assigned is an "unknown symbol" error.
//! There is no module-level or global symbol lookup yet — every reference
//! resolves purely within the enclosing function.

use std::collections::HashMap;

use roc_base::{Span, SpannedError, Symbol};
use roc_syntax::{Expr, FunctionDecl, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalId(pub u32);

#[derive(Default, Debug)]
pub struct LocalTable {
    names: Vec<Symbol>,
    lookup: HashMap<Symbol, LocalId>,
}

impl LocalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: Symbol) -> LocalId {
        if let Some(&id) = self.lookup.get(&name) {
            return id;
        }
        let id = LocalId(self.names.len() as u32);
        self.names.push(name);
        self.lookup.insert(name, id);
        id
    }

    pub fn resolve(&self, name: Symbol) -> Option<LocalId> {
        self.lookup.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

pub(crate) fn node_key<T>(ptr: &T) -> usize {
    ptr as *const T as usize
}

pub fn resolve_function<'ast>(
    func: &FunctionDecl<'ast>,
    locals: &mut HashMap<usize, LocalId>,
) -> (LocalTable, Vec<SpannedError>) {
    let mut table = LocalTable::new();
    let mut errors = Vec::new();
    for param in &func.params {
        table.declare(param.name);
    }
    for stmt in &func.body {
        resolve_stmt(stmt, &mut table, locals, &mut errors);
    }
    (table, errors)
}

fn resolve_stmt<'ast>(
    stmt: &'ast Stmt<'ast>,
    table: &mut LocalTable,
    locals: &mut HashMap<usize, LocalId>,
    errors: &mut Vec<SpannedError>,
) {
    match stmt {
        Stmt::Expr(e) => resolve_expr(e, table, locals, errors),
        Stmt::Return(Some(e), _) => resolve_expr(e, table, locals, errors),
        Stmt::Return(None, _) => {}
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            resolve_expr(cond, table, locals, errors);
            for s in then_branch {
                resolve_stmt(s, table, locals, errors);
            }
            if let Some(branch) = else_branch {
                for s in branch {
                    resolve_stmt(s, table, locals, errors);
                }
            }
        }
        Stmt::While { cond, body, .. } => {
            resolve_expr(cond, table, locals, errors);
            for s in body {
                resolve_stmt(s, table, locals, errors);
            }
        }
        Stmt::For {
            binding,
            iterable,
            body,
            ..
        } => {
            resolve_expr(iterable, table, locals, errors);
            table.declare(*binding);
            for s in body {
                resolve_stmt(s, table, locals, errors);
            }
        }
    }
}

fn resolve_expr<'ast>(
    expr: &'ast Expr<'ast>,
    table: &mut LocalTable,
    locals: &mut HashMap<usize, LocalId>,
    errors: &mut Vec<SpannedError>,
) {
    match expr {
        Expr::IntLit(..) | Expr::FloatLit(..) | Expr::BoolLit(..) | Expr::StringLit(..) => {}
        Expr::Ident(name, span) => match table.resolve(*name) {
            Some(id) => {
                locals.insert(node_key(expr), id);
            }
            None => errors.push(unknown_symbol(*span)),
        },
        Expr::Unary { expr: inner, .. } => resolve_expr(inner, table, locals, errors),
        Expr::Binary { lhs, rhs, .. } => {
            resolve_expr(lhs, table, locals, errors);
            resolve_expr(rhs, table, locals, errors);
        }
        Expr::Assign { name, value, .. } => {
            resolve_expr(value, table, locals, errors);
            let id = table.declare(*name);
            locals.insert(node_key(expr), id);
        }
        Expr::Call { receiver, args, .. } => {
            if let Some(r) = receiver {
                resolve_expr(r, table, locals, errors);
            }
            for a in args {
                resolve_expr(a, table, locals, errors);
            }
        }
        Expr::ArrayLit { elements, .. } => {
            for e in elements {
                resolve_expr(e, table, locals, errors);
            }
        }
    }
}

fn unknown_symbol(span: Span) -> SpannedError {
    SpannedError::new("reference to an undeclared symbol", span)
}
