//! Expression typing and call resolution.
//!
//! Every expression node gets exactly one [`roc_types::TypeDescriptor`]
//! recorded by address in [`TypeAnnotations::types`] — this is the
//! "every typed AST expression has an attached type descriptor" invariant.
//! Call sites go through the `Unresolved -> Resolved | Failed` state
//! machine from [`crate::signatures`] and the final verdict is recorded in
//! [`TypeAnnotations::calls`]; there is no second attempt once a verdict is
//! set.

use std::collections::HashMap;

use roc_base::{Interner, Span, SpannedError};
use roc_syntax::{BinOp, Expr, FunctionDecl, Stmt, UnOp};
use roc_types::TypeDescriptor;

use crate::signatures::{type_expr_to_descriptor, CallResolution, SignatureTable, FREE_FUNCTION_OWNER};
use crate::symbols::{node_key, LocalId, LocalTable};

#[derive(Default)]
pub struct TypeAnnotations {
    pub types: HashMap<usize, TypeDescriptor>,
    pub calls: HashMap<usize, CallResolution>,
}

struct Checker<'a> {
    table: &'a LocalTable,
    locals: &'a HashMap<usize, LocalId>,
    local_types: HashMap<LocalId, TypeDescriptor>,
    signatures: &'a SignatureTable,
    interner: &'a Interner,
    return_type: TypeDescriptor,
    annotations: TypeAnnotations,
    errors: Vec<SpannedError>,
}

pub fn check_function(
    func: &FunctionDecl,
    table: &LocalTable,
    locals: &HashMap<usize, LocalId>,
    signatures: &SignatureTable,
    interner: &Interner,
) -> (TypeAnnotations, Vec<SpannedError>) {
    let return_type = func
        .return_type
        .as_ref()
        .map(|t| type_expr_to_descriptor(t, interner))
        .unwrap_or(TypeDescriptor::Unit);

    let mut local_types = HashMap::new();
    for param in &func.params {
        if let Some(id) = table.resolve(param.name) {
            local_types.insert(id, type_expr_to_descriptor(&param.ty, interner));
        }
    }

    let mut checker = Checker {
        table,
        locals,
        local_types,
        signatures,
        interner,
        return_type,
        annotations: TypeAnnotations::default(),
        errors: Vec::new(),
    };

    for stmt in &func.body {
        checker.check_stmt(stmt);
    }

    (checker.annotations, checker.errors)
}

impl<'a> Checker<'a> {
    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => {
                self.check_expr(e);
            }
            Stmt::Return(Some(e), span) => {
                let ty = self.check_expr(e);
                if !ty.matches(&self.return_type) {
                    self.errors.push(SpannedError::new(
                        "returned value does not match the function's declared return type",
                        *span,
                    ));
                }
            }
            Stmt::Return(None, span) => {
                if !matches!(self.return_type, TypeDescriptor::Unit) {
                    self.errors.push(SpannedError::new(
                        "bare `ret` in a function that declares a non-Unit return type",
                        *span,
                    ));
                }
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => {
                self.expect_bool(cond);
                for s in then_branch {
                    self.check_stmt(s);
                }
                if let Some(branch) = else_branch {
                    for s in branch {
                        self.check_stmt(s);
                    }
                }
            }
            Stmt::While { cond, body, .. } => {
                self.expect_bool(cond);
                for s in body {
                    self.check_stmt(s);
                }
            }
            Stmt::For {
                binding,
                iterable,
                body,
                span,
            } => {
                let iter_ty = self.check_expr(iterable);
                let elem_ty = match iter_ty {
                    TypeDescriptor::Array(inner) => *inner,
                    TypeDescriptor::Any => TypeDescriptor::Any,
                    _ => {
                        self.errors.push(SpannedError::new(
                            "`for` can only iterate over an Array value",
                            *span,
                        ));
                        TypeDescriptor::Any
                    }
                };
                if let Some(id) = self.table.resolve(*binding) {
                    self.local_types.insert(id, elem_ty);
                }
                for s in body {
                    self.check_stmt(s);
                }
            }
        }
    }

    fn expect_bool(&mut self, expr: &Expr) {
        let ty = self.check_expr(expr);
        if !matches!(ty, TypeDescriptor::Bool) {
            self.errors
                .push(SpannedError::new("expected a Bool expression", expr.span()));
        }
    }

    fn record(&mut self, expr: &Expr, ty: TypeDescriptor) -> TypeDescriptor {
        self.annotations.types.insert(node_key(expr), ty.clone());
        ty
    }

    fn check_expr(&mut self, expr: &Expr) -> TypeDescriptor {
        match expr {
            Expr::IntLit(..) => self.record(expr, TypeDescriptor::Int32),
            Expr::FloatLit(..) => self.record(expr, TypeDescriptor::Float64),
            Expr::BoolLit(..) => self.record(expr, TypeDescriptor::Bool),
            Expr::StringLit(_, _) => self.record(expr, TypeDescriptor::RawString(None)),
            Expr::Ident(name, span) => {
                let ty = match self.locals.get(&node_key(expr)) {
                    Some(id) => self
                        .local_types
                        .get(id)
                        .cloned()
                        .unwrap_or(TypeDescriptor::Any),
                    None => {
                        self.errors
                            .push(SpannedError::new("use of unresolved symbol", *span));
                        let _ = name;
                        TypeDescriptor::Any
                    }
                };
                self.record(expr, ty)
            }
            Expr::Unary { op, expr: inner, span } => {
                let inner_ty = self.check_expr(inner);
                let ty = match op {
                    UnOp::Not => {
                        if !matches!(inner_ty, TypeDescriptor::Bool) {
                            self.errors.push(SpannedError::new(
                                "unary `!` requires a Bool operand",
                                *span,
                            ));
                        }
                        TypeDescriptor::Bool
                    }
                    UnOp::Neg => {
                        if !inner_ty.is_number() {
                            self.errors.push(SpannedError::new(
                                "unary `-` requires a numeric operand",
                                *span,
                            ));
                        }
                        inner_ty
                    }
                };
                self.record(expr, ty)
            }
            Expr::Binary {
                op,
                lhs,
                rhs,
                span,
            } => {
                let lhs_ty = self.check_expr(lhs);
                let rhs_ty = self.check_expr(rhs);
                let ty = self.check_binary(*op, &lhs_ty, &rhs_ty, *span);
                self.record(expr, ty)
            }
            Expr::Assign { name, value, .. } => {
                let value_ty = self.check_expr(value);
                if let Some(id) = self.locals.get(&node_key(expr)) {
                    if let Some(existing) = self.local_types.get(id) {
                        if !existing.matches(&value_ty) {
                            self.errors.push(SpannedError::new(
                                "assigned value does not match this local's established type",
                                value.span(),
                            ));
                        }
                    } else {
                        self.local_types.insert(*id, value_ty.clone());
                    }
                }
                let _ = name;
                self.record(expr, value_ty)
            }
            Expr::Call {
                receiver,
                name,
                type_args,
                args,
                span,
            } => {
                let receiver_ty = receiver.as_ref().map(|r| self.check_expr(r));
                let arg_types: Vec<TypeDescriptor> =
                    args.iter().map(|a| self.check_expr(a)).collect();

                let resolution = match &receiver_ty {
                    Some(recv) => self.signatures.resolve_method_call(
                        recv.type_id() as i64,
                        *name,
                        args.len(),
                        self.interner,
                    ),
                    None => self
                        .signatures
                        .resolve_free_call(*name, args.len(), self.interner),
                };

                let ty = match &resolution {
                    CallResolution::Resolved(target) if target.is_ccall => {
                        if !matches!(args.first(), Some(Expr::StringLit(_, _))) {
                            self.errors.push(SpannedError::new(
                                "ccall's first argument must be a string literal naming the external function",
                                *span,
                            ));
                        }
                        // The return type comes from the call's own `<T>`
                        // type argument, not from the builtin's registered
                        // signature — `ccall`'s declared `Any` return is
                        // only a placeholder for calls with no type arg.
                        match type_args.first() {
                            Some(t) => type_expr_to_descriptor(t, self.interner),
                            None => target.return_type.clone(),
                        }
                    }
                    CallResolution::Resolved(target) => {
                        if !target.var_args {
                            for (arg_ty, param_ty) in arg_types.iter().zip(&target.param_types) {
                                if !arg_ty.matches(param_ty) {
                                    self.errors.push(SpannedError::new(
                                        "argument type does not match the target parameter type",
                                        *span,
                                    ));
                                }
                            }
                        }
                        target.return_type.clone()
                    }
                    CallResolution::Failed(reason) => {
                        self.errors.push(SpannedError::new(reason.clone(), *span));
                        TypeDescriptor::Any
                    }
                    CallResolution::Unresolved => unreachable!("resolution always terminates"),
                };

                self.annotations.calls.insert(node_key(expr), resolution);
                let _ = FREE_FUNCTION_OWNER;
                self.record(expr, ty)
            }
            Expr::ArrayLit { elements, span } => {
                let ty = self.check_array_lit(elements, *span);
                self.record(expr, ty)
            }
        }
    }

    fn check_array_lit(&mut self, elements: &[&Expr], span: Span) -> TypeDescriptor {
        let mut elem_types = Vec::with_capacity(elements.len());
        for e in elements {
            elem_types.push(self.check_expr(e));
        }
        let Some(first) = elem_types.first().cloned() else {
            return TypeDescriptor::Array(Box::new(TypeDescriptor::Any));
        };
        for ty in &elem_types[1..] {
            if ty.type_id() != first.type_id() {
                self.errors.push(SpannedError::new(
                    "array literal elements must all share the same type",
                    span,
                ));
                break;
            }
        }
        TypeDescriptor::Array(Box::new(first))
    }

    fn check_binary(
        &mut self,
        op: BinOp,
        lhs: &TypeDescriptor,
        rhs: &TypeDescriptor,
        span: Span,
    ) -> TypeDescriptor {
        match op {
            BinOp::Add if lhs.is_string() && rhs.is_string() => lhs.clone(),
            BinOp::Add if lhs.is_string() != rhs.is_string() => {
                self.errors.push(SpannedError::new(
                    "`+` cannot mix a string operand with a non-string operand",
                    span,
                ));
                TypeDescriptor::Any
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Mod | BinOp::Pow => {
                if !lhs.is_number() || !rhs.is_number() {
                    self.errors.push(SpannedError::new(
                        "arithmetic operator requires numeric operands",
                        span,
                    ));
                    return TypeDescriptor::Any;
                }
                numeric_promotion(lhs, rhs)
            }
            BinOp::Div => {
                if !lhs.is_number() || !rhs.is_number() {
                    self.errors.push(SpannedError::new(
                        "arithmetic operator requires numeric operands",
                        span,
                    ));
                }
                TypeDescriptor::Float64
            }
            BinOp::Eq | BinOp::NotEq => {
                if !lhs.matches(rhs) {
                    self.errors.push(SpannedError::new(
                        "comparison operands must have the same type",
                        span,
                    ));
                }
                TypeDescriptor::Bool
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                if !lhs.is_number() || !rhs.is_number() {
                    self.errors.push(SpannedError::new(
                        "relational operator requires numeric operands",
                        span,
                    ));
                }
                TypeDescriptor::Bool
            }
            BinOp::And | BinOp::Or => {
                if !matches!(lhs, TypeDescriptor::Bool) || !matches!(rhs, TypeDescriptor::Bool) {
                    self.errors.push(SpannedError::new(
                        "logical operator requires Bool operands",
                        span,
                    ));
                }
                TypeDescriptor::Bool
            }
        }
    }
}

/// Int32 < Int64 < Float32 < Float64; the wider operand wins.
fn numeric_promotion(a: &TypeDescriptor, b: &TypeDescriptor) -> TypeDescriptor {
    fn rank(t: &TypeDescriptor) -> u8 {
        match t {
            TypeDescriptor::Int32 => 0,
            TypeDescriptor::Int64 => 1,
            TypeDescriptor::Float32 => 2,
            TypeDescriptor::Float64 => 3,
            _ => 0,
        }
    }
    if rank(a) >= rank(b) {
        a.clone()
    } else {
        b.clone()
    }
}
