//! AST → MIR lowering.
//!
//! Each function lowers to one flat, linear [`MIRBlock`]; `if`/`while`/`for`
//! become `Label`/`If`/`JumpOver` pseudo-branches inline in that list rather
//! than a tree of nested blocks — closer to how a bytecode emitter works
//! than to a basic-block CFG. Labels are assigned raw, non-dense numbers
//! here (reusing the value-id counter, so they're unique but full of gaps);
//! [`crate::passes::labels`] compacts them afterward.
//!
//! `for x in iterable { body }` desugars here into an index-driven `while`
//! over the iterable's length — there is no separate `MIRValue` for
//! iteration.

use roc_base::{Interner, Symbol};
use roc_sema::{CallResolution, FunctionAnalysis, LocalId, ModuleAnalysis};
use roc_syntax::{BinOp, Expr, FunctionDecl, Module, Stmt, UnOp};
use roc_types::TypeDescriptor;

use crate::mir::{
    AllocationSpace, CallSignature, MIRBlock, MIRFunction, MIRModule, MIRValue, MIRValueId,
};

fn node_key<T>(ptr: &T) -> usize {
    ptr as *const T as usize
}

struct Lowerer<'a> {
    analysis: &'a FunctionAnalysis,
    instructions: Vec<(MIRValueId, MIRValue)>,
    next_id: u32,
    /// Local slots synthesized by lowering itself (today: only the index
    /// counter a `for` loop desugars into) that have no corresponding entry
    /// in Pass A's [`roc_sema::LocalTable`]. Numbered starting right after
    /// the analyzed locals so every [`LocalId`] in the function stays
    /// distinct.
    extra_locals: u32,
}

impl<'a> Lowerer<'a> {
    fn new(analysis: &'a FunctionAnalysis) -> Self {
        Lowerer {
            analysis,
            instructions: Vec::new(),
            next_id: 0,
            extra_locals: 0,
        }
    }

    fn fresh_id(&mut self) -> MIRValueId {
        let id = MIRValueId(self.next_id);
        self.next_id += 1;
        id
    }

    fn fresh_label(&mut self) -> u32 {
        let label = self.next_id;
        self.next_id += 1;
        label
    }

    fn synth_local(&mut self) -> LocalId {
        let id = LocalId(self.analysis.locals.len() as u32 + self.extra_locals);
        self.extra_locals += 1;
        id
    }

    fn push(&mut self, value: MIRValue) -> MIRValueId {
        let id = self.fresh_id();
        self.instructions.push((id, value));
        id
    }

    fn type_of(&self, expr: &Expr) -> TypeDescriptor {
        self.analysis
            .annotations
            .types
            .get(&node_key(expr))
            .cloned()
            .unwrap_or(TypeDescriptor::Any)
    }

    fn lower_body(&mut self, body: &[&Stmt]) {
        for stmt in body {
            self.lower_stmt(stmt);
        }
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => {
                self.lower_expr(e);
            }
            Stmt::Return(Some(e), _) => {
                let v = self.lower_expr(e);
                self.push(MIRValue::ReturnValue(v));
            }
            Stmt::Return(None, _) => {
                self.push(MIRValue::ReturnVoid);
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
                ..
            } => self.lower_if(cond, then_branch, else_branch.as_deref()),
            Stmt::While { cond, body, .. } => self.lower_while(cond, body),
            Stmt::For {
                binding,
                iterable,
                body,
                ..
            } => self.lower_for(*binding, iterable, body),
        }
    }

    fn lower_if(&mut self, cond: &Expr, then_branch: &[&Stmt], else_branch: Option<&[&Stmt]>) {
        let cond_v = self.lower_expr(cond);
        let if_false = self.fresh_label();
        let else_end = self.fresh_label();
        self.push(MIRValue::If {
            cond: cond_v,
            then_label: if_false, // placeholder; meaning resolved by pass
            else_label: if_false,
        });
        self.lower_body(then_branch);
        self.push(MIRValue::JumpOver {
            target_label: else_end,
        });
        self.push(MIRValue::Label(if_false));
        if let Some(branch) = else_branch {
            self.lower_body(branch);
        }
        self.push(MIRValue::Label(else_end));
    }

    fn lower_while(&mut self, cond: &Expr, body: &[&Stmt]) {
        let loop_start = self.fresh_label();
        let loop_end = self.fresh_label();
        self.push(MIRValue::Label(loop_start));
        let cond_v = self.lower_expr(cond);
        self.push(MIRValue::If {
            cond: cond_v,
            then_label: loop_end,
            else_label: loop_end,
        });
        self.lower_body(body);
        self.push(MIRValue::JumpOver {
            target_label: loop_start,
        });
        self.push(MIRValue::Label(loop_end));
    }

    /// Desugars to an index-driven while loop: a synthesized index local
    /// starts at `0`, the loop condition compares it against the array's
    /// length, and the loop binding is re-read from the array on every
    /// iteration before the body runs.
    fn lower_for(&mut self, binding: roc_base::Symbol, iterable: &Expr, body: &[&Stmt]) {
        let array_v = self.lower_expr(iterable);
        let index_local = self.synth_local();
        let zero = self.push(MIRValue::ConstantInt32(0));
        self.push(MIRValue::LocalVariableSet(index_local, zero));

        let loop_start = self.fresh_label();
        let loop_end = self.fresh_label();
        self.push(MIRValue::Label(loop_start));

        let index_v = self.push(MIRValue::LocalVariableAccess(index_local));
        let len_v = self.push(MIRValue::ArrayLen(array_v));
        let cond = self.push(MIRValue::Int32Lt(index_v, len_v));
        self.push(MIRValue::If {
            cond,
            then_label: loop_end,
            else_label: loop_end,
        });

        let binding_id = self
            .analysis
            .locals
            .resolve(binding)
            .expect("for-loop binding is declared by Pass A before lowering runs");
        let index_for_elem = self.push(MIRValue::LocalVariableAccess(index_local));
        let elem = self.push(MIRValue::ArrayGet {
            array: array_v,
            index: index_for_elem,
        });
        self.push(MIRValue::LocalVariableSet(binding_id, elem));

        self.lower_body(body);

        let index_for_incr = self.push(MIRValue::LocalVariableAccess(index_local));
        let one = self.push(MIRValue::ConstantInt32(1));
        let incremented = self.push(MIRValue::Int32Add(index_for_incr, one));
        self.push(MIRValue::LocalVariableSet(index_local, incremented));
        self.push(MIRValue::JumpOver {
            target_label: loop_start,
        });
        self.push(MIRValue::Label(loop_end));
    }

    fn lower_expr(&mut self, expr: &Expr) -> MIRValueId {
        match expr {
            Expr::IntLit(v, _) => self.push(MIRValue::ConstantInt32(*v as i32)),
            Expr::FloatLit(v, _) => self.push(MIRValue::ConstantFloat64(*v)),
            Expr::BoolLit(true, _) => self.push(MIRValue::True),
            Expr::BoolLit(false, _) => self.push(MIRValue::False),
            Expr::StringLit(sym, _) => self.push(MIRValue::RawString(*sym)),
            Expr::Ident(_, _) => {
                let local = self.analysis.local_bindings[&node_key(expr)];
                self.push(MIRValue::LocalVariableAccess(local))
            }
            Expr::Assign { value, .. } => {
                let v = self.lower_expr(value);
                let local = self.analysis.local_bindings[&node_key(expr)];
                self.push(MIRValue::LocalVariableSet(local, v))
            }
            Expr::Unary { op, expr: inner, .. } => {
                let v = self.lower_expr(inner);
                match op {
                    UnOp::Not => self.push(MIRValue::Not(v)),
                    UnOp::Neg => self.push(MIRValue::Neg(v)),
                }
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                let operand_type = self.type_of(lhs);
                let lv = self.lower_expr(lhs);
                let rv = self.lower_expr(rhs);
                self.lower_binop(*op, &operand_type, lv, rv)
            }
            Expr::Call {
                receiver,
                args,
                ..
            } => self.lower_call(expr, receiver.as_deref(), args),
            Expr::ArrayLit { elements, .. } => {
                let element_type = match self.type_of(expr) {
                    TypeDescriptor::Array(inner) => *inner,
                    other => other,
                };
                let values: Vec<MIRValueId> =
                    elements.iter().map(|e| self.lower_expr(e)).collect();
                self.push(MIRValue::ArrayLit {
                    elements: values,
                    element_type,
                    space: AllocationSpace::StackAllocation,
                })
            }
        }
    }

    fn lower_call(
        &mut self,
        call_expr: &Expr,
        receiver: Option<&Expr>,
        args: &[&Expr],
    ) -> MIRValueId {
        let resolution = self
            .analysis
            .annotations
            .calls
            .get(&node_key(call_expr))
            .cloned()
            .unwrap_or(CallResolution::Unresolved);

        let receiver_type = receiver.map(|r| self.type_of(r));
        let receiver_v = receiver.map(|r| self.lower_expr(r));
        let arg_types: Vec<TypeDescriptor> = args.iter().map(|a| self.type_of(a)).collect();
        let mut arg_values: Vec<MIRValueId> = args.iter().map(|a| self.lower_expr(a)).collect();

        match resolution {
            CallResolution::Resolved(target) if target.is_ccall => {
                // The return type on `target` is only the builtin's
                // placeholder signature; the real one comes from sema's
                // per-call-site annotation, set from the call's own `<T>`
                // type argument (see `roc_sema::typeck`).
                let return_type = self.type_of(call_expr);
                let name_arg = receiver_v.unwrap_or_else(|| arg_values.remove(0));
                self.push(MIRValue::CCall {
                    name_arg,
                    args: arg_values,
                    return_type,
                })
            }
            CallResolution::Resolved(target) => {
                let signature = CallSignature {
                    arg_types,
                    param_types: target.param_types,
                    return_type: target.return_type,
                    var_args: target.var_args,
                };
                if let Some(recv) = receiver_v {
                    self.push(MIRValue::FunctionInstanceCall {
                        receiver: recv,
                        receiver_type: receiver_type.unwrap_or(TypeDescriptor::Any),
                        name: target.name,
                        args: arg_values,
                        signature,
                    })
                } else {
                    self.push(MIRValue::FunctionCall {
                        name: target.name,
                        args: arg_values,
                        signature,
                    })
                }
            }
            _ => {
                // Resolution failed during sema; emit a call anyway so
                // lowering can still produce a MIR function for the rest
                // of the diagnostics pipeline to walk.
                self.push(MIRValue::FunctionCall {
                    name: Symbol::EMPTY,
                    args: arg_values,
                    signature: CallSignature {
                        arg_types,
                        param_types: Vec::new(),
                        return_type: TypeDescriptor::Any,
                        var_args: true,
                    },
                })
            }
        }
    }

    /// Lowers one binary operator to the MIR variant selected by its
    /// operand type. `/` is the one case that needs more than a single
    /// node: integer division stays a signed integer divide (`Int32Div` /
    /// `Int64Div`) and only the *result* is promoted to `Float64` via an
    /// explicit `CastTo`, matching §4.4's "integer division is lowered
    /// later as signed-div followed by int→float cast" — lowering
    /// straight to `Float64Div` on un-cast integer operands would silently
    /// round differently (`7 / 2` would read as `3.5` instead of `3.0`).
    fn lower_binop(
        &mut self,
        op: BinOp,
        operand_type: &TypeDescriptor,
        lhs: MIRValueId,
        rhs: MIRValueId,
    ) -> MIRValueId {
        use TypeDescriptor::*;
        match (op, operand_type) {
            (BinOp::And, _) => self.push(MIRValue::And(lhs, rhs)),
            (BinOp::Or, _) => self.push(MIRValue::Or(lhs, rhs)),

            (BinOp::Add, String | RawString(_)) => self.push(MIRValue::StringConcat(lhs, rhs)),

            (BinOp::Add, Int64) => self.push(MIRValue::Int64Add(lhs, rhs)),
            (BinOp::Sub, Int64) => self.push(MIRValue::Int64Sub(lhs, rhs)),
            (BinOp::Mul, Int64) => self.push(MIRValue::Int64Mul(lhs, rhs)),
            (BinOp::Mod, Int64) => self.push(MIRValue::Int64Mod(lhs, rhs)),
            (BinOp::Eq, Int64) => self.push(MIRValue::Int64Eq(lhs, rhs)),
            (BinOp::NotEq, Int64) => self.push(MIRValue::Int64NotEq(lhs, rhs)),
            (BinOp::Gt, Int64) => self.push(MIRValue::Int64Gt(lhs, rhs)),
            (BinOp::Lt, Int64) => self.push(MIRValue::Int64Lt(lhs, rhs)),
            (BinOp::Le, Int64) => self.push(MIRValue::Int64Le(lhs, rhs)),
            (BinOp::Ge, Int64) => self.push(MIRValue::Int64Ge(lhs, rhs)),

            (BinOp::Add, Float64 | Float32) => self.push(MIRValue::Float64Add(lhs, rhs)),
            (BinOp::Sub, Float64 | Float32) => self.push(MIRValue::Float64Sub(lhs, rhs)),
            (BinOp::Mul, Float64 | Float32) => self.push(MIRValue::Float64Mul(lhs, rhs)),
            (BinOp::Eq, Float64 | Float32) => self.push(MIRValue::Float64Eq(lhs, rhs)),
            (BinOp::NotEq, Float64 | Float32) => self.push(MIRValue::Float64NotEq(lhs, rhs)),
            (BinOp::Gt, Float64 | Float32) => self.push(MIRValue::Float64Gt(lhs, rhs)),
            (BinOp::Lt, Float64 | Float32) => self.push(MIRValue::Float64Lt(lhs, rhs)),
            (BinOp::Le, Float64 | Float32) => self.push(MIRValue::Float64Le(lhs, rhs)),
            (BinOp::Ge, Float64 | Float32) => self.push(MIRValue::Float64Ge(lhs, rhs)),

            (BinOp::Div, Float64 | Float32) => self.push(MIRValue::Float64Div(lhs, rhs)),
            (BinOp::Div, Int64) => {
                let div = self.push(MIRValue::Int64Div(lhs, rhs));
                self.push(MIRValue::CastTo(div, TypeDescriptor::Float64))
            }
            (BinOp::Div, _) => {
                let div = self.push(MIRValue::Int32Div(lhs, rhs));
                self.push(MIRValue::CastTo(div, TypeDescriptor::Float64))
            }

            (BinOp::Pow, Int64) => self.push(MIRValue::Int64Pow(lhs, rhs)),
            (BinOp::Pow, Float64 | Float32) => self.push(MIRValue::Float64Pow(lhs, rhs)),
            (BinOp::Pow, _) => self.push(MIRValue::Int32Pow(lhs, rhs)),

            (BinOp::Add, _) => self.push(MIRValue::Int32Add(lhs, rhs)),
            (BinOp::Sub, _) => self.push(MIRValue::Int32Sub(lhs, rhs)),
            (BinOp::Mul, _) => self.push(MIRValue::Int32Mul(lhs, rhs)),
            (BinOp::Mod, _) => self.push(MIRValue::Int32Mod(lhs, rhs)),
            (BinOp::Eq, _) => self.push(MIRValue::Int32Eq(lhs, rhs)),
            (BinOp::NotEq, _) => self.push(MIRValue::Int32NotEq(lhs, rhs)),
            (BinOp::Gt, _) => self.push(MIRValue::Int32Gt(lhs, rhs)),
            (BinOp::Lt, _) => self.push(MIRValue::Int32Lt(lhs, rhs)),
            (BinOp::Le, _) => self.push(MIRValue::Int32Le(lhs, rhs)),
            (BinOp::Ge, _) => self.push(MIRValue::Int32Ge(lhs, rhs)),
        }
    }
}

pub fn lower_function(decl: &FunctionDecl, analysis: &FunctionAnalysis, interner: &Interner) -> MIRFunction {
    let mut lowerer = Lowerer::new(analysis);
    lowerer.lower_body(&decl.body);
    if !matches!(
        lowerer.instructions.last(),
        Some((_, MIRValue::ReturnValue(_))) | Some((_, MIRValue::ReturnVoid))
    ) {
        lowerer.push(MIRValue::ReturnVoid);
    }

    let param_types = decl
        .params
        .iter()
        .map(|p| roc_sema::signatures::type_expr_to_descriptor(&p.ty, interner))
        .collect();
    let return_type = decl
        .return_type
        .as_ref()
        .map(|t| roc_sema::signatures::type_expr_to_descriptor(t, interner))
        .unwrap_or(TypeDescriptor::Unit);

    MIRFunction {
        name: decl.name,
        param_types,
        return_type,
        local_count: analysis.locals.len() + lowerer.extra_locals as usize,
        blocks: vec![MIRBlock {
            label: 0,
            instructions: lowerer.instructions,
        }],
    }
}

pub fn lower_module(module: &Module, analysis: &ModuleAnalysis, interner: &Interner) -> MIRModule {
    let mut functions = Vec::with_capacity(module.functions.len());
    for decl in &module.functions {
        let func_analysis = &analysis.functions[&decl.name];
        functions.push(lower_function(decl, func_analysis, interner));
    }
    MIRModule { functions }
}
