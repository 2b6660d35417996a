//! Pass B: signature resolution.
//!
//! Seeds a table of built-in functions and methods, adds one entry per
//! declared function, then resolves every call site against it. Resolution
//! tries, in order: built-ins, module-declared free functions, the
//! receiver's method table, and finally the `ccall` escape hatch (which
//! accepts any argument list once its name matches — it is the only
//! variadic free function).

use std::collections::HashMap;
use std::collections::HashSet;

use roc_base::{Interner, SpannedError, Symbol};
use roc_syntax::{FunctionDecl, TypeExpr};
use roc_types::{TypeDescriptor, INT32_TYPE_ID};

/// Pass B rejects a function whose parameter list repeats a name before
/// its body is ever resolved — the symbol table's "resolution never
/// overwrites an existing binding" invariant would otherwise let the
/// second parameter silently shadow the first.
pub fn duplicate_parameter_name(decl: &FunctionDecl) -> Option<SpannedError> {
    let mut seen = HashSet::new();
    for param in &decl.params {
        if !seen.insert(param.name) {
            return Some(SpannedError::new(
                "duplicate parameter name",
                param.span,
            ));
        }
    }
    None
}

/// Marks a [`TargetFunctionCall`] with no receiver.
pub const FREE_FUNCTION_OWNER: i64 = -1;

#[derive(Debug, Clone)]
pub struct TargetFunctionCall {
    pub owner_type_id: i64,
    pub name: Symbol,
    pub param_types: Vec<TypeDescriptor>,
    pub return_type: TypeDescriptor,
    pub var_args: bool,
    pub is_builtin: bool,
    pub is_ccall: bool,
}

/// Call-site resolution state. Transitions are one-way: a call starts
/// `Unresolved`, and ends as exactly one of `Resolved`/`Failed` — there is
/// no retry once a verdict is recorded.
#[derive(Debug, Clone)]
pub enum CallResolution {
    Unresolved,
    Resolved(TargetFunctionCall),
    Failed(String),
}

#[derive(Default)]
pub struct SignatureTable {
    free_functions: HashMap<Symbol, Vec<TargetFunctionCall>>,
    methods: HashMap<(i64, Symbol), Vec<TargetFunctionCall>>,
}

impl SignatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the fixed built-in surface: `println`, `ccall`, and
    /// `Int32.toString`.
    pub fn seed_builtins(interner: &mut Interner) -> Self {
        let mut table = SignatureTable::new();

        let println = interner.intern("println");
        table.add_free(TargetFunctionCall {
            owner_type_id: FREE_FUNCTION_OWNER,
            name: println,
            param_types: vec![TypeDescriptor::Any],
            return_type: TypeDescriptor::Unit,
            var_args: false,
            is_builtin: true,
            is_ccall: false,
        });

        let ccall = interner.intern("ccall");
        table.add_free(TargetFunctionCall {
            owner_type_id: FREE_FUNCTION_OWNER,
            name: ccall,
            param_types: vec![TypeDescriptor::RawString(None)],
            return_type: TypeDescriptor::Any,
            var_args: true,
            is_builtin: true,
            is_ccall: true,
        });

        let to_string = interner.intern("toString");
        table.add_method(
            INT32_TYPE_ID as i64,
            TargetFunctionCall {
                owner_type_id: INT32_TYPE_ID as i64,
                name: to_string,
                param_types: Vec::new(),
                return_type: TypeDescriptor::String,
                var_args: false,
                is_builtin: true,
                is_ccall: false,
            },
        );

        table
    }

    fn add_free(&mut self, target: TargetFunctionCall) {
        self.free_functions
            .entry(target.name)
            .or_default()
            .push(target);
    }

    fn add_method(&mut self, owner_type_id: i64, target: TargetFunctionCall) {
        self.methods
            .entry((owner_type_id, target.name))
            .or_default()
            .push(target);
    }

    pub fn register_function(&mut self, decl: &FunctionDecl, interner: &Interner) {
        let param_types = decl
            .params
            .iter()
            .map(|p| type_expr_to_descriptor(&p.ty, interner))
            .collect();
        let return_type = decl
            .return_type
            .as_ref()
            .map(|t| type_expr_to_descriptor(t, interner))
            .unwrap_or(TypeDescriptor::Unit);
        self.add_free(TargetFunctionCall {
            owner_type_id: FREE_FUNCTION_OWNER,
            name: decl.name,
            param_types,
            return_type,
            var_args: false,
            is_builtin: false,
            is_ccall: false,
        });
    }

    pub fn resolve_free_call(
        &self,
        name: Symbol,
        arity: usize,
        interner: &Interner,
    ) -> CallResolution {
        if let Some(overloads) = self.free_functions.get(&name) {
            for target in overloads {
                if target.is_ccall {
                    if arity < 1 {
                        return CallResolution::Failed(
                            "ccall requires at least a string literal naming the external function"
                                .to_string(),
                        );
                    }
                    return CallResolution::Resolved(target.clone());
                }
                if target.var_args && arity >= target.param_types.len() {
                    return CallResolution::Resolved(target.clone());
                }
                if target.param_types.len() == arity {
                    return CallResolution::Resolved(target.clone());
                }
            }
        }
        CallResolution::Failed(format!(
            "no function named `{}` accepts {} argument(s)",
            interner.resolve(name),
            arity
        ))
    }

    pub fn resolve_method_call(
        &self,
        owner_type_id: i64,
        name: Symbol,
        arity: usize,
        interner: &Interner,
    ) -> CallResolution {
        if let Some(overloads) = self.methods.get(&(owner_type_id, name)) {
            for target in overloads {
                if target.param_types.len() == arity {
                    return CallResolution::Resolved(target.clone());
                }
            }
        }
        CallResolution::Failed(format!(
            "no method named `{}` on this receiver accepts {} argument(s)",
            interner.resolve(name),
            arity
        ))
    }
}

pub fn type_expr_to_descriptor(ty: &TypeExpr, interner: &Interner) -> TypeDescriptor {
    match ty {
        TypeExpr::Array(inner) => {
            TypeDescriptor::Array(Box::new(type_expr_to_descriptor(inner, interner)))
        }
        TypeExpr::Named(sym) => match interner.resolve(*sym) {
            "Unit" => TypeDescriptor::Unit,
            "Any" => TypeDescriptor::Any,
            "Bool" => TypeDescriptor::Bool,
            "Int32" => TypeDescriptor::Int32,
            "Int64" => TypeDescriptor::Int64,
            "Float32" => TypeDescriptor::Float32,
            "Float64" => TypeDescriptor::Float64,
            "RawString" => TypeDescriptor::RawString(None),
            "String" => TypeDescriptor::String,
            other => TypeDescriptor::UserDefined {
                type_id: 0,
                name: interner.lookup(other).unwrap_or(*sym),
            },
        },
    }
}
