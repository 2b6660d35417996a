//! # roc-sema
//!
//! Symbol resolution, signature resolution, and type checking.
//!
//! Analysis runs in two passes per the module, mirroring the pipeline in
//! the overall compiler: Pass A ([`symbols`]) binds identifiers to local
//! slots; Pass B ([`signatures`]) builds the built-in and declared-function
//! signature table; then [`typeck`] types every expression and resolves
//! every call site against that table. Syntax errors abort a module on the
//! first one; semantic errors accumulate so a single `roc_compile` run can
//! report everything wrong with a module at once.

pub mod signatures;
pub mod symbols;
pub mod typeck;

use std::collections::HashMap;

use roc_base::{Interner, SpannedError, Symbol};
use roc_syntax::Module;

pub use signatures::{
    duplicate_parameter_name, CallResolution, SignatureTable, TargetFunctionCall,
    FREE_FUNCTION_OWNER,
};
pub use symbols::{LocalId, LocalTable};
pub use typeck::TypeAnnotations;

/// Everything the MIR lowering pass needs about one analyzed function:
/// its local table (for frame layout) and the type/call annotations keyed
/// by expression address.
pub struct FunctionAnalysis {
    pub locals: LocalTable,
    pub local_bindings: HashMap<usize, LocalId>,
    pub annotations: TypeAnnotations,
}

pub struct ModuleAnalysis {
    pub functions: HashMap<Symbol, FunctionAnalysis>,
    pub signatures: SignatureTable,
}

/// Runs Pass A, Pass B, and type checking over one module.
///
/// Returns `Ok` with the full analysis, or `Err` with every semantic error
/// collected across every function — semantic errors do not abort the rest
/// of the module the way a syntax error aborts the parser.
pub fn analyze_module(
    module: &Module,
    interner: &mut Interner,
) -> Result<ModuleAnalysis, Vec<SpannedError>> {
    let mut signatures = SignatureTable::seed_builtins(interner);
    for func in &module.functions {
        signatures.register_function(func, interner);
    }

    let mut functions = HashMap::new();
    let mut all_errors = Vec::new();

    for func in &module.functions {
        if let Some(err) = signatures::duplicate_parameter_name(func) {
            all_errors.push(err);
            continue;
        }

        let mut local_bindings = HashMap::new();
        let (locals, mut resolve_errors) = symbols::resolve_function(func, &mut local_bindings);
        all_errors.append(&mut resolve_errors);

        let (annotations, mut type_errors) = typeck::check_function(
            func,
            &locals,
            &local_bindings,
            &signatures,
            interner,
        );
        all_errors.append(&mut type_errors);

        functions.insert(
            func.name,
            FunctionAnalysis {
                locals,
                local_bindings,
                annotations,
            },
        );
    }

    if all_errors.is_empty() {
        Ok(ModuleAnalysis {
            functions,
            signatures,
        })
    } else {
        Err(all_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roc_syntax::{Ast, Parser};

    fn analyze(src: &str) -> Result<ModuleAnalysis, Vec<SpannedError>> {
        let mut interner = Interner::new();
        let ast = Ast::new();
        let mut parser = Parser::new(src, Symbol::EMPTY, &ast);
        let module = parser.parse_module(&mut interner).expect("parses");
        analyze_module(&module, &mut interner)
    }

    #[test]
    fn literal_returning_function_type_checks() {
        let result = analyze("package main\nfun answer() -> Int32 {\nret 42\n}");
        assert!(result.is_ok());
    }

    #[test]
    fn integer_division_promotes_to_float64() {
        let result = analyze("package main\nfun half(a: Int32, b: Int32) -> Float64 {\nret a / b\n}");
        assert!(result.is_ok());
    }

    #[test]
    fn two_param_addition_type_checks() {
        let result =
            analyze("package main\nfun add(a: Int32, b: Int32) -> Int32 {\nret a + b\n}");
        assert!(result.is_ok());
    }

    #[test]
    fn string_plus_int_is_a_semantic_error() {
        let result = analyze(
            "package main\nfun broken(a: Int32) -> Int32 {\nret \"oops\" + a\n}",
        );
        assert!(result.is_err());
    }

    #[test]
    fn string_plus_string_type_checks() {
        let result = analyze(
            "package main\nfun greet() -> RawString {\nret \"hi \" + \"there\"\n}",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn duplicate_parameter_name_is_rejected() {
        let result = analyze(
            "package main\nfun broken(a: Int32, a: Int32) -> Int32 {\nret a\n}",
        );
        assert!(result.is_err());
    }

    #[test]
    fn equality_comparison_returns_bool() {
        let result = analyze(
            "package main\nfun isZero(a: Int32) -> Bool {\nif a == 0 {\nret true\n}\nret false\n}",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn println_with_to_string_method_call_type_checks() {
        let result = analyze(
            "package main\nfun run(a: Int32) -> Int32 {\nprintln(a.toString())\nret 0\n}",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_symbol_is_reported() {
        let result = analyze("package main\nfun run() -> Int32 {\nret missing\n}");
        assert!(result.is_err());
    }

    #[test]
    fn mismatched_array_literal_elements_are_rejected() {
        let result = analyze(
            "package main\nfun run() {\nret [1, \"two\", 3]\n}",
        );
        assert!(result.is_err());
    }

    #[test]
    fn unresolved_free_function_call_is_reported() {
        let result = analyze("package main\nfun run() {\nnoSuchFunction(1, 2)\n}");
        assert!(result.is_err());
    }

    #[test]
    fn ccall_with_no_arguments_is_rejected() {
        let result = analyze("package main\nfun run() {\nccall()\n}");
        assert!(result.is_err());
    }

    #[test]
    fn ccall_with_a_non_literal_first_argument_is_rejected() {
        let result = analyze(
            "package main\nfun run(name: RawString) {\nccall(name)\n}",
        );
        assert!(result.is_err());
    }

    #[test]
    fn ccall_return_type_comes_from_its_type_argument() {
        let result = analyze(
            "package main\nfun run() -> Int32 {\nret ccall<Int32>(\"helper\")\n}",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn for_loop_over_a_non_array_value_is_rejected() {
        let result = analyze(
            "package main\nfun run() {\nfor x in 5 {\nprintln(x)\n}\n}",
        );
        assert!(result.is_err());
    }
}
