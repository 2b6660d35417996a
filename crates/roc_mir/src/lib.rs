//! # roc-mir
//!
//! Mid-level IR: lowering from the analyzed AST ([`roc_sema::ModuleAnalysis`])
//! and the transformation passes that run over the result before it's handed
//! to a backend. [`mir`] defines the IR itself, [`lowering`] builds it,
//! [`passes`] normalizes it (implicit conversions, label resolution, heap
//! promotion, in that order).

pub mod lowering;
pub mod mir;
pub mod passes;

use roc_base::Interner;
use roc_sema::ModuleAnalysis;
use roc_syntax::Module;

pub use mir::{
    AllocationSpace, CallSignature, MIRBlock, MIRFunction, MIRModule, MIRValue, MIRValueId,
};

/// Lowers an analyzed module to MIR and runs every transformation pass over
/// it, returning IR ready for a backend.
pub fn build_module(module: &Module, analysis: &ModuleAnalysis, interner: &Interner) -> MIRModule {
    let mut mir_module = lowering::lower_module(module, analysis, interner);
    passes::run_passes(&mut mir_module);
    mir_module
}

#[cfg(test)]
mod tests {
    use super::*;
    use roc_base::Symbol;
    use roc_syntax::{Ast, Parser};

    fn build(src: &str) -> MIRModule {
        let mut interner = Interner::new();
        let ast = Ast::new();
        let mut parser = Parser::new(src, Symbol::EMPTY, &ast);
        let module = parser.parse_module(&mut interner).expect("parses");
        let analysis = roc_sema::analyze_module(&module, &mut interner).expect("analyzes");
        build_module(&module, &analysis, &interner)
    }

    #[test]
    fn function_returning_a_literal_lowers_to_one_function() {
        let mir = build("package main\nfun answer() -> Int32 {\nret 42\n}");
        assert_eq!(mir.functions.len(), 1);
        assert!(mir.functions[0]
            .blocks[0]
            .instructions
            .iter()
            .any(|(_, v)| matches!(v, MIRValue::ReturnValue(_))));
    }

    #[test]
    fn for_loop_lowers_with_dense_labels_and_a_synthesized_index() {
        let mir = build(
            "package main\nfun sum(xs: Array<Int32>) -> Int32 {\nfor x in xs {\nprintln(x)\n}\nret 0\n}",
        );
        let func = &mir.functions[0];
        assert!(func.local_count > 0);

        let mut seen_labels = Vec::new();
        for (_, value) in &func.blocks[0].instructions {
            if let MIRValue::Label(id) = value {
                seen_labels.push(*id);
            }
        }
        seen_labels.sort_unstable();
        seen_labels.dedup();
        for (i, id) in seen_labels.iter().enumerate() {
            assert_eq!(*id, i as u32);
        }
    }

    #[test]
    fn string_concatenation_call_site_carries_no_conversion_crash() {
        let mir = build("package main\nfun greet() -> RawString {\nret \"hi \" + \"there\"\n}");
        assert_eq!(mir.functions.len(), 1);
    }
}
