//! # roc-compile
//!
//! The pipeline driver: lexing and parsing, semantic analysis, MIR
//! lowering and the transformation passes, then handing the result to a
//! [`Backend`]. One module compiles entirely or produces no artifact —
//! there are no partial-success outputs (§7).

pub mod backend;
pub mod error;

use std::path::Path;

use roc_base::{Interner, Symbol};
use roc_syntax::{Ast, Module, Parser};

pub use backend::{Backend, BackendArtifact, BackendError, StubBackend, TargetTriple};
pub use error::{CompileError, Diagnostic};

/// Everything a successfully compiled module produced, kept together so
/// callers (the CLI, or a test) can inspect any stage without re-running
/// the pipeline.
pub struct CompiledModule {
    pub module_name: Symbol,
    pub mir: roc_mir::MIRModule,
    pub artifact: BackendArtifact,
}

/// Derives a module name from a source file path the way §6 requires:
/// the file stem, lowercased extension dropped, with no further
/// normalization — `src/main.roc` names the module `main`.
pub fn module_name_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module")
        .to_string()
}

/// Runs the full pipeline over `source`, using `backend` to produce the
/// final artifact. `interner` is returned to the caller filled in because
/// diagnostics, the MIR, and the artifact all reference symbols through
/// it — without it a caller couldn't resolve even the module's own name.
pub fn compile_source(
    source: &str,
    module_name: &str,
    backend: &dyn Backend,
) -> Result<(CompiledModule, Interner), CompileError> {
    let mut interner = Interner::new();
    let module_sym = interner.intern(module_name);

    let ast = Ast::new();
    let module = parse(source, module_sym, &ast, &mut interner)?;

    let analysis = roc_sema::analyze_module(&module, &mut interner).map_err(|errors| {
        CompileError::Semantic(errors.into_iter().map(Diagnostic::from).collect())
    })?;

    let mir = roc_mir::build_module(&module, &analysis, &interner);
    verify_invariants(&mir)?;

    let artifact = backend
        .emit(&mir, &TargetTriple::host())
        .map_err(|e| CompileError::Internal(e.to_string()))?;

    Ok((
        CompiledModule {
            module_name: module_sym,
            mir,
            artifact,
        },
        interner,
    ))
}

fn parse<'a>(
    source: &str,
    module_name: Symbol,
    ast: &'a Ast<'a>,
    interner: &mut Interner,
) -> Result<Module<'a>, CompileError> {
    let mut parser = Parser::new(source, module_name, ast);
    parser
        .parse_module(interner)
        .map_err(|e| CompileError::Syntax(Diagnostic::from(e)))
}

/// Internal sanity check over §8's invariants that the pipeline itself is
/// responsible for, not sema or a MIR pass: every block ends in exactly
/// one return (invariant #4). A violation here means lowering produced a
/// malformed function body — a compiler bug, not a user error, so it
/// raises `CompileError::Internal` rather than a semantic diagnostic.
fn verify_invariants(mir: &roc_mir::MIRModule) -> Result<(), CompileError> {
    for func in &mir.functions {
        for block in &func.blocks {
            let ends_in_return = matches!(
                block.instructions.last(),
                Some((_, roc_mir::MIRValue::ReturnValue(_)))
                    | Some((_, roc_mir::MIRValue::ReturnVoid))
            );
            if !ends_in_return {
                return Err(CompileError::Internal(
                    "lowered function body does not end in a return".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Result<(CompiledModule, Interner), CompileError> {
        compile_source(source, "main", &StubBackend)
    }

    #[test]
    fn module_name_is_derived_from_the_file_stem() {
        assert_eq!(module_name_from_path(Path::new("src/main.roc")), "main");
        assert_eq!(module_name_from_path(Path::new("answer.roc")), "answer");
    }

    #[test]
    fn valid_module_compiles_to_a_nonempty_artifact() {
        let (compiled, _) = compile("package main\nfun answer() -> Int32 {\nret 42\n}")
            .expect("compiles");
        assert!(!compiled.artifact.bytes.is_empty());
        assert_eq!(compiled.mir.functions.len(), 1);
    }

    #[test]
    fn syntax_error_aborts_with_no_artifact() {
        let result = compile("package main\nfun broken(");
        assert!(matches!(result, Err(CompileError::Syntax(_))));
    }

    #[test]
    fn semantic_error_reports_every_diagnostic_in_the_module() {
        let result = compile(
            "package main\nfun broken(a: Int32) -> Int32 {\nret \"oops\" + a\n}",
        );
        match result {
            Err(CompileError::Semantic(diagnostics)) => assert!(!diagnostics.is_empty()),
            other => panic!("expected a semantic error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn rendered_syntax_error_points_at_the_source_line() {
        let source = "package main\nfun broken(\n";
        let err = compile(source).unwrap_err();
        let rendered = err.render("broken.roc", source);
        assert!(rendered.contains("broken.roc"));
    }
}
