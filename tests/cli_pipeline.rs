//! End-to-end coverage of the pieces `rocc`'s `main.rs` wires together:
//! reading a `.roc` file from disk, deriving its module name, and running
//! it through the full pipeline down to a backend artifact.

use std::io::Write;

use roc_compile::{compile_source, module_name_from_path, CompileError, StubBackend};

fn write_source(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create temp source file");
    file.write_all(contents.as_bytes()).expect("write temp source file");
    path
}

#[test]
fn a_valid_file_compiles_to_a_nonempty_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_source(
        &dir,
        "answer.roc",
        "package main\nfun answer() -> Int32 {\nret 42\n}",
    );

    let source = std::fs::read_to_string(&path).expect("read temp source file");
    let module_name = module_name_from_path(&path);
    assert_eq!(module_name, "answer");

    let (compiled, _interner) =
        compile_source(&source, &module_name, &StubBackend).expect("compiles");
    assert!(!compiled.artifact.bytes.is_empty());
}

#[test]
fn a_file_with_a_semantic_error_reports_every_diagnostic() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_source(
        &dir,
        "broken.roc",
        "package main\nfun broken(a: Int32, a: Int32) -> Int32 {\nret a\n}",
    );
    let source = std::fs::read_to_string(&path).expect("read temp source file");

    let result = compile_source(&source, "broken", &StubBackend);
    match result {
        Err(CompileError::Semantic(diagnostics)) => assert!(!diagnostics.is_empty()),
        other => panic!("expected a semantic error, got {:?}", other.map(|_| ())),
    }
}
