//! The boundary between this compiler and a code generator.
//!
//! §6 says the CLI emits `output.s` and loads the module into an
//! in-process execution engine; §9's design notes treat the concrete
//! machine-code emitter as something "any mature native code-generation
//! framework suffices" for, and explicitly out of scope here. [`Backend`]
//! is that seam: one trait, and exactly one implementation —
//! [`StubBackend`], which renders MIR as readable text instead of real
//! machine code. Wiring a real backend (Cranelift, an LLVM binding, or
//! hand-rolled x86-64 emission) means implementing this trait; nothing
//! upstream of it needs to change.

use std::fmt;

use roc_mir::MIRModule;

/// The machine a real backend would target. Unused by [`StubBackend`];
/// carried so a future backend has somewhere to read it from without a
/// signature change.
#[derive(Debug, Clone)]
pub struct TargetTriple(pub String);

impl TargetTriple {
    pub fn host() -> Self {
        TargetTriple("x86_64-unknown-linux-gnu".to_string())
    }
}

/// What a backend produces: bytes ready to write to the output path the
/// driver names (`output.s` per §6), plus a human-readable description for
/// diagnostics.
pub struct BackendArtifact {
    pub bytes: Vec<u8>,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct BackendError(pub String);

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "backend error: {}", self.0)
    }
}

impl std::error::Error for BackendError {}

/// Turns validated MIR into an artifact for `target`. Implementations may
/// assume every invariant in §8 already holds — a `Backend` is never
/// handed MIR that failed the transformation passes.
pub trait Backend {
    fn emit(&self, module: &MIRModule, target: &TargetTriple) -> Result<BackendArtifact, BackendError>;
}

/// The only `Backend` this crate ships: dumps MIR as indented text rather
/// than emitting real machine code. Exists so the pipeline driver and its
/// tests have something concrete to call without depending on a native
/// code-generation framework.
pub struct StubBackend;

impl Backend for StubBackend {
    fn emit(&self, module: &MIRModule, target: &TargetTriple) -> Result<BackendArtifact, BackendError> {
        let mut text = format!("; stub backend output, target {}\n", target.0);
        for func in &module.functions {
            text.push_str(&format!("; fn (local_count={})\n", func.local_count));
            for block in &func.blocks {
                text.push_str(&format!("  label {}:\n", block.label));
                for (id, value) in &block.instructions {
                    text.push_str(&format!("    v{} = {:?}\n", id.0, value));
                }
            }
        }
        Ok(BackendArtifact {
            bytes: text.into_bytes(),
            description: "stub textual MIR dump".to_string(),
        })
    }
}
