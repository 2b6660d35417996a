//! # roc-runtime
//!
//! The runtime side of the ABI contract the backend targets: boxed-value
//! layout, the vtable registry driving dynamic dispatch ([`abi`]), and the
//! named helper surface a generated artifact links against ([`linking`]).
//!
//! [`reference_interp`] is a separate, test-only tree-walking interpreter
//! over MIR — not a production execution engine, and not what the CLI's
//! in-process invocation of `main` actually uses once a real backend
//! exists. It lets the test suite exercise the concrete end-to-end
//! scenarios the pipeline is expected to satisfy without requiring a real
//! code generator.

pub mod abi;
pub mod linking;
pub mod reference_interp;

pub use abi::{FunctionEntry, MethodId, TypeRegistry, VTable, OBJECT_HEADER_SIZE};
pub use reference_interp::{InterpError, Interpreter, Value};
